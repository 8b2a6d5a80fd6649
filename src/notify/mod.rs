//! Change notifications.
//!
//! The pipeline only talks to the [`Notifier`] trait; [`SmtpNotifier`]
//! delivers over an SMTP relay.

mod email;

use async_trait::async_trait;

use crate::error::Result;
use crate::pipeline::ChangeSet;

pub use email::{MailCredentials, PLAIN_TEXT_FALLBACK, SmtpNotifier};

/// Delivers a rendered report to the configured recipient.
#[async_trait]
pub trait Notifier: Send + Sync {
    async fn send(&self, subject: &str, html: &str) -> Result<()>;
}

/// Subject line picked from what changed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Subject {
    NewOptions,
    RemovedOptions,
    SomeChanges,
}

impl Subject {
    /// Additions win over removals; neither means only field values moved.
    pub fn for_changes(changes: &ChangeSet) -> Self {
        if changes.has_additions() {
            Subject::NewOptions
        } else if changes.has_removals() {
            Subject::RemovedOptions
        } else {
            Subject::SomeChanges
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Subject::NewOptions => "There are new housing options in the Student Housing Portal!",
            Subject::RemovedOptions => "Some options were removed from the Student Housing Portal",
            Subject::SomeChanges => "There are some changes in the Student Housing Portal",
        }
    }
}

impl std::fmt::Display for Subject {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}
