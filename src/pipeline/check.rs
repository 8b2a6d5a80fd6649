// src/pipeline/check.rs

//! Listing check pipeline: load → fetch → diff → render → send → save.

use chrono::{DateTime, Local};

use crate::error::Result;
use crate::notify::{Notifier, Subject};
use crate::pipeline::{ListingDiff, Report, calculate_diff};
use crate::services::ListingSource;
use crate::storage::SnapshotStore;

/// What a check run did.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RunOutcome {
    /// Nothing changed; nothing sent, nothing saved.
    Unchanged,
    /// A report was delivered and the snapshot replaced.
    Notified {
        subject: Subject,
        added: usize,
        removed: usize,
    },
}

/// Collaborators for one check run.
pub struct ListingCheck<'a> {
    pub source: &'a dyn ListingSource,
    pub store: &'a dyn SnapshotStore,
    pub notifier: &'a dyn Notifier,
    pub portal_url: &'a str,
}

impl ListingCheck<'_> {
    /// Run one check, stamping the report with the current time.
    pub async fn run(&self) -> Result<RunOutcome> {
        self.run_at(Local::now()).await
    }

    /// Run one check with an explicit report timestamp.
    ///
    /// The snapshot is saved only after the notifier succeeds. A failed send
    /// leaves the previous snapshot in place so the next run reports again.
    pub async fn run_at(&self, now: DateTime<Local>) -> Result<RunOutcome> {
        log::info!("[STEP 1/4] Loading snapshot from {}", self.store.location());
        let previous = self.store.load().await?;

        log::info!("[STEP 2/4] Fetching current listings");
        let current = self.source.fetch().await?;

        log::info!(
            "[STEP 3/4] Comparing {} stored with {} current listings",
            previous.len(),
            current.len()
        );
        let changes = match calculate_diff(&previous, &current) {
            ListingDiff::Unchanged => {
                log::info!("There are no changes, so not sending any update.");
                return Ok(RunOutcome::Unchanged);
            }
            ListingDiff::Changed(changes) => changes,
        };

        let html = Report::new(&changes, &previous, &current, self.portal_url)
            .with_timestamp(now)
            .render();
        let subject = Subject::for_changes(&changes);

        log::info!(
            "[STEP 4/4] Sending report: {} new, {} removed, {} unchanged",
            changes.added.len(),
            changes.removed.len(),
            changes.common.len()
        );
        self.notifier.send(subject.as_str(), &html).await?;
        self.store.save(&current).await?;

        Ok(RunOutcome::Notified {
            subject,
            added: changes.added.len(),
            removed: changes.removed.len(),
        })
    }
}
