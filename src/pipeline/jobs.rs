//! Scheduled job selection.
//!
//! The scheduler sets `FLOWS` to a whitespace-separated list of job ids and
//! every selected job runs once, in order.

use std::fmt;

/// Environment variable holding the job ids to run.
pub const FLOWS_VAR: &str = "FLOWS";

/// A job the scheduler can select.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Flow {
    /// Check the student housing portal for changes (id `0`).
    StudentHousing,
}

impl Flow {
    pub fn from_id(id: &str) -> Option<Self> {
        match id {
            "0" => Some(Flow::StudentHousing),
            _ => None,
        }
    }

    pub fn id(&self) -> &'static str {
        match self {
            Flow::StudentHousing => "0",
        }
    }
}

impl fmt::Display for Flow {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Flow::StudentHousing => write!(f, "student housing check ({})", self.id()),
        }
    }
}

/// Parse a `FLOWS` value. Unknown ids are logged and skipped.
pub fn parse_flows(value: &str) -> Vec<Flow> {
    value
        .split_whitespace()
        .filter_map(|id| {
            let flow = Flow::from_id(id);
            if flow.is_none() {
                log::warn!("Unknown flow id '{}', skipping", id);
            }
            flow
        })
        .collect()
}

/// Flows selected by the `FLOWS` environment variable; none when unset.
pub fn flows_from_env() -> Vec<Flow> {
    std::env::var(FLOWS_VAR)
        .map(|value| parse_flows(&value))
        .unwrap_or_default()
}
