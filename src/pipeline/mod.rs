//! Pipeline entry points for the housing watcher.
//!
//! - `calculate_diff`: classify listing keys as added/removed/common
//! - `Report`: render the change report
//! - `ListingCheck`: run one full check
//! - `parse_flows`: pick scheduled jobs from `FLOWS`

pub mod check;
pub mod diff;
pub mod jobs;
pub mod report;

pub use check::{ListingCheck, RunOutcome};
pub use diff::{ChangeSet, ListingDiff, calculate_diff};
pub use jobs::{FLOWS_VAR, Flow, flows_from_env, parse_flows};
pub use report::Report;
