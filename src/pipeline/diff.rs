//! Diff calculation between the stored snapshot and the current fetch.
//!
//! Listings are matched by identity key only. A field edit under an
//! unchanged key still counts as a change, but the key lands in `common`.

use std::collections::BTreeSet;

use crate::models::ListingSet;

/// Keys classified by where they appear.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ChangeSet {
    /// In previous but not in current
    pub removed: BTreeSet<String>,
    /// In current but not in previous
    pub added: BTreeSet<String>,
    /// In both
    pub common: BTreeSet<String>,
}

impl ChangeSet {
    pub fn has_additions(&self) -> bool {
        !self.added.is_empty()
    }

    pub fn has_removals(&self) -> bool {
        !self.removed.is_empty()
    }
}

/// Outcome of comparing two listing sets.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ListingDiff {
    /// Every key and every field matches.
    Unchanged,
    /// Something differs.
    Changed(ChangeSet),
}

impl ListingDiff {
    pub fn is_unchanged(&self) -> bool {
        matches!(self, Self::Unchanged)
    }

    pub fn changes(&self) -> Option<&ChangeSet> {
        match self {
            Self::Unchanged => None,
            Self::Changed(changes) => Some(changes),
        }
    }
}

/// Compare `previous` against `current`.
///
/// The `Available` counts are not compared.
pub fn calculate_diff(previous: &ListingSet, current: &ListingSet) -> ListingDiff {
    if previous.choices == current.choices {
        return ListingDiff::Unchanged;
    }

    let prev_keys: BTreeSet<&str> = previous.choices.keys().map(String::as_str).collect();
    let curr_keys: BTreeSet<&str> = current.choices.keys().map(String::as_str).collect();

    ListingDiff::Changed(ChangeSet {
        removed: prev_keys.difference(&curr_keys).map(|k| k.to_string()).collect(),
        added: curr_keys.difference(&prev_keys).map(|k| k.to_string()).collect(),
        common: curr_keys.intersection(&prev_keys).map(|k| k.to_string()).collect(),
    })
}
