//! Free-text search and row-count cap.

use super::record::{Record, RecordHandle};
use lattice_grid_core::logging::targets;

/// Current search text.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FilterState {
    /// Case-insensitive substring to match. Empty matches everything.
    pub search_term: String,
}

impl FilterState {
    /// Creates a state searching for `term`.
    pub fn new(term: impl Into<String>) -> Self {
        Self {
            search_term: term.into(),
        }
    }

    /// Returns `true` if the term would exclude anything.
    pub fn is_active(&self) -> bool {
        !self.search_term.is_empty()
    }
}

/// Applies search and cap to record sequences.
pub struct FilterEngine;

impl FilterEngine {
    /// Keeps the records with at least one field value containing `term`,
    /// ignoring case.
    pub fn apply_search(list: &[RecordHandle], term: &str) -> Vec<RecordHandle> {
        if term.is_empty() {
            return list.to_vec();
        }

        let needle = term.to_lowercase();
        let kept: Vec<RecordHandle> = list
            .iter()
            .filter(|handle| Self::matches(&handle.read(), &needle))
            .cloned()
            .collect();

        tracing::trace!(
            target: targets::PIPELINE,
            term,
            before = list.len(),
            after = kept.len(),
            "applied search"
        );
        kept
    }

    /// Returns the first `max` records, or all of them when `max` is `None`.
    pub fn apply_cap(list: &[RecordHandle], max: Option<usize>) -> Vec<RecordHandle> {
        match max {
            Some(max) => list.iter().take(max).cloned().collect(),
            None => list.to_vec(),
        }
    }

    /// Whether any field of `record` contains the lowercased `needle`.
    fn matches(record: &Record, needle: &str) -> bool {
        record.fields().any(|(_, value)| {
            value
                .search_text()
                .is_some_and(|text| text.to_lowercase().contains(needle))
        })
    }
}
