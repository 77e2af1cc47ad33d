//! Single-column sorting.

use super::column::SortKey;
use super::record::RecordHandle;
use super::value::{compare_values, FieldValue};
use lattice_grid_core::logging::targets;

/// Current sort column and direction.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SortState {
    /// Key being sorted on. `None` leaves rows in source order.
    pub key: Option<SortKey>,
    /// Whether the order is descending.
    pub descending: bool,
}

impl SortState {
    /// Creates a state sorting ascending on `key`.
    pub fn by(key: impl Into<SortKey>) -> Self {
        Self {
            key: Some(key.into()),
            descending: false,
        }
    }

    /// Returns `true` if a sort key is set.
    pub fn is_active(&self) -> bool {
        self.key.is_some()
    }

    /// Returns `true` if `key` is the current sort key.
    pub fn is_sorted_by(&self, key: &SortKey) -> bool {
        self.key.as_ref() == Some(key)
    }
}

/// Orders records by a column-derived key.
pub struct SortEngine;

impl SortEngine {
    /// Computes the state after a sort request on `column`.
    ///
    /// Requesting the current key toggles direction; any other key starts
    /// ascending.
    pub fn request_sort(column: &SortKey, state: &SortState) -> SortState {
        if state.is_sorted_by(column) {
            SortState {
                key: state.key.clone(),
                descending: !state.descending,
            }
        } else {
            SortState {
                key: Some(column.clone()),
                descending: false,
            }
        }
    }

    /// Returns `list` ordered by `state`.
    ///
    /// The sort is stable in both directions: records with equal keys keep
    /// their relative input order.
    pub fn apply_sort(list: &[RecordHandle], state: &SortState) -> Vec<RecordHandle> {
        let Some(key) = &state.key else {
            return list.to_vec();
        };

        let mut keyed: Vec<(FieldValue, &RecordHandle)> = list
            .iter()
            .map(|handle| (key.extract(&handle.read()), handle))
            .collect();

        keyed.sort_by(|(a, _), (b, _)| {
            let cmp = compare_values(a, b);
            if state.descending { cmp.reverse() } else { cmp }
        });

        tracing::trace!(
            target: targets::PIPELINE,
            rows = keyed.len(),
            descending = state.descending,
            "sorted rows"
        );
        keyed.into_iter().map(|(_, handle)| handle.clone()).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::record::Record;

    fn people() -> Vec<RecordHandle> {
        vec![
            RecordHandle::new(Record::new().with("id", 1).with("name", "Ann").with("age", 30)),
            RecordHandle::new(Record::new().with("id", 2).with("name", "Bo").with("age", 25)),
            RecordHandle::new(Record::new().with("id", 3).with("name", "Cy").with("age", 30)),
            RecordHandle::new(Record::new().with("id", 4).with("name", "Di").with("age", 25)),
        ]
    }

    fn ids(list: &[RecordHandle]) -> Vec<i64> {
        list.iter()
            .map(|h| h.get("id").as_int().unwrap_or_default())
            .collect()
    }

    #[test]
    fn test_toggle_law() {
        let start = SortState::by("name");
        let age = SortKey::from("age");

        let first = SortEngine::request_sort(&age, &start);
        assert_eq!(first, SortState { key: Some(age.clone()), descending: false });

        let second = SortEngine::request_sort(&age, &first);
        assert_eq!(second, SortState { key: Some(age.clone()), descending: true });

        let name = SortKey::from("name");
        let third = SortEngine::request_sort(&name, &second);
        assert_eq!(third, SortState { key: Some(name), descending: false });
    }

    #[test]
    fn test_stable_ascending_and_descending() {
        let list = people();

        let asc = SortEngine::apply_sort(&list, &SortState::by("age"));
        assert_eq!(ids(&asc), vec![2, 4, 1, 3]);

        let desc = SortEngine::apply_sort(
            &list,
            &SortState {
                key: Some("age".into()),
                descending: true,
            },
        );
        assert_eq!(ids(&desc), vec![1, 3, 2, 4]);
    }

    #[test]
    fn test_no_key_keeps_order() {
        let list = people();
        let sorted = SortEngine::apply_sort(&list, &SortState::default());
        assert_eq!(ids(&sorted), vec![1, 2, 3, 4]);
        assert!(RecordHandle::ptr_eq(&sorted[0], &list[0]));
    }

    #[test]
    fn test_extractor_key() {
        let list = people();
        let by_name_len = SortKey::extractor(|r| {
            FieldValue::from(r.read("name").to_display_string().len() as i64)
        });
        let sorted = SortEngine::apply_sort(&list, &SortState::by(by_name_len));
        // "Ann" is the only three-letter name, so it moves last.
        assert_eq!(ids(&sorted), vec![2, 3, 4, 1]);
    }

    #[test]
    fn test_missing_field_sorts_first() {
        let mut list = people();
        list.push(RecordHandle::new(Record::new().with("id", 5)));
        let sorted = SortEngine::apply_sort(&list, &SortState::by("age"));
        assert_eq!(ids(&sorted)[0], 5);
    }

    #[test]
    fn test_nan_scores_sort_last() {
        let list: Vec<RecordHandle> = [(1, 2.0), (2, f64::NAN), (3, 1.0), (4, 0.5)]
            .into_iter()
            .map(|(id, score)| RecordHandle::new(Record::new().with("id", id).with("score", score)))
            .collect();

        let asc = SortEngine::apply_sort(&list, &SortState::by("score"));
        assert_eq!(ids(&asc), vec![4, 3, 1, 2]);

        let desc = SortEngine::apply_sort(
            &list,
            &SortState {
                key: Some("score".into()),
                descending: true,
            },
        );
        assert_eq!(ids(&desc), vec![2, 1, 3, 4]);
    }
}
