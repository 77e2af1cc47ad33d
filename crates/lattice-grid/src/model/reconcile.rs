//! Change detection between the source list and the grid's working copies.
//!
//! The reconciler tracks two mutation channels separately:
//!
//! - **Membership**: the owner swapped the source list, or added, removed,
//!   replaced or reordered its records, or a record's identity changed.
//!   Detected by comparing record handles and their identities against
//!   those seen at the last rebuild. Resolved by [`Reconciler::rebuild`].
//! - **Fields**: a watched field changed on a record that is still present.
//!   Detected by diffing per-identity snapshots of the watched fields.
//!   Resolved in place by [`Reconciler::observe`], which copies the changed
//!   fields into the existing working copy so its handle, and every clone of
//!   it held elsewhere, stays valid.
//!
//! Working copies are deep copies of the source records, pooled by identity.
//! In mirror mode, used when no cap, search or sort can reorder or hide rows,
//! the working copies are the source handles themselves and field patches
//! need no copying; the reconciler still reports which rows changed.

use std::collections::{BTreeSet, HashMap, HashSet};
use std::sync::Arc;

use super::record::{RecordHandle, RowKey, SourceList};
use super::value::FieldValue;
use lattice_grid_core::logging::{span_names, targets};

/// Watched field values of one record, in watch-set order.
type Snapshot = Vec<FieldValue>;

/// What an observation pass found.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Reconciliation {
    /// Nothing relevant changed.
    Unchanged,
    /// Watched fields changed on these records and were patched in place.
    Patched(Vec<RowKey>),
    /// Membership changed. The caller must [`rebuild`](Reconciler::rebuild)
    /// before anything else reads the working copies.
    MembershipChanged,
}

/// Keeps working copies in sync with a source list.
pub struct Reconciler {
    identity_field: String,
    watch: Vec<String>,
    mirror: bool,
    source: Option<Arc<SourceList>>,
    observed: Vec<RecordHandle>,
    keys: Vec<Option<RowKey>>,
    snapshots: HashMap<RowKey, Snapshot>,
    copies: HashMap<RowKey, RecordHandle>,
    working: Vec<RecordHandle>,
}

impl Reconciler {
    /// Creates a reconciler diffing the `watch` fields of records matched on
    /// `identity_field`.
    ///
    /// With `mirror` set the working copies are the source handles.
    pub fn new(identity_field: impl Into<String>, watch: BTreeSet<String>, mirror: bool) -> Self {
        Self {
            identity_field: identity_field.into(),
            watch: watch.into_iter().collect(),
            mirror,
            source: None,
            observed: Vec::new(),
            keys: Vec::new(),
            snapshots: HashMap::new(),
            copies: HashMap::new(),
            working: Vec::new(),
        }
    }

    /// The fields diffed for change detection.
    pub fn watch_set(&self) -> &[String] {
        &self.watch
    }

    /// Whether working copies are the source handles themselves.
    pub fn is_mirror(&self) -> bool {
        self.mirror
    }

    /// The working copies, aligned with the source order seen at the last
    /// rebuild.
    pub fn working(&self) -> &[RecordHandle] {
        &self.working
    }

    /// Returns the working copy for an identity.
    pub fn copy_of(&self, key: &RowKey) -> Option<&RecordHandle> {
        self.copies.get(key)
    }

    /// Returns `true` if membership differs from the last rebuild.
    pub fn membership_changed(&self, source: &Arc<SourceList>) -> bool {
        let Some(previous) = &self.source else {
            return true;
        };
        if !Arc::ptr_eq(previous, source) {
            return true;
        }
        let current = source.handles();
        if current.len() != self.observed.len()
            || current
                .iter()
                .zip(&self.observed)
                .any(|(a, b)| !RecordHandle::ptr_eq(a, b))
        {
            return true;
        }
        // Same records, but one may have been re-keyed in place.
        current
            .iter()
            .zip(&self.keys)
            .any(|(handle, key)| handle.key(&self.identity_field) != *key)
    }

    /// Runs one observation pass.
    ///
    /// Safe to call redundantly: a pass that finds nothing changes nothing.
    /// When membership changed, no snapshot or copy is touched; the caller
    /// must rebuild first so no diff ever runs against stale snapshots.
    #[tracing::instrument(name = "reconcile", skip_all, target = "lattice_grid::reconcile", level = "trace")]
    pub fn observe(&mut self, source: &Arc<SourceList>) -> Reconciliation {
        let _span = lattice_grid_core::PerfSpan::new(span_names::RECONCILE);

        if self.membership_changed(source) {
            tracing::debug!(target: targets::RECONCILE, "source membership changed");
            return Reconciliation::MembershipChanged;
        }

        let mut fresh: HashMap<RowKey, (Snapshot, RecordHandle)> = HashMap::new();
        for handle in &self.observed {
            if let Some(key) = handle.key(&self.identity_field) {
                let snapshot = self.snapshot(handle);
                fresh.entry(key).or_insert((snapshot, handle.clone()));
            }
        }

        let mut patched = Vec::new();
        for (key, (new_snapshot, source_handle)) in &fresh {
            let Some(old_snapshot) = self.snapshots.get(key) else {
                continue;
            };
            if old_snapshot == new_snapshot {
                continue;
            }
            if let Some(copy) = self.copies.get(key) {
                if !RecordHandle::ptr_eq(copy, source_handle) {
                    self.patch(copy, new_snapshot);
                }
                patched.push(key.clone());
            }
        }

        self.snapshots = fresh
            .into_iter()
            .map(|(key, (snapshot, _))| (key, snapshot))
            .collect();

        if patched.is_empty() {
            Reconciliation::Unchanged
        } else {
            patched.sort();
            tracing::debug!(target: targets::RECONCILE, rows = patched.len(), "patched fields in place");
            Reconciliation::Patched(patched)
        }
    }

    /// Rebuilds the working copies from `source` and retakes every snapshot.
    ///
    /// Copies of records whose identity survives are reused and refreshed,
    /// so their handles stay valid. Records that are new, lack an identity,
    /// or repeat an identity already seen in this pass get fresh copies.
    #[tracing::instrument(name = "rebuild", skip_all, target = "lattice_grid::reconcile", level = "debug")]
    pub fn rebuild(&mut self, source: &Arc<SourceList>) -> &[RecordHandle] {
        let handles = source.handles();
        let mut copies = HashMap::with_capacity(handles.len());
        let mut snapshots = HashMap::with_capacity(handles.len());
        let mut working = Vec::with_capacity(handles.len());
        let mut keys = Vec::with_capacity(handles.len());
        let mut seen = HashSet::new();
        let mut anonymous = 0usize;

        for handle in &handles {
            let key = handle.key(&self.identity_field);
            let copy = match &key {
                Some(key) if seen.insert(key.clone()) => {
                    let copy = self.copy_for(key, handle);
                    copies.insert(key.clone(), copy.clone());
                    snapshots.insert(key.clone(), self.snapshot(handle));
                    copy
                }
                Some(key) => {
                    tracing::warn!(target: targets::RECONCILE, %key, "duplicate identity in source list");
                    self.fresh_copy(handle)
                }
                None => {
                    anonymous += 1;
                    self.fresh_copy(handle)
                }
            };
            working.push(copy);
            keys.push(key);
        }

        if anonymous > 0 {
            tracing::warn!(
                target: targets::RECONCILE,
                count = anonymous,
                identity_field = %self.identity_field,
                "records without identity cannot be reconciled"
            );
        }
        tracing::debug!(
            target: targets::RECONCILE,
            rows = working.len(),
            reused = copies.keys().filter(|k| self.copies.contains_key(*k)).count(),
            "working copies rebuilt"
        );

        self.copies = copies;
        self.snapshots = snapshots;
        self.working = working;
        self.observed = handles;
        self.keys = keys;
        self.source = Some(Arc::clone(source));
        &self.working
    }

    /// Forgets everything, so the next pass reports a membership change.
    pub fn reset(&mut self) {
        self.source = None;
        self.observed.clear();
        self.keys.clear();
        self.snapshots.clear();
        self.copies.clear();
        self.working.clear();
    }

    fn snapshot(&self, handle: &RecordHandle) -> Snapshot {
        let record = handle.read();
        self.watch
            .iter()
            .map(|field| record.get(field).cloned().unwrap_or_default())
            .collect()
    }

    fn patch(&self, copy: &RecordHandle, snapshot: &Snapshot) {
        let mut record = copy.write();
        for (field, value) in self.watch.iter().zip(snapshot) {
            if value.is_none() {
                record.remove(field);
            } else {
                record.set(field.clone(), value.clone());
            }
        }
    }

    fn copy_for(&self, key: &RowKey, source: &RecordHandle) -> RecordHandle {
        if self.mirror {
            return source.clone();
        }
        match self.copies.get(key) {
            Some(existing) if !RecordHandle::ptr_eq(existing, source) => {
                *existing.write() = source.read().clone();
                existing.clone()
            }
            _ => source.deep_copy(),
        }
    }

    fn fresh_copy(&self, source: &RecordHandle) -> RecordHandle {
        if self.mirror {
            source.clone()
        } else {
            source.deep_copy()
        }
    }
}
