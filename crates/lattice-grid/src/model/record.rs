//! Records, shared record handles and the owner-held source list.

use std::collections::BTreeMap;
use std::fmt;
use std::sync::Arc;

use parking_lot::{RwLock, RwLockReadGuard, RwLockWriteGuard};

use super::value::FieldValue;
use crate::error::{GridError, Result};

/// Identity of a record, read from its identity field.
///
/// Only integers, strings and booleans make usable identities. A record
/// whose identity field is absent or holds any other kind of value has no
/// key and cannot be matched across reconciliation passes.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum RowKey {
    /// Integer identity.
    Int(i64),
    /// String identity.
    String(String),
    /// Boolean identity.
    Bool(bool),
}

impl RowKey {
    /// Derives a key from a field value.
    pub fn from_value(value: &FieldValue) -> Option<Self> {
        match value.resolve() {
            FieldValue::Int(n) => Some(RowKey::Int(n)),
            FieldValue::String(s) => Some(RowKey::String(s)),
            FieldValue::Bool(b) => Some(RowKey::Bool(b)),
            _ => None,
        }
    }
}

impl fmt::Display for RowKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RowKey::Int(n) => write!(f, "{n}"),
            RowKey::String(s) => write!(f, "{s:?}"),
            RowKey::Bool(b) => write!(f, "{b}"),
        }
    }
}

impl From<i64> for RowKey {
    fn from(n: i64) -> Self {
        RowKey::Int(n)
    }
}

impl From<i32> for RowKey {
    fn from(n: i32) -> Self {
        RowKey::Int(n as i64)
    }
}

impl From<&str> for RowKey {
    fn from(s: &str) -> Self {
        RowKey::String(s.to_string())
    }
}

impl From<String> for RowKey {
    fn from(s: String) -> Self {
        RowKey::String(s)
    }
}

/// A record: field names mapped to values.
///
/// The engine never interprets a record beyond reading fields by name.
///
/// # Example
///
/// ```
/// use lattice_grid::model::Record;
///
/// let ann = Record::new().with("id", 1).with("name", "Ann").with("age", 30);
/// assert_eq!(ann.get("name").and_then(|v| v.as_str()), Some("Ann"));
/// ```
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Record {
    fields: BTreeMap<String, FieldValue>,
}

impl Record {
    /// Creates an empty record.
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder-style field assignment.
    pub fn with(mut self, name: impl Into<String>, value: impl Into<FieldValue>) -> Self {
        self.fields.insert(name.into(), value.into());
        self
    }

    /// Builds a record from a JSON object.
    pub fn from_json(value: &serde_json::Value) -> Result<Self> {
        let object = value
            .as_object()
            .ok_or_else(|| GridError::InvalidRecord(value.to_string()))?;
        Ok(Self {
            fields: object
                .iter()
                .map(|(name, v)| (name.clone(), FieldValue::from(v)))
                .collect(),
        })
    }

    /// Returns the value stored under `name`.
    pub fn get(&self, name: &str) -> Option<&FieldValue> {
        self.fields.get(name)
    }

    /// Reads a field for content or sorting: computed values are invoked and
    /// absent fields yield `FieldValue::None`.
    pub fn read(&self, name: &str) -> FieldValue {
        self.fields.get(name).map(FieldValue::resolve).unwrap_or_default()
    }

    /// Sets a field, returning the previous value.
    pub fn set(&mut self, name: impl Into<String>, value: impl Into<FieldValue>) -> Option<FieldValue> {
        self.fields.insert(name.into(), value.into())
    }

    /// Removes a field, returning its value.
    pub fn remove(&mut self, name: &str) -> Option<FieldValue> {
        self.fields.remove(name)
    }

    /// Iterates over all fields in name order.
    pub fn fields(&self) -> impl Iterator<Item = (&str, &FieldValue)> {
        self.fields.iter().map(|(k, v)| (k.as_str(), v))
    }

    /// Number of fields.
    pub fn len(&self) -> usize {
        self.fields.len()
    }

    /// Returns `true` if the record has no fields.
    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    /// Identity of this record under the given identity field.
    pub fn key(&self, identity_field: &str) -> Option<RowKey> {
        self.fields.get(identity_field).and_then(RowKey::from_value)
    }
}

/// A shared, interior-mutable record.
///
/// Two handles are the "same record" when they point to the same allocation;
/// see [`RecordHandle::ptr_eq`]. Field patches write through a handle so
/// every holder of a clone observes the new values.
#[derive(Clone, Default)]
pub struct RecordHandle(Arc<RwLock<Record>>);

impl RecordHandle {
    /// Wraps a record in a new handle.
    pub fn new(record: Record) -> Self {
        Self(Arc::new(RwLock::new(record)))
    }

    /// Locks the record for reading.
    pub fn read(&self) -> RwLockReadGuard<'_, Record> {
        self.0.read()
    }

    /// Locks the record for writing.
    pub fn write(&self) -> RwLockWriteGuard<'_, Record> {
        self.0.write()
    }

    /// Returns `true` if both handles refer to the same record.
    pub fn ptr_eq(a: &RecordHandle, b: &RecordHandle) -> bool {
        Arc::ptr_eq(&a.0, &b.0)
    }

    /// Clones the record into a fresh, unshared handle.
    pub fn deep_copy(&self) -> RecordHandle {
        RecordHandle::new(self.read().clone())
    }

    /// Convenience for reading one field.
    pub fn get(&self, name: &str) -> FieldValue {
        self.read().get(name).cloned().unwrap_or_default()
    }

    /// Convenience for setting one field.
    pub fn set(&self, name: impl Into<String>, value: impl Into<FieldValue>) -> Option<FieldValue> {
        self.write().set(name, value)
    }

    /// Identity of the record under the given identity field.
    pub fn key(&self, identity_field: &str) -> Option<RowKey> {
        self.read().key(identity_field)
    }
}

impl fmt::Debug for RecordHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("RecordHandle").field(&*self.read()).finish()
    }
}

impl From<Record> for RecordHandle {
    fn from(record: Record) -> Self {
        RecordHandle::new(record)
    }
}

/// The owner's authoritative, ordered list of records.
///
/// The grid only ever reads this list. The owner may change its membership
/// through the methods here, mutate fields through the handles, or hand the
/// grid a different `SourceList` altogether.
#[derive(Default)]
pub struct SourceList {
    items: RwLock<Vec<RecordHandle>>,
}

impl SourceList {
    /// Creates a list from records.
    pub fn new(records: Vec<Record>) -> Self {
        Self::from_handles(records.into_iter().map(RecordHandle::new).collect())
    }

    /// Creates a list from existing handles.
    pub fn from_handles(handles: Vec<RecordHandle>) -> Self {
        Self {
            items: RwLock::new(handles),
        }
    }

    /// Creates a list from a JSON array of objects.
    pub fn from_json(value: &serde_json::Value) -> Result<Self> {
        let items = value
            .as_array()
            .ok_or_else(|| GridError::InvalidRecord(value.to_string()))?;
        let records = items.iter().map(Record::from_json).collect::<Result<Vec<_>>>()?;
        Ok(Self::new(records))
    }

    /// Convenience for building a shared list.
    pub fn shared(records: Vec<Record>) -> Arc<Self> {
        Arc::new(Self::new(records))
    }

    /// Clones the current handles in order.
    pub fn handles(&self) -> Vec<RecordHandle> {
        self.items.read().clone()
    }

    /// Returns the handle at `index`.
    pub fn get(&self, index: usize) -> Option<RecordHandle> {
        self.items.read().get(index).cloned()
    }

    /// Finds the first record with the given identity.
    pub fn find(&self, identity_field: &str, key: &RowKey) -> Option<RecordHandle> {
        self.items
            .read()
            .iter()
            .find(|h| h.key(identity_field).as_ref() == Some(key))
            .cloned()
    }

    /// Number of records.
    pub fn len(&self) -> usize {
        self.items.read().len()
    }

    /// Returns `true` if the list is empty.
    pub fn is_empty(&self) -> bool {
        self.items.read().is_empty()
    }

    /// Appends a record, returning its handle.
    pub fn push(&self, record: Record) -> RecordHandle {
        let handle = RecordHandle::new(record);
        self.items.write().push(handle.clone());
        handle
    }

    /// Inserts a record at `index`, returning its handle.
    pub fn insert(&self, index: usize, record: Record) -> RecordHandle {
        let handle = RecordHandle::new(record);
        let mut items = self.items.write();
        let index = index.min(items.len());
        items.insert(index, handle.clone());
        handle
    }

    /// Removes the record at `index`.
    pub fn remove(&self, index: usize) -> Option<RecordHandle> {
        let mut items = self.items.write();
        (index < items.len()).then(|| items.remove(index))
    }

    /// Removes the first record with the given identity.
    pub fn remove_by_key(&self, identity_field: &str, key: &RowKey) -> Option<RecordHandle> {
        let mut items = self.items.write();
        let position = items
            .iter()
            .position(|h| h.key(identity_field).as_ref() == Some(key))?;
        Some(items.remove(position))
    }

    /// Replaces every record.
    pub fn replace_all(&self, records: Vec<Record>) {
        *self.items.write() = records.into_iter().map(RecordHandle::new).collect();
    }
}

impl fmt::Debug for SourceList {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_list().entries(self.items.read().iter()).finish()
    }
}
