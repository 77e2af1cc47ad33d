//! Row-level user actions and their dispatch.
//!
//! Rendered rows carry their identity. When a row action fires, the
//! dispatcher looks the identity up in the current internal list and hands
//! the owner's callback the grid's working copy of that record.

use std::collections::HashMap;
use std::fmt;
use std::str::FromStr;
use std::sync::Arc;

use crate::error::{GridError, Result};
use crate::model::{RecordHandle, RowKey};
use lattice_grid_core::logging::targets;

/// A user action on the grid.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RowAction {
    /// Create a record. Not tied to a row.
    Add,
    /// Edit a row.
    Edit,
    /// Delete a row.
    Delete,
    /// Owner-defined row action.
    Custom,
}

impl RowAction {
    /// Every action, in affordance order.
    pub const ALL: [RowAction; 4] = [Self::Add, Self::Edit, Self::Delete, Self::Custom];

    /// The action's name.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Add => "add",
            Self::Edit => "edit",
            Self::Delete => "delete",
            Self::Custom => "custom",
        }
    }

    /// Whether the action targets a specific row.
    pub fn needs_row(self) -> bool {
        !matches!(self, Self::Add)
    }
}

impl fmt::Display for RowAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for RowAction {
    type Err = GridError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "add" => Ok(Self::Add),
            "edit" => Ok(Self::Edit),
            "delete" => Ok(Self::Delete),
            "custom" => Ok(Self::Custom),
            _ => Err(GridError::UnknownAction(s.to_string())),
        }
    }
}

/// Callback for the add action.
pub type AddCallback = Arc<dyn Fn() + Send + Sync>;

/// Callback for row actions, invoked with the working copy of the row.
pub type RowCallback = Arc<dyn Fn(&RecordHandle) + Send + Sync>;

/// Owner callbacks for row actions. Each is optional.
#[derive(Clone, Default)]
pub struct ActionCallbacks {
    pub on_add: Option<AddCallback>,
    pub on_edit: Option<RowCallback>,
    pub on_delete: Option<RowCallback>,
    pub on_custom: Option<RowCallback>,
}

impl ActionCallbacks {
    /// Whether a callback is registered for `action`.
    pub fn is_registered(&self, action: RowAction) -> bool {
        match action {
            RowAction::Add => self.on_add.is_some(),
            RowAction::Edit => self.on_edit.is_some(),
            RowAction::Delete => self.on_delete.is_some(),
            RowAction::Custom => self.on_custom.is_some(),
        }
    }

    /// The row actions with a registered callback, in affordance order.
    pub fn row_actions(&self) -> Vec<RowAction> {
        RowAction::ALL
            .into_iter()
            .filter(|a| a.needs_row() && self.is_registered(*a))
            .collect()
    }

    fn row_callback(&self, action: RowAction) -> Option<&RowCallback> {
        match action {
            RowAction::Add => None,
            RowAction::Edit => self.on_edit.as_ref(),
            RowAction::Delete => self.on_delete.as_ref(),
            RowAction::Custom => self.on_custom.as_ref(),
        }
    }
}

impl fmt::Debug for ActionCallbacks {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ActionCallbacks")
            .field("on_add", &self.on_add.is_some())
            .field("on_edit", &self.on_edit.is_some())
            .field("on_delete", &self.on_delete.is_some())
            .field("on_custom", &self.on_custom.is_some())
            .finish()
    }
}

/// Routes row actions to owner callbacks.
///
/// Rows are indexed by identity whenever the internal list changes, so a
/// dispatch never scans the list.
///
/// # Example
///
/// ```
/// use std::sync::Arc;
/// use parking_lot::Mutex;
/// use lattice_grid::actions::{ActionCallbacks, RowAction, RowActionDispatcher};
/// use lattice_grid::model::{Record, RecordHandle, RowKey};
///
/// let edited = Arc::new(Mutex::new(None));
/// let sink = edited.clone();
/// let callbacks = ActionCallbacks {
///     on_edit: Some(Arc::new(move |row: &RecordHandle| *sink.lock() = Some(row.get("name")))),
///     ..Default::default()
/// };
///
/// let mut dispatcher = RowActionDispatcher::new(callbacks);
/// let rows = vec![RecordHandle::new(Record::new().with("id", 7).with("name", "Ann"))];
/// dispatcher.bind(&rows, "id");
///
/// dispatcher.dispatch(RowAction::Edit, Some(&RowKey::Int(7))).unwrap();
/// assert_eq!(edited.lock().clone().unwrap().as_str(), Some("Ann"));
/// ```
#[derive(Debug, Default)]
pub struct RowActionDispatcher {
    callbacks: ActionCallbacks,
    rows: HashMap<RowKey, RecordHandle>,
}

impl RowActionDispatcher {
    /// Creates a dispatcher with no rows bound.
    pub fn new(callbacks: ActionCallbacks) -> Self {
        Self {
            callbacks,
            rows: HashMap::new(),
        }
    }

    /// The registered callbacks.
    pub fn callbacks(&self) -> &ActionCallbacks {
        &self.callbacks
    }

    /// Replaces the registered callbacks, keeping bound rows.
    pub fn set_callbacks(&mut self, callbacks: ActionCallbacks) {
        self.callbacks = callbacks;
    }

    /// Whether the add affordance should be shown.
    pub fn has_add(&self) -> bool {
        self.callbacks.on_add.is_some()
    }

    /// The row actions to offer on each row.
    pub fn row_actions(&self) -> Vec<RowAction> {
        self.callbacks.row_actions()
    }

    /// Indexes the rendered rows by identity.
    ///
    /// Rows without an identity cannot be targeted. With duplicate
    /// identities the first row wins.
    pub fn bind(&mut self, rows: &[RecordHandle], identity_field: &str) {
        self.rows.clear();
        for row in rows {
            if let Some(key) = row.key(identity_field) {
                self.rows.entry(key).or_insert_with(|| row.clone());
            }
        }
    }

    /// The bound row with identity `key`.
    pub fn row(&self, key: &RowKey) -> Option<&RecordHandle> {
        self.rows.get(key)
    }

    /// Fires `action`, for the row with identity `row` when it needs one.
    ///
    /// # Errors
    ///
    /// - [`GridError::UnregisteredAction`] when no callback is registered
    /// - [`GridError::MissingRow`] when a row action has no row
    /// - [`GridError::UnknownRow`] when no bound row has the identity
    pub fn dispatch(&self, action: RowAction, row: Option<&RowKey>) -> Result<()> {
        if !self.callbacks.is_registered(action) {
            tracing::warn!(target: targets::ACTIONS, %action, "action fired without a callback");
            return Err(GridError::UnregisteredAction(action));
        }

        if action == RowAction::Add {
            tracing::debug!(target: targets::ACTIONS, %action, "dispatching");
            if let Some(on_add) = &self.callbacks.on_add {
                on_add();
            }
            return Ok(());
        }

        let key = row.ok_or(GridError::MissingRow(action))?;
        let record = self
            .rows
            .get(key)
            .ok_or_else(|| GridError::UnknownRow(key.clone()))?;

        tracing::debug!(target: targets::ACTIONS, %action, %key, "dispatching");
        if let Some(callback) = self.callbacks.row_callback(action) {
            callback(record);
        }
        Ok(())
    }

    /// Fires an action by name.
    pub fn dispatch_named(&self, action: &str, row: Option<&RowKey>) -> Result<()> {
        self.dispatch(action.parse()?, row)
    }
}
