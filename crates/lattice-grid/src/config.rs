//! Grid configuration.
//!
//! A grid is configured in two layers:
//!
//! - [`GridOptions`] holds everything expressible as data and loads from TOML
//!   or JSON, either from a string or a file.
//! - [`GridConfig`] is what a grid is built from: the options with typed
//!   [`ColumnSpec`]s (which may carry closures) and the owner's action
//!   callbacks.
//!
//! # Loading from TOML
//!
//! ```
//! use lattice_grid::config::GridConfig;
//!
//! let config = GridConfig::from_toml_str(r#"
//! title = "People"
//! sortingEnabled = true
//! maxItems = 50
//!
//! [[columns]]
//! width = 4
//! label = "Name"
//! field = "name"
//!
//! [[columns]]
//! width = 3
//! field = "joined"
//! isDate = true
//! "#).unwrap();
//!
//! assert_eq!(config.columns().len(), 2);
//! assert_eq!(config.max_items(), Some(50));
//! config.validate().unwrap();
//! ```

use std::collections::BTreeSet;
use std::fmt;
use std::path::Path;
use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::actions::{ActionCallbacks, RowAction};
use crate::error::{GridError, Result};
use crate::format::DEFAULT_DATE_FORMAT;
use crate::model::{ColumnDef, ColumnSpec, ProvidedContext, RecordHandle, SortKey, SortState};
use lattice_grid_core::logging::targets;

/// Default identity field.
pub const DEFAULT_IDENTITY_FIELD: &str = "id";

/// Data-only grid options.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct GridOptions {
    /// Title shown in the header row.
    pub title: Option<String>,
    /// Style hook for the header row.
    pub header_row_style: Option<String>,
    /// Style hook applied to every content row.
    pub content_row_style: Option<String>,
    /// Whether sort requests are honored.
    pub sorting_enabled: bool,
    /// Whether the search term filters rows.
    pub search_enabled: bool,
    /// Maximum number of candidate rows. Unlimited when absent.
    pub max_items: Option<usize>,
    /// Pattern for date columns.
    pub date_format: String,
    /// Field holding each record's identity.
    pub identity_field: String,
    /// Field the grid is sorted on at creation.
    pub initial_sort_key: Option<String>,
    /// Direction of the initial sort.
    pub initial_sort_descending: bool,
    /// Opaque values handed to expressions and templates.
    pub provided_context: ProvidedContext,
    /// Column definitions, in display order.
    pub columns: Vec<ColumnDef>,
}

impl Default for GridOptions {
    fn default() -> Self {
        Self {
            title: None,
            header_row_style: None,
            content_row_style: None,
            sorting_enabled: false,
            search_enabled: false,
            max_items: None,
            date_format: DEFAULT_DATE_FORMAT.to_string(),
            identity_field: DEFAULT_IDENTITY_FIELD.to_string(),
            initial_sort_key: None,
            initial_sort_descending: false,
            provided_context: ProvidedContext::new(),
            columns: Vec::new(),
        }
    }
}

impl GridOptions {
    /// Parses options from TOML.
    pub fn from_toml_str(s: &str) -> Result<Self> {
        Ok(toml::from_str(s)?)
    }

    /// Parses options from JSON.
    pub fn from_json_str(s: &str) -> Result<Self> {
        Ok(serde_json::from_str(s)?)
    }

    /// Loads options from a `.toml` or `.json` file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let extension = path
            .extension()
            .and_then(|e| e.to_str())
            .map(str::to_ascii_lowercase);

        let parse: fn(&str) -> Result<Self> = match extension.as_deref() {
            Some("toml") => Self::from_toml_str,
            Some("json") => Self::from_json_str,
            _ => return Err(GridError::UnsupportedFormat(path.to_path_buf())),
        };

        let text = std::fs::read_to_string(path).map_err(|e| GridError::io(path, e))?;
        let options = parse(&text)?;
        tracing::debug!(
            target: targets::CONFIG,
            path = %path.display(),
            columns = options.columns.len(),
            "loaded grid options"
        );
        Ok(options)
    }

    /// Serializes the options as pretty-printed JSON.
    pub fn to_json_string(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }
}

/// Everything a grid is built from.
///
/// # Example
///
/// ```
/// use lattice_grid::config::GridConfig;
/// use lattice_grid::model::ColumnSpec;
///
/// let config = GridConfig::new()
///     .with_title("People")
///     .with_column(ColumnSpec::new(4).with_label("Name").with_field("name"))
///     .with_column(ColumnSpec::new(2).with_label("Age").with_field("age"))
///     .with_sorting(true)
///     .with_initial_sort("age", true)
///     .on_edit(|row| println!("edit {:?}", row.get("name")));
///
/// assert!(config.validate().is_ok());
/// assert_eq!(config.watch_set().len(), 2);
/// ```
#[derive(Clone)]
pub struct GridConfig {
    title: Option<String>,
    header_row_style: Option<String>,
    content_row_style: Option<String>,
    sorting_enabled: bool,
    search_enabled: bool,
    max_items: Option<usize>,
    date_format: String,
    identity_field: String,
    initial_sort: Option<SortKey>,
    initial_sort_descending: bool,
    provided_context: ProvidedContext,
    columns: Vec<ColumnSpec>,
    callbacks: ActionCallbacks,
}

impl Default for GridConfig {
    fn default() -> Self {
        Self::from_options(GridOptions::default())
    }
}

impl From<GridOptions> for GridConfig {
    fn from(options: GridOptions) -> Self {
        Self::from_options(options)
    }
}

impl GridConfig {
    /// Creates a configuration with default options and no columns.
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a configuration from data-only options.
    pub fn from_options(options: GridOptions) -> Self {
        Self {
            title: options.title,
            header_row_style: options.header_row_style,
            content_row_style: options.content_row_style,
            sorting_enabled: options.sorting_enabled,
            search_enabled: options.search_enabled,
            max_items: options.max_items,
            date_format: options.date_format,
            identity_field: options.identity_field,
            initial_sort: options.initial_sort_key.map(SortKey::Field),
            initial_sort_descending: options.initial_sort_descending,
            provided_context: options.provided_context,
            columns: options.columns.into_iter().map(ColumnSpec::from).collect(),
            callbacks: ActionCallbacks::default(),
        }
    }

    /// Parses a configuration from TOML options.
    pub fn from_toml_str(s: &str) -> Result<Self> {
        GridOptions::from_toml_str(s).map(Self::from_options)
    }

    /// Parses a configuration from JSON options.
    pub fn from_json_str(s: &str) -> Result<Self> {
        GridOptions::from_json_str(s).map(Self::from_options)
    }

    /// Loads a configuration from a `.toml` or `.json` options file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        GridOptions::load(path).map(Self::from_options)
    }

    // =========================================================================
    // Builder
    // =========================================================================

    /// Sets the header title.
    pub fn with_title(mut self, title: impl Into<String>) -> Self {
        self.title = Some(title.into());
        self
    }

    /// Sets the header row style hook.
    pub fn with_header_row_style(mut self, style: impl Into<String>) -> Self {
        self.header_row_style = Some(style.into());
        self
    }

    /// Sets the content row style hook.
    pub fn with_content_row_style(mut self, style: impl Into<String>) -> Self {
        self.content_row_style = Some(style.into());
        self
    }

    /// Enables or disables sort requests.
    pub fn with_sorting(mut self, enabled: bool) -> Self {
        self.sorting_enabled = enabled;
        self
    }

    /// Enables or disables search.
    pub fn with_search(mut self, enabled: bool) -> Self {
        self.search_enabled = enabled;
        self
    }

    /// Caps the candidate rows.
    pub fn with_max_items(mut self, max: usize) -> Self {
        self.max_items = Some(max);
        self
    }

    /// Sets the date pattern.
    pub fn with_date_format(mut self, pattern: impl Into<String>) -> Self {
        self.date_format = pattern.into();
        self
    }

    /// Sets the identity field.
    pub fn with_identity_field(mut self, field: impl Into<String>) -> Self {
        self.identity_field = field.into();
        self
    }

    /// Sorts the grid on `key` at creation.
    pub fn with_initial_sort(mut self, key: impl Into<SortKey>, descending: bool) -> Self {
        self.initial_sort = Some(key.into());
        self.initial_sort_descending = descending;
        self
    }

    /// Sets the provided context.
    pub fn with_provided_context(mut self, context: ProvidedContext) -> Self {
        self.provided_context = context;
        self
    }

    /// Appends a column.
    pub fn with_column(mut self, column: ColumnSpec) -> Self {
        self.columns.push(column);
        self
    }

    /// Replaces all columns.
    pub fn with_columns(mut self, columns: impl IntoIterator<Item = ColumnSpec>) -> Self {
        self.columns = columns.into_iter().collect();
        self
    }

    /// Replaces all callbacks.
    pub fn with_callbacks(mut self, callbacks: ActionCallbacks) -> Self {
        self.callbacks = callbacks;
        self
    }

    /// Registers the add callback.
    pub fn on_add<F>(mut self, f: F) -> Self
    where
        F: Fn() + Send + Sync + 'static,
    {
        self.callbacks.on_add = Some(Arc::new(f));
        self
    }

    /// Registers the edit callback.
    pub fn on_edit<F>(mut self, f: F) -> Self
    where
        F: Fn(&RecordHandle) + Send + Sync + 'static,
    {
        self.callbacks.on_edit = Some(Arc::new(f));
        self
    }

    /// Registers the delete callback.
    pub fn on_delete<F>(mut self, f: F) -> Self
    where
        F: Fn(&RecordHandle) + Send + Sync + 'static,
    {
        self.callbacks.on_delete = Some(Arc::new(f));
        self
    }

    /// Registers the custom action callback.
    pub fn on_custom<F>(mut self, f: F) -> Self
    where
        F: Fn(&RecordHandle) + Send + Sync + 'static,
    {
        self.callbacks.on_custom = Some(Arc::new(f));
        self
    }

    // =========================================================================
    // Accessors
    // =========================================================================

    pub fn title(&self) -> Option<&str> {
        self.title.as_deref()
    }

    pub fn header_row_style(&self) -> Option<&str> {
        self.header_row_style.as_deref()
    }

    pub fn content_row_style(&self) -> Option<&str> {
        self.content_row_style.as_deref()
    }

    pub fn sorting_enabled(&self) -> bool {
        self.sorting_enabled
    }

    pub fn search_enabled(&self) -> bool {
        self.search_enabled
    }

    pub fn max_items(&self) -> Option<usize> {
        self.max_items
    }

    pub fn date_format(&self) -> &str {
        &self.date_format
    }

    pub fn identity_field(&self) -> &str {
        &self.identity_field
    }

    pub fn provided_context(&self) -> &ProvidedContext {
        &self.provided_context
    }

    pub fn columns(&self) -> &[ColumnSpec] {
        &self.columns
    }

    pub fn callbacks(&self) -> &ActionCallbacks {
        &self.callbacks
    }

    /// The sort state a grid starts with.
    pub fn initial_sort_state(&self) -> SortState {
        SortState {
            key: self.initial_sort.clone(),
            descending: self.initial_sort.is_some() && self.initial_sort_descending,
        }
    }

    /// Field names whose changes affect rendering.
    pub fn watch_set(&self) -> BTreeSet<String> {
        self.columns
            .iter()
            .filter_map(|c| c.field_name())
            .map(str::to_string)
            .collect()
    }

    /// Whether rows can never be reordered or hidden, so the internal list
    /// may alias the source records.
    pub fn is_mirror(&self) -> bool {
        !self.sorting_enabled
            && !self.search_enabled
            && self.max_items.is_none()
            && self.initial_sort.is_none()
    }

    /// Whether a callback is registered for `action`.
    pub fn has_callback(&self, action: RowAction) -> bool {
        self.callbacks.is_registered(action)
    }

    /// Checks the configuration before a grid is built from it.
    ///
    /// # Errors
    ///
    /// Returns [`GridError::InvalidConfig`] when there are no columns, the
    /// identity field is empty, or the initial sort key matches no column,
    /// and [`GridError::InvalidColumn`] for a zero width or a column keyed on
    /// an extractor with no content expression or custom content.
    pub fn validate(&self) -> Result<()> {
        if self.columns.is_empty() {
            return Err(GridError::config("at least one column is required"));
        }
        if self.identity_field.is_empty() {
            return Err(GridError::config("identity field must not be empty"));
        }

        for (index, column) in self.columns.iter().enumerate() {
            if column.width == 0 {
                return Err(GridError::column(index, "width must be positive"));
            }
            if column.renders_extractor() {
                return Err(GridError::column(
                    index,
                    "keyed on an extractor function but has no content expression or custom content",
                ));
            }
        }

        if let Some(key) = &self.initial_sort
            && !self.columns.iter().any(|c| c.field.as_ref() == Some(key))
        {
            return Err(GridError::config(format!(
                "initial sort key {key:?} is not a column field"
            )));
        }

        tracing::trace!(target: targets::CONFIG, columns = self.columns.len(), "configuration valid");
        Ok(())
    }
}

impl fmt::Debug for GridConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("GridConfig")
            .field("title", &self.title)
            .field("sorting_enabled", &self.sorting_enabled)
            .field("search_enabled", &self.search_enabled)
            .field("max_items", &self.max_items)
            .field("date_format", &self.date_format)
            .field("identity_field", &self.identity_field)
            .field("initial_sort", &self.initial_sort)
            .field("columns", &self.columns)
            .field("callbacks", &self.callbacks)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn person_columns() -> Vec<ColumnSpec> {
        vec![
            ColumnSpec::new(4).with_field("name"),
            ColumnSpec::new(2).with_field("age"),
        ]
    }

    #[test]
    fn test_option_defaults() {
        let options = GridOptions::from_json_str("{}").unwrap();
        assert_eq!(options.date_format, "M/d/yyyy, h:mm:ss a");
        assert_eq!(options.identity_field, "id");
        assert!(!options.sorting_enabled);
        assert!(!options.search_enabled);
        assert_eq!(options.max_items, None);
        assert!(options.columns.is_empty());
    }

    #[test]
    fn test_json_options() {
        let options = GridOptions::from_json_str(
            r#"{
                "title": "Staff",
                "searchEnabled": true,
                "identityField": "uid",
                "initialSortKey": "name",
                "initialSortDescending": true,
                "providedContext": {"locale": "en"},
                "columns": [{"width": 2, "field": "name", "rowStyle": "bold"}]
            }"#,
        )
        .unwrap();
        assert_eq!(options.title.as_deref(), Some("Staff"));
        assert!(options.search_enabled);
        assert_eq!(options.identity_field, "uid");
        assert_eq!(options.provided_context.get("locale"), Some(&serde_json::json!("en")));

        let config = GridConfig::from_options(options);
        assert_eq!(config.initial_sort_state(), SortState {
            key: Some(SortKey::from("name")),
            descending: true,
        });
        config.validate().unwrap();
    }

    #[test]
    fn test_json_round_trip_keeps_camel_case() {
        let options = GridOptions {
            max_items: Some(5),
            ..Default::default()
        };
        let json = options.to_json_string().unwrap();
        assert!(json.contains("\"maxItems\": 5"));
        assert_eq!(GridOptions::from_json_str(&json).unwrap(), options);
    }

    #[test]
    fn test_malformed_options() {
        assert!(matches!(GridOptions::from_toml_str("columns = 3"), Err(GridError::Toml(_))));
        assert!(matches!(GridOptions::from_json_str("{"), Err(GridError::Json(_))));
    }

    #[test]
    fn test_validate_rejects_bad_columns() {
        let err = GridConfig::new().validate().unwrap_err();
        assert!(matches!(err, GridError::InvalidConfig(_)));

        let err = GridConfig::new()
            .with_column(ColumnSpec::new(1).with_field("a"))
            .with_column(ColumnSpec::new(0).with_field("b"))
            .validate()
            .unwrap_err();
        assert!(matches!(err, GridError::InvalidColumn { index: 1, .. }));

        let err = GridConfig::new()
            .with_column(ColumnSpec::new(1).with_extractor(|r| r.read("a")))
            .validate()
            .unwrap_err();
        assert!(matches!(err, GridError::InvalidColumn { index: 0, .. }));
        assert!(err.is_config_error());

        GridConfig::new()
            .with_column(
                ColumnSpec::new(1)
                    .with_extractor(|r| r.read("a"))
                    .with_expression(|r, _| r.read("a")),
            )
            .validate()
            .unwrap();
    }

    #[test]
    fn test_validate_initial_sort_key() {
        let err = GridConfig::new()
            .with_columns(person_columns())
            .with_initial_sort("salary", false)
            .validate()
            .unwrap_err();
        assert!(matches!(err, GridError::InvalidConfig(_)));

        GridConfig::new()
            .with_columns(person_columns())
            .with_initial_sort("age", false)
            .validate()
            .unwrap();
    }

    #[test]
    fn test_watch_set_and_mirror() {
        let config = GridConfig::new()
            .with_columns(person_columns())
            .with_column(ColumnSpec::new(1).with_custom_content("{{record.x}}"));
        let watch: Vec<String> = config.watch_set().into_iter().collect();
        assert_eq!(watch, vec!["age", "name"]);
        assert!(config.is_mirror());
        assert!(!config.clone().with_search(true).is_mirror());
        assert!(!config.clone().with_max_items(3).is_mirror());
        assert!(!config.with_initial_sort("age", false).is_mirror());
    }

    #[test]
    fn test_callbacks_registered() {
        let config = GridConfig::new().on_add(|| {}).on_delete(|_| {});
        assert!(config.has_callback(RowAction::Add));
        assert!(config.has_callback(RowAction::Delete));
        assert!(!config.has_callback(RowAction::Edit));
    }
}
