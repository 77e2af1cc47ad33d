//! Column specifications.
//!
//! A [`ColumnSpec`] describes one rendered column: its width, label, the
//! field it reads, and how its cell content is produced. Content is chosen by
//! a fixed priority, surfaced as [`ContentSource`]:
//!
//! 1. a custom template, handed to the template host for interpolation
//! 2. a content expression, a closure over the record and provided context
//! 3. the column's field
//!
//! A column with none of these renders empty cells.

use std::fmt;
use std::sync::Arc;

use serde::{Deserialize, Serialize};

use super::record::Record;
use super::value::FieldValue;

/// Opaque bag of values available to closures and templates.
///
/// The engine never inspects its contents.
pub type ProvidedContext = serde_json::Map<String, serde_json::Value>;

/// Type alias for a key-extraction function.
pub type ExtractorFn = Arc<dyn Fn(&Record) -> FieldValue + Send + Sync>;

/// Type alias for a content expression.
pub type ExpressionFn = Arc<dyn Fn(&Record, &ProvidedContext) -> FieldValue + Send + Sync>;

/// Type alias for a per-record style function.
pub type RowStyleFn = Arc<dyn Fn(&Record, &ProvidedContext) -> String + Send + Sync>;

/// What a column is keyed on.
///
/// Field keys compare by name. Extractor keys compare by reference, so
/// requesting a sort with a clone of the same extractor toggles direction.
#[derive(Clone)]
pub enum SortKey {
    /// A field name, read with [`Record::read`].
    Field(String),
    /// A function computing the key from the record.
    Extractor(ExtractorFn),
}

impl SortKey {
    /// Creates an extractor key from a closure.
    pub fn extractor<F>(f: F) -> Self
    where
        F: Fn(&Record) -> FieldValue + Send + Sync + 'static,
    {
        SortKey::Extractor(Arc::new(f))
    }

    /// Extracts the key value from a record.
    pub fn extract(&self, record: &Record) -> FieldValue {
        match self {
            SortKey::Field(name) => record.read(name),
            SortKey::Extractor(f) => f(record).resolve(),
        }
    }

    /// The field name, for field keys.
    pub fn field_name(&self) -> Option<&str> {
        match self {
            SortKey::Field(name) => Some(name.as_str()),
            SortKey::Extractor(_) => None,
        }
    }
}

impl PartialEq for SortKey {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (SortKey::Field(a), SortKey::Field(b)) => a == b,
            (SortKey::Extractor(a), SortKey::Extractor(b)) => Arc::ptr_eq(a, b),
            _ => false,
        }
    }
}

impl fmt::Debug for SortKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SortKey::Field(name) => f.debug_tuple("Field").field(name).finish(),
            SortKey::Extractor(_) => write!(f, "Extractor(..)"),
        }
    }
}

impl From<&str> for SortKey {
    fn from(name: &str) -> Self {
        SortKey::Field(name.to_string())
    }
}

impl From<String> for SortKey {
    fn from(name: String) -> Self {
        SortKey::Field(name)
    }
}

/// Per-cell style hook.
#[derive(Clone)]
pub enum RowStyle {
    /// Used verbatim.
    Static(String),
    /// Computed per record.
    Computed(RowStyleFn),
}

impl RowStyle {
    /// Resolves the style for a record.
    pub fn resolve(&self, record: &Record, context: &ProvidedContext) -> String {
        match self {
            RowStyle::Static(s) => s.clone(),
            RowStyle::Computed(f) => f(record, context),
        }
    }
}

impl fmt::Debug for RowStyle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RowStyle::Static(s) => f.debug_tuple("Static").field(s).finish(),
            RowStyle::Computed(_) => write!(f, "Computed(..)"),
        }
    }
}

/// The content source selected for a column.
#[derive(Clone, Copy)]
pub enum ContentSource<'a> {
    /// Raw template with embedded bindings.
    Template(&'a str),
    /// Closure over record and provided context.
    Expression(&'a ExpressionFn),
    /// The column's field key.
    Field(&'a SortKey),
    /// Nothing configured.
    Empty,
}

/// Description of one rendered column.
///
/// # Example
///
/// ```
/// use lattice_grid::model::ColumnSpec;
///
/// let name = ColumnSpec::new(4).with_label("Name").with_field("name");
/// assert!(name.is_sortable());
/// assert_eq!(name.field_name(), Some("name"));
/// ```
#[derive(Clone)]
pub struct ColumnSpec {
    /// Grid-unit span. Must be positive.
    pub width: u32,
    /// Header label.
    pub label: Option<String>,
    /// Field the column reads and sorts on.
    pub field: Option<SortKey>,
    /// Header cell style hook.
    pub header_style: Option<String>,
    /// Content cell style hook.
    pub row_style: Option<RowStyle>,
    /// Pass the resolved value through date formatting.
    pub is_date: bool,
    /// Content expression.
    pub content_expression: Option<ExpressionFn>,
    /// Template with embedded bindings. Takes precedence over everything else.
    pub custom_content: Option<String>,
}

impl ColumnSpec {
    /// Creates a column spanning `width` grid units.
    pub fn new(width: u32) -> Self {
        Self {
            width,
            label: None,
            field: None,
            header_style: None,
            row_style: None,
            is_date: false,
            content_expression: None,
            custom_content: None,
        }
    }

    /// Sets the header label.
    pub fn with_label(mut self, label: impl Into<String>) -> Self {
        self.label = Some(label.into());
        self
    }

    /// Keys the column on a field name.
    pub fn with_field(mut self, field: impl Into<String>) -> Self {
        self.field = Some(SortKey::Field(field.into()));
        self
    }

    /// Keys the column on an extraction function.
    ///
    /// Extractors only drive sorting; such a column also needs an expression
    /// or custom content to have something to display.
    pub fn with_extractor<F>(mut self, f: F) -> Self
    where
        F: Fn(&Record) -> FieldValue + Send + Sync + 'static,
    {
        self.field = Some(SortKey::extractor(f));
        self
    }

    /// Sets the header style hook.
    pub fn with_header_style(mut self, style: impl Into<String>) -> Self {
        self.header_style = Some(style.into());
        self
    }

    /// Sets a static content cell style.
    pub fn with_row_style(mut self, style: impl Into<String>) -> Self {
        self.row_style = Some(RowStyle::Static(style.into()));
        self
    }

    /// Sets a per-record content cell style.
    pub fn with_row_style_fn<F>(mut self, f: F) -> Self
    where
        F: Fn(&Record, &ProvidedContext) -> String + Send + Sync + 'static,
    {
        self.row_style = Some(RowStyle::Computed(Arc::new(f)));
        self
    }

    /// Marks the column as holding dates.
    pub fn with_date(mut self, is_date: bool) -> Self {
        self.is_date = is_date;
        self
    }

    /// Sets the content expression.
    pub fn with_expression<F>(mut self, f: F) -> Self
    where
        F: Fn(&Record, &ProvidedContext) -> FieldValue + Send + Sync + 'static,
    {
        self.content_expression = Some(Arc::new(f));
        self
    }

    /// Sets a custom content template.
    pub fn with_custom_content(mut self, template: impl Into<String>) -> Self {
        self.custom_content = Some(template.into());
        self
    }

    /// The content source, by priority.
    pub fn content_source(&self) -> ContentSource<'_> {
        if let Some(template) = &self.custom_content {
            ContentSource::Template(template)
        } else if let Some(expression) = &self.content_expression {
            ContentSource::Expression(expression)
        } else if let Some(field) = &self.field {
            ContentSource::Field(field)
        } else {
            ContentSource::Empty
        }
    }

    /// The field name, when keyed on a field name.
    pub fn field_name(&self) -> Option<&str> {
        self.field.as_ref().and_then(SortKey::field_name)
    }

    /// Whether a sort can be requested on this column.
    pub fn is_sortable(&self) -> bool {
        self.field.is_some()
    }

    /// Whether the column is keyed on an extractor with nothing to display.
    pub(crate) fn renders_extractor(&self) -> bool {
        matches!(
            self.content_source(),
            ContentSource::Field(SortKey::Extractor(_))
        )
    }
}

impl fmt::Debug for ColumnSpec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ColumnSpec")
            .field("width", &self.width)
            .field("label", &self.label)
            .field("field", &self.field)
            .field("header_style", &self.header_style)
            .field("row_style", &self.row_style)
            .field("is_date", &self.is_date)
            .field("content_expression", &self.content_expression.is_some())
            .field("custom_content", &self.custom_content)
            .finish()
    }
}

/// Declarative column definition, loadable from configuration files.
///
/// Closures cannot be expressed in a file; attach them to the converted
/// [`ColumnSpec`] with its builder methods.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct ColumnDef {
    /// Grid-unit span.
    pub width: u32,
    /// Header label.
    pub label: Option<String>,
    /// Field name.
    pub field: Option<String>,
    /// Header cell style hook.
    pub header_style: Option<String>,
    /// Static content cell style.
    pub row_style: Option<String>,
    /// Date column flag.
    pub is_date: bool,
    /// Custom content template.
    pub custom_content: Option<String>,
}

impl From<ColumnDef> for ColumnSpec {
    fn from(def: ColumnDef) -> Self {
        ColumnSpec {
            width: def.width,
            label: def.label,
            field: def.field.map(SortKey::Field),
            header_style: def.header_style,
            row_style: def.row_style.map(RowStyle::Static),
            is_date: def.is_date,
            content_expression: None,
            custom_content: def.custom_content,
        }
    }
}
