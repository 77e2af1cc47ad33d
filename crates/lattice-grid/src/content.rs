//! Per-cell content and style resolution.

use std::fmt;
use std::sync::Arc;

use crate::format::{ChronoDateFormatter, DEFAULT_DATE_FORMAT, DateFormatter};
use crate::host::ContentDescriptor;
use crate::model::{ColumnSpec, ContentSource, FieldValue, ProvidedContext, Record};

/// Decides what each cell shows.
///
/// The content source is chosen by priority: custom content, then the
/// content expression, then the column field. Custom content is handed to
/// the template host untouched. Expression and field values are passed
/// through the date formatter on date columns and otherwise shown as their
/// display string; a missing field renders empty.
///
/// # Example
///
/// ```
/// use lattice_grid::ContentResolver;
/// use lattice_grid::host::ContentDescriptor;
/// use lattice_grid::model::{ColumnSpec, ProvidedContext, Record};
///
/// let resolver = ContentResolver::default();
/// let record = Record::new().with("age", 30);
/// let column = ColumnSpec::new(1).with_field("age");
///
/// let content = resolver.resolve(&record, &column, &ProvidedContext::new());
/// assert_eq!(content, ContentDescriptor::Text("30".into()));
/// ```
#[derive(Clone)]
pub struct ContentResolver {
    date_format: String,
    formatter: Arc<dyn DateFormatter>,
}

impl Default for ContentResolver {
    fn default() -> Self {
        Self::new(DEFAULT_DATE_FORMAT)
    }
}

impl ContentResolver {
    /// Creates a resolver formatting dates with `date_format`.
    pub fn new(date_format: impl Into<String>) -> Self {
        Self {
            date_format: date_format.into(),
            formatter: Arc::new(ChronoDateFormatter),
        }
    }

    /// Replaces the date formatter.
    pub fn with_formatter(mut self, formatter: Arc<dyn DateFormatter>) -> Self {
        self.formatter = formatter;
        self
    }

    /// The date pattern.
    pub fn date_format(&self) -> &str {
        &self.date_format
    }

    /// Resolves the content of one cell.
    pub fn resolve(
        &self,
        record: &Record,
        column: &ColumnSpec,
        context: &ProvidedContext,
    ) -> ContentDescriptor {
        let value = match column.content_source() {
            ContentSource::Template(template) => {
                return ContentDescriptor::Template(template.to_string());
            }
            ContentSource::Expression(expression) => expression(record, context).resolve(),
            ContentSource::Field(key) => key.extract(record),
            ContentSource::Empty => FieldValue::None,
        };
        ContentDescriptor::Text(self.display(&value, column.is_date))
    }

    /// Resolves the style of one content cell.
    pub fn row_style(&self, record: &Record, column: &ColumnSpec, context: &ProvidedContext) -> String {
        column
            .row_style
            .as_ref()
            .map(|style| style.resolve(record, context))
            .unwrap_or_default()
    }

    fn display(&self, value: &FieldValue, is_date: bool) -> String {
        if value.is_none() {
            String::new()
        } else if is_date {
            self.formatter.format(value, &self.date_format)
        } else {
            value.to_display_string()
        }
    }
}

impl fmt::Debug for ContentResolver {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ContentResolver")
            .field("date_format", &self.date_format)
            .finish_non_exhaustive()
    }
}
