//! Turning the internal list into rendered rows.
//!
//! [`GridRenderer`] resolves every cell through the [`ContentResolver`] and
//! hands the resulting descriptors to a [`TemplateHost`]. It owns no rows;
//! the grid decides when the header, all content rows, or single rows are
//! rendered again.

use crate::actions::RowAction;
use crate::config::GridConfig;
use crate::content::ContentResolver;
use crate::host::{BindingContext, TemplateHost};
use crate::model::{RecordHandle, RowKey, SortState};
use lattice_grid_core::PerfSpan;
use lattice_grid_core::logging::{span_names, targets};

/// Direction marker shown on a header cell.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum SortIndicator {
    #[default]
    None,
    Ascending,
    Descending,
}

/// One header cell.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HeaderCell {
    pub label: String,
    pub width: u32,
    pub style: String,
    /// Whether activating the cell requests a sort.
    pub sortable: bool,
    pub sort: SortIndicator,
}

/// The header row.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct HeaderRow {
    pub title: Option<String>,
    pub style: String,
    pub cells: Vec<HeaderCell>,
    /// Whether the add affordance is shown.
    pub can_add: bool,
    /// Whether the search input is shown.
    pub search_enabled: bool,
}

/// One rendered content cell.
#[derive(Debug, Clone, PartialEq)]
pub struct RenderedCell<N> {
    pub node: N,
    pub width: u32,
    pub style: String,
}

/// One rendered content row.
///
/// The identity is carried on the row itself, so an action fired from the
/// row can be routed without looking at the rendered output.
#[derive(Debug, Clone, PartialEq)]
pub struct RenderedRow<N> {
    pub key: Option<RowKey>,
    pub style: String,
    pub cells: Vec<RenderedCell<N>>,
    pub actions: Vec<RowAction>,
}

/// Renders header and content rows through a template host.
#[derive(Debug)]
pub struct GridRenderer<H> {
    host: H,
    resolver: ContentResolver,
}

impl<H: TemplateHost> GridRenderer<H> {
    /// Creates a renderer.
    pub fn new(host: H, resolver: ContentResolver) -> Self {
        Self { host, resolver }
    }

    /// The template host.
    pub fn host(&self) -> &H {
        &self.host
    }

    /// The content resolver.
    pub fn resolver(&self) -> &ContentResolver {
        &self.resolver
    }

    /// Replaces the content resolver.
    pub fn set_resolver(&mut self, resolver: ContentResolver) {
        self.resolver = resolver;
    }

    /// Renders the header row.
    pub fn render_header(&self, config: &GridConfig, sort: &SortState) -> HeaderRow {
        let cells = config
            .columns()
            .iter()
            .map(|column| {
                let sort = match &column.field {
                    Some(key) if sort.is_sorted_by(key) => {
                        if sort.descending {
                            SortIndicator::Descending
                        } else {
                            SortIndicator::Ascending
                        }
                    }
                    _ => SortIndicator::None,
                };
                HeaderCell {
                    label: column.label.clone().unwrap_or_default(),
                    width: column.width,
                    style: column.header_style.clone().unwrap_or_default(),
                    sortable: config.sorting_enabled() && column.is_sortable(),
                    sort,
                }
            })
            .collect();

        HeaderRow {
            title: config.title().map(str::to_string),
            style: config.header_row_style().unwrap_or_default().to_string(),
            cells,
            can_add: config.callbacks().on_add.is_some(),
            search_enabled: config.search_enabled(),
        }
    }

    /// Renders one content row.
    pub fn render_row(&self, row: &RecordHandle, config: &GridConfig) -> RenderedRow<H::Node> {
        let record = row.read();
        let key = record.key(config.identity_field());
        let context = config.provided_context();
        let binding = BindingContext {
            record: &record,
            context,
            row_key: key.as_ref(),
        };

        let cells = config
            .columns()
            .iter()
            .map(|column| {
                let descriptor = self.resolver.resolve(&record, column, context);
                RenderedCell {
                    node: self.host.render(&descriptor, &binding),
                    width: column.width,
                    style: self.resolver.row_style(&record, column, context),
                }
            })
            .collect();

        RenderedRow {
            style: config.content_row_style().unwrap_or_default().to_string(),
            cells,
            actions: config.callbacks().row_actions(),
            key,
        }
    }

    /// Renders every content row, in internal list order.
    #[tracing::instrument(
        name = "render",
        skip_all,
        target = "lattice_grid::render",
        level = "debug",
        fields(rows = rows.len())
    )]
    pub fn render_rows(&self, rows: &[RecordHandle], config: &GridConfig) -> Vec<RenderedRow<H::Node>> {
        let _span = PerfSpan::new(span_names::RENDER);
        let rendered: Vec<_> = rows.iter().map(|row| self.render_row(row, config)).collect();
        tracing::trace!(target: targets::RENDER, rows = rendered.len(), "content rows rendered");
        rendered
    }
}
