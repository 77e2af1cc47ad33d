//! Lattice Grid - a configuration-driven data grid engine.
//!
//! A grid renders a tabular view over a list of records owned by someone
//! else, driven entirely by declarative column descriptions. It provides:
//!
//! - **Columns**: content from a field, a closure, or a template, with date
//!   formatting and per-cell styles
//! - **Sorting**: single-column, stable, toggling direction on repeat
//! - **Search**: case-insensitive free text over every field
//! - **Cap**: a maximum number of candidate rows
//! - **Reconciliation**: watched field changes are patched into existing rows
//!   in place; membership changes rebuild the content rows
//! - **Row actions**: add, edit, delete and custom, routed by row identity
//!
//! Turning content into view nodes is left to a [`TemplateHost`];
//! [`TextTemplateHost`] renders plain strings.
//!
//! # Example
//!
//! ```
//! use lattice_grid::prelude::*;
//!
//! let source = SourceList::shared(vec![
//!     Record::new().with("id", 1).with("name", "Ann").with("age", 30),
//!     Record::new().with("id", 2).with("name", "Bo").with("age", 25),
//! ]);
//!
//! let config = GridConfig::new()
//!     .with_search(true)
//!     .with_column(ColumnSpec::new(4).with_label("Name").with_field("name"))
//!     .with_column(ColumnSpec::new(2).with_label("Age").with_field("age"));
//!
//! let mut grid = DataGrid::new(config, source, TextTemplateHost)?;
//! grid.set_search_term("an");
//! assert_eq!(grid.rows().len(), 1);
//! assert_eq!(grid.rows()[0].cells[0].node, "Ann");
//! # Ok::<(), lattice_grid::GridError>(())
//! ```
//!
//! # Logging
//!
//! Every subsystem logs through `tracing` under the targets in
//! [`lattice_grid_core::logging::targets`].

pub mod actions;
pub mod config;
pub mod content;
pub mod format;
pub mod grid;
pub mod host;
pub mod model;
pub mod render;

mod error;

pub use actions::{ActionCallbacks, RowAction, RowActionDispatcher};
pub use config::{GridConfig, GridOptions};
pub use content::ContentResolver;
pub use error::{GridError, Result};
pub use format::{ChronoDateFormatter, DateFormatter};
pub use grid::DataGrid;
pub use host::{BindingContext, ContentDescriptor, TemplateHost, TextTemplateHost};
pub use model::Reconciliation;
pub use render::{GridRenderer, HeaderCell, HeaderRow, RenderedCell, RenderedRow, SortIndicator};

/// Prelude module with commonly used types.
pub mod prelude {
    pub use crate::actions::{ActionCallbacks, RowAction};
    pub use crate::config::{GridConfig, GridOptions};
    pub use crate::error::{GridError, Result};
    pub use crate::format::{ChronoDateFormatter, DateFormatter};
    pub use crate::grid::DataGrid;
    pub use crate::host::{ContentDescriptor, TemplateHost, TextTemplateHost};
    pub use crate::model::{
        ColumnSpec, FieldValue, ProvidedContext, Record, RecordHandle, Reconciliation, RowKey,
        SortKey, SortState, SourceList,
    };
    pub use crate::render::{HeaderRow, RenderedRow, SortIndicator};
}
