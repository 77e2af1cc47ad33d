//! Data model and view derivation for Lattice Grid.
//!
//! This module holds everything between the owner's records and the rows a
//! grid renders:
//!
//! - `FieldValue`, `Record`, `RecordHandle`: the record model
//! - `SourceList`: the owner's authoritative list
//! - `ColumnSpec`: declarative column description
//! - `SortEngine`, `FilterEngine`: single-purpose list transforms
//! - `ViewPipeline`: cap, search and sort composed into one pass
//! - `Reconciler`: field-level patching and membership detection
//! - `GridSignals`: notifications for views
//!
//! # Architecture Overview
//!
//! ```text
//! ┌─────────────┐  observe   ┌─────────────┐  working  ┌──────────────┐
//! │ SourceList  │──────────> │ Reconciler  │─────────> │ ViewPipeline │
//! │   (owner)   │            │ copies+diff │           │ cap→search→  │
//! └─────────────┘            └─────────────┘           │    sort      │
//!                                   │ patch            └──────────────┘
//!                                   v                         │ visible
//!                             ┌───────────┐                   v
//!                             │  rows_    │            ┌──────────────┐
//!                             │  patched  │            │ InternalList │
//!                             └───────────┘            └──────────────┘
//! ```

mod column;
mod filter;
mod pipeline;
mod reconcile;
mod record;
mod signals;
mod sort;
mod value;

pub use column::{
    ColumnDef, ColumnSpec, ContentSource, ExpressionFn, ExtractorFn, ProvidedContext, RowStyle,
    RowStyleFn, SortKey,
};
pub use filter::{FilterEngine, FilterState};
pub use pipeline::{PipelineOutput, ViewPipeline};
pub use reconcile::{Reconciler, Reconciliation};
pub use record::{Record, RecordHandle, RowKey, SourceList};
pub use signals::GridSignals;
pub use sort::{SortEngine, SortState};
pub use value::{compare_values, ComputedFn, FieldValue};
