//! Core systems for Lattice Grid.
//!
//! This crate provides the reactive plumbing the grid engine is built on:
//!
//! - **Signal/Slot System**: Synchronous, type-safe change notification
//! - **Property System**: Change-detecting value cells
//! - **Logging**: `tracing` targets, span names and performance spans
//!
//! Everything here runs on the caller's thread. Emitting a signal invokes every
//! connected slot before `emit` returns, which is the ordering guarantee the
//! grid's reconciliation relies on.
//!
//! # Signal/Slot Example
//!
//! ```
//! use lattice_grid_core::Signal;
//!
//! let rows_changed = Signal::<usize>::new();
//!
//! let conn_id = rows_changed.connect(|count| {
//!     println!("Grid now shows {} rows", count);
//! });
//!
//! rows_changed.emit(42);
//! rows_changed.disconnect(conn_id);
//! ```
//!
//! # Property Example
//!
//! ```
//! use lattice_grid_core::{Property, Signal};
//!
//! struct SearchBox {
//!     term: Property<String>,
//!     term_changed: Signal<String>,
//! }
//!
//! impl SearchBox {
//!     fn set_term(&self, term: &str) {
//!         if self.term.set(term.to_string()) {
//!             self.term_changed.emit(term.to_string());
//!         }
//!     }
//! }
//! ```

mod error;
pub mod logging;
pub mod property;
pub mod signal;

pub use error::{CoreError, Result, SignalError};
pub use logging::PerfSpan;
pub use property::Property;
pub use signal::{ConnectionGuard, ConnectionId, Signal};
