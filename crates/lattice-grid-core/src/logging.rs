//! Logging facilities for Lattice Grid.
//!
//! Lattice Grid uses the `tracing` crate for instrumentation. To see logs,
//! install a tracing subscriber in your application:
//!
//! ```ignore
//! fn main() {
//!     tracing_subscriber::fmt()
//!         .with_env_filter("lattice_grid::reconcile=debug")
//!         .init();
//! }
//! ```
//!
//! Every subsystem logs under one of the [`targets`], so a filter directive
//! can isolate, for example, reconciliation decisions from render traffic.

/// Span names used throughout Lattice Grid for tracing.
pub mod span_names {
    /// View pipeline recompute span.
    pub const RECOMPUTE: &str = "lattice_grid::recompute";
    /// Reconciliation pass span.
    pub const RECONCILE: &str = "lattice_grid::reconcile";
    /// Row rendering span.
    pub const RENDER: &str = "lattice_grid::render";
}

/// Target names for log filtering.
pub mod targets {
    /// Core crate target.
    pub const CORE: &str = "lattice_grid_core";
    /// Signal/slot system target.
    pub const SIGNAL: &str = "lattice_grid_core::signal";
    /// Sort/filter/cap pipeline target.
    pub const PIPELINE: &str = "lattice_grid::pipeline";
    /// Reconciler target.
    pub const RECONCILE: &str = "lattice_grid::reconcile";
    /// Renderer target.
    pub const RENDER: &str = "lattice_grid::render";
    /// Row action dispatch target.
    pub const ACTIONS: &str = "lattice_grid::actions";
    /// Configuration loading and validation target.
    pub const CONFIG: &str = "lattice_grid::config";
    /// Performance span target.
    pub const PERF: &str = "lattice_grid::perf";
}

/// A guard for timing a block of work.
///
/// The span is entered on creation and exited when the guard drops. With a
/// subscriber that records span timings (`FmtSpan::CLOSE`, for instance) this
/// reports how long each recompute or reconcile pass took.
///
/// ```
/// use lattice_grid_core::PerfSpan;
///
/// {
///     let _span = PerfSpan::new("recompute");
///     // work
/// }
/// ```
pub struct PerfSpan {
    _span: tracing::span::EnteredSpan,
}

impl PerfSpan {
    /// Create a new performance span.
    pub fn new(name: &'static str) -> Self {
        let span = tracing::info_span!(target: targets::PERF, "perf", operation = name);
        Self {
            _span: span.entered(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_perf_span() {
        let _span = PerfSpan::new("test_operation");
    }

    #[test]
    fn test_targets_are_scoped() {
        for target in [
            targets::PIPELINE,
            targets::RECONCILE,
            targets::RENDER,
            targets::ACTIONS,
            targets::CONFIG,
        ] {
            assert!(target.starts_with("lattice_grid::"));
        }
    }
}
