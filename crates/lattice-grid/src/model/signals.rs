//! Change notifications emitted by a grid.

use lattice_grid_core::Signal;

use super::record::RowKey;
use super::sort::SortState;

/// Collection of signals emitted by a [`DataGrid`](crate::DataGrid).
///
/// Every signal fires synchronously, after the state change it reports has
/// completed, so a slot always observes the new rows.
///
/// # Signal Usage
///
/// - **Full content rebuild**: `layout_about_to_change`, then `layout_changed`
///   with the new row count
/// - **In-place field patch**: `rows_patched` with the identities re-rendered
/// - **User interaction**: `sort_changed`, `search_changed`
/// - **Owner replaced the source list**: `source_replaced`
pub struct GridSignals {
    /// Emitted before content rows are rebuilt.
    pub layout_about_to_change: Signal<()>,

    /// Emitted after content rows were rebuilt.
    /// Args: number of rendered rows
    pub layout_changed: Signal<usize>,

    /// Emitted after watched fields were patched and their rows re-rendered.
    /// Args: identities of the re-rendered rows
    pub rows_patched: Signal<Vec<RowKey>>,

    /// Emitted after the sort state changed.
    pub sort_changed: Signal<SortState>,

    /// Emitted after the search term changed.
    pub search_changed: Signal<String>,

    /// Emitted after the owner handed the grid a different source list.
    pub source_replaced: Signal<()>,
}

impl Default for GridSignals {
    fn default() -> Self {
        Self::new()
    }
}

impl GridSignals {
    /// Creates a new set of grid signals.
    pub fn new() -> Self {
        Self {
            layout_about_to_change: Signal::new(),
            layout_changed: Signal::new(),
            rows_patched: Signal::new(),
            sort_changed: Signal::new(),
            search_changed: Signal::new(),
            source_replaced: Signal::new(),
        }
    }

    /// Emits signals for a content rebuild.
    ///
    /// Calls the provided function between the about-to-change and changed
    /// signals; it returns the new row count.
    pub fn emit_layout_changed<F>(&self, change_fn: F)
    where
        F: FnOnce() -> usize,
    {
        self.layout_about_to_change.emit(());
        let rows = change_fn();
        self.layout_changed.emit(rows);
    }
}
