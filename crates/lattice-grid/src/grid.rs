//! The grid instance tying configuration, source list and rendering together.

use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

use crate::actions::{RowAction, RowActionDispatcher};
use crate::config::GridConfig;
use crate::content::ContentResolver;
use crate::error::Result;
use crate::format::DateFormatter;
use crate::host::{TemplateHost, TextTemplateHost};
use crate::model::{
    FilterState, GridSignals, RecordHandle, Reconciler, Reconciliation, RowKey, SortEngine, SortKey,
    SortState, SourceList, ViewPipeline,
};
use crate::render::{GridRenderer, HeaderRow, RenderedRow};
use lattice_grid_core::Property;
use lattice_grid_core::logging::targets;

/// A configuration-driven grid over an owner's source list.
///
/// All state is owned by the instance. Nothing runs in the background: the
/// owner calls [`tick`](Self::tick) whenever the source list may have
/// changed, and every call completes its rebuild or patch before returning.
///
/// # Example
///
/// ```
/// use lattice_grid::{DataGrid, GridConfig, Reconciliation, TextTemplateHost};
/// use lattice_grid::model::{ColumnSpec, Record, RowKey, SourceList};
///
/// let source = SourceList::shared(vec![
///     Record::new().with("id", 1).with("name", "Ann").with("age", 30),
///     Record::new().with("id", 2).with("name", "Bo").with("age", 25),
/// ]);
/// let config = GridConfig::new()
///     .with_sorting(true)
///     .with_column(ColumnSpec::new(4).with_field("name"))
///     .with_column(ColumnSpec::new(2).with_field("age"));
///
/// let mut grid = DataGrid::new(config, source.clone(), TextTemplateHost).unwrap();
/// grid.request_sort_key("age");
/// assert_eq!(grid.rows()[0].cells[0].node, "Bo");
///
/// source.find("id", &RowKey::Int(2)).unwrap().set("name", "Bea");
/// assert_eq!(grid.tick(), Reconciliation::Patched(vec![RowKey::Int(2)]));
/// assert_eq!(grid.rows()[0].cells[0].node, "Bea");
/// ```
pub struct DataGrid<H: TemplateHost = TextTemplateHost> {
    config: GridConfig,
    source: Arc<SourceList>,
    renderer: GridRenderer<H>,
    formatter: Option<Arc<dyn DateFormatter>>,
    reconciler: Reconciler,
    pipeline: ViewPipeline,
    sort: Property<SortState>,
    filter: Property<FilterState>,
    internal: Vec<RecordHandle>,
    row_index: HashMap<RowKey, usize>,
    header: HeaderRow,
    rows: Vec<RenderedRow<H::Node>>,
    dispatcher: RowActionDispatcher,
    signals: GridSignals,
}

impl<H: TemplateHost> DataGrid<H> {
    /// Creates a grid and renders it.
    ///
    /// # Errors
    ///
    /// Returns the error from [`GridConfig::validate`] for an invalid
    /// configuration.
    pub fn new(config: GridConfig, source: Arc<SourceList>, host: H) -> Result<Self> {
        config.validate()?;

        let mut grid = Self {
            renderer: GridRenderer::new(host, Self::resolver_for(&config, None)),
            formatter: None,
            reconciler: Self::reconciler_for(&config),
            pipeline: ViewPipeline::new(config.max_items(), config.search_enabled()),
            sort: Property::new(config.initial_sort_state()),
            filter: Property::default(),
            internal: Vec::new(),
            row_index: HashMap::new(),
            header: HeaderRow::default(),
            rows: Vec::new(),
            dispatcher: RowActionDispatcher::new(config.callbacks().clone()),
            signals: GridSignals::new(),
            source,
            config,
        };

        tracing::debug!(
            target: targets::CONFIG,
            columns = grid.config.columns().len(),
            mirror = grid.reconciler.is_mirror(),
            "grid created"
        );
        grid.render_header();
        grid.rebuild();
        Ok(grid)
    }

    /// Replaces the date formatter and re-renders content rows.
    pub fn with_date_formatter(mut self, formatter: Arc<dyn DateFormatter>) -> Self {
        self.formatter = Some(formatter);
        self.renderer
            .set_resolver(Self::resolver_for(&self.config, self.formatter.clone()));
        self.render_content();
        self
    }

    // =========================================================================
    // Accessors
    // =========================================================================

    pub fn config(&self) -> &GridConfig {
        &self.config
    }

    pub fn source(&self) -> &Arc<SourceList> {
        &self.source
    }

    pub fn signals(&self) -> &GridSignals {
        &self.signals
    }

    pub fn header(&self) -> &HeaderRow {
        &self.header
    }

    /// Rendered content rows, in internal list order.
    pub fn rows(&self) -> &[RenderedRow<H::Node>] {
        &self.rows
    }

    /// The rendered row with identity `key`.
    pub fn row(&self, key: &RowKey) -> Option<&RenderedRow<H::Node>> {
        self.row_index.get(key).and_then(|&i| self.rows.get(i))
    }

    /// The records currently rendered, in display order.
    pub fn internal_list(&self) -> &[RecordHandle] {
        &self.internal
    }

    pub fn sort_state(&self) -> SortState {
        self.sort.get()
    }

    pub fn search_term(&self) -> String {
        self.filter.with(|f| f.search_term.clone())
    }

    // =========================================================================
    // Owner-driven changes
    // =========================================================================

    /// Replaces the source list and rebuilds content rows.
    pub fn set_source(&mut self, source: Arc<SourceList>) {
        self.source = source;
        self.rebuild();
        self.signals.source_replaced.emit(());
    }

    /// Replaces the configuration and re-renders everything.
    ///
    /// Sort and search state restart from the new configuration's defaults.
    ///
    /// # Errors
    ///
    /// Returns the validation error and keeps the current configuration when
    /// `config` is invalid.
    pub fn set_config(&mut self, config: GridConfig) -> Result<()> {
        config.validate()?;

        self.renderer
            .set_resolver(Self::resolver_for(&config, self.formatter.clone()));
        self.reconciler = Self::reconciler_for(&config);
        self.pipeline = ViewPipeline::new(config.max_items(), config.search_enabled());
        self.sort.set_silent(config.initial_sort_state());
        self.filter.set_silent(FilterState::default());
        self.dispatcher.set_callbacks(config.callbacks().clone());
        self.config = config;

        tracing::debug!(target: targets::CONFIG, "configuration replaced");
        self.render_header();
        self.rebuild();
        Ok(())
    }

    /// Runs one reconciliation pass against the source list.
    ///
    /// Field changes on watched fields re-render only the affected rows.
    /// Membership changes rebuild the internal list and every content row.
    /// Calling this when nothing changed does nothing.
    pub fn tick(&mut self) -> Reconciliation {
        let outcome = self.reconciler.observe(&self.source);
        match &outcome {
            Reconciliation::Unchanged => {}
            Reconciliation::MembershipChanged => self.rebuild(),
            Reconciliation::Patched(keys) => self.rerender_rows(keys),
        }
        outcome
    }

    // =========================================================================
    // User-driven changes
    // =========================================================================

    /// Requests a sort on the column at `index`.
    ///
    /// Does nothing, returning `false`, when sorting is disabled or the
    /// column has no field.
    pub fn request_sort(&mut self, index: usize) -> bool {
        let Some(key) = self.config.columns().get(index).and_then(|c| c.field.clone()) else {
            tracing::warn!(target: targets::PIPELINE, index, "sort requested on a column without a field");
            return false;
        };
        self.request_sort_key(key)
    }

    /// Requests a sort on `key`: toggles direction when already sorted on
    /// it, otherwise sorts ascending.
    pub fn request_sort_key(&mut self, key: impl Into<SortKey>) -> bool {
        if !self.config.sorting_enabled() {
            tracing::debug!(target: targets::PIPELINE, "sorting disabled; request ignored");
            return false;
        }

        let next = SortEngine::request_sort(&key.into(), &self.sort.get());
        self.sort.set(next.clone());
        self.recompute();
        self.render_header();
        self.signals.sort_changed.emit(next);
        true
    }

    /// Sets the search term, recomputing rows when it changed.
    pub fn set_search_term(&mut self, term: impl Into<String>) {
        let term = term.into();
        if !self.filter.set(FilterState::new(term.clone())) {
            return;
        }
        if self.config.search_enabled() {
            self.recompute();
        }
        self.signals.search_changed.emit(term);
    }

    /// Fires a row action.
    ///
    /// The callback receives the grid's working copy of the row, which is the
    /// same handle across field patches.
    pub fn dispatch(&self, action: RowAction, row: Option<&RowKey>) -> Result<()> {
        self.dispatcher.dispatch(action, row)
    }

    /// Fires a row action by name.
    pub fn dispatch_named(&self, action: &str, row: Option<&RowKey>) -> Result<()> {
        self.dispatcher.dispatch_named(action, row)
    }

    // =========================================================================
    // Internals
    // =========================================================================

    fn resolver_for(config: &GridConfig, formatter: Option<Arc<dyn DateFormatter>>) -> ContentResolver {
        let resolver = ContentResolver::new(config.date_format());
        match formatter {
            Some(formatter) => resolver.with_formatter(formatter),
            None => resolver,
        }
    }

    fn reconciler_for(config: &GridConfig) -> Reconciler {
        Reconciler::new(config.identity_field(), config.watch_set(), config.is_mirror())
    }

    /// Rebuilds working copies and the internal list from the source.
    fn rebuild(&mut self) {
        let working = self.reconciler.rebuild(&self.source).to_vec();
        let output = self
            .pipeline
            .rebuild(&working, &self.filter.get(), &self.sort.get());
        self.set_internal(output.visible);
    }

    /// Re-derives the internal list from the current working copies.
    fn recompute(&mut self) {
        let visible = self.pipeline.recompute(
            self.reconciler.working(),
            &self.filter.get(),
            &self.sort.get(),
        );
        self.set_internal(visible);
    }

    fn set_internal(&mut self, internal: Vec<RecordHandle>) {
        let identity = self.config.identity_field();
        self.row_index.clear();
        for (i, row) in internal.iter().enumerate() {
            if let Some(key) = row.key(identity) {
                self.row_index.entry(key).or_insert(i);
            }
        }
        self.dispatcher.bind(&internal, identity);
        self.internal = internal;
        self.render_content();
    }

    fn render_header(&mut self) {
        self.header = self.renderer.render_header(&self.config, &self.sort.get());
    }

    fn render_content(&mut self) {
        let rows = self.renderer.render_rows(&self.internal, &self.config);
        self.signals.emit_layout_changed(|| {
            self.rows = rows;
            self.rows.len()
        });
    }

    fn rerender_rows(&mut self, keys: &[RowKey]) {
        let mut rendered = Vec::with_capacity(keys.len());
        for key in keys {
            let Some(&index) = self.row_index.get(key) else {
                continue;
            };
            if let (Some(row), Some(slot)) = (self.internal.get(index), self.rows.get_mut(index)) {
                *slot = self.renderer.render_row(row, &self.config);
                rendered.push(key.clone());
            }
        }
        tracing::debug!(
            target: targets::RENDER,
            patched = keys.len(),
            rendered = rendered.len(),
            "re-rendered patched rows"
        );
        if !rendered.is_empty() {
            self.signals.rows_patched.emit(rendered);
        }
    }
}

impl<H: TemplateHost> fmt::Debug for DataGrid<H> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DataGrid")
            .field("config", &self.config)
            .field("source", &self.source)
            .field("sort", &self.sort)
            .field("filter", &self.filter)
            .field("rows", &self.rows.len())
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{ColumnSpec, Record};
    use parking_lot::Mutex;

    fn people() -> Arc<SourceList> {
        SourceList::shared(vec![
            Record::new().with("id", 1).with("name", "Ann").with("age", 30),
            Record::new().with("id", 2).with("name", "Bo").with("age", 25),
        ])
    }

    fn columns() -> GridConfig {
        GridConfig::new()
            .with_column(ColumnSpec::new(4).with_label("Name").with_field("name"))
            .with_column(ColumnSpec::new(2).with_label("Age").with_field("age"))
    }

    fn names<H: TemplateHost<Node = String>>(grid: &DataGrid<H>) -> Vec<String> {
        grid.rows().iter().map(|r| r.cells[0].node.clone()).collect()
    }

    #[test]
    fn test_invalid_config_rejected() {
        let result = DataGrid::new(GridConfig::new(), people(), TextTemplateHost);
        assert!(result.is_err());
    }

    #[test]
    fn test_mirror_mode_aliases_source() {
        let source = people();
        let grid = DataGrid::new(columns(), source.clone(), TextTemplateHost).unwrap();
        assert_eq!(names(&grid), vec!["Ann", "Bo"]);
        for (row, handle) in grid.internal_list().iter().zip(source.handles()) {
            assert!(RecordHandle::ptr_eq(row, &handle));
        }
    }

    #[test]
    fn test_sort_toggle() {
        let mut grid = DataGrid::new(columns().with_sorting(true), people(), TextTemplateHost).unwrap();
        assert!(grid.request_sort(1));
        assert_eq!(names(&grid), vec!["Bo", "Ann"]);
        assert!(grid.request_sort(1));
        assert_eq!(names(&grid), vec!["Ann", "Bo"]);
        assert!(grid.sort_state().descending);
        assert!(!grid.request_sort(7));
    }

    #[test]
    fn test_sort_ignored_when_disabled() {
        let mut grid = DataGrid::new(columns(), people(), TextTemplateHost).unwrap();
        assert!(!grid.request_sort(1));
        assert_eq!(grid.sort_state(), SortState::default());
    }

    #[test]
    fn test_initial_sort_applies_without_sorting_enabled() {
        let config = columns().with_initial_sort("age", false);
        let grid = DataGrid::new(config, people(), TextTemplateHost).unwrap();
        assert_eq!(names(&grid), vec!["Bo", "Ann"]);
    }

    #[test]
    fn test_search() {
        let mut grid = DataGrid::new(columns().with_search(true), people(), TextTemplateHost).unwrap();
        grid.set_search_term("an");
        assert_eq!(names(&grid), vec!["Ann"]);
        grid.set_search_term("");
        assert_eq!(names(&grid), vec!["Ann", "Bo"]);
    }

    #[test]
    fn test_search_ignored_when_disabled() {
        let mut grid = DataGrid::new(columns(), people(), TextTemplateHost).unwrap();
        grid.set_search_term("an");
        assert_eq!(grid.search_term(), "an");
        assert_eq!(names(&grid), vec!["Ann", "Bo"]);
    }

    #[test]
    fn test_patch_rerenders_only_changed_rows() {
        let source = people();
        let mut grid = DataGrid::new(columns().with_sorting(true), source.clone(), TextTemplateHost).unwrap();
        let before = grid.internal_list().to_vec();

        let layouts = Arc::new(Mutex::new(0));
        let counter = layouts.clone();
        grid.signals().layout_changed.connect(move |_| *counter.lock() += 1);
        let patched = Arc::new(Mutex::new(Vec::new()));
        let sink = patched.clone();
        grid.signals().rows_patched.connect(move |keys| sink.lock().extend(keys.clone()));

        source.find("id", &RowKey::Int(1)).unwrap().set("name", "Anne");
        assert_eq!(grid.tick(), Reconciliation::Patched(vec![RowKey::Int(1)]));
        assert_eq!(names(&grid), vec!["Anne", "Bo"]);
        assert_eq!(*layouts.lock(), 0);
        assert_eq!(*patched.lock(), vec![RowKey::Int(1)]);
        assert!(RecordHandle::ptr_eq(&before[0], &grid.internal_list()[0]));

        assert_eq!(grid.tick(), Reconciliation::Unchanged);
    }

    #[test]
    fn test_membership_change_rebuilds() {
        let source = people();
        let mut grid = DataGrid::new(columns(), source.clone(), TextTemplateHost).unwrap();
        source.push(Record::new().with("id", 3).with("name", "Cy").with("age", 41));
        assert_eq!(grid.tick(), Reconciliation::MembershipChanged);
        assert_eq!(names(&grid), vec!["Ann", "Bo", "Cy"]);
        assert_eq!(grid.tick(), Reconciliation::Unchanged);
    }

    #[test]
    fn test_set_source_emits() {
        let mut grid = DataGrid::new(columns(), people(), TextTemplateHost).unwrap();
        let replaced = Arc::new(Mutex::new(false));
        let flag = replaced.clone();
        grid.signals().source_replaced.connect(move |_| *flag.lock() = true);

        grid.set_source(SourceList::shared(vec![Record::new().with("id", 9).with("name", "Zed")]));
        assert_eq!(names(&grid), vec!["Zed"]);
        assert!(*replaced.lock());
    }

    #[test]
    fn test_set_config() {
        let mut grid = DataGrid::new(columns(), people(), TextTemplateHost).unwrap();
        grid.set_config(columns().with_title("Renamed").with_initial_sort("age", true))
            .unwrap();
        assert_eq!(grid.header().title.as_deref(), Some("Renamed"));
        assert_eq!(names(&grid), vec!["Ann", "Bo"]);

        assert!(grid.set_config(GridConfig::new()).is_err());
        assert_eq!(grid.header().title.as_deref(), Some("Renamed"));
    }

    #[test]
    fn test_row_lookup_and_dispatch() {
        let seen = Arc::new(Mutex::new(None));
        let sink = seen.clone();
        let config = columns().on_delete(move |row| *sink.lock() = Some(row.clone()));
        let grid = DataGrid::new(config, people(), TextTemplateHost).unwrap();

        assert_eq!(grid.row(&RowKey::Int(2)).unwrap().cells[0].node, "Bo");
        grid.dispatch(RowAction::Delete, Some(&RowKey::Int(2))).unwrap();
        let row = seen.lock().clone().unwrap();
        assert!(RecordHandle::ptr_eq(&row, &grid.internal_list()[1]));
    }
}
