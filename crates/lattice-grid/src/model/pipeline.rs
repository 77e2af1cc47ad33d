//! The cap, search and sort pipeline producing the internal list.

use super::filter::{FilterEngine, FilterState};
use super::record::RecordHandle;
use super::sort::{SortEngine, SortState};
use lattice_grid_core::logging::{span_names, targets};

/// Output of a full pipeline pass.
#[derive(Debug, Clone, Default)]
pub struct PipelineOutput {
    /// The capped candidate pool before search, in source order.
    pub candidates: Vec<RecordHandle>,
    /// The rows to render: candidates after search and sort.
    pub visible: Vec<RecordHandle>,
}

/// Derives the internal list from the working source.
///
/// Operations run in a fixed order: cap, then search, then sort. The cap is
/// always taken from the source, so repeated recomputes never compound it.
///
/// # Example
///
/// ```
/// use lattice_grid::model::{FilterState, Record, RecordHandle, SortState, ViewPipeline};
///
/// let rows: Vec<RecordHandle> = ["Cy", "Ann", "Bo"]
///     .into_iter()
///     .map(|name| RecordHandle::new(Record::new().with("name", name)))
///     .collect();
///
/// let pipeline = ViewPipeline::new(Some(2), false);
/// let visible = pipeline.recompute(&rows, &FilterState::default(), &SortState::by("name"));
/// let names: Vec<String> = visible.iter().map(|h| h.get("name").to_display_string()).collect();
/// assert_eq!(names, vec!["Ann", "Cy"]);
/// ```
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ViewPipeline {
    cap: Option<usize>,
    search_enabled: bool,
}

impl ViewPipeline {
    /// Creates a pipeline with an optional cap.
    ///
    /// When `search_enabled` is false the search term is ignored.
    pub fn new(cap: Option<usize>, search_enabled: bool) -> Self {
        Self {
            cap,
            search_enabled,
        }
    }

    /// The configured cap.
    pub fn cap(&self) -> Option<usize> {
        self.cap
    }

    /// Whether search is applied.
    pub fn search_enabled(&self) -> bool {
        self.search_enabled
    }

    /// Whether the pipeline can produce anything other than the source
    /// itself, in order, given `sort`.
    pub fn is_active(&self, sort: &SortState) -> bool {
        self.cap.is_some() || self.search_enabled || sort.is_active()
    }

    /// Recomputes the visible rows from `source`.
    pub fn recompute(
        &self,
        source: &[RecordHandle],
        filter: &FilterState,
        sort: &SortState,
    ) -> Vec<RecordHandle> {
        self.rebuild(source, filter, sort).visible
    }

    /// Recomputes the visible rows, also returning the candidate pool.
    ///
    /// The candidate pool is what an empty search term yields: every capped
    /// record regardless of the current search text. An empty term matches
    /// everything, so the capped list is used as is. After a
    /// membership change this is the set the reconciler must know about.
    #[tracing::instrument(
        name = "recompute",
        skip_all,
        target = "lattice_grid::pipeline",
        level = "debug",
        fields(source = source.len())
    )]
    pub fn rebuild(
        &self,
        source: &[RecordHandle],
        filter: &FilterState,
        sort: &SortState,
    ) -> PipelineOutput {
        let _span = lattice_grid_core::PerfSpan::new(span_names::RECOMPUTE);

        let candidates = FilterEngine::apply_cap(source, self.cap);

        let searched = if self.search_enabled {
            FilterEngine::apply_search(&candidates, &filter.search_term)
        } else {
            candidates.clone()
        };
        let visible = SortEngine::apply_sort(&searched, sort);

        tracing::debug!(
            target: targets::PIPELINE,
            candidates = candidates.len(),
            visible = visible.len(),
            "pipeline recomputed"
        );
        PipelineOutput {
            candidates,
            visible,
        }
    }
}
