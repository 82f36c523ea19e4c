use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use crate::aggregation::{bin_by, Bin, HistogramMetric};
use crate::error::FilterError;
use crate::predicate::FilterPredicate;
use crate::selection::{Selection, ValueRange};
use crate::view::{BrushEnd, PredicateChange, UpdateMode, ViewAdapter, ViewKind};
use crate::visible::VisibleSet;

/// Binned distribution of the visible events by magnitude or depth.
pub struct HistogramView {
    metric: HistogramMetric,
    data: VisibleSet,
    bins: Vec<Bin>,
    applied: Option<Selection>,
}

impl Default for HistogramView {
    fn default() -> Self {
        Self::new(HistogramMetric::default())
    }
}

impl HistogramView {
    pub fn new(metric: HistogramMetric) -> Self {
        let data = VisibleSet::default();
        let bins = bin_by(metric, data.iter());
        Self {
            metric,
            data,
            bins,
            applied: None,
        }
    }

    pub fn metric(&self) -> HistogramMetric {
        self.metric
    }

    /// Re-bin the current data under `metric`. Local only: the active
    /// predicate, if any, is left as is.
    pub fn set_metric(&mut self, metric: HistogramMetric) {
        if self.metric == metric {
            return;
        }
        self.metric = metric;
        self.rebin();
    }

    pub fn bins(&self) -> &[Bin] {
        &self.bins
    }

    /// Records that landed in some bin.
    pub fn classified(&self) -> usize {
        self.bins.iter().map(|b| b.count).sum()
    }

    pub fn data(&self) -> &VisibleSet {
        &self.data
    }

    pub fn applied(&self) -> Option<&Selection> {
        self.applied.as_ref()
    }

    /// Brush a single bar: selects the bar's range under the current metric.
    pub fn select_bin(&self, index: usize) -> Option<BrushEnd> {
        let bin = self.bins.get(index)?;
        let range = ValueRange::new(bin.range_start, bin.range_end)?;
        let selection = match self.metric {
            HistogramMetric::Magnitude => Selection::Magnitude(range),
            HistogramMetric::Depth => Selection::Depth(range),
        };
        Some(BrushEnd::new(ViewKind::Histogram, Some(selection)))
    }

    fn rebin(&mut self) {
        self.bins = bin_by(self.metric, self.data.iter());
    }
}

impl ViewAdapter for HistogramView {
    fn kind(&self) -> ViewKind {
        ViewKind::Histogram
    }

    fn update_data(&mut self, visible: &VisibleSet, _mode: UpdateMode) {
        self.data = visible.clone();
        self.rebin();
    }

    fn on_brush_end(&mut self, selection: Option<Selection>) -> Result<PredicateChange, FilterError> {
        let Some(selection) = selection else {
            self.applied = None;
            return Ok(PredicateChange::Clear);
        };
        let predicate = FilterPredicate::new(ViewKind::Histogram, selection)?;
        self.applied = Some(selection);
        Ok(PredicateChange::Set(predicate))
    }
}

#[derive(Clone)]
pub struct HistogramViewHandle(pub Arc<Mutex<HistogramView>>);

impl HistogramViewHandle {
    pub fn new(view: HistogramView) -> Self {
        Self(Arc::new(Mutex::new(view)))
    }

    pub fn lock(&self) -> MutexGuard<'_, HistogramView> {
        self.0.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl ViewAdapter for HistogramViewHandle {
    fn kind(&self) -> ViewKind {
        ViewKind::Histogram
    }

    fn update_data(&mut self, visible: &VisibleSet, mode: UpdateMode) {
        self.lock().update_data(visible, mode);
    }

    fn on_brush_end(&mut self, selection: Option<Selection>) -> Result<PredicateChange, FilterError> {
        self.lock().on_brush_end(selection)
    }
}
