use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use chrono::NaiveDate;

use crate::aggregation::DailyPoint;
use crate::brush::TimeBrush;
use crate::error::FilterError;
use crate::predicate::FilterPredicate;
use crate::scale::TimeScale;
use crate::selection::{Selection, TimeRange};
use crate::time_format;
use crate::time_series::DailySeries;
use crate::view::{BrushEnd, PredicateChange, UpdateMode, ViewAdapter, ViewKind};
use crate::visible::VisibleSet;

/// Daily event counts over local time, brushable along x.
pub struct LineChartView {
    data: VisibleSet,
    series: DailySeries,
    brush: TimeBrush,
    applied: Option<TimeRange>,
}

impl LineChartView {
    pub fn new(width_px: f64) -> Self {
        Self {
            data: VisibleSet::default(),
            series: DailySeries::default(),
            brush: TimeBrush::new(width_px),
            applied: None,
        }
    }

    pub fn width_px(&self) -> f64 {
        self.brush.width_px()
    }

    pub fn data(&self) -> &VisibleSet {
        &self.data
    }

    pub fn series(&self) -> &DailySeries {
        &self.series
    }

    pub fn applied(&self) -> Option<TimeRange> {
        self.applied
    }

    /// x scale over the series' date extent; `None` while empty.
    pub fn scale(&self) -> Option<TimeScale> {
        let (first, last) = self.series.date_extent()?;
        Some(TimeScale::for_dates(first, last, self.width_px()))
    }

    /// `(0, max daily count)`
    pub fn y_domain(&self) -> (usize, usize) {
        (0, self.series.max_count())
    }

    pub fn tick_format(&self) -> Option<&'static str> {
        let (first, last) = self.series.date_extent()?;
        Some(time_format::tick_format(first, last))
    }

    pub fn tick_label(&self, date: NaiveDate) -> Option<String> {
        let (first, last) = self.series.date_extent()?;
        Some(time_format::format_tick(date, first, last))
    }

    pub fn nearest(&self, date: NaiveDate) -> Option<&DailyPoint> {
        self.series.nearest(date)
    }

    /// Hover lookup under pixel `x_px`.
    pub fn nearest_at_px(&self, x_px: f64) -> Option<&DailyPoint> {
        let date = self.scale()?.invert(x_px).date();
        self.series.nearest(date)
    }

    pub fn brush_begin(&mut self, x_px: f64) {
        self.brush.begin(x_px);
    }

    pub fn brush_update(&mut self, x_px: f64) {
        self.brush.drag(x_px);
    }

    pub fn pending_range_px(&self) -> Option<(f64, f64)> {
        self.brush.span_px()
    }

    /// End the drag. A click without extent, or a drag over an empty chart,
    /// clears the time filter.
    pub fn brush_finish(&mut self) -> Option<BrushEnd> {
        let range = self.brush.finish(self.scale().as_ref())?;
        Some(BrushEnd::new(ViewKind::TimeSeries, range.map(Selection::Time)))
    }
}

impl ViewAdapter for LineChartView {
    fn kind(&self) -> ViewKind {
        ViewKind::TimeSeries
    }

    fn update_data(&mut self, visible: &VisibleSet, mode: UpdateMode) {
        self.data = visible.clone();
        self.series = DailySeries::from_records(visible.iter());
        if mode == UpdateMode::CoordinatorPush && self.brush.is_active() {
            self.brush.cancel();
            tracing::trace!("time brush dropped by recombination");
        }
    }

    fn on_brush_end(&mut self, selection: Option<Selection>) -> Result<PredicateChange, FilterError> {
        let Some(selection) = selection else {
            self.applied = None;
            return Ok(PredicateChange::Clear);
        };
        let predicate = FilterPredicate::new(ViewKind::TimeSeries, selection)?;
        if let Selection::Time(range) = selection {
            self.applied = Some(range);
        }
        Ok(PredicateChange::Set(predicate))
    }
}

#[derive(Clone)]
pub struct LineChartViewHandle(pub Arc<Mutex<LineChartView>>);

impl LineChartViewHandle {
    pub fn new(view: LineChartView) -> Self {
        Self(Arc::new(Mutex::new(view)))
    }

    pub fn lock(&self) -> MutexGuard<'_, LineChartView> {
        self.0.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl ViewAdapter for LineChartViewHandle {
    fn kind(&self) -> ViewKind {
        ViewKind::TimeSeries
    }

    fn update_data(&mut self, visible: &VisibleSet, mode: UpdateMode) {
        self.lock().update_data(visible, mode);
    }

    fn on_brush_end(&mut self, selection: Option<Selection>) -> Result<PredicateChange, FilterError> {
        self.lock().on_brush_end(selection)
    }
}
