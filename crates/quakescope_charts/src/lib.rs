//! quakescope_charts
//!
//! Linked earthquake views and the coordinator that keeps them consistent.
//!
//! - Each view (map, histogram, daily line chart) owns at most one frozen
//!   predicate over the shared event store
//! - The [`Coordinator`] ANDs the active predicates over the full store and
//!   pushes the result back to every view
//! - Brush gestures produce [`BrushEnd`] values; nothing inside a view can
//!   call back into the coordinator

mod brush;
mod time_format;

pub mod aggregation;
pub mod coordinator;
pub mod error;
pub mod histogram;
pub mod line;
pub mod map;
pub mod predicate;
pub mod scale;
pub mod selection;
pub mod time_series;
pub mod view;
pub mod visible;

pub use aggregation::{
    bin_by, bin_by_depth, bin_by_magnitude, daily_counts, Bin, DailyPoint, HistogramMetric,
};
pub use brush::{BrushRect, TimeBrush};
pub use coordinator::Coordinator;
pub use error::FilterError;
pub use predicate::{FilterPredicate, PredicateStore};
pub use scale::TimeScale;
pub use selection::{Dimension, GeoBounds, Selection, TimeRange, ValueRange};
pub use time_format::{
    format_short_date, format_tick, tick_format, DAY_LABEL_MAX_SPAN_DAYS,
};
pub use time_series::DailySeries;
pub use view::{BrushEnd, PredicateChange, UpdateMode, ViewAdapter, ViewKind};
pub use visible::VisibleSet;

/// Common imports for dashboard glue code.
pub mod prelude {
    pub use crate::coordinator::Coordinator;
    pub use crate::histogram::{HistogramView, HistogramViewHandle};
    pub use crate::line::{LineChartView, LineChartViewHandle};
    pub use crate::map::{MapMode, MapView, MapViewHandle, Playback};
    pub use crate::{
        Bin, BrushEnd, DailyPoint, DailySeries, FilterError, GeoBounds, HistogramMetric,
        Selection, TimeRange, UpdateMode, ValueRange, ViewAdapter, ViewKind, VisibleSet,
    };
}
