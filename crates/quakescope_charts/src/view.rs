use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::FilterError;
use crate::predicate::FilterPredicate;
use crate::selection::Selection;
use crate::visible::VisibleSet;

/// The three linked views. Each owns at most one predicate slot.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ViewKind {
    Map,
    Histogram,
    TimeSeries,
}

impl ViewKind {
    pub const ALL: [ViewKind; 3] = [ViewKind::Map, ViewKind::Histogram, ViewKind::TimeSeries];

    pub fn name(self) -> &'static str {
        match self {
            ViewKind::Map => "map",
            ViewKind::Histogram => "histogram",
            ViewKind::TimeSeries => "time_series",
        }
    }
}

impl fmt::Display for ViewKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Why a view is being handed new data.
///
/// Views never emit brush messages while handling an update, whatever the
/// mode; `CoordinatorPush` additionally drops any gesture in flight, since the
/// data it was drawn over is gone.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum UpdateMode {
    /// Recombination result pushed by the coordinator.
    CoordinatorPush,
    /// View-local redraw (registration, metric switch, playback step).
    Local,
}

/// What a finished brush asks the coordinator to do with the view's slot.
#[derive(Clone, Debug, PartialEq)]
pub enum PredicateChange {
    Set(FilterPredicate),
    Clear,
}

/// Message produced by a completed brush gesture.
///
/// `selection: None` means the brush was cleared (or was degenerate).
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct BrushEnd {
    pub view: ViewKind,
    pub selection: Option<Selection>,
}

impl BrushEnd {
    pub fn new(view: ViewKind, selection: Option<Selection>) -> Self {
        Self { view, selection }
    }

    pub fn cleared(view: ViewKind) -> Self {
        Self::new(view, None)
    }
}

/// Contract every linked view honors to take part in coordination.
pub trait ViewAdapter {
    fn kind(&self) -> ViewKind;

    /// Replace displayed data and recompute view-local aggregates.
    fn update_data(&mut self, visible: &VisibleSet, mode: UpdateMode);

    /// Freeze a finished brush into a predicate change for this view's slot.
    fn on_brush_end(&mut self, selection: Option<Selection>) -> Result<PredicateChange, FilterError> {
        let kind = self.kind();
        match selection {
            None => Ok(PredicateChange::Clear),
            Some(selection) => FilterPredicate::new(kind, selection).map(PredicateChange::Set),
        }
    }

    fn reset_filter(&mut self) -> Result<PredicateChange, FilterError> {
        self.on_brush_end(None)
    }
}
