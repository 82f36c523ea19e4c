use quakescope_core::EventRecord;
use rustc_hash::FxHashMap;
use smallvec::SmallVec;

use crate::error::FilterError;
use crate::selection::Selection;
use crate::view::ViewKind;

/// A frozen selection owned by one view.
///
/// The predicate holds the selection by value, so it keeps testing against
/// the bounds captured at brush end regardless of what the view does later.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct FilterPredicate {
    owner: ViewKind,
    selection: Selection,
}

impl FilterPredicate {
    /// Fails if `owner` does not own the selection's dimension.
    pub fn new(owner: ViewKind, selection: Selection) -> Result<Self, FilterError> {
        let dimension = selection.dimension();
        if dimension.owner() != owner {
            return Err(FilterError::NotOwned {
                view: owner,
                dimension,
            });
        }
        Ok(Self { owner, selection })
    }

    pub fn owner(&self) -> ViewKind {
        self.owner
    }

    pub fn selection(&self) -> &Selection {
        &self.selection
    }

    pub fn name(&self) -> &'static str {
        match self.selection {
            Selection::Bounds(_) => "map.bounds",
            Selection::Magnitude(_) => "histogram.magnitude",
            Selection::Depth(_) => "histogram.depth",
            Selection::Time(_) => "time_series.range",
        }
    }

    pub fn matches(&self, record: &EventRecord) -> bool {
        match &self.selection {
            Selection::Bounds(b) => b.contains(record.latitude, record.longitude),
            Selection::Time(r) => r.contains(record.occurred_at_local),
            Selection::Magnitude(r) => r.contains(record.magnitude),
            Selection::Depth(r) => r.contains(record.depth),
        }
    }
}

/// Per-view predicate slots. An empty slot places no restriction.
#[derive(Clone, Debug, Default)]
pub struct PredicateStore {
    slots: FxHashMap<ViewKind, FilterPredicate>,
}

impl PredicateStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Install `predicate` in `view`'s slot, returning the one it replaces.
    pub fn set(
        &mut self,
        view: ViewKind,
        predicate: FilterPredicate,
    ) -> Result<Option<FilterPredicate>, FilterError> {
        if predicate.owner() != view {
            return Err(FilterError::NotOwned {
                view,
                dimension: predicate.selection().dimension(),
            });
        }
        Ok(self.slots.insert(view, predicate))
    }

    pub fn clear(&mut self, view: ViewKind) -> Option<FilterPredicate> {
        self.slots.remove(&view)
    }

    pub fn clear_all(&mut self) {
        self.slots.clear();
    }

    pub fn get(&self, view: ViewKind) -> Option<&FilterPredicate> {
        self.slots.get(&view)
    }

    pub fn len(&self) -> usize {
        self.slots.len()
    }

    pub fn is_empty(&self) -> bool {
        self.slots.is_empty()
    }

    pub fn active(&self) -> impl Iterator<Item = &FilterPredicate> {
        self.slots.values()
    }

    /// Active predicate names in view order, for logs and reports.
    pub fn active_names(&self) -> SmallVec<[&'static str; 3]> {
        ViewKind::ALL
            .iter()
            .filter_map(|v| self.slots.get(v))
            .map(FilterPredicate::name)
            .collect()
    }

    /// Logical AND over every active predicate.
    pub fn matches(&self, record: &EventRecord) -> bool {
        self.slots.values().all(|p| p.matches(record))
    }
}
