use quakescope_core::EventStore;

use crate::error::FilterError;
use crate::predicate::{FilterPredicate, PredicateStore};
use crate::selection::Selection;
use crate::view::{BrushEnd, PredicateChange, UpdateMode, ViewAdapter, ViewKind};
use crate::visible::VisibleSet;

/// Combines every view's predicate into one visible set and pushes it back
/// to all views.
///
/// - The original store is injected at construction and never filtered in
///   place; each recombination starts again from it.
/// - Views are only ever called through `update_data`, which has no path
///   back into the coordinator. Brush input arrives as [`BrushEnd`] values
///   handed to [`Coordinator::dispatch`].
pub struct Coordinator {
    original: EventStore,
    predicates: PredicateStore,
    views: Vec<Box<dyn ViewAdapter>>,
    visible: VisibleSet,
    recombinations: u64,
}

impl Coordinator {
    pub fn new(original: EventStore) -> Self {
        let visible = VisibleSet::all(&original);
        Self {
            original,
            predicates: PredicateStore::new(),
            views: Vec::new(),
            visible,
            recombinations: 0,
        }
    }

    /// Add a view and hand it the current visible set.
    pub fn register<V>(&mut self, view: V) -> Result<(), FilterError>
    where
        V: ViewAdapter + 'static,
    {
        let kind = view.kind();
        if self.views.iter().any(|v| v.kind() == kind) {
            return Err(FilterError::DuplicateView(kind));
        }
        let mut view: Box<dyn ViewAdapter> = Box::new(view);
        view.update_data(&self.visible, UpdateMode::Local);
        self.views.push(view);
        tracing::debug!(view = %kind, "registered view");
        Ok(())
    }

    pub fn original(&self) -> &EventStore {
        &self.original
    }

    pub fn predicates(&self) -> &PredicateStore {
        &self.predicates
    }

    /// Result of the last recombination.
    pub fn visible(&self) -> &VisibleSet {
        &self.visible
    }

    pub fn recombination_count(&self) -> u64 {
        self.recombinations
    }

    pub fn view_kinds(&self) -> impl Iterator<Item = ViewKind> + '_ {
        self.views.iter().map(|v| v.kind())
    }

    /// AND of all active predicates over the original store, in store order.
    ///
    /// Pure: does not touch views or counters.
    pub fn compute_visible(&self) -> VisibleSet {
        if self.predicates.is_empty() {
            return VisibleSet::all(&self.original);
        }
        VisibleSet::filtered(&self.original, |r| self.predicates.matches(r))
    }

    /// Recompute the visible set and push it to every registered view.
    pub fn recombine(&mut self) -> &VisibleSet {
        self.visible = self.compute_visible();
        self.recombinations += 1;
        tracing::debug!(
            active = ?self.predicates.active_names(),
            visible = self.visible.len(),
            total = self.original.len(),
            "recombined"
        );
        for view in &mut self.views {
            view.update_data(&self.visible, UpdateMode::CoordinatorPush);
        }
        &self.visible
    }

    /// Store-level access; does not recombine.
    pub fn set_predicate(
        &mut self,
        view: ViewKind,
        predicate: FilterPredicate,
    ) -> Result<Option<FilterPredicate>, FilterError> {
        self.predicates.set(view, predicate)
    }

    /// Store-level access; does not recombine.
    pub fn clear_predicate(&mut self, view: ViewKind) -> Option<FilterPredicate> {
        self.predicates.clear(view)
    }

    /// Store-level access; does not recombine.
    pub fn clear_all(&mut self) {
        self.predicates.clear_all();
    }

    pub fn dispatch(&mut self, message: BrushEnd) -> Result<&VisibleSet, FilterError> {
        self.on_brush_end(message.view, message.selection)
    }

    /// Let `view` freeze the selection, update its slot, then recombine.
    pub fn on_brush_end(
        &mut self,
        view: ViewKind,
        selection: Option<Selection>,
    ) -> Result<&VisibleSet, FilterError> {
        let change = self.view_mut(view)?.on_brush_end(selection)?;
        self.apply(view, change)?;
        Ok(self.recombine())
    }

    pub fn reset_filter(&mut self, view: ViewKind) -> Result<&VisibleSet, FilterError> {
        let change = self.view_mut(view)?.reset_filter()?;
        self.apply(view, change)?;
        Ok(self.recombine())
    }

    /// Clear every slot (and every view's brush state) with a single
    /// recombination.
    pub fn reset_all(&mut self) -> Result<&VisibleSet, FilterError> {
        for view in &mut self.views {
            view.reset_filter()?;
        }
        self.predicates.clear_all();
        Ok(self.recombine())
    }

    /// Recombine without a predicate change, e.g. after a display control
    /// changed.
    pub fn refresh(&mut self) -> &VisibleSet {
        self.recombine()
    }

    fn view_mut(&mut self, kind: ViewKind) -> Result<&mut Box<dyn ViewAdapter>, FilterError> {
        self.views
            .iter_mut()
            .find(|v| v.kind() == kind)
            .ok_or(FilterError::UnknownView(kind))
    }

    fn apply(&mut self, view: ViewKind, change: PredicateChange) -> Result<(), FilterError> {
        match change {
            PredicateChange::Set(predicate) => {
                let name = predicate.name();
                if self.predicates.set(view, predicate)?.is_some() {
                    tracing::trace!(%view, predicate = name, "replaced predicate");
                }
            }
            PredicateChange::Clear => {
                if self.predicates.clear(view).is_some() {
                    tracing::trace!(%view, "cleared predicate");
                }
            }
        }
        Ok(())
    }
}

impl std::fmt::Debug for Coordinator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Coordinator")
            .field("total", &self.original.len())
            .field("visible", &self.visible.len())
            .field("active", &self.predicates.active_names())
            .field("views", &self.view_kinds().collect::<Vec<_>>())
            .field("recombinations", &self.recombinations)
            .finish()
    }
}
