use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use chrono::{Duration, NaiveDateTime};
use quakescope_core::{EventId, EventRecord, StateId, StateMachine};

use crate::brush::BrushRect;
use crate::error::FilterError;
use crate::predicate::FilterPredicate;
use crate::selection::{GeoBounds, Selection};
use crate::view::{BrushEnd, PredicateChange, UpdateMode, ViewAdapter, ViewKind};
use crate::visible::VisibleSet;

pub const PAN_IDLE: StateId = 0;
pub const BRUSH_IDLE: StateId = 1;
pub const BRUSHING: StateId = 2;

pub const EV_BRUSH_MODE: EventId = 1;
pub const EV_PAN_MODE: EventId = 2;
pub const EV_POINTER_DOWN: EventId = 3;
pub const EV_POINTER_UP: EventId = 4;
pub const EV_CANCEL: EventId = 5;

fn gesture_machine() -> StateMachine {
    StateMachine::builder(PAN_IDLE)
        .on(PAN_IDLE, EV_BRUSH_MODE, BRUSH_IDLE)
        .on_any(&[BRUSH_IDLE, BRUSHING], EV_PAN_MODE, PAN_IDLE)
        .on(BRUSH_IDLE, EV_POINTER_DOWN, BRUSHING)
        .on_any(&[BRUSHING], EV_POINTER_UP, BRUSH_IDLE)
        .on(BRUSHING, EV_CANCEL, BRUSH_IDLE)
        .build()
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum MapMode {
    /// Pointer drags move the map.
    Pan,
    /// Pointer drags draw a selection rectangle.
    Brush,
}

/// Day-stepping window over the map's current data.
///
/// The window always starts at the earliest displayed event and grows or
/// shrinks one day at a time; `end` stays within `[start, last]`.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Playback {
    start: NaiveDateTime,
    end: NaiveDateTime,
    last: NaiveDateTime,
}

impl Playback {
    fn over<'a, I>(records: I) -> Option<Self>
    where
        I: IntoIterator<Item = &'a EventRecord>,
    {
        let mut extent: Option<(NaiveDateTime, NaiveDateTime)> = None;
        for t in records.into_iter().map(|r| r.occurred_at_local) {
            extent = Some(match extent {
                None => (t, t),
                Some((lo, hi)) => (lo.min(t), hi.max(t)),
            });
        }
        let (start, last) = extent?;
        Some(Self {
            start,
            end: start,
            last,
        })
    }

    pub fn start(&self) -> NaiveDateTime {
        self.start
    }

    pub fn end(&self) -> NaiveDateTime {
        self.end
    }

    pub fn last(&self) -> NaiveDateTime {
        self.last
    }

    pub fn can_step_forward(&self) -> bool {
        self.end < self.last
    }

    pub fn can_step_backward(&self) -> bool {
        self.end > self.start
    }

    fn step_forward(&mut self) {
        self.end = (self.end + Duration::days(1)).min(self.last);
    }

    fn step_backward(&mut self) {
        self.end = (self.end - Duration::days(1)).max(self.start);
    }

    pub fn contains(&self, t: NaiveDateTime) -> bool {
        t >= self.start && t <= self.end
    }
}

/// Geographic view: plots the visible events and owns the bounds predicate.
pub struct MapView {
    data: VisibleSet,
    gesture: StateMachine,
    brush: BrushRect,
    applied: Option<GeoBounds>,
    playback: Option<Playback>,
}

impl Default for MapView {
    fn default() -> Self {
        Self::new()
    }
}

impl MapView {
    pub fn new() -> Self {
        Self {
            data: VisibleSet::default(),
            gesture: gesture_machine(),
            brush: BrushRect::default(),
            applied: None,
            playback: None,
        }
    }

    pub fn mode(&self) -> MapMode {
        if self.gesture.is_in(PAN_IDLE) {
            MapMode::Pan
        } else {
            MapMode::Brush
        }
    }

    /// Switching back to pan drops an unfinished rectangle.
    pub fn set_mode(&mut self, mode: MapMode) {
        let event = match mode {
            MapMode::Pan => EV_PAN_MODE,
            MapMode::Brush => EV_BRUSH_MODE,
        };
        if self.gesture.send(event).is_some() && mode == MapMode::Pan {
            self.brush.cancel();
        }
    }

    pub fn is_brushing(&self) -> bool {
        self.gesture.is_in(BRUSHING)
    }

    /// Returns `false` when the press belongs to panning.
    pub fn pointer_down(&mut self, lat: f64, lon: f64) -> bool {
        if self.gesture.send(EV_POINTER_DOWN).is_none() {
            return false;
        }
        self.brush.begin(lat, lon);
        true
    }

    pub fn pointer_move(&mut self, lat: f64, lon: f64) {
        if self.is_brushing() {
            self.brush.update(lat, lon);
        }
    }

    /// Finish the rectangle. A zero-area or non-finite rectangle yields a
    /// cleared selection.
    pub fn pointer_up(&mut self, lat: f64, lon: f64) -> Option<BrushEnd> {
        if self.gesture.send(EV_POINTER_UP).is_none() {
            return None;
        }
        self.brush.update(lat, lon);
        let (a, b) = self.brush.take_final()?;
        let selection = GeoBounds::from_corners(a, b).map(Selection::Bounds);
        Some(BrushEnd::new(ViewKind::Map, selection))
    }

    /// Rectangle being drawn, for overlay rendering.
    pub fn pending_corners(&self) -> Option<((f64, f64), (f64, f64))> {
        self.brush.corners()
    }

    pub fn applied_bounds(&self) -> Option<GeoBounds> {
        self.applied
    }

    pub fn data(&self) -> &VisibleSet {
        &self.data
    }

    pub fn playback(&self) -> Option<&Playback> {
        self.playback.as_ref()
    }

    /// Begin stepping from the first displayed day. `None` when there is
    /// nothing to play.
    pub fn start_playback(&mut self) -> Option<Playback> {
        self.playback = Playback::over(self.data.iter());
        self.playback
    }

    pub fn step_forward(&mut self) -> Option<Playback> {
        let p = self.playback.as_mut()?;
        p.step_forward();
        Some(*p)
    }

    pub fn step_backward(&mut self) -> Option<Playback> {
        let p = self.playback.as_mut()?;
        p.step_backward();
        Some(*p)
    }

    pub fn stop_playback(&mut self) {
        self.playback = None;
    }

    /// Events currently drawn: the visible set, narrowed to the playback
    /// window while playing.
    pub fn displayed(&self) -> impl Iterator<Item = &EventRecord> + '_ {
        let window = self.playback;
        self.data
            .iter()
            .filter(move |r| window.map_or(true, |w| w.contains(r.occurred_at_local)))
    }

    pub fn displayed_count(&self) -> usize {
        self.displayed().count()
    }
}

impl ViewAdapter for MapView {
    fn kind(&self) -> ViewKind {
        ViewKind::Map
    }

    fn update_data(&mut self, visible: &VisibleSet, mode: UpdateMode) {
        self.data = visible.clone();
        if mode == UpdateMode::CoordinatorPush {
            self.playback = None;
            if self.gesture.send(EV_CANCEL).is_some() {
                self.brush.cancel();
                tracing::trace!("map gesture dropped by recombination");
            }
        }
    }

    fn on_brush_end(&mut self, selection: Option<Selection>) -> Result<PredicateChange, FilterError> {
        match selection {
            None => {
                self.applied = None;
                Ok(PredicateChange::Clear)
            }
            Some(Selection::Bounds(bounds)) => {
                self.applied = Some(bounds);
                FilterPredicate::new(ViewKind::Map, Selection::Bounds(bounds))
                    .map(PredicateChange::Set)
            }
            Some(other) => Err(FilterError::NotOwned {
                view: ViewKind::Map,
                dimension: other.dimension(),
            }),
        }
    }
}

#[derive(Clone)]
pub struct MapViewHandle(pub Arc<Mutex<MapView>>);

impl MapViewHandle {
    pub fn new(view: MapView) -> Self {
        Self(Arc::new(Mutex::new(view)))
    }

    pub fn lock(&self) -> MutexGuard<'_, MapView> {
        self.0.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl ViewAdapter for MapViewHandle {
    fn kind(&self) -> ViewKind {
        ViewKind::Map
    }

    fn update_data(&mut self, visible: &VisibleSet, mode: UpdateMode) {
        self.lock().update_data(visible, mode);
    }

    fn on_brush_end(&mut self, selection: Option<Selection>) -> Result<PredicateChange, FilterError> {
        self.lock().on_brush_end(selection)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{NaiveDate, TimeZone, Utc};
    use quakescope_core::EventStore;

    fn at_day(d: u32, hour: u32) -> EventRecord {
        let local = NaiveDate::from_ymd_opt(2024, 3, d)
            .unwrap()
            .and_hms_opt(hour, 0, 0)
            .unwrap();
        EventRecord {
            latitude: d as f64,
            longitude: 0.0,
            magnitude: 4.0,
            depth: 10.0,
            occurred_at_utc: Utc.from_utc_datetime(&local),
            occurred_at_local: local,
            local_timezone_label: "UTC".into(),
            place: String::new(),
            duration_proxy: 0.0,
        }
    }

    fn loaded(records: Vec<EventRecord>) -> MapView {
        let mut map = MapView::new();
        map.update_data(&VisibleSet::all(&EventStore::new(records)), UpdateMode::Local);
        map
    }

    #[test]
    fn pan_mode_ignores_pointer() {
        let mut map = MapView::new();
        assert_eq!(map.mode(), MapMode::Pan);
        assert!(!map.pointer_down(1.0, 1.0));
        assert_eq!(map.pointer_up(2.0, 2.0), None);
    }

    #[test]
    fn brush_gesture_produces_bounds() {
        let mut map = MapView::new();
        map.set_mode(MapMode::Brush);
        assert!(map.pointer_down(10.0, 20.0));
        map.pointer_move(0.0, 25.0);
        assert!(map.pending_corners().is_some());

        let msg = map.pointer_up(0.0, 30.0).unwrap();
        let expected = GeoBounds::new(0.0, 10.0, 20.0, 30.0).unwrap();
        assert_eq!(msg, BrushEnd::new(ViewKind::Map, Some(Selection::Bounds(expected))));
        assert_eq!(map.mode(), MapMode::Brush);
        assert!(!map.is_brushing());
    }

    #[test]
    fn click_without_drag_clears() {
        let mut map = MapView::new();
        map.set_mode(MapMode::Brush);
        map.pointer_down(5.0, 5.0);
        assert_eq!(map.pointer_up(5.0, 5.0), Some(BrushEnd::cleared(ViewKind::Map)));
    }

    #[test]
    fn push_cancels_gesture_and_playback() {
        let mut map = loaded(vec![at_day(1, 0), at_day(3, 0)]);
        map.start_playback().unwrap();
        map.set_mode(MapMode::Brush);
        map.pointer_down(1.0, 1.0);

        let visible = map.data().clone();
        map.update_data(&visible, UpdateMode::CoordinatorPush);
        assert!(map.playback().is_none());
        assert!(!map.is_brushing());
        assert_eq!(map.pointer_up(9.0, 9.0), None);
    }

    #[test]
    fn playback_steps_by_day_within_extent() {
        let mut map = loaded(vec![at_day(1, 6), at_day(2, 3), at_day(4, 12)]);
        assert!(map.step_forward().is_none());

        let p = map.start_playback().unwrap();
        assert!(!p.can_step_backward());
        assert_eq!(map.displayed_count(), 1);

        let p = map.step_forward().unwrap();
        assert_eq!(p.end(), at_day(2, 6).occurred_at_local);
        assert_eq!(map.displayed_count(), 2);

        map.step_forward();
        map.step_forward();
        let p = map.step_forward().unwrap();
        assert_eq!(p.end(), p.last());
        assert!(!p.can_step_forward());
        assert_eq!(map.displayed_count(), 3);

        for _ in 0..10 {
            map.step_backward();
        }
        assert_eq!(map.playback().unwrap().end(), map.playback().unwrap().start());

        map.stop_playback();
        assert_eq!(map.displayed_count(), 3);
    }

    #[test]
    fn rejects_foreign_selection() {
        let mut map = MapView::new();
        let range = crate::selection::ValueRange::new(1.0, 2.0).unwrap();
        assert!(map.on_brush_end(Some(Selection::Depth(range))).is_err());
        assert_eq!(map.applied_bounds(), None);
    }

    #[test]
    fn handle_shares_state() {
        let handle = MapViewHandle::new(MapView::new());
        let mut adapter = handle.clone();
        let bounds = GeoBounds::new(0.0, 1.0, 0.0, 1.0).unwrap();
        adapter.on_brush_end(Some(Selection::Bounds(bounds))).unwrap();
        assert_eq!(handle.lock().applied_bounds(), Some(bounds));
    }
}
