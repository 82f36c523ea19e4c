//! Flat State Machines
//!
//! Table-driven state machines for view interaction states (pan vs. brush
//! modes, in-flight gestures). States and events are plain integer ids so
//! each view can declare its own vocabulary as constants.
//!
//! Unknown `(state, event)` pairs are ignored: the machine stays where it is
//! and [`StateMachine::send`] reports `None`.

use rustc_hash::FxHashMap;

/// Identifier for a state within a state machine
pub type StateId = u32;

/// Identifier for an event type
pub type EventId = u32;

/// A transition in the state machine
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Transition {
    pub from_state: StateId,
    pub event: EventId,
    pub to_state: StateId,
}

impl Transition {
    pub fn new(from: StateId, event: EventId, to: StateId) -> Self {
        Self {
            from_state: from,
            event,
            to_state: to,
        }
    }
}

/// Builder for creating state machines
pub struct StateMachineBuilder {
    initial_state: StateId,
    transitions: Vec<Transition>,
}

impl StateMachineBuilder {
    pub fn new(initial_state: StateId) -> Self {
        Self {
            initial_state,
            transitions: Vec::new(),
        }
    }

    /// Add a transition (from, event, to). A later duplicate of the same
    /// `(from, event)` pair replaces the earlier one.
    pub fn on(mut self, from: StateId, event: EventId, to: StateId) -> Self {
        self.transitions.push(Transition::new(from, event, to));
        self
    }

    /// Add the same event edge from several source states
    pub fn on_any(mut self, from: &[StateId], event: EventId, to: StateId) -> Self {
        for &state in from {
            self.transitions.push(Transition::new(state, event, to));
        }
        self
    }

    pub fn build(self) -> StateMachine {
        StateMachine::new(self.initial_state, self.transitions)
    }
}

/// A state machine instance
#[derive(Clone, Debug)]
pub struct StateMachine {
    initial_state: StateId,
    current_state: StateId,
    table: FxHashMap<(StateId, EventId), StateId>,
    /// History of state transitions (for debugging)
    history: Vec<(StateId, EventId, StateId)>,
}

impl StateMachine {
    pub fn new(initial_state: StateId, transitions: Vec<Transition>) -> Self {
        let table = transitions
            .into_iter()
            .map(|t| ((t.from_state, t.event), t.to_state))
            .collect();
        Self {
            initial_state,
            current_state: initial_state,
            table,
            history: Vec::new(),
        }
    }

    pub fn builder(initial_state: StateId) -> StateMachineBuilder {
        StateMachineBuilder::new(initial_state)
    }

    pub fn current_state(&self) -> StateId {
        self.current_state
    }

    pub fn is_in(&self, state: StateId) -> bool {
        self.current_state == state
    }

    pub fn history(&self) -> &[(StateId, EventId, StateId)] {
        &self.history
    }

    pub fn clear_history(&mut self) {
        self.history.clear();
    }

    /// Check if an event can trigger a transition from current state
    pub fn can_send(&self, event: EventId) -> bool {
        self.table.contains_key(&(self.current_state, event))
    }

    /// Send an event; returns the new state if a transition fired.
    pub fn send(&mut self, event: EventId) -> Option<StateId> {
        let from = self.current_state;
        let to = *self.table.get(&(from, event))?;
        self.current_state = to;
        self.history.push((from, event, to));
        Some(to)
    }

    /// Return to the initial state without recording history.
    pub fn reset(&mut self) {
        self.current_state = self.initial_state;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const PAN: StateId = 0;
    const READY: StateId = 1;
    const DRAGGING: StateId = 2;

    const BRUSH_MODE: EventId = 1;
    const PAN_MODE: EventId = 2;
    const DOWN: EventId = 3;
    const UP: EventId = 4;

    fn machine() -> StateMachine {
        StateMachine::builder(PAN)
            .on(PAN, BRUSH_MODE, READY)
            .on(READY, DOWN, DRAGGING)
            .on(DRAGGING, UP, READY)
            .on_any(&[READY, DRAGGING], PAN_MODE, PAN)
            .build()
    }

    #[test]
    fn follows_declared_transitions() {
        let mut fsm = machine();
        assert_eq!(fsm.current_state(), PAN);

        assert_eq!(fsm.send(BRUSH_MODE), Some(READY));
        assert_eq!(fsm.send(DOWN), Some(DRAGGING));
        assert_eq!(fsm.send(UP), Some(READY));
        assert!(fsm.is_in(READY));
    }

    #[test]
    fn undeclared_event_keeps_state() {
        let mut fsm = machine();
        assert_eq!(fsm.send(DOWN), None);
        assert!(fsm.is_in(PAN));
        assert!(fsm.history().is_empty());
    }

    #[test]
    fn on_any_applies_to_every_source() {
        let mut fsm = machine();
        fsm.send(BRUSH_MODE);
        fsm.send(DOWN);
        assert_eq!(fsm.send(PAN_MODE), Some(PAN));

        fsm.send(BRUSH_MODE);
        assert_eq!(fsm.send(PAN_MODE), Some(PAN));
    }

    #[test]
    fn history_and_reset() {
        let mut fsm = machine();
        fsm.send(BRUSH_MODE);
        fsm.send(DOWN);

        assert_eq!(
            fsm.history(),
            &[(PAN, BRUSH_MODE, READY), (READY, DOWN, DRAGGING)]
        );

        fsm.reset();
        assert!(fsm.is_in(PAN));
        fsm.clear_history();
        assert!(fsm.history().is_empty());
    }

    #[test]
    fn can_send_reflects_current_state() {
        let mut fsm = machine();
        assert!(fsm.can_send(BRUSH_MODE));
        assert!(!fsm.can_send(UP));
        fsm.send(BRUSH_MODE);
        assert!(fsm.can_send(DOWN));
    }
}
