//! # Per-Poll Snapshot & Events
//!
//! The normalized output shape of one input poll:
//!
//! - [`PadSnapshot`]: the per-poll accumulator a backend fills: held
//!   bitmask, optional pressed-this-poll bitmask, and the four resolved
//!   axis values (two logical sticks). Rebuilt from neutral at the start
//!   of every poll; never carried across polls.
//! - [`PadEvent`]: the fixed-shape record handed to the downstream sink,
//!   tagged with the constant controller-input event kind. Created fresh
//!   each poll; ownership transfers to the sink immediately.
//! - [`EventSink`] / [`EventQueue`]: the delivery boundary. Consumers
//!   (menu, game logic) read events only, never backend state.

use std::collections::VecDeque;

/// Event kinds posted by this layer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[non_exhaustive]
pub enum EventKind {
    /// One normalized controller input poll.
    PadInput,
}

/// The per-poll accumulator: one backend's merged view of current
/// physical state.
///
/// # Examples
///
/// ```
/// use pad_bridge::snapshot::PadSnapshot;
///
/// let snapshot = PadSnapshot::neutral();
/// assert_eq!(snapshot.buttons, 0);
/// assert_eq!(snapshot.turn, 0);
/// assert!(snapshot.pressed.is_none());
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PadSnapshot {
    /// Buttons currently held, one bit per virtual button.
    pub buttons: u32,
    /// Buttons that transitioned to held this poll. `None` on backends
    /// without a transition signal.
    pub pressed: Option<u32>,
    /// Turn axis (primary stick X).
    pub turn: i32,
    /// Forward axis (primary stick Y, up is negative).
    pub forward: i32,
    /// Strafe axis (secondary stick X).
    pub strafe: i32,
    /// Look axis (secondary stick Y, up is negative).
    pub look: i32,
}

impl PadSnapshot {
    /// All buttons released, all axes centered.
    #[must_use]
    pub fn neutral() -> Self {
        Self {
            buttons: 0,
            pressed: None,
            turn: 0,
            forward: 0,
            strafe: 0,
            look: 0,
        }
    }
}

impl Default for PadSnapshot {
    fn default() -> Self {
        Self::neutral()
    }
}

/// The record posted downstream once per poll while a backend is bound.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PadEvent {
    /// Always [`EventKind::PadInput`].
    pub kind: EventKind,
    /// Buttons currently held.
    pub buttons: u32,
    /// Buttons pressed this poll, where the backend supports edges.
    pub pressed: Option<u32>,
    /// Turn axis value.
    pub turn: i32,
    /// Forward axis value.
    pub forward: i32,
    /// Strafe axis value.
    pub strafe: i32,
    /// Look axis value.
    pub look: i32,
}

impl PadEvent {
    /// Packs a finished snapshot into the outgoing record.
    #[must_use]
    pub fn from_snapshot(snapshot: &PadSnapshot) -> Self {
        Self {
            kind: EventKind::PadInput,
            buttons: snapshot.buttons,
            pressed: snapshot.pressed,
            turn: snapshot.turn,
            forward: snapshot.forward,
            strafe: snapshot.strafe,
            look: snapshot.look,
        }
    }
}

/// Downstream delivery boundary for poll events.
pub trait EventSink {
    /// Accepts ownership of one poll's event.
    fn post(&mut self, event: PadEvent);
}

/// A simple FIFO sink for hosts that drain events on their own schedule.
///
/// # Examples
///
/// ```
/// use pad_bridge::snapshot::{EventQueue, EventSink, PadEvent, PadSnapshot};
///
/// let mut queue = EventQueue::new();
/// queue.post(PadEvent::from_snapshot(&PadSnapshot::neutral()));
/// assert_eq!(queue.len(), 1);
/// assert!(queue.pop().is_some());
/// assert!(queue.pop().is_none());
/// ```
#[derive(Debug, Default)]
pub struct EventQueue {
    events: VecDeque<PadEvent>,
}

impl EventQueue {
    /// Creates an empty queue.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Removes and returns the oldest undelivered event.
    pub fn pop(&mut self) -> Option<PadEvent> {
        self.events.pop_front()
    }

    /// Number of undelivered events.
    #[must_use]
    pub fn len(&self) -> usize {
        self.events.len()
    }

    /// True when no events are waiting.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }
}

impl EventSink for EventQueue {
    fn post(&mut self, event: PadEvent) {
        self.events.push_back(event);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_neutral_snapshot() {
        let snapshot = PadSnapshot::neutral();
        assert_eq!(snapshot.buttons, 0);
        assert_eq!(snapshot.pressed, None);
        assert_eq!(snapshot.turn, 0);
        assert_eq!(snapshot.forward, 0);
        assert_eq!(snapshot.strafe, 0);
        assert_eq!(snapshot.look, 0);
    }

    #[test]
    fn test_event_packs_snapshot() {
        let snapshot = PadSnapshot {
            buttons: 0b101,
            pressed: Some(0b100),
            turn: -12000,
            forward: 32767,
            strafe: 0,
            look: 5,
        };

        let event = PadEvent::from_snapshot(&snapshot);
        assert_eq!(event.kind, EventKind::PadInput);
        assert_eq!(event.buttons, 0b101);
        assert_eq!(event.pressed, Some(0b100));
        assert_eq!(event.turn, -12000);
        assert_eq!(event.forward, 32767);
        assert_eq!(event.strafe, 0);
        assert_eq!(event.look, 5);
    }

    #[test]
    fn test_queue_is_fifo() {
        let mut queue = EventQueue::new();
        let mut first = PadEvent::from_snapshot(&PadSnapshot::neutral());
        first.buttons = 1;
        let mut second = first;
        second.buttons = 2;

        queue.post(first);
        queue.post(second);

        assert_eq!(queue.len(), 2);
        assert_eq!(queue.pop().map(|e| e.buttons), Some(1));
        assert_eq!(queue.pop().map(|e| e.buttons), Some(2));
        assert!(queue.is_empty());
    }
}
