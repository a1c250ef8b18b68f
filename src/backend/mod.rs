//! # Input Backends
//!
//! This module holds the backend interface and the per-poll orchestrator:
//!
//! - [`PadBackend`]: the polymorphic seam over the two backend
//!   implementations (primary OS joystick, console multi-controller),
//!   selected once at startup instead of branching per call site.
//! - [`InputPoller`]: the two-state orchestrator. **Unbound** polls are
//!   no-ops producing nothing; **Bound** polls produce exactly one event.
//!   Binding happens only at initialization after a successful open;
//!   unbinding only at shutdown.
//!
//! Submodules:
//! - [`port`]: device access traits (external collaborator boundary)
//! - [`evdev`]: Linux evdev implementation of the port traits
//! - [`joystick`]: primary joystick driver
//! - [`console`]: multi-controller driver

pub mod console;
pub mod evdev;
pub mod joystick;
pub mod port;

use crate::axis::AxisId;
use crate::snapshot::{EventSink, PadEvent, PadSnapshot};

/// One opened input backend.
///
/// Constructed (opened) by its own `open`/`new` associated function;
/// polled once per host tick; shut down exactly once.
pub trait PadBackend {
    /// Human-readable backend description for logs.
    fn name(&self) -> &str;

    /// Produces this poll's merged snapshot. Never blocks and never
    /// fails: missing hardware reads as neutral state.
    fn poll(&mut self) -> PadSnapshot;

    /// Checks an axis selection against the bound device's capabilities.
    fn is_valid_axis(&self, axis: AxisId) -> bool;

    /// Releases device resources. Safe to call more than once.
    fn shutdown(&mut self);
}

/// Per-poll orchestrator over an optional bound backend.
///
/// # Examples
///
/// ```
/// use pad_bridge::backend::InputPoller;
/// use pad_bridge::snapshot::EventQueue;
///
/// let mut poller = InputPoller::unbound();
/// let mut queue = EventQueue::new();
///
/// // Unbound polls produce nothing.
/// assert!(!poller.poll(&mut queue));
/// assert!(queue.is_empty());
/// ```
#[derive(Default)]
pub struct InputPoller {
    backend: Option<Box<dyn PadBackend>>,
}

impl InputPoller {
    /// Creates a poller with no backend bound.
    #[must_use]
    pub fn unbound() -> Self {
        Self::default()
    }

    /// Binds an opened backend. Called once at initialization.
    pub fn bind(&mut self, backend: Box<dyn PadBackend>) {
        self.backend = Some(backend);
    }

    /// True while a backend is bound.
    #[must_use]
    pub fn is_bound(&self) -> bool {
        self.backend.is_some()
    }

    /// Runs one poll cycle: clear, read the bound backend, pack, post.
    ///
    /// Returns whether an event was posted: exactly one per call while
    /// bound, zero while unbound.
    pub fn poll(&mut self, sink: &mut dyn EventSink) -> bool {
        let Some(backend) = self.backend.as_mut() else {
            return false;
        };

        let snapshot = backend.poll();
        sink.post(PadEvent::from_snapshot(&snapshot));
        true
    }

    /// Shuts the bound backend down and returns to the unbound state.
    /// Safe to call when nothing is bound.
    pub fn shutdown(&mut self) {
        if let Some(mut backend) = self.backend.take() {
            backend.shutdown();
        }
    }
}
