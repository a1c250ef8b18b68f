//! Trait abstraction for joystick device access to enable testing
//!
//! The platform's enumerate-and-open / read-buttons / read-axis / read-hat
//! API is an external collaborator with the contract "returns a
//! best-effort snapshot of current physical state, or an explicit
//! not-available signal". The production implementation lives in
//! [`crate::backend::evdev`]; tests drive the primary driver through the
//! mocks below.

use crate::axis::DeviceCaps;
use crate::error::Result;
use crate::resolve::RawPad;

/// Enumerates joystick devices and opens handles to them.
pub trait DeviceRegistry {
    /// Number of devices currently enumerated.
    fn device_count(&self) -> usize;

    /// Stable identity of the device at `index`, if it can be queried.
    fn device_guid(&self, index: usize) -> Option<String>;

    /// Opens the device at `index`.
    fn open(&self, index: usize) -> Result<Box<dyn DeviceHandle>>;
}

/// An opened joystick device.
///
/// Raw reads go through the [`RawPad`] supertrait; out-of-range indices
/// read as neutral. [`DeviceHandle::refresh`] pulls a fresh hardware
/// snapshot once per poll so the `RawPad` queries stay non-blocking.
pub trait DeviceHandle: RawPad {
    /// Human-readable device name.
    fn name(&self) -> &str;

    /// Axis/hat capabilities fixed at enumeration time.
    fn caps(&self) -> DeviceCaps;

    /// Pulls a fresh state snapshot from the hardware. On failure the
    /// previous snapshot stays visible; a missing sample is not an error
    /// condition for the poll.
    fn refresh(&mut self) -> Result<()>;

    /// Releases the device. Idempotent.
    fn close(&mut self);
}
