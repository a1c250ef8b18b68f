//! # Primary Joystick Driver
//!
//! Owns a single OS-enumerated joystick device matched by a persisted
//! stable identity (GUID) plus a cached numeric index as a performance
//! hint, and exposes raw reads normalized to the common snapshot model.
//!
//! ## Identity Resolution
//!
//! A GUID identifies a class of device rather than one specific unit, so
//! the cached index acts as a tie-breaker when identical devices are
//! connected: the exact-GUID-at-cached-index check runs first, then a
//! linear scan for the first GUID match (logged as a device move), and
//! finally an explicit not-found failure that leaves input unbound for
//! the session. None of these paths is fatal to the host.
//!
//! ## Axis Validation
//!
//! After opening, all four configured logical axes are checked against
//! the device's enumerated capabilities. Any failure closes the device
//! and fails the open, preventing out-of-bounds hardware reads for the
//! rest of the session.

use tracing::{debug, info, warn};

use crate::axis::AxisId;
use crate::config::JoystickConfig;
use crate::error::{PadBridgeError, Result};
use crate::mapping::{AxisBindings, ButtonMap};
use crate::resolve::{axis_state, buttons_state};
use crate::snapshot::PadSnapshot;

use super::port::{DeviceHandle, DeviceRegistry};
use super::{InputPoller, PadBackend};

/// Readings with magnitude at or below this are snapped to zero.
pub const PRIMARY_DEAD_ZONE: i32 = 32768 / 3;

/// The primary joystick backend: one bound OS device, or nothing.
pub struct PrimaryJoystick {
    handle: Box<dyn DeviceHandle>,
    bindings: AxisBindings,
    button_map: ButtonMap,
    closed: bool,
}

impl PrimaryJoystick {
    /// Resolves the configured identity and opens the device.
    ///
    /// Returns `Ok(None)` when the backend is disabled by configuration
    /// or no identity is configured; initialization is a no-op and the
    /// caller stays unbound.
    ///
    /// # Errors
    ///
    /// - [`PadBridgeError::DeviceNotFound`]: no enumerated device carries
    ///   the configured GUID
    /// - [`PadBridgeError::InvalidAxis`]: a configured logical axis does
    ///   not exist on the opened device (the device is closed again)
    /// - [`PadBridgeError::Device`]: the platform open call failed
    pub fn open(
        config: &JoystickConfig,
        registry: &dyn DeviceRegistry,
    ) -> Result<Option<Self>> {
        if !config.enabled || config.guid.is_empty() {
            debug!("joystick disabled or unconfigured; skipping");
            return Ok(None);
        }

        let index = resolve_device_index(config, registry)?;
        let mut handle = registry.open(index)?;

        let bindings = config.axis_bindings();
        let caps = handle.caps();
        let invalid = bindings
            .all()
            .iter()
            .any(|binding| !binding.id.is_valid_for(caps));

        if invalid {
            warn!(
                "invalid axis configuration for {} ({} axes, {} hats); disabling input",
                handle.name(),
                caps.axes,
                caps.hats
            );
            handle.close();
            return Err(PadBridgeError::InvalidAxis);
        }

        info!("opened joystick: {}", handle.name());

        Ok(Some(Self {
            handle,
            bindings,
            button_map: config.button_map(),
            closed: false,
        }))
    }

    /// Opens the configured device and binds it to the poller.
    ///
    /// Absence of a controller is a steady state, not a fault: every
    /// failure ([`PadBridgeError::DeviceNotFound`], invalid axes, a
    /// platform open error) is logged once and leaves the poller
    /// unbound, so the host's poll loop keeps running and produces no
    /// events.
    pub fn bind(
        config: &JoystickConfig,
        registry: &dyn DeviceRegistry,
        poller: &mut InputPoller,
    ) {
        match Self::open(config, registry) {
            Ok(Some(joystick)) => poller.bind(Box::new(joystick)),
            Ok(None) => info!("joystick disabled or unconfigured; input unbound"),
            Err(e) => warn!("joystick unavailable: {}; input unbound", e),
        }
    }
}

/// Maps the configured GUID to a live enumeration index.
fn resolve_device_index(
    config: &JoystickConfig,
    registry: &dyn DeviceRegistry,
) -> Result<usize> {
    let count = registry.device_count();

    // Cached index first, as a tie-breaker between identical devices.
    if config.device_index >= 0 && (config.device_index as usize) < count {
        let cached = config.device_index as usize;
        if registry.device_guid(cached).as_deref() == Some(config.guid.as_str()) {
            return Ok(cached);
        }
    }

    for index in 0..count {
        if registry.device_guid(index).as_deref() == Some(config.guid.as_str()) {
            info!("joystick moved to index {}", index);
            return Ok(index);
        }
    }

    Err(PadBridgeError::DeviceNotFound {
        guid: config.guid.clone(),
    })
}

impl PadBackend for PrimaryJoystick {
    fn name(&self) -> &str {
        self.handle.name()
    }

    fn poll(&mut self) -> PadSnapshot {
        // A closed handle must never be touched again.
        if self.closed {
            return PadSnapshot::neutral();
        }

        if let Err(e) = self.handle.refresh() {
            // Keep serving the previous hardware snapshot.
            debug!("joystick state refresh failed: {}", e);
        }

        let pad = &*self.handle;
        PadSnapshot {
            buttons: buttons_state(pad, &self.button_map, &self.bindings),
            pressed: None,
            turn: axis_state(pad, self.bindings.turn, PRIMARY_DEAD_ZONE),
            forward: axis_state(pad, self.bindings.forward, PRIMARY_DEAD_ZONE),
            strafe: axis_state(pad, self.bindings.strafe, PRIMARY_DEAD_ZONE),
            look: axis_state(pad, self.bindings.look, PRIMARY_DEAD_ZONE),
        }
    }

    fn is_valid_axis(&self, axis: AxisId) -> bool {
        axis.is_valid_for(self.handle.caps())
    }

    fn shutdown(&mut self) {
        if !self.closed {
            self.handle.close();
            self.closed = true;
        }
    }
}

impl Drop for PrimaryJoystick {
    fn drop(&mut self) {
        self.shutdown();
    }
}
