//! # Linux Evdev Port Implementation
//!
//! Implements the device access traits over the Linux evdev interface.
//!
//! ## Device Identity
//!
//! Devices are identified by a 32-hex-digit GUID derived from the kernel
//! `input_id` (bus type, vendor, product, version), byte-for-byte
//! compatible with the GUID strings controller setup tools persist.
//!
//! ## State Reads
//!
//! [`EvdevHandle::refresh`] pulls full key and absolute-axis state via
//! the state-query ioctls once per poll, so the per-button and per-axis
//! queries never touch the kernel and never block. Absolute axes are
//! rescaled from the device's reported range to the shared ±32767 axis
//! scale. Hat switches (`ABS_HAT0X`..`ABS_HAT3Y`) are excluded from the
//! analog axis list and exposed as direction bitmasks instead.

use evdev::raw_stream::RawDevice;
use evdev::Key;
use std::path::{Path, PathBuf};
use tracing::{debug, info};

use crate::axis::{hat, DeviceCaps, AXIS_FULL_SCALE};
use crate::error::{PadBridgeError, Result};
use crate::resolve::RawPad;

use super::port::{DeviceHandle, DeviceRegistry};

/// First hat axis code (`ABS_HAT0X`).
const ABS_HAT_FIRST: u16 = 0x10;

/// Last hat axis code (`ABS_HAT3Y`).
const ABS_HAT_LAST: u16 = 0x17;

/// Formats a kernel `input_id` as the persisted GUID string: the four
/// identity words in little-endian byte order, each padded to 32 bits.
#[must_use]
fn format_guid(bus: u16, vendor: u16, product: u16, version: u16) -> String {
    format!(
        "{:02x}{:02x}0000{:02x}{:02x}0000{:02x}{:02x}0000{:02x}{:02x}0000",
        bus & 0xff,
        bus >> 8,
        vendor & 0xff,
        vendor >> 8,
        product & 0xff,
        product >> 8,
        version & 0xff,
        version >> 8,
    )
}

/// Rescales a reading from the device's `[min, max]` range to the
/// shared ±[`AXIS_FULL_SCALE`] range.
fn scale_axis(value: i32, min: i32, max: i32) -> i32 {
    if max <= min {
        return 0;
    }
    let span = i64::from(max) - i64::from(min);
    let position = i64::from(value.clamp(min, max)) - i64::from(min);
    (position * 2 * i64::from(AXIS_FULL_SCALE) / span - i64::from(AXIS_FULL_SCALE)) as i32
}

/// Converts one hat's X/Y readings to a direction bitmask.
fn hat_mask(x: i32, y: i32) -> u8 {
    let mut mask = hat::CENTERED;
    if x < 0 {
        mask |= hat::LEFT;
    } else if x > 0 {
        mask |= hat::RIGHT;
    }
    if y < 0 {
        mask |= hat::UP;
    } else if y > 0 {
        mask |= hat::DOWN;
    }
    mask
}

/// One device found during enumeration.
struct EnumeratedDevice {
    path: PathBuf,
    guid: String,
}

/// Evdev-backed device registry.
///
/// Enumeration happens once at construction: `/dev/input/event*` nodes
/// are scanned in sorted path order so indices are deterministic when
/// several identical devices are connected. Nodes that cannot be opened
/// (typically permissions) are skipped.
pub struct EvdevRegistry {
    devices: Vec<EnumeratedDevice>,
}

impl EvdevRegistry {
    /// Scans `/dev/input` and records every readable event device.
    ///
    /// # Errors
    ///
    /// Returns an error if the input directory itself cannot be read.
    /// Individual unreadable devices are skipped, not fatal.
    pub fn enumerate() -> Result<Self> {
        Self::enumerate_at(Path::new("/dev/input"))
    }

    fn enumerate_at(input_dir: &Path) -> Result<Self> {
        let mut entries: Vec<_> = std::fs::read_dir(input_dir)?
            .collect::<std::result::Result<Vec<_>, _>>()?;

        // Deterministic indices across runs.
        entries.sort_by_key(|entry| entry.path());

        let mut devices = Vec::new();
        for entry in entries {
            let path = entry.path();

            let Some(filename) = path.file_name() else {
                continue;
            };
            if !filename.to_string_lossy().starts_with("event") {
                continue;
            }

            match RawDevice::open(&path) {
                Ok(device) => {
                    let id = device.input_id();
                    let guid =
                        format_guid(id.bus_type().0, id.vendor(), id.product(), id.version());
                    debug!("found input device {} ({})", path.display(), guid);
                    devices.push(EnumeratedDevice { path, guid });
                }
                Err(e) => {
                    debug!("could not open {}: {}", path.display(), e);
                }
            }
        }

        info!("enumerated {} input devices", devices.len());
        Ok(Self { devices })
    }
}

impl DeviceRegistry for EvdevRegistry {
    fn device_count(&self) -> usize {
        self.devices.len()
    }

    fn device_guid(&self, index: usize) -> Option<String> {
        self.devices.get(index).map(|d| d.guid.clone())
    }

    fn open(&self, index: usize) -> Result<Box<dyn DeviceHandle>> {
        let entry = self
            .devices
            .get(index)
            .ok_or_else(|| PadBridgeError::Device(format!("no device #{}", index)))?;

        Ok(Box::new(EvdevHandle::open(&entry.path)?))
    }
}

/// An opened evdev device serving cached state between refreshes.
pub struct EvdevHandle {
    device: RawDevice,
    name: String,
    /// Analog axis codes in slot order, hats excluded.
    axis_codes: Vec<u16>,
    /// Button key codes in slot order.
    button_codes: Vec<Key>,
    /// Hat X-axis codes in slot order (the Y code is always X + 1).
    hat_codes: Vec<u16>,
    buttons: Vec<bool>,
    axes: Vec<i32>,
    hats: Vec<u8>,
    closed: bool,
}

impl EvdevHandle {
    /// Opens the device node and fixes its capability tables.
    fn open(path: &Path) -> Result<Self> {
        let device = RawDevice::open(path).map_err(|e| {
            PadBridgeError::Device(format!("failed to open {}: {}", path.display(), e))
        })?;

        let name = device.name().unwrap_or("unknown device").to_string();

        let mut axis_codes = Vec::new();
        let mut hat_codes = Vec::new();
        if let Some(axes) = device.supported_absolute_axes() {
            for axis in axes.iter() {
                let code = axis.0;
                if (ABS_HAT_FIRST..=ABS_HAT_LAST).contains(&code) {
                    // X and Y arrive as separate codes; track one hat
                    // slot per X code.
                    if (code - ABS_HAT_FIRST) % 2 == 0 {
                        hat_codes.push(code);
                    }
                } else {
                    axis_codes.push(code);
                }
            }
        }

        let button_codes: Vec<Key> = device
            .supported_keys()
            .map(|keys| keys.iter().collect())
            .unwrap_or_default();

        let mut handle = Self {
            device,
            name,
            buttons: vec![false; button_codes.len()],
            axes: vec![0; axis_codes.len()],
            hats: vec![hat::CENTERED; hat_codes.len()],
            axis_codes,
            button_codes,
            hat_codes,
            closed: false,
        };

        // Seed the cache so reads before the first poll are current.
        handle.refresh()?;
        Ok(handle)
    }
}

impl RawPad for EvdevHandle {
    fn button(&self, index: usize) -> bool {
        self.buttons.get(index).copied().unwrap_or(false)
    }

    fn axis(&self, index: usize) -> i32 {
        self.axes.get(index).copied().unwrap_or(0)
    }

    fn hat(&self, index: usize) -> u8 {
        self.hats.get(index).copied().unwrap_or(hat::CENTERED)
    }
}

impl DeviceHandle for EvdevHandle {
    fn name(&self) -> &str {
        &self.name
    }

    fn caps(&self) -> DeviceCaps {
        DeviceCaps {
            axes: self.axis_codes.len(),
            hats: self.hat_codes.len(),
        }
    }

    fn refresh(&mut self) -> Result<()> {
        let keys = self.device.get_key_state()?;
        for (slot, &code) in self.button_codes.iter().enumerate() {
            self.buttons[slot] = keys.contains(code);
        }

        let abs = self.device.get_abs_state()?;
        for (slot, &code) in self.axis_codes.iter().enumerate() {
            let info = abs[code as usize];
            self.axes[slot] = scale_axis(info.value, info.minimum, info.maximum);
        }
        for (slot, &code) in self.hat_codes.iter().enumerate() {
            let x = abs[code as usize].value;
            let y = abs[code as usize + 1].value;
            self.hats[slot] = hat_mask(x, y);
        }

        Ok(())
    }

    fn close(&mut self) {
        if !self.closed {
            debug!("closing device {}", self.name);
            self.closed = true;
        }
    }
}

impl Drop for EvdevHandle {
    fn drop(&mut self) {
        self.close();
    }
}
