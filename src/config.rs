//! # Configuration Module
//!
//! Handles loading and validating configuration from TOML files.
//!
//! The surface is the flat integer/string key set controller setup tools
//! persist: an enable flag, a stable device identity (GUID
//! string) plus a cached device index hint, four axis-selection integers
//! in the packed [`AxisId`](crate::axis::AxisId) namespace with per-axis
//! invert flags, and a physical-button override array (one entry per
//! virtual button).

use serde::Deserialize;
use serde::de::Error;
use std::fs;
use std::path::Path;

use crate::error::Result;
use crate::mapping::{AxisBinding, AxisBindings, ButtonMap, PRIMARY_VIRTUAL_BUTTONS};

/// Main configuration structure
#[derive(Debug, Deserialize, Clone)]
pub struct Config {
    #[serde(default)]
    pub joystick: JoystickConfig,

    #[serde(default)]
    pub console: ConsoleConfig,

    #[serde(default)]
    pub poll: PollConfig,
}

/// Primary joystick backend configuration
#[derive(Debug, Deserialize, Clone)]
pub struct JoystickConfig {
    /// Master enable. When false, initialization is a no-op and no events
    /// are produced.
    #[serde(default)]
    pub enabled: bool,

    /// Stable identity of the device to bind. Empty means unconfigured.
    #[serde(default)]
    pub guid: String,

    /// Cached enumeration index of the device, used as a tie-breaker when
    /// several identical devices are connected. -1 means no hint.
    #[serde(default = "default_device_index")]
    pub device_index: i32,

    #[serde(default = "default_turn_axis")]
    pub turn_axis: i32,
    #[serde(default)]
    pub turn_invert: bool,

    #[serde(default = "default_forward_axis")]
    pub forward_axis: i32,
    #[serde(default)]
    pub forward_invert: bool,

    #[serde(default = "default_disabled_axis")]
    pub strafe_axis: i32,
    #[serde(default)]
    pub strafe_invert: bool,

    #[serde(default = "default_disabled_axis")]
    pub look_axis: i32,
    #[serde(default)]
    pub look_invert: bool,

    /// Physical button index per virtual button. Missing entries fall back
    /// to the identity mapping; negative entries disable a button.
    #[serde(default = "default_physical_buttons")]
    pub physical_buttons: Vec<i32>,
}

/// Multi-controller backend configuration
#[derive(Debug, Deserialize, Clone)]
pub struct ConsoleConfig {
    /// Right stick steers by default; the left stick X strafes.
    #[serde(default = "default_console_turn_axis")]
    pub turn_axis: i32,
    #[serde(default)]
    pub turn_invert: bool,

    #[serde(default = "default_forward_axis")]
    pub forward_axis: i32,
    #[serde(default)]
    pub forward_invert: bool,

    #[serde(default = "default_turn_axis")]
    pub strafe_axis: i32,
    #[serde(default)]
    pub strafe_invert: bool,

    #[serde(default = "default_console_look_axis")]
    pub look_axis: i32,
    #[serde(default)]
    pub look_invert: bool,

    /// Consecutive empty reads tolerated before a secondary channel is
    /// declared disconnected.
    #[serde(default = "default_channel_timeout")]
    pub channel_timeout: u8,
}

/// Poll loop configuration (demo binary)
#[derive(Debug, Deserialize, Clone)]
pub struct PollConfig {
    #[serde(default = "default_rate_hz")]
    pub rate_hz: u32,
}

// Default value functions
fn default_device_index() -> i32 { -1 }
fn default_turn_axis() -> i32 { 0 }
fn default_forward_axis() -> i32 { 1 }
fn default_disabled_axis() -> i32 { -1 }
fn default_physical_buttons() -> Vec<i32> { (0..PRIMARY_VIRTUAL_BUTTONS as i32).collect() }

fn default_console_turn_axis() -> i32 { 2 }
fn default_console_look_axis() -> i32 { 3 }
fn default_channel_timeout() -> u8 { 10 }

fn default_rate_hz() -> u32 { 60 }

impl Default for JoystickConfig {
    fn default() -> Self {
        Self {
            enabled: false,
            guid: String::new(),
            device_index: default_device_index(),
            turn_axis: default_turn_axis(),
            turn_invert: false,
            forward_axis: default_forward_axis(),
            forward_invert: false,
            strafe_axis: default_disabled_axis(),
            strafe_invert: false,
            look_axis: default_disabled_axis(),
            look_invert: false,
            physical_buttons: default_physical_buttons(),
        }
    }
}

impl Default for ConsoleConfig {
    fn default() -> Self {
        Self {
            turn_axis: default_console_turn_axis(),
            turn_invert: false,
            forward_axis: default_forward_axis(),
            forward_invert: false,
            strafe_axis: default_turn_axis(),
            strafe_invert: false,
            look_axis: default_console_look_axis(),
            look_invert: false,
            channel_timeout: default_channel_timeout(),
        }
    }
}

impl Default for PollConfig {
    fn default() -> Self {
        Self {
            rate_hz: default_rate_hz(),
        }
    }
}

impl JoystickConfig {
    /// Decodes the four configured axis selections into bindings.
    #[must_use]
    pub fn axis_bindings(&self) -> AxisBindings {
        AxisBindings {
            turn: AxisBinding::new(self.turn_axis, self.turn_invert),
            forward: AxisBinding::new(self.forward_axis, self.forward_invert),
            strafe: AxisBinding::new(self.strafe_axis, self.strafe_invert),
            look: AxisBinding::new(self.look_axis, self.look_invert),
        }
    }

    /// Builds the virtual-to-physical button table.
    #[must_use]
    pub fn button_map(&self) -> ButtonMap {
        ButtonMap::from_table(&self.physical_buttons)
    }
}

impl ConsoleConfig {
    /// Decodes the four configured axis selections into bindings.
    #[must_use]
    pub fn axis_bindings(&self) -> AxisBindings {
        AxisBindings {
            turn: AxisBinding::new(self.turn_axis, self.turn_invert),
            forward: AxisBinding::new(self.forward_axis, self.forward_invert),
            strafe: AxisBinding::new(self.strafe_axis, self.strafe_invert),
            look: AxisBinding::new(self.look_axis, self.look_invert),
        }
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            joystick: JoystickConfig::default(),
            console: ConsoleConfig::default(),
            poll: PollConfig::default(),
        }
    }
}

impl Config {
    /// Load configuration from a TOML file
    ///
    /// # Errors
    ///
    /// Returns error if:
    /// - File cannot be read
    /// - TOML parsing fails
    /// - Validation fails
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let contents = fs::read_to_string(path)?;
        let config: Config = toml::from_str(&contents)?;
        config.validate()?;
        Ok(config)
    }

    /// Validate configuration values
    ///
    /// # Errors
    ///
    /// Returns error if any configuration value is out of valid range.
    /// Axis selections are deliberately not validated here: they are
    /// checked against the opened device's capabilities at backend open,
    /// and an invalid selection degrades to a disabled axis during polls.
    /// An enabled joystick with no GUID is likewise not an error; the
    /// driver treats that state as a no-op and leaves input unbound.
    pub fn validate(&self) -> Result<()> {
        if self.joystick.device_index < -1 {
            return Err(crate::error::PadBridgeError::Config(
                toml::de::Error::custom("device_index must be -1 (no hint) or a device index")
            ));
        }

        if self.joystick.physical_buttons.len() > PRIMARY_VIRTUAL_BUTTONS {
            return Err(crate::error::PadBridgeError::Config(
                toml::de::Error::custom(format!(
                    "physical_buttons has {} entries (at most {})",
                    self.joystick.physical_buttons.len(),
                    PRIMARY_VIRTUAL_BUTTONS
                ))
            ));
        }

        if self.console.channel_timeout == 0 || self.console.channel_timeout > 100 {
            return Err(crate::error::PadBridgeError::Config(
                toml::de::Error::custom("channel_timeout must be between 1 and 100 polls")
            ));
        }

        if self.poll.rate_hz == 0 || self.poll.rate_hz > 1000 {
            return Err(crate::error::PadBridgeError::Config(
                toml::de::Error::custom("rate_hz must be between 1 and 1000")
            ));
        }

        Ok(())
    }
}
