//! # Error Types
//!
//! Custom error types for Pad Bridge using `thiserror`.
//!
//! No error in this crate is fatal to the host: an open failure leaves the
//! input layer unbound (no events produced), which downstream consumers
//! already tolerate because controllers are optional peripherals.

use thiserror::Error;

/// Main error type for Pad Bridge
#[derive(Debug, Error)]
pub enum PadBridgeError {
    /// Configuration errors
    #[error("Configuration error: {0}")]
    Config(#[from] toml::de::Error),

    /// I/O errors
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Device access errors (open, capability query, state read)
    #[error("Device error: {0}")]
    Device(String),

    /// No enumerated device matched the configured stable identity
    #[error("No joystick with GUID \"{guid}\": device not found or not connected")]
    DeviceNotFound {
        /// The configured GUID that failed to resolve
        guid: String,
    },

    /// A configured logical axis does not exist on the opened device
    #[error("Invalid axis configuration for opened device (run controller setup again)")]
    InvalidAxis,
}

/// Result type alias for Pad Bridge
pub type Result<T> = std::result::Result<T, PadBridgeError>;
