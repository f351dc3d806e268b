//! # Error Types
//!
//! Custom error types for Gamepad Bridge using `thiserror`.

use thiserror::Error;

/// Main error type for Gamepad Bridge
#[derive(Debug, Error)]
pub enum BridgeError {
    /// No attached HID device matched the configured identity.
    ///
    /// This is an expected, transient condition: the supervisor retries
    /// discovery with a bounded delay rather than failing.
    #[error("no matching HID device found")]
    DeviceNotFound,

    /// Read or open failure on a device handle (device presumed gone)
    #[error("device I/O error: {0}")]
    DeviceIo(String),

    /// Input report too short to decode
    #[error("malformed report: {len} bytes, need at least {min}")]
    MalformedReport { len: usize, min: usize },

    /// The virtual gamepad session could not be created (fatal)
    #[error("virtual gamepad init failed: {0}")]
    SinkInit(String),

    /// Configuration errors
    #[error("Configuration error: {0}")]
    Config(#[from] toml::de::Error),

    /// I/O errors
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Result type alias for Gamepad Bridge
pub type Result<T> = std::result::Result<T, BridgeError>;
