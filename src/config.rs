//! # Configuration Module
//!
//! Handles loading and validating configuration from TOML files.
//!
//! Everything hardware-revision-dependent lives here rather than in code:
//! the target vendor/product identity, the polling cadence, the axis
//! deadzone, and in particular the button bit→name table. Two bits of the
//! default table are user-reported rather than vendor-documented, so a
//! different hardware revision is fixed by editing the config, not the
//! decoder.

use serde::de::Error;
use serde::Deserialize;
use std::fs;
use std::path::Path;

use crate::error::Result;

/// Main configuration structure
#[derive(Debug, Deserialize, Clone)]
pub struct Config {
    #[serde(default)]
    pub device: DeviceConfig,

    #[serde(default)]
    pub axis: AxisConfig,

    #[serde(default)]
    pub buttons: ButtonMapConfig,

    #[serde(default)]
    pub virtual_device: VirtualDeviceConfig,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            device: DeviceConfig::default(),
            axis: AxisConfig::default(),
            buttons: ButtonMapConfig::default(),
            virtual_device: VirtualDeviceConfig::default(),
        }
    }
}

/// Physical device identity and polling configuration
#[derive(Debug, Deserialize, Clone)]
pub struct DeviceConfig {
    #[serde(default = "default_vendor_id")]
    pub vendor_id: u16,

    #[serde(default = "default_product_id")]
    pub product_id: u16,

    #[serde(default = "default_report_size")]
    pub report_size: usize,

    #[serde(default = "default_poll_interval_ms")]
    pub poll_interval_ms: u64,

    #[serde(default = "default_reconnect_interval_ms")]
    pub reconnect_interval_ms: u64,
}

impl Default for DeviceConfig {
    fn default() -> Self {
        Self {
            vendor_id: default_vendor_id(),
            product_id: default_product_id(),
            report_size: default_report_size(),
            poll_interval_ms: default_poll_interval_ms(),
            reconnect_interval_ms: default_reconnect_interval_ms(),
        }
    }
}

/// Analog axis normalization configuration
#[derive(Debug, Deserialize, Clone)]
pub struct AxisConfig {
    #[serde(default = "default_deadzone")]
    pub deadzone: f32,

    #[serde(default = "default_invert_y")]
    pub invert_left_y: bool,

    #[serde(default = "default_invert_y")]
    pub invert_right_y: bool,
}

impl Default for AxisConfig {
    fn default() -> Self {
        Self {
            deadzone: default_deadzone(),
            invert_left_y: default_invert_y(),
            invert_right_y: default_invert_y(),
        }
    }
}

/// Button bit→name table for report bytes 1 and 2.
///
/// Each field is a single-bit mask tested against the corresponding report
/// byte. The defaults reproduce the known mapping for the target hardware;
/// `left_shoulder` and `left_trigger` are user-reported assignments.
#[derive(Debug, Deserialize, Clone)]
pub struct ButtonMapConfig {
    #[serde(default)]
    pub byte1: Byte1Map,

    #[serde(default)]
    pub byte2: Byte2Map,
}

impl Default for ButtonMapConfig {
    fn default() -> Self {
        Self {
            byte1: Byte1Map::default(),
            byte2: Byte2Map::default(),
        }
    }
}

/// Bit masks tested against report byte 1
#[derive(Debug, Deserialize, Clone)]
pub struct Byte1Map {
    #[serde(default = "default_mask_a")]
    pub a: u8,

    #[serde(default = "default_mask_b")]
    pub b: u8,

    #[serde(default = "default_mask_x")]
    pub x: u8,

    #[serde(default = "default_mask_y")]
    pub y: u8,

    #[serde(default = "default_mask_left_shoulder")]
    pub left_shoulder: u8,

    #[serde(default = "default_mask_right_shoulder")]
    pub right_shoulder: u8,
}

impl Default for Byte1Map {
    fn default() -> Self {
        Self {
            a: default_mask_a(),
            b: default_mask_b(),
            x: default_mask_x(),
            y: default_mask_y(),
            left_shoulder: default_mask_left_shoulder(),
            right_shoulder: default_mask_right_shoulder(),
        }
    }
}

/// Bit masks tested against report byte 2
#[derive(Debug, Deserialize, Clone)]
pub struct Byte2Map {
    #[serde(default = "default_mask_left_trigger")]
    pub left_trigger: u8,

    #[serde(default = "default_mask_right_trigger")]
    pub right_trigger: u8,

    #[serde(default = "default_mask_select")]
    pub select: u8,

    #[serde(default = "default_mask_start")]
    pub start: u8,

    #[serde(default = "default_mask_home")]
    pub home: u8,

    #[serde(default = "default_mask_left_thumb")]
    pub left_thumb: u8,

    #[serde(default = "default_mask_right_thumb")]
    pub right_thumb: u8,
}

impl Default for Byte2Map {
    fn default() -> Self {
        Self {
            left_trigger: default_mask_left_trigger(),
            right_trigger: default_mask_right_trigger(),
            select: default_mask_select(),
            start: default_mask_start(),
            home: default_mask_home(),
            left_thumb: default_mask_left_thumb(),
            right_thumb: default_mask_right_thumb(),
        }
    }
}

/// Virtual gamepad configuration
#[derive(Debug, Deserialize, Clone)]
pub struct VirtualDeviceConfig {
    #[serde(default = "default_device_name")]
    pub name: String,
}

impl Default for VirtualDeviceConfig {
    fn default() -> Self {
        Self {
            name: default_device_name(),
        }
    }
}

// Default value functions
fn default_vendor_id() -> u16 { 0x2dc8 }
fn default_product_id() -> u16 { 0x301f }
fn default_report_size() -> usize { 64 }
fn default_poll_interval_ms() -> u64 { 5 }
fn default_reconnect_interval_ms() -> u64 { 1000 }

fn default_deadzone() -> f32 { 0.08 }
fn default_invert_y() -> bool { true }

fn default_mask_a() -> u8 { 0x01 }
fn default_mask_b() -> u8 { 0x02 }
fn default_mask_x() -> u8 { 0x08 }
fn default_mask_y() -> u8 { 0x10 }
fn default_mask_left_shoulder() -> u8 { 0x40 }
fn default_mask_right_shoulder() -> u8 { 0x80 }

fn default_mask_left_trigger() -> u8 { 0x01 }
fn default_mask_right_trigger() -> u8 { 0x02 }
fn default_mask_select() -> u8 { 0x04 }
fn default_mask_start() -> u8 { 0x08 }
fn default_mask_home() -> u8 { 0x10 }
fn default_mask_left_thumb() -> u8 { 0x20 }
fn default_mask_right_thumb() -> u8 { 0x40 }

fn default_device_name() -> String { "Gamepad Bridge Virtual Controller".to_string() }

impl Config {
    /// Load configuration from a TOML file
    ///
    /// # Arguments
    ///
    /// * `path` - Path to the configuration file
    ///
    /// # Returns
    ///
    /// * `Result<Config>` - Loaded and validated configuration
    ///
    /// # Errors
    ///
    /// Returns error if:
    /// - File cannot be read
    /// - TOML parsing fails
    /// - Validation fails
    ///
    /// # Examples
    ///
    /// ```no_run
    /// use gamepad_bridge::config::Config;
    ///
    /// let config = Config::load("config/default.toml")?;
    /// # Ok::<(), Box<dyn std::error::Error>>(())
    /// ```
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
    /// Returns error if any configuration value is out of valid range, or
    /// if the button bit table is not a bijection (a bit mapped to two
    /// buttons, or a mask that is not a single bit).
    pub fn validate(&self) -> Result<()> {
        if self.device.vendor_id == 0 || self.device.product_id == 0 {
            return Err(crate::error::BridgeError::Config(
                toml::de::Error::custom("vendor_id and product_id must be nonzero")
            ));
        }

        // Eight bytes is the minimum decodable report
        if self.device.report_size < crate::report::MIN_REPORT_LEN {
            return Err(crate::error::BridgeError::Config(
                toml::de::Error::custom(format!(
                    "report_size must be at least {}",
                    crate::report::MIN_REPORT_LEN
                ))
            ));
        }

        if self.device.poll_interval_ms == 0 || self.device.poll_interval_ms > 1000 {
            return Err(crate::error::BridgeError::Config(
                toml::de::Error::custom("poll_interval_ms must be between 1 and 1000")
            ));
        }

        if self.device.reconnect_interval_ms == 0 || self.device.reconnect_interval_ms > 60000 {
            return Err(crate::error::BridgeError::Config(
                toml::de::Error::custom("reconnect_interval_ms must be between 1 and 60000")
            ));
        }

        if self.axis.deadzone < 0.0 || self.axis.deadzone > 0.25 {
            return Err(crate::error::BridgeError::Config(
                toml::de::Error::custom("deadzone must be between 0.0 and 0.25")
            ));
        }

        if self.virtual_device.name.is_empty() {
            return Err(crate::error::BridgeError::Config(
                toml::de::Error::custom("virtual_device name cannot be empty")
            ));
        }

        // Reject double-mapped bits and multi-bit masks up front
        crate::report::ButtonMap::from_config(&self.buttons)?;

        Ok(())
    }
}
