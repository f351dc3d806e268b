//! # Report Module
//!
//! Decoding of raw HID input reports into structured controller state.
//!
//! This module handles:
//! - The validated bit→button table built from configuration
//! - Decoding button bitmasks, the hat nibble, and raw axis bytes
//! - Deadzone-corrected axis normalization

pub mod axis;
pub mod buttons;
pub mod decoder;

pub use axis::{AxisNormalizer, STICK_MAX};
pub use buttons::{ButtonMap, ButtonMapEntry, ButtonState, LogicalButton, ReportByte};
pub use decoder::{decode, DecodedReport, DpadDirection, RawAxes, MIN_REPORT_LEN};
