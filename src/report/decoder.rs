//! # Report Decoder Module
//!
//! Turns one raw HID input report into structured button, directional-pad,
//! and raw axis state.
//!
//! ## Report Layout
//!
//! | Byte | Content |
//! |------|---------|
//! | 0 | Report id (ignored) |
//! | 1 | Button bitmask A |
//! | 2 | Button bitmask B |
//! | 3 | Hat nibble: 0–7 = compass directions, 8–15 = neutral |
//! | 4 | Left stick X (unsigned, 128 = center) |
//! | 5 | Left stick Y |
//! | 6 | Right stick X |
//! | 7 | Right stick Y |
//!
//! Decoding is a pure function: identical input always yields identical
//! output, nothing is accumulated across calls, and no per-call state is
//! allocated beyond the returned value.

use crate::error::{BridgeError, Result};
use crate::report::buttons::{ButtonMap, ButtonState};

/// Minimum report length required to decode
pub const MIN_REPORT_LEN: usize = 8;

/// Directional-pad state: 8 compass points or neutral.
///
/// Hat nibble values 0–7 map to the compass points in clockwise order
/// starting at Up; values 8–15 are neutral.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum DpadDirection {
    Up,
    UpRight,
    Right,
    DownRight,
    Down,
    DownLeft,
    Left,
    UpLeft,
    #[default]
    Neutral,
}

impl DpadDirection {
    /// Decode a hat nibble into a pad direction
    #[must_use]
    pub fn from_hat(hat: u8) -> Self {
        match hat {
            0 => DpadDirection::Up,
            1 => DpadDirection::UpRight,
            2 => DpadDirection::Right,
            3 => DpadDirection::DownRight,
            4 => DpadDirection::Down,
            5 => DpadDirection::DownLeft,
            6 => DpadDirection::Left,
            7 => DpadDirection::UpLeft,
            // 0x0F is the documented rest value; everything >= 8 is neutral
            _ => DpadDirection::Neutral,
        }
    }

    /// Project the direction onto `(up, down, left, right)` flags.
    ///
    /// Diagonals combine exactly two flags; the projection never sets both
    /// vertical or both horizontal flags at once.
    #[must_use]
    pub fn directions(&self) -> (bool, bool, bool, bool) {
        match self {
            DpadDirection::Up => (true, false, false, false),
            DpadDirection::UpRight => (true, false, false, true),
            DpadDirection::Right => (false, false, false, true),
            DpadDirection::DownRight => (false, true, false, true),
            DpadDirection::Down => (false, true, false, false),
            DpadDirection::DownLeft => (false, true, true, false),
            DpadDirection::Left => (false, false, true, false),
            DpadDirection::UpLeft => (true, false, true, false),
            DpadDirection::Neutral => (false, false, false, false),
        }
    }
}

/// Raw unsigned axis bytes from one report (128 = logical center)
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RawAxes {
    pub left_x: u8,
    pub left_y: u8,
    pub right_x: u8,
    pub right_y: u8,
}

/// Structured state decoded from one report
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DecodedReport {
    pub buttons: ButtonState,
    pub dpad: DpadDirection,
    pub axes: RawAxes,
}

/// Decode a raw report into structured state.
///
/// Byte 0 (the report id) is ignored. Each entry of the bit table is
/// tested against its report byte; the hat nibble and the four raw axis
/// bytes are extracted as-is.
///
/// # Errors
///
/// Returns `MalformedReport` if the report is shorter than
/// [`MIN_REPORT_LEN`]. The caller discards such reports so the previously
/// committed frame stands unchanged.
///
/// # Examples
///
/// ```
/// use gamepad_bridge::config::ButtonMapConfig;
/// use gamepad_bridge::report::{decode, ButtonMap, DpadDirection};
///
/// let map = ButtonMap::from_config(&ButtonMapConfig::default())?;
/// let report = [0x00, 0x01, 0x00, 0x0F, 128, 128, 128, 128];
///
/// let decoded = decode(&report, &map)?;
/// assert!(decoded.buttons.a);
/// assert_eq!(decoded.dpad, DpadDirection::Neutral);
/// # Ok::<(), gamepad_bridge::error::BridgeError>(())
/// ```
pub fn decode(report: &[u8], map: &ButtonMap) -> Result<DecodedReport> {
    if report.len() < MIN_REPORT_LEN {
        return Err(BridgeError::MalformedReport {
            len: report.len(),
            min: MIN_REPORT_LEN,
        });
    }

    let mut buttons = ButtonState::default();
    for entry in map.entries() {
        if report[entry.byte.index()] & entry.mask != 0 {
            buttons.set(entry.button);
        }
    }

    Ok(DecodedReport {
        buttons,
        dpad: DpadDirection::from_hat(report[3]),
        axes: RawAxes {
            left_x: report[4],
            left_y: report[5],
            right_x: report[6],
            right_y: report[7],
        },
    })
}
