//! # Button Types and Bit Mapping
//!
//! Logical button identifiers, the per-frame button state, and the
//! validated bit→button table used by the decoder.
//!
//! The bit table is configuration data, not a protocol constant: button
//! assignments are hardware-revision-dependent, and two of the default
//! assignments are user-reported rather than vendor-documented. The table
//! is validated once at startup so a mis-mapping surfaces as a
//! configuration error instead of silent cross-talk between buttons.

use crate::config::ButtonMapConfig;
use crate::error::{BridgeError, Result};
use serde::de::Error;

/// Logical buttons understood by the bridge.
///
/// The first 13 variants can appear in the report bit table. The four
/// `Dpad*` variants exist only on the output side: they are synthesized
/// from the hat nibble, never from a bitmask.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum LogicalButton {
    A,
    B,
    X,
    Y,
    LeftShoulder,
    RightShoulder,
    /// Digital left trigger flag (emitted as a full analog press)
    LeftTrigger,
    /// Digital right trigger flag (emitted as a full analog press)
    RightTrigger,
    Select,
    Start,
    Home,
    LeftThumb,
    RightThumb,
    DpadUp,
    DpadDown,
    DpadLeft,
    DpadRight,
}

impl LogicalButton {
    /// Buttons that may appear in the report bit table
    pub const MAPPABLE: [LogicalButton; 13] = [
        LogicalButton::A,
        LogicalButton::B,
        LogicalButton::X,
        LogicalButton::Y,
        LogicalButton::LeftShoulder,
        LogicalButton::RightShoulder,
        LogicalButton::LeftTrigger,
        LogicalButton::RightTrigger,
        LogicalButton::Select,
        LogicalButton::Start,
        LogicalButton::Home,
        LogicalButton::LeftThumb,
        LogicalButton::RightThumb,
    ];

    /// Human-readable name for logging and diagnostics
    pub fn name(&self) -> &'static str {
        match self {
            LogicalButton::A => "A",
            LogicalButton::B => "B",
            LogicalButton::X => "X",
            LogicalButton::Y => "Y",
            LogicalButton::LeftShoulder => "LB",
            LogicalButton::RightShoulder => "RB",
            LogicalButton::LeftTrigger => "LT",
            LogicalButton::RightTrigger => "RT",
            LogicalButton::Select => "Select",
            LogicalButton::Start => "Start",
            LogicalButton::Home => "Home",
            LogicalButton::LeftThumb => "L3",
            LogicalButton::RightThumb => "R3",
            LogicalButton::DpadUp => "DpadUp",
            LogicalButton::DpadDown => "DpadDown",
            LogicalButton::DpadLeft => "DpadLeft",
            LogicalButton::DpadRight => "DpadRight",
        }
    }
}

/// Decoded button flags for one frame.
///
/// Derived purely from the two bitmask bytes of a report; immutable once
/// decoded.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ButtonState {
    pub a: bool,
    pub b: bool,
    pub x: bool,
    pub y: bool,
    pub left_shoulder: bool,
    pub right_shoulder: bool,
    pub left_trigger: bool,
    pub right_trigger: bool,
    pub select: bool,
    pub start: bool,
    pub home: bool,
    pub left_thumb: bool,
    pub right_thumb: bool,
}

impl ButtonState {
    /// Set the flag for a mappable button. Dpad variants are not part of
    /// the button state and are ignored.
    pub(crate) fn set(&mut self, button: LogicalButton) {
        match button {
            LogicalButton::A => self.a = true,
            LogicalButton::B => self.b = true,
            LogicalButton::X => self.x = true,
            LogicalButton::Y => self.y = true,
            LogicalButton::LeftShoulder => self.left_shoulder = true,
            LogicalButton::RightShoulder => self.right_shoulder = true,
            LogicalButton::LeftTrigger => self.left_trigger = true,
            LogicalButton::RightTrigger => self.right_trigger = true,
            LogicalButton::Select => self.select = true,
            LogicalButton::Start => self.start = true,
            LogicalButton::Home => self.home = true,
            LogicalButton::LeftThumb => self.left_thumb = true,
            LogicalButton::RightThumb => self.right_thumb = true,
            _ => {}
        }
    }

    /// Query a single button flag
    #[must_use]
    pub fn is_pressed(&self, button: LogicalButton) -> bool {
        match button {
            LogicalButton::A => self.a,
            LogicalButton::B => self.b,
            LogicalButton::X => self.x,
            LogicalButton::Y => self.y,
            LogicalButton::LeftShoulder => self.left_shoulder,
            LogicalButton::RightShoulder => self.right_shoulder,
            LogicalButton::LeftTrigger => self.left_trigger,
            LogicalButton::RightTrigger => self.right_trigger,
            LogicalButton::Select => self.select,
            LogicalButton::Start => self.start,
            LogicalButton::Home => self.home,
            LogicalButton::LeftThumb => self.left_thumb,
            LogicalButton::RightThumb => self.right_thumb,
            _ => false,
        }
    }

    /// Iterate over the buttons currently pressed
    pub fn pressed(&self) -> impl Iterator<Item = LogicalButton> + '_ {
        LogicalButton::MAPPABLE
            .iter()
            .copied()
            .filter(|b| self.is_pressed(*b))
    }

    /// True when no button is pressed
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.pressed().next().is_none()
    }
}

/// Which report byte a bit table entry tests
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReportByte {
    /// Report byte 1 (first button bitmask)
    ButtonsA,
    /// Report byte 2 (second button bitmask)
    ButtonsB,
}

impl ReportByte {
    /// Offset of this byte within a raw report
    #[must_use]
    pub fn index(&self) -> usize {
        match self {
            ReportByte::ButtonsA => 1,
            ReportByte::ButtonsB => 2,
        }
    }
}

/// One entry of the bit→button table
#[derive(Debug, Clone, Copy)]
pub struct ButtonMapEntry {
    pub button: LogicalButton,
    pub byte: ReportByte,
    pub mask: u8,
}

/// Validated bit→button table.
///
/// Construction guarantees that every mask is a single bit and that no bit
/// within a byte is mapped to more than one button, so decoding can test
/// each entry independently.
#[derive(Debug, Clone)]
pub struct ButtonMap {
    entries: Vec<ButtonMapEntry>,
}

impl ButtonMap {
    /// Build and validate the table from configuration
    ///
    /// # Errors
    ///
    /// Returns a configuration error if any mask is zero or has more than
    /// one bit set, or if two buttons within the same byte share a bit.
    pub fn from_config(config: &ButtonMapConfig) -> Result<Self> {
        let entries = vec![
            ButtonMapEntry { button: LogicalButton::A, byte: ReportByte::ButtonsA, mask: config.byte1.a },
            ButtonMapEntry { button: LogicalButton::B, byte: ReportByte::ButtonsA, mask: config.byte1.b },
            ButtonMapEntry { button: LogicalButton::X, byte: ReportByte::ButtonsA, mask: config.byte1.x },
            ButtonMapEntry { button: LogicalButton::Y, byte: ReportByte::ButtonsA, mask: config.byte1.y },
            ButtonMapEntry { button: LogicalButton::LeftShoulder, byte: ReportByte::ButtonsA, mask: config.byte1.left_shoulder },
            ButtonMapEntry { button: LogicalButton::RightShoulder, byte: ReportByte::ButtonsA, mask: config.byte1.right_shoulder },
            ButtonMapEntry { button: LogicalButton::LeftTrigger, byte: ReportByte::ButtonsB, mask: config.byte2.left_trigger },
            ButtonMapEntry { button: LogicalButton::RightTrigger, byte: ReportByte::ButtonsB, mask: config.byte2.right_trigger },
            ButtonMapEntry { button: LogicalButton::Select, byte: ReportByte::ButtonsB, mask: config.byte2.select },
            ButtonMapEntry { button: LogicalButton::Start, byte: ReportByte::ButtonsB, mask: config.byte2.start },
            ButtonMapEntry { button: LogicalButton::Home, byte: ReportByte::ButtonsB, mask: config.byte2.home },
            ButtonMapEntry { button: LogicalButton::LeftThumb, byte: ReportByte::ButtonsB, mask: config.byte2.left_thumb },
            ButtonMapEntry { button: LogicalButton::RightThumb, byte: ReportByte::ButtonsB, mask: config.byte2.right_thumb },
        ];

        let mut seen_a: u8 = 0;
        let mut seen_b: u8 = 0;

        for entry in &entries {
            if entry.mask == 0 || !entry.mask.is_power_of_two() {
                return Err(BridgeError::Config(toml::de::Error::custom(format!(
                    "button {} must map to exactly one bit, got mask 0x{:02x}",
                    entry.button.name(),
                    entry.mask
                ))));
            }

            let seen = match entry.byte {
                ReportByte::ButtonsA => &mut seen_a,
                ReportByte::ButtonsB => &mut seen_b,
            };

            if *seen & entry.mask != 0 {
                return Err(BridgeError::Config(toml::de::Error::custom(format!(
                    "bit 0x{:02x} in report byte {} is mapped to more than one button",
                    entry.mask,
                    entry.byte.index()
                ))));
            }
            *seen |= entry.mask;
        }

        Ok(Self { entries })
    }

    /// Entries of the validated table
    #[must_use]
    pub fn entries(&self) -> &[ButtonMapEntry] {
        &self.entries
    }
}
