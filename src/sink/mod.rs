//! # Virtual Gamepad Sink Module
//!
//! Output side of the bridge: the capability surface the supervisor needs
//! from the platform, plus the uinput implementation.
//!
//! A sink accumulates one frame of state (`reset`, `press`, `set_trigger`,
//! `set_stick`) and publishes it atomically with `commit`: everything
//! applied since the last commit becomes visible to downstream consumers
//! as one unit, never partially.

pub mod uinput;

pub use uinput::UinputGamepad;

use crate::error::Result;
use crate::report::LogicalButton;

/// Left or right half of the controller (sticks and triggers)
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Side {
    Left,
    Right,
}

/// Full analog press used for digital trigger flags
pub const TRIGGER_FULL: u8 = 255;

/// Capability surface required from the virtual gamepad.
///
/// Trait seam between the supervisor and the platform so frame
/// application can be verified against a recording mock in tests.
pub trait GamepadSink {
    /// Clear all pressed/axis state for the next frame
    fn reset(&mut self);

    /// Mark a button active for the current frame
    fn press(&mut self, button: LogicalButton);

    /// Set a trigger intensity (0 = released, 255 = fully pressed)
    fn set_trigger(&mut self, side: Side, value: u8);

    /// Set a stick position in the normalized signed output range
    fn set_stick(&mut self, side: Side, x: i16, y: i16);

    /// Publish the accumulated frame atomically
    fn commit(&mut self) -> Result<()>;
}
