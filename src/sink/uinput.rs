//! # Uinput Virtual Gamepad
//!
//! Exposes an Xbox-style virtual controller to the host through the Linux
//! uinput interface via evdev.
//!
//! ## Emitted Capabilities
//!
//! | Capability | evdev code | Range |
//! |------------|------------|-------|
//! | Face/system/thumb buttons | BTN_SOUTH..BTN_THUMBR | 0/1 |
//! | Left stick | ABS_X / ABS_Y | -32768..32767 |
//! | Right stick | ABS_RX / ABS_RY | -32768..32767 |
//! | Triggers | ABS_Z / ABS_RZ | 0..255 |
//! | D-pad | ABS_HAT0X / ABS_HAT0Y | -1..1 |
//!
//! Commit emits the whole accumulated frame as a single event batch, so
//! the kernel publishes it atomically at the SYN_REPORT boundary.

use evdev::uinput::{VirtualDevice, VirtualDeviceBuilder};
use evdev::{
    AbsInfo, AbsoluteAxisType, AttributeSet, EventType, InputEvent, Key, UinputAbsSetup,
};
use tracing::{debug, info};

use crate::error::{BridgeError, Result};
use crate::report::{LogicalButton, STICK_MAX};
use crate::sink::{GamepadSink, Side, TRIGGER_FULL};

/// Key codes for every digital button the virtual device exposes
const KEYMAP: [(LogicalButton, Key); 11] = [
    (LogicalButton::A, Key::BTN_SOUTH),
    (LogicalButton::B, Key::BTN_EAST),
    (LogicalButton::X, Key::BTN_WEST),
    (LogicalButton::Y, Key::BTN_NORTH),
    (LogicalButton::LeftShoulder, Key::BTN_TL),
    (LogicalButton::RightShoulder, Key::BTN_TR),
    (LogicalButton::Select, Key::BTN_SELECT),
    (LogicalButton::Start, Key::BTN_START),
    (LogicalButton::Home, Key::BTN_MODE),
    (LogicalButton::LeftThumb, Key::BTN_THUMBL),
    (LogicalButton::RightThumb, Key::BTN_THUMBR),
];

/// Accumulated state for the frame being built
#[derive(Debug, Clone, Copy, Default)]
struct FrameState {
    keys: [bool; KEYMAP.len()],
    left_trigger: u8,
    right_trigger: u8,
    left_x: i16,
    left_y: i16,
    right_x: i16,
    right_y: i16,
    hat_x: i32,
    hat_y: i32,
}

/// Virtual gamepad session backed by uinput.
///
/// Creating one is a one-time, process-wide operation; failure is fatal
/// to startup. The underlying device node is destroyed when this value is
/// dropped.
pub struct UinputGamepad {
    device: VirtualDevice,
    frame: FrameState,
}

impl std::fmt::Debug for UinputGamepad {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("UinputGamepad")
            .field("frame", &self.frame)
            .finish_non_exhaustive()
    }
}

impl UinputGamepad {
    /// Create the virtual gamepad device.
    ///
    /// # Arguments
    ///
    /// * `name` - Device name shown to the host
    ///
    /// # Errors
    ///
    /// Returns `SinkInit` if the uinput device cannot be created, most
    /// commonly because `/dev/uinput` is missing or not writable.
    pub fn new(name: &str) -> Result<Self> {
        let mut keys = AttributeSet::<Key>::new();
        for (_, key) in KEYMAP {
            keys.insert(key);
        }

        let stick_setup = AbsInfo::new(0, i16::MIN as i32, STICK_MAX as i32, 16, 128, 1);
        let trigger_setup = AbsInfo::new(0, 0, TRIGGER_FULL as i32, 0, 0, 1);
        let hat_setup = AbsInfo::new(0, -1, 1, 0, 0, 1);

        let device = VirtualDeviceBuilder::new()
            .map_err(|e| BridgeError::SinkInit(format!("uinput unavailable: {}", e)))?
            .name(name)
            .with_keys(&keys)
            .map_err(|e| BridgeError::SinkInit(e.to_string()))?
            .with_absolute_axis(&UinputAbsSetup::new(AbsoluteAxisType::ABS_X, stick_setup))
            .map_err(|e| BridgeError::SinkInit(e.to_string()))?
            .with_absolute_axis(&UinputAbsSetup::new(AbsoluteAxisType::ABS_Y, stick_setup))
            .map_err(|e| BridgeError::SinkInit(e.to_string()))?
            .with_absolute_axis(&UinputAbsSetup::new(AbsoluteAxisType::ABS_RX, stick_setup))
            .map_err(|e| BridgeError::SinkInit(e.to_string()))?
            .with_absolute_axis(&UinputAbsSetup::new(AbsoluteAxisType::ABS_RY, stick_setup))
            .map_err(|e| BridgeError::SinkInit(e.to_string()))?
            .with_absolute_axis(&UinputAbsSetup::new(AbsoluteAxisType::ABS_Z, trigger_setup))
            .map_err(|e| BridgeError::SinkInit(e.to_string()))?
            .with_absolute_axis(&UinputAbsSetup::new(AbsoluteAxisType::ABS_RZ, trigger_setup))
            .map_err(|e| BridgeError::SinkInit(e.to_string()))?
            .with_absolute_axis(&UinputAbsSetup::new(AbsoluteAxisType::ABS_HAT0X, hat_setup))
            .map_err(|e| BridgeError::SinkInit(e.to_string()))?
            .with_absolute_axis(&UinputAbsSetup::new(AbsoluteAxisType::ABS_HAT0Y, hat_setup))
            .map_err(|e| BridgeError::SinkInit(e.to_string()))?
            .build()
            .map_err(|e| BridgeError::SinkInit(format!("Failed to create device: {}", e)))?;

        info!("Virtual gamepad '{}' created", name);

        Ok(Self {
            device,
            frame: FrameState::default(),
        })
    }

    /// Index of a button within [`KEYMAP`], if it has a key code
    fn key_index(button: LogicalButton) -> Option<usize> {
        KEYMAP.iter().position(|(b, _)| *b == button)
    }
}

impl GamepadSink for UinputGamepad {
    fn reset(&mut self) {
        self.frame = FrameState::default();
    }

    fn press(&mut self, button: LogicalButton) {
        match button {
            // The d-pad is exposed as hat axes, not key codes
            LogicalButton::DpadUp => self.frame.hat_y = -1,
            LogicalButton::DpadDown => self.frame.hat_y = 1,
            LogicalButton::DpadLeft => self.frame.hat_x = -1,
            LogicalButton::DpadRight => self.frame.hat_x = 1,
            // Digital trigger flags arriving here become full presses
            LogicalButton::LeftTrigger => self.frame.left_trigger = TRIGGER_FULL,
            LogicalButton::RightTrigger => self.frame.right_trigger = TRIGGER_FULL,
            other => {
                if let Some(index) = Self::key_index(other) {
                    self.frame.keys[index] = true;
                }
            }
        }
    }

    fn set_trigger(&mut self, side: Side, value: u8) {
        match side {
            Side::Left => self.frame.left_trigger = value,
            Side::Right => self.frame.right_trigger = value,
        }
    }

    fn set_stick(&mut self, side: Side, x: i16, y: i16) {
        match side {
            Side::Left => {
                self.frame.left_x = x;
                self.frame.left_y = y;
            }
            Side::Right => {
                self.frame.right_x = x;
                self.frame.right_y = y;
            }
        }
    }

    fn commit(&mut self) -> Result<()> {
        let frame = &self.frame;
        let mut events = Vec::with_capacity(KEYMAP.len() + 8);

        for (index, (_, key)) in KEYMAP.iter().enumerate() {
            events.push(InputEvent::new(
                EventType::KEY,
                key.code(),
                frame.keys[index] as i32,
            ));
        }

        events.push(InputEvent::new(EventType::ABSOLUTE, AbsoluteAxisType::ABS_X.0, frame.left_x as i32));
        events.push(InputEvent::new(EventType::ABSOLUTE, AbsoluteAxisType::ABS_Y.0, frame.left_y as i32));
        events.push(InputEvent::new(EventType::ABSOLUTE, AbsoluteAxisType::ABS_RX.0, frame.right_x as i32));
        events.push(InputEvent::new(EventType::ABSOLUTE, AbsoluteAxisType::ABS_RY.0, frame.right_y as i32));
        events.push(InputEvent::new(EventType::ABSOLUTE, AbsoluteAxisType::ABS_Z.0, frame.left_trigger as i32));
        events.push(InputEvent::new(EventType::ABSOLUTE, AbsoluteAxisType::ABS_RZ.0, frame.right_trigger as i32));
        events.push(InputEvent::new(EventType::ABSOLUTE, AbsoluteAxisType::ABS_HAT0X.0, frame.hat_x));
        events.push(InputEvent::new(EventType::ABSOLUTE, AbsoluteAxisType::ABS_HAT0Y.0, frame.hat_y));

        // One emit call; evdev appends the SYN_REPORT frame boundary
        self.device
            .emit(&events)
            .map_err(|e| BridgeError::DeviceIo(format!("Failed to emit frame: {}", e)))?;

        debug!("Committed frame ({} events)", events.len());
        Ok(())
    }
}
