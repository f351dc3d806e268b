//! # Device Locator Module
//!
//! Finds the target physical controller among attached HID devices.
//!
//! A single physical controller commonly exposes several HID interfaces
//! (keyboard shim, vendor channel, gamepad collection). Matching on
//! vendor/product identity alone can pick the wrong one, so the locator
//! prefers the interface whose usage identifies the gamepad collection and
//! only falls back to the first identity match when no such interface
//! exists.
//!
//! Enumeration is read-only: no handle is opened here.

use hidapi::HidApi;
use std::ffi::CString;
use tracing::debug;

use crate::error::{BridgeError, Result};

/// HID usage page for Generic Desktop controls
pub const USAGE_PAGE_GENERIC_DESKTOP: u16 = 0x01;

/// Generic Desktop usage for a joystick collection
pub const USAGE_JOYSTICK: u16 = 0x04;

/// Generic Desktop usage for a gamepad collection
pub const USAGE_GAMEPAD: u16 = 0x05;

/// Identity and location of one enumerated HID interface.
///
/// Populated and validated once at discovery time; the `path` is the
/// platform-specific open token handed to [`crate::hid::ReportReader`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeviceDescriptor {
    pub vendor_id: u16,
    pub product_id: u16,
    pub usage_page: u16,
    pub usage: u16,
    pub path: CString,
}

impl DeviceDescriptor {
    /// True when this interface exposes the gamepad (or joystick) collection
    #[must_use]
    pub fn is_gamepad_interface(&self) -> bool {
        self.usage_page == USAGE_PAGE_GENERIC_DESKTOP
            && (self.usage == USAGE_GAMEPAD || self.usage == USAGE_JOYSTICK)
    }
}

/// Enumerate attached HID devices and locate the target controller.
///
/// Re-runs enumeration on every call so a device that was just replugged
/// is seen. Among interfaces matching the identity pair, the gamepad
/// collection is preferred; otherwise the first match wins.
///
/// # Errors
///
/// - `DeviceNotFound`: no attached interface matches the identity pair
/// - `DeviceIo`: the platform enumeration itself failed
pub fn locate(api: &mut HidApi, vendor_id: u16, product_id: u16) -> Result<DeviceDescriptor> {
    api.refresh_devices()
        .map_err(|e| BridgeError::DeviceIo(format!("HID enumeration failed: {}", e)))?;

    let matches: Vec<DeviceDescriptor> = api
        .device_list()
        .filter(|info| info.vendor_id() == vendor_id && info.product_id() == product_id)
        .map(|info| DeviceDescriptor {
            vendor_id: info.vendor_id(),
            product_id: info.product_id(),
            usage_page: info.usage_page(),
            usage: info.usage(),
            path: info.path().to_owned(),
        })
        .collect();

    for candidate in &matches {
        debug!(
            "Candidate interface for {:04x}:{:04x}: usage_page=0x{:02x} usage=0x{:02x} path={:?}",
            vendor_id, product_id, candidate.usage_page, candidate.usage, candidate.path
        );
    }

    select_interface(matches).ok_or(BridgeError::DeviceNotFound)
}

/// Pick the preferred interface among identity matches.
///
/// Prefers the gamepad collection; falls back to the first match by
/// enumeration order when none of the interfaces advertises one.
#[must_use]
pub fn select_interface(matches: Vec<DeviceDescriptor>) -> Option<DeviceDescriptor> {
    if let Some(index) = matches.iter().position(DeviceDescriptor::is_gamepad_interface) {
        return matches.into_iter().nth(index);
    }
    matches.into_iter().next()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn descriptor(usage_page: u16, usage: u16, path: &str) -> DeviceDescriptor {
        DeviceDescriptor {
            vendor_id: 0x2dc8,
            product_id: 0x301f,
            usage_page,
            usage,
            path: CString::new(path).unwrap(),
        }
    }

    #[test]
    fn test_usage_constants() {
        assert_eq!(USAGE_PAGE_GENERIC_DESKTOP, 0x01);
        assert_eq!(USAGE_JOYSTICK, 0x04);
        assert_eq!(USAGE_GAMEPAD, 0x05);
    }

    #[test]
    fn test_gamepad_interface_detection() {
        assert!(descriptor(0x01, 0x05, "a").is_gamepad_interface());
        assert!(descriptor(0x01, 0x04, "a").is_gamepad_interface());
        assert!(!descriptor(0x01, 0x06, "a").is_gamepad_interface(), "keyboard usage");
        assert!(!descriptor(0x0c, 0x05, "a").is_gamepad_interface(), "wrong usage page");
    }

    #[test]
    fn test_gamepad_interface_preferred() {
        let matches = vec![
            descriptor(0x01, 0x06, "/dev/hidraw0"),
            descriptor(0x01, 0x05, "/dev/hidraw1"),
            descriptor(0x0c, 0x01, "/dev/hidraw2"),
        ];

        let selected = select_interface(matches).expect("Should select an interface");
        assert_eq!(selected.path, CString::new("/dev/hidraw1").unwrap());
        assert!(selected.is_gamepad_interface());
    }

    #[test]
    fn test_fallback_to_first_identity_match() {
        let matches = vec![
            descriptor(0x01, 0x06, "/dev/hidraw0"),
            descriptor(0x0c, 0x01, "/dev/hidraw1"),
        ];

        let selected = select_interface(matches).expect("Should fall back to first match");
        assert_eq!(selected.path, CString::new("/dev/hidraw0").unwrap());
    }

    #[test]
    fn test_no_matches_selects_nothing() {
        assert!(select_interface(Vec::new()).is_none());
    }

    // Integration test - only runs with real hardware
    #[test]
    #[ignore]
    fn test_locate_with_real_hardware() {
        let mut api = HidApi::new().expect("hidapi should initialize");
        let result = locate(&mut api, 0x2dc8, 0x301f);

        if let Ok(descriptor) = result {
            println!("Found controller at {:?}", descriptor.path);
            assert_eq!(descriptor.vendor_id, 0x2dc8);
            assert_eq!(descriptor.product_id, 0x301f);
        } else {
            println!("No controller attached (this is OK without hardware)");
        }
    }
}
