//! # Report Reader Module
//!
//! Owns the open HID device handle and performs non-blocking polled reads.
//!
//! The device may stop producing reports without signaling a clean close,
//! so the handle is configured for non-blocking reads and polled on a
//! fixed cadence by the supervisor rather than read with blocking calls.
//! The handle is closed exactly once when the reader is dropped.

use hidapi::{HidApi, HidDevice};
use tracing::debug;

use crate::error::{BridgeError, Result};
use crate::hid::locator::DeviceDescriptor;

/// Source of raw input reports.
///
/// Trait seam between the supervisor loop and the physical device so the
/// loop can be exercised with scripted sources in tests.
pub trait ReportSource {
    /// Poll for one report.
    ///
    /// Returns `Ok(Some(report))` when a report was read, `Ok(None)` when
    /// no data is currently available, and `Err(DeviceIo)` when the handle
    /// is presumed dead (disconnection).
    fn poll(&mut self) -> Result<Option<Vec<u8>>>;
}

/// Open handle to the physical controller
pub struct ReportReader {
    device: HidDevice,
    device_path: String,
    report_size: usize,
}

impl std::fmt::Debug for ReportReader {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ReportReader")
            .field("device_path", &self.device_path)
            .field("report_size", &self.report_size)
            .finish_non_exhaustive()
    }
}

impl ReportReader {
    /// Open the device referenced by a locator result.
    ///
    /// The handle is switched to non-blocking mode immediately so `poll()`
    /// never suspends.
    ///
    /// # Errors
    ///
    /// Returns `DeviceIo` if the device cannot be opened or configured;
    /// the caller treats this like any other transient device failure and
    /// goes back to searching.
    pub fn open(api: &HidApi, descriptor: &DeviceDescriptor, report_size: usize) -> Result<Self> {
        let device = api
            .open_path(&descriptor.path)
            .map_err(|e| BridgeError::DeviceIo(format!("Failed to open {:?}: {}", descriptor.path, e)))?;

        device
            .set_blocking_mode(false)
            .map_err(|e| BridgeError::DeviceIo(format!("Failed to set non-blocking mode: {}", e)))?;

        let device_path = descriptor.path.to_string_lossy().into_owned();
        debug!("Opened HID device at {}", device_path);

        Ok(Self {
            device,
            device_path,
            report_size,
        })
    }

    /// Get the platform path this reader was opened from
    #[must_use]
    pub fn device_path(&self) -> &str {
        &self.device_path
    }
}

impl ReportSource for ReportReader {
    fn poll(&mut self) -> Result<Option<Vec<u8>>> {
        let mut buf = vec![0u8; self.report_size];

        match self.device.read(&mut buf) {
            // Non-blocking read with nothing pending
            Ok(0) => Ok(None),
            Ok(n) => {
                buf.truncate(n);
                Ok(Some(buf))
            }
            Err(e) => Err(BridgeError::DeviceIo(format!(
                "Read failed on {}: {}",
                self.device_path, e
            ))),
        }
    }
}


#[cfg(test)]
mod tests {
    use super::mocks::{MockPoll, MockReportSource};
    use super::*;

    #[test]
    fn test_mock_source_follows_script() {
        let mut source = MockReportSource::new(vec![
            MockPoll::Report(vec![0, 1, 0, 15, 128, 128, 128, 128]),
            MockPoll::Empty,
            MockPoll::Error,
        ]);

        assert!(matches!(source.poll(), Ok(Some(_))));
        assert!(matches!(source.poll(), Ok(None)));
        assert!(matches!(source.poll(), Err(BridgeError::DeviceIo(_))));
        assert_eq!(source.poll_count, 3);
    }

    #[test]
    fn test_exhausted_mock_source_errors() {
        let mut source = MockReportSource::new(Vec::new());
        assert!(source.poll().is_err());
    }

    // Integration test - only runs with real hardware
    #[test]
    #[ignore]
    fn test_open_and_poll_with_real_hardware() {
        let mut api = HidApi::new().expect("hidapi should initialize");
        let descriptor = crate::hid::locator::locate(&mut api, 0x2dc8, 0x301f)
            .expect("Controller must be attached for this test");

        let mut reader = ReportReader::open(&api, &descriptor, 64).expect("Should open device");
        assert!(!reader.device_path().is_empty());

        // Non-blocking poll must return promptly with or without data
        let outcome = reader.poll();
        assert!(outcome.is_ok());
    }
}
