//! # Reconnect Supervisor Module
//!
//! Drives the whole pipeline: locate the controller, poll it, decode each
//! report, normalize the axes, and apply the frame to the virtual gamepad,
//! reconnecting transparently when the device disappears.
//!
//! ## State Machine
//!
//! - `Searching` (initial): re-enumerate with a bounded retry delay until
//!   the controller is found, then open it and move to `Connected`.
//! - `Connected`: poll at a fixed cadence; each report becomes one
//!   committed frame; an I/O error moves through `Disconnected` back to
//!   `Searching`.
//! - External cancellation exits from any state; the device handle and the
//!   virtual gamepad session are released on every exit path.
//!
//! Device-not-found is an expected transient condition and is retried
//! indefinitely. Only virtual gamepad creation failure is fatal, and that
//! happens before this supervisor ever runs.

use hidapi::HidApi;
use tokio::sync::watch;
use tokio::time::{sleep, Duration};
use tracing::{info, warn};

use crate::config::Config;
use crate::error::{BridgeError, Result};
use crate::hid::{locate, ReportReader, ReportSource};
use crate::report::{decode, AxisNormalizer, ButtonMap, LogicalButton};
use crate::sink::{GamepadSink, Side, TRIGGER_FULL};

/// Number of bridged frames between heartbeat log lines (~10s at 200Hz)
const HEARTBEAT_INTERVAL_FRAMES: u64 = 2000;

/// Connection lifecycle of the physical controller.
///
/// Owned exclusively by the supervisor and mutated strictly sequentially;
/// no other component observes or changes it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConnectionState {
    Searching,
    Connected,
    Disconnected,
}

/// How one connected session ended
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum SessionEnd {
    /// Read failure; the handle is dead and searching resumes
    Disconnected,
    /// External cancellation was observed
    Shutdown,
}

/// Supervisor owning the decode pipeline and the sink.
///
/// Generic over the sink so the frame pipeline can be verified against a
/// recording mock.
pub struct Bridge<S: GamepadSink> {
    config: Config,
    sink: S,
    state: ConnectionState,
    button_map: ButtonMap,
    left_x: AxisNormalizer,
    left_y: AxisNormalizer,
    right_x: AxisNormalizer,
    right_y: AxisNormalizer,
    frames: u64,
}

impl<S: GamepadSink> Bridge<S> {
    /// Build the supervisor from validated configuration and a sink.
    ///
    /// # Errors
    ///
    /// Returns a configuration error if the button bit table does not
    /// validate.
    pub fn new(config: Config, sink: S) -> Result<Self> {
        let button_map = ButtonMap::from_config(&config.buttons)?;
        let deadzone = config.axis.deadzone;

        let vertical = |inverted: bool| {
            if inverted {
                AxisNormalizer::inverted(deadzone)
            } else {
                AxisNormalizer::new(deadzone)
            }
        };

        Ok(Self {
            left_x: AxisNormalizer::new(deadzone),
            left_y: vertical(config.axis.invert_left_y),
            right_x: AxisNormalizer::new(deadzone),
            right_y: vertical(config.axis.invert_right_y),
            button_map,
            sink,
            state: ConnectionState::Searching,
            frames: 0,
            config,
        })
    }

    /// Current connection state
    #[must_use]
    pub fn state(&self) -> ConnectionState {
        self.state
    }

    /// Total frames committed to the sink so far
    #[must_use]
    pub fn frames(&self) -> u64 {
        self.frames
    }

    /// Decode one raw report and commit it to the sink as one frame.
    ///
    /// The sink is reset, every decoded button is applied (digital trigger
    /// flags become full analog presses), the hat tuple becomes d-pad
    /// presses, both sticks are normalized and set, and the frame is
    /// committed atomically. Re-applying an identical report produces an
    /// identical frame.
    ///
    /// # Errors
    ///
    /// Returns `MalformedReport` for reports shorter than the minimum
    /// decodable length; the sink is not touched and the previously
    /// committed frame stands.
    pub fn apply_report(&mut self, report: &[u8]) -> Result<()> {
        let decoded = decode(report, &self.button_map)?;

        self.sink.reset();

        for button in decoded.buttons.pressed() {
            match button {
                LogicalButton::LeftTrigger => self.sink.set_trigger(Side::Left, TRIGGER_FULL),
                LogicalButton::RightTrigger => self.sink.set_trigger(Side::Right, TRIGGER_FULL),
                other => self.sink.press(other),
            }
        }

        let (up, down, left, right) = decoded.dpad.directions();
        if up {
            self.sink.press(LogicalButton::DpadUp);
        }
        if down {
            self.sink.press(LogicalButton::DpadDown);
        }
        if left {
            self.sink.press(LogicalButton::DpadLeft);
        }
        if right {
            self.sink.press(LogicalButton::DpadRight);
        }

        self.sink.set_stick(
            Side::Left,
            self.left_x.normalize(decoded.axes.left_x),
            self.left_y.normalize(decoded.axes.left_y),
        );
        self.sink.set_stick(
            Side::Right,
            self.right_x.normalize(decoded.axes.right_x),
            self.right_y.normalize(decoded.axes.right_y),
        );

        self.sink.commit()?;

        self.frames += 1;
        if self.frames % HEARTBEAT_INTERVAL_FRAMES == 0 {
            info!("Bridged {} frames", self.frames);
        }

        Ok(())
    }

    /// Run the supervisor until cancellation.
    ///
    /// # Errors
    ///
    /// Returns an error only if HID enumeration cannot be initialized at
    /// all; everything else is recovered by reconnecting.
    pub async fn run(mut self, mut shutdown: watch::Receiver<bool>) -> Result<()> {
        let mut api = HidApi::new()
            .map_err(|e| BridgeError::DeviceIo(format!("hidapi init failed: {}", e)))?;

        let vendor_id = self.config.device.vendor_id;
        let product_id = self.config.device.product_id;
        let reconnect = Duration::from_millis(self.config.device.reconnect_interval_ms);

        loop {
            self.state = ConnectionState::Searching;
            info!("Searching for controller {:04x}:{:04x}...", vendor_id, product_id);

            let descriptor = loop {
                if *shutdown.borrow() {
                    info!("Shutdown requested while searching");
                    return Ok(());
                }

                match locate(&mut api, vendor_id, product_id) {
                    Ok(descriptor) => break descriptor,
                    Err(BridgeError::DeviceNotFound) => {}
                    Err(e) => warn!("Enumeration failed: {}", e),
                }

                if wait_or_shutdown(&mut shutdown, reconnect).await {
                    info!("Shutdown requested while searching");
                    return Ok(());
                }
            };

            let mut reader =
                match ReportReader::open(&api, &descriptor, self.config.device.report_size) {
                    Ok(reader) => reader,
                    Err(e) => {
                        // The device can vanish between enumeration and open
                        warn!("Failed to open controller: {}", e);
                        if wait_or_shutdown(&mut shutdown, reconnect).await {
                            return Ok(());
                        }
                        continue;
                    }
                };

            info!("Connected to controller at {}", reader.device_path());
            self.state = ConnectionState::Connected;

            match self.run_connected(&mut reader, &mut shutdown).await {
                SessionEnd::Shutdown => {
                    info!("Shutdown requested, closing controller");
                    return Ok(());
                }
                SessionEnd::Disconnected => {
                    // Reader drops here, closing the handle exactly once
                    drop(reader);
                    if wait_or_shutdown(&mut shutdown, reconnect).await {
                        return Ok(());
                    }
                }
            }
        }
    }

    /// Poll the connected device until it fails or shutdown is requested.
    async fn run_connected<R: ReportSource>(
        &mut self,
        reader: &mut R,
        shutdown: &mut watch::Receiver<bool>,
    ) -> SessionEnd {
        let poll_interval = Duration::from_millis(self.config.device.poll_interval_ms);

        loop {
            match reader.poll() {
                Ok(Some(report)) => match self.apply_report(&report) {
                    Ok(()) => {}
                    Err(BridgeError::MalformedReport { len, min }) => {
                        // Previous committed frame stands unchanged
                        warn!("Discarding malformed report: {} bytes, need {}", len, min);
                    }
                    Err(e) => {
                        warn!("Failed to apply frame: {}", e);
                    }
                },
                Ok(None) => {}
                Err(e) => {
                    warn!("Controller disconnected: {}", e);
                    self.state = ConnectionState::Disconnected;
                    return SessionEnd::Disconnected;
                }
            }

            if wait_or_shutdown(shutdown, poll_interval).await {
                return SessionEnd::Shutdown;
            }
        }
    }
}

/// Sleep for one interval, returning `true` if shutdown was requested.
///
/// Cancellation is observed between polls: whichever of the sleep and the
/// shutdown signal finishes first wins.
async fn wait_or_shutdown(shutdown: &mut watch::Receiver<bool>, interval: Duration) -> bool {
    tokio::select! {
        _ = sleep(interval) => false,
        changed = shutdown.changed() => changed.is_err() || *shutdown.borrow(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::hid::reader::mocks::{MockPoll, MockReportSource};
    use crate::report::STICK_MAX;
    use crate::sink::mocks::MockGamepadSink;

    fn test_bridge() -> Bridge<MockGamepadSink> {
        Bridge::new(Config::default(), MockGamepadSink::new()).unwrap()
    }

    /// Report with the given button bytes and hat, sticks centered
    fn report(b1: u8, b2: u8, hat: u8) -> Vec<u8> {
        vec![0x00, b1, b2, hat, 128, 128, 128, 128]
    }

    #[test]
    fn test_scenario_a_only_button_a() {
        let mut bridge = test_bridge();
        bridge.apply_report(&report(0x01, 0x00, 0x0F)).unwrap();

        let frame = bridge.sink.last_committed().unwrap();
        assert_eq!(frame.buttons, vec![LogicalButton::A]);
        assert_eq!(frame.left_stick, (0, 0));
        assert_eq!(frame.right_stick, (0, 0));
        assert_eq!(frame.left_trigger, 0);
        assert_eq!(frame.right_trigger, 0);
    }

    #[test]
    fn test_scenario_b_hat_right_only() {
        let mut bridge = test_bridge();
        bridge.apply_report(&report(0x00, 0x00, 0x02)).unwrap();

        let frame = bridge.sink.last_committed().unwrap();
        assert_eq!(frame.buttons, vec![LogicalButton::DpadRight]);
    }

    #[test]
    fn test_scenario_d_identical_report_is_idempotent() {
        let mut bridge = test_bridge();
        let input = report(0x03, 0x08, 0x00);

        bridge.apply_report(&input).unwrap();
        bridge.apply_report(&input).unwrap();

        assert_eq!(bridge.sink.committed.len(), 2);
        assert_eq!(
            bridge.sink.committed[0], bridge.sink.committed[1],
            "Identical reports must produce identical frames"
        );
        assert_eq!(bridge.frames(), 2);
    }

    #[test]
    fn test_malformed_report_leaves_previous_frame_standing() {
        let mut bridge = test_bridge();
        bridge.apply_report(&report(0x01, 0x00, 0x0F)).unwrap();

        let result = bridge.apply_report(&[0x00, 0x01, 0x00]);
        assert!(matches!(
            result,
            Err(BridgeError::MalformedReport { len: 3, .. })
        ));

        // No new frame, no reset of the previous one
        assert_eq!(bridge.sink.committed.len(), 1);
        assert_eq!(
            bridge.sink.last_committed().unwrap().buttons,
            vec![LogicalButton::A]
        );
    }

    #[test]
    fn test_digital_triggers_become_full_analog_presses() {
        let mut bridge = test_bridge();
        bridge.apply_report(&report(0x00, 0x03, 0x0F)).unwrap();

        let frame = bridge.sink.last_committed().unwrap();
        assert_eq!(frame.left_trigger, TRIGGER_FULL);
        assert_eq!(frame.right_trigger, TRIGGER_FULL);
        assert!(
            frame.buttons.is_empty(),
            "Trigger flags must not also press buttons"
        );
    }

    #[test]
    fn test_sticks_normalized_with_y_inversion() {
        let mut bridge = test_bridge();
        // Left stick: X full right, Y raw 0 (up); right stick centered
        bridge
            .apply_report(&[0x00, 0x00, 0x00, 0x0F, 255, 0, 128, 128])
            .unwrap();

        let frame = bridge.sink.last_committed().unwrap();
        assert_eq!(
            frame.left_stick.0,
            AxisNormalizer::new(0.08).normalize(255),
            "X should pass through the direct normalizer"
        );
        // Raw 0 is the full negative scale; default invert_left_y flips it
        assert_eq!(frame.left_stick.1, STICK_MAX);
        assert_eq!(frame.right_stick, (0, 0));
    }

    #[test]
    fn test_diagonal_hat_presses_two_dpad_buttons() {
        let mut bridge = test_bridge();
        bridge.apply_report(&report(0x00, 0x00, 0x05)).unwrap();

        let frame = bridge.sink.last_committed().unwrap();
        assert_eq!(
            frame.buttons,
            vec![LogicalButton::DpadDown, LogicalButton::DpadLeft]
        );
    }

    #[test]
    fn test_every_frame_starts_from_reset() {
        let mut bridge = test_bridge();
        bridge.apply_report(&report(0x1B, 0x7C, 0x02)).unwrap();
        bridge.apply_report(&report(0x00, 0x00, 0x0F)).unwrap();

        let frame = bridge.sink.last_committed().unwrap();
        assert!(frame.buttons.is_empty(), "Released buttons must not persist");
        assert_eq!(bridge.sink.reset_count, 2);
    }

    #[tokio::test]
    async fn test_scenario_c_read_failure_moves_to_searching() {
        let mut bridge = test_bridge();
        let mut source = MockReportSource::new(vec![
            MockPoll::Report(report(0x01, 0x00, 0x0F)),
            MockPoll::Error,
        ]);
        let (_tx, mut shutdown) = watch::channel(false);

        bridge.state = ConnectionState::Connected;
        let end = bridge.run_connected(&mut source, &mut shutdown).await;

        assert_eq!(end, SessionEnd::Disconnected);
        assert_eq!(bridge.state(), ConnectionState::Disconnected);
        // The frame read before the failure was still bridged
        assert_eq!(bridge.sink.committed.len(), 1);
        assert_eq!(source.poll_count, 2);
    }

    #[tokio::test]
    async fn test_shutdown_observed_between_polls() {
        let mut bridge = test_bridge();
        let mut source = MockReportSource::new(vec![
            MockPoll::Empty,
            MockPoll::Empty,
            MockPoll::Empty,
            MockPoll::Empty,
        ]);
        let (tx, mut shutdown) = watch::channel(false);
        tx.send(true).unwrap();

        let end = bridge.run_connected(&mut source, &mut shutdown).await;

        assert_eq!(end, SessionEnd::Shutdown);
        assert!(source.poll_count <= 2, "Shutdown must be observed promptly");
    }

    #[tokio::test]
    async fn test_empty_polls_commit_nothing() {
        let mut bridge = test_bridge();
        let mut source = MockReportSource::new(vec![
            MockPoll::Empty,
            MockPoll::Empty,
            MockPoll::Error,
        ]);
        let (_tx, mut shutdown) = watch::channel(false);

        let end = bridge.run_connected(&mut source, &mut shutdown).await;

        assert_eq!(end, SessionEnd::Disconnected);
        assert!(bridge.sink.committed.is_empty());
        assert_eq!(bridge.frames(), 0);
    }

    #[tokio::test]
    async fn test_malformed_report_does_not_end_session() {
        let mut bridge = test_bridge();
        let mut source = MockReportSource::new(vec![
            MockPoll::Report(vec![0x00, 0x01]),
            MockPoll::Report(report(0x02, 0x00, 0x0F)),
            MockPoll::Error,
        ]);
        let (_tx, mut shutdown) = watch::channel(false);

        let end = bridge.run_connected(&mut source, &mut shutdown).await;

        assert_eq!(end, SessionEnd::Disconnected);
        assert_eq!(bridge.sink.committed.len(), 1, "Only the valid report commits");
        assert_eq!(
            bridge.sink.last_committed().unwrap().buttons,
            vec![LogicalButton::B]
        );
    }

    #[test]
    fn test_new_bridge_starts_searching() {
        let bridge = test_bridge();
        assert_eq!(bridge.state(), ConnectionState::Searching);
        assert_eq!(bridge.frames(), 0);
    }

    #[test]
    fn test_invalid_button_map_rejected_at_construction() {
        let mut config = Config::default();
        config.buttons.byte1.b = config.buttons.byte1.a;

        let result = Bridge::new(config, MockGamepadSink::new());
        assert!(result.is_err());
    }

    #[tokio::test]
    async fn test_wait_or_shutdown_times_out_without_signal() {
        let (_tx, mut shutdown) = watch::channel(false);
        let requested = wait_or_shutdown(&mut shutdown, Duration::from_millis(1)).await;
        assert!(!requested);
    }

    #[tokio::test]
    async fn test_wait_or_shutdown_sees_dropped_sender_as_shutdown() {
        let (tx, mut shutdown) = watch::channel(false);
        drop(tx);
        let requested = wait_or_shutdown(&mut shutdown, Duration::from_secs(60)).await;
        assert!(requested, "Dropped sender must unblock the wait");
    }
}
