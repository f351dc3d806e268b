//! # Gamepad Bridge
//!
//! Bridge a USB HID controller to a virtual gamepad via Linux uinput.
//!
//! Reads fixed-format input reports from the physical controller, decodes
//! buttons, d-pad, and analog sticks, and mirrors the state onto a virtual
//! gamepad the host treats as a real input device.
//!
//! # Control Flow
//!
//! 1. **Initialization**
//!    - Set up logging with tracing subscriber
//!    - Load configuration (optional TOML file, defaults otherwise)
//!    - Create the virtual gamepad session (fatal on failure)
//!
//! 2. **Main Loop** (reconnect supervisor)
//!    - Search for the controller, retrying until it appears
//!    - Poll it at ~200Hz; each report becomes one committed frame
//!    - On read failure, drop the handle and go back to searching
//!
//! 3. **Graceful Shutdown**
//!    - Ctrl+C flips the shutdown signal observed between polls
//!    - The device handle and the virtual gamepad are torn down
//!
//! # Errors
//!
//! Exits with an error if:
//! - The configuration file is present but invalid
//! - The virtual gamepad session cannot be created (uinput unavailable)
//!
//! A missing physical controller is never an error: the bridge waits for
//! it to appear and survives unplugging it at any time.
//!
//! # Examples
//!
//! Run with the default configuration:
//! ```bash
//! cargo run --release
//! ```
//!
//! Expected output:
//! ```text
//! INFO gamepad_bridge: Gamepad Bridge v0.1.0 starting...
//! INFO gamepad_bridge: Target controller: 2dc8:301f, deadzone 8%
//! INFO gamepad_bridge::sink::uinput: Virtual gamepad 'Gamepad Bridge Virtual Controller' created
//! INFO gamepad_bridge::bridge: Searching for controller 2dc8:301f...
//! INFO gamepad_bridge::bridge: Connected to controller at /dev/hidraw3
//! ```

use anyhow::{Context, Result};
use std::path::Path;
use tokio::sync::watch;
use tracing::info;
use tracing_subscriber;

use gamepad_bridge::bridge::Bridge;
use gamepad_bridge::config::Config;
use gamepad_bridge::sink::UinputGamepad;

/// Configuration file used when no path is given on the command line
const DEFAULT_CONFIG_PATH: &str = "config/default.toml";

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize logging
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive(tracing::Level::INFO.into())
        )
        .init();

    info!("Gamepad Bridge v{} starting...", env!("CARGO_PKG_VERSION"));

    let config_path = std::env::args()
        .nth(1)
        .unwrap_or_else(|| DEFAULT_CONFIG_PATH.to_string());

    let config = if Path::new(&config_path).exists() {
        info!("Loading configuration from {}", config_path);
        Config::load(&config_path)
            .with_context(|| format!("Failed to load configuration from {}", config_path))?
    } else {
        info!("No configuration file at {}, using defaults", config_path);
        Config::default()
    };

    info!(
        "Target controller: {:04x}:{:04x}, deadzone {:.0}%",
        config.device.vendor_id,
        config.device.product_id,
        config.axis.deadzone * 100.0
    );

    // The virtual device session is the only fatal resource
    let sink = UinputGamepad::new(&config.virtual_device.name)
        .context("Failed to create virtual gamepad (is /dev/uinput accessible?)")?;

    let bridge = Bridge::new(config, sink)?;

    // Ctrl+C flips the shutdown signal; the supervisor observes it
    // between polls and unwinds through handle close and sink teardown
    let (shutdown_tx, shutdown_rx) = watch::channel(false);
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            info!("Received Ctrl+C, shutting down...");
            let _ = shutdown_tx.send(true);
        }
    });

    info!("Bridge active, press Ctrl+C to stop");
    bridge.run(shutdown_rx).await?;

    info!("Bridge stopped cleanly");
    Ok(())
}
