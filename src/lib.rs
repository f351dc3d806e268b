//! # Gamepad Bridge Library
//!
//! Bridge a USB HID controller to a virtual gamepad exposed through Linux
//! uinput.
//!
//! This library provides the core functionality for reading fixed-format
//! binary input reports from a physical controller, decoding buttons,
//! directional pad, and analog sticks, and re-emitting the state as a
//! virtual gamepad frame, surviving physical disconnects transparently.

pub mod bridge;
pub mod config;
pub mod error;
pub mod hid;
pub mod report;
pub mod sink;
