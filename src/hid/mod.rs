//! # HID Module
//!
//! Physical controller discovery and report polling via hidapi.
//!
//! This module handles:
//! - Enumerating attached HID devices and matching the target identity
//! - Preferring the gamepad interface among multi-interface devices
//! - Owning the open handle and performing non-blocking polled reads

pub mod locator;
pub mod reader;

pub use locator::{locate, select_interface, DeviceDescriptor};
pub use reader::{ReportReader, ReportSource};
