//! Common utilities for usb-switch
//!
//! Shared plumbing between the UI and the device worker: the application
//! error type, logging setup, and the async channel bridge that connects the
//! Tokio runtime to the blocking device worker thread.

pub mod channel;
pub mod error;
pub mod logging;

pub use channel::{
    DeviceBridge, DeviceCommand, DeviceEvent, DeviceWorker, create_device_bridge,
};
pub use error::{Error, Result};
pub use logging::setup_logging;
