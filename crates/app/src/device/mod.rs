//! Device subsystem
//!
//! Enumerates USB devices and toggles them through the external PnP tools,
//! running every invocation on a dedicated worker thread so the UI never
//! blocks on a subprocess.

pub mod controller;
pub mod runner;
pub mod worker;

pub use controller::DeviceController;
pub use runner::{CommandOutput, CommandRunner, SystemRunner};
pub use worker::spawn_device_worker;
