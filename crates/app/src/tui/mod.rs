//! Terminal User Interface
//!
//! Interactive view of the selected device: current status, scan-and-select
//! dialog, enable/disable actions, and a scrolling activity log.

pub mod app;
pub mod events;
pub mod ui;

pub use app::run;
