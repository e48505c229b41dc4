//! Device-identifier resolution and status parsing for Windows PnP tools
//!
//! This crate understands the console output of `pnputil` and `devcon`: it
//! splits device enumerations into per-device blocks, resolves a partial
//! Vendor/Product ID pattern to full instance identifiers, and classifies
//! free-text status output into an enabled/disabled state. The tools phrase
//! their output differently across versions and locales (English and Chinese
//! forms are both understood), so everything here is keyword-driven rather
//! than format-driven.
//!
//! No process or file IO happens in this crate; callers feed it raw text.
//!
//! # Example
//!
//! ```
//! use pnp::{DeviceStatus, classify_status_text, resolve_partial};
//!
//! let raw = "Instance ID: USB\\VID_174C&PID_1153\\MSFT30ABCDEF\r\n\
//!            Device Description: USB Attached SCSI Mass Storage Device\r\n\
//!            Status: Started\r\n";
//!
//! let devices = resolve_partial(raw, "USB\\VID_174C&PID_1153");
//! assert_eq!(devices.len(), 1);
//! assert_eq!(devices[0].id, "USB\\VID_174C&PID_1153\\MSFT30ABCDEF");
//!
//! assert_eq!(classify_status_text(raw), DeviceStatus::Enabled);
//! ```

pub mod enumeration;
pub mod error;
pub mod pattern;
pub mod status;
pub mod types;

pub use enumeration::{
    extract_description, extract_full_id, parse_devcon_listing, parse_listing, resolve_partial,
    split_blocks,
};
pub use error::PnpError;
pub use pattern::{derive_partial_pattern, extract_vid_pid, trim_identifier};
pub use status::{classify_status_text, indicates_not_found};
pub use types::{DeviceRecord, DeviceStatus, UNKNOWN_DEVICE_NAME, VidPid};
