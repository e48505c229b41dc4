//! Core device types

use std::fmt;

/// Placeholder name used when enumeration output carries no description field.
pub const UNKNOWN_DEVICE_NAME: &str = "Unknown device";

/// One enumerated device: full instance identifier plus a display name.
///
/// Uniqueness is by full `id`; names are not unique, and one Vendor/Product
/// pair may cover several physically attached devices.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeviceRecord {
    /// Hierarchical instance path, e.g. `USB\VID_174C&PID_1153\MSFT30…`
    pub id: String,
    /// Human-readable description from the enumeration output
    pub name: String,
}

/// A Vendor/Product ID pair extracted from a hardware identifier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct VidPid {
    pub vid: u16,
    pub pid: u16,
}

impl fmt::Display for VidPid {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:04x}:{:04x}", self.vid, self.pid)
    }
}

/// Enabled/disabled state of a device, derived fresh on every query.
///
/// External state can change outside this program's control at any time, so
/// a status is never cached.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DeviceStatus {
    /// The device is present and working
    Enabled,
    /// The device is present but disabled
    Disabled,
    /// Every query variant reported the identifier as not found
    NotFound,
    /// Every query variant failed to execute; no evidence either way
    Unknown,
}

impl DeviceStatus {
    /// Display label for UI and console output
    pub fn label(self) -> &'static str {
        match self {
            DeviceStatus::Enabled => "Enabled",
            DeviceStatus::Disabled => "Disabled",
            DeviceStatus::NotFound => "Not found",
            DeviceStatus::Unknown => "Unknown",
        }
    }

    pub fn is_disabled(self) -> bool {
        self == DeviceStatus::Disabled
    }
}

impl fmt::Display for DeviceStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_vid_pid_display() {
        let vp = VidPid {
            vid: 0x174C,
            pid: 0x1153,
        };
        assert_eq!(vp.to_string(), "174c:1153");

        let small = VidPid { vid: 0x1, pid: 0x2 };
        assert_eq!(small.to_string(), "0001:0002");
    }

    #[test]
    fn test_status_labels() {
        assert_eq!(DeviceStatus::Enabled.to_string(), "Enabled");
        assert_eq!(DeviceStatus::NotFound.label(), "Not found");
        assert!(DeviceStatus::Disabled.is_disabled());
        assert!(!DeviceStatus::Unknown.is_disabled());
    }
}
