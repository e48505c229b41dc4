//! End-to-end tests for identifier resolution and status classification
//!
//! Drives the parsing pipeline the way the application does: raw enumeration
//! text in, device records and status classifications out.

use pnp::{
    DeviceStatus, classify_status_text, derive_partial_pattern, indicates_not_found,
    resolve_partial, trim_identifier,
};

/// Two devices sharing a Vendor/Product pair plus one unrelated device,
/// with the field spacing pnputil actually emits.
const MIXED_ENUMERATION: &str = "Microsoft PnP Utility\r\n\
\r\n\
Instance ID:                USB\\VID_174C&PID_1153\\5&1A2B3C4D&0&2\r\n\
Device Description:         ASMedia USB3.0 Hub\r\n\
Class Name:                 USB\r\n\
Class GUID:                 {36fc9e60-c465-11cf-8056-444553540000}\r\n\
Driver Name:                usbhub3.inf\r\n\
Status:                     Started\r\n\
\r\n\
Instance ID:                USB\\VID_0001&PID_0002\\0000\r\n\
Device Description:         Generic USB Device\r\n\
Class Name:                 USB\r\n\
Status:                     Started\r\n\
\r\n\
Instance ID:                USB\\VID_174C&PID_1153\\MSFT3023456789013B\r\n\
Device Description:         USB Attached SCSI Mass Storage Device\r\n\
Class Name:                 SCSIAdapter\r\n\
Status:                     Disabled\r\n";

#[test]
fn resolves_only_blocks_carrying_the_pair() {
    let devices = resolve_partial(MIXED_ENUMERATION, "USB\\VID_174C&PID_1153");

    assert_eq!(devices.len(), 2);
    for device in &devices {
        let upper = device.id.to_ascii_uppercase();
        assert!(upper.contains("VID_174C"));
        assert!(upper.contains("PID_1153"));
    }
    // Original block order is preserved
    assert_eq!(devices[0].id, "USB\\VID_174C&PID_1153\\5&1A2B3C4D&0&2");
    assert_eq!(devices[1].id, "USB\\VID_174C&PID_1153\\MSFT3023456789013B");
}

#[test]
fn malformed_pattern_resolves_to_nothing() {
    assert!(resolve_partial(MIXED_ENUMERATION, "not an identifier").is_empty());
    assert!(resolve_partial(MIXED_ENUMERATION, "VID_&PID_").is_empty());
}

#[test]
fn resolved_identifier_round_trips_through_partial_derivation() {
    let devices = resolve_partial(MIXED_ENUMERATION, "USB\\VID_174C&PID_1153");
    for device in &devices {
        assert_eq!(
            derive_partial_pattern(&device.id).as_deref(),
            Some("USB\\VID_174C&PID_1153")
        );
    }
}

#[test]
fn quoted_identifier_trims_before_comparison() {
    let trimmed = trim_identifier(" \"USB\\VID_174C&PID_1153\" ");
    assert_eq!(trimmed, "USB\\VID_174C&PID_1153");
    // The trimmed form still resolves
    assert_eq!(resolve_partial(MIXED_ENUMERATION, trimmed).len(), 2);
}

#[test]
fn status_classification_per_block() {
    let devices = resolve_partial(MIXED_ENUMERATION, "USB\\VID_174C&PID_1153");
    assert_eq!(devices.len(), 2);

    // Classify each device's own block text
    let blocks: Vec<&str> = MIXED_ENUMERATION.split("Instance ID:").collect();
    assert_eq!(classify_status_text(blocks[1]), DeviceStatus::Enabled);
    assert_eq!(classify_status_text(blocks[3]), DeviceStatus::Disabled);
}

#[test]
fn not_found_output_is_not_classified() {
    let output = "The process cannot find the device instance specified.\r\n\
Devices were not found on the system.\r\n";
    assert!(indicates_not_found(output));
}
