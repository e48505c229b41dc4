//! Parsing of device-enumeration output
//!
//! `pnputil /enum-devices` prints one block per device, introduced by an
//! `Instance ID:` line (`实例 ID:` on localized builds). Blocks are free
//! multi-line text; the fields of interest are the instance path and the
//! device description. `devcon findall` prints alternating identifier and
//! name lines instead.

use crate::pattern::{USB_ID_PREFIX, extract_vid_pid, trim_identifier};
use crate::types::{DeviceRecord, UNKNOWN_DEVICE_NAME, VidPid};

/// Per-device delimiter keywords, English and localized.
const BLOCK_DELIMITERS: [&str; 2] = ["Instance ID:", "实例 ID:"];

/// Labels introducing the human-readable description field.
const DESCRIPTION_LABELS: [&str; 2] = ["Device Description:", "设备描述:"];

/// Split raw enumeration output into segments on the per-device delimiter
/// lines. The segment before the first delimiter (tool banner, warnings) is
/// kept; it simply never matches anything downstream.
pub fn split_blocks(raw: &str) -> Vec<&str> {
    let mut cuts: Vec<(usize, usize)> = Vec::new();
    for delim in BLOCK_DELIMITERS {
        let mut from = 0;
        while let Some(pos) = raw[from..].find(delim) {
            let at = from + pos;
            cuts.push((at, at + delim.len()));
            from = at + delim.len();
        }
    }
    cuts.sort_unstable();

    let mut blocks = Vec::with_capacity(cuts.len() + 1);
    let mut start = 0;
    for (at, end) in cuts {
        blocks.push(&raw[start..at]);
        start = end;
    }
    blocks.push(&raw[start..]);
    blocks
}

/// Whether a block describes a device carrying the given Vendor/Product pair:
/// it must contain `USB`, the vendor token, and the product token in that
/// order, case-insensitive, anywhere across its lines.
fn block_matches(block: &str, vp: VidPid) -> bool {
    let upper = block.to_ascii_uppercase();
    let vid_token = format!("VID_{:04X}", vp.vid);
    let pid_token = format!("PID_{:04X}", vp.pid);

    let Some(usb_at) = upper.find("USB") else {
        return false;
    };
    let Some(vid_at) = upper[usb_at..].find(&vid_token) else {
        return false;
    };
    upper[usb_at + vid_at + vid_token.len()..].contains(&pid_token)
}

/// Extract the full instance identifier from a block: the text from the
/// `USB\VID_` prefix up to end-of-line, trimmed of quotes and whitespace.
pub fn extract_full_id(block: &str) -> Option<String> {
    let upper = block.to_ascii_uppercase();
    let start = upper.find(USB_ID_PREFIX)?;
    let rest = &block[start..];
    let end = rest.find(['\r', '\n']).unwrap_or(rest.len());
    let id = trim_identifier(&rest[..end]);
    (!id.is_empty()).then(|| id.to_string())
}

/// Extract the device description from a block, defaulting to the
/// unknown-device placeholder when the field is absent or empty.
pub fn extract_description(block: &str) -> String {
    let upper = block.to_ascii_uppercase();
    for label in DESCRIPTION_LABELS {
        let needle = label.to_ascii_uppercase();
        if let Some(at) = upper.find(&needle) {
            let rest = &block[at + label.len()..];
            let end = rest.find(['\r', '\n']).unwrap_or(rest.len());
            let name = rest[..end].trim();
            if !name.is_empty() {
                return name.to_string();
            }
        }
    }
    UNKNOWN_DEVICE_NAME.to_string()
}

/// Resolve a partial identifier pattern against raw enumeration output.
///
/// Returns a record for every block containing the pattern's Vendor/Product
/// pair, in block order — no dedup, no sort. A pattern without hex tokens
/// resolves to no devices.
pub fn resolve_partial(raw: &str, pattern: &str) -> Vec<DeviceRecord> {
    let Ok(vp) = extract_vid_pid(trim_identifier(pattern)) else {
        return Vec::new();
    };

    split_blocks(raw)
        .into_iter()
        .filter(|block| block_matches(block, vp))
        .filter_map(|block| {
            extract_full_id(block).map(|id| DeviceRecord {
                id,
                name: extract_description(block),
            })
        })
        .collect()
}

/// Parse every device block in enumeration output, regardless of
/// Vendor/Product pair.
pub fn parse_listing(raw: &str) -> Vec<DeviceRecord> {
    split_blocks(raw)
        .into_iter()
        .filter(|block| !block.trim().is_empty())
        .filter_map(|block| {
            extract_full_id(block).map(|id| DeviceRecord {
                id,
                name: extract_description(block),
            })
        })
        .collect()
}

/// Parse `devcon findall` output: alternating identifier and name lines.
/// Only identifiers carrying both `VID_` and `PID_` tokens are kept.
pub fn parse_devcon_listing(raw: &str) -> Vec<DeviceRecord> {
    let lines: Vec<&str> = raw.lines().collect();
    let mut devices = Vec::new();

    let mut i = 0;
    while i + 1 < lines.len() {
        let id = trim_identifier(lines[i]);
        let name = lines[i + 1].trim();
        if id.contains("VID_") && id.contains("PID_") {
            devices.push(DeviceRecord {
                id: id.to_string(),
                name: if name.is_empty() {
                    UNKNOWN_DEVICE_NAME.to_string()
                } else {
                    name.to_string()
                },
            });
        }
        i += 2;
    }

    devices
}

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLE_ENGLISH: &str = "Microsoft PnP Utility\r\n\
\r\n\
Instance ID:                USB\\VID_174C&PID_1153\\5&1A2B3C4D&0&2\r\n\
Device Description:         ASMedia USB3.0 Hub\r\n\
Class Name:                 USB\r\n\
Status:                     Started\r\n\
\r\n\
Instance ID:                USB\\VID_174C&PID_1153\\MSFT3023456789013B\r\n\
Device Description:         USB Attached SCSI Mass Storage Device\r\n\
Class Name:                 SCSIAdapter\r\n\
Status:                     Started\r\n\
\r\n\
Instance ID:                USB\\VID_0001&PID_0002\\0000\r\n\
Device Description:         Generic USB Device\r\n\
Status:                     Started\r\n";

    const SAMPLE_LOCALIZED: &str = "\
实例 ID:    USB\\VID_174C&PID_1153\\MSFT3023456789013B\r\n\
设备描述:   USB 大容量存储设备\r\n\
状态:       已启动\r\n\
\r\n\
实例 ID:    USB\\VID_046D&PID_C52B\\6&ABC\r\n\
设备描述:   USB 输入设备\r\n\
状态:       已启动\r\n";

    #[test]
    fn test_split_blocks_counts_delimiters() {
        // Banner segment plus one segment per device
        assert_eq!(split_blocks(SAMPLE_ENGLISH).len(), 4);
        assert_eq!(split_blocks(SAMPLE_LOCALIZED).len(), 3);
        assert_eq!(split_blocks("no delimiters at all").len(), 1);
    }

    #[test]
    fn test_resolve_partial_returns_matching_blocks_in_order() {
        let devices = resolve_partial(SAMPLE_ENGLISH, "USB\\VID_174C&PID_1153");
        assert_eq!(devices.len(), 2);
        assert_eq!(devices[0].id, "USB\\VID_174C&PID_1153\\5&1A2B3C4D&0&2");
        assert_eq!(devices[0].name, "ASMedia USB3.0 Hub");
        assert_eq!(devices[1].id, "USB\\VID_174C&PID_1153\\MSFT3023456789013B");
        assert_eq!(devices[1].name, "USB Attached SCSI Mass Storage Device");
    }

    #[test]
    fn test_resolve_partial_case_insensitive_pattern() {
        let devices = resolve_partial(SAMPLE_ENGLISH, "usb\\vid_174c&pid_1153");
        assert_eq!(devices.len(), 2);
    }

    #[test]
    fn test_resolve_partial_localized_delimiters() {
        let devices = resolve_partial(SAMPLE_LOCALIZED, "USB\\VID_174C&PID_1153");
        assert_eq!(devices.len(), 1);
        assert_eq!(devices[0].id, "USB\\VID_174C&PID_1153\\MSFT3023456789013B");
        assert_eq!(devices[0].name, "USB 大容量存储设备");
    }

    #[test]
    fn test_resolve_partial_without_hex_tokens_is_empty() {
        assert!(resolve_partial(SAMPLE_ENGLISH, "no tokens here").is_empty());
        assert!(resolve_partial(SAMPLE_ENGLISH, "").is_empty());
    }

    #[test]
    fn test_resolve_partial_no_matching_blocks() {
        assert!(resolve_partial(SAMPLE_ENGLISH, "USB\\VID_DEAD&PID_BEEF").is_empty());
    }

    #[test]
    fn test_parse_listing_returns_all_devices() {
        let devices = parse_listing(SAMPLE_ENGLISH);
        assert_eq!(devices.len(), 3);
        assert_eq!(devices[2].id, "USB\\VID_0001&PID_0002\\0000");
        assert_eq!(devices[2].name, "Generic USB Device");
    }

    #[test]
    fn test_extract_full_id_trims_quotes_and_cr() {
        let block = "  \"USB\\VID_174C&PID_1153\\X\"\r\nStatus: Started\r\n";
        assert_eq!(
            extract_full_id(block).as_deref(),
            Some("USB\\VID_174C&PID_1153\\X")
        );
    }

    #[test]
    fn test_extract_description_defaults_to_placeholder() {
        let block = "  USB\\VID_0001&PID_0002\\0\r\nStatus: Started\r\n";
        assert_eq!(extract_description(block), UNKNOWN_DEVICE_NAME);
    }

    #[test]
    fn test_block_match_requires_ordered_tokens() {
        // PID before VID must not match
        let block = "  USB PID_1153 then VID_174C\r\n";
        let vp = VidPid {
            vid: 0x174C,
            pid: 0x1153,
        };
        assert!(!block_matches(block, vp));
        assert!(block_matches("  USB\\VID_174C&PID_1153\\X\r\n", vp));
    }

    #[test]
    fn test_parse_devcon_listing_pairs() {
        let raw = "USB\\VID_174C&PID_1153\\MSFT30\n\
ASMedia SCSI device\n\
ROOT\\SYSTEM\\0000\n\
System root device\n\
USB\\VID_046D&PID_C52B\\6&ABC\n\
Logitech Receiver\n";
        let devices = parse_devcon_listing(raw);
        assert_eq!(devices.len(), 2);
        assert_eq!(devices[0].id, "USB\\VID_174C&PID_1153\\MSFT30");
        assert_eq!(devices[0].name, "ASMedia SCSI device");
        assert_eq!(devices[1].name, "Logitech Receiver");
    }

    #[test]
    fn test_parse_devcon_listing_empty() {
        assert!(parse_devcon_listing("").is_empty());
        assert!(parse_devcon_listing("lonely line").is_empty());
    }
}
