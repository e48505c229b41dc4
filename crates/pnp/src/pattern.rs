//! Hardware-identifier pattern handling
//!
//! Identifiers arrive from config files and upstream tool output wrapped in
//! stray quotes and whitespace; every identifier consumed or produced by this
//! layer is trimmed before comparison or storage.

use crate::error::PnpError;
use crate::types::VidPid;

/// Device-path prefix shared by all USB instance identifiers.
pub const USB_ID_PREFIX: &str = "USB\\VID_";

/// Strip surrounding whitespace and stray quote characters from an identifier.
pub fn trim_identifier(raw: &str) -> &str {
    raw.trim().trim_matches(['"', '\'']).trim()
}

/// Extract the 4-hex-digit Vendor and Product ID tokens from a pattern.
///
/// Accepts any string containing `VID_xxxx` followed (anywhere later) by
/// `PID_xxxx`, case-insensitive. A pattern without both tokens is a
/// caller-input error, not a device-state error.
pub fn extract_vid_pid(pattern: &str) -> Result<VidPid, PnpError> {
    let upper = pattern.to_ascii_uppercase();

    let (vid_end, vid) = hex_token_after(&upper, 0, "VID_")
        .ok_or_else(|| PnpError::MissingVendorId(pattern.to_string()))?;
    let (_, pid) = hex_token_after(&upper, vid_end, "PID_")
        .ok_or_else(|| PnpError::MissingProductId(pattern.to_string()))?;

    Ok(VidPid { vid, pid })
}

/// Derive the partial Vendor/Product pattern from a full instance identifier:
/// the span from the `USB\VID_` prefix through the end of the `PID_xxxx`
/// token. Returns `None` when the identifier carries no such span.
pub fn derive_partial_pattern(full_id: &str) -> Option<String> {
    let full_id = trim_identifier(full_id);
    let upper = full_id.to_ascii_uppercase();

    let start = upper.find(USB_ID_PREFIX)?;
    // The prefix ends right before the vendor digits
    let (vid_end, _) = hex_token_after(&upper, start, "VID_")?;
    let (pid_end, _) = hex_token_after(&upper, vid_end, "PID_")?;

    Some(full_id[start..pid_end].to_string())
}

/// Find `marker` at or after `from` and parse the four hex digits that follow.
/// Returns the byte offset just past the digits and the parsed value.
///
/// ASCII-uppercasing preserves byte offsets, so positions found in the
/// uppercased haystack index the original string as well.
fn hex_token_after(upper: &str, from: usize, marker: &str) -> Option<(usize, u16)> {
    let mut search = from;
    while let Some(pos) = upper[search..].find(marker) {
        let digits_start = search + pos + marker.len();
        let digits_end = digits_start + 4;
        if let Some(digits) = upper.get(digits_start..digits_end) {
            if digits.bytes().all(|b| b.is_ascii_hexdigit()) {
                let value = u16::from_str_radix(digits, 16).ok()?;
                return Some((digits_end, value));
            }
        }
        search += pos + marker.len();
    }
    None
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_trim_identifier() {
        assert_eq!(
            trim_identifier(" \"USB\\VID_174C&PID_1153\" "),
            "USB\\VID_174C&PID_1153"
        );
        assert_eq!(
            trim_identifier("'USB\\VID_174C&PID_1153\\MSFT30'"),
            "USB\\VID_174C&PID_1153\\MSFT30"
        );
        assert_eq!(trim_identifier("USB\\VID_0001&PID_0002"), "USB\\VID_0001&PID_0002");
        assert_eq!(trim_identifier("  \r\n"), "");
    }

    #[test]
    fn test_extract_vid_pid() {
        let vp = extract_vid_pid("USB\\VID_174C&PID_1153").unwrap();
        assert_eq!(
            vp,
            VidPid {
                vid: 0x174C,
                pid: 0x1153
            }
        );

        // Case-insensitive, arbitrary text between the tokens
        let vp = extract_vid_pid("usb\\vid_04f9&mi_00&pid_0027\\suffix").unwrap();
        assert_eq!(
            vp,
            VidPid {
                vid: 0x04F9,
                pid: 0x0027
            }
        );
    }

    #[test]
    fn test_extract_vid_pid_missing_tokens() {
        assert_eq!(
            extract_vid_pid("no hex tokens here"),
            Err(PnpError::MissingVendorId("no hex tokens here".to_string()))
        );
        assert_eq!(
            extract_vid_pid("USB\\VID_174C"),
            Err(PnpError::MissingProductId("USB\\VID_174C".to_string()))
        );
        // Product token before the vendor token does not count
        assert!(extract_vid_pid("PID_1153&VID_174C").is_err());
        // Too-short hex run
        assert!(extract_vid_pid("VID_17&PID_1153").is_err());
    }

    #[test]
    fn test_extract_vid_pid_skips_malformed_token() {
        // First VID_ is followed by non-hex; the later well-formed one wins
        let vp = extract_vid_pid("VID_XYZ then VID_1234&PID_5678").unwrap();
        assert_eq!(
            vp,
            VidPid {
                vid: 0x1234,
                pid: 0x5678
            }
        );
    }

    #[test]
    fn test_derive_partial_pattern() {
        assert_eq!(
            derive_partial_pattern("USB\\VID_174C&PID_1153\\MSFT3023456789013B").as_deref(),
            Some("USB\\VID_174C&PID_1153")
        );
        // Tokens separated by extra path components are spanned whole
        assert_eq!(
            derive_partial_pattern("USB\\VID_04F9&MI_00&PID_0027\\7&ABCD").as_deref(),
            Some("USB\\VID_04F9&MI_00&PID_0027")
        );
        // Quotes and whitespace are trimmed before derivation
        assert_eq!(
            derive_partial_pattern(" \"USB\\VID_0001&PID_0002\\X\" ").as_deref(),
            Some("USB\\VID_0001&PID_0002")
        );
        assert_eq!(derive_partial_pattern("USB\\VID_174C\\no-product"), None);
        assert_eq!(derive_partial_pattern("PCI\\VEN_8086&DEV_1234"), None);
    }
}
