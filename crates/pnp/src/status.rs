//! Free-text status classification
//!
//! The device tools phrase state differently across versions and locales; no
//! fixed-position field reliably carries it. Classification is an ordered
//! rule table: rules scoped to the first status-labelled line run before
//! whole-text rules, and the first hit wins. When nothing hits, the text is
//! classified as enabled — absence of explicit disable evidence is treated
//! as an enabled device, not as unknown.

use crate::types::DeviceStatus;

/// Markers that indicate the queried identifier matched no device.
const NOT_FOUND_MARKERS: [&str; 3] = ["not found", "找不到", "no matching devices"];

/// Labels introducing a per-device status line.
const STATUS_LABELS: [&str; 2] = ["status", "状态"];

/// Terms indicating a disabled device.
const DISABLED_TERMS: [&str; 2] = ["disabled", "已禁用"];

/// Terms indicating an enabled or started device.
const ENABLED_TERMS: [&str; 4] = ["enabled", "started", "已启用", "已启动"];

/// Whole-text phrasing for a healthy device.
const WORKING_TERMS: [&str; 2] = ["working properly", "正常工作"];

#[derive(Clone, Copy)]
enum RuleScope {
    /// Match against the first line carrying a status label
    StatusLine,
    /// Match against the entire output
    WholeText,
}

struct StatusRule {
    scope: RuleScope,
    needles: &'static [&'static str],
    status: DeviceStatus,
}

/// Evaluated top to bottom; the first hit wins.
const RULES: [StatusRule; 4] = [
    StatusRule {
        scope: RuleScope::StatusLine,
        needles: &DISABLED_TERMS,
        status: DeviceStatus::Disabled,
    },
    StatusRule {
        scope: RuleScope::StatusLine,
        needles: &ENABLED_TERMS,
        status: DeviceStatus::Enabled,
    },
    StatusRule {
        scope: RuleScope::WholeText,
        needles: &DISABLED_TERMS,
        status: DeviceStatus::Disabled,
    },
    StatusRule {
        scope: RuleScope::WholeText,
        needles: &WORKING_TERMS,
        status: DeviceStatus::Enabled,
    },
];

/// Whether query output reports the identifier as not found.
pub fn indicates_not_found(text: &str) -> bool {
    let lower = text.to_lowercase();
    NOT_FOUND_MARKERS
        .iter()
        .any(|marker| lower.contains(marker))
}

/// Classify the output of a device query that did not report not-found.
pub fn classify_status_text(text: &str) -> DeviceStatus {
    let lower = text.to_lowercase();
    let status_line = lower
        .lines()
        .find(|line| STATUS_LABELS.iter().any(|label| line.contains(label)));

    for rule in &RULES {
        let haystack = match rule.scope {
            RuleScope::StatusLine => match status_line {
                Some(line) => line,
                None => continue,
            },
            RuleScope::WholeText => lower.as_str(),
        };
        if rule.needles.iter().any(|needle| haystack.contains(needle)) {
            return rule.status;
        }
    }

    DeviceStatus::Enabled
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_line_disabled_wins_over_whole_text() {
        // The labelled line wins regardless of phrasing elsewhere
        let text = "Device Description: Hub\r\n\
Status: Disabled\r\n\
Note: this device was working properly before\r\n";
        assert_eq!(classify_status_text(text), DeviceStatus::Disabled);
    }

    #[test]
    fn test_status_line_enabled() {
        assert_eq!(
            classify_status_text("Status: Started\r\n"),
            DeviceStatus::Enabled
        );
        assert_eq!(
            classify_status_text("Status: Enabled\r\n"),
            DeviceStatus::Enabled
        );
    }

    #[test]
    fn test_localized_status_lines() {
        assert_eq!(
            classify_status_text("状态: 已禁用\r\n"),
            DeviceStatus::Disabled
        );
        assert_eq!(
            classify_status_text("状态: 已启动\r\n"),
            DeviceStatus::Enabled
        );
        assert_eq!(
            classify_status_text("状态: 已启用\r\n"),
            DeviceStatus::Enabled
        );
    }

    #[test]
    fn test_whole_text_fallback() {
        // No status label anywhere; whole-text scan decides
        assert_eq!(
            classify_status_text("The device is disabled.\r\n"),
            DeviceStatus::Disabled
        );
        assert_eq!(
            classify_status_text("This device is working properly.\r\n"),
            DeviceStatus::Enabled
        );
        assert_eq!(
            classify_status_text("设备正常工作。\r\n"),
            DeviceStatus::Enabled
        );
    }

    #[test]
    fn test_unrecognized_status_line_falls_through() {
        // The labelled line carries no known term; whole-text rules still run
        let text = "Status: 0x0A\r\nDriver reports the device as disabled\r\n";
        assert_eq!(classify_status_text(text), DeviceStatus::Disabled);
    }

    #[test]
    fn test_default_bias_is_enabled() {
        assert_eq!(
            classify_status_text("Instance ID: USB\\VID_1&PID_2\\0\r\n"),
            DeviceStatus::Enabled
        );
        assert_eq!(classify_status_text(""), DeviceStatus::Enabled);
    }

    #[test]
    fn test_indicates_not_found() {
        assert!(indicates_not_found("The specified device was Not Found.\r\n"));
        assert!(indicates_not_found("找不到与给定条件匹配的设备。\r\n"));
        assert!(indicates_not_found("No matching devices found.\r\n"));
        assert!(!indicates_not_found("Status: Started\r\n"));
        assert!(!indicates_not_found(""));
    }

    #[test]
    fn test_classification_is_pure() {
        // Same text, same answer — callers may re-query freely
        let text = "Status: Disabled\r\n";
        assert_eq!(classify_status_text(text), classify_status_text(text));
    }
}
