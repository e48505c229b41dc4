//! Device control over the external PnP tools
//!
//! All device interaction goes through `pnputil`, with `devcon` as the
//! fallback for hosts where pnputil rejects the identifier form or is
//! missing entirely. Every operation tries its command variants in order and
//! never raises: exhausted variants yield a typed terminal result instead.

use pnp::{DeviceRecord, DeviceStatus, classify_status_text, indicates_not_found, trim_identifier};
use tracing::{debug, warn};

use super::runner::{CommandOutput, CommandRunner};

const PNPUTIL: &str = "pnputil";
const DEVCON: &str = "devcon";

/// Stateless façade over the device tools. Holds no device state of its own;
/// every query re-reads external state.
pub struct DeviceController<R> {
    runner: R,
}

impl<R: CommandRunner> DeviceController<R> {
    pub fn new(runner: R) -> Self {
        Self { runner }
    }

    /// Raw enumeration text for connected USB devices, or empty when the
    /// listing command fails. Callers treat empty as "no devices found".
    pub fn list_all(&self) -> String {
        match self.run(PNPUTIL, &["/enum-devices", "/deviceid", "USB*", "/connected"]) {
            Some(out) if out.success => out.text,
            _ => String::new(),
        }
    }

    /// Enumerate connected USB devices: the pnputil listing first, the
    /// devcon listing when it yields nothing.
    pub fn list_usb_devices(&self) -> Vec<DeviceRecord> {
        let mut devices = pnp::parse_listing(&self.list_all());

        if devices.is_empty() {
            if let Some(out) = self.run(DEVCON, &["findall", "*usb*"]) {
                if out.success {
                    devices = pnp::parse_devcon_listing(&out.text);
                }
            }
        }

        devices
    }

    /// Resolve a partial identifier pattern against a fresh enumeration.
    pub fn resolve_partial(&self, pattern: &str) -> Vec<DeviceRecord> {
        pnp::resolve_partial(&self.list_all(), pattern)
    }

    /// Query the current status of an identifier.
    ///
    /// Variants run in order: query by instance ID, query by device ID, then
    /// the devcon status fallback. The first variant that executes without
    /// reporting not-found is classified. `NotFound` means every variant's
    /// output signalled not-found; `Unknown` means every variant failed to
    /// execute with no such signal.
    pub fn query_status(&self, id: &str) -> DeviceStatus {
        let id = trim_identifier(id);
        let mut saw_not_found = false;

        for args in [
            ["/enum-devices", "/instanceid", id],
            ["/enum-devices", "/deviceid", id],
        ] {
            let Some(out) = self.run(PNPUTIL, &args) else {
                continue;
            };
            if indicates_not_found(&out.text) {
                saw_not_found = true;
                continue;
            }
            if !out.success {
                continue;
            }
            return classify_status_text(&out.text);
        }

        let at_id = format!("@{id}");
        if let Some(out) = self.run(DEVCON, &["status", &at_id]) {
            if indicates_not_found(&out.text) {
                saw_not_found = true;
            } else if out.success {
                return classify_status_text(&out.text);
            }
        }

        if saw_not_found {
            DeviceStatus::NotFound
        } else {
            DeviceStatus::Unknown
        }
    }

    /// Enable or disable an identifier. True on the first variant that exits
    /// zero; false when all variants fail.
    ///
    /// The post-condition is not verified here: the driver transition is
    /// asynchronous, so callers re-query status after a delay.
    pub fn set_enabled(&self, id: &str, enable: bool) -> bool {
        let id = trim_identifier(id);

        let verb = if enable {
            "/enable-device"
        } else {
            "/disable-device"
        };
        if let Some(out) = self.run(PNPUTIL, &[verb, "/instanceid", id]) {
            if out.success {
                return true;
            }
        }

        let at_id = format!("@{id}");
        let action = if enable { "enable" } else { "disable" };
        match self.run(DEVCON, &[action, &at_id]) {
            Some(out) if out.success => true,
            Some(_) => {
                warn!("all {action} variants failed for {id}");
                false
            }
            None => false,
        }
    }

    fn run(&self, program: &str, args: &[&str]) -> Option<CommandOutput> {
        match self.runner.run(program, args) {
            Ok(out) => {
                debug!(program, ?args, success = out.success, "command finished");
                Some(out)
            }
            Err(e) => {
                debug!(program, "command unavailable: {e}");
                None
            }
        }
    }
}
