//! Device worker thread
//!
//! Dedicated thread for external tool invocations. Processes commands from
//! the Tokio runtime and sends results back over the event channel; the UI
//! never waits on a subprocess directly. Commands are handled one at a time,
//! so overlapping refreshes complete in start order.

use common::{DeviceCommand, DeviceEvent, DeviceWorker};
use tracing::{debug, error, info};

use super::controller::DeviceController;
use super::runner::CommandRunner;

/// Device worker thread state: the controller plus the channel endpoints.
pub struct DeviceWorkerThread<R: CommandRunner> {
    controller: DeviceController<R>,
    worker: DeviceWorker,
}

impl<R: CommandRunner> DeviceWorkerThread<R> {
    pub fn new(runner: R, worker: DeviceWorker) -> Self {
        Self {
            controller: DeviceController::new(runner),
            worker,
        }
    }

    /// Run the worker loop until a Shutdown command arrives or the command
    /// channel closes.
    pub fn run(self) {
        info!("device worker thread started");

        loop {
            let cmd = match self.worker.recv_command() {
                Ok(cmd) => cmd,
                Err(_) => {
                    debug!("command channel closed");
                    break;
                }
            };

            if cmd == DeviceCommand::Shutdown {
                info!("device worker shutting down");
                break;
            }

            self.handle_command(cmd);
        }

        info!("device worker thread stopped");
    }

    /// Handle a command from the Tokio runtime
    fn handle_command(&self, cmd: DeviceCommand) {
        // A panicking handler must not take the whole worker thread down
        let result = std::panic::catch_unwind(std::panic::AssertUnwindSafe(|| {
            self.handle_command_inner(cmd)
        }));

        if let Err(e) = result {
            error!("panic in device command handler: {:?}", e);
        }
    }

    fn handle_command_inner(&self, cmd: DeviceCommand) {
        match cmd {
            DeviceCommand::Refresh { id } => {
                let status = self.controller.query_status(&id);
                debug!("status of {}: {}", id, status);
                let _ = self.worker.send_event(DeviceEvent::Status { id, status });
            }

            DeviceCommand::Scan => {
                let devices = self.controller.list_usb_devices();
                debug!("enumerated {} USB device(s)", devices.len());
                let _ = self
                    .worker
                    .send_event(DeviceEvent::ScanFinished { devices });
            }

            DeviceCommand::Resolve { pattern } => {
                let devices = self.controller.resolve_partial(&pattern);
                debug!("{} device(s) match {}", devices.len(), pattern);
                let _ = self
                    .worker
                    .send_event(DeviceEvent::ResolveFinished { pattern, devices });
            }

            DeviceCommand::SetEnabled { id, enable } => {
                let success = self.controller.set_enabled(&id, enable);
                debug!(
                    "{} {}: {}",
                    if enable { "enable" } else { "disable" },
                    id,
                    if success { "ok" } else { "failed" }
                );
                let _ = self
                    .worker
                    .send_event(DeviceEvent::ActionFinished { enable, success });
            }

            DeviceCommand::Shutdown => {
                // Handled in the main loop
                unreachable!()
            }
        }
    }
}

/// Spawn the device worker thread
///
/// The thread runs until a Shutdown command is received or every bridge
/// handle is dropped.
pub fn spawn_device_worker<R: CommandRunner + 'static>(
    runner: R,
    worker: DeviceWorker,
) -> std::thread::JoinHandle<()> {
    std::thread::Builder::new()
        .name("device-worker".to_string())
        .spawn(move || DeviceWorkerThread::new(runner, worker).run())
        .expect("Failed to spawn device worker thread")
}
