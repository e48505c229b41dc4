//! Async channel bridge between the Tokio runtime and the device worker thread
//!
//! Every external tool invocation blocks for the lifetime of a subprocess, so
//! all of them run on one dedicated worker thread. Commands travel one way,
//! results come back as events; the UI loop selects on the event side instead
//! of awaiting any single operation inline.

use async_channel::{Receiver, Sender, bounded};
use pnp::{DeviceRecord, DeviceStatus};

/// Commands from the Tokio runtime to the device worker thread
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DeviceCommand {
    /// Re-query the status of the given identifier
    Refresh {
        /// Full instance identifier to query
        id: String,
    },

    /// Enumerate connected USB devices
    Scan,

    /// Resolve a partial identifier pattern to full instance identifiers
    Resolve {
        /// Vendor/Product ID pattern to match
        pattern: String,
    },

    /// Enable or disable the given identifier
    SetEnabled {
        /// Full instance identifier to act on
        id: String,
        /// Desired state
        enable: bool,
    },

    /// Shut the worker thread down gracefully
    Shutdown,
}

/// Results from the device worker thread
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DeviceEvent {
    /// Fresh status for an identifier
    Status {
        /// Identifier the query ran against
        id: String,
        /// Classified state
        status: DeviceStatus,
    },

    /// Enumeration finished
    ScanFinished {
        /// Devices found, in enumeration order
        devices: Vec<DeviceRecord>,
    },

    /// Pattern resolution finished
    ResolveFinished {
        /// The pattern that was resolved
        pattern: String,
        /// Matching devices, in enumeration order
        devices: Vec<DeviceRecord>,
    },

    /// Enable/disable finished
    ActionFinished {
        /// Whether the action was an enable
        enable: bool,
        /// Whether any command variant exited zero
        success: bool,
    },
}

/// Handle for the Tokio runtime (async)
#[derive(Clone)]
pub struct DeviceBridge {
    cmd_tx: Sender<DeviceCommand>,
    event_rx: Receiver<DeviceEvent>,
}

impl DeviceBridge {
    /// Send a command to the device worker thread
    pub async fn send_command(&self, cmd: DeviceCommand) -> crate::Result<()> {
        self.cmd_tx
            .send(cmd)
            .await
            .map_err(|e| crate::Error::Channel(e.to_string()))
    }

    /// Receive an event from the device worker thread
    pub async fn recv_event(&self) -> crate::Result<DeviceEvent> {
        self.event_rx
            .recv()
            .await
            .map_err(|e| crate::Error::Channel(e.to_string()))
    }
}

/// Handle for the device worker thread (blocking)
pub struct DeviceWorker {
    pub(crate) cmd_rx: Receiver<DeviceCommand>,
    /// Event sender (public for the worker thread to access)
    pub event_tx: Sender<DeviceEvent>,
}

impl DeviceWorker {
    /// Receive a command from the Tokio runtime (blocking)
    pub fn recv_command(&self) -> crate::Result<DeviceCommand> {
        self.cmd_rx
            .recv_blocking()
            .map_err(|e| crate::Error::Channel(e.to_string()))
    }

    /// Send an event to the Tokio runtime (blocking)
    pub fn send_event(&self, event: DeviceEvent) -> crate::Result<()> {
        self.event_tx
            .send_blocking(event)
            .map_err(|e| crate::Error::Channel(e.to_string()))
    }
}

/// Create the channel bridge between the Tokio runtime and the worker thread
///
/// Returns (DeviceBridge for Tokio, DeviceWorker for the worker thread)
pub fn create_device_bridge() -> (DeviceBridge, DeviceWorker) {
    let (cmd_tx, cmd_rx) = bounded(64);
    let (event_tx, event_rx) = bounded(64);

    (
        DeviceBridge { cmd_tx, event_rx },
        DeviceWorker { cmd_rx, event_tx },
    )
}
