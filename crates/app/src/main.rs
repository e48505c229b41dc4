//! usb-switch
//!
//! Terminal tool for enabling, disabling, and inspecting a single USB device
//! on a Windows host. Device interaction goes through the system PnP tools
//! (`pnputil`, with `devcon` as fallback); the selected device identifier is
//! persisted between runs.

mod config;
mod device;
mod elevation;
mod tui;

use anyhow::{Context, Result, bail};
use clap::Parser;
use common::{DeviceBridge, DeviceCommand, DeviceEvent, create_device_bridge, setup_logging};
use config::AppConfig;
use device::{SystemRunner, spawn_device_worker};
use std::path::PathBuf;
use tracing::{error, info, warn};

#[derive(Parser, Debug)]
#[command(name = "usb-switch")]
#[command(
    author,
    version,
    about = "Enable, disable, and inspect a USB device via the Windows PnP tools"
)]
#[command(long_about = "
A terminal controller for one USB device, selected by its Vendor/Product ID
and persisted between runs. Runs pnputil (falling back to devcon) under the
hood, so it needs an elevated console to change device state.

EXAMPLES:
    # Interactive TUI
    usb-switch

    # Use a specific config file
    usb-switch --config ~/usb-switch.toml

    # List connected USB devices and exit
    usb-switch --list-devices

    # One-shot operations on the configured device
    usb-switch --status
    usb-switch --disable
    usb-switch --enable

CONFIGURATION:
    The default configuration file lives in the platform config directory,
    e.g. %APPDATA%\\usb-switch\\config.toml. Create it with --save-config.
")]
struct Args {
    /// Path to configuration file
    #[arg(short, long, value_name = "PATH")]
    config: Option<String>,

    /// Save default configuration to the default location and exit
    #[arg(long)]
    save_config: bool,

    /// List connected USB devices and exit
    #[arg(long)]
    list_devices: bool,

    /// Print the configured device's status and exit
    #[arg(long)]
    status: bool,

    /// Enable the configured device and exit
    #[arg(long, conflicts_with = "disable")]
    enable: bool,

    /// Disable the configured device and exit
    #[arg(long)]
    disable: bool,

    /// Log level (trace, debug, info, warn, error)
    #[arg(short, long, value_name = "LEVEL")]
    log_level: Option<String>,
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    // Handle --save-config flag early (before loading config)
    if args.save_config {
        let config = AppConfig::default();
        let path = AppConfig::default_path();
        config.save(&path).context("Failed to save configuration")?;
        println!("Configuration saved to: {}", path.display());
        return Ok(());
    }

    // Load configuration first (to get log level from config if not specified)
    let config_path = args
        .config
        .as_deref()
        .map(|p| PathBuf::from(shellexpand::tilde(p).as_ref()));

    let config = if let Some(ref path) = config_path {
        AppConfig::load(Some(path.clone())).context("Failed to load configuration")?
    } else {
        AppConfig::load_or_default()
    };

    // Use CLI log level if specified, otherwise use config value
    let log_level = args.log_level.as_deref().unwrap_or(&config.log_level);

    setup_logging(log_level).context("Failed to setup logging")?;

    info!("usb-switch v{}", env!("CARGO_PKG_VERSION"));

    let elevated = elevation::is_elevated();
    if !elevated {
        warn!("not running elevated; enabling or disabling devices will likely be denied");
    }

    // Start the device worker thread
    let (bridge, worker) = create_device_bridge();
    let worker_handle = spawn_device_worker(SystemRunner, worker);

    let result = if args.list_devices {
        list_devices_mode(&bridge).await
    } else if args.status {
        status_mode(&bridge, &config).await
    } else if args.enable || args.disable {
        action_mode(&bridge, &config, args.enable).await
    } else {
        let config_path = config_path.unwrap_or_else(AppConfig::default_path);
        tui::run(config, config_path, bridge.clone(), elevated).await
    };

    // Cleanup: shut the device worker down
    info!("Shutting down device worker...");
    if let Err(e) = bridge.send_command(DeviceCommand::Shutdown).await {
        error!("Error shutting down device worker: {:#}", e);
    }
    if let Err(e) = worker_handle.join() {
        error!("Device worker thread panicked: {:?}", e);
    }

    result
}

/// List connected USB devices and exit
async fn list_devices_mode(bridge: &DeviceBridge) -> Result<()> {
    info!("Listing USB devices...");

    bridge
        .send_command(DeviceCommand::Scan)
        .await
        .context("Failed to send Scan command")?;

    let devices = loop {
        match bridge
            .recv_event()
            .await
            .context("Device worker exited before answering")?
        {
            DeviceEvent::ScanFinished { devices } => break devices,
            _ => continue,
        }
    };

    if devices.is_empty() {
        println!("No USB devices found.");
    } else {
        println!("Found {} USB device(s):\n", devices.len());
        for device in devices {
            println!("  {}", device.name);
            println!("      {}", device.id);
            println!();
        }
    }

    Ok(())
}

/// Print the configured device's status and exit
async fn status_mode(bridge: &DeviceBridge, config: &AppConfig) -> Result<()> {
    let Some(id) = config.working_identifier() else {
        bail!("No device configured; run the TUI and scan for one first");
    };

    bridge
        .send_command(DeviceCommand::Refresh { id: id.to_string() })
        .await
        .context("Failed to send Refresh command")?;

    let status = loop {
        match bridge
            .recv_event()
            .await
            .context("Device worker exited before answering")?
        {
            DeviceEvent::Status { status, .. } => break status,
            _ => continue,
        }
    };

    println!("{}: {}", id, status);
    Ok(())
}

/// Enable or disable the configured device and exit
async fn action_mode(bridge: &DeviceBridge, config: &AppConfig, enable: bool) -> Result<()> {
    let Some(id) = config.working_identifier() else {
        bail!("No device configured; run the TUI and scan for one first");
    };

    let verb = if enable { "enable" } else { "disable" };
    info!("Trying to {} {}", verb, id);

    bridge
        .send_command(DeviceCommand::SetEnabled {
            id: id.to_string(),
            enable,
        })
        .await
        .context("Failed to send SetEnabled command")?;

    let success = loop {
        match bridge
            .recv_event()
            .await
            .context("Device worker exited before answering")?
        {
            DeviceEvent::ActionFinished { success, .. } => break success,
            _ => continue,
        }
    };

    if !success {
        bail!("Failed to {} {}", verb, id);
    }

    // The driver transition is asynchronous; the new state may take a moment
    // to be observable
    println!("Device {}d: {}", verb, id);
    Ok(())
}
