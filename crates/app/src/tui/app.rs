//! TUI application state
//!
//! Manages the application state and event loop, and coordinates between the
//! UI rendering and the device worker. All state mutation happens on the UI
//! task; the worker only ever reports back through events, and whichever
//! event arrives last wins.

use anyhow::Result;
use common::{DeviceBridge, DeviceCommand, DeviceEvent};
use crossterm::{
    execute,
    terminal::{EnterAlternateScreen, LeaveAlternateScreen, disable_raw_mode, enable_raw_mode},
};
use pnp::{DeviceRecord, DeviceStatus, trim_identifier};
use ratatui::{Terminal, backend::CrosstermBackend};
use std::io::{self, Stdout};
use std::path::PathBuf;
use std::time::{Duration, Instant};
use tracing::{error, warn};

use super::events::{Action, Event, EventHandler};
use super::ui;
use crate::config::AppConfig;

/// Current dialog/popup being displayed
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Dialog {
    /// No dialog open
    None,
    /// Help dialog showing keybindings
    Help,
    /// Scan results waiting for the user to pick a device
    SelectDevice,
}

/// One line of the activity log, stamped with time since startup
#[derive(Debug, Clone)]
pub struct LogEntry {
    pub at: Duration,
    pub message: String,
}

/// Upper bound on retained log entries
const LOG_CAPACITY: usize = 500;

/// Application state
pub struct App {
    /// Configuration, kept in sync with the selected device
    config: AppConfig,
    /// Where to persist the configuration on selection
    config_path: PathBuf,
    /// Full instance identifier of the device being controlled
    current_id: Option<String>,
    /// Last classified status, if any query has completed
    status: Option<DeviceStatus>,
    /// Devices found by the last scan
    scan_results: Vec<DeviceRecord>,
    /// Highlighted row in the selection dialog
    selected_index: usize,
    /// Current dialog being displayed
    dialog: Dialog,
    /// Whether the app should quit
    should_quit: bool,
    /// App start time, for log timestamps
    start_time: Instant,
    /// An enable/disable is in flight; its triggers are inert until it lands
    action_in_flight: bool,
    /// A scan is in flight
    scanning: bool,
    /// When the last status refresh was requested
    last_refresh: Option<Instant>,
    /// Deadline for the post-action re-query
    recheck_at: Option<Instant>,
    /// Commands queued for the worker, drained by the run loop
    pending: Vec<DeviceCommand>,
    /// Activity log shown in the UI
    log: Vec<LogEntry>,
}

impl App {
    /// Create the application state from loaded configuration.
    ///
    /// When the configuration already names a device, an initial status
    /// refresh is queued right away.
    pub fn new(config: AppConfig, config_path: PathBuf) -> Self {
        let mut app = Self {
            current_id: None,
            config,
            config_path,
            status: None,
            scan_results: Vec::new(),
            selected_index: 0,
            dialog: Dialog::None,
            should_quit: false,
            start_time: Instant::now(),
            action_in_flight: false,
            scanning: false,
            last_refresh: None,
            recheck_at: None,
            pending: Vec::new(),
            log: Vec::new(),
        };

        if let Some(id) = app.config.working_identifier() {
            let id = id.to_string();
            app.log_message(format!("Loaded device: {id}"));
            app.current_id = Some(id);
            app.request_refresh();
        } else {
            let pattern = trim_identifier(&app.config.device.pattern).to_string();
            if pattern.is_empty() {
                app.log_message("No device configured. Press 's' to scan for USB devices.");
            } else {
                // Only a partial pattern is configured; try to resolve it to
                // a concrete instance before falling back to a manual scan
                app.log_message(format!("Resolving configured pattern: {pattern}"));
                app.pending.push(DeviceCommand::Resolve { pattern });
            }
        }

        app
    }

    pub fn current_id(&self) -> Option<&str> {
        self.current_id.as_deref()
    }

    pub fn status(&self) -> Option<DeviceStatus> {
        self.status
    }

    pub fn dialog(&self) -> &Dialog {
        &self.dialog
    }

    pub fn scan_results(&self) -> &[DeviceRecord] {
        &self.scan_results
    }

    pub fn selected_index(&self) -> usize {
        self.selected_index
    }

    pub fn action_in_flight(&self) -> bool {
        self.action_in_flight
    }

    pub fn scanning(&self) -> bool {
        self.scanning
    }

    pub fn log(&self) -> &[LogEntry] {
        &self.log
    }

    pub fn should_quit(&self) -> bool {
        self.should_quit
    }

    /// Append a message to the activity log
    pub fn log_message(&mut self, message: impl Into<String>) {
        if self.log.len() == LOG_CAPACITY {
            self.log.remove(0);
        }
        self.log.push(LogEntry {
            at: self.start_time.elapsed(),
            message: message.into(),
        });
    }

    /// Take the commands queued for the worker
    pub fn take_pending(&mut self) -> Vec<DeviceCommand> {
        std::mem::take(&mut self.pending)
    }

    /// Queue a status refresh for the current device
    fn request_refresh(&mut self) {
        if let Some(id) = &self.current_id {
            self.pending.push(DeviceCommand::Refresh { id: id.clone() });
            self.last_refresh = Some(Instant::now());
        }
    }

    /// Handle user action
    pub fn handle_action(&mut self, action: Action) {
        match action {
            Action::Quit => {
                if self.dialog != Dialog::None {
                    self.dialog = Dialog::None;
                } else {
                    self.should_quit = true;
                }
            }
            Action::CloseDialog => {
                self.dialog = Dialog::None;
            }
            Action::Up => {
                if self.dialog == Dialog::SelectDevice && self.selected_index > 0 {
                    self.selected_index -= 1;
                }
            }
            Action::Down => {
                if self.dialog == Dialog::SelectDevice
                    && !self.scan_results.is_empty()
                    && self.selected_index < self.scan_results.len() - 1
                {
                    self.selected_index += 1;
                }
            }
            Action::Select => {
                if self.dialog == Dialog::SelectDevice {
                    if let Some(record) = self.scan_results.get(self.selected_index).cloned() {
                        self.select_device(&record);
                    }
                    self.dialog = Dialog::None;
                }
            }
            Action::Enable => self.request_action(true),
            Action::Disable => self.request_action(false),
            Action::Refresh => {
                if self.dialog == Dialog::None && self.current_id.is_some() {
                    self.log_message("Refreshing device status...");
                    self.request_refresh();
                }
            }
            Action::Scan => {
                if self.dialog == Dialog::None && !self.scanning {
                    self.scanning = true;
                    self.log_message("Scanning for USB devices...");
                    self.pending.push(DeviceCommand::Scan);
                }
            }
            Action::ShowHelp => {
                self.dialog = Dialog::Help;
            }
            Action::None => {}
        }
    }

    /// Record a selected device: update state and persist the configuration,
    /// so the working identifier and the stored identifier stay in sync.
    fn select_device(&mut self, record: &DeviceRecord) {
        let id = trim_identifier(&record.id).to_string();
        self.config.select_device(&id);

        if let Err(e) = self.config.save(&self.config_path) {
            warn!("failed to save configuration: {:#}", e);
            self.log_message(format!("Failed to save configuration: {e:#}"));
        }

        self.log_message(format!("Selected device: {} ({})", record.name, id));
        self.current_id = Some(id);
        self.status = None;
        self.request_refresh();
    }

    /// Queue an enable/disable for the current device. Inert while another
    /// action is in flight — the only guard against conflicting actions.
    fn request_action(&mut self, enable: bool) {
        if self.dialog != Dialog::None || self.action_in_flight {
            return;
        }
        let Some(id) = self.current_id.clone() else {
            self.log_message("No device selected.");
            return;
        };

        self.action_in_flight = true;
        self.log_message(format!(
            "{} device: {id}",
            if enable { "Enabling" } else { "Disabling" }
        ));
        self.pending.push(DeviceCommand::SetEnabled { id, enable });
    }

    /// Process a result from the device worker
    pub fn handle_device_event(&mut self, event: DeviceEvent) {
        match event {
            DeviceEvent::Status { id, status } => {
                // A stale result for a previously selected device is dropped
                if self.current_id.as_deref() != Some(id.as_str()) {
                    return;
                }
                self.status = Some(status);
                match status {
                    DeviceStatus::NotFound => {
                        self.log_message("Device not found; check that it is connected.")
                    }
                    DeviceStatus::Unknown => {
                        self.log_message("Could not query device status; are the PnP tools available?")
                    }
                    _ => self.log_message(format!("Device status: {status}")),
                }
            }

            DeviceEvent::ScanFinished { devices } => {
                self.scanning = false;
                if devices.is_empty() {
                    self.log_message("No USB devices found.");
                    return;
                }
                self.log_message(format!("Found {} USB device(s).", devices.len()));
                self.scan_results = devices;
                self.selected_index = 0;
                self.dialog = Dialog::SelectDevice;
            }

            DeviceEvent::ResolveFinished { pattern, devices } => {
                // Resolution only matters while no concrete device is selected
                if self.current_id.is_some() {
                    return;
                }
                match devices.len() {
                    0 => self.log_message(format!(
                        "No device matches {pattern}; press 's' to scan."
                    )),
                    1 => {
                        let record = devices[0].clone();
                        self.select_device(&record);
                    }
                    n => {
                        // The pattern is ambiguous; the user picks the instance
                        self.log_message(format!("{n} devices match {pattern}."));
                        self.scan_results = devices;
                        self.selected_index = 0;
                        self.dialog = Dialog::SelectDevice;
                    }
                }
            }

            DeviceEvent::ActionFinished { enable, success } => {
                self.action_in_flight = false;
                if success {
                    self.log_message(if enable {
                        "Device enabled."
                    } else {
                        "Device disabled."
                    });
                    // The driver transition is asynchronous; re-query after a
                    // settling delay instead of immediately
                } else {
                    self.log_message(if enable {
                        "Failed to enable device."
                    } else {
                        "Failed to disable device."
                    });
                }
                self.recheck_at =
                    Some(Instant::now() + Duration::from_millis(self.config.ui.recheck_delay_ms));
            }
        }
    }

    /// Periodic tick: fire the post-action re-query when due, and keep the
    /// automatic status refresh going.
    pub fn tick(&mut self) {
        let now = Instant::now();

        if let Some(at) = self.recheck_at {
            if now >= at {
                self.recheck_at = None;
                self.request_refresh();
            }
            return;
        }

        if self.current_id.is_some() && !self.action_in_flight {
            let interval = Duration::from_secs(self.config.ui.refresh_interval_secs);
            let due = match self.last_refresh {
                Some(last) => now.duration_since(last) >= interval,
                None => true,
            };
            if due {
                self.request_refresh();
            }
        }
    }
}

/// Terminal wrapper for setup/teardown
pub struct Tui {
    terminal: Terminal<CrosstermBackend<Stdout>>,
}

impl Tui {
    /// Create and initialize the terminal
    pub fn new() -> Result<Self> {
        let backend = CrosstermBackend::new(io::stdout());
        let terminal = Terminal::new(backend)?;
        Ok(Self { terminal })
    }

    /// Enter TUI mode (raw mode, alternate screen)
    pub fn enter(&mut self) -> Result<()> {
        enable_raw_mode()?;
        execute!(io::stdout(), EnterAlternateScreen)?;
        self.terminal.hide_cursor()?;
        self.terminal.clear()?;
        Ok(())
    }

    /// Exit TUI mode (restore terminal state)
    pub fn exit(&mut self) -> Result<()> {
        disable_raw_mode()?;
        execute!(io::stdout(), LeaveAlternateScreen)?;
        self.terminal.show_cursor()?;
        Ok(())
    }

    /// Draw the UI
    pub fn draw(&mut self, app: &App) -> Result<()> {
        self.terminal.draw(|frame| {
            ui::render(frame, app);
        })?;
        Ok(())
    }
}

impl Drop for Tui {
    fn drop(&mut self) {
        // Best effort cleanup
        let _ = disable_raw_mode();
        let _ = execute!(io::stdout(), LeaveAlternateScreen);
        let _ = self.terminal.show_cursor();
    }
}

/// Run the TUI application
///
/// This is the main entry point for the interactive mode.
pub async fn run(
    config: AppConfig,
    config_path: PathBuf,
    bridge: DeviceBridge,
    elevated: bool,
) -> Result<()> {
    // Initialize TUI
    let mut tui = Tui::new()?;
    tui.enter()?;

    // Create app state
    let mut app = App::new(config, config_path);
    if !elevated {
        app.log_message("Not running elevated; enabling or disabling devices may fail.");
    }

    // Create event handler (250ms tick rate for UI updates)
    let mut events = EventHandler::new(Duration::from_millis(250));

    // Main event loop
    loop {
        // Draw UI
        if let Err(e) = tui.draw(&app) {
            error!("Failed to draw UI: {:#}", e);
            break;
        }

        // Forward queued work to the device worker
        for cmd in app.take_pending() {
            if let Err(e) = bridge.send_command(cmd).await {
                warn!("Failed to send device command: {:#}", e);
                app.log_message("Device worker is unavailable.");
            }
        }

        // Handle events
        tokio::select! {
            // Terminal events (keyboard, resize, tick)
            event = events.next() => {
                match event {
                    Some(Event::Key(key)) => {
                        app.handle_action(Action::from(key));
                    }
                    Some(Event::Resize(_, _)) => {
                        // Terminal resize is handled automatically by ratatui
                    }
                    Some(Event::Tick) => {
                        app.tick();
                    }
                    None => {
                        // Event channel closed
                        break;
                    }
                }
            }

            // Results from the device worker
            device_event = bridge.recv_event() => {
                match device_event {
                    Ok(event) => app.handle_device_event(event),
                    Err(e) => {
                        warn!("Device event error: {:#}", e);
                    }
                }
            }
        }

        // Check if we should quit
        if app.should_quit() {
            break;
        }
    }

    // Cleanup
    tui.exit()?;

    Ok(())
}
