//! Application configuration management

use anyhow::{Context, Result, anyhow};
use pnp::{derive_partial_pattern, trim_identifier};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppConfig {
    pub device: DeviceSettings,
    #[serde(default)]
    pub ui: UiSettings,
    /// Log level (trace, debug, info, warn, error)
    #[serde(default = "AppConfig::default_log_level")]
    pub log_level: String,
}

/// The persisted device selection
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DeviceSettings {
    /// Partial identifier pattern: the Vendor/Product ID span
    pub pattern: String,
    /// Whether `full_id` names a concrete enumeration instance
    #[serde(default)]
    pub use_full_id: bool,
    /// Full instance identifier of the selected device
    #[serde(default)]
    pub full_id: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UiSettings {
    /// Seconds between automatic status refreshes
    #[serde(default = "UiSettings::default_refresh_interval")]
    pub refresh_interval_secs: u64,
    /// Milliseconds to wait before re-querying after an enable/disable;
    /// the driver transition is asynchronous and needs a moment to settle
    #[serde(default = "UiSettings::default_recheck_delay")]
    pub recheck_delay_ms: u64,
}

impl Default for UiSettings {
    fn default() -> Self {
        Self {
            refresh_interval_secs: Self::default_refresh_interval(),
            recheck_delay_ms: Self::default_recheck_delay(),
        }
    }
}

impl UiSettings {
    fn default_refresh_interval() -> u64 {
        30
    }

    fn default_recheck_delay() -> u64 {
        2000
    }
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            device: DeviceSettings {
                pattern: "USB\\VID_174C&PID_1153".to_string(),
                use_full_id: false,
                full_id: String::new(),
            },
            ui: UiSettings::default(),
            log_level: Self::default_log_level(),
        }
    }
}

impl AppConfig {
    fn default_log_level() -> String {
        "info".to_string()
    }

    /// Load configuration from the specified path, or from the default
    /// location when none is given
    pub fn load(path: Option<PathBuf>) -> Result<Self> {
        let config_path = match path {
            Some(p) => p,
            None => {
                let p = Self::default_path();
                if !p.exists() {
                    return Err(anyhow!("No configuration file found, using defaults"));
                }
                p
            }
        };

        let content = fs::read_to_string(&config_path)
            .with_context(|| format!("Failed to read config file: {}", config_path.display()))?;

        let config: AppConfig = toml::from_str(&content)
            .with_context(|| format!("Failed to parse config file: {}", config_path.display()))?;

        config.validate()?;

        tracing::info!("Loaded configuration from: {}", config_path.display());
        Ok(config)
    }

    /// Load configuration or return defaults if not found
    pub fn load_or_default() -> Self {
        match Self::load(None) {
            Ok(config) => config,
            Err(e) => {
                tracing::warn!("Failed to load config: {}, using defaults", e);
                Self::default()
            }
        }
    }

    /// Save configuration to the specified path
    pub fn save(&self, path: &Path) -> Result<()> {
        let content = toml::to_string_pretty(self).context("Failed to serialize configuration")?;

        // Create parent directories if they don't exist
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).with_context(|| {
                format!("Failed to create config directory: {}", parent.display())
            })?;
        }

        fs::write(path, content)
            .with_context(|| format!("Failed to write config file: {}", path.display()))?;

        tracing::info!("Saved configuration to: {}", path.display());
        Ok(())
    }

    /// Get the default configuration file path
    pub fn default_path() -> PathBuf {
        if let Some(config_dir) = dirs::config_dir() {
            config_dir.join("usb-switch").join("config.toml")
        } else {
            PathBuf::from(".config/usb-switch/config.toml")
        }
    }

    /// The identifier operations should run against: the full instance
    /// identifier once a device has been selected, otherwise none
    pub fn working_identifier(&self) -> Option<&str> {
        if !self.device.use_full_id {
            return None;
        }
        let id = trim_identifier(&self.device.full_id);
        (!id.is_empty()).then_some(id)
    }

    /// Record a newly selected device: store its full identifier and
    /// re-derive the partial pattern so both stay in sync
    pub fn select_device(&mut self, full_id: &str) {
        let full_id = trim_identifier(full_id);
        self.device.full_id = full_id.to_string();
        self.device.use_full_id = true;
        if let Some(pattern) = derive_partial_pattern(full_id) {
            self.device.pattern = pattern;
        }
    }

    /// Validate configuration values
    fn validate(&self) -> Result<()> {
        let valid_levels = ["trace", "debug", "info", "warn", "error"];
        if !valid_levels.contains(&self.log_level.as_str()) {
            return Err(anyhow!(
                "Invalid log level '{}', must be one of: {}",
                self.log_level,
                valid_levels.join(", ")
            ));
        }

        if self.ui.refresh_interval_secs == 0 {
            return Err(anyhow!("refresh_interval_secs must be at least 1"));
        }

        if self.device.use_full_id && trim_identifier(&self.device.full_id).is_empty() {
            return Err(anyhow!("use_full_id is set but full_id is empty"));
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = AppConfig::default();
        assert_eq!(config.log_level, "info");
        assert_eq!(config.device.pattern, "USB\\VID_174C&PID_1153");
        assert!(!config.device.use_full_id);
        assert_eq!(config.ui.refresh_interval_secs, 30);
        assert_eq!(config.working_identifier(), None);
    }

    #[test]
    fn test_select_device_keeps_pattern_in_sync() {
        let mut config = AppConfig::default();
        config.select_device(" \"USB\\VID_046D&PID_C52B\\6&ABC&0&1\" ");

        assert!(config.device.use_full_id);
        assert_eq!(config.device.full_id, "USB\\VID_046D&PID_C52B\\6&ABC&0&1");
        assert_eq!(config.device.pattern, "USB\\VID_046D&PID_C52B");
        assert_eq!(
            config.working_identifier(),
            Some("USB\\VID_046D&PID_C52B\\6&ABC&0&1")
        );
    }

    #[test]
    fn test_select_device_without_pair_keeps_old_pattern() {
        let mut config = AppConfig::default();
        config.select_device("USB\\ROOT_HUB30\\4&1");

        assert_eq!(config.device.full_id, "USB\\ROOT_HUB30\\4&1");
        // Underivable pattern stays as it was
        assert_eq!(config.device.pattern, "USB\\VID_174C&PID_1153");
    }

    #[test]
    fn test_validate_log_level() {
        let mut config = AppConfig::default();
        assert!(config.validate().is_ok());

        config.log_level = "verbose".to_string();
        assert!(config.validate().is_err());

        config.log_level = "debug".to_string();
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_validate_full_id_consistency() {
        let mut config = AppConfig::default();
        config.device.use_full_id = true;
        config.device.full_id = "  ".to_string();
        assert!(config.validate().is_err());

        config.device.full_id = "USB\\VID_174C&PID_1153\\X".to_string();
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_config_serialization_round_trip() {
        let mut config = AppConfig::default();
        config.select_device("USB\\VID_174C&PID_1153\\MSFT3023456789013B");

        let toml_str = toml::to_string(&config).unwrap();
        let parsed: AppConfig = toml::from_str(&toml_str).unwrap();

        assert_eq!(parsed.device.pattern, config.device.pattern);
        assert_eq!(parsed.device.full_id, config.device.full_id);
        assert_eq!(parsed.device.use_full_id, config.device.use_full_id);
        assert_eq!(parsed.ui.refresh_interval_secs, config.ui.refresh_interval_secs);
    }
}
