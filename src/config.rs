//! # Configuration Module
//!
//! Handles loading and validating runtime configuration from TOML files.
//!
//! Runtime configuration covers the machine-specific parts of the program
//! (device paths, tick rate, screen override, logging). The user's response
//! settings and curve live in the JSON record managed by
//! [`settings`](crate::settings).

use serde::de::Error;
use serde::Deserialize;
use std::fs;
use std::path::Path;

use crate::error::{Result, StickCursorError};

/// Main configuration structure
#[derive(Debug, Deserialize, Clone, Default)]
pub struct Config {
    #[serde(default)]
    pub input: InputConfig,
    #[serde(default)]
    pub cursor: CursorConfig,
    #[serde(default)]
    pub poll: PollConfig,
    #[serde(default)]
    pub storage: StorageConfig,
    #[serde(default)]
    pub logging: LoggingConfig,
}

/// Input device configuration
#[derive(Debug, Deserialize, Clone)]
pub struct InputConfig {
    /// Game controller event device; empty means auto-detect
    #[serde(default)]
    pub gamepad_path: String,

    /// Keyboard event device for the exit key; empty means every keyboard
    #[serde(default)]
    pub keyboard_path: String,

    /// Ticks between controller scans while none is connected
    #[serde(default = "default_rescan_interval_ticks")]
    pub rescan_interval_ticks: u32,
}

/// Cursor output configuration
#[derive(Debug, Deserialize, Clone, Default)]
pub struct CursorConfig {
    /// Screen width in pixels; 0 means auto-detect
    #[serde(default)]
    pub screen_width: u32,

    /// Screen height in pixels; 0 means auto-detect
    #[serde(default)]
    pub screen_height: u32,
}

/// Polling loop configuration
#[derive(Debug, Deserialize, Clone)]
pub struct PollConfig {
    #[serde(default = "default_tick_rate_hz")]
    pub tick_rate_hz: u32,

    /// Pause before the loop starts so the user can focus the target window
    #[serde(default = "default_start_delay_ms")]
    pub start_delay_ms: u64,
}

/// Settings storage configuration
#[derive(Debug, Deserialize, Clone)]
pub struct StorageConfig {
    #[serde(default = "default_settings_path")]
    pub settings_path: String,
}

/// Logging configuration
#[derive(Debug, Deserialize, Clone)]
pub struct LoggingConfig {
    #[serde(default = "default_log_level")]
    pub level: String,

    /// Directory for rolling log files; empty logs to stderr only
    #[serde(default)]
    pub log_dir: String,
}

// Default value functions
fn default_rescan_interval_ticks() -> u32 { 60 }

fn default_tick_rate_hz() -> u32 { crate::poll_loop::DEFAULT_TICK_RATE_HZ }
fn default_start_delay_ms() -> u64 { 5000 }

fn default_settings_path() -> String { "config.json".to_string() }

fn default_log_level() -> String { "info".to_string() }

impl Default for InputConfig {
    fn default() -> Self {
        Self {
            gamepad_path: String::new(),
            keyboard_path: String::new(),
            rescan_interval_ticks: default_rescan_interval_ticks(),
        }
    }
}

impl Default for PollConfig {
    fn default() -> Self {
        Self {
            tick_rate_hz: default_tick_rate_hz(),
            start_delay_ms: default_start_delay_ms(),
        }
    }
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            settings_path: default_settings_path(),
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            log_dir: String::new(),
        }
    }
}

/// Log levels accepted in `logging.level`
const LOG_LEVELS: &[&str] = &["trace", "debug", "info", "warn", "error"];

impl Config {
    /// Load configuration from a TOML file
    ///
    /// # Arguments
    ///
    /// * `path` - Path to the configuration file
    ///
    /// # Returns
    ///
    /// * `Result<Config>` - Loaded and validated configuration
    ///
    /// # Errors
    ///
    /// Returns error if:
    /// - File cannot be read
    /// - TOML parsing fails
    /// - Validation fails
    ///
    /// # Examples
    ///
    /// ```no_run
    /// use stick_cursor::config::Config;
    ///
    /// let config = Config::load("config/default.toml")?;
    /// # Ok::<(), Box<dyn std::error::Error>>(())
    /// ```
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let contents = fs::read_to_string(path)?;
        Self::from_toml(&contents)
    }

    /// Parse and validate configuration from TOML text
    pub fn from_toml(contents: &str) -> Result<Self> {
        let config: Config = toml::from_str(contents)?;
        config.validate()?;
        Ok(config)
    }

    /// Load `path` if it exists, otherwise use defaults
    ///
    /// A file that exists but fails to parse or validate is still an error.
    pub fn load_or_default<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        if path.exists() {
            Self::load(path)
        } else {
            Ok(Self::default())
        }
    }

    /// Validate configuration values
    ///
    /// # Errors
    ///
    /// Returns error if any configuration value is out of valid range
    pub fn validate(&self) -> Result<()> {
        if self.poll.tick_rate_hz == 0 || self.poll.tick_rate_hz > 1000 {
            return Err(StickCursorError::Config(toml::de::Error::custom(
                "tick_rate_hz must be between 1 and 1000",
            )));
        }

        if self.poll.start_delay_ms > 60000 {
            return Err(StickCursorError::Config(toml::de::Error::custom(
                "start_delay_ms must be at most 60000",
            )));
        }

        if self.input.rescan_interval_ticks == 0 {
            return Err(StickCursorError::Config(toml::de::Error::custom(
                "rescan_interval_ticks must be greater than 0",
            )));
        }

        // Screen override is all-or-nothing
        if (self.cursor.screen_width == 0) != (self.cursor.screen_height == 0) {
            return Err(StickCursorError::Config(toml::de::Error::custom(
                "screen_width and screen_height must both be set or both be 0",
            )));
        }

        if self.storage.settings_path.is_empty() {
            return Err(StickCursorError::Config(toml::de::Error::custom(
                "settings_path cannot be empty",
            )));
        }

        if !LOG_LEVELS.contains(&self.logging.level.to_ascii_lowercase().as_str()) {
            return Err(StickCursorError::Config(toml::de::Error::custom(format!(
                "logging level must be one of: {}",
                LOG_LEVELS.join(", ")
            ))));
        }

        Ok(())
    }
}

impl InputConfig {
    /// Configured gamepad device, if one was pinned
    #[must_use]
    pub fn gamepad_path(&self) -> Option<&str> {
        non_empty(&self.gamepad_path)
    }

    /// Configured keyboard device, if one was pinned
    #[must_use]
    pub fn keyboard_path(&self) -> Option<&str> {
        non_empty(&self.keyboard_path)
    }
}

fn non_empty(value: &str) -> Option<&str> {
    let trimmed = value.trim();
    (!trimmed.is_empty()).then_some(trimmed)
}
