//! Configuration management for mbx-player
//!
//! Single-tier bootstrap configuration loaded from a TOML file.
//!
//! # Settings Sources Priority
//!
//! 1. Command-line arguments (--data-folder)
//! 2. Environment variables (MBX_DATA_FOLDER)
//! 3. TOML configuration file
//! 4. Built-in defaults (code constants)
//!
//! A missing TOML file is not an error: a warning is logged and built-in
//! defaults are used. A file that exists but cannot be parsed is an error.

use crate::error::{Error, Result};
use mbx_common::config::{DataFolderResolver, LoggingConfig};
use serde::Deserialize;
use std::path::{Path, PathBuf};
use tracing::{info, warn};

/// Bootstrap configuration loaded from TOML file
#[derive(Debug, Clone, Default, Deserialize)]
pub struct TomlConfig {
    /// Folder holding `item_durations.toml` and `units.json`
    #[serde(default)]
    pub data_folder: Option<PathBuf>,

    /// Logging configuration (optional)
    #[serde(default)]
    pub logging: LoggingConfig,

    /// Playback tunables (optional)
    #[serde(default)]
    pub playback: PlaybackSettings,
}

/// Playback tunables
///
/// All values are in ticks unless the name says otherwise.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct PlaybackSettings {
    /// Duration assumed for item types with no registry entry
    pub default_duration_secs: u32,

    /// Number of slots in a freshly placed unit
    pub slot_capacity: usize,

    /// Delay before the post-insert check that force-starts idle units
    pub force_start_delay_ticks: u64,

    /// Period of the note feedback task
    pub feedback_interval_ticks: u64,

    /// Period of the countdown task (one decrement per period)
    pub countdown_period_ticks: u64,

    /// How often the feedback task logs remaining time
    pub remaining_log_interval_ticks: u64,

    /// Search radius in blocks for `status`
    pub status_radius: f64,

    /// Wall-clock length of one tick in milliseconds
    pub tick_ms: u64,

    /// Upper bound for `give` amounts
    pub max_give_amount: u32,
}

impl Default for PlaybackSettings {
    fn default() -> Self {
        Self {
            default_duration_secs: 180,
            slot_capacity: 27,
            force_start_delay_ticks: 10,
            feedback_interval_ticks: 20,
            countdown_period_ticks: 20,
            remaining_log_interval_ticks: 400,
            status_radius: 10.0,
            tick_ms: mbx_common::timing::TICK_MS,
            max_give_amount: 64,
        }
    }
}

impl PlaybackSettings {
    /// Reject values that would stall the scheduler or divide by zero
    pub fn validate(&self) -> Result<()> {
        if self.default_duration_secs == 0 {
            return Err(Error::Config("default_duration_secs must be > 0".to_string()));
        }
        if self.slot_capacity == 0 {
            return Err(Error::Config("slot_capacity must be > 0".to_string()));
        }
        if self.countdown_period_ticks == 0 || self.feedback_interval_ticks == 0 {
            return Err(Error::Config("task periods must be > 0 ticks".to_string()));
        }
        if self.tick_ms == 0 {
            return Err(Error::Config("tick_ms must be > 0".to_string()));
        }
        if self.max_give_amount == 0 {
            return Err(Error::Config("max_give_amount must be > 0".to_string()));
        }
        Ok(())
    }
}

/// Complete application configuration
#[derive(Debug, Clone)]
pub struct Config {
    /// Resolved data folder
    pub data_folder: PathBuf,

    /// Logging configuration
    pub logging: LoggingConfig,

    /// Playback tunables
    pub playback: PlaybackSettings,
}

/// Command-line configuration overrides
#[derive(Debug, Clone, Default)]
pub struct ConfigOverrides {
    pub data_folder: Option<PathBuf>,
    pub log_level: Option<String>,
}

impl Config {
    /// Load configuration from an optional TOML file plus overrides
    ///
    /// # Errors
    ///
    /// Returns error if the TOML file exists but cannot be read or parsed,
    /// or if the playback settings are out of range.
    pub fn load(toml_path: Option<&Path>, overrides: ConfigOverrides) -> Result<Self> {
        let toml_config = match toml_path {
            Some(path) if path.exists() => {
                let toml_str = std::fs::read_to_string(path).map_err(|e| {
                    Error::Config(format!("Failed to read config file {:?}: {}", path, e))
                })?;
                let parsed = Self::parse(&toml_str)?;
                info!("Loaded TOML configuration from {:?}", path);
                parsed
            }
            Some(path) => {
                warn!("Config file {:?} not found, using built-in defaults", path);
                TomlConfig::default()
            }
            None => TomlConfig::default(),
        };

        Self::from_toml(toml_config, overrides)
    }

    /// Parse TOML text into the bootstrap config
    pub fn parse(toml_str: &str) -> Result<TomlConfig> {
        toml::from_str(toml_str).map_err(|e| Error::Config(format!("Failed to parse TOML: {}", e)))
    }

    /// Apply overrides and resolve the data folder
    pub fn from_toml(toml_config: TomlConfig, overrides: ConfigOverrides) -> Result<Self> {
        toml_config.playback.validate()?;

        let data_folder = DataFolderResolver::new()
            .with_cli_arg(overrides.data_folder)
            .with_config_value(toml_config.data_folder)
            .resolve();

        let mut logging = toml_config.logging;
        if let Some(level) = overrides.log_level {
            logging.level = level;
        }

        Ok(Self {
            data_folder,
            logging,
            playback: toml_config.playback,
        })
    }

    /// Path of the duration store inside the data folder
    pub fn durations_path(&self) -> PathBuf {
        self.data_folder.join(crate::durations::DURATIONS_FILE)
    }

    /// Path of the unit collection store inside the data folder
    pub fn units_path(&self) -> PathBuf {
        self.data_folder.join(crate::store::UNITS_FILE)
    }
}
