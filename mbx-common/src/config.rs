//! Bootstrap configuration pieces and data folder resolution
//!
//! Data folder resolution priority:
//! 1. Command-line argument (highest priority)
//! 2. Environment variable (`MBX_DATA_FOLDER`)
//! 3. TOML config file `data_folder` key
//! 4. OS-dependent compiled default (fallback)

use crate::{Error, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tracing::{debug, info};

/// Environment variable overriding the data folder
pub const DATA_FOLDER_ENV: &str = "MBX_DATA_FOLDER";

/// Logging configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// Log level (trace, debug, info, warn, error), or a full filter
    /// directive when it contains `=` (e.g. `mbx_player=debug,warn`)
    #[serde(default = "default_log_level")]
    pub level: String,

    /// Log file path (optional, logs to stderr if not specified)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub file: Option<PathBuf>,
}

impl LoggingConfig {
    /// `EnvFilter` directive for the given crate targets
    ///
    /// A bare level applies to every target; a value containing `=` is
    /// already a directive and is used unchanged.
    pub fn filter_directive(&self, targets: &[&str]) -> String {
        if self.level.contains('=') {
            return self.level.clone();
        }
        targets
            .iter()
            .map(|target| format!("{}={}", target, self.level))
            .collect::<Vec<_>>()
            .join(",")
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            file: None,
        }
    }
}

fn default_log_level() -> String {
    "info".to_string()
}

/// Resolves the data folder following the priority order above
#[derive(Debug, Clone, Default)]
pub struct DataFolderResolver {
    cli_arg: Option<PathBuf>,
    config_value: Option<PathBuf>,
}

impl DataFolderResolver {
    pub fn new() -> Self {
        Self::default()
    }

    /// Value passed on the command line
    pub fn with_cli_arg(mut self, path: Option<PathBuf>) -> Self {
        self.cli_arg = path;
        self
    }

    /// Value read from the TOML config file
    pub fn with_config_value(mut self, path: Option<PathBuf>) -> Self {
        self.config_value = path;
        self
    }

    pub fn resolve(&self) -> PathBuf {
        // Priority 1: Command-line argument
        if let Some(path) = &self.cli_arg {
            debug!("Data folder from command line: {}", path.display());
            return path.clone();
        }

        // Priority 2: Environment variable
        if let Ok(path) = std::env::var(DATA_FOLDER_ENV) {
            if !path.is_empty() {
                debug!("Data folder from {}: {}", DATA_FOLDER_ENV, path);
                return PathBuf::from(path);
            }
        }

        // Priority 3: TOML config file
        if let Some(path) = &self.config_value {
            debug!("Data folder from config file: {}", path.display());
            return path.clone();
        }

        // Priority 4: OS-dependent compiled default
        default_data_folder()
    }
}

/// OS-dependent default data folder
pub fn default_data_folder() -> PathBuf {
    dirs::data_local_dir()
        .map(|d| d.join("multibox"))
        .unwrap_or_else(|| PathBuf::from("./multibox_data"))
}

/// Default location of the bootstrap config file
pub fn default_config_path() -> Option<PathBuf> {
    dirs::config_dir().map(|d| d.join("multibox").join("multibox.toml"))
}

/// Create the directory (and parents) if it does not exist yet
pub fn ensure_directory_exists(path: &Path) -> Result<()> {
    if !path.exists() {
        std::fs::create_dir_all(path)?;
        info!("Created data folder: {}", path.display());
    }
    Ok(())
}

/// Write `contents` to `target` atomically (temp file + rename)
///
/// A failed write leaves any previous file at `target` untouched.
pub fn write_atomic(target: &Path, contents: &str) -> Result<()> {
    let file_name = target
        .file_name()
        .ok_or_else(|| Error::InvalidInput(format!("Not a file path: {}", target.display())))?;
    let mut temp_name = file_name.to_os_string();
    temp_name.push(".tmp");
    let temp_path = target.with_file_name(temp_name);

    if let Err(e) = std::fs::write(&temp_path, contents) {
        let _ = std::fs::remove_file(&temp_path);
        return Err(Error::Io(e));
    }

    if let Err(e) = std::fs::rename(&temp_path, target) {
        let _ = std::fs::remove_file(&temp_path);
        return Err(Error::Io(e));
    }

    Ok(())
}

/// Serialize `value` as TOML and write it atomically to `target`
pub fn write_toml_atomic<T: Serialize>(value: &T, target: &Path) -> Result<()> {
    let contents = toml::to_string(value)
        .map_err(|e| Error::Config(format!("Failed to serialize TOML: {}", e)))?;
    write_atomic(target, &contents)
}
