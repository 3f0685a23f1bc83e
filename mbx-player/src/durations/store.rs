//! TOML-backed duration store
//!
//! `TYPE = seconds` entries plus a `_note` string. Keys starting with `_`
//! are metadata. Writes go through an atomic temp file + rename.

use crate::error::{Error, Result};
use mbx_common::config::write_toml_atomic;
use std::path::{Path, PathBuf};
use toml::Table;

/// Metadata key explaining the file format to people editing it
pub const NOTE_KEY: &str = "_note";

/// Text stored under [`NOTE_KEY`]
pub const NOTE_TEXT: &str =
    "Duration values are in seconds. Edit these to match custom resource packs or future item lengths.";

/// File-backed key → seconds table
#[derive(Debug, Clone)]
pub struct DurationStore {
    path: PathBuf,
}

impl DurationStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Read the whole table
    ///
    /// Returns `Ok(None)` when the file does not exist yet.
    pub fn read_table(&self) -> Result<Option<Table>> {
        if !self.path.exists() {
            return Ok(None);
        }
        let content = std::fs::read_to_string(&self.path)?;
        let table = content
            .parse::<Table>()
            .map_err(|e| Error::Durations(format!("Failed to parse {:?}: {}", self.path, e)))?;
        Ok(Some(table))
    }

    /// Replace the whole table atomically
    pub fn write_table(&self, table: &Table) -> Result<()> {
        write_toml_atomic(table, &self.path)?;
        Ok(())
    }
}

/// Whether a table key is metadata rather than an item type
pub fn is_metadata_key(key: &str) -> bool {
    key.starts_with('_')
}
