//! Unit collection store
//!
//! `units.json` maps `world,x,y,z` to the unit's slot array. Read once at
//! startup and written once at shutdown; never touched during play.

use crate::error::{Error, Result};
use crate::playback::ItemSlots;
use mbx_common::config::write_atomic;
use mbx_common::Location;
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use tracing::{info, warn};

/// File name of the unit store inside the data folder
pub const UNITS_FILE: &str = "units.json";

/// JSON file holding every unit's collection
#[derive(Debug, Clone)]
pub struct UnitStore {
    path: PathBuf,
}

impl UnitStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Read all collections; a missing file yields an empty map
    ///
    /// Entries whose key is not a valid location are skipped with a warning.
    pub fn load(&self) -> Result<BTreeMap<Location, ItemSlots>> {
        if !self.path.exists() {
            info!("No unit store at {:?}, starting empty", self.path);
            return Ok(BTreeMap::new());
        }

        let text = std::fs::read_to_string(&self.path)?;
        let raw: BTreeMap<String, ItemSlots> = serde_json::from_str(&text)
            .map_err(|e| Error::Store(format!("Failed to parse {:?}: {}", self.path, e)))?;

        let mut units = BTreeMap::new();
        for (key, slots) in raw {
            match key.parse::<Location>() {
                Ok(location) => {
                    units.insert(location, slots);
                }
                Err(e) => warn!("Skipping unit with bad location {:?}: {}", key, e),
            }
        }
        info!("Loaded {} units from {:?}", units.len(), self.path);
        Ok(units)
    }

    /// Write all collections atomically
    pub fn save(&self, units: &BTreeMap<Location, ItemSlots>) -> Result<()> {
        let raw: BTreeMap<String, &ItemSlots> = units
            .iter()
            .map(|(location, slots)| (location.to_string(), slots))
            .collect();
        let json = serde_json::to_string_pretty(&raw)?;
        write_atomic(&self.path, &json)
            .map_err(|e| Error::Store(format!("Failed to save {:?}: {}", self.path, e)))?;
        info!("Saved {} units to {:?}", units.len(), self.path);
        Ok(())
    }
}
