//! Duration registry
//!
//! Maps item type identifiers to playback durations in ticks. Shared by
//! every playback engine; reads take a read lock, and every store write runs
//! inside one writer critical section owned by the registry.
//!
//! **Responsibilities:**
//! - Merge built-in defaults with the persisted store (`load`/`reload`)
//! - Pure lookups that report misses instead of mutating (`lookup`)
//! - Once-per-type discovery of unknown types, flushed off the tick path
//!   (`note_unknown`, `flush_discoveries`)
//! - Administrative updates and listing (`update`, `list`)

pub mod catalog;
pub mod store;

use crate::error::{Error, Result};
use mbx_common::timing::{seconds_to_ticks, ticks_to_seconds};
use std::collections::{BTreeMap, HashSet};
use std::path::PathBuf;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Mutex, MutexGuard, RwLock};
use store::{is_metadata_key, DurationStore, NOTE_KEY, NOTE_TEXT};
use toml::{Table, Value};
use tracing::{debug, error, info, warn};

/// File name of the duration store inside the data folder
pub const DURATIONS_FILE: &str = "item_durations.toml";

/// Result of a registry lookup
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DurationLookup {
    /// Registered duration in ticks
    Known(u64),
    /// No entry; carries the default duration in ticks
    Unknown(u64),
}

impl DurationLookup {
    pub fn ticks(self) -> u64 {
        match self {
            DurationLookup::Known(ticks) | DurationLookup::Unknown(ticks) => ticks,
        }
    }

    pub fn is_known(self) -> bool {
        matches!(self, DurationLookup::Known(_))
    }
}

/// One row of the administrative listing
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DurationEntry {
    pub kind: String,
    pub seconds: u64,
    /// Member of the built-in catalog (as opposed to a custom type)
    pub known: bool,
}

#[derive(Debug, Default)]
struct Discovery {
    /// Types waiting for their store write
    pending: Vec<String>,
    /// Every type ever noted; never noted twice
    seen: HashSet<String>,
}

/// Process-wide item type → duration map
#[derive(Debug)]
pub struct DurationRegistry {
    store: DurationStore,
    default_secs: u32,
    durations: RwLock<BTreeMap<String, u64>>,
    discovery: Mutex<Discovery>,
    write_lock: Mutex<()>,
    store_writes: AtomicU64,
}

fn normalize(kind: &str) -> String {
    kind.trim().to_ascii_uppercase()
}

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
}

impl DurationRegistry {
    /// Build a registry backed by `path` and load it immediately
    ///
    /// Never fails: store problems are logged and built-in defaults apply.
    pub fn load(path: impl Into<PathBuf>, default_secs: u32) -> Self {
        let registry = Self {
            store: DurationStore::new(path),
            default_secs: default_secs.max(1),
            durations: RwLock::new(BTreeMap::new()),
            discovery: Mutex::new(Discovery::default()),
            write_lock: Mutex::new(()),
            store_writes: AtomicU64::new(0),
        };
        registry.reload();
        registry
    }

    /// Re-read the store, merging in any missing built-in defaults
    ///
    /// Missing defaults and the format note are written back in a single
    /// atomic write. Entries that are not positive integers are skipped with
    /// a warning. A store that cannot be parsed at all is left untouched on
    /// disk and only the built-in defaults are used.
    ///
    /// Returns the number of entries now registered.
    pub fn reload(&self) -> usize {
        let _writer = lock(&self.write_lock);

        let (mut table, mut dirty, writable) = match self.store.read_table() {
            Ok(Some(table)) => (table, false, true),
            Ok(None) => {
                info!("Creating new {:?} with default values", self.store.path());
                (Table::new(), true, true)
            }
            Err(e) => {
                error!("Duration store unreadable, using built-in defaults only: {}", e);
                (Table::new(), false, false)
            }
        };

        for (name, secs) in catalog::DEFAULT_DURATIONS {
            if !table.contains_key(*name) {
                table.insert(name.to_string(), Value::Integer(i64::from(*secs)));
                dirty = true;
            }
        }
        if !table.contains_key(NOTE_KEY) {
            table.insert(NOTE_KEY.to_string(), Value::String(NOTE_TEXT.to_string()));
            dirty = true;
        }

        let mut loaded = BTreeMap::new();
        for (key, value) in &table {
            if is_metadata_key(key) {
                continue;
            }
            match value.as_integer().and_then(|s| u32::try_from(s).ok()) {
                Some(secs) if secs > 0 => {
                    debug!("Loaded duration for {}: {} seconds", key, secs);
                    loaded.insert(normalize(key), seconds_to_ticks(secs));
                }
                _ => warn!("Skipping duration entry {} with invalid value {}", key, value),
            }
        }

        if dirty && writable {
            match self.store.write_table(&table) {
                Ok(()) => {
                    self.store_writes.fetch_add(1, Ordering::Relaxed);
                    info!("Saved {:?} with default values", self.store.path());
                }
                Err(e) => error!("Failed to save {:?}: {}", self.store.path(), e),
            }
        }

        let count = loaded.len();
        *self.durations.write().unwrap_or_else(|p| p.into_inner()) = loaded;
        info!("Duration registry holds {} entries", count);
        count
    }

    /// Registered duration for `kind`, or the default on a miss
    ///
    /// Pure read. A miss does not register anything; callers report it via
    /// [`note_unknown`](Self::note_unknown).
    pub fn lookup(&self, kind: &str) -> DurationLookup {
        let durations = self.durations.read().unwrap_or_else(|p| p.into_inner());
        match durations.get(&normalize(kind)) {
            Some(ticks) => DurationLookup::Known(*ticks),
            None => DurationLookup::Unknown(self.default_ticks()),
        }
    }

    pub fn contains(&self, kind: &str) -> bool {
        self.lookup(kind).is_known()
    }

    pub fn default_ticks(&self) -> u64 {
        seconds_to_ticks(self.default_secs)
    }

    /// Queue `kind` for auto-registration with the default duration
    ///
    /// Returns true only the first time a given unregistered type is noted.
    /// No I/O happens here.
    pub fn note_unknown(&self, kind: &str) -> bool {
        let kind = normalize(kind);
        if kind.is_empty() || self.contains(&kind) {
            return false;
        }

        let mut discovery = lock(&self.discovery);
        if !discovery.seen.insert(kind.clone()) {
            return false;
        }
        info!(
            "Found unknown item {}, queued for registration with default value: {} seconds",
            kind, self.default_secs
        );
        discovery.pending.push(kind);
        true
    }

    /// Number of discoveries waiting for [`flush_discoveries`](Self::flush_discoveries)
    pub fn pending_discoveries(&self) -> usize {
        lock(&self.discovery).pending.len()
    }

    /// Write every pending discovery to the store
    ///
    /// Each type is written at most once over the registry's lifetime; a
    /// failed write is logged and not retried. Returns the number of types
    /// registered.
    pub fn flush_discoveries(&self) -> usize {
        let pending = std::mem::take(&mut lock(&self.discovery).pending);
        let mut registered = 0;
        for kind in pending {
            if self.contains(&kind) {
                continue;
            }
            match self.update(&kind, self.default_secs) {
                Ok(()) => registered += 1,
                Err(e) => warn!("Could not auto-register {}: {}", kind, e),
            }
        }
        registered
    }

    /// Set the duration of `kind` to `seconds`, persisting first
    ///
    /// # Errors
    ///
    /// - `InvalidInput` for an empty identifier or zero seconds
    /// - `Durations` when the store cannot be read or written; the
    ///   in-memory map and the previous file are unchanged in that case
    pub fn update(&self, kind: &str, seconds: u32) -> Result<()> {
        let kind = normalize(kind);
        if kind.is_empty() {
            return Err(Error::InvalidInput("Item type must not be empty".to_string()));
        }
        if seconds == 0 {
            return Err(Error::InvalidInput("Duration must be greater than 0 seconds".to_string()));
        }

        let _writer = lock(&self.write_lock);

        let mut table = match self.store.read_table() {
            Ok(Some(table)) => table,
            Ok(None) => Table::new(),
            Err(e) => {
                return Err(Error::Durations(format!(
                    "Refusing to overwrite unreadable store: {}",
                    e
                )))
            }
        };
        table.insert(kind.clone(), Value::Integer(i64::from(seconds)));

        self.store
            .write_table(&table)
            .map_err(|e| Error::Durations(format!("Failed to save {:?}: {}", self.store.path(), e)))?;
        self.store_writes.fetch_add(1, Ordering::Relaxed);

        self.durations
            .write()
            .unwrap_or_else(|p| p.into_inner())
            .insert(kind.clone(), seconds_to_ticks(seconds));

        if catalog::is_known(&kind) {
            info!("Updated duration for {} to {} seconds", kind, seconds);
        } else {
            info!("Updated duration for custom item {} to {} seconds", kind, seconds);
        }
        Ok(())
    }

    /// All registered entries, ordered by type identifier
    pub fn list(&self) -> Vec<DurationEntry> {
        let durations = self.durations.read().unwrap_or_else(|p| p.into_inner());
        durations
            .iter()
            .map(|(kind, ticks)| DurationEntry {
                kind: kind.clone(),
                seconds: ticks_to_seconds(*ticks),
                known: catalog::is_known(kind),
            })
            .collect()
    }

    /// Total successful store writes since construction
    pub fn store_writes(&self) -> u64 {
        self.store_writes.load(Ordering::Relaxed)
    }
}
