//! Unit registry
//!
//! Explicit owner of every unit: the item collection stored per location and
//! the playback engine driving it. World events and due scheduler tasks are
//! routed here; nothing lives in process-wide state.

use crate::config::PlaybackSettings;
use crate::error::{Error, Result};
use crate::output::FeedbackKind;
use crate::playback::{Item, ItemSlots, PlaybackDeps, PlaybackEngine};
use crate::scheduler::{ScheduledTask, TaskHandle};
use mbx_common::Location;
use std::collections::BTreeMap;
use tracing::{debug, info, warn};

/// Result of inserting one item into a unit
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InsertOutcome {
    /// Stored in the given slot
    Inserted(usize),
    /// Every slot is occupied
    Full,
    /// The item is not something a unit can play
    NotPlayable,
}

/// Collections and engines keyed by location
#[derive(Debug)]
pub struct UnitRegistry {
    settings: PlaybackSettings,
    collections: BTreeMap<Location, ItemSlots>,
    engines: BTreeMap<Location, PlaybackEngine>,
}

impl UnitRegistry {
    pub fn new(settings: PlaybackSettings) -> Self {
        Self {
            settings,
            collections: BTreeMap::new(),
            engines: BTreeMap::new(),
        }
    }

    /// Rebuild units from persisted collections
    ///
    /// Engines are created and started for collections holding any item.
    /// Returns the number of engines started.
    pub fn restore(
        &mut self,
        collections: BTreeMap<Location, ItemSlots>,
        deps: &mut PlaybackDeps<'_>,
    ) -> usize {
        let mut started = 0;
        for (location, slots) in collections {
            if slots.items().next().is_some() {
                self.start_engine(&location, slots.clone(), deps);
                started += 1;
            }
            self.collections.insert(location, slots);
        }
        info!(
            "Restored {} units, {} with items",
            self.collections.len(),
            started
        );
        started
    }

    /// Register an empty unit; false if one already exists there
    pub fn place(&mut self, location: &Location) -> bool {
        if self.collections.contains_key(location) {
            return false;
        }
        info!("Placed unit at {}", location);
        self.collections.insert(
            location.clone(),
            ItemSlots::with_capacity(self.settings.slot_capacity),
        );
        true
    }

    /// Put one item into the first empty slot
    ///
    /// Creates the unit if needed, syncs its engine, emits insert feedback
    /// and schedules the force-start check.
    pub fn insert(
        &mut self,
        location: &Location,
        item: Item,
        deps: &mut PlaybackDeps<'_>,
    ) -> InsertOutcome {
        if !item.is_playable() {
            return InsertOutcome::NotPlayable;
        }

        let capacity = self.settings.slot_capacity;
        let slots = self
            .collections
            .entry(location.clone())
            .or_insert_with(|| ItemSlots::with_capacity(capacity));
        let kind = item.kind.clone();
        let Some(index) = slots.insert(item) else {
            debug!("Unit at {} is full", location);
            return InsertOutcome::Full;
        };
        info!("Added {} to slot {} at {}", kind, index, location);
        let snapshot = slots.clone();

        self.sync_engine(location, snapshot, deps);

        if let Err(e) = deps.output.emit_feedback(location, FeedbackKind::Inserted) {
            debug!("Insert feedback failed at {}: {}", location, e);
        }
        deps.scheduler.schedule_once(
            self.settings.force_start_delay_ticks,
            ScheduledTask::ForceStart(location.clone()),
        );
        InsertOutcome::Inserted(index)
    }

    /// Replace a unit's whole collection
    pub fn edit(&mut self, location: &Location, slots: ItemSlots, deps: &mut PlaybackDeps<'_>) {
        info!(
            "Collection at {} edited: {} slots, {} playable",
            location,
            slots.len(),
            slots.playable_count()
        );
        self.collections.insert(location.clone(), slots.clone());
        self.sync_engine(location, slots, deps);
    }

    /// Apply a trigger signal
    pub fn signal(
        &mut self,
        location: &Location,
        power: u8,
        deps: &mut PlaybackDeps<'_>,
    ) -> Result<()> {
        self.engine_mut(location)?.set_paused(power > 0, deps);
        Ok(())
    }

    /// Explicit skip
    pub fn skip(&mut self, location: &Location, deps: &mut PlaybackDeps<'_>) -> Result<()> {
        self.engine_mut(location)?.advance(deps);
        Ok(())
    }

    fn engine_mut(&mut self, location: &Location) -> Result<&mut PlaybackEngine> {
        self.engines.get_mut(location).ok_or_else(|| {
            Error::NotFound(format!("No MultiBox playing at {}", location.block_coords()))
        })
    }

    /// Tear down a unit; returns the items it held, or `None` if absent
    pub fn break_unit(
        &mut self,
        location: &Location,
        deps: &mut PlaybackDeps<'_>,
    ) -> Option<Vec<Item>> {
        if let Some(mut engine) = self.engines.remove(location) {
            engine.stop(deps);
        }
        let slots = self.collections.remove(location)?;
        let dropped: Vec<Item> = slots.items().cloned().collect();
        info!("Removed unit at {}, dropping {} items", location, dropped.len());
        Some(dropped)
    }

    /// Route a claimed scheduler task to its unit
    pub fn dispatch(
        &mut self,
        task: &ScheduledTask,
        handle: &TaskHandle,
        deps: &mut PlaybackDeps<'_>,
    ) {
        let Some(engine) = self.engines.get_mut(task.location()) else {
            debug!("Dropping task for removed unit at {}", task.location());
            return;
        };
        match task {
            ScheduledTask::Countdown(_) => engine.on_countdown(handle, deps),
            ScheduledTask::Feedback(_) => engine.on_feedback(handle, deps),
            ScheduledTask::ForceStart(location) => {
                if !engine.is_playing() {
                    info!("Force-starting playback at {} after insert", location);
                    engine.advance(deps);
                }
            }
        }
    }

    /// Stop every engine; collections stay for saving
    pub fn shutdown(&mut self, deps: &mut PlaybackDeps<'_>) {
        info!("Stopping {} playback engines", self.engines.len());
        for engine in self.engines.values_mut() {
            engine.stop(deps);
        }
        self.engines.clear();
    }

    /// Closest engine in the same world within `radius` blocks
    pub fn nearest(&self, location: &Location, radius: f64) -> Option<&PlaybackEngine> {
        self.engines
            .values()
            .filter_map(|engine| {
                engine
                    .location()
                    .distance(location)
                    .filter(|d| *d <= radius)
                    .map(|d| (d, engine))
            })
            .min_by(|a, b| a.0.total_cmp(&b.0))
            .map(|(_, engine)| engine)
    }

    pub fn engine(&self, location: &Location) -> Option<&PlaybackEngine> {
        self.engines.get(location)
    }

    pub fn collection(&self, location: &Location) -> Option<&ItemSlots> {
        self.collections.get(location)
    }

    pub fn collections(&self) -> &BTreeMap<Location, ItemSlots> {
        &self.collections
    }

    pub fn unit_count(&self) -> usize {
        self.collections.len()
    }

    pub fn engine_count(&self) -> usize {
        self.engines.len()
    }

    pub fn settings(&self) -> &PlaybackSettings {
        &self.settings
    }

    fn sync_engine(&mut self, location: &Location, slots: ItemSlots, deps: &mut PlaybackDeps<'_>) {
        match self.engines.get_mut(location) {
            Some(engine) => engine.update_items(slots, deps),
            None => self.start_engine(location, slots, deps),
        }
    }

    fn start_engine(&mut self, location: &Location, slots: ItemSlots, deps: &mut PlaybackDeps<'_>) {
        if let Some(mut previous) = self.engines.remove(location) {
            warn!("Replacing existing engine at {}", location);
            previous.stop(deps);
        }
        debug!("Creating playback engine at {}", location);
        let mut engine = PlaybackEngine::new(location.clone(), slots, &self.settings);
        engine.start(deps);
        self.engines.insert(location.clone(), engine);
    }
}
