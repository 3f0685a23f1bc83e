//! Host
//!
//! Owns everything a running service needs and drives it one tick at a time:
//! the tick scheduler, the output sink, the shared duration registry, the
//! unit registry and the unit store.
//!
//! **Responsibilities:**
//! - Claim due scheduler tasks and route them to their units
//! - Turn text lines into world events or admin commands
//! - Restore units at startup and save them at shutdown

use crate::admin::{AdminCommand, AdminContext, USAGE};
use crate::config::{Config, PlaybackSettings};
use crate::durations::DurationRegistry;
use crate::error::Result;
use crate::events::WorldEvent;
use crate::output::Output;
use crate::playback::PlaybackDeps;
use crate::scheduler::TickScheduler;
use crate::store::UnitStore;
use crate::units::{InsertOutcome, UnitRegistry};
use mbx_common::config::ensure_directory_exists;
use std::sync::Arc;
use tracing::{debug, info, warn};

/// Service state driven by the tick loop
pub struct Host {
    scheduler: TickScheduler,
    output: Box<dyn Output + Send>,
    durations: Arc<DurationRegistry>,
    units: UnitRegistry,
    store: UnitStore,
    settings: PlaybackSettings,
}

impl Host {
    /// Open the data folder, load durations and prepare an empty registry
    pub fn new(config: &Config, output: Box<dyn Output + Send>) -> Result<Self> {
        ensure_directory_exists(&config.data_folder)?;
        let durations = Arc::new(DurationRegistry::load(
            config.durations_path(),
            config.playback.default_duration_secs,
        ));
        Ok(Self {
            scheduler: TickScheduler::new(),
            output,
            durations,
            units: UnitRegistry::new(config.playback.clone()),
            store: UnitStore::new(config.units_path()),
            settings: config.playback.clone(),
        })
    }

    /// Load persisted units and start their engines
    pub fn restore(&mut self) -> Result<usize> {
        let collections = self.store.load()?;
        let mut deps = PlaybackDeps {
            scheduler: &mut self.scheduler,
            output: &mut *self.output,
            durations: &self.durations,
        };
        Ok(self.units.restore(collections, &mut deps))
    }

    /// Advance one tick and run every task that came due
    ///
    /// Returns the number of tasks run.
    pub fn tick(&mut self) -> usize {
        let due = self.scheduler.advance();
        let mut ran = 0;
        for handle in due {
            // A task run earlier in this tick may have cancelled this one
            let Some(task) = self.scheduler.claim(&handle) else {
                continue;
            };
            let mut deps = PlaybackDeps {
                scheduler: &mut self.scheduler,
                output: &mut *self.output,
                durations: &self.durations,
            };
            self.units.dispatch(&task, &handle, &mut deps);
            ran += 1;
        }
        ran
    }

    /// Handle one input line; returns reply lines
    pub fn handle_line(&mut self, line: &str) -> Vec<String> {
        let tokens: Vec<&str> = line.split_whitespace().collect();
        let Some(verb) = tokens.first() else {
            return Vec::new();
        };
        if verb.eq_ignore_ascii_case("help") {
            return vec![USAGE.to_string()];
        }

        if let Some(event) = WorldEvent::parse(&tokens) {
            return match event {
                Ok(event) => self.apply(event),
                Err(e) => vec![e.to_string()],
            };
        }

        match AdminCommand::parse(&tokens) {
            Some(Ok(command)) => {
                debug!("Running admin command {:?}", command);
                let ctx = AdminContext {
                    durations: &self.durations,
                    units: &self.units,
                    settings: &self.settings,
                };
                command.execute(&ctx)
            }
            Some(Err(e)) => vec![e.to_string()],
            None => vec![format!("Unknown command: {}", verb), USAGE.to_string()],
        }
    }

    /// Apply a world event to the unit registry
    pub fn apply(&mut self, event: WorldEvent) -> Vec<String> {
        let mut deps = PlaybackDeps {
            scheduler: &mut self.scheduler,
            output: &mut *self.output,
            durations: &self.durations,
        };
        let units = &mut self.units;

        let reply = match event {
            WorldEvent::Place(location) => {
                if units.place(&location) {
                    format!("Placed MultiBox at {}", location.block_coords())
                } else {
                    format!("MultiBox already exists at {}", location.block_coords())
                }
            }
            WorldEvent::Insert(location, item) => {
                let kind = item.kind.clone();
                match units.insert(&location, item, &mut deps) {
                    InsertOutcome::Inserted(_) => "Added disc to MultiBox".to_string(),
                    InsertOutcome::Full => "MultiBox is full. Open it to manage discs.".to_string(),
                    InsertOutcome::NotPlayable => format!("{} is not a playable item", kind),
                }
            }
            WorldEvent::Edit(location, slots) => {
                let playable = slots.playable_count();
                units.edit(&location, slots, &mut deps);
                format!(
                    "MultiBox at {} now holds {} playable items",
                    location.block_coords(),
                    playable
                )
            }
            WorldEvent::Signal(location, power) => match units.signal(&location, power, &mut deps) {
                Ok(()) => format!("Signal {} at {}", power, location.block_coords()),
                Err(e) => e.to_string(),
            },
            WorldEvent::Skip(location) => match units.skip(&location, &mut deps) {
                Ok(()) => format!("Skipped at {}", location.block_coords()),
                Err(e) => e.to_string(),
            },
            WorldEvent::Break(location) => match units.break_unit(&location, &mut deps) {
                Some(dropped) => {
                    let mut reply = format!(
                        "Broke MultiBox at {}, dropped {} items",
                        location.block_coords(),
                        dropped.len()
                    );
                    for item in dropped {
                        reply.push_str(&format!("\n  {}", item.kind));
                    }
                    reply
                }
                None => format!("No MultiBox at {}", location.block_coords()),
            },
        };
        vec![reply]
    }

    /// Shared handle for flushing discoveries off the tick path
    pub fn durations(&self) -> Arc<DurationRegistry> {
        Arc::clone(&self.durations)
    }

    pub fn units(&self) -> &UnitRegistry {
        &self.units
    }

    pub fn scheduler(&self) -> &TickScheduler {
        &self.scheduler
    }

    /// Stop every engine and save all collections
    pub fn shutdown(&mut self) -> Result<()> {
        info!("Shutting down {} units", self.units.unit_count());
        let mut deps = PlaybackDeps {
            scheduler: &mut self.scheduler,
            output: &mut *self.output,
            durations: &self.durations,
        };
        self.units.shutdown(&mut deps);

        let pending = self.durations.flush_discoveries();
        if pending > 0 {
            info!("Registered {} discovered item types before exit", pending);
        }

        if let Err(e) = self.store.save(self.units.collections()) {
            warn!("Failed to save units: {}", e);
            return Err(e);
        }
        Ok(())
    }
}
