//! Playback engine
//!
//! One engine per unit. Cycles through the unit's slots one item at a time,
//! advancing when the active item's countdown runs out.
//!
//! **Responsibilities:**
//! - Positional next-item selection (wrap once, skip empty/unplayable slots)
//! - Arm/disarm the countdown; at most one live countdown per engine
//! - Pause/resume from the trigger signal
//! - React to wholesale replacement of the slot collection
//!
//! All transitions, whether caused by a caller or by an expiring countdown,
//! go through [`PlaybackEngine::transition`]. The countdown path sets the
//! single-use advance guard after it has advanced, so an explicit
//! [`advance`](PlaybackEngine::advance) racing with it in the same tick is
//! absorbed instead of skipping a second item.

use super::slots::ItemSlots;
use crate::config::PlaybackSettings;
use crate::durations::{DurationLookup, DurationRegistry};
use crate::output::{FeedbackKind, Output};
use crate::scheduler::{ScheduledTask, Scheduler, TaskHandle};
use chrono::{DateTime, Utc};
use mbx_common::timing::ticks_to_seconds;
use mbx_common::{time, Location};
use std::fmt;
use tracing::{debug, error, info, warn};

/// Host capabilities an engine operation needs
pub struct PlaybackDeps<'a> {
    pub scheduler: &'a mut dyn Scheduler,
    pub output: &'a mut dyn Output,
    pub durations: &'a DurationRegistry,
}

/// Derived engine state
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PlaybackState {
    /// Nothing playing, no playable item or waiting for one
    Idle,
    /// An item is active and its countdown is running
    Playing,
    /// Suspended by the trigger signal or an explicit stop
    Paused,
}

impl fmt::Display for PlaybackState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PlaybackState::Idle => write!(f, "idle"),
            PlaybackState::Playing => write!(f, "playing"),
            PlaybackState::Paused => write!(f, "paused"),
        }
    }
}

/// Period settings copied out of [`PlaybackSettings`]
#[derive(Debug, Clone, Copy)]
struct Periods {
    countdown: u64,
    feedback: u64,
    remaining_log: u64,
}

/// Per-location playback state machine
#[derive(Debug)]
pub struct PlaybackEngine {
    location: Location,
    slots: ItemSlots,

    /// Last successfully started slot
    current_index: Option<usize>,
    /// An item is conceptually active (survives a pause)
    playing: bool,
    paused: bool,
    current_item: Option<String>,
    remaining_ticks: u64,
    started_at: Option<DateTime<Utc>>,

    /// Set right after a countdown-driven advance; the next explicit
    /// `advance()` clears it and does nothing. Also cleared by the next
    /// countdown period, `start()`, `stop()` and `set_paused()`.
    advance_guard: bool,

    countdown: Option<TaskHandle>,
    feedback: Option<TaskHandle>,
    periods: Periods,
}

impl PlaybackEngine {
    pub fn new(location: Location, slots: ItemSlots, settings: &PlaybackSettings) -> Self {
        Self {
            location,
            slots,
            current_index: None,
            playing: false,
            paused: false,
            current_item: None,
            remaining_ticks: 0,
            started_at: None,
            advance_guard: false,
            countdown: None,
            feedback: None,
            periods: Periods {
                countdown: settings.countdown_period_ticks.max(1),
                feedback: settings.feedback_interval_ticks.max(1),
                remaining_log: settings.remaining_log_interval_ticks.max(1),
            },
        }
    }

    /// Reset everything and try to play
    ///
    /// Safe on an already started engine; acts as a full reset.
    pub fn start(&mut self, deps: &mut PlaybackDeps<'_>) {
        info!("Starting playback engine at {}", self.location);

        self.cancel_countdown(deps);
        self.cancel_feedback(deps);
        self.current_index = None;
        self.playing = false;
        self.paused = false;
        self.clear_current();
        self.advance_guard = false;

        if self.slots.has_playable() {
            debug!(
                "{} playable items at {}, playing immediately",
                self.slots.playable_count(),
                self.location
            );
            self.playing = true;
            self.transition(deps);
        } else {
            info!("No playable items at {}", self.location);
        }

        self.feedback = Some(deps.scheduler.schedule_recurring(
            self.periods.feedback,
            ScheduledTask::Feedback(self.location.clone()),
        ));
    }

    /// Play the next item
    ///
    /// Does nothing while paused. If the advance guard is set, clears it and
    /// returns: the countdown already handled this transition.
    pub fn advance(&mut self, deps: &mut PlaybackDeps<'_>) {
        if self.paused {
            debug!("Not advancing at {}: paused", self.location);
            return;
        }
        if self.advance_guard {
            debug!(
                "Ignoring advance at {}: countdown already advanced",
                self.location
            );
            self.advance_guard = false;
            return;
        }
        self.transition(deps);
    }

    /// Unguarded next-item transition
    fn transition(&mut self, deps: &mut PlaybackDeps<'_>) {
        self.cancel_countdown(deps);

        if !self.slots.has_playable() {
            debug!("No playable items left at {}", self.location);
            self.go_idle();
            return;
        }

        match self.slots.next_playable(self.current_index) {
            Some(index) => self.play_item(index, deps),
            None => {
                error!(
                    "Playable item check passed at {} but no slot was selected",
                    self.location
                );
                self.go_idle();
            }
        }
    }

    fn play_item(&mut self, index: usize, deps: &mut PlaybackDeps<'_>) {
        let Some(kind) = self.slots.get(index).map(|item| item.kind.clone()) else {
            warn!("Attempted to play empty slot {} at {}", index, self.location);
            self.go_idle();
            return;
        };

        let ticks = match deps.durations.lookup(&kind) {
            DurationLookup::Known(ticks) => ticks,
            DurationLookup::Unknown(ticks) => {
                deps.durations.note_unknown(&kind);
                ticks
            }
        };

        self.current_index = Some(index);
        self.current_item = Some(kind.clone());
        self.started_at = Some(time::now());
        self.advance_guard = false;
        self.remaining_ticks = ticks;
        self.countdown = Some(deps.scheduler.schedule_recurring(
            self.periods.countdown,
            ScheduledTask::Countdown(self.location.clone()),
        ));

        info!(
            "Playing {} (slot {}) at {} for {} seconds",
            kind,
            index,
            self.location,
            ticks_to_seconds(ticks)
        );
        if let Err(e) = deps.output.begin_playback(&self.location, &kind) {
            warn!("Failed to start sound at {}: {}", self.location, e);
        }
        self.playing = true;
    }

    /// Cancel timers, silence the unit and mark it paused
    ///
    /// Idempotent. Used for deliberate stops and for teardown.
    pub fn stop(&mut self, deps: &mut PlaybackDeps<'_>) {
        debug!("Stopping playback engine at {}", self.location);
        self.cancel_countdown(deps);
        self.cancel_feedback(deps);
        self.stop_output(deps);
        self.paused = true;
        self.playing = false;
        self.clear_current();
        self.advance_guard = false;
    }

    /// Apply the trigger signal
    ///
    /// Resume restarts at the slot after the one active before the pause;
    /// time left on the paused item is discarded.
    pub fn set_paused(&mut self, paused: bool, deps: &mut PlaybackDeps<'_>) {
        if self.paused == paused {
            return;
        }
        self.paused = paused;
        self.advance_guard = false;
        info!(
            "Playback at {} {}",
            self.location,
            if paused { "paused" } else { "resumed" }
        );

        if paused {
            self.stop_output(deps);
            self.cancel_countdown(deps);
            self.remaining_ticks = 0;
        } else if self.playing && self.slots.has_playable() {
            self.transition(deps);
        }
    }

    /// Replace the slot collection
    pub fn update_items(&mut self, slots: ItemSlots, deps: &mut PlaybackDeps<'_>) {
        let had_playable = self.slots.has_playable();
        let will_have_playable = slots.has_playable();
        debug!(
            "Updating items at {}: had playable {}, will have playable {}",
            self.location, had_playable, will_have_playable
        );

        self.slots = slots;
        if self.current_index.is_some_and(|index| index >= self.slots.len()) {
            self.current_index = None;
        }

        if had_playable && !will_have_playable {
            info!("No more playable items at {}, stopping", self.location);
            self.stop_output(deps);
            self.cancel_countdown(deps);
            self.playing = false;
            self.clear_current();
            self.advance_guard = false;
        } else if !had_playable && will_have_playable && !self.paused {
            info!("Playable items added at {}, starting", self.location);
            self.playing = true;
            self.transition(deps);
        } else if self.playing && will_have_playable {
            debug!("Items changed at {}, current item continues", self.location);
        }
    }

    /// Countdown period elapsed
    ///
    /// Ignores handles other than the live countdown.
    pub fn on_countdown(&mut self, handle: &TaskHandle, deps: &mut PlaybackDeps<'_>) {
        if self.countdown.as_ref() != Some(handle) || self.paused {
            return;
        }
        self.advance_guard = false;
        self.remaining_ticks = self.remaining_ticks.saturating_sub(self.periods.countdown);
        if self.remaining_ticks > 0 {
            return;
        }

        debug!(
            "{} finished at {}",
            self.current_item.as_deref().unwrap_or("item"),
            self.location
        );
        self.cancel_countdown(deps);
        self.transition(deps);
        if self.is_playing() {
            self.advance_guard = true;
        }
    }

    /// Feedback period elapsed
    pub fn on_feedback(&mut self, handle: &TaskHandle, deps: &mut PlaybackDeps<'_>) {
        if self.feedback.as_ref() != Some(handle) || !self.is_playing() {
            return;
        }
        if let Err(e) = deps.output.emit_feedback(&self.location, FeedbackKind::Note) {
            debug!("Feedback failed at {}: {}", self.location, e);
        }
        if self.remaining_ticks > 0 && self.remaining_ticks % self.periods.remaining_log == 0 {
            info!(
                "{} has {} seconds remaining at {}",
                self.current_item.as_deref().unwrap_or("item"),
                ticks_to_seconds(self.remaining_ticks),
                self.location
            );
        }
    }

    /// True only if an item is active and not paused
    pub fn is_playing(&self) -> bool {
        self.playing && !self.paused && self.current_item.is_some()
    }

    pub fn state(&self) -> PlaybackState {
        if self.paused {
            PlaybackState::Paused
        } else if self.is_playing() {
            PlaybackState::Playing
        } else {
            PlaybackState::Idle
        }
    }

    /// Elapsed/remaining summary for status display
    pub fn playback_info(&self) -> String {
        match (&self.current_item, self.started_at) {
            (Some(kind), Some(started_at)) if self.is_playing() => format!(
                "Playing {} for {} seconds, {} seconds remaining",
                kind,
                time::elapsed_secs(started_at),
                ticks_to_seconds(self.remaining_ticks)
            ),
            _ => "Not playing".to_string(),
        }
    }

    pub fn location(&self) -> &Location {
        &self.location
    }

    pub fn slots(&self) -> &ItemSlots {
        &self.slots
    }

    pub fn current_index(&self) -> Option<usize> {
        self.current_index
    }

    pub fn current_item(&self) -> Option<&str> {
        self.current_item.as_deref()
    }

    pub fn remaining_ticks(&self) -> u64 {
        self.remaining_ticks
    }

    pub fn is_paused(&self) -> bool {
        self.paused
    }

    pub fn has_countdown(&self) -> bool {
        self.countdown.is_some()
    }

    fn go_idle(&mut self) {
        self.playing = false;
        self.clear_current();
    }

    fn clear_current(&mut self) {
        self.current_item = None;
        self.remaining_ticks = 0;
        self.started_at = None;
    }

    fn stop_output(&self, deps: &mut PlaybackDeps<'_>) {
        if let Err(e) = deps.output.stop_all_playback(&self.location) {
            warn!("Failed to stop sound at {}: {}", self.location, e);
        }
    }

    fn cancel_countdown(&mut self, deps: &mut PlaybackDeps<'_>) {
        if let Some(handle) = self.countdown.take() {
            deps.scheduler.cancel(&handle);
        }
    }

    fn cancel_feedback(&mut self, deps: &mut PlaybackDeps<'_>) {
        if let Some(handle) = self.feedback.take() {
            deps.scheduler.cancel(&handle);
        }
    }
}
