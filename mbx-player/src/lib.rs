//! # MultiBox Player Library (mbx-player)
//!
//! Location-bound playback units that cycle through their items one at a
//! time, advancing when each item's duration elapses.
//!
//! **Purpose:** Keep one playback engine per unit, look up item durations,
//! and drive everything from a single-threaded tick scheduler.
//!
//! **Architecture:** The [`host::Host`] owns the [`scheduler::TickScheduler`],
//! an [`output::Output`] sink, the shared [`durations::DurationRegistry`] and
//! the [`units::UnitRegistry`]. Engines never hold references to any of these;
//! each operation receives them through [`playback::PlaybackDeps`].

pub mod admin;
pub mod config;
pub mod durations;
pub mod error;
pub mod events;
pub mod host;
pub mod output;
pub mod playback;
pub mod scheduler;
pub mod store;
pub mod units;

pub use error::{Error, Result};
pub use host::Host;
