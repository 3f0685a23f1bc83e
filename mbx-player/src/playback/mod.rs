//! Playback engine and item slots

pub mod engine;
pub mod slots;

pub use engine::{PlaybackDeps, PlaybackEngine, PlaybackState};
pub use slots::{Item, ItemSlots};
