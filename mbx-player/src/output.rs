//! Output capability
//!
//! Audible/visual effects of a unit. The engine only decides when to start
//! and stop an item; how sound is emitted belongs to the host.
//!
//! Failures are reported as [`OutputError`] and logged by the caller. They
//! never change playback state.

use mbx_common::Location;
use std::fmt;
use thiserror::Error;
use tracing::{debug, info};

/// Output capability errors
#[derive(Debug, Error)]
pub enum OutputError {
    /// No listener/world is available at the location
    #[error("Output unavailable: {0}")]
    Unavailable(String),

    /// The sink rejected the request
    #[error("Output error: {0}")]
    Failed(String),
}

/// Kind of best-effort cue emitted at a unit
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FeedbackKind {
    /// Periodic note while playing
    Note,
    /// An item was inserted
    Inserted,
}

impl fmt::Display for FeedbackKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FeedbackKind::Note => write!(f, "note"),
            FeedbackKind::Inserted => write!(f, "inserted"),
        }
    }
}

/// Play/stop sound and emit feedback at a location
pub trait Output {
    fn begin_playback(&mut self, location: &Location, item_type: &str) -> Result<(), OutputError>;

    fn stop_all_playback(&mut self, location: &Location) -> Result<(), OutputError>;

    fn emit_feedback(&mut self, location: &Location, kind: FeedbackKind)
        -> Result<(), OutputError>;
}

/// Output that reports effects through tracing
///
/// Used by the binary, where no real sound sink exists.
#[derive(Debug, Default)]
pub struct LogOutput;

impl Output for LogOutput {
    fn begin_playback(&mut self, location: &Location, item_type: &str) -> Result<(), OutputError> {
        info!("Playing {} at {}", item_type, location);
        Ok(())
    }

    fn stop_all_playback(&mut self, location: &Location) -> Result<(), OutputError> {
        debug!("Stopping all sound at {}", location);
        Ok(())
    }

    fn emit_feedback(
        &mut self,
        location: &Location,
        kind: FeedbackKind,
    ) -> Result<(), OutputError> {
        debug!("Feedback {} at {}", kind, location);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_log_output_never_fails() {
        let loc = Location::new("world", 1, 2, 3);
        let mut out = LogOutput;
        assert!(out.begin_playback(&loc, "MUSIC_DISC_CAT").is_ok());
        assert!(out.emit_feedback(&loc, FeedbackKind::Note).is_ok());
        assert!(out.stop_all_playback(&loc).is_ok());
    }

    #[test]
    fn test_error_display() {
        let err = OutputError::Unavailable("world not loaded".to_string());
        assert_eq!(err.to_string(), "Output unavailable: world not loaded");
    }
}
