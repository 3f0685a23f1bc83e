//! # MultiBox Common Library
//!
//! Shared code for the MultiBox playback service including:
//! - Common error type
//! - Bootstrap configuration loading and data folder resolution
//! - Tick/second conversions
//! - Human-readable time formatting
//! - Block locations

pub mod config;
pub mod error;
pub mod human_time;
pub mod location;
pub mod time;
pub mod timing;

pub use error::{Error, Result};
pub use location::Location;
