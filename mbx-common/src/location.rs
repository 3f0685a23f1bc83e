//! Block locations
//!
//! A unit is bound to one block in one world. Locations serialize to the
//! compact `world,x,y,z` form used as keys in the unit store.

use crate::{Error, Result};
use std::fmt;
use std::str::FromStr;

/// Block position inside a named world
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Location {
    pub world: String,
    pub x: i32,
    pub y: i32,
    pub z: i32,
}

impl Location {
    pub fn new(world: impl Into<String>, x: i32, y: i32, z: i32) -> Self {
        Self {
            world: world.into(),
            x,
            y,
            z,
        }
    }

    /// Euclidean distance in blocks, or `None` when the worlds differ
    pub fn distance(&self, other: &Location) -> Option<f64> {
        if self.world != other.world {
            return None;
        }
        let dx = f64::from(self.x) - f64::from(other.x);
        let dy = f64::from(self.y) - f64::from(other.y);
        let dz = f64::from(self.z) - f64::from(other.z);
        Some((dx * dx + dy * dy + dz * dz).sqrt())
    }

    /// `x,y,z` without the world name, for player-facing replies
    pub fn block_coords(&self) -> String {
        format!("{},{},{}", self.x, self.y, self.z)
    }
}

impl fmt::Display for Location {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{},{},{},{}", self.world, self.x, self.y, self.z)
    }
}

impl FromStr for Location {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        let parts: Vec<&str> = s.split(',').collect();
        if parts.len() != 4 {
            return Err(Error::InvalidInput(format!(
                "Invalid location string format: {}",
                s
            )));
        }

        let world = parts[0].trim();
        if world.is_empty() {
            return Err(Error::InvalidInput(format!("Missing world name: {}", s)));
        }

        let coord = |raw: &str| {
            raw.trim()
                .parse::<i32>()
                .map_err(|e| Error::InvalidInput(format!("Invalid coordinate '{}': {}", raw, e)))
        };

        Ok(Location::new(world, coord(parts[1])?, coord(parts[2])?, coord(parts[3])?))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_and_display() {
        let loc: Location = "world,10,64,-3".parse().unwrap();
        assert_eq!(loc, Location::new("world", 10, 64, -3));
        assert_eq!(loc.to_string(), "world,10,64,-3");
    }

    #[test]
    fn test_parse_rejects_wrong_arity() {
        assert!("world,1,2".parse::<Location>().is_err());
        assert!("world,1,2,3,4".parse::<Location>().is_err());
    }

    #[test]
    fn test_parse_rejects_bad_coordinate() {
        let err = "world,1,up,3".parse::<Location>().unwrap_err();
        assert!(matches!(err, Error::InvalidInput(_)));
    }

    #[test]
    fn test_parse_rejects_empty_world() {
        assert!(",1,2,3".parse::<Location>().is_err());
    }

    #[test]
    fn test_distance_same_world() {
        let a = Location::new("world", 0, 0, 0);
        let b = Location::new("world", 3, 4, 0);
        assert_eq!(a.distance(&b), Some(5.0));
    }

    #[test]
    fn test_distance_other_world() {
        let a = Location::new("world", 0, 0, 0);
        let b = Location::new("world_nether", 0, 0, 0);
        assert_eq!(a.distance(&b), None);
    }

    #[test]
    fn test_distance_extreme_coordinates() {
        let far = Location::new("world", i32::MAX, 64, 0);
        let near_origin = Location::new("world", -1, 64, 0);
        assert_eq!(far.distance(&near_origin), Some(f64::from(i32::MAX) + 1.0));

        let low = Location::new("world", 0, i32::MIN, 0);
        let origin = Location::new("world", 0, 0, 0);
        assert_eq!(low.distance(&origin), Some(2147483648.0));
        assert!(low.distance(&Location::new("world", 0, i32::MAX, 0)).is_some());
    }

    #[test]
    fn test_block_coords() {
        assert_eq!(Location::new("w", 1, 2, 3).block_coords(), "1,2,3");
    }
}
