//! World events
//!
//! Text form of what the host world reports about units:
//!
//! ```text
//! place  <world,x,y,z>
//! insert <world,x,y,z> <ITEM_TYPE>
//! edit   <world,x,y,z> <ITEM_TYPE|->...
//! signal <world,x,y,z> <power 0-15>
//! skip   <world,x,y,z>
//! break  <world,x,y,z>
//! ```

use crate::error::{Error, Result};
use crate::playback::{Item, ItemSlots};
use mbx_common::Location;

/// Marker for an empty slot in `edit`
const EMPTY_SLOT: &str = "-";

/// Something that happened to a unit in the world
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum WorldEvent {
    Place(Location),
    Insert(Location, Item),
    Edit(Location, ItemSlots),
    Signal(Location, u8),
    Skip(Location),
    Break(Location),
}

impl WorldEvent {
    /// Parse whitespace-separated tokens; `None` if the verb is not a world
    /// event
    pub fn parse(tokens: &[&str]) -> Option<Result<Self>> {
        let (verb, args) = tokens.split_first()?;
        let verb = verb.to_ascii_lowercase();
        if !matches!(
            verb.as_str(),
            "place" | "insert" | "edit" | "signal" | "skip" | "break"
        ) {
            return None;
        }
        Some(Self::parse_args(&verb, args))
    }

    fn parse_args(verb: &str, args: &[&str]) -> Result<Self> {
        let (location, rest) = match args.split_first() {
            Some((loc, rest)) => (loc.parse::<Location>()?, rest),
            None => return Err(Error::InvalidInput(format!("Usage: {} <world,x,y,z> ...", verb))),
        };

        match verb {
            "place" => Ok(WorldEvent::Place(location)),
            "skip" => Ok(WorldEvent::Skip(location)),
            "break" => Ok(WorldEvent::Break(location)),
            "insert" => match rest.first() {
                Some(kind) => Ok(WorldEvent::Insert(location, Item::new(kind.to_ascii_uppercase()))),
                None => Err(Error::InvalidInput("Usage: insert <world,x,y,z> <ITEM_TYPE>".to_string())),
            },
            "edit" => {
                let slots = rest
                    .iter()
                    .map(|token| (*token != EMPTY_SLOT).then(|| Item::new(token.to_ascii_uppercase())))
                    .collect::<Vec<_>>();
                Ok(WorldEvent::Edit(location, ItemSlots::new(slots)))
            }
            "signal" => {
                let power = rest
                    .first()
                    .and_then(|p| p.parse::<u8>().ok())
                    .filter(|p| *p <= 15)
                    .ok_or_else(|| {
                        Error::InvalidInput("Usage: signal <world,x,y,z> <0-15>".to_string())
                    })?;
                Ok(WorldEvent::Signal(location, power))
            }
            _ => Err(Error::InvalidInput(format!("Unknown event: {}", verb))),
        }
    }

    pub fn location(&self) -> &Location {
        match self {
            WorldEvent::Place(loc)
            | WorldEvent::Insert(loc, _)
            | WorldEvent::Edit(loc, _)
            | WorldEvent::Signal(loc, _)
            | WorldEvent::Skip(loc)
            | WorldEvent::Break(loc) => loc,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(line: &str) -> Option<Result<WorldEvent>> {
        let tokens: Vec<&str> = line.split_whitespace().collect();
        WorldEvent::parse(&tokens)
    }

    fn loc() -> Location {
        Location::new("world", 10, 64, -5)
    }

    #[test]
    fn test_parse_events() {
        assert_eq!(parse("place world,10,64,-5").unwrap().unwrap(), WorldEvent::Place(loc()));
        assert_eq!(
            parse("insert world,10,64,-5 music_disc_cat").unwrap().unwrap(),
            WorldEvent::Insert(loc(), Item::new("MUSIC_DISC_CAT"))
        );
        assert_eq!(
            parse("signal world,10,64,-5 15").unwrap().unwrap(),
            WorldEvent::Signal(loc(), 15)
        );
        assert_eq!(parse("BREAK world,10,64,-5").unwrap().unwrap().location(), &loc());
    }

    #[test]
    fn test_parse_edit_slots() {
        let event = parse("edit world,10,64,-5 MUSIC_DISC_CAT - MUSIC_DISC_FAR").unwrap().unwrap();
        let WorldEvent::Edit(_, slots) = event else {
            panic!("expected edit");
        };
        assert_eq!(slots.len(), 3);
        assert!(slots.get(1).is_none());
        assert_eq!(slots.next_playable(Some(0)), Some(2));
    }

    #[test]
    fn test_parse_errors() {
        assert!(parse("insert world,10,64,-5").unwrap().is_err());
        assert!(parse("signal world,10,64,-5 99").unwrap().is_err());
        assert!(parse("place 10,64,-5").unwrap().is_err());
        assert!(parse("skip").unwrap().is_err());
        assert!(parse("reload").is_none());
    }
}
