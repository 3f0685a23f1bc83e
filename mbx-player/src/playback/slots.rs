//! Item slot collection
//!
//! Ordered, fixed-capacity sequence of optional items. Edits replace the
//! collection wholesale; the engine never mutates it in place.

use serde::{Deserialize, Serialize};

/// Substring that marks a playable item type
const PLAYABLE_MARKER: &str = "music_disc";

/// An item held in a slot
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Item {
    /// Item-type identifier (e.g. `MUSIC_DISC_CAT`)
    pub kind: String,
}

impl Item {
    pub fn new(kind: impl Into<String>) -> Self {
        Self { kind: kind.into() }
    }

    /// True if the engine may play this item
    pub fn is_playable(&self) -> bool {
        self.kind.to_ascii_lowercase().contains(PLAYABLE_MARKER)
    }
}

/// Ordered slots, each empty or holding one item
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ItemSlots(Vec<Option<Item>>);

impl ItemSlots {
    pub fn new(slots: Vec<Option<Item>>) -> Self {
        Self(slots)
    }

    /// All-empty collection of `capacity` slots
    pub fn with_capacity(capacity: usize) -> Self {
        Self(vec![None; capacity])
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn get(&self, index: usize) -> Option<&Item> {
        self.0.get(index).and_then(Option::as_ref)
    }

    pub fn iter(&self) -> impl Iterator<Item = Option<&Item>> {
        self.0.iter().map(Option::as_ref)
    }

    /// Items in slot order, skipping empty slots
    pub fn items(&self) -> impl Iterator<Item = &Item> {
        self.0.iter().flatten()
    }

    pub fn has_playable(&self) -> bool {
        self.items().any(Item::is_playable)
    }

    pub fn playable_count(&self) -> usize {
        self.items().filter(|item| item.is_playable()).count()
    }

    pub fn first_empty(&self) -> Option<usize> {
        self.0.iter().position(Option::is_none)
    }

    /// Put `item` into the first empty slot; returns the slot index
    pub fn insert(&mut self, item: Item) -> Option<usize> {
        let index = self.first_empty()?;
        self.0[index] = Some(item);
        Some(index)
    }

    /// Next playable slot after `current`
    ///
    /// Starts at `(current + 1) mod N` (or 0 with no current slot) and scans at
    /// most N slots, wrapping once.
    pub fn next_playable(&self, current: Option<usize>) -> Option<usize> {
        let len = self.0.len();
        if len == 0 {
            return None;
        }
        let start = current.map_or(0, |c| (c + 1) % len);
        (0..len)
            .map(|step| (start + step) % len)
            .find(|&index| self.get(index).is_some_and(Item::is_playable))
    }
}

impl From<Vec<Option<Item>>> for ItemSlots {
    fn from(slots: Vec<Option<Item>>) -> Self {
        Self(slots)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn slots(kinds: &[Option<&str>]) -> ItemSlots {
        ItemSlots::new(kinds.iter().map(|k| k.map(Item::new)).collect())
    }

    #[test]
    fn test_playable_predicate() {
        assert!(Item::new("MUSIC_DISC_CAT").is_playable());
        assert!(Item::new("music_disc_custom").is_playable());
        assert!(!Item::new("DIAMOND").is_playable());
    }

    #[test]
    fn test_next_playable_skips_empty_and_invalid() {
        let s = slots(&[Some("MUSIC_DISC_CAT"), None, Some("DIRT"), Some("MUSIC_DISC_FAR")]);
        assert_eq!(s.next_playable(None), Some(0));
        assert_eq!(s.next_playable(Some(0)), Some(3));
        assert_eq!(s.next_playable(Some(3)), Some(0));
    }

    #[test]
    fn test_next_playable_single_item_reselects() {
        let s = slots(&[None, Some("MUSIC_DISC_WAIT"), None]);
        assert_eq!(s.next_playable(Some(1)), Some(1));
    }

    #[test]
    fn test_next_playable_none_valid() {
        assert_eq!(slots(&[None, Some("STONE")]).next_playable(None), None);
        assert_eq!(ItemSlots::default().next_playable(Some(4)), None);
    }

    #[test]
    fn test_next_playable_out_of_range_current_wraps() {
        let s = slots(&[Some("MUSIC_DISC_CAT"), Some("MUSIC_DISC_FAR")]);
        // (5 + 1) % 2 == 0
        assert_eq!(s.next_playable(Some(5)), Some(0));
    }

    #[test]
    fn test_insert_fills_first_empty() {
        let mut s = ItemSlots::with_capacity(3);
        assert_eq!(s.insert(Item::new("MUSIC_DISC_CAT")), Some(0));
        assert_eq!(s.insert(Item::new("MUSIC_DISC_FAR")), Some(1));
        assert_eq!(s.first_empty(), Some(2));
        assert_eq!(s.playable_count(), 2);

        let mut full = slots(&[Some("MUSIC_DISC_CAT")]);
        assert_eq!(full.insert(Item::new("MUSIC_DISC_FAR")), None);
    }

    #[test]
    fn test_json_shape() {
        let s = slots(&[Some("MUSIC_DISC_CAT"), None]);
        let json = serde_json::to_string(&s).unwrap();
        assert_eq!(json, r#"[{"kind":"MUSIC_DISC_CAT"},null]"#);
        let back: ItemSlots = serde_json::from_str(&json).unwrap();
        assert_eq!(back, s);
    }
}
