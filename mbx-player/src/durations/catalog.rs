//! Built-in item types and their durations

/// Prefix shared by every playable item type identifier
pub const KIND_PREFIX: &str = "MUSIC_DISC_";

/// Built-in durations in seconds
pub const DEFAULT_DURATIONS: &[(&str, u32)] = &[
    ("MUSIC_DISC_13", 178),
    ("MUSIC_DISC_CAT", 185),
    ("MUSIC_DISC_BLOCKS", 345),
    ("MUSIC_DISC_CHIRP", 185),
    ("MUSIC_DISC_FAR", 174),
    ("MUSIC_DISC_MALL", 197),
    ("MUSIC_DISC_MELLOHI", 96),
    ("MUSIC_DISC_STAL", 150),
    ("MUSIC_DISC_STRAD", 188),
    ("MUSIC_DISC_WARD", 251),
    ("MUSIC_DISC_11", 71),
    ("MUSIC_DISC_WAIT", 238),
    ("MUSIC_DISC_OTHERSIDE", 195),
    ("MUSIC_DISC_5", 178),
    ("MUSIC_DISC_PIGSTEP", 148),
    ("MUSIC_DISC_RELIC", 215),
];

/// Whether `kind` is one of the built-in item types
pub fn is_known(kind: &str) -> bool {
    DEFAULT_DURATIONS
        .iter()
        .any(|(name, _)| name.eq_ignore_ascii_case(kind))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_catalog_size_and_positive() {
        assert_eq!(DEFAULT_DURATIONS.len(), 16);
        assert!(DEFAULT_DURATIONS.iter().all(|(_, secs)| *secs > 0));
        assert!(DEFAULT_DURATIONS.iter().all(|(name, _)| name.starts_with(KIND_PREFIX)));
    }

    #[test]
    fn test_is_known_case_insensitive() {
        assert!(is_known("MUSIC_DISC_CAT"));
        assert!(is_known("music_disc_cat"));
        assert!(!is_known("MUSIC_DISC_CUSTOM"));
    }

    #[test]
    fn test_catalog_values() {
        assert!(DEFAULT_DURATIONS.contains(&("MUSIC_DISC_BLOCKS", 345)));
        assert!(DEFAULT_DURATIONS.contains(&("MUSIC_DISC_11", 71)));
    }
}
