//! Timestamp utilities

use chrono::{DateTime, Utc};

/// Get current UTC timestamp
pub fn now() -> DateTime<Utc> {
    Utc::now()
}

/// Whole seconds elapsed since `since`, clamped at zero
pub fn elapsed_secs(since: DateTime<Utc>) -> i64 {
    (now() - since).num_seconds().max(0)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    #[test]
    fn test_now_returns_valid_timestamp() {
        let timestamp = now();
        // Should be a reasonable timestamp (after year 2000)
        assert!(timestamp.timestamp() > 946_684_800);
    }

    #[test]
    fn test_elapsed_secs_past() {
        let earlier = now() - Duration::seconds(30);
        let elapsed = elapsed_secs(earlier);
        assert!((30..=31).contains(&elapsed));
    }

    #[test]
    fn test_elapsed_secs_future_is_zero() {
        let later = now() + Duration::seconds(30);
        assert_eq!(elapsed_secs(later), 0);
    }
}
