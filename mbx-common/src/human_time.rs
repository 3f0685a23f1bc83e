//! Human-readable time formatting
//!
//! Provides consistent time display formatting for status replies and the
//! duration listing.

/// Format whole seconds as `M:SS`.
///
/// Minutes are not wrapped into hours; a 75 minute duration renders as
/// `75:00`. Negative values keep their sign.
///
/// # Examples
///
/// ```
/// use mbx_common::human_time::format_minutes_seconds;
///
/// assert_eq!(format_minutes_seconds(185), "3:05");
/// assert_eq!(format_minutes_seconds(59), "0:59");
/// assert_eq!(format_minutes_seconds(4500), "75:00");
/// ```
pub fn format_minutes_seconds(seconds: i64) -> String {
    let sign = if seconds < 0 { "-" } else { "" };
    let abs_seconds = seconds.abs();
    format!("{}{}:{:02}", sign, abs_seconds / 60, abs_seconds % 60)
}

/// Parse a duration given either as plain seconds (`185`) or as `M:SS`
/// (`3:05`).
///
/// Returns `None` for malformed input or when the seconds field of `M:SS`
/// is 60 or more.
pub fn parse_duration_secs(input: &str) -> Option<i64> {
    let input = input.trim();
    match input.split_once(':') {
        None => input.parse::<i64>().ok(),
        Some((minutes, seconds)) => {
            let minutes = minutes.parse::<i64>().ok()?;
            let seconds = seconds.parse::<i64>().ok()?;
            if !(0..60).contains(&seconds) || minutes < 0 || seconds_len(input) != 2 {
                return None;
            }
            minutes.checked_mul(60)?.checked_add(seconds)
        }
    }
}

fn seconds_len(input: &str) -> usize {
    input.rsplit(':').next().map(str::len).unwrap_or(0)
}
