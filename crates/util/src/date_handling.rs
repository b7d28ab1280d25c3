//! # Date Handling Utilities
//!
//! Formatting for the "last updated" timestamp shown next to the table.

use chrono::{DateTime, Local, TimeZone, Utc};

/// Formats a fetch timestamp as a wall-clock time in the local time zone.
pub fn format_last_updated(fetched_at: DateTime<Utc>) -> String {
    format_clock_time(fetched_at, &Local)
}

/// Formats `instant` as `HH:MM:SS` in the given time zone.
///
/// # Example
/// ```rust
/// use chrono::{TimeZone, Utc};
/// use resttable_util::date_handling::format_clock_time;
///
/// let instant = Utc.with_ymd_and_hms(2024, 3, 9, 17, 4, 5).unwrap();
/// assert_eq!(format_clock_time(instant, &Utc), "17:04:05");
/// ```
pub fn format_clock_time<Tz: TimeZone>(instant: DateTime<Utc>, zone: &Tz) -> String
where
    Tz::Offset: std::fmt::Display,
{
    instant.with_timezone(zone).format("%H:%M:%S").to_string()
}

/// Describes how long ago `fetched_at` was, relative to `now`.
///
/// Used by the non-interactive `watch` output where a wall-clock time alone
/// is harder to scan.
pub fn format_age(fetched_at: DateTime<Utc>, now: DateTime<Utc>) -> String {
    let seconds = (now - fetched_at).num_seconds().max(0);
    match seconds {
        0..=4 => "just now".to_string(),
        5..=59 => format!("{seconds}s ago"),
        60..=3599 => format!("{}m ago", seconds / 60),
        _ => format!("{}h ago", seconds / 3600),
    }
}
