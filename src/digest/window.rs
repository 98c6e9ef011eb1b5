//! Lookback window selection.

use chrono::{DateTime, Duration, TimeZone, Utc};

/// Format used for the digest's date label, e.g. `Mar 10, 2024`.
pub const DATE_LABEL_FORMAT: &str = "%b %d, %Y";

/// Inclusive lower bound of the lookback window, in UTC.
///
/// Subtracts on the absolute instant, never on local wall-clock time, so a
/// window spanning a DST change is still exactly `lookback_hours` long.
/// Clamps to the earliest representable instant instead of overflowing.
pub fn window_start<Tz: TimeZone>(now_local: &DateTime<Tz>, lookback_hours: u32) -> DateTime<Utc> {
    now_local
        .with_timezone(&Utc)
        .checked_sub_signed(Duration::hours(i64::from(lookback_hours)))
        .unwrap_or(DateTime::<Utc>::MIN_UTC)
}

/// Date label shown in the digest heading, taken from the local "now".
pub fn date_label<Tz: TimeZone>(now_local: &DateTime<Tz>) -> String
where
    Tz::Offset: std::fmt::Display,
{
    now_local.format(DATE_LABEL_FORMAT).to_string()
}
