//! Mapping of the content store's regional-settings label to an IANA zone,
//! and age computation in that reference zone.

use chrono::{DateTime, TimeZone, Utc};
use chrono_tz::Tz;

use crate::error::ReconcileError;

/// Regional-settings descriptions we know how to map.
pub const KNOWN_ZONES: &[(&str, Tz)] = &[
    (
        "(UTC-08:00) Pacific Time (US and Canada)",
        chrono_tz::America::Los_Angeles,
    ),
    (
        "(UTC-05:00) Eastern Time (US and Canada)",
        chrono_tz::America::New_York,
    ),
];

/// Resolve a regional-settings description to a zone.
///
/// Unmapped descriptions are an error, never a default zone.
pub fn resolve_zone(description: &str) -> Result<Tz, ReconcileError> {
    KNOWN_ZONES
        .iter()
        .find(|(label, _)| *label == description)
        .map(|(_, tz)| *tz)
        .ok_or_else(|| ReconcileError::UnknownTimeZone(description.to_string()))
}

pub fn normalize(timestamp: DateTime<Utc>, zone: Tz) -> DateTime<Tz> {
    zone.from_utc_datetime(&timestamp.naive_utc())
}

/// Fractional hours from `timestamp` until `now`. Negative if the item
/// was modified after `now` (clock skew on the store side).
pub fn elapsed_hours(now: DateTime<Tz>, timestamp: DateTime<Tz>) -> f64 {
    let delta = now.signed_duration_since(timestamp);
    delta.num_milliseconds() as f64 / 3_600_000.0
}

/// Format used for every timestamp shown in reports.
pub fn display(ts: &DateTime<Tz>) -> String {
    ts.format("%Y-%m-%d %H:%M").to_string()
}
