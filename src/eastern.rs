//! US Eastern rendering of instants. All dates in the mapping and enrichment
//! artifacts are reported in America/New_York regardless of source timezone.

use chrono::{DateTime, NaiveDate, Utc};
use chrono_tz::America::New_York;

/// Calendar date of an instant in US Eastern time.
pub fn date(ts: DateTime<Utc>) -> NaiveDate {
    ts.with_timezone(&New_York).date_naive()
}

/// `YYYY-MM-DD` in US Eastern time.
pub fn date_label(ts: DateTime<Utc>) -> String {
    ts.with_timezone(&New_York).format("%Y-%m-%d").to_string()
}

/// `YYYY-MM-DD HH:MM:SS TZ` in US Eastern time.
pub fn datetime_label(ts: DateTime<Utc>) -> String {
    ts.with_timezone(&New_York)
        .format("%Y-%m-%d %H:%M:%S %Z")
        .to_string()
}
