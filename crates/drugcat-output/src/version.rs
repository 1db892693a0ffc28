use chrono::{DateTime, SecondsFormat, Utc};

pub const VERSION_FILE: &str = "version.txt";

/// ISO-8601 UTC timestamp written to the version marker.
pub fn version_stamp(completed_at: DateTime<Utc>) -> String {
    completed_at.to_rfc3339_opts(SecondsFormat::Secs, true)
}
