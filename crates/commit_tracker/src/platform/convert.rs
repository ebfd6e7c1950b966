//! Field normalization shared by all fetchers.

use chrono::{DateTime, Utc};

/// Author used when the API does not report one.
pub const UNKNOWN_AUTHOR: &str = "Unknown";

/// Message prefix for release records.
pub const RELEASE_PREFIX: &str = "RELEASE: ";

/// Message prefix for tag records.
pub const TAG_PREFIX: &str = "TAG: ";

/// First line of a commit message, without a trailing carriage return.
pub fn first_line(message: &str) -> String {
    message
        .split('\n')
        .next()
        .unwrap_or_default()
        .trim_end_matches('\r')
        .to_string()
}

/// Normalize an API timestamp to `YYYY-MM-DDTHH:MM:SSZ`.
///
/// Unparseable values are passed through unchanged; a missing value
/// becomes an empty string.
pub fn normalize_date(raw: Option<&str>) -> String {
    let Some(raw) = raw.map(str::trim).filter(|s| !s.is_empty()) else {
        return String::new();
    };

    match DateTime::parse_from_rfc3339(raw) {
        Ok(dt) => dt
            .with_timezone(&Utc)
            .format("%Y-%m-%dT%H:%M:%SZ")
            .to_string(),
        Err(_) => raw.to_string(),
    }
}

/// Trimmed author name, or [`UNKNOWN_AUTHOR`].
pub fn author_or_unknown(name: Option<&str>) -> String {
    name.map(str::trim)
        .filter(|s| !s.is_empty())
        .unwrap_or(UNKNOWN_AUTHOR)
        .to_string()
}
