//! Update timestamps written into summary sections.
//!
//! Timestamps are local wall-clock minutes (`2024-01-15 14:30`). The section
//! engine treats them as opaque strings; only the CLI validates user input.

use chrono::{Local, NaiveDateTime};

/// `strftime` pattern for section timestamps.
pub const TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M";

/// The current local time as a section timestamp.
pub fn current_timestamp() -> String {
    Local::now().format(TIMESTAMP_FORMAT).to_string()
}

/// Whether `value` is formatted as [`TIMESTAMP_FORMAT`].
pub fn is_valid_timestamp(value: &str) -> bool {
    NaiveDateTime::parse_from_str(value, TIMESTAMP_FORMAT).is_ok()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn current_timestamp_round_trips_through_format() {
        let now = current_timestamp();
        assert_eq!(now.len(), "2024-01-15 14:30".len());
        assert!(is_valid_timestamp(&now));
    }

    #[test]
    fn rejects_other_shapes() {
        assert!(is_valid_timestamp("2024-01-15 14:30"));
        assert!(!is_valid_timestamp("2024-01-15"));
        assert!(!is_valid_timestamp("2024-13-01 10:00"));
        assert!(!is_valid_timestamp("2024-01-15T14:30"));
        assert!(!is_valid_timestamp(""));
    }
}
