//! Duration text handling.
//!
//! Durations are carried as display strings (`m:ss`, `mm:ss`, or `h:mm:ss`),
//! matching what the catalog stores and the player UI shows.

use regex::Regex;
use std::sync::LazyLock;

static DURATION_PATTERN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^(\d{1,2}):([0-5]\d)(?::([0-5]\d))?$").expect("valid pattern"));

/// True when `value` matches the accepted duration format.
pub fn is_valid_duration(value: &str) -> bool {
    DURATION_PATTERN.is_match(value)
}

/// Format a duration in seconds as `m:ss` below one hour, `h:mm:ss` above.
/// Non-finite or negative inputs degrade to `"0:00"`.
pub fn format_duration(seconds: f64) -> String {
    if !seconds.is_finite() || seconds <= 0.0 {
        return "0:00".to_string();
    }

    let total = seconds.floor() as u64;
    let hrs = total / 3600;
    let mins = (total % 3600) / 60;
    let secs = total % 60;

    if hrs > 0 {
        format!("{}:{:02}:{:02}", hrs, mins, secs)
    } else {
        format!("{}:{:02}", mins, secs)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn format_duration_under_one_hour() {
        assert_eq!(format_duration(0.0), "0:00");
        assert_eq!(format_duration(5.0), "0:05");
        assert_eq!(format_duration(75.0), "1:15");
        assert_eq!(format_duration(90.0), "1:30");
        assert_eq!(format_duration(3599.0), "59:59");
    }

    #[test]
    fn format_duration_one_hour_and_up() {
        assert_eq!(format_duration(3600.0), "1:00:00");
        assert_eq!(format_duration(3661.0), "1:01:01");
        assert_eq!(format_duration(3725.0), "1:02:05");
    }

    #[test]
    fn format_duration_degrades_on_bad_input() {
        assert_eq!(format_duration(f64::NAN), "0:00");
        assert_eq!(format_duration(f64::INFINITY), "0:00");
        assert_eq!(format_duration(-10.0), "0:00");
    }

    #[test]
    fn format_duration_truncates_fractional_seconds() {
        assert_eq!(format_duration(75.9), "1:15");
    }

    #[test]
    fn valid_duration_accepts_both_shapes() {
        assert!(is_valid_duration("0:00"));
        assert!(is_valid_duration("1:15"));
        assert!(is_valid_duration("59:59"));
        assert!(is_valid_duration("1:01:01"));
        assert!(is_valid_duration("12:00:00"));
    }

    #[test]
    fn valid_duration_rejects_malformed_values() {
        assert!(!is_valid_duration(""));
        assert!(!is_valid_duration("90"));
        assert!(!is_valid_duration("1:5"));
        assert!(!is_valid_duration("1:60"));
        assert!(!is_valid_duration("1:00:60"));
        assert!(!is_valid_duration("111:00"));
        assert!(!is_valid_duration("abc"));
    }

    // Formatting then validating always round-trips for extractor output.
    #[test]
    fn formatted_durations_always_validate() {
        for secs in [0u64, 1, 59, 60, 61, 599, 600, 3599, 3600, 3661, 86399] {
            let formatted = format_duration(secs as f64);
            assert!(
                is_valid_duration(&formatted),
                "{}s formatted as {:?} failed validation",
                secs,
                formatted
            );
        }
    }
}
