//! Conversion of directory FILETIME values into report text

use chrono::{DateTime, Utc};

/// Seconds between 1601-01-01 (FILETIME epoch) and 1970-01-01 (Unix epoch)
const FILETIME_UNIX_DIFF: i64 = 11_644_473_600;

/// FILETIME ticks per second (100-nanosecond intervals)
const TICKS_PER_SECOND: i64 = 10_000_000;

/// Output format for real timestamps, always UTC
pub const TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S UTC";

/// Convert a FILETIME tick count into a UTC instant.
///
/// Returns `None` for the unset sentinel and anything non-positive.
pub fn filetime_to_utc(filetime: i64) -> Option<DateTime<Utc>> {
    if filetime <= 0 {
        return None;
    }

    let seconds_since_1601 = filetime / TICKS_PER_SECOND;
    let nanos = (filetime % TICKS_PER_SECOND) * 100;
    let unix_timestamp = seconds_since_1601 - FILETIME_UNIX_DIFF;

    DateTime::from_timestamp(unix_timestamp, nanos as u32)
}

/// Render a raw `pwdLastSet` value for the report.
///
/// Non-positive values render as `"0"`. Positive values render as a UTC
/// date-time truncated to the second.
pub fn normalize_timestamp(raw: i64) -> String {
    if raw <= 0 {
        return "0".to_string();
    }

    match filetime_to_utc(raw) {
        Some(datetime) => datetime.format(TIMESTAMP_FORMAT).to_string(),
        None => {
            tracing::warn!(raw = raw, "FILETIME value outside representable range");
            raw.to_string()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDateTime;

    fn parse(rendered: &str) -> NaiveDateTime {
        NaiveDateTime::parse_from_str(rendered, TIMESTAMP_FORMAT).expect("rendered timestamp parses")
    }

    #[test]
    fn test_non_positive_values_render_as_zero() {
        for raw in [0, -1, -132_000_000_000_000_000, i64::MIN] {
            assert_eq!(normalize_timestamp(raw), "0");
        }
    }

    #[test]
    fn test_known_filetime() {
        assert_eq!(
            normalize_timestamp(132_000_000_000_000_000),
            "2019-04-17 18:40:00 UTC"
        );
    }

    #[test]
    fn test_unix_epoch() {
        assert_eq!(
            normalize_timestamp(FILETIME_UNIX_DIFF * TICKS_PER_SECOND),
            "1970-01-01 00:00:00 UTC"
        );
    }

    #[test]
    fn test_smallest_positive_value_is_filetime_epoch() {
        assert_eq!(normalize_timestamp(1), "1601-01-01 00:00:00 UTC");
    }

    #[test]
    fn test_max_value_does_not_panic() {
        let rendered = normalize_timestamp(i64::MAX);
        assert!(rendered.ends_with("UTC"));
    }

    #[test]
    fn test_monotonic_and_deterministic() {
        let samples = [
            1,
            10_000_000,
            116_444_736_000_000_000,
            131_999_999_999_999_999,
            132_000_000_000_000_000,
            132_000_000_010_000_000,
            133_500_000_000_000_000,
        ];
        for pair in samples.windows(2) {
            let earlier = parse(&normalize_timestamp(pair[0]));
            let later = parse(&normalize_timestamp(pair[1]));
            assert!(earlier <= later, "{} rendered after {}", pair[0], pair[1]);
        }
        for raw in samples {
            assert_eq!(normalize_timestamp(raw), normalize_timestamp(raw));
        }
    }

    #[test]
    fn test_filetime_to_utc_keeps_sub_second_precision() {
        let datetime = filetime_to_utc(132_000_000_000_000_001).expect("in range");
        assert_eq!(datetime.timestamp_subsec_nanos(), 100);
    }
}
