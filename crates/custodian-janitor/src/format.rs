//! Human-readable rendering of durations for health messages

use std::time::Duration;

const UNITS: [(&str, u128); 5] = [
    ("day", 86_400_000),
    ("hour", 3_600_000),
    ("minute", 60_000),
    ("second", 1_000),
    ("millisecond", 1),
];

/// Render `duration` in the largest unit that represents it exactly
///
/// `1h` renders as `"1 hour"`, `90m` as `"90 minutes"`, `1500ms` as
/// `"1500 milliseconds"`. Sub-millisecond remainders are ignored and zero
/// renders as `"0 seconds"`.
pub fn human_duration(duration: Duration) -> String {
    let millis = duration.as_millis();
    if millis == 0 {
        return "0 seconds".to_string();
    }

    for (unit, size) in UNITS {
        if millis % size == 0 {
            return pluralize(millis / size, unit);
        }
    }

    pluralize(millis, "millisecond")
}

fn pluralize(count: u128, unit: &str) -> String {
    if count == 1 {
        format!("1 {}", unit)
    } else {
        format!("{} {}s", count, unit)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_singular_units() {
        assert_eq!(human_duration(Duration::from_secs(86_400)), "1 day");
        assert_eq!(human_duration(Duration::from_secs(3_600)), "1 hour");
        assert_eq!(human_duration(Duration::from_secs(60)), "1 minute");
        assert_eq!(human_duration(Duration::from_secs(1)), "1 second");
        assert_eq!(human_duration(Duration::from_millis(1)), "1 millisecond");
    }

    #[test]
    fn test_plural_units() {
        assert_eq!(human_duration(Duration::from_secs(2 * 3_600)), "2 hours");
        assert_eq!(human_duration(Duration::from_secs(90 * 60)), "90 minutes");
        assert_eq!(human_duration(Duration::from_secs(45)), "45 seconds");
        assert_eq!(human_duration(Duration::from_millis(1_500)), "1500 milliseconds");
        assert_eq!(human_duration(Duration::from_secs(3 * 86_400)), "3 days");
    }

    #[test]
    fn test_zero() {
        assert_eq!(human_duration(Duration::ZERO), "0 seconds");
        assert_eq!(human_duration(Duration::from_nanos(10)), "0 seconds");
    }
}
