//! Time and timestamp helpers.

use chrono::{DateTime, Duration, Utc};

/// UTC timestamp used for `last_changed`, `last_updated`, history windows, etc.
pub type Timestamp = DateTime<Utc>;

const MILLIS_PER_HOUR: f64 = 3_600_000.0;

/// Return the current UTC time.
#[must_use]
pub fn now() -> Timestamp {
    Utc::now()
}

/// Convert a (possibly fractional) number of hours into a [`Duration`],
/// rounded to the millisecond. `None` when it does not fit a [`Duration`].
#[must_use]
#[allow(clippy::cast_possible_truncation)]
pub fn hours(value: f64) -> Option<Duration> {
    Duration::try_milliseconds((value * MILLIS_PER_HOUR).round() as i64)
}

/// Start of a window of `window_hours` ending at `end`, clamped to the
/// earliest representable timestamp.
#[must_use]
pub fn hours_before(end: Timestamp, window_hours: f64) -> Timestamp {
    hours(window_hours)
        .and_then(|window| end.checked_sub_signed(window))
        .unwrap_or(DateTime::<Utc>::MIN_UTC)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn should_return_current_utc_time() {
        let before = Utc::now();
        let ts = now();
        let after = Utc::now();
        assert!(ts >= before);
        assert!(ts <= after);
    }

    #[test]
    fn should_convert_fractional_hours() {
        assert_eq!(hours(1.5), Some(Duration::minutes(90)));
        assert_eq!(hours(24.0), Some(Duration::days(1)));
    }

    #[test]
    fn should_compute_window_start() {
        let end = now();
        assert_eq!(hours_before(end, 2.0), end - Duration::hours(2));
    }

    #[test]
    fn should_clamp_window_start_when_window_is_too_large() {
        let end = now();
        assert_eq!(hours_before(end, 1e10), DateTime::<Utc>::MIN_UTC);
        assert_eq!(hours_before(end, 1e300), DateTime::<Utc>::MIN_UTC);
    }
}
