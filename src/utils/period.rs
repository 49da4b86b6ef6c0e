use chrono::{DateTime, Datelike, Duration, Utc};

pub const SECONDS_IN_DAY: i64 = 60 * 60 * 24;
pub const SECONDS_IN_WEEK: i64 = SECONDS_IN_DAY * 7;
pub const SECONDS_IN_YEAR: i64 = SECONDS_IN_DAY * 365;

/// Days counted from Sunday = 0.
const THURSDAY: u32 = 4;

/// Map a UNIX timestamp to the end of its weekly accounting period.
///
/// Periods end every Thursday at 00:00 UTC, so every event between two
/// Thursdays lands on the earlier one.
pub fn normalize_to_period_end(timestamp: i64) -> Option<i64> {
    let date = DateTime::<Utc>::from_timestamp(timestamp, 0)?.date_naive();
    let weekday = date.weekday().num_days_from_sunday();
    let days_since_period_end = (weekday + 7 - THURSDAY) % 7;

    let period_end = date - Duration::days(days_since_period_end as i64);
    Some(period_end.and_hms_opt(0, 0, 0)?.and_utc().timestamp())
}

/// First weekly boundary at or after `now`.
///
/// The UNIX epoch fell on a Thursday, so boundaries are multiples of a week.
pub fn next_period_end(now: i64) -> i64 {
    (now + SECONDS_IN_WEEK - 1).div_euclid(SECONDS_IN_WEEK) * SECONDS_IN_WEEK
}

/// Seconds accrued in the current period, in `(0, SECONDS_IN_WEEK]`.
pub fn time_passed_in_period(now: i64) -> i64 {
    now - (next_period_end(now) - SECONDS_IN_WEEK)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Weekday};

    // Thursday 2024-01-04 00:00:00 UTC
    const THURSDAY_MIDNIGHT: i64 = 1_704_326_400;

    #[test]
    fn test_boundary_is_thursday() {
        let dt = Utc.timestamp_opt(THURSDAY_MIDNIGHT, 0).unwrap();
        assert_eq!(dt.weekday(), Weekday::Thu);
        assert_eq!(THURSDAY_MIDNIGHT % SECONDS_IN_WEEK, 0);
    }

    #[test]
    fn test_same_window_maps_to_same_period_end() {
        let window: Vec<i64> = (0..SECONDS_IN_WEEK)
            .step_by(3_607)
            .map(|offset| THURSDAY_MIDNIGHT + offset)
            .collect();

        for ts in window {
            assert_eq!(normalize_to_period_end(ts), Some(THURSDAY_MIDNIGHT), "ts {}", ts);
        }
    }

    #[test]
    fn test_normalization_is_idempotent() {
        let ts = THURSDAY_MIDNIGHT + 3 * SECONDS_IN_DAY + 42;
        let once = normalize_to_period_end(ts).unwrap();
        assert_eq!(normalize_to_period_end(once), Some(once));
    }

    #[test]
    fn test_wednesday_night_belongs_to_previous_period() {
        let ts = THURSDAY_MIDNIGHT - 1;
        assert_eq!(
            normalize_to_period_end(ts),
            Some(THURSDAY_MIDNIGHT - SECONDS_IN_WEEK)
        );
    }

    #[test]
    fn test_matches_epoch_aligned_weeks() {
        for ts in [0i64, 86_399, 1_000_000_000, 1_717_171_717, 1_750_000_000] {
            let expected = ts.div_euclid(SECONDS_IN_WEEK) * SECONDS_IN_WEEK;
            assert_eq!(normalize_to_period_end(ts), Some(expected));
        }
    }

    #[test]
    fn test_next_period_end() {
        assert_eq!(next_period_end(THURSDAY_MIDNIGHT), THURSDAY_MIDNIGHT);
        assert_eq!(
            next_period_end(THURSDAY_MIDNIGHT + 1),
            THURSDAY_MIDNIGHT + SECONDS_IN_WEEK
        );
    }

    #[test]
    fn test_time_passed_in_period() {
        assert_eq!(time_passed_in_period(THURSDAY_MIDNIGHT), SECONDS_IN_WEEK);
        assert_eq!(time_passed_in_period(THURSDAY_MIDNIGHT + 60), 60);
    }
}
