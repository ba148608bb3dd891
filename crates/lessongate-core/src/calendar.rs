//! Learning-week arithmetic.
//!
//! A learning week starts on the release weekday rather than the calendar
//! week's first day. All dates are taken in UTC.

use chrono::{DateTime, Datelike, Duration, NaiveDate, Utc, Weekday};

/// Days between `date` and the most recent `release` weekday on or before it (0..=6).
fn days_into_week(date: NaiveDate, release: Weekday) -> u32 {
    (date.weekday().num_days_from_monday() + 7 - release.num_days_from_monday()) % 7
}

/// First day of the learning week containing `date`.
pub fn learning_week_start(date: NaiveDate, release: Weekday) -> NaiveDate {
    date - Duration::days(i64::from(days_into_week(date, release)))
}

/// Whole days elapsed since the current learning week began.
pub fn days_since_week_start(now: DateTime<Utc>, release: Weekday) -> u32 {
    days_into_week(now.date_naive(), release)
}

/// Days until the next release boundary (1..=7; 7 on the release day itself).
pub fn days_until_next_release(now: DateTime<Utc>, release: Weekday) -> u32 {
    7 - days_since_week_start(now, release)
}

/// `floor((now - join) / 7 days) + 1`, at least 1.
///
/// A join date in the future (clock skew) is clamped to zero elapsed time.
pub fn weeks_since_join(join_date: DateTime<Utc>, now: DateTime<Utc>) -> u32 {
    let elapsed = now - join_date;
    if elapsed < Duration::zero() {
        tracing::warn!(
            %join_date,
            %now,
            "join date is in the future; clamping elapsed time to zero"
        );
        return 1;
    }
    let weeks = elapsed.num_days() / 7;
    u32::try_from(weeks).unwrap_or(u32::MAX - 1) + 1
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(s: &str) -> NaiveDate {
        s.parse().unwrap()
    }

    fn ts(s: &str) -> DateTime<Utc> {
        s.parse().unwrap()
    }

    #[test]
    fn week_start_is_most_recent_release_day() {
        // 2024-03-04 is a Monday
        assert_eq!(learning_week_start(date("2024-03-04"), Weekday::Mon), date("2024-03-04"));
        assert_eq!(learning_week_start(date("2024-03-10"), Weekday::Mon), date("2024-03-04"));
        assert_eq!(learning_week_start(date("2024-03-11"), Weekday::Mon), date("2024-03-11"));
        assert_eq!(learning_week_start(date("2024-03-05"), Weekday::Wed), date("2024-02-28"));
    }

    #[test]
    fn days_until_release_counts_to_next_boundary() {
        assert_eq!(days_until_next_release(ts("2024-03-04T09:00:00Z"), Weekday::Mon), 7);
        assert_eq!(days_until_next_release(ts("2024-03-05T09:00:00Z"), Weekday::Mon), 6);
        assert_eq!(days_until_next_release(ts("2024-03-10T23:59:00Z"), Weekday::Mon), 1);
    }

    #[test]
    fn weeks_since_join_floors_and_starts_at_one() {
        let join = ts("2024-03-01T12:00:00Z");
        assert_eq!(weeks_since_join(join, join), 1);
        assert_eq!(weeks_since_join(join, join + Duration::days(6)), 1);
        assert_eq!(weeks_since_join(join, join + Duration::days(7)), 2);
        assert_eq!(weeks_since_join(join, join + Duration::days(14)), 3);
    }

    #[test]
    fn future_join_date_is_clamped() {
        let now = ts("2024-03-01T12:00:00Z");
        assert_eq!(weeks_since_join(now + Duration::days(30), now), 1);
    }
}
