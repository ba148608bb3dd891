//! Weekly learning streak and completion rate.
//!
//! Streaks are counted in learning weeks, which begin on the release weekday.
//! An empty current week does not break the streak while it is still within
//! the grace window at the start of the week.

use chrono::{DateTime, Duration, NaiveDate, Utc, Weekday};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashMap};

use crate::calendar::{days_since_week_start, learning_week_start, weeks_since_join};
use crate::completion::CompletionEvent;

/// Configuration for streak computation
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EngagementPolicy {
    /// Weekday a learning week starts on
    pub release_weekday: Weekday,
    /// Days into a silent week before it breaks the streak
    pub grace_days: u32,
}

impl Default for EngagementPolicy {
    fn default() -> Self {
        Self {
            release_weekday: Weekday::Mon,
            grace_days: 2,
        }
    }
}

/// Engagement metrics for one learner.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct EngagementSummary {
    /// Consecutive learning weeks with at least one completion
    pub current_streak: u32,
    pub this_week_completed_count: u32,
    /// Completions per week since joining, one decimal
    pub weekly_completion_rate: f64,
}

/// Streak and rate calculator
#[derive(Debug, Clone, Default)]
pub struct EngagementAggregator {
    policy: EngagementPolicy,
}

impl EngagementAggregator {
    /// Create an aggregator with the default policy
    pub fn new() -> Self {
        Self::default()
    }

    /// Create with a custom policy
    pub fn with_policy(policy: EngagementPolicy) -> Self {
        Self { policy }
    }

    /// Summarise a learner's completion history as of `now`.
    pub fn summarize(
        &self,
        events: &[CompletionEvent],
        join_date: DateTime<Utc>,
        now: DateTime<Utc>,
    ) -> EngagementSummary {
        let completions = earliest_completions(events);
        let buckets = self.bucket_by_week(completions.values().copied());

        let current_week = learning_week_start(now.date_naive(), self.policy.release_weekday);
        let this_week = buckets.get(&current_week).copied().unwrap_or(0);

        let total = completions.len() as f64;
        let weeks = f64::from(weeks_since_join(join_date, now).max(1));
        let weekly_completion_rate = (total / weeks * 10.0).round() / 10.0;

        EngagementSummary {
            current_streak: self.current_streak(&buckets, current_week, now),
            this_week_completed_count: this_week,
            weekly_completion_rate,
        }
    }

    fn bucket_by_week(
        &self,
        completed_at: impl Iterator<Item = DateTime<Utc>>,
    ) -> BTreeMap<NaiveDate, u32> {
        let mut buckets = BTreeMap::new();
        for at in completed_at {
            let week = learning_week_start(at.date_naive(), self.policy.release_weekday);
            *buckets.entry(week).or_insert(0) += 1;
        }
        buckets
    }

    fn current_streak(
        &self,
        buckets: &BTreeMap<NaiveDate, u32>,
        current_week: NaiveDate,
        now: DateTime<Utc>,
    ) -> u32 {
        let Some(earliest) = buckets.keys().next().copied() else {
            return 0;
        };
        let has_activity = |week: &NaiveDate| buckets.get(week).is_some_and(|n| *n > 0);

        let mut cursor = current_week;
        if !has_activity(&cursor)
            && days_since_week_start(now, self.policy.release_weekday) <= self.policy.grace_days
        {
            cursor -= Duration::days(7);
        }

        let mut streak = 0;
        while cursor >= earliest && has_activity(&cursor) {
            streak += 1;
            cursor -= Duration::days(7);
        }
        streak
    }
}

/// One timestamp per completed lesson, the earliest if the history repeats it.
fn earliest_completions(events: &[CompletionEvent]) -> HashMap<&str, DateTime<Utc>> {
    let mut earliest: HashMap<&str, DateTime<Utc>> = HashMap::new();
    for event in events.iter().filter(|e| e.is_completed) {
        let Some(at) = event.completed_at else {
            continue;
        };
        earliest
            .entry(event.lesson_id.as_str())
            .and_modify(|existing| *existing = (*existing).min(at))
            .or_insert(at);
    }
    earliest
}

#[cfg(test)]
mod tests {
    use super::*;

    // 2024-03-04 is a Monday
    fn ts(s: &str) -> DateTime<Utc> {
        s.parse().unwrap()
    }

    fn done(lesson: &str, at: &str) -> CompletionEvent {
        CompletionEvent::completed("learner", lesson, 80, ts(at))
    }

    fn join() -> DateTime<Utc> {
        ts("2024-01-01T00:00:00Z")
    }

    #[test]
    fn empty_history_has_no_streak() {
        let summary =
            EngagementAggregator::new().summarize(&[], join(), ts("2024-03-06T12:00:00Z"));
        assert_eq!(summary.current_streak, 0);
        assert_eq!(summary.this_week_completed_count, 0);
        assert_eq!(summary.weekly_completion_rate, 0.0);
    }

    #[test]
    fn consecutive_weeks_including_current() {
        let events = vec![
            done("a", "2024-02-20T10:00:00Z"),
            done("b", "2024-02-27T10:00:00Z"),
            done("c", "2024-03-05T10:00:00Z"),
        ];
        let summary =
            EngagementAggregator::new().summarize(&events, join(), ts("2024-03-06T12:00:00Z"));
        assert_eq!(summary.current_streak, 3);
        assert_eq!(summary.this_week_completed_count, 1);
    }

    #[test]
    fn grace_period_skips_quiet_start_of_week() {
        let events = vec![
            done("a", "2024-02-13T10:00:00Z"),
            done("b", "2024-02-20T10:00:00Z"),
            done("c", "2024-02-27T10:00:00Z"),
        ];
        // Tuesday, one day into the week
        let summary =
            EngagementAggregator::new().summarize(&events, join(), ts("2024-03-05T08:00:00Z"));
        assert_eq!(summary.current_streak, 3);
        assert_eq!(summary.this_week_completed_count, 0);
    }

    #[test]
    fn quiet_week_past_grace_breaks_streak() {
        let events = vec![
            done("a", "2024-02-20T10:00:00Z"),
            done("b", "2024-02-27T10:00:00Z"),
        ];
        // Thursday, three days into the week
        let summary =
            EngagementAggregator::new().summarize(&events, join(), ts("2024-03-07T08:00:00Z"));
        assert_eq!(summary.current_streak, 0);
    }

    #[test]
    fn grace_period_holds_through_its_last_day() {
        let events = vec![
            done("a", "2024-02-20T10:00:00Z"),
            done("b", "2024-02-27T10:00:00Z"),
        ];
        // Wednesday 23:00, exactly two days into the week
        let summary =
            EngagementAggregator::new().summarize(&events, join(), ts("2024-03-06T23:00:00Z"));
        assert_eq!(summary.current_streak, 2);
    }

    #[test]
    fn grace_period_ends_the_day_after() {
        let events = vec![
            done("a", "2024-02-20T10:00:00Z"),
            done("b", "2024-02-27T10:00:00Z"),
        ];
        // Thursday 00:00, grace_days + 1 into the week
        let summary =
            EngagementAggregator::new().summarize(&events, join(), ts("2024-03-07T00:00:00Z"));
        assert_eq!(summary.current_streak, 0);
    }

    #[test]
    fn gap_week_stops_the_walk() {
        let events = vec![
            done("a", "2024-02-13T10:00:00Z"),
            done("b", "2024-02-27T10:00:00Z"),
            done("c", "2024-03-04T10:00:00Z"),
        ];
        let summary =
            EngagementAggregator::new().summarize(&events, join(), ts("2024-03-06T12:00:00Z"));
        assert_eq!(summary.current_streak, 2);
    }

    #[test]
    fn remarking_a_lesson_does_not_move_its_bucket() {
        let events = vec![
            done("a", "2024-02-27T10:00:00Z"),
            done("a", "2024-03-05T10:00:00Z"),
        ];
        let summary =
            EngagementAggregator::new().summarize(&events, join(), ts("2024-03-06T12:00:00Z"));
        assert_eq!(summary.this_week_completed_count, 0);
        assert_eq!(summary.weekly_completion_rate, 0.1);
    }

    #[test]
    fn incomplete_rows_are_ignored() {
        let mut pending = done("a", "2024-03-05T10:00:00Z");
        pending.is_completed = false;
        let summary =
            EngagementAggregator::new().summarize(&[pending], join(), ts("2024-03-06T12:00:00Z"));
        assert_eq!(summary.this_week_completed_count, 0);
        assert_eq!(summary.current_streak, 0);
    }

    #[test]
    fn weekly_rate_rounds_to_one_decimal() {
        let events: Vec<_> = ["a", "b", "c", "d"]
            .iter()
            .map(|id| done(id, "2024-01-02T10:00:00Z"))
            .collect();
        // joined 2024-01-01, now week 3 of membership
        let summary =
            EngagementAggregator::new().summarize(&events, join(), ts("2024-01-15T12:00:00Z"));
        assert_eq!(summary.weekly_completion_rate, 1.3);
    }

    #[test]
    fn custom_release_weekday_shifts_weeks() {
        let policy = EngagementPolicy {
            release_weekday: Weekday::Thu,
            grace_days: 0,
        };
        // Wed and the following Thu fall in different Thursday-anchored weeks
        let events = vec![
            done("a", "2024-02-28T10:00:00Z"),
            done("b", "2024-02-29T10:00:00Z"),
        ];
        let summary = EngagementAggregator::with_policy(policy).summarize(
            &events,
            join(),
            ts("2024-03-01T12:00:00Z"),
        );
        assert_eq!(summary.current_streak, 2);
        assert_eq!(summary.this_week_completed_count, 1);
    }
}
