//! Rolling unlock schedule.
//!
//! A learner starts with a starter pack of lessons and gains one more per
//! elapsed week, or `catch_up_rate` per week while far behind the live
//! catalog. The anti-binge brake caps how far unlocks may run ahead of the
//! learner's completion count.

use chrono::{DateTime, Utc, Weekday};
use serde::{Deserialize, Serialize};

use crate::calendar::{days_until_next_release, weeks_since_join};

/// Tunable constants of the unlock schedule.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct UnlockPolicy {
    /// Lessons visible immediately on sign-up
    pub starter_pack: u32,
    /// Unlocked-but-incomplete lessons allowed ahead of completions
    pub cushion: u32,
    /// Catch-up applies when more than this many weeks behind
    pub catch_up_threshold_weeks: i64,
    /// Lessons unlocked per elapsed week while catching up
    pub catch_up_rate: u32,
    /// Within this many lessons of the catalog counts as caught up
    pub caught_up_margin: u32,
    /// Weekday new lessons are released
    pub release_weekday: Weekday,
}

impl Default for UnlockPolicy {
    fn default() -> Self {
        Self {
            starter_pack: 5,
            cushion: 3,
            catch_up_threshold_weeks: 4,
            catch_up_rate: 2,
            caught_up_margin: 2,
            release_weekday: Weekday::Mon,
        }
    }
}

/// Derived unlock state for one learner at one instant.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProgressionState {
    /// Completed numbered lessons (evergreen excluded)
    pub total_completed: u32,
    pub available_lesson_count: u32,
    pub unlock_rate: u32,
    pub weeks_since_join: u32,
    pub current_catalog_week: u32,
    pub lessons_needed_for_next_unlock: u32,
    pub days_until_next_unlock: u32,
    pub is_caught_up: bool,
}

/// Inputs to [`UnlockSchedule::calculate`].
#[derive(Debug, Clone, Copy)]
pub struct UnlockInputs {
    pub join_date: DateTime<Utc>,
    pub now: DateTime<Utc>,
    pub current_catalog_week: u32,
    pub total_completed: u32,
}

/// Unlock schedule calculator
#[derive(Debug, Clone, Default)]
pub struct UnlockSchedule {
    policy: UnlockPolicy,
}

impl UnlockSchedule {
    /// Create a calculator with the default policy
    pub fn new() -> Self {
        Self::default()
    }

    /// Create with a custom policy
    pub fn with_policy(policy: UnlockPolicy) -> Self {
        Self { policy }
    }

    pub fn policy(&self) -> &UnlockPolicy {
        &self.policy
    }

    /// Compute how much of the catalog is unlocked.
    pub fn calculate(&self, inputs: UnlockInputs) -> ProgressionState {
        let policy = &self.policy;
        let catalog_week = inputs.current_catalog_week.max(1);
        let weeks_since_join = weeks_since_join(inputs.join_date, inputs.now);

        let weeks_behind = i64::from(catalog_week) - i64::from(weeks_since_join);
        let unlock_rate = if weeks_behind > policy.catch_up_threshold_weeks {
            policy.catch_up_rate
        } else {
            1
        };

        let raw_available = self
            .raw_at(weeks_since_join, unlock_rate)
            .max(self.catch_up_floor(catalog_week, weeks_since_join))
            .min(catalog_week);

        let lessons_needed_for_next_unlock = raw_available
            .saturating_sub(policy.cushion)
            .saturating_sub(inputs.total_completed);

        let available_lesson_count = if lessons_needed_for_next_unlock == 0 {
            raw_available
        } else {
            inputs.total_completed + policy.cushion
        };

        let is_caught_up =
            available_lesson_count >= catalog_week.saturating_sub(policy.caught_up_margin);

        let state = ProgressionState {
            total_completed: inputs.total_completed,
            available_lesson_count,
            unlock_rate,
            weeks_since_join,
            current_catalog_week: catalog_week,
            lessons_needed_for_next_unlock,
            days_until_next_unlock: days_until_next_release(inputs.now, policy.release_weekday),
            is_caught_up,
        };
        tracing::debug!(
            weeks_behind,
            raw_available,
            available = state.available_lesson_count,
            needed = state.lessons_needed_for_next_unlock,
            "unlock schedule computed"
        );
        state
    }

    /// Unlocks from the schedule alone after `weeks` weeks at `rate`.
    fn raw_at(&self, weeks: u32, rate: u32) -> u32 {
        self.policy
            .starter_pack
            .saturating_add(weeks.saturating_sub(1).saturating_mul(rate))
    }

    /// What the last catch-up week had unlocked, once that week is past.
    ///
    /// Dropping back to one lesson per week must never take away lessons the
    /// faster rate already released.
    fn catch_up_floor(&self, catalog_week: u32, weeks_since_join: u32) -> u32 {
        let last_catch_up_week =
            i64::from(catalog_week) - self.policy.catch_up_threshold_weeks - 1;
        match u32::try_from(last_catch_up_week) {
            Ok(week) if week >= 1 && week < weeks_since_join => {
                self.raw_at(week, self.policy.catch_up_rate)
            }
            _ => 0,
        }
    }
}
