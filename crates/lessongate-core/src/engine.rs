//! The learning-view facade.
//!
//! One entry point answers "what can this learner see right now" by running
//! access resolution, the unlock schedule and catalog selection in order;
//! engagement is computed alongside. Progression and engagement are
//! independent sections, so an outage in one store degrades a section rather
//! than the whole view.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;

use crate::access::ContentAccess;
use crate::catalog::{current_catalog_week, LessonRecord};
use crate::completion::{
    completed_lesson_ids, count_progress_completions, validate_score, CompletionEvent,
};
use crate::engagement::{EngagementAggregator, EngagementSummary};
use crate::error::{CoreError, Result, StoreError};
use crate::learner::LearnerProfile;
use crate::selector::{next_lesson, select_visible_lessons, DisplayOrder, ViewFilters};
use crate::storage::Config;
use crate::store::{CatalogStore, CompletionStore, ProfileStore};
use crate::unlock::{ProgressionState, UnlockInputs, UnlockSchedule};

/// A sub-result of the learning view.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum Section<T> {
    Ready(T),
    Unavailable { reason: String },
}

impl<T> Section<T> {
    pub fn ready(&self) -> Option<&T> {
        match self {
            Section::Ready(value) => Some(value),
            Section::Unavailable { .. } => None,
        }
    }

    pub fn is_ready(&self) -> bool {
        matches!(self, Section::Ready(_))
    }

    fn unavailable_reason(&self) -> Option<&str> {
        match self {
            Section::Ready(_) => None,
            Section::Unavailable { reason } => Some(reason),
        }
    }
}

/// Unlock state plus the lessons it makes visible.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProgressionView {
    pub state: ProgressionState,
    /// Evergreen first, then unlocked lessons in release order
    pub visible_lessons: Vec<LessonRecord>,
    /// Oldest unlocked lesson not yet completed
    pub next_lesson_id: Option<String>,
    pub completed_lesson_ids: Vec<String>,
}

impl ProgressionView {
    /// Visible lessons narrowed by `filters` and sorted for display.
    pub fn lessons_for_display(
        &self,
        filters: &ViewFilters,
        order: DisplayOrder,
    ) -> Vec<LessonRecord> {
        let completed: HashSet<&str> = self
            .completed_lesson_ids
            .iter()
            .map(String::as_str)
            .collect();
        let mut lessons = filters.apply(self.visible_lessons.clone(), &completed);
        order.sort(&mut lessons);
        lessons
    }
}

/// Everything a learner-facing screen needs.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LearningView {
    pub learner_id: String,
    /// False when the profile was missing and guest defaults were used
    pub profile_found: bool,
    pub access: ContentAccess,
    pub progression: Section<ProgressionView>,
    pub engagement: Section<EngagementSummary>,
}

/// Result of [`LearningEngine::mark_lesson_complete`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum CompletionOutcome {
    /// First completion of this lesson
    Recorded { total_completed: u32 },
    /// Lesson was already complete; progression unchanged
    AlreadyCompleted { total_completed: u32 },
    /// Lesson exists but is not visible to the learner yet
    Locked,
    /// No published lesson with this id
    UnknownLesson,
}

/// Content progression and access engine over the three stores.
pub struct LearningEngine<'a> {
    profiles: &'a dyn ProfileStore,
    catalog: &'a dyn CatalogStore,
    completions: &'a dyn CompletionStore,
    unlock: UnlockSchedule,
    engagement: EngagementAggregator,
}

impl<'a> LearningEngine<'a> {
    /// Create an engine with default policies
    pub fn new(
        profiles: &'a dyn ProfileStore,
        catalog: &'a dyn CatalogStore,
        completions: &'a dyn CompletionStore,
    ) -> Self {
        Self {
            profiles,
            catalog,
            completions,
            unlock: UnlockSchedule::new(),
            engagement: EngagementAggregator::new(),
        }
    }

    /// Use the policies from `config`.
    pub fn with_config(mut self, config: &Config) -> Self {
        self.unlock = UnlockSchedule::with_policy(config.unlock_policy());
        self.engagement = EngagementAggregator::with_policy(config.engagement_policy());
        self
    }

    /// Resolve the learner's access, unlocked lessons and engagement at `now`.
    ///
    /// # Errors
    ///
    /// Returns `UpstreamUnavailable` when the profile store is unreachable or
    /// when neither section could be computed.
    pub fn resolve_learning_view(
        &self,
        learner_id: &str,
        now: DateTime<Utc>,
    ) -> Result<LearningView> {
        let (profile, profile_found) = self.load_profile(learner_id, now)?;
        let access = ContentAccess::resolve(profile.subscription_tier, profile.subscription_status);
        let completions = self.completions.list_completions(learner_id);

        let progression = match &completions {
            Ok(events) => self.progression_section(&profile, &access, events, now),
            Err(e) => unavailable("completion store", e),
        };
        let engagement = match &completions {
            Ok(events) => Section::Ready(self.engagement.summarize(events, profile.join_date, now)),
            Err(e) => unavailable("completion store", e),
        };

        if let (Some(p), Some(e)) = (
            progression.unavailable_reason(),
            engagement.unavailable_reason(),
        ) {
            let reason = if p == e { p.to_string() } else { format!("{p}; {e}") };
            return Err(CoreError::UpstreamUnavailable(reason));
        }

        Ok(LearningView {
            learner_id: learner_id.to_string(),
            profile_found,
            access,
            progression,
            engagement,
        })
    }

    /// Mark a lesson complete for a learner.
    ///
    /// Only lessons currently visible to the learner are recorded. Repeating
    /// the call leaves progression and streak buckets unchanged.
    ///
    /// # Errors
    ///
    /// Returns a validation error for scores above 100, and
    /// `UpstreamUnavailable` when the catalog or completion store is down.
    pub fn mark_lesson_complete(
        &self,
        learner_id: &str,
        lesson_id: &str,
        score: u32,
        now: DateTime<Utc>,
    ) -> Result<CompletionOutcome> {
        let score = validate_score(score)?;
        let view = self.resolve_learning_view(learner_id, now)?;
        let progression = match &view.progression {
            Section::Ready(p) => p,
            Section::Unavailable { reason } => {
                return Err(CoreError::UpstreamUnavailable(reason.clone()))
            }
        };

        let Some(lesson) = progression.visible_lessons.iter().find(|l| l.id == lesson_id) else {
            let exists = self
                .catalog
                .list_published_lessons()
                .map_err(upstream("catalog store"))?
                .iter()
                .any(|l| l.id == lesson_id);
            tracing::info!(learner_id, lesson_id, exists, "completion rejected");
            return Ok(if exists {
                CompletionOutcome::Locked
            } else {
                CompletionOutcome::UnknownLesson
            });
        };

        let already = progression.completed_lesson_ids.iter().any(|id| id == lesson_id);
        self.completions
            .upsert_completion(learner_id, lesson_id, true, score, Some(now))
            .map_err(upstream("completion store"))?;

        let total = progression.state.total_completed;
        if already {
            tracing::debug!(learner_id, lesson_id, "lesson already completed");
            return Ok(CompletionOutcome::AlreadyCompleted { total_completed: total });
        }

        let total_completed = if lesson.is_evergreen() { total } else { total + 1 };
        tracing::info!(learner_id, lesson_id, score, total_completed, "lesson completed");
        Ok(CompletionOutcome::Recorded { total_completed })
    }

    fn load_profile(&self, learner_id: &str, now: DateTime<Utc>) -> Result<(LearnerProfile, bool)> {
        match self.profiles.get_learner_profile(learner_id) {
            Ok(profile) => Ok((profile, true)),
            Err(e) if e.is_not_found() => {
                tracing::debug!(learner_id, "no profile; using guest defaults");
                Ok((LearnerProfile::guest(learner_id, now), false))
            }
            Err(e) => Err(upstream("profile store")(e)),
        }
    }

    fn progression_section(
        &self,
        profile: &LearnerProfile,
        access: &ContentAccess,
        events: &[CompletionEvent],
        now: DateTime<Utc>,
    ) -> Section<ProgressionView> {
        let lessons = match self.catalog.list_published_lessons() {
            Ok(lessons) => lessons,
            Err(e) => return unavailable("catalog store", &e),
        };

        let state = self.unlock.calculate(UnlockInputs {
            join_date: profile.join_date,
            now,
            current_catalog_week: current_catalog_week(&lessons),
            total_completed: count_progress_completions(events, &lessons),
        });
        let visible_lessons =
            select_visible_lessons(&lessons, access, &state, &profile.preferences());

        let completed = completed_lesson_ids(events);
        let next_lesson_id = next_lesson(&visible_lessons, &completed).map(|l| l.id.clone());
        let mut completed_lesson_ids: Vec<String> =
            completed.into_iter().map(str::to_string).collect();
        completed_lesson_ids.sort();

        Section::Ready(ProgressionView {
            state,
            visible_lessons,
            next_lesson_id,
            completed_lesson_ids,
        })
    }
}

fn unavailable<T>(store: &str, err: &StoreError) -> Section<T> {
    tracing::warn!(store, error = %err, "section unavailable");
    Section::Unavailable {
        reason: format!("{store}: {err}"),
    }
}

fn upstream(store: &'static str) -> impl Fn(StoreError) -> CoreError {
    move |err| CoreError::UpstreamUnavailable(format!("{store}: {err}"))
}
