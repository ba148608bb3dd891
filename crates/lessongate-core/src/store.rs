use chrono::{DateTime, Utc};

use crate::catalog::LessonRecord;
use crate::completion::CompletionEvent;
use crate::error::StoreError;
use crate::learner::LearnerProfile;

/// Read access to learner profiles.
/// Tier and status are written by billing and may lag a purchase.
pub trait ProfileStore: Send + Sync {
    /// Returns `StoreError::NotFound` when no profile exists.
    fn get_learner_profile(&self, learner_id: &str) -> Result<LearnerProfile, StoreError>;
}

/// Read access to the published lesson catalog.
pub trait CatalogStore: Send + Sync {
    fn list_published_lessons(&self) -> Result<Vec<LessonRecord>, StoreError>;

    /// Highest week among published numbered lessons, `None` when there are none.
    fn max_week_number(&self) -> Result<Option<u32>, StoreError> {
        Ok(self
            .list_published_lessons()?
            .iter()
            .filter_map(LessonRecord::week)
            .max())
    }
}

/// Completion history, keyed on `(learner_id, lesson_id)`.
pub trait CompletionStore: Send + Sync {
    fn list_completions(&self, learner_id: &str) -> Result<Vec<CompletionEvent>, StoreError>;

    /// Idempotent upsert. Re-marking a completed lesson must keep its original
    /// `completed_at`.
    fn upsert_completion(
        &self,
        learner_id: &str,
        lesson_id: &str,
        is_completed: bool,
        percentage_score: u32,
        completed_at: Option<DateTime<Utc>>,
    ) -> Result<(), StoreError>;
}
