//! Completion events and the counts derived from them.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::{HashMap, HashSet};

use crate::catalog::LessonRecord;
use crate::error::ValidationError;

/// One learner's state for one lesson. The store keeps at most one per pair.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CompletionEvent {
    pub learner_id: String,
    pub lesson_id: String,
    pub is_completed: bool,
    pub completed_at: Option<DateTime<Utc>>,
    pub percentage_score: u32,
}

impl CompletionEvent {
    pub fn completed(
        learner_id: impl Into<String>,
        lesson_id: impl Into<String>,
        score: u32,
        at: DateTime<Utc>,
    ) -> Self {
        Self {
            learner_id: learner_id.into(),
            lesson_id: lesson_id.into(),
            is_completed: true,
            completed_at: Some(at),
            percentage_score: score,
        }
    }
}

/// Reject scores outside 0..=100.
pub fn validate_score(score: u32) -> Result<u32, ValidationError> {
    if score > 100 {
        return Err(ValidationError::ScoreOutOfRange(score));
    }
    Ok(score)
}

/// Ids of lessons the learner has completed, deduplicated.
pub fn completed_lesson_ids(events: &[CompletionEvent]) -> HashSet<&str> {
    events
        .iter()
        .filter(|e| e.is_completed)
        .map(|e| e.lesson_id.as_str())
        .collect()
}

/// Completions that count toward unlock progression.
///
/// Only distinct, known, numbered catalog lessons count. Evergreen samples
/// and lessons missing from the catalog are ignored.
pub fn count_progress_completions(events: &[CompletionEvent], lessons: &[LessonRecord]) -> u32 {
    let numbered: HashMap<&str, &LessonRecord> = lessons
        .iter()
        .filter(|l| !l.is_evergreen())
        .map(|l| (l.id.as_str(), l))
        .collect();

    completed_lesson_ids(events)
        .into_iter()
        .filter(|id| numbered.contains_key(id))
        .count() as u32
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::fixtures::{evergreen, numbered};
    use crate::catalog::{ContentCategory, Level};

    fn at() -> DateTime<Utc> {
        "2024-03-04T10:00:00Z".parse().unwrap()
    }

    #[test]
    fn score_bounds() {
        assert_eq!(validate_score(0), Ok(0));
        assert_eq!(validate_score(100), Ok(100));
        assert_eq!(validate_score(101), Err(ValidationError::ScoreOutOfRange(101)));
    }

    #[test]
    fn evergreen_and_unknown_completions_do_not_count() {
        let lessons = vec![
            evergreen("sample", Level::Beginner),
            numbered("w1", 1, ContentCategory::Immersion, Level::Beginner),
            numbered("w2", 2, ContentCategory::Immersion, Level::Beginner),
        ];
        let events = vec![
            CompletionEvent::completed("l", "sample", 90, at()),
            CompletionEvent::completed("l", "w1", 90, at()),
            CompletionEvent::completed("l", "deleted-lesson", 90, at()),
        ];
        assert_eq!(count_progress_completions(&events, &lessons), 1);
    }

    #[test]
    fn duplicates_and_incomplete_rows_are_ignored() {
        let lessons = vec![numbered("w1", 1, ContentCategory::Immersion, Level::Beginner)];
        let mut pending = CompletionEvent::completed("l", "w1", 20, at());
        pending.is_completed = false;
        pending.completed_at = None;
        let events = vec![
            CompletionEvent::completed("l", "w1", 90, at()),
            CompletionEvent::completed("l", "w1", 95, at()),
            pending,
        ];
        assert_eq!(count_progress_completions(&events, &lessons), 1);
    }
}
