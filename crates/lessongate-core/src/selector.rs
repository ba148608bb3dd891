//! Catalog selection.
//!
//! Combines content access, unlock progression and learner preferences into
//! the set of lessons a learner may open. Selection decides membership only;
//! [`DisplayOrder`] and [`ViewFilters`] shape that set for a particular screen
//! without ever widening it.

use serde::{Deserialize, Serialize};
use std::collections::HashSet;

use crate::access::ContentAccess;
use crate::catalog::{ContentCategory, LessonRecord, Level};
use crate::learner::LearnerPreferences;
use crate::unlock::ProgressionState;

/// Select the lessons visible to a learner.
///
/// Evergreen lessons come first, followed by unlocked numbered lessons in
/// release order.
pub fn select_visible_lessons(
    lessons: &[LessonRecord],
    access: &ContentAccess,
    progression: &ProgressionState,
    preferences: &LearnerPreferences,
) -> Vec<LessonRecord> {
    let (evergreen, regular): (Vec<&LessonRecord>, Vec<&LessonRecord>) = lessons
        .iter()
        .filter(|l| l.published)
        .partition(|l| l.is_evergreen());

    // Samples stay fully discoverable for learners without a subscription.
    if !access.has_any_category() {
        return evergreen.into_iter().cloned().collect();
    }

    let mut unlocked: Vec<&LessonRecord> = regular
        .into_iter()
        .filter(|l| category_passes(l, access, preferences))
        .filter(|l| l.level.matches(preferences.level))
        .collect();
    unlocked.sort_by(|a, b| a.week().cmp(&b.week()).then_with(|| a.id.cmp(&b.id)));
    unlocked.truncate(progression.available_lesson_count as usize);

    evergreen
        .into_iter()
        .filter(|l| l.level.matches(preferences.level))
        .chain(unlocked)
        .cloned()
        .collect()
}

fn category_passes(
    lesson: &LessonRecord,
    access: &ContentAccess,
    preferences: &LearnerPreferences,
) -> bool {
    match lesson.category {
        ContentCategory::Immersion => access.immersion,
        ContentCategory::Bilingual => {
            access.bilingual && lesson.language_support == preferences.language
        }
    }
}

/// Oldest unlocked numbered lesson the learner has not completed yet.
pub fn next_lesson<'a>(
    visible: &'a [LessonRecord],
    completed: &HashSet<&str>,
) -> Option<&'a LessonRecord> {
    visible
        .iter()
        .filter(|l| !l.is_evergreen() && !completed.contains(l.id.as_str()))
        .min_by(|a, b| a.week().cmp(&b.week()).then_with(|| a.id.cmp(&b.id)))
}

/// Ordering for presenting a selected lesson list.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DisplayOrder {
    /// Evergreen first, then oldest week first
    #[default]
    Chronological,
    /// Newest week first, evergreen last
    NewestFirst,
}

impl DisplayOrder {
    pub fn sort(&self, lessons: &mut [LessonRecord]) {
        // Evergreen lessons have no week and sort as `None`, below any week.
        match self {
            DisplayOrder::Chronological => {
                lessons.sort_by(|a, b| a.week().cmp(&b.week()).then_with(|| a.id.cmp(&b.id)))
            }
            DisplayOrder::NewestFirst => {
                lessons.sort_by(|a, b| b.week().cmp(&a.week()).then_with(|| a.id.cmp(&b.id)))
            }
        }
    }
}

/// Manual filter selections made on a listing screen.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ViewFilters {
    pub category: Option<ContentCategory>,
    pub level: Option<Level>,
    #[serde(default)]
    pub hide_completed: bool,
}

impl ViewFilters {
    pub fn is_empty(&self) -> bool {
        self.category.is_none() && self.level.is_none() && !self.hide_completed
    }

    /// Narrow an already-selected list.
    pub fn apply(
        &self,
        lessons: Vec<LessonRecord>,
        completed: &HashSet<&str>,
    ) -> Vec<LessonRecord> {
        lessons
            .into_iter()
            .filter(|l| self.category.map_or(true, |c| l.category == c))
            .filter(|l| self.level.map_or(true, |lvl| l.level == lvl))
            .filter(|l| !self.hide_completed || !completed.contains(l.id.as_str()))
            .collect()
    }
}
