//! Lesson catalog records.
//!
//! Catalog rows are owned by the admin tooling; the engine only reads them.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::error::ValidationError;
use crate::learner::{PreferredLevel, SupportLanguage};

/// Where a lesson sits in the release schedule.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(tag = "kind", content = "week", rename_all = "snake_case")]
pub enum LessonKind {
    /// Always visible sample lesson outside the weekly progression
    Evergreen,
    /// Released in the given catalog week (1-based)
    Numbered(u32),
}

impl LessonKind {
    /// Build a numbered kind, rejecting week 0.
    pub fn numbered(week: u32) -> Result<Self, ValidationError> {
        if week == 0 {
            return Err(ValidationError::InvalidWeekNumber(week));
        }
        Ok(LessonKind::Numbered(week))
    }

    pub fn week(&self) -> Option<u32> {
        match self {
            LessonKind::Evergreen => None,
            LessonKind::Numbered(week) => Some(*week),
        }
    }

    pub fn is_evergreen(&self) -> bool {
        matches!(self, LessonKind::Evergreen)
    }
}

/// Content category, gated by subscription tier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ContentCategory {
    /// Language-agnostic lessons
    Immersion,
    /// Lessons carrying translations into a support language
    Bilingual,
}

/// Lesson difficulty.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Level {
    Beginner,
    Intermediate,
}

impl ContentCategory {
    pub fn as_str(&self) -> &'static str {
        match self {
            ContentCategory::Immersion => "immersion",
            ContentCategory::Bilingual => "bilingual",
        }
    }
}

impl Level {
    pub fn as_str(&self) -> &'static str {
        match self {
            Level::Beginner => "beginner",
            Level::Intermediate => "intermediate",
        }
    }

    /// Whether a lesson at this level passes the learner's preference.
    pub fn matches(&self, preference: PreferredLevel) -> bool {
        match preference {
            PreferredLevel::Both => true,
            PreferredLevel::Beginner => *self == Level::Beginner,
            PreferredLevel::Intermediate => *self == Level::Intermediate,
        }
    }
}

impl FromStr for ContentCategory {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "immersion" => Ok(ContentCategory::Immersion),
            "bilingual" => Ok(ContentCategory::Bilingual),
            _ => Err(ValidationError::UnknownVariant {
                field: "category",
                value: s.to_string(),
            }),
        }
    }
}

impl FromStr for Level {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "beginner" => Ok(Level::Beginner),
            "intermediate" => Ok(Level::Intermediate),
            _ => Err(ValidationError::UnknownVariant {
                field: "level",
                value: s.to_string(),
            }),
        }
    }
}

impl fmt::Display for ContentCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.pad(self.as_str())
    }
}

impl fmt::Display for Level {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.pad(self.as_str())
    }
}

/// A catalog entry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LessonRecord {
    pub id: String,
    #[serde(default)]
    pub title: String,
    pub kind: LessonKind,
    pub category: ContentCategory,
    pub level: Level,
    pub language_support: SupportLanguage,
    pub published: bool,
}

impl LessonRecord {
    pub fn week(&self) -> Option<u32> {
        self.kind.week()
    }

    pub fn is_evergreen(&self) -> bool {
        self.kind.is_evergreen()
    }
}

/// Latest release week among published numbered lessons, or 1 for an empty catalog.
pub fn current_catalog_week(lessons: &[LessonRecord]) -> u32 {
    lessons
        .iter()
        .filter(|l| l.published)
        .filter_map(LessonRecord::week)
        .max()
        .unwrap_or(1)
}

#[cfg(test)]
pub(crate) mod fixtures {
    use super::*;

    pub fn numbered(id: &str, week: u32, category: ContentCategory, level: Level) -> LessonRecord {
        LessonRecord {
            id: id.to_string(),
            title: format!("Week {week}"),
            kind: LessonKind::Numbered(week),
            category,
            level,
            language_support: SupportLanguage::English,
            published: true,
        }
    }

    pub fn evergreen(id: &str, level: Level) -> LessonRecord {
        LessonRecord {
            id: id.to_string(),
            title: "Sample".to_string(),
            kind: LessonKind::Evergreen,
            category: ContentCategory::Immersion,
            level,
            language_support: SupportLanguage::English,
            published: true,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::fixtures::*;
    use super::*;

    #[test]
    fn week_zero_is_rejected() {
        assert_eq!(
            LessonKind::numbered(0),
            Err(ValidationError::InvalidWeekNumber(0))
        );
        assert_eq!(LessonKind::numbered(3), Ok(LessonKind::Numbered(3)));
    }

    #[test]
    fn catalog_week_ignores_evergreen_and_unpublished() {
        let mut draft = numbered("draft", 12, ContentCategory::Immersion, Level::Beginner);
        draft.published = false;
        let lessons = vec![
            evergreen("sample", Level::Beginner),
            numbered("w3", 3, ContentCategory::Immersion, Level::Beginner),
            numbered("w7", 7, ContentCategory::Bilingual, Level::Intermediate),
            draft,
        ];
        assert_eq!(current_catalog_week(&lessons), 7);
    }

    #[test]
    fn empty_catalog_is_week_one() {
        assert_eq!(current_catalog_week(&[]), 1);
        assert_eq!(current_catalog_week(&[evergreen("s", Level::Beginner)]), 1);
    }

    #[test]
    fn level_matches_preference() {
        assert!(Level::Beginner.matches(PreferredLevel::Both));
        assert!(Level::Beginner.matches(PreferredLevel::Beginner));
        assert!(!Level::Beginner.matches(PreferredLevel::Intermediate));
    }

    #[test]
    fn lesson_kind_serializes_tagged() {
        let json = serde_json::to_value(LessonKind::Numbered(4)).unwrap();
        assert_eq!(json, serde_json::json!({"kind": "numbered", "week": 4}));
        let json = serde_json::to_value(LessonKind::Evergreen).unwrap();
        assert_eq!(json, serde_json::json!({"kind": "evergreen"}));
    }
}
