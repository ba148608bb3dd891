//! SQLite-backed stores.
//!
//! Provides persistent storage for:
//! - Learner profiles (tier and status written by billing)
//! - The lesson catalog
//! - Completion events, one row per (learner, lesson)

use chrono::{DateTime, Utc};
use rusqlite::{params, Connection, OptionalExtension, Row};
use std::path::Path;
use std::sync::{Mutex, MutexGuard};

use super::{database_path, migrations};
use crate::catalog::{ContentCategory, LessonKind, LessonRecord, Level};
use crate::completion::CompletionEvent;
use crate::error::{CoreError, StoreError};
use crate::learner::{
    LearnerProfile, PreferredLevel, SubscriptionStatus, SubscriptionTier, SupportLanguage,
};
use crate::store::{CatalogStore, CompletionStore, ProfileStore};

const LESSON_COLUMNS: &str =
    "id, title, week_number, category, level, language_support, published";

/// SQLite database implementing the profile, catalog and completion stores.
pub struct Database {
    conn: Mutex<Connection>,
}

impl Database {
    /// Open the database at `LESSONGATE_DB` or `~/.config/lessongate/lessongate.db`.
    ///
    /// Creates the database file and schema if they don't exist.
    ///
    /// # Errors
    /// Returns an error if the database cannot be opened or migrated.
    pub fn open() -> Result<Self, CoreError> {
        Self::open_at(database_path()?)
    }

    /// Open (or create) the database at `path`.
    pub fn open_at<P: AsRef<Path>>(path: P) -> Result<Self, CoreError> {
        let conn = Connection::open(path)?;
        Self::from_connection(conn)
    }

    /// Open an in-memory database.
    pub fn open_memory() -> Result<Self, CoreError> {
        let conn = Connection::open_in_memory()?;
        Self::from_connection(conn)
    }

    fn from_connection(conn: Connection) -> Result<Self, CoreError> {
        migrations::migrate(&conn)?;
        Ok(Self {
            conn: Mutex::new(conn),
        })
    }

    fn conn(&self) -> Result<MutexGuard<'_, Connection>, StoreError> {
        self.conn
            .lock()
            .map_err(|_| StoreError::Unavailable("database connection poisoned".to_string()))
    }

    /// Insert or replace a learner profile.
    pub fn upsert_profile(&self, profile: &LearnerProfile) -> Result<(), StoreError> {
        self.conn()?.execute(
            "INSERT INTO learners
                (id, join_date, subscription_tier, subscription_status,
                 preferred_level, language_support)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6)
             ON CONFLICT(id) DO UPDATE SET
                subscription_tier = excluded.subscription_tier,
                subscription_status = excluded.subscription_status,
                preferred_level = excluded.preferred_level,
                language_support = excluded.language_support",
            params![
                profile.id,
                profile.join_date.to_rfc3339(),
                profile.subscription_tier.as_str(),
                profile.subscription_status.as_str(),
                profile.preferred_level.as_str(),
                profile.language_support.as_str(),
            ],
        )?;
        Ok(())
    }

    /// Record a tier/status change from billing.
    ///
    /// Returns `false` when the learner does not exist.
    pub fn apply_billing_update(
        &self,
        learner_id: &str,
        tier: SubscriptionTier,
        status: SubscriptionStatus,
        at: DateTime<Utc>,
    ) -> Result<bool, StoreError> {
        let changed = self.conn()?.execute(
            "UPDATE learners
             SET subscription_tier = ?2, subscription_status = ?3, billing_updated_at = ?4
             WHERE id = ?1",
            params![learner_id, tier.as_str(), status.as_str(), at.to_rfc3339()],
        )?;
        Ok(changed > 0)
    }

    /// Insert or replace a catalog lesson.
    pub fn upsert_lesson(&self, lesson: &LessonRecord) -> Result<(), StoreError> {
        let conn = self.conn()?;
        insert_lesson(&conn, lesson)?;
        Ok(())
    }

    /// Insert or replace many lessons in one transaction.
    pub fn import_lessons(&self, lessons: &[LessonRecord]) -> Result<usize, StoreError> {
        let mut conn = self.conn()?;
        let tx = conn.transaction()?;
        for lesson in lessons {
            insert_lesson(&tx, lesson)?;
        }
        tx.commit()?;
        Ok(lessons.len())
    }

    /// Returns `false` when the lesson does not exist.
    pub fn set_lesson_published(
        &self,
        lesson_id: &str,
        published: bool,
    ) -> Result<bool, StoreError> {
        let changed = self.conn()?.execute(
            "UPDATE lessons SET published = ?2 WHERE id = ?1",
            params![lesson_id, published],
        )?;
        Ok(changed > 0)
    }

    /// Every lesson, published or not, in release order.
    pub fn list_all_lessons(&self) -> Result<Vec<LessonRecord>, StoreError> {
        let conn = self.conn()?;
        let mut stmt = conn.prepare(&format!(
            "SELECT {LESSON_COLUMNS} FROM lessons ORDER BY week_number IS NOT NULL, week_number, id"
        ))?;
        let rows = stmt.query_map([], lesson_from_row)?;
        Ok(rows.collect::<Result<Vec<_>, _>>()?)
    }
}

fn insert_lesson(conn: &Connection, lesson: &LessonRecord) -> rusqlite::Result<usize> {
    conn.execute(
        "INSERT OR REPLACE INTO lessons
            (id, title, week_number, category, level, language_support, published)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)",
        params![
            lesson.id,
            lesson.title,
            lesson.week(),
            lesson.category.as_str(),
            lesson.level.as_str(),
            lesson.language_support.as_str(),
            lesson.published,
        ],
    )
}

fn conversion_error(column: usize, message: String) -> rusqlite::Error {
    rusqlite::Error::FromSqlConversionFailure(
        column,
        rusqlite::types::Type::Text,
        message.into(),
    )
}

fn parse_column<T: std::str::FromStr>(row: &Row<'_>, column: usize) -> rusqlite::Result<T>
where
    T::Err: std::fmt::Display,
{
    let raw: String = row.get(column)?;
    raw.parse::<T>()
        .map_err(|e| conversion_error(column, e.to_string()))
}

/// Preference columns fall back to `fallback` rather than failing the read.
fn parse_or_default<T: std::str::FromStr>(
    row: &Row<'_>,
    column: usize,
    fallback: T,
) -> rusqlite::Result<T>
where
    T::Err: std::fmt::Display,
{
    let raw: String = row.get(column)?;
    Ok(raw.parse::<T>().unwrap_or_else(|e| {
        tracing::warn!(column, value = %raw, error = %e, "unrecognised stored preference");
        fallback
    }))
}

fn parse_timestamp(raw: &str, column: usize) -> rusqlite::Result<DateTime<Utc>> {
    DateTime::parse_from_rfc3339(raw)
        .map(|dt| dt.with_timezone(&Utc))
        .map_err(|e| conversion_error(column, e.to_string()))
}

fn lesson_from_row(row: &Row<'_>) -> rusqlite::Result<LessonRecord> {
    let kind = match row.get::<_, Option<u32>>(2)? {
        None => LessonKind::Evergreen,
        Some(week) => {
            LessonKind::numbered(week).map_err(|e| conversion_error(2, e.to_string()))?
        }
    };
    Ok(LessonRecord {
        id: row.get(0)?,
        title: row.get(1)?,
        kind,
        category: parse_column::<ContentCategory>(row, 3)?,
        level: parse_column::<Level>(row, 4)?,
        language_support: parse_column::<SupportLanguage>(row, 5)?,
        published: row.get(6)?,
    })
}

fn profile_from_row(row: &Row<'_>) -> rusqlite::Result<LearnerProfile> {
    let join_date: String = row.get(1)?;
    let tier: String = row.get(2)?;
    let status: String = row.get(3)?;
    Ok(LearnerProfile {
        id: row.get(0)?,
        join_date: parse_timestamp(&join_date, 1)?,
        subscription_tier: SubscriptionTier::parse_lenient(&tier),
        subscription_status: SubscriptionStatus::parse_lenient(&status),
        preferred_level: parse_or_default(row, 4, PreferredLevel::Both)?,
        language_support: parse_or_default(row, 5, SupportLanguage::English)?,
    })
}

fn completion_from_row(row: &Row<'_>) -> rusqlite::Result<CompletionEvent> {
    let completed_at = row
        .get::<_, Option<String>>(3)?
        .map(|raw| parse_timestamp(&raw, 3))
        .transpose()?;
    Ok(CompletionEvent {
        learner_id: row.get(0)?,
        lesson_id: row.get(1)?,
        is_completed: row.get(2)?,
        completed_at,
        percentage_score: row.get(4)?,
    })
}

impl ProfileStore for Database {
    fn get_learner_profile(&self, learner_id: &str) -> Result<LearnerProfile, StoreError> {
        self.conn()?
            .query_row(
                "SELECT id, join_date, subscription_tier, subscription_status,
                        preferred_level, language_support
                 FROM learners WHERE id = ?1",
                params![learner_id],
                profile_from_row,
            )
            .optional()?
            .ok_or_else(|| StoreError::not_found("learner", learner_id))
    }
}

impl CatalogStore for Database {
    fn list_published_lessons(&self) -> Result<Vec<LessonRecord>, StoreError> {
        let conn = self.conn()?;
        let mut stmt = conn.prepare(&format!(
            "SELECT {LESSON_COLUMNS} FROM lessons WHERE published = 1
             ORDER BY week_number IS NOT NULL, week_number, id"
        ))?;
        let rows = stmt.query_map([], lesson_from_row)?;
        Ok(rows.collect::<Result<Vec<_>, _>>()?)
    }

    fn max_week_number(&self) -> Result<Option<u32>, StoreError> {
        let max = self.conn()?.query_row(
            "SELECT MAX(week_number) FROM lessons
             WHERE published = 1 AND week_number IS NOT NULL",
            [],
            |row| row.get::<_, Option<u32>>(0),
        )?;
        Ok(max)
    }
}

impl CompletionStore for Database {
    fn list_completions(&self, learner_id: &str) -> Result<Vec<CompletionEvent>, StoreError> {
        let conn = self.conn()?;
        let mut stmt = conn.prepare(
            "SELECT learner_id, lesson_id, is_completed, completed_at, percentage_score
             FROM completions WHERE learner_id = ?1
             ORDER BY completed_at, lesson_id",
        )?;
        let rows = stmt.query_map(params![learner_id], completion_from_row)?;
        Ok(rows.collect::<Result<Vec<_>, _>>()?)
    }

    /// Completion is sticky: once a pair is completed its `completed_at` is
    /// kept and the best score wins.
    fn upsert_completion(
        &self,
        learner_id: &str,
        lesson_id: &str,
        is_completed: bool,
        percentage_score: u32,
        completed_at: Option<DateTime<Utc>>,
    ) -> Result<(), StoreError> {
        self.conn()?.execute(
            "INSERT INTO completions
                (learner_id, lesson_id, is_completed, completed_at, percentage_score)
             VALUES (?1, ?2, ?3, ?4, ?5)
             ON CONFLICT(learner_id, lesson_id) DO UPDATE SET
                completed_at = CASE WHEN completions.is_completed = 1
                    THEN completions.completed_at ELSE excluded.completed_at END,
                percentage_score = CASE WHEN completions.is_completed = 1
                    THEN MAX(completions.percentage_score, excluded.percentage_score)
                    ELSE excluded.percentage_score END,
                is_completed = MAX(completions.is_completed, excluded.is_completed)",
            params![
                learner_id,
                lesson_id,
                is_completed,
                completed_at.map(|at| at.to_rfc3339()),
                percentage_score,
            ],
        )?;
        Ok(())
    }
}
