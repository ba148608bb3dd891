//! Database schema migrations for lessongate.
//!
//! Migrations are versioned and applied automatically when opening the database.
//! The `schema_version` table tracks the current migration version.

use rusqlite::{Connection, Result as SqliteResult};

/// Current schema version.
pub const SCHEMA_VERSION: i32 = 2;

/// Apply all pending migrations to bring the database to the current schema version.
///
/// # Errors
/// Returns an error if migration fails.
pub fn migrate(conn: &Connection) -> SqliteResult<()> {
    create_schema_version_table(conn)?;

    let current_version = get_schema_version(conn);

    if current_version < 1 {
        migrate_v1(conn)?;
    }
    if current_version < 2 {
        migrate_v2(conn)?;
    }

    Ok(())
}

fn create_schema_version_table(conn: &Connection) -> SqliteResult<()> {
    conn.execute_batch(
        "CREATE TABLE IF NOT EXISTS schema_version (
            version INTEGER PRIMARY KEY
        );",
    )
}

/// Returns 0 if no version is set (initial database).
pub fn get_schema_version(conn: &Connection) -> i32 {
    conn.query_row("SELECT version FROM schema_version", [], |row| {
        row.get::<_, i32>(0)
    })
    .unwrap_or_else(|e| {
        if !matches!(e, rusqlite::Error::QueryReturnedNoRows) {
            tracing::warn!(error = %e, "failed to read schema_version");
        }
        0
    })
}

fn set_schema_version(conn: &Connection, version: i32) -> SqliteResult<()> {
    conn.execute("DELETE FROM schema_version", [])?;
    conn.execute("INSERT INTO schema_version (version) VALUES (?1)", [version])?;
    Ok(())
}

/// Migration v1: learners, lessons and completions.
///
/// `week_number` is NULL for evergreen lessons. Completions are keyed on
/// the (learner, lesson) pair so upserts cannot create duplicates.
fn migrate_v1(conn: &Connection) -> SqliteResult<()> {
    let tx = conn.unchecked_transaction()?;

    tx.execute_batch(
        "CREATE TABLE IF NOT EXISTS learners (
            id                  TEXT PRIMARY KEY,
            join_date           TEXT NOT NULL,
            subscription_tier   TEXT NOT NULL DEFAULT 'free',
            subscription_status TEXT NOT NULL DEFAULT 'inactive',
            preferred_level     TEXT NOT NULL DEFAULT 'both',
            language_support    TEXT NOT NULL DEFAULT 'english'
        );

        CREATE TABLE IF NOT EXISTS lessons (
            id               TEXT PRIMARY KEY,
            title            TEXT NOT NULL DEFAULT '',
            week_number      INTEGER CHECK (week_number IS NULL OR week_number >= 1),
            category         TEXT NOT NULL,
            level            TEXT NOT NULL,
            language_support TEXT NOT NULL,
            published        INTEGER NOT NULL DEFAULT 0
        );

        CREATE TABLE IF NOT EXISTS completions (
            learner_id       TEXT NOT NULL,
            lesson_id        TEXT NOT NULL,
            is_completed     INTEGER NOT NULL DEFAULT 0,
            completed_at     TEXT,
            percentage_score INTEGER NOT NULL DEFAULT 0,
            PRIMARY KEY (learner_id, lesson_id)
        );",
    )?;

    tx.execute("DELETE FROM schema_version", [])?;
    tx.execute("INSERT INTO schema_version (version) VALUES (?1)", [1])?;

    tx.commit()?;
    Ok(())
}

/// Migration v2: billing bookkeeping and query indexes.
///
/// Adds:
/// - learners.billing_updated_at: when billing last wrote tier/status
/// - index on published numbered lessons for the catalog-week query
/// - index on completions by learner
fn migrate_v2(conn: &Connection) -> SqliteResult<()> {
    let tx = conn.unchecked_transaction()?;

    tx.execute_batch(
        "ALTER TABLE learners ADD COLUMN billing_updated_at TEXT;
         CREATE INDEX IF NOT EXISTS idx_lessons_published_week ON lessons(published, week_number);
         CREATE INDEX IF NOT EXISTS idx_completions_learner ON completions(learner_id);",
    )?;

    set_schema_version(&tx, 2)?;

    tx.commit()?;
    Ok(())
}
