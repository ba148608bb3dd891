pub mod complete;
pub mod config;
pub mod learner;
pub mod lesson;
pub mod streak;
pub mod view;

use chrono::{DateTime, Utc};
use lessongate_core::{Config, Database, LearningEngine};

/// `--at` override for the clock, defaulting to now.
pub fn resolve_now(at: Option<DateTime<Utc>>) -> DateTime<Utc> {
    at.unwrap_or_else(Utc::now)
}

/// Open the database and build an engine configured from `config.toml`.
pub fn with_engine<T>(
    f: impl FnOnce(&LearningEngine<'_>, &Database) -> Result<T, Box<dyn std::error::Error>>,
) -> Result<T, Box<dyn std::error::Error>> {
    let db = Database::open()?;
    let config = Config::load_or_default();
    let engine = LearningEngine::new(&db, &db, &db).with_config(&config);
    f(&engine, &db)
}

pub fn print_json<T: serde::Serialize>(value: &T) -> Result<(), Box<dyn std::error::Error>> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}
