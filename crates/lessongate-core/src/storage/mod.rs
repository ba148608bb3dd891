mod config;
pub mod database;
pub mod migrations;

pub use config::{CalendarConfig, Config, UnlockConfig};
pub use database::Database;

use std::path::PathBuf;

use crate::error::ConfigError;

/// Returns `~/.config/lessongate[-dev]/` based on LESSONGATE_ENV.
///
/// Set LESSONGATE_ENV=dev to use the development data directory.
///
/// # Errors
/// Returns an error if creating the directory fails.
pub fn data_dir() -> Result<PathBuf, ConfigError> {
    let base_dir = dirs::home_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join(".config");

    let env = std::env::var("LESSONGATE_ENV").unwrap_or_else(|_| "production".to_string());

    let dir = if env == "dev" {
        base_dir.join("lessongate-dev")
    } else {
        base_dir.join("lessongate")
    };

    std::fs::create_dir_all(&dir)
        .map_err(|e| ConfigError::DataDir(format!("{}: {e}", dir.display())))?;
    Ok(dir)
}

/// Database location: `LESSONGATE_DB` if set, else `lessongate.db` in [`data_dir`].
pub fn database_path() -> Result<PathBuf, ConfigError> {
    if let Ok(path) = std::env::var("LESSONGATE_DB") {
        return Ok(PathBuf::from(path));
    }
    Ok(data_dir()?.join("lessongate.db"))
}
