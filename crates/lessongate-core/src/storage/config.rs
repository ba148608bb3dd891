//! TOML-based engine configuration.
//!
//! Holds the unlock-schedule constants and the release calendar so they can
//! be tuned without a rebuild.
//!
//! Configuration is stored at `~/.config/lessongate/config.toml`.

use chrono::Weekday;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use super::data_dir;
use crate::engagement::EngagementPolicy;
use crate::error::ConfigError;
use crate::unlock::UnlockPolicy;

/// Unlock schedule constants.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UnlockConfig {
    #[serde(default = "default_starter_pack")]
    pub starter_pack: u32,
    #[serde(default = "default_cushion")]
    pub cushion: u32,
    #[serde(default = "default_catch_up_threshold_weeks")]
    pub catch_up_threshold_weeks: u32,
    #[serde(default = "default_catch_up_rate")]
    pub catch_up_rate: u32,
    #[serde(default = "default_caught_up_margin")]
    pub caught_up_margin: u32,
}

/// Release calendar.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CalendarConfig {
    /// Weekday lessons are released and learning weeks start, e.g. "monday"
    #[serde(default = "default_release_weekday")]
    pub release_weekday: String,
    /// Days into a silent week before the streak breaks
    #[serde(default = "default_grace_days")]
    pub grace_days: u32,
}

/// Application configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub unlock: UnlockConfig,
    #[serde(default)]
    pub calendar: CalendarConfig,
}

fn default_starter_pack() -> u32 {
    5
}
fn default_cushion() -> u32 {
    3
}
fn default_catch_up_threshold_weeks() -> u32 {
    4
}
fn default_catch_up_rate() -> u32 {
    2
}
fn default_caught_up_margin() -> u32 {
    2
}
fn default_release_weekday() -> String {
    "monday".into()
}
fn default_grace_days() -> u32 {
    2
}

impl Default for UnlockConfig {
    fn default() -> Self {
        Self {
            starter_pack: default_starter_pack(),
            cushion: default_cushion(),
            catch_up_threshold_weeks: default_catch_up_threshold_weeks(),
            catch_up_rate: default_catch_up_rate(),
            caught_up_margin: default_caught_up_margin(),
        }
    }
}

impl Default for CalendarConfig {
    fn default() -> Self {
        Self {
            release_weekday: default_release_weekday(),
            grace_days: default_grace_days(),
        }
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            unlock: UnlockConfig::default(),
            calendar: CalendarConfig::default(),
        }
    }
}

impl Config {
    fn get_json_value_by_path<'a>(
        root: &'a serde_json::Value,
        key: &str,
    ) -> Option<&'a serde_json::Value> {
        if key.is_empty() {
            return None;
        }

        let mut current = root;
        for part in key.split('.') {
            current = current.get(part)?;
        }
        Some(current)
    }

    fn set_json_value_by_path(
        root: &mut serde_json::Value,
        key: &str,
        value: &str,
    ) -> Result<(), ConfigError> {
        let unknown = || ConfigError::UnknownKey(key.to_string());
        let invalid = |message: String| ConfigError::InvalidValue {
            key: key.to_string(),
            message,
        };

        let mut parts = key.split('.').peekable();
        if key.is_empty() {
            return Err(unknown());
        }

        let mut current = root;
        while let Some(part) = parts.next() {
            if parts.peek().is_none() {
                let obj = current.as_object_mut().ok_or_else(unknown)?;
                let existing = obj.get(part).ok_or_else(unknown)?;

                let new_value = match existing {
                    serde_json::Value::Bool(_) => serde_json::Value::Bool(
                        value.parse::<bool>().map_err(|e| invalid(e.to_string()))?,
                    ),
                    serde_json::Value::Number(_) => value
                        .parse::<u64>()
                        .map(|n| serde_json::Value::Number(n.into()))
                        .map_err(|_| invalid(format!("cannot parse '{value}' as a whole number")))?,
                    serde_json::Value::Object(_) | serde_json::Value::Array(_) => {
                        return Err(invalid("cannot replace a whole section".to_string()))
                    }
                    _ => serde_json::Value::String(value.into()),
                };

                obj.insert(part.to_string(), new_value);
                return Ok(());
            }

            current = current.get_mut(part).ok_or_else(unknown)?;
        }

        Err(unknown())
    }

    fn path() -> Result<PathBuf, ConfigError> {
        Ok(data_dir()?.join("config.toml"))
    }

    /// Load from the default location, writing defaults if the file is absent.
    ///
    /// # Errors
    ///
    /// Returns an error if the file exists but cannot be parsed or is invalid,
    /// or if the default config cannot be written.
    pub fn load() -> Result<Self, ConfigError> {
        Self::load_from(&Self::path()?)
    }

    /// Load from `path`, writing defaults there if the file is absent.
    pub fn load_from(path: &Path) -> Result<Self, ConfigError> {
        match std::fs::read_to_string(path) {
            Ok(content) => {
                let cfg: Config = toml::from_str(&content).map_err(|e| ConfigError::LoadFailed {
                    path: path.to_path_buf(),
                    message: e.to_string(),
                })?;
                cfg.validate()?;
                Ok(cfg)
            }
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                let cfg = Self::default();
                cfg.save_to(path)?;
                Ok(cfg)
            }
            Err(e) => Err(ConfigError::LoadFailed {
                path: path.to_path_buf(),
                message: e.to_string(),
            }),
        }
    }

    /// Persist to the default location.
    pub fn save(&self) -> Result<(), ConfigError> {
        self.save_to(&Self::path()?)
    }

    /// Persist to `path`.
    pub fn save_to(&self, path: &Path) -> Result<(), ConfigError> {
        let save_failed = |message: String| ConfigError::SaveFailed {
            path: path.to_path_buf(),
            message,
        };
        let content = toml::to_string_pretty(self).map_err(|e| save_failed(e.to_string()))?;
        std::fs::write(path, content).map_err(|e| save_failed(e.to_string()))?;
        Ok(())
    }

    /// Get a config value as string by dot-separated key.
    pub fn get(&self, key: &str) -> Option<String> {
        let json = serde_json::to_value(self).ok()?;
        let val = Self::get_json_value_by_path(&json, key)?;
        match val {
            serde_json::Value::String(s) => Some(s.clone()),
            other => Some(other.to_string()),
        }
    }

    /// Set a value by dot-separated key without persisting it.
    ///
    /// # Errors
    ///
    /// Returns an error if the key is unknown or the value does not parse or
    /// validate. `self` is left unchanged on error.
    pub fn set(&mut self, key: &str, value: &str) -> Result<(), ConfigError> {
        let mut json = serde_json::to_value(&*self).map_err(|e| ConfigError::InvalidValue {
            key: key.to_string(),
            message: e.to_string(),
        })?;
        Self::set_json_value_by_path(&mut json, key, value)?;
        let updated: Config = serde_json::from_value(json).map_err(|e| ConfigError::InvalidValue {
            key: key.to_string(),
            message: e.to_string(),
        })?;
        updated.validate()?;
        *self = updated;
        Ok(())
    }

    /// Check values the engine cannot work with.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.unlock.starter_pack == 0 {
            return Err(ConfigError::InvalidValue {
                key: "unlock.starter_pack".into(),
                message: "must be at least 1".into(),
            });
        }
        if self.unlock.catch_up_rate == 0 {
            return Err(ConfigError::InvalidValue {
                key: "unlock.catch_up_rate".into(),
                message: "must be at least 1".into(),
            });
        }
        if self.calendar.grace_days > 6 {
            return Err(ConfigError::InvalidValue {
                key: "calendar.grace_days".into(),
                message: "must be between 0 and 6".into(),
            });
        }
        self.release_weekday()?;
        Ok(())
    }

    pub fn release_weekday(&self) -> Result<Weekday, ConfigError> {
        self.calendar
            .release_weekday
            .parse::<Weekday>()
            .map_err(|_| ConfigError::InvalidValue {
                key: "calendar.release_weekday".into(),
                message: format!("'{}' is not a weekday", self.calendar.release_weekday),
            })
    }

    pub fn unlock_policy(&self) -> UnlockPolicy {
        UnlockPolicy {
            starter_pack: self.unlock.starter_pack,
            cushion: self.unlock.cushion,
            catch_up_threshold_weeks: i64::from(self.unlock.catch_up_threshold_weeks),
            catch_up_rate: self.unlock.catch_up_rate,
            caught_up_margin: self.unlock.caught_up_margin,
            release_weekday: self.release_weekday_or_default(),
        }
    }

    pub fn engagement_policy(&self) -> EngagementPolicy {
        EngagementPolicy {
            release_weekday: self.release_weekday_or_default(),
            grace_days: self.calendar.grace_days,
        }
    }

    fn release_weekday_or_default(&self) -> Weekday {
        self.release_weekday().unwrap_or_else(|e| {
            tracing::warn!(error = %e, "falling back to monday releases");
            Weekday::Mon
        })
    }

    /// Load from disk, returning default on error.
    /// This is a convenience method that never fails.
    pub fn load_or_default() -> Self {
        Self::load().unwrap_or_else(|e| {
            tracing::warn!(error = %e, "using default configuration");
            Self::default()
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config_roundtrip() {
        let cfg = Config::default();
        let toml_str = toml::to_string_pretty(&cfg).unwrap();
        let parsed: Config = toml::from_str(&toml_str).unwrap();
        assert_eq!(parsed, cfg);
    }

    #[test]
    fn default_policies_match_engine_defaults() {
        let cfg = Config::default();
        assert_eq!(cfg.unlock_policy(), UnlockPolicy::default());
        assert_eq!(cfg.engagement_policy(), EngagementPolicy::default());
    }

    #[test]
    fn partial_file_fills_defaults() {
        let cfg: Config = toml::from_str("[unlock]\ncushion = 4\n").unwrap();
        assert_eq!(cfg.unlock.cushion, 4);
        assert_eq!(cfg.unlock.starter_pack, 5);
        assert_eq!(cfg.calendar.release_weekday, "monday");
    }

    #[test]
    fn get_supports_dot_path_keys() {
        let cfg = Config::default();
        assert_eq!(cfg.get("unlock.cushion").as_deref(), Some("3"));
        assert_eq!(cfg.get("calendar.release_weekday").as_deref(), Some("monday"));
        assert!(cfg.get("unlock.missing_key").is_none());
        assert!(cfg.get("").is_none());
    }

    #[test]
    fn set_updates_number_and_string() {
        let mut cfg = Config::default();
        cfg.set("unlock.catch_up_threshold_weeks", "6").unwrap();
        cfg.set("calendar.release_weekday", "friday").unwrap();
        assert_eq!(cfg.unlock_policy().catch_up_threshold_weeks, 6);
        assert_eq!(cfg.unlock_policy().release_weekday, Weekday::Fri);
    }

    #[test]
    fn set_rejects_unknown_key() {
        let mut cfg = Config::default();
        assert!(matches!(
            cfg.set("unlock.nonexistent", "1"),
            Err(ConfigError::UnknownKey(_))
        ));
        assert!(matches!(cfg.set("unlock", "1"), Err(ConfigError::InvalidValue { .. })));
    }

    #[test]
    fn set_rejects_invalid_values_and_keeps_state() {
        let mut cfg = Config::default();
        assert!(cfg.set("unlock.cushion", "three").is_err());
        assert!(cfg.set("unlock.catch_up_rate", "0").is_err());
        assert!(cfg.set("calendar.release_weekday", "someday").is_err());
        assert_eq!(cfg, Config::default());
    }

    #[test]
    fn load_from_missing_file_writes_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        let cfg = Config::load_from(&path).unwrap();
        assert_eq!(cfg, Config::default());
        assert!(path.exists());
    }

    #[test]
    fn load_from_rejects_invalid_weekday() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        std::fs::write(&path, "[calendar]\nrelease_weekday = \"funday\"\n").unwrap();
        assert!(Config::load_from(&path).is_err());
    }

    #[test]
    fn save_then_load_preserves_changes() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        let mut cfg = Config::default();
        cfg.set("calendar.grace_days", "1").unwrap();
        cfg.save_to(&path).unwrap();
        assert_eq!(Config::load_from(&path).unwrap().calendar.grace_days, 1);
    }
}
