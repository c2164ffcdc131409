//! TOML-based application configuration.
//!
//! Stores user preferences including:
//! - Tick cadence for each engine
//! - The countdown's default duration fields
//! - Whether expiry rings the terminal bell
//! - Default log level
//!
//! Configuration is stored at `~/.config/tempo/config.toml`. Timer state is
//! never written here; it lives only as long as the widget.

use serde::{Deserialize, Serialize};
use std::ops::RangeInclusive;
use std::path::{Path, PathBuf};

use super::data_dir;
use crate::error::{ConfigError, Result, ValidationError};
use crate::timer::DurationFields;

/// Accepted tick cadence, in milliseconds.
pub const TICK_INTERVAL_RANGE_MS: RangeInclusive<u64> = 1..=1000;

/// Stopwatch configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StopwatchConfig {
    /// Display refresh cadence while running.
    #[serde(default = "default_stopwatch_tick")]
    pub tick_interval_ms: u64,
}

/// Countdown configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CountdownConfig {
    /// Display refresh and expiry check cadence while running.
    #[serde(default = "default_countdown_tick")]
    pub tick_interval_ms: u64,
    /// Ring the terminal bell on expiry.
    #[serde(default = "default_true")]
    pub bell: bool,
    /// Fields the countdown form starts with.
    #[serde(default = "default_duration")]
    pub default_duration: DurationFields,
}

/// Logging configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// Filter directive used when neither TEMPO_LOG nor RUST_LOG is set.
    #[serde(default = "default_log_level")]
    pub level: String,
}

/// Application configuration.
///
/// Serialized to/from TOML at `~/.config/tempo/config.toml`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub stopwatch: StopwatchConfig,
    #[serde(default)]
    pub countdown: CountdownConfig,
    #[serde(default)]
    pub logging: LoggingConfig,
}

// Default functions
fn default_stopwatch_tick() -> u64 {
    10
}
fn default_countdown_tick() -> u64 {
    100
}
fn default_true() -> bool {
    true
}
fn default_duration() -> DurationFields {
    DurationFields::hms(0, 5, 0)
}
fn default_log_level() -> String {
    "warn".into()
}

impl Default for StopwatchConfig {
    fn default() -> Self {
        Self {
            tick_interval_ms: default_stopwatch_tick(),
        }
    }
}

impl Default for CountdownConfig {
    fn default() -> Self {
        Self {
            tick_interval_ms: default_countdown_tick(),
            bell: true,
            default_duration: default_duration(),
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
        }
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            stopwatch: StopwatchConfig::default(),
            countdown: CountdownConfig::default(),
            logging: LoggingConfig::default(),
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
            let is_leaf = parts.peek().is_none();
            if is_leaf {
                let obj = current.as_object_mut().ok_or_else(unknown)?;
                let existing = obj.get(part).ok_or_else(unknown)?;

                let new_value = match existing {
                    serde_json::Value::Bool(_) => value
                        .parse::<bool>()
                        .map(serde_json::Value::Bool)
                        .map_err(|e| invalid(e.to_string()))?,
                    serde_json::Value::Number(_) => value
                        .parse::<u64>()
                        .map(|n| serde_json::Value::Number(n.into()))
                        .map_err(|_| invalid(format!("cannot parse '{value}' as number")))?,
                    serde_json::Value::Object(_) | serde_json::Value::Array(_) => {
                        serde_json::from_str(value).map_err(|e| invalid(e.to_string()))?
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

    fn path() -> Result<PathBuf> {
        Ok(data_dir()?.join("config.toml"))
    }

    /// Load from the default location, writing defaults if the file is missing.
    ///
    /// # Errors
    ///
    /// Returns an error if the config file exists but cannot be parsed or
    /// fails validation, or if the default config cannot be written to disk.
    pub fn load() -> Result<Self> {
        Self::load_from(&Self::path()?)
    }

    /// Load from an explicit path, writing defaults if the file is missing.
    ///
    /// Any other read failure is returned and leaves the file untouched.
    pub fn load_from(path: &Path) -> Result<Self> {
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
            }
            .into()),
        }
    }

    /// Persist to the default location.
    pub fn save(&self) -> Result<()> {
        self.save_to(&Self::path()?)
    }

    /// Persist to an explicit path.
    pub fn save_to(&self, path: &Path) -> Result<()> {
        let save_failed = |message: String| ConfigError::SaveFailed {
            path: path.to_path_buf(),
            message,
        };
        let content = toml::to_string_pretty(self).map_err(|e| save_failed(e.to_string()))?;
        std::fs::write(path, content).map_err(|e| save_failed(e.to_string()))?;
        Ok(())
    }

    /// Check values that would break the runtime.
    pub fn validate(&self) -> Result<(), ValidationError> {
        for (field, value) in [
            ("stopwatch.tick_interval_ms", self.stopwatch.tick_interval_ms),
            ("countdown.tick_interval_ms", self.countdown.tick_interval_ms),
        ] {
            if !TICK_INTERVAL_RANGE_MS.contains(&value) {
                return Err(ValidationError::OutOfRange {
                    field: field.into(),
                    value,
                    min: *TICK_INTERVAL_RANGE_MS.start(),
                    max: *TICK_INTERVAL_RANGE_MS.end(),
                });
            }
        }
        if self.logging.level.trim().is_empty() {
            return Err(ValidationError::InvalidValue {
                field: "logging.level".into(),
                message: "must not be empty".into(),
            });
        }
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

    /// Set a config value by key without persisting it.
    ///
    /// # Errors
    ///
    /// Returns an error if the key is unknown, the value cannot be parsed,
    /// or the resulting config fails validation. `self` is unchanged on error.
    pub fn apply(&mut self, key: &str, value: &str) -> Result<()> {
        let mut json = serde_json::to_value(&*self)?;
        Self::set_json_value_by_path(&mut json, key, value)?;
        let updated: Config = serde_json::from_value(json).map_err(|e| ConfigError::InvalidValue {
            key: key.to_string(),
            message: e.to_string(),
        })?;
        updated.validate()?;
        *self = updated;
        Ok(())
    }

    /// Set a config value by key and persist to the default location.
    pub fn set(&mut self, key: &str, value: &str) -> Result<()> {
        self.apply(key, value)?;
        self.save()
    }

    /// Load from disk, returning default on error.
    /// This is a convenience method that never fails.
    pub fn load_or_default() -> Self {
        Self::load().unwrap_or_else(|e| {
            tracing::warn!(error = %e, "falling back to default configuration");
            Self::default()
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::CoreError;

    #[test]
    fn default_config_roundtrip() {
        let cfg = Config::default();
        let toml_str = toml::to_string_pretty(&cfg).unwrap();
        let parsed: Config = toml::from_str(&toml_str).unwrap();
        assert_eq!(parsed, cfg);
    }

    #[test]
    fn config_default_values() {
        let cfg = Config::default();
        assert_eq!(cfg.stopwatch.tick_interval_ms, 10);
        assert_eq!(cfg.countdown.tick_interval_ms, 100);
        assert!(cfg.countdown.bell);
        assert_eq!(cfg.countdown.default_duration.total_ms(), 300_000);
        assert_eq!(cfg.logging.level, "warn");
    }

    #[test]
    fn partial_file_fills_defaults() {
        let parsed: Config = toml::from_str("[countdown]\nbell = false\n").unwrap();
        assert!(!parsed.countdown.bell);
        assert_eq!(parsed.countdown.tick_interval_ms, 100);
        assert_eq!(parsed.stopwatch.tick_interval_ms, 10);
    }

    #[test]
    fn get_supports_dot_path_keys() {
        let cfg = Config::default();
        assert_eq!(cfg.get("countdown.bell").as_deref(), Some("true"));
        assert_eq!(cfg.get("stopwatch.tick_interval_ms").as_deref(), Some("10"));
        assert_eq!(cfg.get("countdown.default_duration.minutes").as_deref(), Some("5"));
        assert_eq!(cfg.get("logging.level").as_deref(), Some("warn"));
        assert!(cfg.get("countdown.missing_key").is_none());
        assert!(cfg.get("").is_none());
    }

    #[test]
    fn apply_updates_nested_values() {
        let mut cfg = Config::default();
        cfg.apply("countdown.bell", "false").unwrap();
        cfg.apply("stopwatch.tick_interval_ms", "25").unwrap();
        cfg.apply("countdown.default_duration.seconds", "30").unwrap();
        cfg.apply("logging.level", "tempo_core=debug").unwrap();
        assert!(!cfg.countdown.bell);
        assert_eq!(cfg.stopwatch.tick_interval_ms, 25);
        assert_eq!(cfg.countdown.default_duration.total_ms(), 330_000);
        assert_eq!(cfg.logging.level, "tempo_core=debug");
    }

    #[test]
    fn apply_rejects_unknown_key() {
        let mut cfg = Config::default();
        let err = cfg.apply("countdown.nonexistent", "1").unwrap_err();
        assert!(matches!(
            err,
            CoreError::Config(ConfigError::UnknownKey(_))
        ));
    }

    #[test]
    fn apply_rejects_invalid_type() {
        let mut cfg = Config::default();
        assert!(cfg.apply("countdown.bell", "not_a_bool").is_err());
        assert!(cfg.apply("stopwatch.tick_interval_ms", "-3").is_err());
        assert_eq!(cfg, Config::default());
    }

    #[test]
    fn apply_rejects_out_of_range_tick() {
        let mut cfg = Config::default();
        let err = cfg.apply("countdown.tick_interval_ms", "0").unwrap_err();
        assert!(matches!(
            err,
            CoreError::Validation(ValidationError::OutOfRange { value: 0, .. })
        ));
        assert!(cfg.apply("stopwatch.tick_interval_ms", "5000").is_err());
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
    fn unreadable_file_is_not_overwritten() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        let mut bytes = b"# caf".to_vec();
        bytes.push(0xE9);
        bytes.extend_from_slice(b"\n[countdown]\nbell = false\ntick_interval_ms = 25\n");
        std::fs::write(&path, &bytes).unwrap();

        assert!(matches!(
            Config::load_from(&path),
            Err(CoreError::Config(ConfigError::LoadFailed { .. }))
        ));
        assert_eq!(std::fs::read(&path).unwrap(), bytes);
    }

    #[test]
    fn directory_in_place_of_file_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        std::fs::create_dir(&path).unwrap();
        assert!(Config::load_from(&path).is_err());
        assert!(path.is_dir());
    }

    #[test]
    fn save_then_load_preserves_changes() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        let mut cfg = Config::default();
        cfg.apply("countdown.tick_interval_ms", "50").unwrap();
        cfg.save_to(&path).unwrap();
        let loaded = Config::load_from(&path).unwrap();
        assert_eq!(loaded.countdown.tick_interval_ms, 50);
    }

    #[test]
    fn load_from_rejects_invalid_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        std::fs::write(&path, "[stopwatch]\ntick_interval_ms = 0\n").unwrap();
        assert!(Config::load_from(&path).is_err());

        std::fs::write(&path, "not toml = = =").unwrap();
        assert!(matches!(
            Config::load_from(&path),
            Err(CoreError::Config(ConfigError::LoadFailed { .. }))
        ));
    }
}
