mod config;

pub use config::{Config, CountdownConfig, LoggingConfig, StopwatchConfig, TICK_INTERVAL_RANGE_MS};

use std::path::PathBuf;

use crate::error::Result;

/// Returns `~/.config/tempo[-dev]/` based on TEMPO_ENV.
///
/// Set TEMPO_ENV=dev to use the development config directory.
///
/// # Errors
/// Returns an error if creating the config directory fails.
pub fn data_dir() -> Result<PathBuf> {
    let base_dir = dirs::home_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join(".config");

    let env = std::env::var("TEMPO_ENV").unwrap_or_else(|_| "production".to_string());

    let dir = if env == "dev" {
        base_dir.join("tempo-dev")
    } else {
        base_dir.join("tempo")
    };

    std::fs::create_dir_all(&dir)?;
    Ok(dir)
}
