//! Configuration loading and management.

use std::fmt;
use std::num::NonZeroUsize;
use std::path::{Path, PathBuf};

use att_core::FailurePolicy;
use chrono::NaiveTime;
use chrono_tz::Tz;
use figment::Figment;
use figment::providers::{Env, Format, Serialized, Toml};
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Invalid configuration values, reported when first used.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("unknown timezone: {0}")]
    Timezone(String),
    #[error("invalid late_after time {value:?} (expected HH:MM)")]
    LateAfter {
        value: String,
        #[source]
        source: chrono::ParseError,
    },
}

/// Application configuration.
#[derive(Clone, Serialize, Deserialize)]
pub struct Config {
    /// Path to the database file.
    pub database_path: PathBuf,
    /// IANA zone used to bucket events into days and format times.
    pub timezone: String,
    /// Roster resolution threads.
    pub workers: usize,
    /// Entries strictly after this local time are late.
    pub late_after: String,
    /// What a roster does with employees whose records cannot be read.
    pub roster_failures: FailurePolicy,
}

impl fmt::Debug for Config {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Config")
            .field("database_path", &self.database_path)
            .field("timezone", &self.timezone)
            .field("workers", &self.workers)
            .field("late_after", &self.late_after)
            .field("roster_failures", &self.roster_failures)
            .finish()
    }
}

impl Default for Config {
    fn default() -> Self {
        let data_dir = dirs_data_path().unwrap_or_else(|| PathBuf::from("."));
        Self {
            database_path: data_dir.join("att.db"),
            timezone: "Asia/Tashkent".to_string(),
            workers: 4,
            late_after: "09:00".to_string(),
            roster_failures: FailurePolicy::Flag,
        }
    }
}

impl Config {
    /// Loads configuration, optionally from a specific file.
    #[expect(
        clippy::result_large_err,
        reason = "figment::Error is large but only returned at startup"
    )]
    pub fn load_from(config_path: Option<&Path>) -> Result<Self, figment::Error> {
        let mut figment = Figment::from(Serialized::defaults(Self::default()));

        if let Some(config_dir) = dirs_config_path() {
            figment = figment.merge(Toml::file(config_dir.join("config.toml")));
        }

        if let Some(path) = config_path {
            figment = figment.merge(Toml::file(path));
        }

        // ATT_DATABASE_PATH, ATT_TIMEZONE, ...
        figment = figment.merge(Env::prefixed("ATT_"));

        figment.extract()
    }

    /// The display timezone.
    pub fn timezone(&self) -> Result<Tz, ConfigError> {
        self.timezone
            .trim()
            .parse()
            .map_err(|_| ConfigError::Timezone(self.timezone.clone()))
    }

    /// The lateness threshold as a local time of day.
    pub fn late_after(&self) -> Result<NaiveTime, ConfigError> {
        NaiveTime::parse_from_str(self.late_after.trim(), "%H:%M").map_err(|source| {
            ConfigError::LateAfter {
                value: self.late_after.clone(),
                source,
            }
        })
    }

    /// Resolution pool size, between one and the host's available parallelism.
    pub fn workers(&self) -> usize {
        let available = std::thread::available_parallelism().map_or(1, NonZeroUsize::get);
        self.workers.clamp(1, available)
    }
}

/// Returns the platform-specific config directory for att.
fn dirs_config_path() -> Option<PathBuf> {
    dirs::config_dir().map(|p| p.join("att"))
}

/// Returns the platform-specific data directory for att.
///
/// On Linux: `~/.local/share/att`
pub fn dirs_data_path() -> Option<PathBuf> {
    dirs::data_dir().map(|p| p.join("att"))
}
