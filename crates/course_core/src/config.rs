//! Runtime configuration for course processes.
//!
//! # Responsibility
//! - Resolve database path, logging and seeding settings.
//! - Layer environment overrides over built-in defaults.
//!
//! # Invariants
//! - Resolution never panics; malformed values become `ConfigError`.
//! - Empty or whitespace-only environment values are treated as unset.

use std::error::Error;
use std::fmt::{Display, Formatter};
use std::path::PathBuf;

pub const ENV_DB_PATH: &str = "COURSE_DB_PATH";
pub const ENV_LOG_LEVEL: &str = "COURSE_LOG_LEVEL";
pub const ENV_LOG_DIR: &str = "COURSE_LOG_DIR";
pub const ENV_SEED_DEFAULTS: &str = "COURSE_SEED_DEFAULTS";

const DEFAULT_DB_FILE_NAME: &str = "courses.sqlite3";

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConfigError {
    InvalidBool { key: &'static str, value: String },
}

impl Display for ConfigError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::InvalidBool { key, value } => write!(
                f,
                "invalid value `{value}` for {key}; expected true|false|1|0|yes|no"
            ),
        }
    }
}

impl Error for ConfigError {}

/// Resolved process configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CourseConfig {
    /// SQLite database file.
    pub db_path: PathBuf,
    /// One of `trace|debug|info|warn|error`.
    pub log_level: String,
    /// Absolute log directory; file logging is off when unset.
    pub log_dir: Option<PathBuf>,
    /// Whether startup seeds the default catalog into an empty store.
    pub seed_defaults: bool,
}

impl Default for CourseConfig {
    fn default() -> Self {
        Self {
            db_path: std::env::temp_dir().join(DEFAULT_DB_FILE_NAME),
            log_level: crate::logging::default_log_level().to_string(),
            log_dir: None,
            seed_defaults: true,
        }
    }
}

impl CourseConfig {
    /// Defaults overridden by `COURSE_*` environment variables.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Defaults overridden by values from `lookup`.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let read = |key: &str| {
            lookup(key)
                .map(|raw| raw.trim().to_string())
                .filter(|value| !value.is_empty())
        };

        let mut config = Self::default();
        if let Some(path) = read(ENV_DB_PATH) {
            config.db_path = PathBuf::from(path);
        }
        if let Some(level) = read(ENV_LOG_LEVEL) {
            config.log_level = level;
        }
        if let Some(dir) = read(ENV_LOG_DIR) {
            config.log_dir = Some(PathBuf::from(dir));
        }
        if let Some(raw) = read(ENV_SEED_DEFAULTS) {
            config.seed_defaults = parse_bool(ENV_SEED_DEFAULTS, &raw)?;
        }
        Ok(config)
    }
}

fn parse_bool(key: &'static str, raw: &str) -> Result<bool, ConfigError> {
    match raw.to_ascii_lowercase().as_str() {
        "true" | "1" | "yes" => Ok(true),
        "false" | "0" | "no" => Ok(false),
        _ => Err(ConfigError::InvalidBool {
            key,
            value: raw.to_string(),
        }),
    }
}
