//! Process configuration read from the environment.
//!
//! | Variable | Default |
//! |---|---|
//! | `FOLIO_DATA_DIR` | platform data directory + `folio` |
//! | `FOLIO_SAVE_DEBOUNCE_MS` | 700 |

use std::path::PathBuf;
use std::time::Duration;

use folio_application::DEFAULT_DEBOUNCE;

use crate::persistence::ConfigPaths;

/// Overrides the document directory.
pub const DATA_DIR_VAR: &str = "FOLIO_DATA_DIR";

/// Overrides the save quiet period, in milliseconds.
pub const SAVE_DEBOUNCE_VAR: &str = "FOLIO_SAVE_DEBOUNCE_MS";

/// Error type for configuration resolution.
#[derive(Debug, thiserror::Error)]
pub enum AppConfigError {
    /// No override and no platform data directory.
    #[error("could not determine data directory; set {DATA_DIR_VAR}")]
    NoDataDir,

    /// The debounce override is not a whole number of milliseconds.
    #[error("{SAVE_DEBOUNCE_VAR} must be a number of milliseconds, got {0:?}")]
    InvalidDebounce(String),
}

/// Settings resolved once at startup.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AppConfig {
    /// Directory holding the documents.
    pub data_dir: PathBuf,
    /// Quiet period before a deferred save runs.
    pub save_debounce: Duration,
}

impl AppConfig {
    /// Reads the process environment.
    ///
    /// # Errors
    ///
    /// See [`AppConfig::from_lookup`].
    pub fn from_env() -> Result<Self, AppConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Resolves settings through `lookup`, which maps a variable name to
    /// its value.
    ///
    /// # Errors
    ///
    /// Returns [`AppConfigError::NoDataDir`] if neither an override nor a
    /// platform directory exists, and [`AppConfigError::InvalidDebounce`]
    /// for a malformed debounce value.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, AppConfigError> {
        let data_dir = match lookup(DATA_DIR_VAR).filter(|dir| !dir.trim().is_empty()) {
            Some(dir) => PathBuf::from(dir),
            None => ConfigPaths::platform_default()
                .map(|paths| paths.data_dir().to_path_buf())
                .ok_or(AppConfigError::NoDataDir)?,
        };

        let save_debounce = match lookup(SAVE_DEBOUNCE_VAR) {
            Some(raw) => raw
                .trim()
                .parse::<u64>()
                .map(Duration::from_millis)
                .map_err(|_| AppConfigError::InvalidDebounce(raw))?,
            None => DEFAULT_DEBOUNCE,
        };

        Ok(Self {
            data_dir,
            save_debounce,
        })
    }

    /// Document paths under [`AppConfig::data_dir`].
    #[must_use]
    pub fn paths(&self) -> ConfigPaths {
        ConfigPaths::new(&self.data_dir)
    }
}
