//! User preferences document (config.json).

use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::BTreeMap;

use crate::error::{MigrationError, ValidationError, ValidationResult};

/// Current schema version of the preferences document.
pub const PREFERENCES_VERSION: u32 = 1;

/// File name of the preferences document inside the data directory.
pub const PREFERENCES_FILE_NAME: &str = "config.json";

/// Accepted font sizes, in pixels.
pub const FONT_SIZE_RANGE: (u32, u32) = (8, 72);

/// Theme mode preference.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum ThemeMode {
    /// Light mode theme (default).
    #[default]
    Light,
    /// Dark mode theme.
    Dark,
    /// Follow the operating system.
    Auto,
}

/// User preferences.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UserPreferences {
    /// Schema version.
    #[serde(default)]
    pub version: u32,

    /// Theme mode preference.
    #[serde(default)]
    pub theme: ThemeMode,

    /// Editor font size in pixels.
    #[serde(default = "default_font_size", rename = "fontSize")]
    pub font_size: u32,

    /// Base URL prepended to request paths.
    #[serde(default, rename = "baseURL")]
    pub base_url: String,

    /// Fields this version does not model.
    #[serde(flatten)]
    pub extra: BTreeMap<String, Value>,
}

const fn default_font_size() -> u32 {
    14
}

impl UserPreferences {
    /// Validates the preference values.
    ///
    /// # Errors
    ///
    /// Returns the first out-of-range field.
    pub fn validate(&self) -> ValidationResult {
        if self.version < 1 {
            return Err(ValidationError::InvalidVersion {
                found: self.version,
            });
        }
        let (min, max) = FONT_SIZE_RANGE;
        if !(min..=max).contains(&self.font_size) {
            return Err(ValidationError::OutOfRange {
                field: "fontSize",
                min,
                max,
                found: self.font_size,
            });
        }
        Ok(())
    }

    /// Upgrades a stored document to [`PREFERENCES_VERSION`].
    ///
    /// # Errors
    ///
    /// Returns [`MigrationError::UnknownVersion`] for newer documents.
    pub fn migrate(mut self) -> Result<(Self, bool), MigrationError> {
        match self.version {
            0 => {
                self.version = PREFERENCES_VERSION;
                Ok((self, true))
            }
            PREFERENCES_VERSION => Ok((self, false)),
            found => Err(MigrationError::UnknownVersion {
                found,
                current: PREFERENCES_VERSION,
            }),
        }
    }
}

impl Default for UserPreferences {
    fn default() -> Self {
        Self {
            version: PREFERENCES_VERSION,
            theme: ThemeMode::default(),
            font_size: default_font_size(),
            base_url: String::new(),
            extra: BTreeMap::new(),
        }
    }
}
