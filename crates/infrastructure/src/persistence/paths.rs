//! Location of the configuration documents.
//!
//! By default the documents live in the platform data directory:
//! - Linux: ~/.local/share/folio/
//! - macOS: ~/Library/Application Support/folio/
//! - Windows: %APPDATA%/folio/

use std::path::{Path, PathBuf};

use folio_domain::{PREFERENCES_FILE_NAME, REQUESTS_FILE_NAME};

/// Name of the application directory under the platform data directory.
pub const APP_DIR_NAME: &str = "folio";

/// Resolved document paths, handed to the managers at construction.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConfigPaths {
    data_dir: PathBuf,
}

impl ConfigPaths {
    /// Uses `data_dir` as the document directory.
    #[must_use]
    pub fn new(data_dir: impl Into<PathBuf>) -> Self {
        Self {
            data_dir: data_dir.into(),
        }
    }

    /// The platform data directory, if the platform has one.
    #[must_use]
    pub fn platform_default() -> Option<Self> {
        dirs::data_dir().map(|dir| Self::new(dir.join(APP_DIR_NAME)))
    }

    /// Directory holding every document.
    #[must_use]
    pub fn data_dir(&self) -> &Path {
        &self.data_dir
    }

    /// Path of the request tree document.
    #[must_use]
    pub fn requests_file(&self) -> PathBuf {
        self.data_dir.join(REQUESTS_FILE_NAME)
    }

    /// Path of the user preferences document.
    #[must_use]
    pub fn preferences_file(&self) -> PathBuf {
        self.data_dir.join(PREFERENCES_FILE_NAME)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_files_live_in_data_dir() {
        let paths = ConfigPaths::new("/tmp/folio-data");
        assert_eq!(paths.data_dir(), Path::new("/tmp/folio-data"));
        assert_eq!(
            paths.requests_file(),
            PathBuf::from("/tmp/folio-data/requests.json")
        );
        assert_eq!(
            paths.preferences_file(),
            PathBuf::from("/tmp/folio-data/config.json")
        );
    }

    #[test]
    fn test_platform_default_ends_with_app_dir() {
        if let Some(paths) = ConfigPaths::platform_default() {
            assert!(paths.data_dir().ends_with(APP_DIR_NAME));
        }
    }
}
