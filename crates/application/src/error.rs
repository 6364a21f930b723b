//! Application error types

use folio_domain::{MigrationError, ValidationError};
use thiserror::Error;

use crate::ports::StorageError;

/// Errors returned by the configuration managers.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// An operation was attempted before a successful load.
    #[error("config is not loaded")]
    NotLoaded,

    /// A referenced item or parent folder does not exist.
    #[error("item not found: {0}")]
    NotFound(String),

    /// The proposed state violates an invariant. Nothing was committed.
    #[error("validation failed: {0}")]
    Validation(#[from] ValidationError),

    /// An untyped patch could not be applied to the document shape.
    #[error("invalid patch: {0}")]
    InvalidPatch(String),

    /// The stored schema version is not understood.
    #[error("migration failed: {0}")]
    Migration(#[from] MigrationError),

    /// Reading or writing the document failed.
    #[error("storage error: {0}")]
    Storage(#[from] StorageError),
}

impl ConfigError {
    /// Returns the validation error, if this is one.
    #[must_use]
    pub const fn as_validation(&self) -> Option<&ValidationError> {
        match self {
            Self::Validation(err) => Some(err),
            _ => None,
        }
    }
}

/// Result type alias for manager operations.
pub type ConfigResult<T = ()> = Result<T, ConfigError>;
