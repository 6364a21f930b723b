//! Domain error types

use thiserror::Error;

/// A structural or business rule violated by a proposed configuration.
///
/// Every variant names the rule it enforces and, where one exists, the
/// item that broke it.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ValidationError {
    /// The schema version is missing or below 1.
    #[error("version is required and must be at least 1 (found {found})")]
    InvalidVersion {
        /// The version that was found.
        found: u32,
    },

    /// An item is keyed by an empty identifier.
    #[error("item identifiers must not be empty")]
    EmptyId,

    /// An item has an empty display name.
    #[error("item {id}: name is required")]
    EmptyName {
        /// Offending item.
        id: String,
    },

    /// A request has no method.
    #[error("item {id}: request must have a method")]
    MissingMethod {
        /// Offending item.
        id: String,
    },

    /// A request method is not a recognized HTTP method.
    #[error("item {id}: method '{method}' must be a valid HTTP method")]
    UnknownMethod {
        /// Offending item.
        id: String,
        /// The unrecognized method token.
        method: String,
    },

    /// A request has no path.
    #[error("item {id}: request must have a path")]
    MissingPath {
        /// Offending item.
        id: String,
    },

    /// A request lists children.
    #[error("item {id}: request cannot have children")]
    RequestWithChildren {
        /// Offending item.
        id: String,
    },

    /// A folder carries a method.
    #[error("item {id}: folder cannot have a method")]
    FolderWithMethod {
        /// Offending item.
        id: String,
    },

    /// A folder carries a path.
    #[error("item {id}: folder cannot have a path")]
    FolderWithPath {
        /// Offending item.
        id: String,
    },

    /// An item lists itself as a child.
    #[error("circular reference detected: item '{id}' references itself")]
    SelfReference {
        /// Offending item.
        id: String,
    },

    /// An item not referenced by any folder is not a folder.
    #[error("root level item '{id}' must be a folder")]
    RootNotFolder {
        /// Offending item.
        id: String,
    },

    /// A child id does not exist in the value map.
    #[error("child reference '{child}' of item '{parent}' does not exist")]
    MissingReference {
        /// The folder holding the dangling reference.
        parent: String,
        /// The id that could not be resolved.
        child: String,
    },

    /// Folders are nested deeper than allowed.
    #[error("folder '{id}' exceeds maximum nesting depth of {max} levels")]
    MaxDepthExceeded {
        /// The folder that would sit too deep.
        id: String,
        /// The configured maximum.
        max: usize,
    },

    /// A reference cycle spanning more than one item.
    #[error("circular reference detected: item '{id}' is its own ancestor")]
    Cycle {
        /// An item on the cycle.
        id: String,
    },

    /// The root ordering names something other than an existing root item.
    #[error("root order entry '{id}' is not a root item")]
    InvalidRootOrder {
        /// Offending entry.
        id: String,
    },

    /// The root ordering lists the same id twice.
    #[error("root order entry '{id}' appears more than once")]
    DuplicateRootOrder {
        /// Offending entry.
        id: String,
    },

    /// A preference value is outside its accepted range.
    #[error("{field} must be between {min} and {max} (found {found})")]
    OutOfRange {
        /// Name of the field.
        field: &'static str,
        /// Lower bound (inclusive).
        min: u32,
        /// Upper bound (inclusive).
        max: u32,
        /// The rejected value.
        found: u32,
    },
}

impl ValidationError {
    /// Short machine-readable name of the violated rule.
    #[must_use]
    pub const fn rule(&self) -> &'static str {
        match self {
            Self::InvalidVersion { .. } => "version",
            Self::EmptyId => "empty_id",
            Self::EmptyName { .. } => "name_required",
            Self::MissingMethod { .. } => "request_method_required",
            Self::UnknownMethod { .. } => "http_method",
            Self::MissingPath { .. } => "request_path_required",
            Self::RequestWithChildren { .. } => "request_children_forbidden",
            Self::FolderWithMethod { .. } => "folder_method_forbidden",
            Self::FolderWithPath { .. } => "folder_path_forbidden",
            Self::SelfReference { .. } | Self::Cycle { .. } => "circular_reference",
            Self::RootNotFolder { .. } => "root_must_be_folder",
            Self::MissingReference { .. } => "missing_reference",
            Self::MaxDepthExceeded { .. } => "max_depth",
            Self::InvalidRootOrder { .. } | Self::DuplicateRootOrder { .. } => "root_order",
            Self::OutOfRange { .. } => "out_of_range",
        }
    }

    /// The item the violation was found on, if the rule is item-scoped.
    #[must_use]
    pub fn item_id(&self) -> Option<&str> {
        match self {
            Self::EmptyName { id }
            | Self::MissingMethod { id }
            | Self::UnknownMethod { id, .. }
            | Self::MissingPath { id }
            | Self::RequestWithChildren { id }
            | Self::FolderWithMethod { id }
            | Self::FolderWithPath { id }
            | Self::SelfReference { id }
            | Self::RootNotFolder { id }
            | Self::MaxDepthExceeded { id, .. }
            | Self::Cycle { id }
            | Self::InvalidRootOrder { id }
            | Self::DuplicateRootOrder { id } => Some(id),
            Self::MissingReference { parent, .. } => Some(parent),
            Self::InvalidVersion { .. } | Self::EmptyId | Self::OutOfRange { .. } => None,
        }
    }

    /// Returns true for either flavour of circular reference.
    #[must_use]
    pub const fn is_circular_reference(&self) -> bool {
        matches!(self, Self::SelfReference { .. } | Self::Cycle { .. })
    }
}

/// Failure while upgrading a stored document to the current schema.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum MigrationError {
    /// The stored version has no known migration path.
    #[error("unknown schema version {found} (current is {current})")]
    UnknownVersion {
        /// Version found on disk.
        found: u32,
        /// Version this build understands.
        current: u32,
    },
}

/// Result type alias for validation.
pub type ValidationResult<T = ()> = Result<T, ValidationError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rule_and_item_are_reported() {
        let err = ValidationError::MaxDepthExceeded {
            id: "f4".to_string(),
            max: 3,
        };
        assert_eq!(err.rule(), "max_depth");
        assert_eq!(err.item_id(), Some("f4"));
    }

    #[test]
    fn test_self_reference_message() {
        let err = ValidationError::SelfReference {
            id: "id1".to_string(),
        };
        assert!(err.is_circular_reference());
        assert_eq!(
            err.to_string(),
            "circular reference detected: item 'id1' references itself"
        );
    }
}
