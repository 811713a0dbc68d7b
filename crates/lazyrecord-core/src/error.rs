//! Error types for LazyRecord.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::result::Validations;
use crate::value::Value;

/// Result alias used throughout the workspace.
pub type Result<T> = std::result::Result<T, Error>;

/// A right checked through the permission hook before an operation runs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Right {
    Create,
    Load,
    Update,
    Delete,
}

impl Right {
    pub const fn as_str(&self) -> &'static str {
        match self {
            Right::Create => "create",
            Right::Load => "load",
            Right::Update => "update",
            Right::Delete => "delete",
        }
    }
}

impl fmt::Display for Right {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// The error taxonomy.
///
/// Lifecycle operations never return these directly; they fold them into an
/// [`OperationResult`](crate::OperationResult) whose message is the `Display` text.
/// Relationship resolution and schema construction surface them as hard errors.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum Error {
    #[error("Empty arguments")]
    EmptyInput,

    #[error("Permission denied. Can not {right} record.")]
    PermissionDenied { right: Right },

    #[error("Validation failed.")]
    ValidationFailed { outcomes: Validations },

    /// The record has no primary key value to act on.
    #[error("Record is not loaded, {detail}")]
    NotLoaded { detail: &'static str },

    #[error("The value of primary key is undefined.")]
    PrimaryKeyUndefined,

    /// A load matched no row.
    #[error("Data load failed.")]
    LoadFailed,

    #[error("Type constraint violation on column {column}: expected {expected}, got {value:?}")]
    TypeConstraintViolation {
        column: String,
        value: Value,
        expected: String,
    },

    #[error("Unsupported validator on column {column}: {detail}")]
    UnsupportedValidatorShape { column: String, detail: String },

    /// A fault raised by the connection or driver.
    #[error("{message}")]
    Storage { message: String },

    #[error("Relationship {relation} is misconfigured: {message}")]
    RelationshipConfiguration { relation: String, message: String },

    /// A junction row could not be written while creating through a many-to-many relation.
    #[error("{relation} create failed.")]
    JunctionCreate { relation: String, message: String },

    #[error("Invalid schema {schema}: {message}")]
    InvalidSchema { schema: String, message: String },

    #[error("Schema {0} not found.")]
    SchemaNotFound(String),

    #[error("data source {0} not found.")]
    DataSourceNotFound(String),

    #[error("Serialization failed: {0}")]
    Serialization(String),
}

impl Error {
    /// Shorthand for a storage fault.
    pub fn storage(message: impl Into<String>) -> Self {
        Error::Storage {
            message: message.into(),
        }
    }

    pub fn relationship(relation: impl Into<String>, message: impl Into<String>) -> Self {
        Error::RelationshipConfiguration {
            relation: relation.into(),
            message: message.into(),
        }
    }

    pub fn invalid_schema(schema: impl Into<String>, message: impl Into<String>) -> Self {
        Error::InvalidSchema {
            schema: schema.into(),
            message: message.into(),
        }
    }

    /// Whether this error indicates a programming or configuration mistake rather than
    /// a per-call failure.
    pub fn is_configuration(&self) -> bool {
        matches!(
            self,
            Error::UnsupportedValidatorShape { .. }
                | Error::RelationshipConfiguration { .. }
                | Error::InvalidSchema { .. }
                | Error::SchemaNotFound(_)
                | Error::DataSourceNotFound(_)
        )
    }
}

impl From<serde_json::Error> for Error {
    fn from(err: serde_json::Error) -> Self {
        Error::Serialization(err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_messages() {
        assert_eq!(Error::EmptyInput.to_string(), "Empty arguments");
        assert_eq!(
            Error::PermissionDenied {
                right: Right::Create
            }
            .to_string(),
            "Permission denied. Can not create record."
        );
        assert_eq!(
            Error::NotLoaded {
                detail: "Record delete failed."
            }
            .to_string(),
            "Record is not loaded, Record delete failed."
        );
        assert_eq!(Error::LoadFailed.to_string(), "Data load failed.");
        assert_eq!(
            Error::DataSourceNotFound("master".into()).to_string(),
            "data source master not found."
        );
        assert_eq!(
            Error::JunctionCreate {
                relation: "book_tags".into(),
                message: "boom".into()
            }
            .to_string(),
            "book_tags create failed."
        );
    }

    #[test]
    fn test_configuration_classification() {
        assert!(Error::relationship("tags", "missing").is_configuration());
        assert!(!Error::storage("disk full").is_configuration());
        assert!(!Error::EmptyInput.is_configuration());
    }
}
