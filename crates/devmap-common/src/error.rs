//! Error types shared across devmap crates

use thiserror::Error;

use crate::yaml::YamlError;

/// Main error type for shared devmap operations
#[derive(Debug, Error)]
pub enum Error {
    /// Input failed validation
    #[error("validation error{}: {message}", .field.as_deref().map(|f| format!(" for {f}")).unwrap_or_default())]
    Validation {
        /// Description of what's invalid
        message: String,
        /// The invalid field path (e.g., "metadata.name")
        field: Option<String>,
    },

    /// Document is not well-formed YAML
    #[error("yaml error: {0}")]
    Yaml(#[from] YamlError),

    /// Document is well-formed but does not match the expected shape
    #[error("serialization error: {message}")]
    Serialization {
        /// Description of what failed
        message: String,
    },
}

impl Error {
    /// Create a validation error with the given message
    pub fn validation(msg: impl Into<String>) -> Self {
        Self::Validation {
            message: msg.into(),
            field: None,
        }
    }

    /// Create a validation error for a specific field
    pub fn validation_for_field(field: impl Into<String>, msg: impl Into<String>) -> Self {
        Self::Validation {
            message: msg.into(),
            field: Some(field.into()),
        }
    }

    /// Create a serialization error with the given message
    pub fn serialization(msg: impl Into<String>) -> Self {
        Self::Serialization {
            message: msg.into(),
        }
    }
}
