//! Errors raised while parsing devfiles and building containers

use thiserror::Error;

/// Error parsing or validating devfile text
#[derive(Debug, Error)]
pub enum DevfileError {
    /// Text is not a single well-formed YAML document
    #[error("devfile is not valid YAML: {0}")]
    Yaml(String),

    /// YAML does not have the shape of a devfile
    #[error("devfile does not match the devfile schema: {message}")]
    Schema {
        /// What did not match
        message: String,
    },

    /// Devfile is well-formed but violates a devfile rule
    #[error("invalid devfile{}: {message}", .field.as_deref().map(|f| format!(" at {f}")).unwrap_or_default())]
    Validation {
        /// What is wrong
        message: String,
        /// Path of the offending field (e.g. `components[0].name`)
        field: Option<String>,
    },
}

impl DevfileError {
    /// Create a validation error for a specific field
    pub fn invalid(field: impl Into<String>, msg: impl Into<String>) -> Self {
        Self::Validation {
            message: msg.into(),
            field: Some(field.into()),
        }
    }
}

impl From<devmap_common::Error> for DevfileError {
    fn from(err: devmap_common::Error) -> Self {
        match err {
            devmap_common::Error::Yaml(e) => Self::Yaml(e.to_string()),
            devmap_common::Error::Serialization { message } => Self::Schema { message },
            devmap_common::Error::Validation { message, field } => {
                Self::Validation { message, field }
            }
        }
    }
}

/// Error converting container components into Kubernetes containers
#[derive(Debug, Error)]
pub enum ContainerBuildError {
    /// The devfile declares no container component
    #[error("devfile declares no container components")]
    NoContainers,

    /// A memory limit is not a Kubernetes quantity
    #[error("component {component}: memory limit '{value}' is not a valid quantity")]
    InvalidMemoryLimit {
        /// Component name
        component: String,
        /// Offending value
        value: String,
    },

    /// An environment variable has no name
    #[error("component {component}: environment variable name must not be empty")]
    EmptyEnvName {
        /// Component name
        component: String,
    },
}
