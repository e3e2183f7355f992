//! Mapping errors
//!
//! Every variant names the [`ResourceKind`] (stage) that failed so the
//! boundary can log and report it.

use std::fmt;

use thiserror::Error;

use devmap_devfile::{ContainerBuildError, DevfileError};

/// Mapping stage, named after the resource it produces
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum ResourceKind {
    /// Devfile parsing, before mapping starts
    Devfile,
    /// Request name, namespace, and labels
    Metadata,
    /// Choosing the primary container component
    Component,
    /// ImageStream
    ImageStream,
    /// BuildConfig
    BuildConfig,
    /// Deployment
    Deployment,
    /// Service
    Service,
    /// Route
    Route,
}

impl ResourceKind {
    /// Stage name as used in messages and logs
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Devfile => "devfile",
            Self::Metadata => "metadata",
            Self::Component => "component",
            Self::ImageStream => "imagestream",
            Self::BuildConfig => "buildconfig",
            Self::Deployment => "deployment",
            Self::Service => "service",
            Self::Route => "route",
        }
    }
}

impl fmt::Display for ResourceKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Why a devfile could not be mapped to resources
#[derive(Debug, Error)]
pub enum MappingError {
    /// The devfile could not be parsed; the parser's message is kept as is
    #[error("devfile: {0}")]
    ParseFailure(#[from] DevfileError),

    /// Not exactly one primary container component
    #[error(
        "component: devfile declares {count} container components ({}) and {primaries} are marked primary; \
         mark exactly one with attribute `devmap.io/primary: true`",
        .components.join(", ")
    )]
    UnsupportedComponentCount {
        /// Number of container components
        count: usize,
        /// Number marked primary
        primaries: usize,
        /// Container component names
        components: Vec<String>,
    },

    /// A route was required but nothing can be exposed
    #[error("{resource}: no exposable endpoint: {message}")]
    NoExposableEndpoint {
        /// Failing stage
        resource: ResourceKind,
        /// What was missing
        message: String,
    },

    /// The container builder failed
    #[error("{resource}: container build failed: {source}")]
    ContainerBuildFailure {
        /// Failing stage
        resource: ResourceKind,
        /// Builder error
        #[source]
        source: ContainerBuildError,
    },

    /// Generated resources would not be consistent with each other
    #[error("{resource}: invariant violated: {message}")]
    InvariantViolation {
        /// Failing stage
        resource: ResourceKind,
        /// Which invariant
        message: String,
    },
}

impl MappingError {
    /// Create an invariant violation for a stage
    pub fn invariant(resource: ResourceKind, msg: impl Into<String>) -> Self {
        Self::InvariantViolation {
            resource,
            message: msg.into(),
        }
    }

    /// Create a no-exposable-endpoint error for a stage
    pub fn no_exposable_endpoint(resource: ResourceKind, msg: impl Into<String>) -> Self {
        Self::NoExposableEndpoint {
            resource,
            message: msg.into(),
        }
    }

    /// The stage that failed
    pub fn resource(&self) -> ResourceKind {
        match self {
            Self::ParseFailure(_) => ResourceKind::Devfile,
            Self::UnsupportedComponentCount { .. } => ResourceKind::Component,
            Self::NoExposableEndpoint { resource, .. }
            | Self::ContainerBuildFailure { resource, .. }
            | Self::InvariantViolation { resource, .. } => *resource,
        }
    }

    /// Short machine-readable reason, in Kubernetes `Status.reason` style
    pub fn reason(&self) -> &'static str {
        match self {
            Self::ParseFailure(_) => "DevfileParseFailure",
            Self::UnsupportedComponentCount { .. } => "UnsupportedComponentCount",
            Self::NoExposableEndpoint { .. } => "NoExposableEndpoint",
            Self::ContainerBuildFailure { .. } => "ContainerBuildFailure",
            Self::InvariantViolation { .. } => "InvariantViolation",
        }
    }
}
