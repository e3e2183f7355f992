//! Devfile support for devmap
//!
//! - [`types`]: the parsed devfile model the mapper reads
//! - [`parser`]: [`DevfileParser`] turns devfile YAML into a validated [`Devfile`]
//! - [`containers`]: [`ContainerBuilder`] turns container components into
//!   Kubernetes containers

#![deny(missing_docs)]

pub mod containers;
pub mod error;
pub mod parser;
pub mod types;

pub use containers::{ContainerBuilder, DevfileContainerBuilder};
pub use error::{ContainerBuildError, DevfileError};
pub use parser::{DevfileParser, YamlDevfileParser};
pub use types::{
    Component, ComponentKind, ContainerComponent, Devfile, Endpoint, EndpointExposure,
    NamedContainer, PRIMARY_COMPONENT_ATTRIBUTE,
};
