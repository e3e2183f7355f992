//! Devfile-to-resource mapping engine
//!
//! Given a parsed [`Devfile`](devmap_devfile::Devfile) and the caller's
//! [`RequestMetadata`], [`DevfileMapper`] produces a [`ResourceBundle`]: an
//! ImageStream, a BuildConfig, a Deployment, a Service, and the Routes for
//! the primary component's public endpoints.

#![deny(missing_docs)]

pub mod bundle;
pub mod endpoints;
pub mod error;
pub mod labels;
pub mod mapper;
pub mod params;
pub mod request;

pub use bundle::ResourceBundle;
pub use endpoints::{resolve_routes, RoutePolicy, RouteTarget};
pub use error::{MappingError, ResourceKind};
pub use labels::{merge, merge_all, Labels};
pub use mapper::{select_primary, DevfileMapper};
pub use request::{RequestMetadata, RouteSpec};

/// Map a devfile with the default container builder, route policy, and
/// Dockerfile path.
pub fn map_devfile(
    devfile: &devmap_devfile::Devfile,
    request: &RequestMetadata,
) -> Result<ResourceBundle, MappingError> {
    DevfileMapper::new(devfile, request).map()
}
