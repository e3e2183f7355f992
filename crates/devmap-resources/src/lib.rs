//! Resource construction for devmap
//!
//! Typed descriptors for the platform resources a devfile maps to, each built
//! from a normalized parameter struct:
//!
//! - [`openshift::ImageStream`] from [`openshift::ImageStreamParams`]
//! - [`openshift::BuildConfig`] from [`openshift::BuildConfigParams`]
//! - [`workload::Deployment`] from [`workload::DeploymentParams`]
//! - [`workload::Service`] from [`workload::ServiceParams`]
//! - [`openshift::Route`] from [`openshift::RouteParams`]
//!
//! Construction never fails: parameters are validated by the caller.

#![deny(missing_docs)]

/// Implement `default_api_version()`/`default_kind()` for a [`HasApiResource`]
/// type so serde can fill them in when a document omits them.
///
/// [`HasApiResource`]: devmap_common::HasApiResource
macro_rules! impl_api_defaults {
    ($type:ty) => {
        impl $type {
            fn default_api_version() -> String {
                <Self as devmap_common::HasApiResource>::API_VERSION.to_string()
            }
            fn default_kind() -> String {
                <Self as devmap_common::HasApiResource>::KIND.to_string()
            }
        }
    };
}

pub mod k8s;
pub mod openshift;
pub mod workload;

pub use openshift::{BuildConfig, ImageStream, ImageStreamTagRef, Route};
pub use workload::{Deployment, Service};
