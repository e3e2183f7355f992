//! Common types for devmap: resource metadata, YAML loading, and errors

#![deny(missing_docs)]

pub mod error;
pub mod image;
pub mod meta;
pub mod yaml;

pub use error::Error;
pub use image::ImageReference;
pub use meta::{HasApiResource, ObjectMeta};

/// Result type alias using our custom Error type
pub type Result<T> = std::result::Result<T, Error>;

/// Label key used for the deployment pod selector
pub const LABEL_APP: &str = "app";

/// Standard Kubernetes label marking which tool produced a resource
pub const LABEL_MANAGED_BY: &str = "app.kubernetes.io/managed-by";

/// Value of [`LABEL_MANAGED_BY`] for resources generated by devmap
pub const LABEL_MANAGED_BY_DEVMAP: &str = "devmap";

/// Default Dockerfile path used by generated build configurations
pub const DEFAULT_DOCKERFILE_PATH: &str = "Dockerfile";

/// Image tag used when a reference carries no explicit tag
pub const DEFAULT_IMAGE_TAG: &str = "latest";
