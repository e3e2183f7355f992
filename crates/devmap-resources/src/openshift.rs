//! OpenShift resources: ImageStream, BuildConfig, Route
//!
//! The BuildConfig builds the Git source with its Dockerfile and publishes the
//! result into the ImageStream tag described by [`ImageStreamTagRef`]; Routes
//! expose the generated Service outside the cluster.

use std::fmt;

use devmap_common::{HasApiResource, ObjectMeta};
use serde::{Deserialize, Serialize};

use crate::k8s::EnvVar;

// =============================================================================
// ImageStream
// =============================================================================

/// Reference to one tag of an image stream (`<stream>:<tag>`)
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct ImageStreamTagRef {
    /// Image stream name
    pub stream: String,
    /// Tag within the stream
    pub tag: String,
}

impl ImageStreamTagRef {
    /// Create a tag reference
    pub fn new(stream: impl Into<String>, tag: impl Into<String>) -> Self {
        Self {
            stream: stream.into(),
            tag: tag.into(),
        }
    }
}

impl fmt::Display for ImageStreamTagRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.stream, self.tag)
    }
}

/// OpenShift ImageStream
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct ImageStream {
    /// API version
    #[serde(default = "ImageStream::default_api_version")]
    pub api_version: String,
    /// Kind
    #[serde(default = "ImageStream::default_kind")]
    pub kind: String,
    /// Metadata
    pub metadata: ObjectMeta,
    /// Spec
    pub spec: ImageStreamSpec,
}

impl HasApiResource for ImageStream {
    const API_VERSION: &'static str = "image.openshift.io/v1";
    const KIND: &'static str = "ImageStream";
}

impl_api_defaults!(ImageStream);

/// ImageStream spec
#[derive(Clone, Debug, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct ImageStreamSpec {
    /// Whether local name lookup is enabled for this stream
    pub lookup_policy: LookupPolicy,
    /// Declared tags
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub tags: Vec<TagReference>,
}

/// ImageStream lookup policy
#[derive(Clone, Debug, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct LookupPolicy {
    /// Resolve short image names in the namespace against this stream
    pub local: bool,
}

/// A tag declared on an image stream
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq)]
pub struct TagReference {
    /// Tag name
    pub name: String,
}

/// Normalized inputs for [`ImageStream::from_params`]
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ImageStreamParams {
    /// Shared metadata; `metadata.name` must equal `tag.stream`
    pub metadata: ObjectMeta,
    /// The tag builds publish into
    pub tag: ImageStreamTagRef,
}

impl ImageStream {
    /// Build an ImageStream declaring the tag builds publish into
    pub fn from_params(params: ImageStreamParams) -> Self {
        Self {
            api_version: Self::default_api_version(),
            kind: Self::default_kind(),
            metadata: params.metadata,
            spec: ImageStreamSpec {
                lookup_policy: LookupPolicy { local: false },
                tags: vec![TagReference {
                    name: params.tag.tag,
                }],
            },
        }
    }

    /// The `<stream>:<tag>` identity of this stream's first declared tag
    pub fn tag_ref(&self) -> Option<ImageStreamTagRef> {
        self.spec
            .tags
            .first()
            .map(|t| ImageStreamTagRef::new(&self.metadata.name, &t.name))
    }
}

// =============================================================================
// BuildConfig
// =============================================================================

/// OpenShift BuildConfig
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct BuildConfig {
    /// API version
    #[serde(default = "BuildConfig::default_api_version")]
    pub api_version: String,
    /// Kind
    #[serde(default = "BuildConfig::default_kind")]
    pub kind: String,
    /// Metadata
    pub metadata: ObjectMeta,
    /// Spec
    pub spec: BuildConfigSpec,
}

impl HasApiResource for BuildConfig {
    const API_VERSION: &'static str = "build.openshift.io/v1";
    const KIND: &'static str = "BuildConfig";
}

impl_api_defaults!(BuildConfig);

/// BuildConfig spec
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq)]
pub struct BuildConfigSpec {
    /// Where the build input comes from
    pub source: BuildSource,
    /// How the image is built
    pub strategy: BuildStrategy,
    /// Where the built image is pushed
    pub output: BuildOutput,
}

/// Build source (Git only)
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct BuildSource {
    /// Source type
    #[serde(rename = "type")]
    pub type_: String,
    /// Git repository
    pub git: GitBuildSource,
    /// Sub-directory of the repository to build from
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub context_dir: String,
}

/// Git repository to build from
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq)]
pub struct GitBuildSource {
    /// Repository URL
    pub uri: String,
    /// Branch, tag, or commit
    #[serde(rename = "ref", default, skip_serializing_if = "String::is_empty")]
    pub ref_: String,
}

/// Build strategy (Docker only)
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct BuildStrategy {
    /// Strategy type
    #[serde(rename = "type")]
    pub type_: String,
    /// Docker strategy options
    pub docker_strategy: DockerBuildStrategy,
}

/// Options for a Dockerfile build
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct DockerBuildStrategy {
    /// Path of the Dockerfile relative to the context directory
    pub dockerfile_path: String,
    /// Environment for the build
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub env: Vec<EnvVar>,
}

/// Build output
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq)]
pub struct BuildOutput {
    /// Push target
    pub to: ObjectReference,
}

/// Reference to another object by kind and name
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq)]
pub struct ObjectReference {
    /// Kind of the referenced object
    pub kind: String,
    /// Name of the referenced object
    pub name: String,
}

/// Git coordinates for a build
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct GitSource {
    /// Repository URL
    pub url: String,
    /// Branch, tag, or commit
    pub git_ref: String,
    /// Context directory within the repository
    pub context_dir: String,
}

/// Normalized inputs for [`BuildConfig::from_params`]
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct BuildConfigParams {
    /// Shared metadata for the BuildConfig object
    pub metadata: ObjectMeta,
    /// Git source
    pub git: GitSource,
    /// Dockerfile path
    pub dockerfile_path: String,
    /// Build environment
    pub env: Vec<EnvVar>,
    /// Image stream tag the build publishes into
    pub output: ImageStreamTagRef,
}

impl BuildConfig {
    /// Build a Docker-strategy BuildConfig from a Git source
    pub fn from_params(params: BuildConfigParams) -> Self {
        Self {
            api_version: Self::default_api_version(),
            kind: Self::default_kind(),
            metadata: params.metadata,
            spec: BuildConfigSpec {
                source: BuildSource {
                    type_: "Git".to_string(),
                    git: GitBuildSource {
                        uri: params.git.url,
                        ref_: params.git.git_ref,
                    },
                    context_dir: params.git.context_dir,
                },
                strategy: BuildStrategy {
                    type_: "Docker".to_string(),
                    docker_strategy: DockerBuildStrategy {
                        dockerfile_path: params.dockerfile_path,
                        env: params.env,
                    },
                },
                output: BuildOutput {
                    to: ObjectReference {
                        kind: "ImageStreamTag".to_string(),
                        name: params.output.to_string(),
                    },
                },
            },
        }
    }

    /// Name of the `ImageStreamTag` this build pushes to
    pub fn output_tag(&self) -> &str {
        &self.spec.output.to.name
    }
}

// =============================================================================
// Route
// =============================================================================

/// OpenShift Route
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct Route {
    /// API version
    #[serde(default = "Route::default_api_version")]
    pub api_version: String,
    /// Kind
    #[serde(default = "Route::default_kind")]
    pub kind: String,
    /// Metadata
    pub metadata: ObjectMeta,
    /// Spec
    pub spec: RouteSpec,
}

impl HasApiResource for Route {
    const API_VERSION: &'static str = "route.openshift.io/v1";
    const KIND: &'static str = "Route";
}

impl_api_defaults!(Route);

/// Route spec
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq)]
pub struct RouteSpec {
    /// Public hostname; left to the router when unset
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub host: Option<String>,
    /// Path prefix
    pub path: String,
    /// Backend service
    pub to: RouteTargetReference,
    /// Backend port
    pub port: RoutePort,
    /// TLS settings for secure routes
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tls: Option<TlsConfig>,
}

/// Backend reference of a route
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq)]
pub struct RouteTargetReference {
    /// Always `Service`
    pub kind: String,
    /// Service name
    pub name: String,
    /// Relative weight
    pub weight: u32,
}

/// Backend port of a route
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct RoutePort {
    /// Target port on the service's pods
    pub target_port: u16,
}

/// Route TLS configuration
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct TlsConfig {
    /// Where TLS terminates (edge, passthrough, reencrypt)
    pub termination: String,
    /// What to do with plain HTTP requests (Allow, Redirect, None)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub insecure_edge_termination_policy: Option<String>,
}

impl TlsConfig {
    /// Edge termination that redirects plain HTTP to HTTPS
    pub fn edge_redirect() -> Self {
        Self {
            termination: "edge".to_string(),
            insecure_edge_termination_policy: Some("Redirect".to_string()),
        }
    }
}

/// Normalized inputs for [`Route::from_params`]
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct RouteParams {
    /// Metadata for the Route object
    pub metadata: ObjectMeta,
    /// Service the route forwards to
    pub service_name: String,
    /// Target port on the service's pods
    pub target_port: u16,
    /// Path prefix
    pub path: String,
    /// Terminate TLS at the router
    pub secure: bool,
    /// Public hostname
    pub host: Option<String>,
}

impl Route {
    /// Build a Route to a Service port
    pub fn from_params(params: RouteParams) -> Self {
        Self {
            api_version: Self::default_api_version(),
            kind: Self::default_kind(),
            metadata: params.metadata,
            spec: RouteSpec {
                host: params.host,
                path: params.path,
                to: RouteTargetReference {
                    kind: "Service".to_string(),
                    name: params.service_name,
                    weight: 100,
                },
                port: RoutePort {
                    target_port: params.target_port,
                },
                tls: params.secure.then(TlsConfig::edge_redirect),
            },
        }
    }
}
