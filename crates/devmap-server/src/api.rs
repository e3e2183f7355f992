//! Request and response bodies of `POST /api/devfile`

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use devmap_mapper::{RequestMetadata, ResourceBundle, RouteSpec};
use devmap_resources::k8s::EnvVar;
use devmap_resources::openshift::GitSource;

use crate::error::ApiError;

/// Body of `POST /api/devfile`
#[derive(Clone, Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DevfileRequest {
    /// Shared resource name
    pub name: String,
    /// Target namespace; the server default when absent
    #[serde(default)]
    pub namespace: Option<String>,
    /// Git source of the build
    #[serde(default)]
    pub git: GitPayload,
    /// Where the devfile comes from
    pub devfile: DevfileSource,
    /// User labels
    #[serde(default)]
    pub labels: BTreeMap<String, String>,
    /// Default labels, overridden by `labels`
    #[serde(default)]
    pub default_labels: BTreeMap<String, String>,
    /// Annotations
    #[serde(default)]
    pub annotations: BTreeMap<String, String>,
    /// Pod labels, also the service selector
    #[serde(default)]
    pub pod_labels: BTreeMap<String, String>,
    /// Route overrides
    #[serde(default)]
    pub route_spec: Option<RouteSpecPayload>,
    /// Build environment
    #[serde(default)]
    pub build_env: Vec<EnvVar>,
}

/// Git coordinates as sent by clients
#[derive(Clone, Debug, Default, Deserialize)]
pub struct GitPayload {
    /// Repository URL
    #[serde(default)]
    pub url: String,
    /// Branch, tag, or commit
    #[serde(default, rename = "ref")]
    pub git_ref: String,
    /// Context directory
    #[serde(default)]
    pub dir: String,
}

/// Inline devfile content or a path under the configured devfile root
#[derive(Clone, Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DevfileSource {
    /// Devfile YAML
    #[serde(default)]
    pub devfile_content: Option<String>,
    /// Path relative to the devfile root
    #[serde(default)]
    pub devfile_path: Option<String>,
}

/// A resolved devfile source
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum DevfileInput {
    /// Inline YAML
    Content(String),
    /// Relative path to read
    Path(String),
}

impl DevfileSource {
    /// Exactly one of content or path must be given
    pub fn resolve(self) -> Result<DevfileInput, ApiError> {
        let content = self.devfile_content.filter(|c| !c.trim().is_empty());
        let path = self.devfile_path.filter(|p| !p.trim().is_empty());
        match (content, path) {
            (Some(content), None) => Ok(DevfileInput::Content(content)),
            (None, Some(path)) => Ok(DevfileInput::Path(path)),
            (Some(_), Some(_)) => Err(ApiError::bad_request(
                "devfile: set only one of devfileContent and devfilePath",
            )),
            (None, None) => Err(ApiError::bad_request(
                "devfile: one of devfileContent or devfilePath is required",
            )),
        }
    }
}

/// Route overrides as sent by clients
#[derive(Clone, Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RouteSpecPayload {
    /// Path prefix
    #[serde(default)]
    pub path: Option<String>,
    /// Public hostname
    #[serde(default)]
    pub hostname: Option<String>,
    /// Port to route to when the devfile exposes none
    #[serde(default)]
    pub target_port: Option<u16>,
    /// Terminate TLS at the router
    #[serde(default)]
    pub secure: bool,
}

impl DevfileRequest {
    /// Split into the mapper's request metadata and the devfile source
    pub fn into_parts(self, default_namespace: &str) -> (RequestMetadata, DevfileSource) {
        let namespace = self
            .namespace
            .filter(|ns| !ns.is_empty())
            .unwrap_or_else(|| default_namespace.to_string());

        let metadata = RequestMetadata {
            name: self.name,
            namespace,
            labels: self.labels,
            default_labels: self.default_labels,
            pod_labels: self.pod_labels,
            annotations: self.annotations,
            git: GitSource {
                url: self.git.url,
                git_ref: self.git.git_ref,
                context_dir: self.git.dir,
            },
            build_env: self.build_env,
            route: self.route_spec.map(|r| RouteSpec {
                path: r.path,
                hostname: r.hostname.filter(|h| !h.is_empty()),
                target_port: r.target_port,
                secure: r.secure,
            }),
        };
        (metadata, self.devfile)
    }
}

/// Body of a successful response
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct DevfileResponse {
    /// The generated resources
    pub devfile_resources: ResourceBundle,
}
