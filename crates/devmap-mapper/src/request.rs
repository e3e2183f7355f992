//! Caller-supplied metadata for one mapping

use devmap_resources::k8s::EnvVar;
use devmap_resources::openshift::GitSource;

use crate::labels::Labels;

/// Everything the caller supplies besides the devfile itself
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct RequestMetadata {
    /// Shared name of every generated resource
    pub name: String,
    /// Namespace of every generated resource
    pub namespace: String,
    /// User labels, applied to every resource and the pod template
    pub labels: Labels,
    /// Caller defaults merged beneath `labels`
    pub default_labels: Labels,
    /// Pod-selector labels; become the Service selector
    pub pod_labels: Labels,
    /// Annotations applied to every resource and the pod template
    pub annotations: Labels,
    /// Source repository for the build
    pub git: GitSource,
    /// Build environment
    pub build_env: Vec<EnvVar>,
    /// Route overrides
    pub route: Option<RouteSpec>,
}

/// Caller route overrides
///
/// `path` and `target_port` only apply when the devfile declares no
/// exposable endpoint; `hostname` applies to every route.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct RouteSpec {
    /// Path prefix
    pub path: Option<String>,
    /// Public hostname
    pub hostname: Option<String>,
    /// Port to route to when no endpoint is exposable
    pub target_port: Option<u16>,
    /// Terminate TLS at the router
    pub secure: bool,
}
