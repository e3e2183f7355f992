//! Deployment and Service resources
//!
//! The Deployment runs every container the devfile declares; the Service
//! exposes the endpoint ports of those containers to the rest of the cluster
//! and is the backend every generated Route points at.

use std::collections::BTreeMap;

use devmap_common::{HasApiResource, ObjectMeta};
use serde::{Deserialize, Serialize};

use crate::k8s::{Container, LabelSelector};

// =============================================================================
// Deployment
// =============================================================================

/// Kubernetes Deployment
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct Deployment {
    /// API version
    #[serde(default = "Deployment::default_api_version")]
    pub api_version: String,
    /// Kind
    #[serde(default = "Deployment::default_kind")]
    pub kind: String,
    /// Metadata
    pub metadata: ObjectMeta,
    /// Spec
    pub spec: DeploymentSpec,
}

impl HasApiResource for Deployment {
    const API_VERSION: &'static str = "apps/v1";
    const KIND: &'static str = "Deployment";
}

impl_api_defaults!(Deployment);

/// Deployment spec
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct DeploymentSpec {
    /// Number of replicas
    pub replicas: u32,
    /// Label selector
    pub selector: LabelSelector,
    /// Pod template
    pub template: PodTemplateSpec,
    /// Deployment strategy
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub strategy: Option<DeploymentStrategy>,
}

/// Deployment strategy
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq)]
pub struct DeploymentStrategy {
    /// Strategy type: RollingUpdate or Recreate
    #[serde(rename = "type")]
    pub type_: String,
}

/// Pod template spec
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq)]
pub struct PodTemplateSpec {
    /// Pod metadata
    pub metadata: PodMeta,
    /// Pod spec
    pub spec: PodSpec,
}

/// Pod metadata (subset of ObjectMeta)
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq)]
pub struct PodMeta {
    /// Labels
    pub labels: BTreeMap<String, String>,
    /// Annotations
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub annotations: BTreeMap<String, String>,
}

/// Pod spec
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq)]
pub struct PodSpec {
    /// Containers
    pub containers: Vec<Container>,
}

/// Normalized inputs for [`Deployment::from_params`]
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct DeploymentParams {
    /// Shared metadata for the Deployment object
    pub metadata: ObjectMeta,
    /// Containers built from the devfile
    pub containers: Vec<Container>,
    /// Pod selector labels
    pub selector: BTreeMap<String, String>,
    /// Pod template labels (must contain the selector)
    pub template_labels: BTreeMap<String, String>,
    /// Replica count
    pub replicas: u32,
}

impl Deployment {
    /// Build a Deployment.
    ///
    /// Devfile workloads mount source volumes that can't be shared across
    /// revisions, so the strategy is always `Recreate`.
    pub fn from_params(params: DeploymentParams) -> Self {
        let annotations = params.metadata.annotations.clone();
        Self {
            api_version: Self::default_api_version(),
            kind: Self::default_kind(),
            metadata: params.metadata,
            spec: DeploymentSpec {
                replicas: params.replicas,
                selector: LabelSelector {
                    match_labels: params.selector,
                },
                template: PodTemplateSpec {
                    metadata: PodMeta {
                        labels: params.template_labels,
                        annotations,
                    },
                    spec: PodSpec {
                        containers: params.containers,
                    },
                },
                strategy: Some(DeploymentStrategy {
                    type_: "Recreate".to_string(),
                }),
            },
        }
    }
}

// =============================================================================
// Service
// =============================================================================

/// Kubernetes Service
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct Service {
    /// API version
    #[serde(default = "Service::default_api_version")]
    pub api_version: String,
    /// Kind
    #[serde(default = "Service::default_kind")]
    pub kind: String,
    /// Metadata
    pub metadata: ObjectMeta,
    /// Spec
    pub spec: ServiceSpec,
}

impl HasApiResource for Service {
    const API_VERSION: &'static str = "v1";
    const KIND: &'static str = "Service";
}

impl_api_defaults!(Service);

/// Service spec
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct ServiceSpec {
    /// Selector
    pub selector: BTreeMap<String, String>,
    /// Ports
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub ports: Vec<ServicePort>,
}

/// Service port
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct ServicePort {
    /// Port name
    pub name: String,
    /// Port number
    pub port: u16,
    /// Target port
    pub target_port: u16,
    /// `TCP` or `UDP`; the API server defaults to `TCP`
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub protocol: Option<String>,
}

impl ServicePort {
    /// A TCP port that forwards `port` to the same container port, named `port-<n>`
    pub fn passthrough(port: u16) -> Self {
        Self::passthrough_with_protocol(port, "TCP")
    }

    /// Like [`ServicePort::passthrough`] with an explicit transport protocol
    pub fn passthrough_with_protocol(port: u16, protocol: &str) -> Self {
        Self {
            name: format!("port-{port}"),
            port,
            target_port: port,
            protocol: Some(protocol.to_string()),
        }
    }
}

/// Normalized inputs for [`Service::from_params`]
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ServiceParams {
    /// Shared metadata for the Service object
    pub metadata: ObjectMeta,
    /// Pod selector
    pub selector: BTreeMap<String, String>,
    /// Exposed ports
    pub ports: Vec<ServicePort>,
}

impl Service {
    /// Build a Service
    pub fn from_params(params: ServiceParams) -> Self {
        Self {
            api_version: Self::default_api_version(),
            kind: Self::default_kind(),
            metadata: params.metadata,
            spec: ServiceSpec {
                selector: params.selector,
                ports: params.ports,
            },
        }
    }
}
