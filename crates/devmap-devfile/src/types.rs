//! Parsed devfile model
//!
//! Produced by a [`DevfileParser`](crate::DevfileParser) and read-only from
//! then on. Only container components are modeled in detail; the other
//! component kinds are kept by name so validation can still see them.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Component attribute that marks the primary container when a devfile
/// declares several
pub const PRIMARY_COMPONENT_ATTRIBUTE: &str = "devmap.io/primary";

/// A validated devfile
#[derive(Clone, Debug, PartialEq)]
pub struct Devfile {
    /// Schema version (always `2.x`)
    pub schema_version: String,
    /// `metadata.name`, if declared
    pub name: Option<String>,
    /// Components in declaration order
    pub components: Vec<Component>,
}

impl Devfile {
    /// Container components in declaration order
    pub fn containers(&self) -> impl Iterator<Item = NamedContainer<'_>> {
        self.components.iter().filter_map(|c| match &c.kind {
            ComponentKind::Container(container) => Some(NamedContainer {
                name: &c.name,
                attributes: &c.attributes,
                container,
            }),
            _ => None,
        })
    }

    /// Every endpoint of every container component, in declaration order
    pub fn endpoints(&self) -> impl Iterator<Item = &Endpoint> {
        self.containers().flat_map(|c| c.container.endpoints.iter())
    }
}

/// A devfile component
#[derive(Clone, Debug, PartialEq)]
pub struct Component {
    /// Unique component name
    pub name: String,
    /// Free-form attributes
    pub attributes: BTreeMap<String, Value>,
    /// What kind of component this is
    pub kind: ComponentKind,
}

/// The single kind a component declares
#[derive(Clone, Debug, PartialEq)]
pub enum ComponentKind {
    /// Runtime container
    Container(ContainerComponent),
    /// Inline or referenced Kubernetes manifest
    Kubernetes,
    /// Inline or referenced OpenShift manifest
    Openshift,
    /// Shared volume
    Volume,
    /// Image build definition
    Image,
}

impl ComponentKind {
    /// Devfile key of this kind
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Container(_) => "container",
            Self::Kubernetes => "kubernetes",
            Self::Openshift => "openshift",
            Self::Volume => "volume",
            Self::Image => "image",
        }
    }
}

/// Container component fields
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ContainerComponent {
    /// Image reference
    pub image: String,
    /// Environment variables
    pub env: Vec<(String, String)>,
    /// Command override
    pub command: Vec<String>,
    /// Arguments
    pub args: Vec<String>,
    /// Memory limit as a Kubernetes quantity
    pub memory_limit: Option<String>,
    /// Whether project sources are mounted into the container
    pub mount_sources: bool,
    /// Where project sources are mounted
    pub source_mapping: String,
    /// Declared endpoints
    pub endpoints: Vec<Endpoint>,
}

/// A container component with its identity
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct NamedContainer<'a> {
    /// Component name
    pub name: &'a str,
    /// Component attributes
    pub attributes: &'a BTreeMap<String, Value>,
    /// Container fields
    pub container: &'a ContainerComponent,
}

impl NamedContainer<'_> {
    /// Whether the component is marked primary (`true` or `"true"`)
    pub fn is_primary(&self) -> bool {
        match self.attributes.get(PRIMARY_COMPONENT_ATTRIBUTE) {
            Some(Value::Bool(b)) => *b,
            Some(Value::String(s)) => s.eq_ignore_ascii_case("true"),
            _ => false,
        }
    }
}

/// A network endpoint declared by a container
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Endpoint {
    /// Endpoint name
    pub name: String,
    /// Port the container listens on
    pub target_port: u16,
    /// Scheme, lowercased (`http`, `https`, `ws`, `wss`, `tcp`, `udp`)
    pub protocol: String,
    /// Path, empty when not declared
    pub path: String,
    /// Who can reach the endpoint
    pub exposure: EndpointExposure,
    /// Endpoint requires TLS
    pub secure: bool,
}

impl Endpoint {
    /// Kubernetes port protocol for the endpoint's scheme
    pub fn transport_protocol(&self) -> &'static str {
        match self.protocol.as_str() {
            "udp" => "UDP",
            _ => "TCP",
        }
    }
}

/// Endpoint visibility
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EndpointExposure {
    /// Not reachable from outside the pod
    None,
    /// Reachable only inside the cluster
    Internal,
    /// Reachable from outside the cluster
    #[default]
    Public,
}
