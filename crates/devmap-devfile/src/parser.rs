//! Devfile parsing and validation
//!
//! YAML is loaded into `serde_json::Value`, deserialized into loose wire
//! structs, and then checked and normalized into the [`Devfile`] model.

use std::collections::{BTreeMap, HashSet};

use serde::Deserialize;
use serde_json::Value;
use tracing::debug;

use devmap_common::meta::validate_dns_label;
use devmap_common::yaml::load_document;

use crate::error::DevfileError;
use crate::types::{
    Component, ComponentKind, ContainerComponent, Devfile, Endpoint, EndpointExposure,
};

/// Default mount point for project sources
pub const DEFAULT_SOURCE_MAPPING: &str = "/projects";

/// Default endpoint protocol
pub const DEFAULT_ENDPOINT_PROTOCOL: &str = "http";

/// Endpoint names become container port names (IANA_SVC_NAME)
pub const MAX_ENDPOINT_NAME_LEN: usize = 15;

/// Parses devfile text into a validated [`Devfile`]
#[cfg_attr(test, mockall::automock)]
pub trait DevfileParser: Send + Sync {
    /// Parse and validate devfile source
    fn parse(&self, content: &str) -> Result<Devfile, DevfileError>;
}

/// [`DevfileParser`] for devfile 2.x YAML
#[derive(Clone, Copy, Debug, Default)]
pub struct YamlDevfileParser;

impl DevfileParser for YamlDevfileParser {
    fn parse(&self, content: &str) -> Result<Devfile, DevfileError> {
        let value = load_document(content).map_err(|e| DevfileError::Yaml(e.to_string()))?;
        if value.is_null() {
            return Err(DevfileError::Validation {
                message: "devfile is empty".to_string(),
                field: None,
            });
        }
        let raw: RawDevfile = serde_json::from_value(value).map_err(|e| DevfileError::Schema {
            message: e.to_string(),
        })?;
        let devfile = raw.validate()?;
        debug!(
            schema_version = %devfile.schema_version,
            components = devfile.components.len(),
            "parsed devfile"
        );
        Ok(devfile)
    }
}

// =============================================================================
// Wire format
// =============================================================================

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawDevfile {
    schema_version: Option<String>,
    #[serde(default)]
    metadata: RawMetadata,
    #[serde(default)]
    components: Vec<RawComponent>,
}

#[derive(Default, Deserialize)]
struct RawMetadata {
    name: Option<String>,
}

#[derive(Deserialize)]
struct RawComponent {
    #[serde(default)]
    name: String,
    #[serde(default)]
    attributes: BTreeMap<String, Value>,
    container: Option<RawContainer>,
    kubernetes: Option<Value>,
    openshift: Option<Value>,
    volume: Option<Value>,
    image: Option<Value>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawContainer {
    #[serde(default)]
    image: String,
    #[serde(default)]
    env: Vec<RawEnvVar>,
    #[serde(default)]
    command: Vec<String>,
    #[serde(default)]
    args: Vec<String>,
    memory_limit: Option<Value>,
    mount_sources: Option<bool>,
    source_mapping: Option<String>,
    #[serde(default)]
    endpoints: Vec<RawEndpoint>,
}

#[derive(Deserialize)]
struct RawEnvVar {
    #[serde(default)]
    name: String,
    #[serde(default)]
    value: Value,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawEndpoint {
    #[serde(default)]
    name: String,
    target_port: i64,
    protocol: Option<String>,
    path: Option<String>,
    exposure: Option<EndpointExposure>,
    secure: Option<bool>,
}

// =============================================================================
// Validation
// =============================================================================

impl RawDevfile {
    fn validate(self) -> Result<Devfile, DevfileError> {
        let schema_version = self
            .schema_version
            .filter(|v| !v.trim().is_empty())
            .ok_or_else(|| DevfileError::invalid("schemaVersion", "is required"))?;
        if !schema_version.starts_with("2.") {
            return Err(DevfileError::invalid(
                "schemaVersion",
                format!("unsupported schema version '{schema_version}', expected 2.x"),
            ));
        }

        let mut component_names = HashSet::new();
        let mut endpoint_names = HashSet::new();
        let mut components = Vec::with_capacity(self.components.len());

        for (i, mut raw) in self.components.into_iter().enumerate() {
            let at = format!("components[{i}]");
            validate_dns_label(&format!("{at}.name"), &raw.name)?;
            if !component_names.insert(raw.name.clone()) {
                return Err(DevfileError::invalid(
                    format!("{at}.name"),
                    format!("duplicate component name '{}'", raw.name),
                ));
            }

            let kind = raw.kind(&at)?;
            let kind = match kind {
                RawKind::Container(c) => {
                    let container = c.validate(&at)?;
                    for ep in &container.endpoints {
                        if !endpoint_names.insert(ep.name.clone()) {
                            return Err(DevfileError::invalid(
                                format!("{at}.container.endpoints"),
                                format!("duplicate endpoint name '{}'", ep.name),
                            ));
                        }
                    }
                    ComponentKind::Container(container)
                }
                RawKind::Other(kind) => kind,
            };

            components.push(Component {
                name: raw.name,
                attributes: raw.attributes,
                kind,
            });
        }

        Ok(Devfile {
            schema_version,
            name: self.metadata.name.filter(|n| !n.is_empty()),
            components,
        })
    }
}

enum RawKind {
    Container(RawContainer),
    Other(ComponentKind),
}

impl RawComponent {
    /// Exactly one kind key must be present
    fn kind(&mut self, at: &str) -> Result<RawKind, DevfileError> {
        let declared = [
            self.container.is_some(),
            self.kubernetes.is_some(),
            self.openshift.is_some(),
            self.volume.is_some(),
            self.image.is_some(),
        ]
        .into_iter()
        .filter(|present| *present)
        .count();

        if declared != 1 {
            return Err(DevfileError::invalid(
                at,
                format!(
                    "component '{}' must declare exactly one of container, kubernetes, openshift, volume, image (found {declared})",
                    self.name
                ),
            ));
        }

        Ok(if let Some(c) = self.container.take() {
            RawKind::Container(c)
        } else if self.kubernetes.is_some() {
            RawKind::Other(ComponentKind::Kubernetes)
        } else if self.openshift.is_some() {
            RawKind::Other(ComponentKind::Openshift)
        } else if self.volume.is_some() {
            RawKind::Other(ComponentKind::Volume)
        } else {
            RawKind::Other(ComponentKind::Image)
        })
    }
}

impl RawContainer {
    fn validate(self, at: &str) -> Result<ContainerComponent, DevfileError> {
        if self.image.trim().is_empty() {
            return Err(DevfileError::invalid(
                format!("{at}.container.image"),
                "must not be empty",
            ));
        }

        let env = self
            .env
            .into_iter()
            .enumerate()
            .map(|(j, var)| {
                let value = scalar_string(var.value).ok_or_else(|| {
                    DevfileError::invalid(format!("{at}.container.env[{j}].value"), "must be a scalar")
                })?;
                Ok((var.name, value))
            })
            .collect::<Result<Vec<_>, DevfileError>>()?;

        let memory_limit = match self.memory_limit {
            None | Some(Value::Null) => None,
            Some(v) => Some(scalar_string(v).ok_or_else(|| {
                DevfileError::invalid(format!("{at}.container.memoryLimit"), "must be a scalar")
            })?),
        };

        let endpoints = self
            .endpoints
            .into_iter()
            .enumerate()
            .map(|(j, ep)| ep.validate(&format!("{at}.container.endpoints[{j}]")))
            .collect::<Result<Vec<_>, _>>()?;

        Ok(ContainerComponent {
            image: self.image,
            env,
            command: self.command,
            args: self.args,
            memory_limit,
            mount_sources: self.mount_sources.unwrap_or(true),
            source_mapping: self
                .source_mapping
                .filter(|s| !s.is_empty())
                .unwrap_or_else(|| DEFAULT_SOURCE_MAPPING.to_string()),
            endpoints,
        })
    }
}

impl RawEndpoint {
    fn validate(self, at: &str) -> Result<Endpoint, DevfileError> {
        let field = format!("{at}.name");
        validate_dns_label(&field, &self.name)?;
        if self.name.len() > MAX_ENDPOINT_NAME_LEN {
            return Err(DevfileError::invalid(
                field,
                format!(
                    "'{}' is {} characters, must be at most {MAX_ENDPOINT_NAME_LEN}",
                    self.name,
                    self.name.len()
                ),
            ));
        }
        let target_port = u16::try_from(self.target_port)
            .ok()
            .filter(|p| *p != 0)
            .ok_or_else(|| {
                DevfileError::invalid(
                    format!("{at}.targetPort"),
                    format!("{} is outside 1..=65535", self.target_port),
                )
            })?;

        Ok(Endpoint {
            name: self.name,
            target_port,
            protocol: self
                .protocol
                .filter(|p| !p.is_empty())
                .map(|p| p.to_ascii_lowercase())
                .unwrap_or_else(|| DEFAULT_ENDPOINT_PROTOCOL.to_string()),
            path: self.path.unwrap_or_default(),
            exposure: self.exposure.unwrap_or_default(),
            secure: self.secure.unwrap_or(false),
        })
    }
}

/// Render a YAML scalar as a string; `None` for sequences and maps
fn scalar_string(value: Value) -> Option<String> {
    match value {
        Value::Null => Some(String::new()),
        Value::String(s) => Some(s),
        Value::Bool(b) => Some(b.to_string()),
        Value::Number(n) => Some(n.to_string()),
        Value::Array(_) | Value::Object(_) => None,
    }
}
