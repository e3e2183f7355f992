//! Container construction from devfile container components

use devmap_common::ImageReference;
use devmap_resources::k8s::{
    is_valid_quantity, Container, ContainerPort, EnvVar, ResourceRequirements,
};

use crate::error::ContainerBuildError;
use crate::types::{Devfile, NamedContainer};

/// Environment variable pointing at the project sources root
pub const ENV_PROJECTS_ROOT: &str = "PROJECTS_ROOT";

/// Environment variable pointing at the mounted project source
pub const ENV_PROJECT_SOURCE: &str = "PROJECT_SOURCE";

/// Builds Kubernetes containers from a parsed devfile
#[cfg_attr(test, mockall::automock)]
pub trait ContainerBuilder: Send + Sync {
    /// Convert every container component of `devfile`, in declaration order
    fn build_containers(&self, devfile: &Devfile) -> Result<Vec<Container>, ContainerBuildError>;
}

/// [`ContainerBuilder`] that follows devfile container semantics
#[derive(Clone, Copy, Debug, Default)]
pub struct DevfileContainerBuilder;

impl ContainerBuilder for DevfileContainerBuilder {
    fn build_containers(&self, devfile: &Devfile) -> Result<Vec<Container>, ContainerBuildError> {
        let containers = devfile
            .containers()
            .map(build_container)
            .collect::<Result<Vec<_>, _>>()?;

        if containers.is_empty() {
            return Err(ContainerBuildError::NoContainers);
        }
        Ok(containers)
    }
}

fn build_container(component: NamedContainer<'_>) -> Result<Container, ContainerBuildError> {
    let spec = component.container;

    let mut env = Vec::with_capacity(spec.env.len() + 2);
    for (name, value) in &spec.env {
        if name.is_empty() {
            return Err(ContainerBuildError::EmptyEnvName {
                component: component.name.to_string(),
            });
        }
        env.push(EnvVar::literal(name, value));
    }
    if spec.mount_sources {
        for name in [ENV_PROJECTS_ROOT, ENV_PROJECT_SOURCE] {
            if !env.iter().any(|e| e.name == name) {
                env.push(EnvVar::literal(name, &spec.source_mapping));
            }
        }
    }

    let resources = match &spec.memory_limit {
        Some(limit) if !is_valid_quantity(limit) => {
            return Err(ContainerBuildError::InvalidMemoryLimit {
                component: component.name.to_string(),
                value: limit.clone(),
            })
        }
        Some(limit) => Some(ResourceRequirements::memory_limit(limit)),
        None => None,
    };

    let ports = spec
        .endpoints
        .iter()
        .map(|ep| ContainerPort {
            name: Some(ep.name.clone()),
            container_port: ep.target_port,
            protocol: Some(ep.transport_protocol().to_string()),
        })
        .collect();

    Ok(Container {
        name: component.name.to_string(),
        image: spec.image.clone(),
        image_pull_policy: Some(ImageReference::parse(&spec.image).pull_policy().to_string()),
        command: (!spec.command.is_empty()).then(|| spec.command.clone()),
        args: (!spec.args.is_empty()).then(|| spec.args.clone()),
        env,
        ports,
        resources,
    })
}
