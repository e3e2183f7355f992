//! DevfileMapper: turns one parsed devfile plus request metadata into a
//! [`ResourceBundle`]
//!
//! Stages run in a fixed order and the first failure ends the mapping; no
//! partial bundle is returned.

use tracing::debug;

use devmap_common::meta::validate_dns_label;
use devmap_common::{
    ObjectMeta, DEFAULT_DOCKERFILE_PATH, LABEL_APP, LABEL_MANAGED_BY, LABEL_MANAGED_BY_DEVMAP,
};
use devmap_devfile::{ContainerBuilder, Devfile, DevfileContainerBuilder, NamedContainer};
use devmap_resources::{BuildConfig, Deployment, ImageStream, Route, Service};

use crate::bundle::ResourceBundle;
use crate::endpoints::{resolve_routes, RoutePolicy};
use crate::error::{MappingError, ResourceKind};
use crate::labels::{merge_all, Labels};
use crate::params;
use crate::request::RequestMetadata;

/// Maps a devfile onto build, deploy, and routing resources.
///
/// ```rust,ignore
/// let bundle = DevfileMapper::new(&devfile, &request)
///     .with_route_policy(RoutePolicy::Single)
///     .with_dockerfile_path("docker/Dockerfile")
///     .map()?;
/// ```
pub struct DevfileMapper<'a> {
    devfile: &'a Devfile,
    request: &'a RequestMetadata,
    container_builder: &'a dyn ContainerBuilder,
    route_policy: RoutePolicy,
    dockerfile_path: &'a str,
}

impl<'a> DevfileMapper<'a> {
    /// Create a mapper with the default container builder, route policy, and
    /// Dockerfile path.
    pub fn new(devfile: &'a Devfile, request: &'a RequestMetadata) -> Self {
        Self {
            devfile,
            request,
            container_builder: &DevfileContainerBuilder,
            route_policy: RoutePolicy::default(),
            dockerfile_path: DEFAULT_DOCKERFILE_PATH,
        }
    }

    /// Use a different container builder.
    pub fn with_container_builder(mut self, builder: &'a dyn ContainerBuilder) -> Self {
        self.container_builder = builder;
        self
    }

    /// Set how many routes a component produces.
    pub fn with_route_policy(mut self, policy: RoutePolicy) -> Self {
        self.route_policy = policy;
        self
    }

    /// Set the Dockerfile path used by the build config.
    pub fn with_dockerfile_path(mut self, path: &'a str) -> Self {
        self.dockerfile_path = path;
        self
    }

    /// Run the mapping.
    ///
    /// Validates the shared name, selects the primary component, merges
    /// labels, then builds image stream → build config → deployment →
    /// service → routes.
    pub fn map(self) -> Result<ResourceBundle, MappingError> {
        let request = self.request;

        for (field, value) in [("name", &request.name), ("namespace", &request.namespace)] {
            validate_dns_label(field, value)
                .map_err(|e| MappingError::invariant(ResourceKind::Metadata, e.to_string()))?;
        }

        let component = select_primary(self.devfile)?;
        let meta = self.shared_metadata();

        let tag = params::image_stream_tag(&request.name, component);
        let image_stream = params::image_stream_params(&meta, &tag);
        let build = params::build_config_params(
            &meta,
            &request.git,
            self.dockerfile_path,
            &request.build_env,
            &tag,
        );

        let deployment = params::deployment_params(
            &meta,
            self.devfile,
            self.container_builder,
            &request.labels,
            &request.pod_labels,
        )?;

        let targets = component
            .map(|c| resolve_routes(c.container, self.route_policy))
            .unwrap_or_default();

        let service = params::service_params(
            &meta,
            self.devfile,
            &request.pod_labels,
            &deployment.template_labels,
            &targets,
            request.route.as_ref(),
        )?;
        let routes = params::route_params(
            &meta,
            &targets,
            request.route.as_ref(),
            self.route_policy,
        )?;

        let bundle = ResourceBundle {
            image_stream: ImageStream::from_params(image_stream),
            build_resource: BuildConfig::from_params(build),
            deploy_resource: Deployment::from_params(deployment),
            service: Service::from_params(service),
            routes: routes.into_iter().map(Route::from_params).collect(),
        };

        debug!(
            name = %request.name,
            namespace = %request.namespace,
            component = component.map(|c| c.name).unwrap_or("<none>"),
            containers = bundle.deploy_resource.spec.template.spec.containers.len(),
            ports = bundle.service.spec.ports.len(),
            routes = bundle.routes.len(),
            "mapped devfile"
        );
        Ok(bundle)
    }

    /// Metadata shared by every resource: generated labels, then caller
    /// defaults, then caller labels.
    fn shared_metadata(&self) -> ObjectMeta {
        let request = self.request;
        let generated = Labels::from([
            (LABEL_APP.to_string(), request.name.clone()),
            (
                LABEL_MANAGED_BY.to_string(),
                LABEL_MANAGED_BY_DEVMAP.to_string(),
            ),
        ]);
        let labels = merge_all([&generated, &request.default_labels, &request.labels]);

        ObjectMeta::new(&request.name, &request.namespace)
            .with_labels(labels)
            .with_annotations(request.annotations.clone())
    }
}

/// The container component the mapping is about.
///
/// A lone container is primary. With several, exactly one must carry the
/// primary attribute. A devfile without containers has no primary; the
/// container builder reports that.
pub fn select_primary(devfile: &Devfile) -> Result<Option<NamedContainer<'_>>, MappingError> {
    let containers: Vec<_> = devfile.containers().collect();
    if containers.len() <= 1 {
        return Ok(containers.first().copied());
    }

    let primaries: Vec<_> = containers.iter().filter(|c| c.is_primary()).collect();
    match primaries.as_slice() {
        [primary] => Ok(Some(**primary)),
        _ => Err(MappingError::UnsupportedComponentCount {
            count: containers.len(),
            primaries: primaries.len(),
            components: containers.iter().map(|c| c.name.to_string()).collect(),
        }),
    }
}
