//! Per-kind parameter builders
//!
//! Each builder takes explicit inputs and returns the normalized parameters
//! for one resource kind. Cross-resource invariants (selector coverage,
//! exposability) are checked here, before any resource is constructed.

use std::collections::BTreeSet;

use devmap_common::{ImageReference, ObjectMeta, DEFAULT_IMAGE_TAG, LABEL_APP};
use devmap_devfile::{ContainerBuilder, Devfile, NamedContainer};
use devmap_resources::k8s::{selects, EnvVar};
use devmap_resources::openshift::{
    BuildConfigParams, GitSource, ImageStreamParams, ImageStreamTagRef, RouteParams,
};
use devmap_resources::workload::{DeploymentParams, ServicePort, ServiceParams};

use crate::endpoints::{RoutePolicy, RouteTarget, DEFAULT_ROUTE_PATH};
use crate::error::{MappingError, ResourceKind};
use crate::labels::{merge, Labels};
use crate::request::RouteSpec;

/// Replica count of generated deployments
pub const DEFAULT_REPLICAS: u32 = 1;

// =============================================================================
// ImageStream / BuildConfig
// =============================================================================

/// The `<name>:<tag>` the build publishes into and the image stream declares.
///
/// The tag follows the primary component's image; untagged, digest-pinned,
/// or absent images publish to `latest`.
pub fn image_stream_tag(name: &str, component: Option<NamedContainer<'_>>) -> ImageStreamTagRef {
    let tag = component
        .map(|c| ImageReference::parse(&c.container.image).tag_or_default())
        .unwrap_or(DEFAULT_IMAGE_TAG);
    ImageStreamTagRef::new(name, tag)
}

/// Image stream parameters
pub fn image_stream_params(meta: &ObjectMeta, tag: &ImageStreamTagRef) -> ImageStreamParams {
    ImageStreamParams {
        metadata: meta.clone(),
        tag: tag.clone(),
    }
}

/// Build config parameters; output is the image stream's tag.
pub fn build_config_params(
    meta: &ObjectMeta,
    git: &GitSource,
    dockerfile_path: &str,
    build_env: &[EnvVar],
    output: &ImageStreamTagRef,
) -> BuildConfigParams {
    BuildConfigParams {
        metadata: meta.clone(),
        git: git.clone(),
        dockerfile_path: dockerfile_path.to_string(),
        env: build_env.to_vec(),
        output: output.clone(),
    }
}

// =============================================================================
// Deployment / Service
// =============================================================================

/// Deployment parameters.
///
/// Containers come from `builder` seeded with the whole devfile. The selector
/// is `{app: <name>}` and the pod template carries `merge(labels, pod_labels)`,
/// which must contain the selector.
pub fn deployment_params(
    meta: &ObjectMeta,
    devfile: &Devfile,
    builder: &dyn ContainerBuilder,
    labels: &Labels,
    pod_labels: &Labels,
) -> Result<DeploymentParams, MappingError> {
    let containers =
        builder
            .build_containers(devfile)
            .map_err(|source| MappingError::ContainerBuildFailure {
                resource: ResourceKind::Deployment,
                source,
            })?;

    let selector = Labels::from([(LABEL_APP.to_string(), meta.name.clone())]);
    let template_labels = merge(labels, pod_labels);
    if !selects(&selector, &template_labels) {
        return Err(MappingError::invariant(
            ResourceKind::Deployment,
            format!(
                "pod template labels must include selector {LABEL_APP}={}",
                meta.name
            ),
        ));
    }

    Ok(DeploymentParams {
        metadata: meta.clone(),
        containers,
        selector,
        template_labels,
        replicas: DEFAULT_REPLICAS,
    })
}

/// Service parameters.
///
/// The selector is the caller's pod labels and must select the deployment's
/// pod template. One port per distinct endpoint target port across all
/// container components, carrying the endpoint's transport protocol. When
/// there are no route targets the route falls back to the caller's route
/// port, so the service serves that port too.
pub fn service_params(
    meta: &ObjectMeta,
    devfile: &Devfile,
    pod_labels: &Labels,
    template_labels: &Labels,
    targets: &[RouteTarget],
    route: Option<&RouteSpec>,
) -> Result<ServiceParams, MappingError> {
    if pod_labels.is_empty() {
        return Err(MappingError::invariant(
            ResourceKind::Service,
            "pod labels must not be empty; they become the service selector",
        ));
    }
    if !selects(pod_labels, template_labels) {
        return Err(MappingError::invariant(
            ResourceKind::Service,
            "service selector does not match the deployment pod template labels",
        ));
    }

    let mut seen = BTreeSet::new();
    let mut ports: Vec<ServicePort> = devfile
        .endpoints()
        .filter(|ep| seen.insert(ep.target_port))
        .map(|ep| {
            ServicePort::passthrough_with_protocol(ep.target_port, ep.transport_protocol())
        })
        .collect();
    if targets.is_empty() {
        if let Some(port) = route.and_then(|r| r.target_port) {
            if seen.insert(port) {
                ports.push(ServicePort::passthrough(port));
            }
        }
    }

    Ok(ServiceParams {
        metadata: meta.clone(),
        selector: pod_labels.clone(),
        ports,
    })
}

// =============================================================================
// Route
// =============================================================================

/// Route parameters for the resolved targets.
///
/// Every route targets the shared service. A lone route keeps the shared
/// name; several are suffixed with their endpoint name. Without targets the
/// caller's route spec is the fallback.
pub fn route_params(
    meta: &ObjectMeta,
    targets: &[RouteTarget],
    route: Option<&RouteSpec>,
    policy: RoutePolicy,
) -> Result<Vec<RouteParams>, MappingError> {
    let host = route.and_then(|r| r.hostname.clone());

    if targets.is_empty() {
        return match route {
            Some(spec) => {
                let target_port = spec.target_port.ok_or_else(|| {
                    MappingError::no_exposable_endpoint(
                        ResourceKind::Route,
                        "no public endpoint in the devfile and the route spec has no target port",
                    )
                })?;
                Ok(vec![RouteParams {
                    metadata: meta.clone(),
                    service_name: meta.name.clone(),
                    target_port,
                    path: spec
                        .path
                        .clone()
                        .filter(|p| !p.is_empty())
                        .unwrap_or_else(|| DEFAULT_ROUTE_PATH.to_string()),
                    secure: spec.secure,
                    host,
                }])
            }
            None if policy == RoutePolicy::Single => Err(MappingError::no_exposable_endpoint(
                ResourceKind::Route,
                "single route policy requires a public endpoint or a route target port",
            )),
            None => Ok(Vec::new()),
        };
    }

    let suffixed = targets.len() > 1;
    Ok(targets
        .iter()
        .map(|target| {
            let mut metadata = meta.clone();
            if suffixed {
                metadata.name = format!("{}-{}", meta.name, target.endpoint);
            }
            RouteParams {
                metadata,
                service_name: meta.name.clone(),
                target_port: target.target_port,
                path: target.path.clone(),
                secure: target.secure,
                host: host.clone(),
            }
        })
        .collect())
}

#[cfg(test)]
mod tests {
    use super::*;
    use devmap_devfile::{DevfileParser, YamlDevfileParser};
    use devmap_resources::k8s::Container;

    mockall::mock! {
        pub Builder {}

        impl ContainerBuilder for Builder {
            fn build_containers(
                &self,
                devfile: &Devfile,
            ) -> Result<Vec<Container>, devmap_devfile::ContainerBuildError>;
        }
    }

    fn labels(pairs: &[(&str, &str)]) -> Labels {
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect()
    }

    fn devfile(yaml: &str) -> Devfile {
        YamlDevfileParser.parse(yaml).unwrap()
    }

    const TWO_CONTAINERS: &str = r#"
schemaVersion: 2.2.0
components:
  - name: web
    container:
      image: quay.io/acme/web:2.1
      endpoints:
        - name: http
          targetPort: 8080
        - name: admin
          targetPort: 9090
  - name: sidecar
    container:
      image: envoy
      endpoints:
        - name: proxy
          targetPort: 8080
        - name: stats
          targetPort: 9901
"#;

    fn target(endpoint: &str, port: u16) -> RouteTarget {
        RouteTarget {
            endpoint: endpoint.to_string(),
            target_port: port,
            path: "/".to_string(),
            secure: false,
        }
    }

    #[test]
    fn image_stream_tag_follows_component_image() {
        let d = devfile(TWO_CONTAINERS);
        let web = d.containers().next();
        assert_eq!(image_stream_tag("foo", web).to_string(), "foo:2.1");
        assert_eq!(image_stream_tag("foo", None).to_string(), "foo:latest");
    }

    #[test]
    fn build_config_output_is_image_stream_tag() {
        let meta = ObjectMeta::new("foo", "dev");
        let tag = ImageStreamTagRef::new("foo", "latest");
        let git = GitSource {
            url: "https://example/repo.git".to_string(),
            git_ref: "main".to_string(),
            context_dir: "/".to_string(),
        };
        let params = build_config_params(&meta, &git, "Dockerfile", &[], &tag);
        assert_eq!(params.output, image_stream_params(&meta, &tag).tag);
        assert_eq!(params.git, git);
    }

    #[test]
    fn deployment_requires_selector_in_template_labels() {
        let d = devfile(TWO_CONTAINERS);
        let mut builder = MockBuilder::new();
        builder.expect_build_containers().returning(|_| Ok(vec![]));

        let meta = ObjectMeta::new("foo", "dev");
        let err = deployment_params(
            &meta,
            &d,
            &builder,
            &labels(&[("team", "a")]),
            &labels(&[("tier", "web")]),
        )
        .unwrap_err();
        assert!(matches!(
            err,
            MappingError::InvariantViolation {
                resource: ResourceKind::Deployment,
                ..
            }
        ));
    }

    #[test]
    fn pod_labels_override_user_labels_in_template() {
        let d = devfile(TWO_CONTAINERS);
        let mut builder = MockBuilder::new();
        builder.expect_build_containers().times(1).returning(|_| Ok(vec![]));

        let meta = ObjectMeta::new("foo", "dev");
        let params = deployment_params(
            &meta,
            &d,
            &builder,
            &labels(&[("app", "other"), ("team", "a")]),
            &labels(&[("app", "foo")]),
        )
        .unwrap();
        assert_eq!(params.template_labels, labels(&[("app", "foo"), ("team", "a")]));
        assert_eq!(params.selector, labels(&[("app", "foo")]));
    }

    #[test]
    fn container_builder_failure_is_wrapped() {
        let d = devfile(TWO_CONTAINERS);
        let mut builder = MockBuilder::new();
        builder
            .expect_build_containers()
            .returning(|_| Err(devmap_devfile::ContainerBuildError::NoContainers));

        let err = deployment_params(
            &ObjectMeta::new("foo", "dev"),
            &d,
            &builder,
            &Labels::new(),
            &labels(&[("app", "foo")]),
        )
        .unwrap_err();
        assert_eq!(err.resource(), ResourceKind::Deployment);
        assert!(matches!(err, MappingError::ContainerBuildFailure { .. }));
    }

    #[test]
    fn service_ports_are_distinct_across_containers() {
        let d = devfile(TWO_CONTAINERS);
        let pod = labels(&[("app", "foo")]);
        let params =
            service_params(&ObjectMeta::new("foo", "dev"), &d, &pod, &pod, &[], None).unwrap();
        let ports: Vec<_> = params.ports.iter().map(|p| p.port).collect();
        assert_eq!(ports, vec![8080, 9090, 9901]);
        assert_eq!(params.selector, pod);
    }

    #[test]
    fn service_falls_back_to_route_port() {
        let d = devfile("schemaVersion: 2.2.0\ncomponents:\n  - name: w\n    container:\n      image: x\n");
        let pod = labels(&[("app", "foo")]);
        let route = RouteSpec {
            target_port: Some(8080),
            ..Default::default()
        };
        let params =
            service_params(&ObjectMeta::new("foo", "dev"), &d, &pod, &pod, &[], Some(&route))
                .unwrap();
        assert_eq!(params.ports, vec![ServicePort::passthrough(8080)]);
    }

    #[test]
    fn service_serves_route_port_when_only_internal_endpoints() {
        let d = devfile(
            r#"
schemaVersion: 2.2.0
components:
  - name: w
    container:
      image: x
      endpoints:
        - name: debug
          targetPort: 5858
          exposure: internal
"#,
        );
        let pod = labels(&[("app", "foo")]);
        let meta = ObjectMeta::new("foo", "dev");
        let route = RouteSpec {
            target_port: Some(3000),
            ..Default::default()
        };

        let service = service_params(&meta, &d, &pod, &pod, &[], Some(&route)).unwrap();
        let routes = route_params(&meta, &[], Some(&route), RoutePolicy::PerEndpoint).unwrap();

        let ports: Vec<_> = service.ports.iter().map(|p| p.port).collect();
        assert_eq!(ports, vec![5858, 3000]);
        assert!(routes
            .iter()
            .all(|r| service.ports.iter().any(|p| p.port == r.target_port)));
    }

    #[test]
    fn route_port_is_not_added_when_endpoints_are_routed() {
        let d = devfile(TWO_CONTAINERS);
        let pod = labels(&[("app", "foo")]);
        let route = RouteSpec {
            target_port: Some(3000),
            ..Default::default()
        };
        let params = service_params(
            &ObjectMeta::new("foo", "dev"),
            &d,
            &pod,
            &pod,
            &[target("http", 8080)],
            Some(&route),
        )
        .unwrap();
        assert!(params.ports.iter().all(|p| p.port != 3000));
    }

    #[test]
    fn udp_endpoints_get_udp_service_ports() {
        let d = devfile(
            r#"
schemaVersion: 2.2.0
components:
  - name: dns
    container:
      image: coredns
      endpoints:
        - name: dns
          targetPort: 53
          protocol: udp
        - name: metrics
          targetPort: 9153
"#,
        );
        let pod = labels(&[("app", "foo")]);
        let params =
            service_params(&ObjectMeta::new("foo", "dev"), &d, &pod, &pod, &[], None).unwrap();
        let protocols: Vec<_> = params
            .ports
            .iter()
            .map(|p| (p.port, p.protocol.as_deref()))
            .collect();
        assert_eq!(protocols, vec![(53, Some("UDP")), (9153, Some("TCP"))]);
    }

    #[test]
    fn service_selector_must_be_non_empty_and_covered() {
        let d = devfile(TWO_CONTAINERS);
        let meta = ObjectMeta::new("foo", "dev");
        let template = labels(&[("app", "foo")]);

        let empty = service_params(&meta, &d, &Labels::new(), &template, &[], None).unwrap_err();
        assert!(matches!(empty, MappingError::InvariantViolation { .. }));

        let uncovered =
            service_params(&meta, &d, &labels(&[("app", "bar")]), &template, &[], None).unwrap_err();
        assert_eq!(uncovered.resource(), ResourceKind::Service);
    }

    #[test]
    fn single_route_keeps_shared_name() {
        let meta = ObjectMeta::new("foo", "dev");
        let routes =
            route_params(&meta, &[target("http", 8080)], None, RoutePolicy::PerEndpoint).unwrap();
        assert_eq!(routes.len(), 1);
        assert_eq!(routes[0].metadata.name, "foo");
        assert_eq!(routes[0].service_name, "foo");
    }

    #[test]
    fn multiple_routes_are_suffixed_and_share_host() {
        let meta = ObjectMeta::new("foo", "dev");
        let spec = RouteSpec {
            hostname: Some("foo.apps.example.com".to_string()),
            path: Some("/ignored".to_string()),
            ..Default::default()
        };
        let routes = route_params(
            &meta,
            &[target("http", 8080), target("admin", 9090)],
            Some(&spec),
            RoutePolicy::PerEndpoint,
        )
        .unwrap();

        let names: Vec<_> = routes.iter().map(|r| r.metadata.name.as_str()).collect();
        assert_eq!(names, vec!["foo-http", "foo-admin"]);
        assert!(routes.iter().all(|r| r.service_name == "foo"));
        assert!(routes
            .iter()
            .all(|r| r.host.as_deref() == Some("foo.apps.example.com")));
        assert!(routes.iter().all(|r| r.path == "/"));
    }

    #[test]
    fn route_spec_is_the_fallback_without_targets() {
        let meta = ObjectMeta::new("foo", "dev");
        let spec = RouteSpec {
            path: Some("/api".to_string()),
            target_port: Some(3000),
            secure: true,
            ..Default::default()
        };
        let routes = route_params(&meta, &[], Some(&spec), RoutePolicy::PerEndpoint).unwrap();
        assert_eq!(routes.len(), 1);
        assert_eq!(routes[0].target_port, 3000);
        assert_eq!(routes[0].path, "/api");
        assert!(routes[0].secure);
    }

    #[test]
    fn route_spec_without_port_is_not_exposable() {
        let meta = ObjectMeta::new("foo", "dev");
        let spec = RouteSpec {
            hostname: Some("foo.example.com".to_string()),
            ..Default::default()
        };
        let err = route_params(&meta, &[], Some(&spec), RoutePolicy::PerEndpoint).unwrap_err();
        assert!(matches!(err, MappingError::NoExposableEndpoint { .. }));
    }

    #[test]
    fn no_targets_and_no_spec() {
        let meta = ObjectMeta::new("foo", "dev");
        assert!(route_params(&meta, &[], None, RoutePolicy::PerEndpoint)
            .unwrap()
            .is_empty());
        assert!(matches!(
            route_params(&meta, &[], None, RoutePolicy::Single).unwrap_err(),
            MappingError::NoExposableEndpoint { .. }
        ));
    }
}
