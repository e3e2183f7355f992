//! Endpoint exposure resolution
//!
//! Decides which devfile endpoints become routes and with what path and TLS
//! settings.

use std::str::FromStr;

use devmap_devfile::{ContainerComponent, Endpoint, EndpointExposure};

/// Schemes that imply TLS
const SECURE_PROTOCOLS: [&str; 2] = ["https", "wss"];

/// Path used when an endpoint declares none
pub const DEFAULT_ROUTE_PATH: &str = "/";

/// How many routes a component produces
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum RoutePolicy {
    /// One route per exposable endpoint
    #[default]
    PerEndpoint,
    /// Only the first exposable endpoint is routed
    Single,
}

impl RoutePolicy {
    /// Config name (`per-endpoint`, `single`)
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::PerEndpoint => "per-endpoint",
            Self::Single => "single",
        }
    }
}

impl FromStr for RoutePolicy {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "per-endpoint" => Ok(Self::PerEndpoint),
            "single" => Ok(Self::Single),
            other => Err(format!(
                "unknown route policy '{other}', expected 'per-endpoint' or 'single'"
            )),
        }
    }
}

impl std::fmt::Display for RoutePolicy {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// An endpoint that should be reachable through a route
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct RouteTarget {
    /// Endpoint name
    pub endpoint: String,
    /// Port on the pod
    pub target_port: u16,
    /// Path prefix, never empty
    pub path: String,
    /// Terminate TLS at the router
    pub secure: bool,
}

/// Route target for one endpoint; `None` when its exposure keeps it off the router.
pub fn resolve_endpoint(endpoint: &Endpoint) -> Option<RouteTarget> {
    match endpoint.exposure {
        EndpointExposure::None | EndpointExposure::Internal => return None,
        EndpointExposure::Public => {}
    }

    let secure = endpoint.secure || SECURE_PROTOCOLS.contains(&endpoint.protocol.as_str());
    let path = if endpoint.path.is_empty() {
        DEFAULT_ROUTE_PATH.to_string()
    } else {
        endpoint.path.clone()
    };

    Some(RouteTarget {
        endpoint: endpoint.name.clone(),
        target_port: endpoint.target_port,
        path,
        secure,
    })
}

/// Route targets for a container component, in endpoint declaration order
pub fn resolve_routes(component: &ContainerComponent, policy: RoutePolicy) -> Vec<RouteTarget> {
    let targets = component.endpoints.iter().filter_map(resolve_endpoint);
    match policy {
        RoutePolicy::PerEndpoint => targets.collect(),
        RoutePolicy::Single => targets.take(1).collect(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn endpoint(name: &str, port: u16) -> Endpoint {
        Endpoint {
            name: name.to_string(),
            target_port: port,
            protocol: "http".to_string(),
            path: String::new(),
            exposure: EndpointExposure::Public,
            secure: false,
        }
    }

    fn component(endpoints: Vec<Endpoint>) -> ContainerComponent {
        ContainerComponent {
            image: "node:18".to_string(),
            env: vec![],
            command: vec![],
            args: vec![],
            memory_limit: None,
            mount_sources: true,
            source_mapping: "/projects".to_string(),
            endpoints,
        }
    }

    #[test]
    fn internal_and_none_exposure_never_route() {
        for exposure in [EndpointExposure::Internal, EndpointExposure::None] {
            let ep = Endpoint {
                exposure,
                secure: true,
                protocol: "https".to_string(),
                path: "/api".to_string(),
                ..endpoint("http", 8080)
            };
            assert_eq!(resolve_endpoint(&ep), None);
        }
    }

    #[test]
    fn wss_without_secure_flag_is_secure_with_root_path() {
        let ep = Endpoint {
            protocol: "wss".to_string(),
            ..endpoint("ws", 9000)
        };
        let target = resolve_endpoint(&ep).unwrap();
        assert!(target.secure);
        assert_eq!(target.path, "/");
        assert_eq!(target.target_port, 9000);
    }

    #[test]
    fn secure_flag_alone_is_secure() {
        let ep = Endpoint {
            secure: true,
            path: "/app".to_string(),
            ..endpoint("http", 8080)
        };
        let target = resolve_endpoint(&ep).unwrap();
        assert!(target.secure);
        assert_eq!(target.path, "/app");
    }

    #[test]
    fn plain_http_is_not_secure() {
        assert!(!resolve_endpoint(&endpoint("http", 8080)).unwrap().secure);
    }

    #[test]
    fn per_endpoint_policy_keeps_declaration_order() {
        let c = component(vec![
            endpoint("web", 8080),
            Endpoint {
                exposure: EndpointExposure::Internal,
                ..endpoint("db", 5432)
            },
            endpoint("admin", 9090),
        ]);
        let names: Vec<_> = resolve_routes(&c, RoutePolicy::PerEndpoint)
            .into_iter()
            .map(|t| t.endpoint)
            .collect();
        assert_eq!(names, vec!["web", "admin"]);
    }

    #[test]
    fn single_policy_keeps_first_exposable() {
        let c = component(vec![
            Endpoint {
                exposure: EndpointExposure::None,
                ..endpoint("debug", 5858)
            },
            endpoint("web", 8080),
            endpoint("admin", 9090),
        ]);
        let targets = resolve_routes(&c, RoutePolicy::Single);
        assert_eq!(targets.len(), 1);
        assert_eq!(targets[0].endpoint, "web");
    }

    #[test]
    fn no_endpoints_no_routes() {
        assert!(resolve_routes(&component(vec![]), RoutePolicy::PerEndpoint).is_empty());
    }

    #[test]
    fn route_policy_parses_config_names() {
        assert_eq!("single".parse::<RoutePolicy>(), Ok(RoutePolicy::Single));
        assert_eq!(
            "per-endpoint".parse::<RoutePolicy>(),
            Ok(RoutePolicy::PerEndpoint)
        );
        assert!("many".parse::<RoutePolicy>().is_err());
        assert_eq!(RoutePolicy::default().to_string(), "per-endpoint");
    }
}
