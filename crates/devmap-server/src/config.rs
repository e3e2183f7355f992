//! Server configuration from flags and environment

use std::net::SocketAddr;
use std::path::PathBuf;

use clap::Parser;

use devmap_common::meta::validate_dns_label;
use devmap_common::DEFAULT_DOCKERFILE_PATH;
use devmap_mapper::RoutePolicy;

/// Default request body limit (1 MiB)
pub const DEFAULT_MAX_BODY_BYTES: usize = 1024 * 1024;

/// devmap - map devfiles to build, deploy, and routing resources
#[derive(Parser, Debug, Clone)]
#[command(name = "devmap")]
#[command(version, about, long_about = None)]
pub struct Config {
    /// Address to listen on
    #[arg(long, env = "DEVMAP_LISTEN_ADDR", default_value = "0.0.0.0:8080")]
    pub listen_addr: SocketAddr,

    /// Namespace used when a request does not name one
    #[arg(long, env = "DEVMAP_DEFAULT_NAMESPACE", default_value = "default")]
    pub default_namespace: String,

    /// Dockerfile path written into generated build configs
    #[arg(long, env = "DEVMAP_DOCKERFILE_PATH", default_value = DEFAULT_DOCKERFILE_PATH)]
    pub dockerfile_path: String,

    /// Route cardinality: `per-endpoint` or `single`
    #[arg(long, env = "DEVMAP_ROUTE_POLICY", default_value = "per-endpoint")]
    pub route_policy: RoutePolicy,

    /// Directory `devfilePath` requests are resolved against; path requests
    /// are rejected when unset
    #[arg(long, env = "DEVMAP_DEVFILE_ROOT")]
    pub devfile_root: Option<PathBuf>,

    /// Maximum request body size in bytes
    #[arg(long, env = "DEVMAP_MAX_BODY_BYTES", default_value_t = DEFAULT_MAX_BODY_BYTES)]
    pub max_body_bytes: usize,
}

impl Config {
    /// Check values clap cannot check on its own
    pub fn validate(&self) -> Result<(), devmap_common::Error> {
        validate_dns_label("default-namespace", &self.default_namespace)?;
        if self.dockerfile_path.trim().is_empty() {
            return Err(devmap_common::Error::validation_for_field(
                "dockerfile-path",
                "must not be empty",
            ));
        }
        if self.max_body_bytes == 0 {
            return Err(devmap_common::Error::validation_for_field(
                "max-body-bytes",
                "must be greater than zero",
            ));
        }
        Ok(())
    }
}
