//! The resources produced for one devfile

use serde::{Deserialize, Serialize};

use devmap_resources::{BuildConfig, Deployment, ImageStream, Route, Service};

/// One image stream, build config, deployment, and service, plus zero or
/// more routes, all sharing a name, namespace, and label set.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct ResourceBundle {
    /// Image stream the build publishes into
    pub image_stream: ImageStream,
    /// Docker build from the Git source
    pub build_resource: BuildConfig,
    /// Workload running the devfile containers
    pub deploy_resource: Deployment,
    /// Service in front of the workload
    pub service: Service,
    /// Routes to the service
    #[serde(default)]
    pub routes: Vec<Route>,
}

impl ResourceBundle {
    /// Total number of resources in the bundle
    pub fn resource_count(&self) -> usize {
        4 + self.routes.len()
    }
}
