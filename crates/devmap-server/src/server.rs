//! Devfile mapping HTTP server

use std::path::{Component, Path};
use std::sync::Arc;

use axum::extract::rejection::JsonRejection;
use axum::extract::{DefaultBodyLimit, State};
use axum::routing::{get, post};
use axum::{Json, Router};
use tracing::{debug, info, warn};

use devmap_devfile::{
    ContainerBuilder, DevfileContainerBuilder, DevfileParser, YamlDevfileParser,
};
use devmap_mapper::{DevfileMapper, MappingError};

use crate::api::{DevfileInput, DevfileRequest, DevfileResponse};
use crate::config::Config;
use crate::error::ApiError;

/// Shared state for handlers
#[derive(Clone)]
pub struct AppState {
    /// Server configuration
    pub config: Arc<Config>,
    /// Devfile parser
    pub parser: Arc<dyn DevfileParser>,
    /// Container builder handed to the mapper
    pub container_builder: Arc<dyn ContainerBuilder>,
}

impl AppState {
    /// State with the YAML parser and the devfile container builder
    pub fn new(config: Config) -> Self {
        Self {
            config: Arc::new(config),
            parser: Arc::new(YamlDevfileParser),
            container_builder: Arc::new(DevfileContainerBuilder),
        }
    }
}

/// Build the API router
pub fn router(state: AppState) -> Router {
    let body_limit = state.config.max_body_bytes;
    Router::new()
        .route("/api/devfile", post(map_devfile_handler))
        .route("/healthz", get(|| async { "ok" }))
        .layer(DefaultBodyLimit::max(body_limit))
        .with_state(state)
}

/// Bind and serve until Ctrl-C
pub async fn serve(config: Config) -> anyhow::Result<()> {
    let addr = config.listen_addr;
    let app = router(AppState::new(config));

    let listener = tokio::net::TcpListener::bind(addr).await?;
    info!(addr = %addr, "Starting devmap server");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    info!("devmap server stopped");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        warn!(error = %e, "Failed to listen for shutdown signal");
        std::future::pending::<()>().await;
    }
}

/// Handle `POST /api/devfile`
async fn map_devfile_handler(
    State(state): State<AppState>,
    payload: Result<Json<DevfileRequest>, JsonRejection>,
) -> Result<Json<DevfileResponse>, ApiError> {
    let Json(request) = payload.inspect_err(|e| {
        warn!(error = %e.body_text(), "Rejected devfile request body");
    })?;

    let config = &state.config;
    let (metadata, source) = request.into_parts(&config.default_namespace);
    info!(name = %metadata.name, namespace = %metadata.namespace, "Mapping devfile");

    let content = match source.resolve()? {
        DevfileInput::Content(content) => content,
        DevfileInput::Path(path) => read_devfile(config.devfile_root.as_deref(), &path).await?,
    };
    debug!(bytes = content.len(), "Loaded devfile");

    let result = state
        .parser
        .parse(&content)
        .map_err(MappingError::from)
        .and_then(|devfile| {
            DevfileMapper::new(&devfile, &metadata)
                .with_container_builder(state.container_builder.as_ref())
                .with_route_policy(config.route_policy)
                .with_dockerfile_path(&config.dockerfile_path)
                .map()
        });

    match result {
        Ok(bundle) => {
            debug!(
                name = %metadata.name,
                resources = bundle.resource_count(),
                routes = bundle.routes.len(),
                "Mapped devfile"
            );
            Ok(Json(DevfileResponse {
                devfile_resources: bundle,
            }))
        }
        Err(err) => {
            warn!(
                name = %metadata.name,
                namespace = %metadata.namespace,
                stage = %err.resource(),
                error = %err,
                "Devfile mapping failed"
            );
            Err(err.into())
        }
    }
}

/// Read a devfile from `relative` under `root`.
///
/// The path must be relative and may not leave the root, including through
/// symlinks.
async fn read_devfile(root: Option<&Path>, relative: &str) -> Result<String, ApiError> {
    let root = root.ok_or_else(|| {
        ApiError::devfile_path("devfilePath is disabled; the server has no devfile root")
    })?;

    let requested = Path::new(relative);
    let escapes = requested
        .components()
        .any(|c| !matches!(c, Component::Normal(_) | Component::CurDir));
    if escapes {
        return Err(ApiError::devfile_path(format!(
            "'{relative}' must be a relative path inside the devfile root"
        )));
    }

    let root = tokio::fs::canonicalize(root)
        .await
        .map_err(|e| ApiError::devfile_path(format!("devfile root is unavailable: {e}")))?;
    let full = tokio::fs::canonicalize(root.join(requested))
        .await
        .map_err(|e| ApiError::devfile_path(format!("cannot read '{relative}': {e}")))?;
    if !full.starts_with(&root) {
        return Err(ApiError::devfile_path(format!(
            "'{relative}' resolves outside the devfile root"
        )));
    }

    tokio::fs::read_to_string(&full)
        .await
        .map_err(|e| ApiError::devfile_path(format!("cannot read '{relative}': {e}")))
}
