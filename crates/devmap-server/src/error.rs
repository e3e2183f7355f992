//! HTTP error responses

use axum::extract::rejection::JsonRejection;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};

use devmap_mapper::MappingError;

/// Error type for the devfile API
#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    /// Request body could not be decoded
    #[error("invalid request body: {message}")]
    Payload {
        /// Status chosen by the extractor
        status: StatusCode,
        /// Extractor message
        message: String,
    },

    /// Request is well-formed but unusable
    #[error("bad request: {0}")]
    BadRequest(String),

    /// Devfile path is disabled, escapes the root, or cannot be read
    #[error("devfile path: {0}")]
    DevfilePath(String),

    /// Parsing or mapping failed
    #[error(transparent)]
    Mapping(#[from] MappingError),
}

impl ApiError {
    /// Create a bad request error
    pub fn bad_request(msg: impl Into<String>) -> Self {
        Self::BadRequest(msg.into())
    }

    /// Create a devfile path error
    pub fn devfile_path(msg: impl Into<String>) -> Self {
        Self::DevfilePath(msg.into())
    }

    /// HTTP status for this error
    pub fn status(&self) -> StatusCode {
        match self {
            Self::Payload { status, .. } => *status,
            Self::BadRequest(_) | Self::DevfilePath(_) => StatusCode::BAD_REQUEST,
            Self::Mapping(err) => match err {
                MappingError::ParseFailure(_) | MappingError::InvariantViolation { .. } => {
                    StatusCode::BAD_REQUEST
                }
                MappingError::UnsupportedComponentCount { .. }
                | MappingError::NoExposableEndpoint { .. }
                | MappingError::ContainerBuildFailure { .. } => StatusCode::UNPROCESSABLE_ENTITY,
            },
        }
    }

    fn reason(&self) -> &'static str {
        match self {
            Self::Payload { .. } | Self::BadRequest(_) => "BadRequest",
            Self::DevfilePath(_) => "InvalidDevfilePath",
            Self::Mapping(err) => err.reason(),
        }
    }
}

impl From<JsonRejection> for ApiError {
    fn from(rejection: JsonRejection) -> Self {
        Self::Payload {
            status: rejection.status(),
            message: rejection.body_text(),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();

        // Return K8s-style Status response
        let mut body = serde_json::json!({
            "kind": "Status",
            "apiVersion": "v1",
            "status": "Failure",
            "message": self.to_string(),
            "reason": self.reason(),
            "code": status.as_u16()
        });
        if let Self::Mapping(err) = &self {
            body["details"] = serde_json::json!({ "kind": err.resource().as_str() });
        }

        (status, axum::Json(body)).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use devmap_mapper::ResourceKind;

    #[test]
    fn mapping_errors_map_to_status_codes() {
        let cases = [
            (
                MappingError::invariant(ResourceKind::Service, "empty selector"),
                StatusCode::BAD_REQUEST,
            ),
            (
                MappingError::no_exposable_endpoint(ResourceKind::Route, "none"),
                StatusCode::UNPROCESSABLE_ENTITY,
            ),
            (
                MappingError::UnsupportedComponentCount {
                    count: 2,
                    primaries: 2,
                    components: vec!["a".to_string(), "b".to_string()],
                },
                StatusCode::UNPROCESSABLE_ENTITY,
            ),
        ];
        for (err, status) in cases {
            assert_eq!(ApiError::from(err).status(), status);
        }
    }

    #[tokio::test]
    async fn response_is_a_kubernetes_status() {
        let err = ApiError::from(MappingError::no_exposable_endpoint(
            ResourceKind::Route,
            "nothing public",
        ));
        let response = err.into_response();
        assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);

        let body = axum::body::to_bytes(response.into_body(), 64 * 1024)
            .await
            .expect("body reading should succeed");
        let json: serde_json::Value = serde_json::from_slice(&body).unwrap();
        assert_eq!(json["kind"], "Status");
        assert_eq!(json["status"], "Failure");
        assert_eq!(json["code"], 422);
        assert_eq!(json["reason"], "NoExposableEndpoint");
        assert_eq!(json["details"]["kind"], "route");
        assert!(json["message"].as_str().unwrap().contains("nothing public"));
    }
}
