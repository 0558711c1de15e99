//! Error types for the HTTP server.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use mdpages_engine::EngineError;
use serde_json::json;

/// Server error type.
#[derive(Debug, thiserror::Error)]
pub(crate) enum ServerError {
    /// No page at the requested path.
    #[error("Page not found: {0}")]
    PageNotFound(String),

    /// No view registered under the requested name.
    #[error("View not found: {0}")]
    ViewNotFound(String),

    /// Malformed request body.
    #[error("Bad request: {0}")]
    BadRequest(String),

    /// Rendering failure.
    #[error(transparent)]
    Engine(#[from] EngineError),
}

impl IntoResponse for ServerError {
    fn into_response(self) -> Response {
        let (status, body) = match &self {
            Self::PageNotFound(path) => (
                StatusCode::NOT_FOUND,
                json!({"error": "Page not found", "path": path}),
            ),
            Self::ViewNotFound(name) => (
                StatusCode::NOT_FOUND,
                json!({"error": "View not found", "name": name}),
            ),
            Self::BadRequest(message) => (
                StatusCode::BAD_REQUEST,
                json!({"error": "Bad request", "message": message}),
            ),
            Self::Engine(e) if e.is_not_found() => (
                StatusCode::NOT_FOUND,
                json!({"error": e.to_string()}),
            ),
            Self::Engine(e) => {
                tracing::error!(error = %e, "Render failed");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    json!({"error": e.to_string()}),
                )
            }
        };

        (status, axum::Json(body)).into_response()
    }
}
