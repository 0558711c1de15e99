//! Views API endpoint.
//!
//! Renders a named view or shared view with an optional JSON model.

use std::sync::Arc;

use axum::body::Bytes;
use axum::extract::{Path, Query, State};
use axum::http::{HeaderMap, header};
use axum::response::{IntoResponse, Response};
use serde_json::Value;

use crate::error::ServerError;
use crate::handlers::{FormatQuery, negotiate_format};
use crate::state::AppState;

/// Handle GET /api/views/{name}.
pub(crate) async fn get_view(
    State(state): State<Arc<AppState>>,
    Path(name): Path<String>,
    Query(query): Query<FormatQuery>,
    headers: HeaderMap,
) -> Result<Response, ServerError> {
    render_view(&state, &name, Value::Null, &query, &headers)
}

/// Handle POST /api/views/{name} with a JSON model body.
pub(crate) async fn post_view(
    State(state): State<Arc<AppState>>,
    Path(name): Path<String>,
    Query(query): Query<FormatQuery>,
    headers: HeaderMap,
    body: Bytes,
) -> Result<Response, ServerError> {
    let model = parse_model(&body)?;
    render_view(&state, &name, model, &query, &headers)
}

/// Empty bodies mean "no model".
fn parse_model(body: &[u8]) -> Result<Value, ServerError> {
    if body.iter().all(u8::is_ascii_whitespace) {
        return Ok(Value::Null);
    }
    serde_json::from_slice(body).map_err(|e| ServerError::BadRequest(e.to_string()))
}

fn render_view(
    state: &AppState,
    name: &str,
    model: Value,
    query: &FormatQuery,
    headers: &HeaderMap,
) -> Result<Response, ServerError> {
    if !state.engine.has_view(name) {
        return Err(ServerError::ViewNotFound(name.to_owned()));
    }

    let format = negotiate_format(query, headers);
    let mut body = Vec::new();
    state.engine.serialize_view(format, name, model, &mut body)?;

    if state.verbose {
        tracing::info!(view = name, format = format.mime_type(), "Rendered view");
    }

    Ok(([(header::CONTENT_TYPE, format.content_type())], body).into_response())
}
