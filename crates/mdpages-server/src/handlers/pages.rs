//! Catch-all page handler.
//!
//! Resolves any request path that matched no other route to a content page,
//! a redirect, or a 404.

use std::sync::Arc;
use std::time::{Duration, UNIX_EPOCH};

use axum::extract::{Query, State};
use axum::http::{HeaderMap, Method, StatusCode, Uri, header};
use axum::response::{IntoResponse, Response};
use chrono::{DateTime, Utc};
use md5::{Digest, Md5};
use mdpages_engine::{CatchAll, Page, Scope};
use percent_encoding::{AsciiSet, CONTROLS, percent_decode_str, utf8_percent_encode};

use crate::error::ServerError;
use crate::handlers::{FormatQuery, negotiate_format};
use crate::state::AppState;

/// Characters escaped when a decoded path is sent back in `Location`.
const PATH: &AsciiSet = &CONTROLS
    .add(b' ')
    .add(b'"')
    .add(b'#')
    .add(b'<')
    .add(b'>')
    .add(b'?')
    .add(b'\\')
    .add(b'`')
    .add(b'{')
    .add(b'}');

/// Handle any unmatched request.
pub(crate) async fn catch_all(
    State(state): State<Arc<AppState>>,
    method: Method,
    uri: Uri,
    Query(query): Query<FormatQuery>,
    headers: HeaderMap,
) -> Result<Response, ServerError> {
    if method != Method::GET && method != Method::HEAD {
        return Ok((StatusCode::METHOD_NOT_ALLOWED, [(header::ALLOW, "GET, HEAD")]).into_response());
    }

    let path = percent_decode_str(uri.path())
        .decode_utf8_lossy()
        .into_owned();

    match state.engine.catch_all(&path) {
        CatchAll::Page(page) => render_page(&state, &page, &path, &query, &headers),
        CatchAll::Redirect(location) => Ok((
            StatusCode::MOVED_PERMANENTLY,
            [(
                header::LOCATION,
                utf8_percent_encode(&location, PATH).to_string(),
            )],
        )
            .into_response()),
        CatchAll::NotFound => Err(ServerError::PageNotFound(path)),
    }
}

fn render_page(
    state: &AppState,
    page: &Page,
    path: &str,
    query: &FormatQuery,
    headers: &HeaderMap,
) -> Result<Response, ServerError> {
    let format = negotiate_format(query, headers);
    let body = state
        .engine
        .render_as(page, Scope::new().with("path", path), format)?;

    if state.verbose {
        tracing::info!(
            path,
            page = page.virtual_path(),
            format = format.mime_type(),
            "Rendered page"
        );
    }

    let etag = compute_etag(&state.version, &body);
    if let Some(if_none_match) = headers.get(header::IF_NONE_MATCH)
        && if_none_match.as_bytes() == etag.as_bytes()
    {
        return Ok(StatusCode::NOT_MODIFIED.into_response());
    }

    let source_mtime = UNIX_EPOCH + Duration::from_secs_f64(page.last_modified().max(0.0));
    let last_modified: DateTime<Utc> = source_mtime.into();
    let cache_control = if state.hot_reload_enabled() {
        "no-cache"
    } else {
        "private, max-age=60"
    };

    Ok((
        [
            (header::CONTENT_TYPE, format.content_type().to_owned()),
            (header::ETAG, etag),
            (
                header::LAST_MODIFIED,
                last_modified
                    .format("%a, %d %b %Y %H:%M:%S GMT")
                    .to_string(),
            ),
            (header::CACHE_CONTROL, cache_control.to_owned()),
        ],
        body,
    )
        .into_response())
}

/// Compute `ETag` from version and content.
///
/// Uses MD5 hash truncated to 64 bits (16 hex chars).
fn compute_etag(version: &str, content: &str) -> String {
    let hash = Md5::digest(format!("{version}:{content}").as_bytes());
    format!("\"{}\"", &hex::encode(hash)[..16])
}
