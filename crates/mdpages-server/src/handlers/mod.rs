//! HTTP request handlers.

pub(crate) mod pages;
pub(crate) mod views;

use axum::http::{HeaderMap, header};
use mdpages_engine::ContentFormat;
use serde::Deserialize;

/// Query parameters shared by rendering endpoints.
#[derive(Debug, Default, Deserialize)]
pub(crate) struct FormatQuery {
    /// Output format override (`html`, `markdown`, `text`).
    pub(crate) format: Option<String>,
}

/// Pick the response format: `?format=` wins over the `Accept` header.
pub(crate) fn negotiate_format(query: &FormatQuery, headers: &HeaderMap) -> ContentFormat {
    let accept = headers
        .get(header::ACCEPT)
        .and_then(|value| value.to_str().ok());
    ContentFormat::negotiate(query.format.as_deref(), accept)
}
