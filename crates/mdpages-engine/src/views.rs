//! Named view rendering and content-type negotiation.

use std::io::Write;
use std::sync::Arc;

use serde_json::Value;

use crate::engine::PageEngine;
use crate::error::EngineError;
use crate::page::Page;
use crate::render::RenderOptions;
use crate::scope::Scope;

/// Output format of a rendered page.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum ContentFormat {
    /// Markup-transformed body wrapped in its template.
    #[default]
    Html,
    /// Raw Markdown body, untransformed and unwrapped.
    Markdown,
    /// Raw body served as plain text.
    PlainText,
}

impl ContentFormat {
    /// MIME type without parameters.
    #[must_use]
    pub fn mime_type(self) -> &'static str {
        match self {
            Self::Html => "text/html",
            Self::Markdown => "text/x-markdown",
            Self::PlainText => "text/plain",
        }
    }

    /// `Content-Type` header value.
    #[must_use]
    pub fn content_type(self) -> &'static str {
        match self {
            Self::Html => "text/html; charset=utf-8",
            Self::Markdown => "text/x-markdown; charset=utf-8",
            Self::PlainText => "text/plain; charset=utf-8",
        }
    }

    /// Parse a `?format=` query value.
    #[must_use]
    pub fn from_query(value: &str) -> Option<Self> {
        match value.trim().to_ascii_lowercase().as_str() {
            "html" => Some(Self::Html),
            "markdown" | "md" => Some(Self::Markdown),
            "text" | "txt" | "plain" => Some(Self::PlainText),
            _ => None,
        }
    }

    /// First recognized media type in an `Accept` header.
    #[must_use]
    pub fn from_accept(header: &str) -> Option<Self> {
        header.split(',').find_map(|entry| {
            let media_type = entry.split(';').next().unwrap_or_default().trim();
            match media_type.to_ascii_lowercase().as_str() {
                "text/html" | "application/xhtml+xml" => Some(Self::Html),
                "text/x-markdown" | "text/markdown" => Some(Self::Markdown),
                "text/plain" => Some(Self::PlainText),
                _ => None,
            }
        })
    }

    /// Pick a format: the query parameter wins over `Accept`; default HTML.
    #[must_use]
    pub fn negotiate(query: Option<&str>, accept: Option<&str>) -> Self {
        query
            .and_then(Self::from_query)
            .or_else(|| accept.and_then(Self::from_accept))
            .unwrap_or_default()
    }

    /// Render options producing this format.
    #[must_use]
    pub fn render_options(self) -> RenderOptions {
        match self {
            Self::Html => RenderOptions::html(),
            Self::Markdown | Self::PlainText => RenderOptions::raw(),
        }
    }
}

impl PageEngine {
    /// View page by name, falling back to a shared view page.
    #[must_use]
    pub fn find_view(&self, name: &str) -> Option<Arc<Page>> {
        self.store
            .view_page(name)
            .or_else(|| self.store.shared_view_page(name))
    }

    /// True if a view or shared view named `name` is registered.
    #[must_use]
    pub fn has_view(&self, name: &str) -> bool {
        self.find_view(name).is_some()
    }

    /// Render a view with `model` in the requested format.
    ///
    /// # Errors
    ///
    /// Returns [`EngineError::PageNotFound`] if no view is registered under
    /// `name`, otherwise as [`PageEngine::render`].
    pub fn render_view(
        &self,
        name: &str,
        model: Value,
        format: ContentFormat,
    ) -> Result<String, EngineError> {
        let page = self
            .find_view(name)
            .ok_or_else(|| EngineError::PageNotFound(name.to_owned()))?;
        self.render_as(&page, Scope::with_model(model), format)
    }

    /// Render a view and write it to `out`.
    ///
    /// The text formats write the raw body: no markup transform and no
    /// template.
    ///
    /// # Errors
    ///
    /// As [`PageEngine::render_view`], plus [`EngineError::Io`] if writing
    /// fails.
    pub fn serialize_view<W: Write>(
        &self,
        format: ContentFormat,
        name: &str,
        model: Value,
        out: &mut W,
    ) -> Result<(), EngineError> {
        let text = self.render_view(name, model, format)?;
        out.write_all(text.as_bytes())?;
        Ok(())
    }

    /// Render a page in the given format.
    ///
    /// # Errors
    ///
    /// As [`PageEngine::render`].
    pub fn render_as(
        &self,
        page: &Page,
        scope: Scope,
        format: ContentFormat,
    ) -> Result<String, EngineError> {
        self.render(page, scope, &format.render_options())
    }
}
