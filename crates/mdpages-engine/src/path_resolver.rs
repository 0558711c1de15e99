//! Request-path resolution for the catch-all handler.

use std::sync::Arc;

use crate::engine::PageEngine;
use crate::page::Page;
use crate::path::{index_candidate, normalize_path_info};

/// Outcome of resolving an unmatched request path.
#[derive(Clone, Debug)]
pub enum CatchAll {
    /// A content page to render.
    Page(Arc<Page>),
    /// Permanent redirect to the extensionless location.
    Redirect(String),
    /// Nothing to serve.
    NotFound,
}

impl PageEngine {
    /// Find the content page for a request path.
    ///
    /// The path is normalized (leading `/` removed, empty → default page),
    /// then tried as a page key and as a directory index
    /// (`docs` → `docs/index`).
    #[must_use]
    pub fn resolve_by_path(&self, path_info: &str) -> Option<Arc<Page>> {
        let normalized = normalize_path_info(path_info, &self.config.default_page);
        let index = index_candidate(&normalized, &self.config.default_page);
        self.store.content_page(&[normalized.as_str(), index.as_str()])
    }

    /// Resolve a request path that matched no other route.
    ///
    /// Paths in the negative cache are answered without touching the store.
    /// Otherwise the store is consulted, then the backing store is probed
    /// once for a page created after startup. A request for the Markdown
    /// source itself (`/about.md`) redirects to `/about`. Anything else is
    /// recorded as missing.
    #[must_use]
    pub fn catch_all(&self, path_info: &str) -> CatchAll {
        let normalized = normalize_path_info(path_info, &self.config.default_page);

        if self.missing.contains(&normalized) {
            tracing::trace!(path = %normalized, "Negative cache hit");
            return CatchAll::NotFound;
        }

        if let Some(page) = self.resolve_by_path(path_info) {
            return CatchAll::Page(page);
        }

        if let Some(location) = self.source_redirect(&normalized) {
            tracing::debug!(path = %normalized, %location, "Redirecting Markdown source request");
            return CatchAll::Redirect(location);
        }

        if let Some(page) = self.discover_content_page(&normalized) {
            return CatchAll::Page(page);
        }

        self.missing.record(&normalized);
        CatchAll::NotFound
    }

    /// Extensionless location for a request ending in the page extension.
    ///
    /// `docs/index.md` → `/docs/`, `about.md` → `/about`. Paths containing a
    /// backslash never redirect: browsers read `/\host` as `//host`.
    fn source_redirect(&self, normalized: &str) -> Option<String> {
        if normalized.contains('\\') {
            return None;
        }
        let ext = &self.config.markdown_ext;
        let stem = normalized.strip_suffix(ext.as_str())?.strip_suffix('.')?;

        let index_page = &self.config.default_page;
        let location = match stem.strip_suffix(index_page.as_str()) {
            Some(dir) if dir.is_empty() || dir.ends_with('/') => dir,
            _ => stem,
        };
        Some(format!("/{location}"))
    }
}
