//! Application state.
//!
//! Shared state for all request handlers.

use std::sync::Arc;

use mdpages_engine::PageEngine;

/// Application state shared across all handlers.
pub(crate) struct AppState {
    /// Rendering engine with every registered page.
    pub(crate) engine: Arc<PageEngine>,
    /// Log every rendered request.
    pub(crate) verbose: bool,
    /// Application version for `ETag` computation.
    pub(crate) version: String,
}

impl AppState {
    /// Check if hot reload is enabled.
    #[must_use]
    pub(crate) fn hot_reload_enabled(&self) -> bool {
        self.engine.config().hot_reload
    }
}
