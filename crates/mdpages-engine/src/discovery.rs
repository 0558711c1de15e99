//! Startup registration and lazy discovery of pages and templates.

use std::collections::HashMap;
use std::sync::Arc;

use crate::engine::PageEngine;
use crate::error::EngineError;
use crate::page::{Page, PageRole};
use crate::path::{is_hidden, is_under, join, parent_dir};

/// Summary of one discovery pass.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct DiscoveryReport {
    /// Pages registered.
    pub pages: usize,
    /// Templates registered.
    pub templates: usize,
    /// Files skipped because they could not be read or compiled.
    pub skipped: usize,
}

/// Nearest convention layout per directory, memoized for one pass.
struct LayoutLookup<'a> {
    engine: &'a PageEngine,
    file_name: String,
    memo: HashMap<String, Option<String>>,
}

impl<'a> LayoutLookup<'a> {
    fn new(engine: &'a PageEngine) -> Self {
        Self {
            engine,
            file_name: format!(
                "{}.{}",
                engine.config.layout_name, engine.config.template_ext
            ),
            memo: HashMap::new(),
        }
    }

    /// Walk from `dir` up to the root; the first registered layout wins.
    fn nearest(&mut self, dir: &str) -> Option<String> {
        let mut visited = Vec::new();
        let mut current = Some(dir);
        let mut found = None;

        while let Some(dir) = current {
            if let Some(known) = self.memo.get(dir) {
                found.clone_from(known);
                break;
            }
            visited.push(dir.to_owned());
            let candidate = join(dir, &self.file_name);
            if self.engine.store.template(&candidate).is_some() {
                found = Some(candidate);
                break;
            }
            current = parent_dir(dir);
        }

        for dir in visited {
            self.memo.insert(dir, found.clone());
        }
        found
    }
}

impl PageEngine {
    /// Register every template and page in the backing store.
    ///
    /// Templates (`**/*.{template_ext}`) are registered first so pages can be
    /// assigned their nearest convention layout. Files under an excluded
    /// prefix are ignored; files that can't be read or compiled are logged
    /// and skipped. Every registered content page is exempted from the
    /// negative cache.
    ///
    /// # Errors
    ///
    /// Returns a storage error if listing fails, or
    /// [`EngineError::DuplicateKey`] if two pages share a key.
    pub fn register_pages(&self) -> Result<DiscoveryReport, EngineError> {
        let mut report = DiscoveryReport::default();

        let pattern = format!("**/*.{}", self.config.template_ext);
        for file in self.storage.list(&pattern)? {
            if self.is_excluded(&file.virtual_path) {
                continue;
            }
            match self.load_template(&file) {
                Ok(_) => report.templates += 1,
                Err(EngineError::Compile { path, source }) => {
                    tracing::warn!(%path, error = %source, "Failed to compile template, skipping");
                    report.skipped += 1;
                }
                Err(EngineError::Storage(e)) => {
                    tracing::warn!(path = %file.virtual_path, error = %e, "Failed to read template, skipping");
                    report.skipped += 1;
                }
                Err(e) => return Err(e),
            }
        }

        let mut layouts = LayoutLookup::new(self);
        let pattern = format!("**/*.{}", self.config.markdown_ext);
        for file in self.storage.list(&pattern)? {
            if self.is_excluded(&file.virtual_path) {
                continue;
            }
            let role = self.classify(&file.virtual_path);
            let template = layouts.nearest(file.directory());
            match self.register_page(&file, role, template) {
                Ok(Some(_)) => report.pages += 1,
                Ok(None) => report.skipped += 1,
                Err(EngineError::Storage(e)) => {
                    tracing::warn!(path = %file.virtual_path, error = %e, "Failed to read page, skipping");
                    report.skipped += 1;
                }
                Err(e) => return Err(e),
            }
        }

        self.missing.set_exempt(self.store.content_keys());

        tracing::info!(
            pages = report.pages,
            templates = report.templates,
            skipped = report.skipped,
            "Registered pages"
        );
        Ok(report)
    }

    /// Probe the backing store for a content page created after startup.
    ///
    /// Makes exactly one `get` call for `{normalized}.{markdown_ext}`; view,
    /// excluded and hidden paths are never probed.
    pub(crate) fn discover_content_page(&self, normalized: &str) -> Option<Arc<Page>> {
        if normalized.ends_with('/') || is_hidden(normalized) {
            return None;
        }
        let candidate = format!("{normalized}.{}", self.config.markdown_ext);
        if self.is_excluded(&candidate) || self.classify(&candidate) != PageRole::ContentPage {
            return None;
        }

        let file = self.storage.get(&candidate)?;
        let template = LayoutLookup::new(self).nearest(file.directory());
        match self.register_page(&file, PageRole::ContentPage, template) {
            Ok(page) => {
                if page.is_some() {
                    tracing::info!(path = %candidate, "Discovered new page");
                }
                page
            }
            Err(EngineError::DuplicateKey { key, .. }) => self.store.content_page(&[key.as_str()]),
            Err(e) => {
                tracing::warn!(path = %candidate, error = %e, "Failed to register discovered page");
                None
            }
        }
    }

    /// Partition for a page path: shared views, then views, then content.
    pub(crate) fn classify(&self, virtual_path: &str) -> PageRole {
        if self
            .config
            .shared_dirs
            .iter()
            .any(|dir| is_under(virtual_path, dir))
        {
            PageRole::SharedViewPage
        } else if is_under(virtual_path, &self.config.views_dir) {
            PageRole::ViewPage
        } else {
            PageRole::ContentPage
        }
    }

    fn is_excluded(&self, virtual_path: &str) -> bool {
        self.config
            .exclude_prefixes
            .iter()
            .any(|prefix| virtual_path.starts_with(prefix.as_str()))
    }
}
