//! Engine core: owns the store and the pluggable collaborators.

use std::sync::Arc;

use mdpages_storage::{FileRef, Storage};

use crate::compiler::{CompileError, CompiledBody, Compiler, ExpressionCompiler};
use crate::config::EngineConfig;
use crate::error::EngineError;
use crate::negative_cache::NegativeCache;
use crate::page::{Page, PageRole, Revision};
use crate::store::DocumentStore;
use crate::template::{Template, compile_template};
use crate::transform::{MarkdownTransform, MarkupTransform};

/// Counts for operator diagnostics.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct EngineStats {
    /// Registered content pages.
    pub content_pages: usize,
    /// Registered view pages.
    pub view_pages: usize,
    /// Registered shared view pages.
    pub shared_view_pages: usize,
    /// Registered templates.
    pub templates: usize,
    /// Paths currently in the negative cache.
    pub missing_paths: usize,
}

/// Page rendering engine.
///
/// Holds every registered page and template. There is no global instance:
/// construct one per site and share it behind an `Arc`.
pub struct PageEngine {
    pub(crate) config: EngineConfig,
    pub(crate) storage: Arc<dyn Storage>,
    pub(crate) compiler: Arc<dyn Compiler>,
    pub(crate) transform: Arc<dyn MarkupTransform>,
    pub(crate) store: DocumentStore,
    pub(crate) missing: NegativeCache,
}

impl PageEngine {
    /// Create an engine with the default compiler and Markdown transform.
    ///
    /// # Arguments
    ///
    /// * `storage` - Backing store for page and template sources
    /// * `config` - Engine configuration
    #[must_use]
    pub fn new(storage: Arc<dyn Storage>, config: EngineConfig) -> Self {
        Self {
            config,
            storage,
            compiler: Arc::new(ExpressionCompiler),
            transform: Arc::new(MarkdownTransform),
            store: DocumentStore::new(),
            missing: NegativeCache::new(),
        }
    }

    /// Replace the compiler.
    #[must_use]
    pub fn with_compiler(mut self, compiler: Arc<dyn Compiler>) -> Self {
        self.compiler = compiler;
        self
    }

    /// Replace the markup transform.
    #[must_use]
    pub fn with_transform(mut self, transform: Arc<dyn MarkupTransform>) -> Self {
        self.transform = transform;
        self
    }

    /// Engine configuration.
    #[must_use]
    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    /// Registered pages and templates.
    #[must_use]
    pub fn store(&self) -> &DocumentStore {
        &self.store
    }

    /// Negative cache of missing request paths.
    #[must_use]
    pub fn negative_cache(&self) -> &NegativeCache {
        &self.missing
    }

    /// Current registration counts.
    #[must_use]
    pub fn stats(&self) -> EngineStats {
        EngineStats {
            content_pages: self.store.page_count(PageRole::ContentPage),
            view_pages: self.store.page_count(PageRole::ViewPage),
            shared_view_pages: self.store.page_count(PageRole::SharedViewPage),
            templates: self.store.template_count(),
            missing_paths: self.missing.len(),
        }
    }

    /// Compile and register a page from its backing file.
    ///
    /// A page that fails to compile is logged and skipped (`Ok(None)`).
    ///
    /// # Errors
    ///
    /// Returns [`EngineError::DuplicateKey`] if the page's key is taken, or a
    /// storage error if the file can't be read.
    pub fn register_page(
        &self,
        file: &FileRef,
        role: PageRole,
        template: Option<String>,
    ) -> Result<Option<Arc<Page>>, EngineError> {
        let text = self.storage.read(&file.virtual_path)?;
        let compiled = match self.compile_page(&text) {
            Ok(compiled) => compiled,
            Err(e) => {
                tracing::warn!(path = %file.virtual_path, error = %e, "Failed to compile page, skipping");
                return Ok(None);
            }
        };

        let page = Page::new(
            file,
            &self.config.markdown_ext,
            role,
            template,
            Revision::new(compiled, file.last_modified),
        );
        let page = self.store.add_page(page)?;
        tracing::debug!(path = %file.virtual_path, %role, key = page.key(), "Registered page");
        Ok(Some(page))
    }

    /// Register a template from raw text unless one already exists at `path`.
    ///
    /// Returns the registered template, or `None` if compilation failed.
    pub fn add_template(&self, path: &str, raw_text: &str) -> Option<Arc<Template>> {
        if let Some(existing) = self.store.template(path) {
            return Some(existing);
        }
        let last_modified = self.storage.mtime(path).unwrap_or_default();
        let file = FileRef::new(path, last_modified);
        match self.insert_template(&file, raw_text) {
            Ok(template) => Some(template),
            Err(e) => {
                tracing::warn!(path, error = %e, "Failed to compile template, skipping");
                None
            }
        }
    }

    /// Read, compile and register a template from its backing file.
    pub(crate) fn load_template(&self, file: &FileRef) -> Result<Arc<Template>, EngineError> {
        if let Some(existing) = self.store.template(&file.virtual_path) {
            return Ok(existing);
        }
        let text = self.storage.read(&file.virtual_path)?;
        self.insert_template(file, &text)
    }

    fn insert_template(&self, file: &FileRef, raw_text: &str) -> Result<Arc<Template>, EngineError> {
        let compiled = self.compile_template(raw_text).map_err(|source| EngineError::Compile {
            path: file.virtual_path.clone(),
            source,
        })?;
        let template = self
            .store
            .insert_template(Template::new(file, Revision::new(compiled, file.last_modified)));
        tracing::debug!(path = %file.virtual_path, "Registered template");
        Ok(template)
    }

    pub(crate) fn compile_page(
        &self,
        raw_text: &str,
    ) -> Result<Arc<dyn CompiledBody>, CompileError> {
        self.compiler.compile(&self.config.replace_tokens(raw_text))
    }

    pub(crate) fn compile_template(
        &self,
        raw_text: &str,
    ) -> Result<Arc<dyn CompiledBody>, CompileError> {
        compile_template(self.compiler.as_ref(), &self.config.replace_tokens(raw_text))
    }
}
