//! Registry of compiled pages and templates.

use std::collections::HashMap;
use std::collections::hash_map::Entry;
use std::sync::{Arc, RwLock};

use crate::error::EngineError;
use crate::page::{Page, PageRole};
use crate::template::Template;

/// Compiled pages partitioned by role, plus templates keyed by path.
///
/// Readers take a shared lock only long enough to clone an `Arc`.
#[derive(Debug, Default)]
pub struct DocumentStore {
    content_pages: RwLock<HashMap<String, Arc<Page>>>,
    view_pages: RwLock<HashMap<String, Arc<Page>>>,
    shared_view_pages: RwLock<HashMap<String, Arc<Page>>>,
    templates: RwLock<HashMap<String, Arc<Template>>>,
}

impl DocumentStore {
    /// Create an empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    fn partition(&self, role: PageRole) -> &RwLock<HashMap<String, Arc<Page>>> {
        match role {
            PageRole::ContentPage => &self.content_pages,
            PageRole::ViewPage => &self.view_pages,
            PageRole::SharedViewPage => &self.shared_view_pages,
        }
    }

    /// Insert a page into its role's partition.
    ///
    /// # Errors
    ///
    /// Returns [`EngineError::DuplicateKey`] if the key is taken; the store is
    /// left unchanged.
    pub fn add_page(&self, page: Page) -> Result<Arc<Page>, EngineError> {
        let mut pages = self.partition(page.role()).write().unwrap();
        match pages.entry(page.key().to_owned()) {
            Entry::Occupied(entry) => Err(EngineError::DuplicateKey {
                role: page.role(),
                key: entry.key().clone(),
            }),
            Entry::Vacant(entry) => Ok(Arc::clone(entry.insert(Arc::new(page)))),
        }
    }

    /// Page by role and key.
    #[must_use]
    pub fn page(&self, role: PageRole, key: &str) -> Option<Arc<Page>> {
        self.partition(role).read().unwrap().get(key).cloned()
    }

    /// View page by name.
    #[must_use]
    pub fn view_page(&self, name: &str) -> Option<Arc<Page>> {
        self.page(PageRole::ViewPage, name)
    }

    /// Shared view page by name.
    #[must_use]
    pub fn shared_view_page(&self, name: &str) -> Option<Arc<Page>> {
        self.page(PageRole::SharedViewPage, name)
    }

    /// First content page matching any of `keys`, in order.
    #[must_use]
    pub fn content_page(&self, keys: &[&str]) -> Option<Arc<Page>> {
        let pages = self.content_pages.read().unwrap();
        keys.iter().find_map(|key| pages.get(*key).cloned())
    }

    /// Keys of all content pages.
    #[must_use]
    pub fn content_keys(&self) -> Vec<String> {
        self.content_pages.read().unwrap().keys().cloned().collect()
    }

    /// Template by virtual path.
    #[must_use]
    pub fn template(&self, path: &str) -> Option<Arc<Template>> {
        self.templates.read().unwrap().get(path).cloned()
    }

    /// Insert a template unless one is already registered at its path.
    ///
    /// Returns the registered template, which is the existing one if another
    /// caller won the race.
    pub fn insert_template(&self, template: Template) -> Arc<Template> {
        let mut templates = self.templates.write().unwrap();
        Arc::clone(
            templates
                .entry(template.path().to_owned())
                .or_insert_with(|| Arc::new(template)),
        )
    }

    /// Number of pages in a partition.
    #[must_use]
    pub fn page_count(&self, role: PageRole) -> usize {
        self.partition(role).read().unwrap().len()
    }

    /// Number of templates.
    #[must_use]
    pub fn template_count(&self) -> usize {
        self.templates.read().unwrap().len()
    }
}
