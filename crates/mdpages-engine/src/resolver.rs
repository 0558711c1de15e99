//! Template resolution.

use std::sync::Arc;

use crate::engine::PageEngine;
use crate::error::EngineError;
use crate::page::Page;
use crate::path::bare_name;
use crate::template::Template;

impl PageEngine {
    /// Choose the template that wraps `page`.
    ///
    /// Resolution order:
    ///
    /// 1. `explicit`, if registered
    /// 2. the page's `@template` directive: by path, then by bare name in the
    ///    shared templates directory, then loaded from the backing store
    /// 3. the page's convention template
    /// 4. the default template, only when no explicit template was requested
    ///
    /// Returns `Ok(None)` when nothing applies and the page renders unwrapped.
    ///
    /// # Errors
    ///
    /// - [`EngineError::MissingTemplate`] if the directive target exists nowhere
    /// - [`EngineError::TemplateNotFound`] if `explicit` was given and nothing
    ///   resolved
    pub fn resolve_template(
        &self,
        page: &Page,
        explicit: Option<&str>,
    ) -> Result<Option<Arc<Template>>, EngineError> {
        if let Some(path) = explicit
            && let Some(template) = self.store.template(path)
        {
            return Ok(Some(template));
        }

        if let Some(directive) = page.directive_template() {
            return self.resolve_directive(page, &directive).map(Some);
        }

        if let Some(path) = page.template()
            && let Some(template) = self.store.template(path)
        {
            return Ok(Some(template));
        }

        if explicit.is_some() {
            return Err(EngineError::TemplateNotFound {
                page: page.file_path().to_owned(),
            });
        }

        Ok(self
            .config
            .default_template
            .as_deref()
            .and_then(|path| self.store.template(path)))
    }

    /// Registered template for a directive value, without touching storage.
    pub(crate) fn cached_directive_template(&self, directive: &str) -> Option<Arc<Template>> {
        self.store.template(directive).or_else(|| {
            self.shared_template_path(directive)
                .and_then(|path| self.store.template(&path))
        })
    }

    fn resolve_directive(&self, page: &Page, directive: &str) -> Result<Arc<Template>, EngineError> {
        if let Some(template) = self.cached_directive_template(directive) {
            return Ok(template);
        }

        let Some(file) = self.storage.get(directive) else {
            return Err(EngineError::MissingTemplate {
                template: directive.to_owned(),
                page: page.virtual_path().to_owned(),
            });
        };

        let template = self.load_template(&file)?;
        tracing::info!(template = directive, page = page.virtual_path(), "Registered template on demand");
        Ok(template)
    }

    /// `{shared_dir}/{bare_name}.{template_ext}` for a template reference.
    fn shared_template_path(&self, reference: &str) -> Option<String> {
        let dir = self.config.shared_templates_dir()?;
        Some(format!(
            "{}/{}.{}",
            dir.trim_end_matches('/'),
            bare_name(reference),
            self.config.template_ext
        ))
    }
}

#[cfg(test)]
mod tests {
    use mdpages_storage::{FileRef, MockStorage, Storage};
    use pretty_assertions::assert_eq;

    use super::*;
    use crate::config::EngineConfig;
    use crate::page::PageRole;

    fn setup(storage: MockStorage, config: EngineConfig) -> (Arc<MockStorage>, PageEngine) {
        let storage = Arc::new(storage);
        let engine = PageEngine::new(Arc::clone(&storage) as Arc<dyn Storage>, config);
        (storage, engine)
    }

    fn page(engine: &PageEngine, path: &str, template: Option<&str>) -> Arc<Page> {
        engine
            .register_page(
                &FileRef::new(path, 1.0),
                PageRole::ContentPage,
                template.map(str::to_owned),
            )
            .unwrap()
            .unwrap()
    }

    fn path_of(resolved: Option<Arc<Template>>) -> Option<String> {
        resolved.map(|t| t.path().to_owned())
    }

    #[test]
    fn test_explicit_wins() {
        let (_, engine) = setup(
            MockStorage::new().with_file("about.md", "@template _wide\nx"),
            EngineConfig::default(),
        );
        engine.add_template("print.html", "<!--@body-->");
        engine.add_template("views/shared/_wide.html", "<!--@body-->");
        let page = page(&engine, "about.md", None);

        let resolved = engine.resolve_template(&page, Some("print.html")).unwrap();

        assert_eq!(path_of(resolved).as_deref(), Some("print.html"));
    }

    #[test]
    fn test_directive_by_path() {
        let (_, engine) = setup(
            MockStorage::new().with_file("about.md", "@template custom/_wide.html\nx"),
            EngineConfig::default(),
        );
        engine.add_template("custom/_wide.html", "<!--@body-->");
        engine.add_template("_layout.html", "<!--@body-->");
        let page = page(&engine, "about.md", Some("_layout.html"));

        let resolved = engine.resolve_template(&page, None).unwrap();

        assert_eq!(path_of(resolved).as_deref(), Some("custom/_wide.html"));
    }

    #[test]
    fn test_directive_bare_name_uses_shared_dir() {
        let (_, engine) = setup(
            MockStorage::new().with_file("about.md", "@template _wide\nx"),
            EngineConfig::default(),
        );
        engine.add_template("views/shared/_wide.html", "<!--@body-->");
        let page = page(&engine, "about.md", None);

        let resolved = engine.resolve_template(&page, None).unwrap();

        assert_eq!(path_of(resolved).as_deref(), Some("views/shared/_wide.html"));
    }

    #[test]
    fn test_directive_loaded_on_demand() {
        let (storage, engine) = setup(
            MockStorage::new()
                .with_file("about.md", "@template themes/_dark.html\nx")
                .with_file("themes/_dark.html", "D<!--@body-->"),
            EngineConfig::default(),
        );
        let page = page(&engine, "about.md", None);
        assert!(engine.store().template("themes/_dark.html").is_none());

        let resolved = engine.resolve_template(&page, None).unwrap();

        assert_eq!(path_of(resolved).as_deref(), Some("themes/_dark.html"));
        assert!(engine.store().template("themes/_dark.html").is_some());
        assert_eq!(storage.probes(), 1);
    }

    #[test]
    fn test_directive_missing_everywhere() {
        let (_, engine) = setup(
            MockStorage::new().with_file("about.md", "@template _nowhere\nx"),
            EngineConfig::default(),
        );
        engine.add_template("_layout.html", "<!--@body-->");
        let page = page(&engine, "about.md", Some("_layout.html"));

        let err = engine.resolve_template(&page, None).unwrap_err();

        assert!(matches!(
            err,
            EngineError::MissingTemplate { ref template, ref page }
                if template == "_nowhere" && page == "about.md"
        ));
    }

    #[test]
    fn test_convention_template() {
        let (_, engine) = setup(
            MockStorage::new().with_file("docs/guide.md", "x"),
            EngineConfig::default(),
        );
        engine.add_template("docs/_layout.html", "<!--@body-->");
        engine.add_template("_layout.html", "<!--@body-->");
        let page = page(&engine, "docs/guide.md", Some("docs/_layout.html"));

        let resolved = engine.resolve_template(&page, None).unwrap();

        assert_eq!(path_of(resolved).as_deref(), Some("docs/_layout.html"));
    }

    #[test]
    fn test_default_template_fallback() {
        let (_, engine) = setup(
            MockStorage::new().with_file("about.md", "x"),
            EngineConfig::default(),
        );
        engine.add_template("_layout.html", "<!--@body-->");
        let page = page(&engine, "about.md", None);

        let resolved = engine.resolve_template(&page, None).unwrap();

        assert_eq!(path_of(resolved).as_deref(), Some("_layout.html"));
    }

    #[test]
    fn test_nothing_resolves_to_none() {
        let (_, engine) = setup(
            MockStorage::new().with_file("about.md", "x"),
            EngineConfig::default(),
        );
        let page = page(&engine, "about.md", None);

        assert!(engine.resolve_template(&page, None).unwrap().is_none());
    }

    #[test]
    fn test_explicit_unresolved_is_template_not_found() {
        let (_, engine) = setup(
            MockStorage::new().with_file("about.md", "x"),
            EngineConfig::default(),
        );
        engine.add_template("_layout.html", "<!--@body-->");
        let page = page(&engine, "about.md", None);

        let err = engine.resolve_template(&page, Some("print.html")).unwrap_err();

        assert!(matches!(err, EngineError::TemplateNotFound { ref page } if page == "about"));
    }

    #[test]
    fn test_concurrent_first_use_of_directive_template_shares_one_entry() {
        use std::sync::Barrier;
        use std::thread;

        let (_, engine) = setup(
            MockStorage::new()
                .with_file("about.md", "@template themes/_dark.html\nx")
                .with_file("themes/_dark.html", "D<!--@body-->"),
            EngineConfig::default(),
        );
        let engine = Arc::new(engine);
        let page = page(&engine, "about.md", None);
        let barrier = Arc::new(Barrier::new(8));

        let workers: Vec<_> = (0..8)
            .map(|_| {
                let engine = Arc::clone(&engine);
                let page = Arc::clone(&page);
                let barrier = Arc::clone(&barrier);
                thread::spawn(move || {
                    barrier.wait();
                    engine.resolve_template(&page, None).unwrap().unwrap()
                })
            })
            .collect();
        let resolved: Vec<_> = workers.into_iter().map(|w| w.join().unwrap()).collect();

        let stored = engine.store().template("themes/_dark.html").unwrap();
        assert!(resolved.iter().all(|t| Arc::ptr_eq(t, &stored)));
        assert_eq!(engine.store().template_count(), 1);
    }
}
