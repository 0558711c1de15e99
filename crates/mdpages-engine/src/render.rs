//! Two-stage render pipeline: page body, then template composition.

use crate::engine::PageEngine;
use crate::error::EngineError;
use crate::page::{Page, PageRole};
use crate::scope::{BODY_KEY, Scope};

/// Options for [`PageEngine::render`].
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct RenderOptions {
    /// Pass the rendered body through the markup transform.
    pub render_markup: bool,
    /// Compose the body into a template.
    pub wrap_in_template: bool,
    /// Template path that takes precedence over every other source.
    pub template: Option<String>,
}

impl RenderOptions {
    /// Markup transform plus template wrapping: a full HTML page.
    #[must_use]
    pub fn html() -> Self {
        Self {
            render_markup: true,
            wrap_in_template: true,
            template: None,
        }
    }

    /// The raw body: no transform, no template.
    #[must_use]
    pub fn raw() -> Self {
        Self::default()
    }

    /// Request a specific template.
    #[must_use]
    pub fn with_template(mut self, template: impl Into<String>) -> Self {
        self.template = Some(template.into());
        self
    }
}

impl PageEngine {
    /// Render a page.
    ///
    /// Reloads stale sources first when hot reload is enabled. The body is
    /// rendered against `scope`, optionally transformed, and then, if
    /// wrapping is requested and a template resolves, bound to the `body` key
    /// and rendered through the template. The returned text is
    /// self-contained.
    ///
    /// # Errors
    ///
    /// Returns a template resolution error (see
    /// [`PageEngine::resolve_template`]).
    pub fn render(
        &self,
        page: &Page,
        mut scope: Scope,
        options: &RenderOptions,
    ) -> Result<String, EngineError> {
        self.refresh_if_stale(page);

        let revision = page.revision();
        let text = revision.compiled().render(&scope);
        let body = if options.render_markup {
            self.transform.transform(&text)
        } else {
            text
        };

        if !options.wrap_in_template {
            return Ok(body);
        }

        let Some(template) = self.resolve_template(page, options.template.as_deref())? else {
            return Ok(body);
        };
        self.refresh_template_if_stale(&template);

        scope.insert(BODY_KEY, body);
        Ok(template.revision().compiled().render(&scope))
    }

    /// Look up a page by role and key, then render it.
    ///
    /// # Errors
    ///
    /// Returns [`EngineError::PageNotFound`] naming `key` if no such page is
    /// registered, otherwise as [`PageEngine::render`].
    pub fn render_named(
        &self,
        role: PageRole,
        key: &str,
        scope: Scope,
        options: &RenderOptions,
    ) -> Result<String, EngineError> {
        let page = self
            .store
            .page(role, key)
            .ok_or_else(|| EngineError::PageNotFound(key.to_owned()))?;
        self.render(&page, scope, options)
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use mdpages_storage::{FileRef, MockStorage, Storage};
    use pretty_assertions::assert_eq;
    use serde_json::json;

    use super::*;
    use crate::config::EngineConfig;

    fn setup(storage: MockStorage, config: EngineConfig) -> (Arc<MockStorage>, PageEngine) {
        let storage = Arc::new(storage);
        let engine = PageEngine::new(Arc::clone(&storage) as Arc<dyn Storage>, config);
        (storage, engine)
    }

    fn register(engine: &PageEngine, path: &str, template: Option<&str>) -> Arc<Page> {
        engine
            .register_page(
                &FileRef::new(path, 1.0),
                PageRole::ContentPage,
                template.map(str::to_owned),
            )
            .unwrap()
            .unwrap()
    }

    #[test]
    fn test_content_page_without_template_renders_transformed_body() {
        let (_, engine) = setup(
            MockStorage::new().with_file("about.md", "# About"),
            EngineConfig::default(),
        );
        let page = register(&engine, "about.md", None);

        let html = engine.render(&page, Scope::new(), &RenderOptions::html()).unwrap();

        assert_eq!(html, "<h1>About</h1>\n");
    }

    #[test]
    fn test_directive_template_wraps_body() {
        let (_, engine) = setup(
            MockStorage::new().with_file("guide.md", "@template views/shared/_wide.html\n# Guide"),
            EngineConfig::default(),
        );
        engine.add_template("views/shared/_wide.html", "<main class=\"wide\"><!--@body--></main>");
        engine.add_template("_layout.html", "<main><!--@body--></main>");
        let page = register(&engine, "guide.md", Some("_layout.html"));

        let html = engine.render(&page, Scope::new(), &RenderOptions::html()).unwrap();

        assert_eq!(html, "<main class=\"wide\"><h1>Guide</h1>\n</main>");
    }

    #[test]
    fn test_raw_options_skip_transform_and_template() {
        let (_, engine) = setup(
            MockStorage::new().with_file("about.md", "# {{ model.title }}"),
            EngineConfig::default(),
        );
        engine.add_template("_layout.html", "<main><!--@body--></main>");
        let page = register(&engine, "about.md", Some("_layout.html"));

        let text = engine
            .render(&page, Scope::with_model(json!({"title": "Hi"})), &RenderOptions::raw())
            .unwrap();

        assert_eq!(text, "# Hi");
    }

    #[test]
    fn test_template_sees_model_and_custom_transform() {
        let (_, engine) = setup(
            MockStorage::new().with_file("about.md", "body"),
            EngineConfig::default(),
        );
        let engine = engine.with_transform(Arc::new(|text: &str| format!("[{text}]")));
        engine.add_template("_layout.html", "<title>{{ model.title }}</title><!--@body-->");
        let page = register(&engine, "about.md", None);

        let html = engine
            .render(&page, Scope::with_model(json!({"title": "T"})), &RenderOptions::html())
            .unwrap();

        assert_eq!(html, "<title>T</title>[body]");
    }

    #[test]
    fn test_explicit_template_missing_fails() {
        let (_, engine) = setup(
            MockStorage::new().with_file("about.md", "x"),
            EngineConfig::default(),
        );
        let page = register(&engine, "about.md", None);

        let err = engine
            .render(&page, Scope::new(), &RenderOptions::html().with_template("print.html"))
            .unwrap_err();

        assert!(matches!(err, EngineError::TemplateNotFound { .. }));
    }

    #[test]
    fn test_render_named_missing_page() {
        let (_, engine) = setup(MockStorage::new(), EngineConfig::default());

        let err = engine
            .render_named(PageRole::ViewPage, "ghost", Scope::new(), &RenderOptions::html())
            .unwrap_err();

        assert!(matches!(err, EngineError::PageNotFound(ref name) if name == "ghost"));
    }

    #[test]
    fn test_hot_reload_is_visible_in_next_render() {
        let (storage, engine) = setup(
            MockStorage::new().with_file("about.md", "old"),
            EngineConfig {
                hot_reload: true,
                ..Default::default()
            },
        );
        let page = register(&engine, "about.md", None);
        assert_eq!(
            engine.render(&page, Scope::new(), &RenderOptions::raw()).unwrap(),
            "old"
        );

        storage.set_file("about.md", "new", 2.0);

        assert_eq!(
            engine.render(&page, Scope::new(), &RenderOptions::raw()).unwrap(),
            "new"
        );
    }

    #[test]
    fn test_default_template_reloaded_on_render() {
        let (storage, engine) = setup(
            MockStorage::new()
                .with_file("about.md", "x")
                .with_file("_layout.html", "A<!--@body-->"),
            EngineConfig {
                hot_reload: true,
                ..Default::default()
            },
        );
        engine.add_template("_layout.html", "A<!--@body-->");
        let page = register(&engine, "about.md", None);
        let engine = engine.with_transform(Arc::new(|text: &str| text.to_owned()));

        storage.set_file("_layout.html", "B<!--@body-->", 2.0);

        assert_eq!(
            engine.render(&page, Scope::new(), &RenderOptions::html()).unwrap(),
            "Bx"
        );
    }
}
