//! Engine configuration.

/// Configuration for [`PageEngine`](crate::PageEngine).
#[derive(Clone, Debug, PartialEq)]
pub struct EngineConfig {
    /// Reload pages and templates whose backing file changed.
    pub hot_reload: bool,
    /// Page name served for directory requests (`/docs/` → `docs/index`).
    pub default_page: String,
    /// Template used when a page names none of its own.
    pub default_template: Option<String>,
    /// Convention layout file name looked up in each page's directory chain.
    pub layout_name: String,
    /// Page file extension, without dot.
    pub markdown_ext: String,
    /// Template file extension, without dot.
    pub template_ext: String,
    /// Directory whose pages become view pages.
    pub views_dir: String,
    /// Directories whose pages become shared view pages.
    ///
    /// The first entry is also where bare template names are looked up.
    pub shared_dirs: Vec<String>,
    /// Virtual path prefixes skipped during discovery.
    pub exclude_prefixes: Vec<String>,
    /// Token replacements applied in order to every loaded source text.
    pub replace_tokens: Vec<(String, String)>,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            hot_reload: false,
            default_page: "index".to_owned(),
            default_template: Some("_layout.html".to_owned()),
            layout_name: "_layout".to_owned(),
            markdown_ext: "md".to_owned(),
            template_ext: "html".to_owned(),
            views_dir: "views".to_owned(),
            shared_dirs: vec!["views/shared".to_owned()],
            exclude_prefixes: ["target/", "bin/", "obj/", "node_modules/"]
                .into_iter()
                .map(str::to_owned)
                .collect(),
            replace_tokens: Vec::new(),
        }
    }
}

impl EngineConfig {
    /// Directory searched for templates referenced by bare name.
    #[must_use]
    pub fn shared_templates_dir(&self) -> Option<&str> {
        self.shared_dirs.first().map(String::as_str)
    }

    /// Apply every token replacement to `text`.
    #[must_use]
    pub fn replace_tokens(&self, text: &str) -> String {
        self.replace_tokens
            .iter()
            .fold(text.to_owned(), |acc, (token, replacement)| {
                acc.replace(token.as_str(), replacement)
            })
    }
}
