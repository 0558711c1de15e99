//! Markup transform applied to page bodies.

use pulldown_cmark::{Options, Parser, html};

/// Converts rendered page text into final markup.
///
/// Implemented for any `Fn(&str) -> String`, so tests and embedders can pass
/// a closure.
pub trait MarkupTransform: Send + Sync {
    /// Transform body text.
    fn transform(&self, text: &str) -> String;
}

impl<F> MarkupTransform for F
where
    F: Fn(&str) -> String + Send + Sync,
{
    fn transform(&self, text: &str) -> String {
        self(text)
    }
}

/// Markdown to HTML with GitHub-flavored extensions.
#[derive(Clone, Copy, Debug, Default)]
pub struct MarkdownTransform;

impl MarkdownTransform {
    fn options() -> Options {
        Options::ENABLE_TABLES
            | Options::ENABLE_STRIKETHROUGH
            | Options::ENABLE_TASKLISTS
            | Options::ENABLE_FOOTNOTES
            | Options::ENABLE_GFM
    }
}

impl MarkupTransform for MarkdownTransform {
    fn transform(&self, text: &str) -> String {
        let parser = Parser::new_ext(text, Self::options());
        let mut out = String::with_capacity(text.len() * 3 / 2);
        html::push_html(&mut out, parser);
        out
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;

    #[test]
    fn test_markdown_heading_and_paragraph() {
        let html = MarkdownTransform.transform("# Title\n\nHello **world**.");

        assert_eq!(html, "<h1>Title</h1>\n<p>Hello <strong>world</strong>.</p>\n");
    }

    #[test]
    fn test_markdown_tables_enabled() {
        let html = MarkdownTransform.transform("| a | b |\n|---|---|\n| 1 | 2 |\n");

        assert!(html.contains("<table>"));
        assert!(html.contains("<td>1</td>"));
    }

    #[test]
    fn test_markdown_strikethrough_enabled() {
        let html = MarkdownTransform.transform("~~gone~~");

        assert!(html.contains("<del>gone</del>"));
    }

    #[test]
    fn test_closure_transform() {
        let upper = |text: &str| text.to_uppercase();

        assert_eq!(upper.transform("abc"), "ABC");
    }
}
