//! Page and template compilation.
//!
//! [`Compiler`] turns raw source text into a [`CompiledBody`] that renders
//! against a [`Scope`]. The shipped [`ExpressionCompiler`] supports:
//!
//! - `{{ key }}` and dotted paths (`{{ model.author.name }}`)
//! - `{{{{` as an escape for a literal `{{`
//! - an optional `@template <path-or-name>` directive on the first non-blank
//!   line, removed from the body

use std::sync::{Arc, LazyLock};

use regex::Regex;
use serde_json::Value;

use crate::scope::Scope;

/// Directive keyword declaring a page's template.
const DIRECTIVE: &str = "@template";

static EXPRESSION_PATTERN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^[A-Za-z_][A-Za-z0-9_-]*(?:\.[A-Za-z0-9_-]+)*$")
        .expect("invalid expression regex")
});

/// Compilation diagnostic.
#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
pub enum CompileError {
    /// `{{` without a closing `}}`.
    #[error("Unterminated expression on line {line}")]
    UnterminatedExpression {
        /// 1-based source line of the opening braces.
        line: usize,
    },
    /// `{{ }}` with nothing inside.
    #[error("Empty expression on line {line}")]
    EmptyExpression {
        /// 1-based source line.
        line: usize,
    },
    /// Expression that is not a dotted identifier path.
    #[error("Invalid expression '{expression}' on line {line}")]
    InvalidExpression {
        /// Expression text.
        expression: String,
        /// 1-based source line.
        line: usize,
    },
    /// `@template` without a template name.
    #[error("Template directive without a name on line {line}")]
    EmptyDirective {
        /// 1-based source line.
        line: usize,
    },
    /// Template without exactly one body placeholder.
    #[error("Expected exactly one body placeholder, found {found}")]
    BodyPlaceholder {
        /// Number of placeholders present.
        found: usize,
    },
}

/// Compiled form of a page or template.
///
/// Rendering never fails: unknown names render as empty text.
pub trait CompiledBody: Send + Sync {
    /// Produce the body text for `scope`.
    fn render(&self, scope: &Scope) -> String;

    /// Source text with the directive line removed.
    fn raw_text(&self) -> &str;

    /// Template named by an in-body `@template` directive.
    fn directive_template(&self) -> Option<&str>;
}

/// Compiles source text into a [`CompiledBody`].
pub trait Compiler: Send + Sync {
    /// Compile source text.
    ///
    /// # Errors
    ///
    /// Returns [`CompileError`] describing the first problem found.
    fn compile(&self, source: &str) -> Result<Arc<dyn CompiledBody>, CompileError>;
}

/// Default compiler for `{{ expression }}` substitution.
#[derive(Clone, Copy, Debug, Default)]
pub struct ExpressionCompiler;

impl Compiler for ExpressionCompiler {
    fn compile(&self, source: &str) -> Result<Arc<dyn CompiledBody>, CompileError> {
        let (directive, body, first_line) = split_directive(source)?;
        let segments = parse_segments(body, first_line)?;
        Ok(Arc::new(CompiledExpressions {
            segments,
            raw_text: body.to_owned(),
            directive,
        }))
    }
}

#[derive(Debug, PartialEq)]
enum Segment {
    Text(String),
    Expression(String),
}

struct CompiledExpressions {
    segments: Vec<Segment>,
    raw_text: String,
    directive: Option<String>,
}

impl CompiledBody for CompiledExpressions {
    fn render(&self, scope: &Scope) -> String {
        let mut out = String::with_capacity(self.raw_text.len());
        for segment in &self.segments {
            match segment {
                Segment::Text(text) => out.push_str(text),
                Segment::Expression(path) => {
                    if let Some(value) = scope.lookup(path) {
                        push_value(&mut out, value);
                    }
                }
            }
        }
        out
    }

    fn raw_text(&self) -> &str {
        &self.raw_text
    }

    fn directive_template(&self) -> Option<&str> {
        self.directive.as_deref()
    }
}

fn push_value(out: &mut String, value: &Value) {
    match value {
        Value::Null => {}
        Value::String(s) => out.push_str(s),
        other => out.push_str(&other.to_string()),
    }
}

/// Split off a leading `@template` directive.
///
/// Returns the directive value, the remaining body and the source line the
/// body starts on.
fn split_directive(source: &str) -> Result<(Option<String>, &str, usize), CompileError> {
    let mut offset = 0;
    for (index, line) in source.split_inclusive('\n').enumerate() {
        let trimmed = line.trim();
        if trimmed.is_empty() {
            offset += line.len();
            continue;
        }

        let Some(argument) = trimmed.strip_prefix(DIRECTIVE) else {
            break;
        };
        if !argument.is_empty() && !argument.starts_with(char::is_whitespace) {
            break;
        }

        let name = argument.trim().trim_matches(|c| c == '"' || c == '\'');
        if name.is_empty() {
            return Err(CompileError::EmptyDirective { line: index + 1 });
        }
        return Ok((
            Some(name.to_owned()),
            &source[offset + line.len()..],
            index + 2,
        ));
    }
    Ok((None, source, 1))
}

fn parse_segments(body: &str, first_line: usize) -> Result<Vec<Segment>, CompileError> {
    let line_at = |pos: usize| first_line + body[..pos].matches('\n').count();

    let mut segments = Vec::new();
    let mut text = String::new();
    let mut pos = 0;

    while let Some(found) = body[pos..].find("{{") {
        let open = pos + found;
        text.push_str(&body[pos..open]);
        let inner_start = open + 2;

        if body[inner_start..].starts_with("{{") {
            text.push_str("{{");
            pos = inner_start + 2;
            continue;
        }

        let Some(len) = body[inner_start..].find("}}") else {
            return Err(CompileError::UnterminatedExpression {
                line: line_at(open),
            });
        };
        let expression = body[inner_start..inner_start + len].trim();
        if expression.is_empty() {
            return Err(CompileError::EmptyExpression {
                line: line_at(open),
            });
        }
        if !EXPRESSION_PATTERN.is_match(expression) {
            return Err(CompileError::InvalidExpression {
                expression: expression.to_owned(),
                line: line_at(open),
            });
        }

        if !text.is_empty() {
            segments.push(Segment::Text(std::mem::take(&mut text)));
        }
        segments.push(Segment::Expression(expression.to_owned()));
        pos = inner_start + len + 2;
    }

    text.push_str(&body[pos..]);
    if !text.is_empty() {
        segments.push(Segment::Text(text));
    }
    Ok(segments)
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;
    use serde_json::json;

    use super::*;

    fn compile(source: &str) -> Arc<dyn CompiledBody> {
        ExpressionCompiler.compile(source).unwrap()
    }

    #[test]
    fn test_plain_text_renders_unchanged() {
        let body = compile("# About\n\nNo expressions here.");

        assert_eq!(body.render(&Scope::new()), "# About\n\nNo expressions here.");
        assert_eq!(body.directive_template(), None);
    }

    #[test]
    fn test_expressions_resolve_against_scope() {
        let body = compile("Hello {{ name }}, by {{model.author}}!");
        let scope = Scope::with_model(json!({"author": "Ada"})).with("name", "World");

        assert_eq!(body.render(&scope), "Hello World, by Ada!");
    }

    #[test]
    fn test_value_formatting() {
        let body = compile("{{ n }}|{{ b }}|{{ z }}|{{ missing }}|{{ list }}");
        let scope = Scope::new()
            .with("n", 42)
            .with("b", true)
            .with("z", Value::Null)
            .with("list", json!([1, 2]));

        assert_eq!(body.render(&scope), "42|true|||[1,2]");
    }

    #[test]
    fn test_escaped_braces() {
        let body = compile("Use {{{{ name }} to interpolate");

        assert_eq!(
            body.render(&Scope::new().with("name", "x")),
            "Use {{ name }} to interpolate"
        );
    }

    #[test]
    fn test_directive_is_extracted_and_removed() {
        let body = compile("\n@template views/shared/_wide.html\n# Guide\n");

        assert_eq!(body.directive_template(), Some("views/shared/_wide.html"));
        assert_eq!(body.raw_text(), "# Guide\n");
        assert_eq!(body.render(&Scope::new()), "# Guide\n");
    }

    #[test]
    fn test_directive_accepts_quoted_name() {
        let body = compile("@template \"_wide\"\nText");

        assert_eq!(body.directive_template(), Some("_wide"));
    }

    #[test]
    fn test_directive_only_on_first_non_blank_line() {
        let body = compile("# Guide\n@template _wide\n");

        assert_eq!(body.directive_template(), None);
        assert_eq!(body.raw_text(), "# Guide\n@template _wide\n");
    }

    #[test]
    fn test_directive_prefix_must_be_whole_word() {
        let body = compile("@templates are great\n");

        assert_eq!(body.directive_template(), None);
    }

    #[test]
    fn test_empty_directive_is_error() {
        let err = ExpressionCompiler.compile("\n@template   \nText").err().unwrap();

        assert_eq!(err, CompileError::EmptyDirective { line: 2 });
    }

    #[test]
    fn test_unterminated_expression_reports_line() {
        let err = ExpressionCompiler
            .compile("line one\nline two {{ name\n")
            .err()
            .unwrap();

        assert_eq!(err, CompileError::UnterminatedExpression { line: 2 });
    }

    #[test]
    fn test_line_numbers_count_directive_line() {
        let err = ExpressionCompiler
            .compile("@template _wide\nok\n{{ }}")
            .err()
            .unwrap();

        assert_eq!(err, CompileError::EmptyExpression { line: 3 });
    }

    #[test]
    fn test_invalid_expression() {
        let err = ExpressionCompiler.compile("{{ a b }}").err().unwrap();

        assert_eq!(
            err,
            CompileError::InvalidExpression {
                expression: "a b".to_owned(),
                line: 1
            }
        );
    }

    #[test]
    fn test_segments_merge_adjacent_text() {
        let segments = parse_segments("a {{{{ b {{ c }}", 1).unwrap();

        assert_eq!(
            segments,
            vec![
                Segment::Text("a {{ b ".to_owned()),
                Segment::Expression("c".to_owned()),
            ]
        );
    }

    #[test]
    fn test_compiler_is_send_sync() {
        static_assertions::assert_impl_all!(ExpressionCompiler: Send, Sync);
    }
}
