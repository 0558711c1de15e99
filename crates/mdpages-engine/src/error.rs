//! Engine error type.

use mdpages_storage::StorageError;

use crate::compiler::CompileError;
use crate::page::PageRole;

/// Error returned by registration and rendering.
#[derive(Debug, thiserror::Error)]
pub enum EngineError {
    /// No page was found for the requested name.
    #[error("Page not found: {0}")]
    PageNotFound(String),
    /// An explicitly requested template could not be resolved.
    #[error("Template not found for page: {page}")]
    TemplateNotFound {
        /// Page being rendered.
        page: String,
    },
    /// A page's `@template` directive names a template that exists nowhere.
    #[error("Could not find template '{template}' referenced in page '{page}'")]
    MissingTemplate {
        /// Template path or name from the directive.
        template: String,
        /// Virtual path of the declaring page.
        page: String,
    },
    /// A page with the same key is already registered for this role.
    #[error("Duplicate {role} key: {key}")]
    DuplicateKey {
        /// Partition the page was inserted into.
        role: PageRole,
        /// Colliding key.
        key: String,
    },
    /// Source text failed to compile.
    #[error("Failed to compile {path}: {source}")]
    Compile {
        /// Virtual path of the source.
        path: String,
        /// Compiler diagnostic.
        #[source]
        source: CompileError,
    },
    /// Backing store failure.
    #[error(transparent)]
    Storage(#[from] StorageError),
    /// Failure writing rendered output.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl EngineError {
    /// True if the error means the requested page does not exist.
    #[must_use]
    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::PageNotFound(_))
    }
}
