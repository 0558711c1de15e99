//! Registered pages.

use std::fmt;
use std::sync::Arc;
use std::sync::atomic::AtomicU64;

use arc_swap::ArcSwap;
use mdpages_storage::FileRef;

use crate::compiler::CompiledBody;
use crate::path::content_key;

/// Partition a page is registered in.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum PageRole {
    /// Addressable by request path.
    ContentPage,
    /// Rendered by name, e.g. from an API endpoint.
    ViewPage,
    /// View shared between sections; looked up after view pages.
    SharedViewPage,
}

impl fmt::Display for PageRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::ContentPage => "content page",
            Self::ViewPage => "view page",
            Self::SharedViewPage => "shared view page",
        })
    }
}

/// Compiled body together with the backing-file timestamp it was built from.
///
/// Published as one unit so a reader never sees a new body with an old
/// timestamp or the reverse.
pub struct Revision {
    compiled: Arc<dyn CompiledBody>,
    last_modified: f64,
}

impl Revision {
    /// Create a revision.
    #[must_use]
    pub fn new(compiled: Arc<dyn CompiledBody>, last_modified: f64) -> Self {
        Self {
            compiled,
            last_modified,
        }
    }

    /// Compiled body.
    #[must_use]
    pub fn compiled(&self) -> &dyn CompiledBody {
        self.compiled.as_ref()
    }

    /// Backing-file modification time at compile time.
    #[must_use]
    pub fn last_modified(&self) -> f64 {
        self.last_modified
    }
}

impl fmt::Debug for Revision {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Revision")
            .field("last_modified", &self.last_modified)
            .field("directive_template", &self.compiled.directive_template())
            .finish_non_exhaustive()
    }
}

/// A registered Markdown page.
#[derive(Debug)]
pub struct Page {
    name: String,
    file_path: String,
    virtual_path: String,
    role: PageRole,
    template: Option<String>,
    is_embedded_resource: bool,
    revision: ArcSwap<Revision>,
    /// Bits of the last file mtime whose reload failed.
    rejected_mtime: AtomicU64,
}

impl Page {
    /// Create a page for a backing file.
    ///
    /// # Arguments
    ///
    /// * `file` - Backing file descriptor
    /// * `markdown_ext` - Page extension stripped to form the content key
    /// * `role` - Partition the page belongs to
    /// * `template` - Convention template path, if any
    /// * `revision` - Initial compiled body
    #[must_use]
    pub fn new(
        file: &FileRef,
        markdown_ext: &str,
        role: PageRole,
        template: Option<String>,
        revision: Revision,
    ) -> Self {
        Self {
            name: file.stem().to_owned(),
            file_path: content_key(&file.virtual_path, markdown_ext),
            virtual_path: file.virtual_path.clone(),
            role,
            template,
            is_embedded_resource: file.is_embedded_resource,
            revision: ArcSwap::from_pointee(revision),
            rejected_mtime: AtomicU64::new(0),
        }
    }

    /// Logical name (file stem).
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Extension-stripped virtual path (`docs/guide`).
    #[must_use]
    pub fn file_path(&self) -> &str {
        &self.file_path
    }

    /// Virtual path of the backing file (`docs/guide.md`).
    #[must_use]
    pub fn virtual_path(&self) -> &str {
        &self.virtual_path
    }

    /// Store partition key: file path for content pages, name otherwise.
    #[must_use]
    pub fn key(&self) -> &str {
        match self.role {
            PageRole::ContentPage => &self.file_path,
            PageRole::ViewPage | PageRole::SharedViewPage => &self.name,
        }
    }

    /// Partition the page belongs to.
    #[must_use]
    pub fn role(&self) -> PageRole {
        self.role
    }

    /// Convention template path assigned at registration.
    #[must_use]
    pub fn template(&self) -> Option<&str> {
        self.template.as_deref()
    }

    /// True for pages compiled into the binary.
    #[must_use]
    pub fn is_embedded_resource(&self) -> bool {
        self.is_embedded_resource
    }

    /// Current compiled body snapshot.
    #[must_use]
    pub fn revision(&self) -> Arc<Revision> {
        self.revision.load_full()
    }

    /// Modification time of the current body.
    #[must_use]
    pub fn last_modified(&self) -> f64 {
        self.revision.load().last_modified
    }

    /// Template named by the current body's `@template` directive.
    #[must_use]
    pub fn directive_template(&self) -> Option<String> {
        self.revision
            .load()
            .compiled
            .directive_template()
            .map(str::to_owned)
    }

    pub(crate) fn revision_cell(&self) -> &ArcSwap<Revision> {
        &self.revision
    }

    pub(crate) fn rejected_mtime(&self) -> &AtomicU64 {
        &self.rejected_mtime
    }
}
