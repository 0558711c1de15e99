//! Layout templates.

use std::sync::Arc;
use std::sync::atomic::AtomicU64;

use arc_swap::ArcSwap;
use mdpages_storage::FileRef;

use crate::compiler::{CompileError, CompiledBody, Compiler};
use crate::page::Revision;
use crate::scope::BODY_KEY;

/// Marker replaced by the rendered page body.
pub const BODY_PLACEHOLDER: &str = "<!--@body-->";

/// A registered layout template.
#[derive(Debug)]
pub struct Template {
    path: String,
    name: String,
    is_embedded_resource: bool,
    revision: ArcSwap<Revision>,
    /// Bits of the last file mtime whose reload failed.
    rejected_mtime: AtomicU64,
}

impl Template {
    /// Create a template for a backing file.
    #[must_use]
    pub fn new(file: &FileRef, revision: Revision) -> Self {
        Self {
            path: file.virtual_path.clone(),
            name: file.stem().to_owned(),
            is_embedded_resource: file.is_embedded_resource,
            revision: ArcSwap::from_pointee(revision),
            rejected_mtime: AtomicU64::new(0),
        }
    }

    /// Virtual path (store key).
    #[must_use]
    pub fn path(&self) -> &str {
        &self.path
    }

    /// Display name (file stem).
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// True for templates compiled into the binary.
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
        self.revision.load().last_modified()
    }

    pub(crate) fn revision_cell(&self) -> &ArcSwap<Revision> {
        &self.revision
    }

    pub(crate) fn rejected_mtime(&self) -> &AtomicU64 {
        &self.rejected_mtime
    }
}

/// Compile template source, binding [`BODY_PLACEHOLDER`] to the body key.
pub(crate) fn compile_template(
    compiler: &dyn Compiler,
    source: &str,
) -> Result<Arc<dyn CompiledBody>, CompileError> {
    let found = source.matches(BODY_PLACEHOLDER).count();
    if found != 1 {
        return Err(CompileError::BodyPlaceholder { found });
    }
    compiler.compile(&source.replacen(BODY_PLACEHOLDER, &format!("{{{{ {BODY_KEY} }}}}"), 1))
}
