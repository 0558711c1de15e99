//! Change detection for hot reload.
//!
//! When hot reload is enabled, each render checks the backing file of the
//! page and of every template it may use. An entity is recompiled only when
//! its file's modification time is newer than the one it was compiled from.
//! A compile failure keeps the last good body in service; the failed mtime is
//! remembered so the same edit is not retried on every request.

use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};

use arc_swap::ArcSwap;
use mdpages_storage::StorageError;

use crate::compiler::{CompileError, CompiledBody};
use crate::engine::PageEngine;
use crate::page::{Page, Revision};
use crate::template::Template;

impl PageEngine {
    /// Reload a page, and the templates it refers to, if their files changed.
    ///
    /// Does nothing unless hot reload is enabled. The page is checked first;
    /// then its `@template` directive target and its convention template
    /// are each checked against their own backing files.
    pub fn refresh_if_stale(&self, page: &Page) {
        if !self.config.hot_reload {
            return;
        }

        self.reload_if_newer(
            page.virtual_path(),
            page.is_embedded_resource(),
            page.revision_cell(),
            page.rejected_mtime(),
            |text| self.compile_page(text),
        );

        if let Some(directive) = page.directive_template()
            && let Some(template) = self.cached_directive_template(&directive)
        {
            self.refresh_template_if_stale(&template);
        }

        if let Some(path) = page.template()
            && let Some(template) = self.store.template(path)
        {
            self.refresh_template_if_stale(&template);
        }
    }

    /// Reload a template if its file changed.
    ///
    /// Does nothing unless hot reload is enabled.
    pub fn refresh_template_if_stale(&self, template: &Template) {
        if !self.config.hot_reload {
            return;
        }

        self.reload_if_newer(
            template.path(),
            template.is_embedded_resource(),
            template.revision_cell(),
            template.rejected_mtime(),
            |text| self.compile_template(text),
        );
    }

    /// Returns `true` if a new revision was published.
    ///
    /// Publication is monotonic: a revision never replaces one built from a
    /// newer file.
    fn reload_if_newer<F>(
        &self,
        path: &str,
        embedded: bool,
        cell: &ArcSwap<Revision>,
        rejected: &AtomicU64,
        compile: F,
    ) -> bool
    where
        F: Fn(&str) -> Result<Arc<dyn CompiledBody>, CompileError>,
    {
        if embedded {
            return false;
        }

        let mtime = match self.storage.mtime(path) {
            Ok(mtime) => mtime,
            Err(e) => {
                log_unavailable(path, &e);
                return false;
            }
        };
        if mtime <= cell.load().last_modified()
            || rejected.load(Ordering::Acquire) == mtime.to_bits()
        {
            return false;
        }

        let text = match self.storage.read(path) {
            Ok(text) => text,
            Err(e) => {
                log_unavailable(path, &e);
                if !e.is_not_found() {
                    rejected.store(mtime.to_bits(), Ordering::Release);
                }
                return false;
            }
        };

        match compile(&text) {
            Ok(compiled) => {
                let next = Arc::new(Revision::new(compiled, mtime));
                let previous = cell.rcu(|current| {
                    if current.last_modified() < mtime {
                        Arc::clone(&next)
                    } else {
                        Arc::clone(current)
                    }
                });
                let published = previous.last_modified() < mtime;
                if published {
                    tracing::info!(path, mtime, "Reloaded");
                }
                published
            }
            Err(e) => {
                rejected.store(mtime.to_bits(), Ordering::Release);
                tracing::warn!(path, mtime, error = %e, "Reload failed, keeping previous version");
                false
            }
        }
    }
}

fn log_unavailable(path: &str, error: &StorageError) {
    if error.is_not_found() {
        tracing::debug!(path, "Backing file gone, keeping previous version");
    } else {
        tracing::warn!(path, error = %error, "Could not check backing file");
    }
}
