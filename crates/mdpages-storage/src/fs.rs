//! Filesystem storage implementation.
//!
//! Provides [`FsStorage`] for reading page sources from a local directory.

use std::fs;
use std::path::{Component, Path, PathBuf};
use std::time::{SystemTime, UNIX_EPOCH};

use glob::{MatchOptions, Pattern};

use crate::storage::{FileRef, Storage, StorageError};

/// Backend identifier for error messages.
const BACKEND: &str = "Fs";

/// Glob options: `*` never crosses a directory boundary.
const MATCH_OPTIONS: MatchOptions = MatchOptions {
    case_sensitive: true,
    require_literal_separator: true,
    require_literal_leading_dot: false,
};

/// Filesystem storage rooted at a directory.
///
/// Virtual paths are resolved relative to `root`. Hidden entries (names
/// starting with `.`) are skipped while listing.
///
/// # Example
///
/// ```ignore
/// use std::path::PathBuf;
/// use mdpages_storage::{FsStorage, Storage};
///
/// let storage = FsStorage::new(PathBuf::from("site"));
/// let pages = storage.list("**/*.md")?;
/// ```
#[derive(Debug)]
pub struct FsStorage {
    /// Root directory for all virtual paths.
    root: PathBuf,
}

impl FsStorage {
    /// Create a new filesystem storage.
    ///
    /// # Arguments
    ///
    /// * `root` - Directory that virtual paths are relative to
    #[must_use]
    pub fn new(root: PathBuf) -> Self {
        Self { root }
    }

    /// Root directory.
    #[must_use]
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Validate that a path doesn't escape the root directory.
    ///
    /// Rejects paths containing parent directory components (`..`) or
    /// absolute roots to prevent path traversal (e.g., `../../etc/passwd`).
    fn validate_path(path: &str) -> Result<(), StorageError> {
        let escapes = Path::new(path).components().any(|c| {
            matches!(
                c,
                Component::ParentDir | Component::RootDir | Component::Prefix(_)
            )
        });

        if escapes {
            return Err(StorageError::InvalidPath {
                path: path.to_owned(),
                backend: BACKEND,
            });
        }
        Ok(())
    }

    /// Resolve a virtual path to a filesystem path.
    fn resolve(&self, path: &str) -> Result<PathBuf, StorageError> {
        Self::validate_path(path)?;
        Ok(self.root.join(path))
    }

    /// Walk a directory recursively, collecting files that match `pattern`.
    fn walk(&self, dir: &Path, prefix: &str, pattern: &Pattern, out: &mut Vec<FileRef>) {
        let Ok(entries) = fs::read_dir(dir) else {
            return;
        };

        for entry in entries.filter_map(Result::ok) {
            let name = entry.file_name().to_string_lossy().into_owned();
            if name.starts_with('.') {
                continue;
            }

            let virtual_path = if prefix.is_empty() {
                name
            } else {
                format!("{prefix}/{name}")
            };

            let Ok(file_type) = entry.file_type() else {
                continue;
            };

            if file_type.is_dir() {
                self.walk(&entry.path(), &virtual_path, pattern, out);
            } else if pattern.matches_with(&virtual_path, MATCH_OPTIONS) {
                let Some(last_modified) = modified_secs(&entry.path()) else {
                    tracing::debug!(path = %virtual_path, "Skipping file without mtime");
                    continue;
                };
                out.push(FileRef::new(virtual_path, last_modified));
            }
        }
    }
}

/// Modification time of a filesystem path as seconds since Unix epoch.
fn modified_secs(path: &Path) -> Option<f64> {
    let modified = fs::metadata(path).and_then(|m| m.modified()).ok()?;
    Some(to_secs(modified))
}

fn to_secs(time: SystemTime) -> f64 {
    time.duration_since(UNIX_EPOCH)
        .map_or(0.0, |d| d.as_secs_f64())
}

impl Storage for FsStorage {
    fn list(&self, pattern: &str) -> Result<Vec<FileRef>, StorageError> {
        let pattern = Pattern::new(pattern).map_err(|source| StorageError::InvalidPattern {
            pattern: pattern.to_owned(),
            source,
        })?;

        let mut files = Vec::new();
        self.walk(&self.root, "", &pattern, &mut files);
        files.sort_by(|a, b| a.virtual_path.cmp(&b.virtual_path));
        Ok(files)
    }

    fn get(&self, path: &str) -> Option<FileRef> {
        let full_path = self.resolve(path).ok()?;
        let metadata = fs::metadata(&full_path).ok()?;
        if !metadata.is_file() {
            return None;
        }
        let last_modified = metadata.modified().map(to_secs).ok()?;
        Some(FileRef::new(path, last_modified))
    }

    fn read(&self, path: &str) -> Result<String, StorageError> {
        let full_path = self.resolve(path)?;
        fs::read_to_string(&full_path).map_err(|e| StorageError::io(e, path, BACKEND))
    }

    fn mtime(&self, path: &str) -> Result<f64, StorageError> {
        let full_path = self.resolve(path)?;
        let modified = fs::metadata(&full_path)
            .and_then(|m| m.modified())
            .map_err(|e| StorageError::io(e, path, BACKEND))?;
        Ok(to_secs(modified))
    }
}
