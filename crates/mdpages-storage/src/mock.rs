//! Mock storage implementation for testing.
//!
//! Provides [`MockStorage`] for unit testing without filesystem access.

use std::collections::BTreeMap;
use std::sync::RwLock;
use std::sync::atomic::{AtomicUsize, Ordering};

use glob::{MatchOptions, Pattern};

use crate::storage::{FileRef, Storage, StorageError};

const BACKEND: &str = "Mock";

const MATCH_OPTIONS: MatchOptions = MatchOptions {
    case_sensitive: true,
    require_literal_separator: true,
    require_literal_leading_dot: false,
};

#[derive(Clone, Debug)]
struct MockFile {
    text: String,
    mtime: f64,
    embedded: bool,
}

/// Mock storage for testing.
///
/// Stores files in memory. Use the builder methods to seed test data and the
/// `set_*` methods to simulate edits while a test is running. Every call to
/// [`Storage::get`] is counted; see [`MockStorage::probes`].
///
/// # Example
///
/// ```ignore
/// use mdpages_storage::{MockStorage, Storage};
///
/// let storage = MockStorage::new()
///     .with_file("about.md", "# About")
///     .with_mtime("about.md", 100.0);
///
/// assert_eq!(storage.read("about.md").unwrap(), "# About");
/// ```
#[derive(Debug, Default)]
pub struct MockStorage {
    files: RwLock<BTreeMap<String, MockFile>>,
    probes: AtomicUsize,
}

impl MockStorage {
    /// Create a new empty mock storage.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a file with mtime `1.0`.
    ///
    /// # Panics
    ///
    /// Panics if the internal lock is poisoned.
    #[must_use]
    pub fn with_file(self, path: impl Into<String>, text: impl Into<String>) -> Self {
        self.set_file(path, text, 1.0);
        self
    }

    /// Add an embedded-resource file.
    ///
    /// # Panics
    ///
    /// Panics if the internal lock is poisoned.
    #[must_use]
    pub fn with_embedded_file(self, path: impl Into<String>, text: impl Into<String>) -> Self {
        self.files.write().unwrap().insert(
            path.into(),
            MockFile {
                text: text.into(),
                mtime: 1.0,
                embedded: true,
            },
        );
        self
    }

    /// Set modification time for an existing file.
    ///
    /// # Panics
    ///
    /// Panics if the internal lock is poisoned.
    #[must_use]
    pub fn with_mtime(self, path: &str, mtime: f64) -> Self {
        self.set_mtime(path, mtime);
        self
    }

    /// Create or replace a file.
    ///
    /// # Panics
    ///
    /// Panics if the internal lock is poisoned.
    pub fn set_file(&self, path: impl Into<String>, text: impl Into<String>, mtime: f64) {
        self.files.write().unwrap().insert(
            path.into(),
            MockFile {
                text: text.into(),
                mtime,
                embedded: false,
            },
        );
    }

    /// Update the modification time of an existing file.
    ///
    /// Does nothing if the file is missing.
    ///
    /// # Panics
    ///
    /// Panics if the internal lock is poisoned.
    pub fn set_mtime(&self, path: &str, mtime: f64) {
        if let Some(file) = self.files.write().unwrap().get_mut(path) {
            file.mtime = mtime;
        }
    }

    /// Remove a file.
    ///
    /// # Panics
    ///
    /// Panics if the internal lock is poisoned.
    pub fn remove_file(&self, path: &str) {
        self.files.write().unwrap().remove(path);
    }

    /// Number of [`Storage::get`] probes served so far.
    #[must_use]
    pub fn probes(&self) -> usize {
        self.probes.load(Ordering::SeqCst)
    }

    fn not_found(path: &str) -> StorageError {
        StorageError::NotFound {
            path: path.to_owned(),
            backend: BACKEND,
        }
    }

    fn file_ref(path: &str, file: &MockFile) -> FileRef {
        let file_ref = FileRef::new(path, file.mtime);
        if file.embedded {
            file_ref.embedded()
        } else {
            file_ref
        }
    }
}

impl Storage for MockStorage {
    fn list(&self, pattern: &str) -> Result<Vec<FileRef>, StorageError> {
        let pattern = Pattern::new(pattern).map_err(|source| StorageError::InvalidPattern {
            pattern: pattern.to_owned(),
            source,
        })?;

        Ok(self
            .files
            .read()
            .unwrap()
            .iter()
            .filter(|(path, _)| pattern.matches_with(path, MATCH_OPTIONS))
            .map(|(path, file)| Self::file_ref(path, file))
            .collect())
    }

    fn get(&self, path: &str) -> Option<FileRef> {
        self.probes.fetch_add(1, Ordering::SeqCst);
        self.files
            .read()
            .unwrap()
            .get(path)
            .map(|file| Self::file_ref(path, file))
    }

    fn read(&self, path: &str) -> Result<String, StorageError> {
        self.files
            .read()
            .unwrap()
            .get(path)
            .map(|file| file.text.clone())
            .ok_or_else(|| Self::not_found(path))
    }

    fn mtime(&self, path: &str) -> Result<f64, StorageError> {
        self.files
            .read()
            .unwrap()
            .get(path)
            .map(|file| file.mtime)
            .ok_or_else(|| Self::not_found(path))
    }
}
