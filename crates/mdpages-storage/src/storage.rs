//! Storage trait and error types.
//!
//! Provides the core [`Storage`] trait for enumerating and reading page sources,
//! along with [`StorageError`] for unified error handling across backends.
//!
//! # Virtual Path Convention
//!
//! All path parameters are **virtual paths** relative to the storage root:
//! - `/` separators on every platform
//! - no leading separator (`"docs/about.md"`, not `"/docs/about.md"`)
//! - the file extension is part of the path
//!
//! Storage implementations handle the mapping to their internal layout.

/// A file known to the backing store.
///
/// Returned by [`Storage::list`] and [`Storage::get`]. The descriptor is a
/// snapshot; `last_modified` is not updated when the file changes later.
#[derive(Clone, Debug, PartialEq)]
pub struct FileRef {
    /// Virtual path (e.g., `"docs/about.md"`).
    pub virtual_path: String,
    /// Modification time as seconds since Unix epoch.
    pub last_modified: f64,
    /// True when the file is compiled into the binary and can never change.
    ///
    /// Staleness checks skip embedded files entirely.
    pub is_embedded_resource: bool,
}

impl FileRef {
    /// Create a descriptor for a regular (non-embedded) file.
    #[must_use]
    pub fn new(virtual_path: impl Into<String>, last_modified: f64) -> Self {
        Self {
            virtual_path: virtual_path.into(),
            last_modified,
            is_embedded_resource: false,
        }
    }

    /// Mark the file as an embedded resource.
    #[must_use]
    pub fn embedded(mut self) -> Self {
        self.is_embedded_resource = true;
        self
    }

    /// Directory containing the file, without trailing separator.
    ///
    /// Returns `""` for files at the storage root.
    #[must_use]
    pub fn directory(&self) -> &str {
        self.virtual_path
            .rsplit_once('/')
            .map_or("", |(dir, _)| dir)
    }

    /// File name including extension.
    #[must_use]
    pub fn name(&self) -> &str {
        self.virtual_path
            .rsplit_once('/')
            .map_or(self.virtual_path.as_str(), |(_, name)| name)
    }

    /// File name without extension.
    #[must_use]
    pub fn stem(&self) -> &str {
        let name = self.name();
        match name.rsplit_once('.') {
            Some((stem, _)) if !stem.is_empty() => stem,
            _ => name,
        }
    }
}

/// Failure reported by a [`Storage`] backend.
///
/// Paths are virtual paths, as passed to the failing call.
#[derive(Debug, thiserror::Error)]
#[non_exhaustive]
pub enum StorageError {
    /// No file at the path.
    #[error("[{backend}] no such file: {path}")]
    NotFound {
        path: String,
        backend: &'static str,
    },

    /// The path would resolve outside the storage root.
    #[error("[{backend}] path escapes the storage root: {path}")]
    InvalidPath {
        path: String,
        backend: &'static str,
    },

    /// The glob given to [`Storage::list`] does not parse.
    #[error("invalid glob pattern '{pattern}'")]
    InvalidPattern {
        pattern: String,
        #[source]
        source: glob::PatternError,
    },

    /// Any other I/O failure while reading a file or its metadata.
    #[error("[{backend}] cannot access {path}: {source}")]
    Io {
        path: String,
        backend: &'static str,
        #[source]
        source: std::io::Error,
    },
}

impl StorageError {
    /// Map an I/O error, folding `NotFound` into [`StorageError::NotFound`].
    #[must_use]
    pub fn io(source: std::io::Error, path: &str, backend: &'static str) -> Self {
        let path = path.to_owned();
        if source.kind() == std::io::ErrorKind::NotFound {
            Self::NotFound { path, backend }
        } else {
            Self::Io {
                path,
                backend,
                source,
            }
        }
    }

    /// True if the error means the file does not exist.
    #[must_use]
    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound { .. })
    }

    /// Virtual path or pattern the failing call was given.
    #[must_use]
    pub fn path(&self) -> &str {
        match self {
            Self::NotFound { path, .. } | Self::InvalidPath { path, .. } | Self::Io { path, .. } => {
                path
            }
            Self::InvalidPattern { pattern, .. } => pattern,
        }
    }
}

/// Backing store for page and template sources.
///
/// Implementations must be safe to share between request threads; the engine
/// calls `mtime`, `read` and `get` concurrently when hot reload is enabled.
pub trait Storage: Send + Sync {
    /// List all files whose virtual path matches a glob pattern.
    ///
    /// Results are sorted by virtual path.
    ///
    /// # Errors
    ///
    /// Returns [`StorageError::InvalidPattern`] for a malformed glob.
    fn list(&self, pattern: &str) -> Result<Vec<FileRef>, StorageError>;

    /// Probe a single file.
    ///
    /// Returns `None` if the file does not exist or cannot be inspected.
    fn get(&self, path: &str) -> Option<FileRef>;

    /// Read the full text of a file.
    ///
    /// # Errors
    ///
    /// Returns [`StorageError::NotFound`] for a missing file, or another
    /// [`StorageError`] if it can't be read.
    fn read(&self, path: &str) -> Result<String, StorageError>;

    /// Get the current modification time as seconds since Unix epoch.
    ///
    /// # Errors
    ///
    /// Returns [`StorageError`] if the file doesn't exist or its mtime can't
    /// be retrieved.
    fn mtime(&self, path: &str) -> Result<f64, StorageError>;
}
