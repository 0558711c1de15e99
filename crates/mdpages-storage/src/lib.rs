//! Backing store abstraction for the mdpages rendering engine.
//!
//! This crate provides a [`Storage`] trait that hides where page and template
//! sources live. The engine only needs four capabilities from a backend:
//!
//! - **Enumeration** of files matching a glob (`list`)
//! - **Single-file probes** (`get`)
//! - **Content reads** (`read`)
//! - **Modification times** for staleness checks (`mtime`)
//!
//! # Architecture
//!
//! - [`Storage`] trait and [`FileRef`] descriptor
//! - [`FsStorage`] implementation rooted at a directory
//! - [`MockStorage`] for testing (behind `mock` feature flag), which counts
//!   probes so callers can assert how often the backend was consulted
//!
//! # Example
//!
//! ```ignore
//! use std::path::PathBuf;
//! use mdpages_storage::{FsStorage, Storage};
//!
//! let storage = FsStorage::new(PathBuf::from("site"));
//! for file in storage.list("**/*.md")? {
//!     println!("{} ({})", file.virtual_path, file.last_modified);
//! }
//! ```

mod fs;
#[cfg(feature = "mock")]
mod mock;
mod storage;

pub use fs::FsStorage;
#[cfg(feature = "mock")]
pub use mock::MockStorage;
pub use storage::{FileRef, Storage, StorageError};
