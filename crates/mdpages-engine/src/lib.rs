//! Dynamic page rendering engine.
//!
//! Serves Markdown pages from a [`Storage`](mdpages_storage::Storage) backend,
//! wrapping each rendered body in a layout template.
//!
//! # Architecture
//!
//! - [`DocumentStore`] keeps compiled pages and templates, partitioned by role
//! - [`PageEngine`] owns the store and every pipeline stage:
//!   - discovery (`register_pages`) and lazy content-page discovery
//!   - the change detector (`refresh_if_stale`) when hot reload is enabled
//!   - template resolution (`resolve_template`)
//!   - two-stage rendering (`render`): body, then template composition
//!   - request-path resolution with a bounded negative cache (`catch_all`)
//! - [`Compiler`] and [`MarkupTransform`] are pluggable; the defaults are
//!   [`ExpressionCompiler`] and [`MarkdownTransform`]
//!
//! # Thread Safety
//!
//! Every entity's compiled body is an atomically published snapshot, so
//! concurrent renders never observe a half-reloaded page. Store partitions
//! use `RwLock` and the negative cache is copy-on-write.
//!
//! # Example
//!
//! ```ignore
//! use std::path::PathBuf;
//! use std::sync::Arc;
//! use mdpages_engine::{CatchAll, ContentFormat, EngineConfig, PageEngine, Scope};
//! use mdpages_storage::FsStorage;
//!
//! let storage = Arc::new(FsStorage::new(PathBuf::from("site")));
//! let engine = PageEngine::new(storage, EngineConfig::default());
//! engine.register_pages()?;
//!
//! if let CatchAll::Page(page) = engine.catch_all("/guide") {
//!     let html = engine.render_as(&page, Scope::new(), ContentFormat::Html)?;
//! }
//! ```

mod compiler;
mod config;
mod discovery;
mod engine;
mod error;
mod negative_cache;
mod page;
mod path;
mod path_resolver;
mod reload;
mod render;
mod resolver;
mod scope;
mod store;
mod template;
mod transform;
mod views;

pub use compiler::{CompileError, CompiledBody, Compiler, ExpressionCompiler};
pub use config::EngineConfig;
pub use discovery::DiscoveryReport;
pub use engine::{EngineStats, PageEngine};
pub use error::EngineError;
pub use negative_cache::{MAX_MISSING_PATHS, NegativeCache};
pub use page::{Page, PageRole, Revision};
pub use path_resolver::CatchAll;
pub use render::RenderOptions;
pub use scope::{BODY_KEY, MODEL_KEY, Scope};
pub use store::DocumentStore;
pub use template::{BODY_PLACEHOLDER, Template};
pub use transform::{MarkdownTransform, MarkupTransform};
pub use views::ContentFormat;
