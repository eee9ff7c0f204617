//! # Storage Layer
//!
//! Keeps configuration resources cached in memory and in sync with disk.
//!
//! ## Layout
//!
//! Every resource lives at `<data_root>/[<folder>/]<file>`:
//!
//! ```text
//! plugins/MyPlugin/          # data root
//! ├── config.yml             # ("", "config.yml")
//! ├── lang/
//! │   └── en.yml             # ("lang", "en.yml")
//! └── xconfig.toml           # store settings (optional)
//! ```
//!
//! ## Key Types
//!
//! - [`ConfigStore`] - Cache and lifecycle of resources
//! - [`ResourceLocator`] - Resolves keys to files and creates them
//! - [`TemplateSource`] - Bundled default content
//! - [`StoreConfig`] - Settings for the store
//!
//! ## Concurrency
//!
//! The store is single-threaded and does no locking. Callers that share it
//! across threads must serialize access themselves.

mod config;
mod locator;
mod store;
mod template;

pub use config::{ConfigError, StoreConfig};
pub use locator::{LocatorError, Materialized, ResourceLocator};
pub use store::{Action, BatchReport, ConfigStore, Entry, StoreError};
pub use template::{DirectoryTemplates, EmbeddedTemplates, NoTemplates, TemplateSource};
