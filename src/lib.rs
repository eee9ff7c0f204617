//! xconfig - Cached YAML configuration resources for server plugins
//!
//! A plugin keeps a handful of YAML files under its data folder. xconfig
//! creates them from bundled templates (or empty), caches their parsed
//! documents, and saves, reloads and deletes them on request.
//!
//! ```no_run
//! use xconfig::access::ConfigHandler;
//! use xconfig::storage::{ConfigStore, EmbeddedTemplates};
//!
//! let templates = EmbeddedTemplates::new().with("config.yml", "greeting: hello\n");
//! let mut store = ConfigStore::with_templates("plugins/MyPlugin", templates);
//!
//! store.build("", "config.yml", false)?;
//! store.write("", "config.yml", "greeting", "bye")?;
//! store.save("", "config.yml")?;
//!
//! let handler = ConfigHandler::new(&store);
//! assert_eq!(handler.text("", "config.yml", "greeting", false).as_deref(), Some("bye"));
//! # Ok::<(), xconfig::storage::StoreError>(())
//! ```

pub mod access;
pub mod cli;
pub mod domain;
pub mod storage;

pub use access::{Colorizer, ConfigHandler};
pub use domain::{Document, ResourceKey};
pub use storage::{Action, ConfigStore, StoreError};
