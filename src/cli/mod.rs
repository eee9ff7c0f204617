//! # Command-Line Interface
//!
//! A small operator tool over a [`ConfigStore`](crate::storage::ConfigStore),
//! handy for inspecting or patching a plugin's files without starting the
//! server.
//!
//! ## Commands
//!
//! | Command | Purpose |
//! |---------|---------|
//! | `init`  | Create a resource from its template (or empty with `--custom`) |
//! | `get`   | Print the text at a path |
//! | `set` / `unset` | Change a path and save |
//! | `keys` / `show` | Inspect a document |
//! | `delete` | Remove the resource file |
//!
//! ## Output Formats
//!
//! All commands support `--format`:
//! - `text` (default) - Human-readable output
//! - `json` - Machine-parseable JSON
//!
//! ## Logging
//!
//! Logs go to stderr. `--verbose` enables debug output; `RUST_LOG` overrides it.

mod app;
mod output;

pub use app::{run, Cli, Commands, Target};
pub use output::{Output, OutputFormat};
