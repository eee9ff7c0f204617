//! Domain types for xconfig
//!
//! Resource keys and parsed documents, without any filesystem concerns.

mod document;
mod key;

pub use document::{Document, DocumentError, DEFAULT_SEPARATOR};
pub use key::ResourceKey;

pub(crate) use key::check_argument;
