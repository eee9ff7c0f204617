//! Typed accessor layer
//!
//! [`ConfigHandler`] reads typed values out of a [`ConfigStore`](crate::storage::ConfigStore)
//! with default fallbacks and optional colorization through a [`Colorizer`].

mod colorize;
mod handler;

pub use colorize::{translate_alternate_codes, Colorizer, LegacyColorizer, PlainText, SECTION_SIGN};
pub use handler::ConfigHandler;
