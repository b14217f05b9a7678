//! Docmeta Core - Shared Types
//!
//! Value model, target flags, error taxonomy, configuration and the host
//! interfaces (class catalog, reader) used by the parser and the cache.
//! This crate contains no parsing logic.

mod catalog;
mod config;
mod error;
mod names;
mod static_catalog;
mod target;
mod value;

pub use catalog::*;
pub use config::*;
pub use error::*;
pub use names::*;
pub use static_catalog::*;
pub use target::*;
pub use value::*;
