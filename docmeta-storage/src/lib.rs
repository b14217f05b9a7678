//! Docmeta Storage - File-Backed Annotation Cache
//!
//! Wraps any [`Reader`](docmeta_core::Reader) so that parsed annotations are
//! written to one JSON file per class, property or method and served from
//! memory or disk on later reads.
//!
//! # Layout
//!
//! ```text
//! <dir>/<sha256(class)>.cache.json           class annotations
//! <dir>/<sha256(class)>$<property>.cache.json
//! <dir>/<sha256(class)>#<method>.cache.json
//! ```
//!
//! In debug mode an entry older than the source of its class is parsed
//! again. Outside debug mode entries live until they are deleted.

mod config;
mod error;
mod file_cache;

pub use config::CacheConfig;
pub use error::CacheError;
pub use file_cache::{cache_key, CacheEntry, CacheStats, FileCacheReader};
