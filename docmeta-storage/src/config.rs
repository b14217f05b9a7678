//! Cache configuration.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Configuration for [`FileCacheReader`](crate::FileCacheReader).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CacheConfig {
    /// Directory holding the cache files. Created on demand.
    pub dir: PathBuf,
    /// Re-parse entries older than the source of their class.
    #[serde(default)]
    pub debug: bool,
    /// Bits cleared from `0o666` when setting cache file permissions.
    #[serde(default = "default_umask")]
    pub umask: u32,
}

fn default_umask() -> u32 {
    0o002
}

impl CacheConfig {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self {
            dir: dir.into(),
            debug: false,
            umask: default_umask(),
        }
    }

    /// Enable or disable freshness checks against the class source.
    pub fn with_debug(mut self, debug: bool) -> Self {
        self.debug = debug;
        self
    }

    pub fn with_umask(mut self, umask: u32) -> Self {
        self.umask = umask;
        self
    }

    /// File mode for new cache files.
    pub fn file_mode(&self) -> u32 {
        0o666 & !self.umask
    }

    /// Path of the cache file for a key.
    pub fn path_for(&self, key: &str) -> PathBuf {
        self.dir.join(format!("{}.cache.json", key))
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }
}
