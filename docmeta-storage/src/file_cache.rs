//! Read-through file cache over another reader.

use crate::config::CacheConfig;
use crate::error::CacheError;
use chrono::{DateTime, Utc};
use docmeta_core::{normalize, AnnotationError, AnnotationInstance, AnnotationResult, Member, Reader};
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use std::collections::HashMap;
use std::fs;
use std::io::{ErrorKind, Write};
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::RwLock;
use std::time::SystemTime;
use tempfile::NamedTempFile;
use tracing::{debug, trace, warn};

/// Cache key of a member: hex SHA-256 of the class name, then `$property`
/// or `#method`.
pub fn cache_key(member: Member<'_>) -> String {
    let class_hash = hex::encode(Sha256::digest(normalize(member.class()).as_bytes()));
    match member {
        Member::Class(_) => class_hash,
        Member::Property { name, .. } => format!("{}${}", class_hash, name),
        Member::Method { name, .. } => format!("{}#{}", class_hash, name),
    }
}

/// Contents of one cache file.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CacheEntry {
    pub key: String,
    pub cached_at: DateTime<Utc>,
    pub annotations: Vec<AnnotationInstance>,
}

/// Hit and miss counters. A miss is a read served by the wrapped reader.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CacheStats {
    pub hits: u64,
    pub misses: u64,
    /// Entries held in memory.
    pub loaded: usize,
}

impl CacheStats {
    /// Calculate the hit rate (0.0 to 1.0).
    pub fn hit_rate(&self) -> f64 {
        let total = self.hits + self.misses;
        if total == 0 {
            0.0
        } else {
            self.hits as f64 / total as f64
        }
    }
}

/// Caches the results of another [`Reader`] in memory and on disk.
///
/// Lookups go memory, then cache file, then the wrapped reader. Files are
/// written to a temporary file in the cache directory and renamed into
/// place, so concurrent readers never observe a partial entry.
#[derive(Debug)]
pub struct FileCacheReader<R> {
    reader: R,
    config: CacheConfig,
    loaded: RwLock<HashMap<String, Vec<AnnotationInstance>>>,
    hits: AtomicU64,
    misses: AtomicU64,
}

impl<R: Reader> FileCacheReader<R> {
    /// Wrap `reader`, creating the cache directory when it is missing.
    pub fn new(reader: R, config: CacheConfig) -> Result<Self, CacheError> {
        fs::create_dir_all(&config.dir).map_err(|e| CacheError::CreateDir {
            path: config.dir.clone(),
            reason: e.to_string(),
        })?;

        Ok(Self {
            reader,
            config,
            loaded: RwLock::new(HashMap::new()),
            hits: AtomicU64::new(0),
            misses: AtomicU64::new(0),
        })
    }

    pub fn inner(&self) -> &R {
        &self.reader
    }

    pub fn config(&self) -> &CacheConfig {
        &self.config
    }

    /// Cache file used for a member.
    pub fn path_for(&self, member: Member<'_>) -> PathBuf {
        self.config.path_for(&cache_key(member))
    }

    /// Forget the in-memory entries. Cache files are kept.
    pub fn clear_loaded(&self) -> AnnotationResult<()> {
        self.loaded
            .write()
            .map_err(|_| AnnotationError::LockPoisoned)?
            .clear();
        Ok(())
    }

    pub fn stats(&self) -> AnnotationResult<CacheStats> {
        let loaded = self
            .loaded
            .read()
            .map_err(|_| AnnotationError::LockPoisoned)?
            .len();
        Ok(CacheStats {
            hits: self.hits.load(Ordering::Relaxed),
            misses: self.misses.load(Ordering::Relaxed),
            loaded,
        })
    }

    fn fetch(&self, member: Member<'_>) -> AnnotationResult<Vec<AnnotationInstance>> {
        let key = cache_key(member);

        let memo = self
            .loaded
            .read()
            .map_err(|_| AnnotationError::LockPoisoned)?
            .get(&key)
            .cloned();
        if let Some(annotations) = memo {
            self.hits.fetch_add(1, Ordering::Relaxed);
            trace!(key = %key, "annotation cache hit (memory)");
            return Ok(annotations);
        }

        let path = self.config.path_for(&key);
        let annotations = match self.load(&path, &key, member.class())? {
            Some(annotations) => {
                self.hits.fetch_add(1, Ordering::Relaxed);
                trace!(key = %key, "annotation cache hit (file)");
                annotations
            }
            None => {
                self.misses.fetch_add(1, Ordering::Relaxed);
                let annotations = self.reader.annotations(member)?;
                self.save(&path, &key, &annotations)?;
                annotations
            }
        };

        self.loaded
            .write()
            .map_err(|_| AnnotationError::LockPoisoned)?
            .insert(key, annotations.clone());
        Ok(annotations)
    }

    /// Read a cache file. `None` when it is missing, stale or unreadable.
    fn load(
        &self,
        path: &Path,
        key: &str,
        class: &str,
    ) -> Result<Option<Vec<AnnotationInstance>>, CacheError> {
        let metadata = match fs::metadata(path) {
            Ok(metadata) => metadata,
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(None),
            Err(e) => return Err(e.into()),
        };

        if self.config.debug && self.is_stale(&metadata, class) {
            debug!(class, path = %path.display(), "annotation cache entry is older than its source");
            return Ok(None);
        }

        let text = fs::read_to_string(path)?;
        match serde_json::from_str::<CacheEntry>(&text) {
            Ok(entry) if entry.key == key => Ok(Some(entry.annotations)),
            Ok(entry) => {
                warn!(path = %path.display(), found = %entry.key, "annotation cache entry has a foreign key, parsing again");
                Ok(None)
            }
            Err(e) => {
                warn!(path = %path.display(), error = %e, "corrupt annotation cache entry, parsing again");
                Ok(None)
            }
        }
    }

    fn is_stale(&self, metadata: &fs::Metadata, class: &str) -> bool {
        match (self.reader.source_modified(class), metadata.modified()) {
            (Some(source), Ok(cached)) => cached < source,
            _ => false,
        }
    }

    fn save(
        &self,
        path: &Path,
        key: &str,
        annotations: &[AnnotationInstance],
    ) -> Result<(), CacheError> {
        let entry = CacheEntry {
            key: key.to_string(),
            cached_at: Utc::now(),
            annotations: annotations.to_vec(),
        };
        let json = serde_json::to_vec_pretty(&entry).map_err(|e| CacheError::Serialization {
            key: key.to_string(),
            reason: e.to_string(),
        })?;

        let mut file = NamedTempFile::new_in(&self.config.dir)?;
        file.write_all(&json)?;
        set_mode(file.path(), self.config.file_mode())?;
        file.persist(path).map_err(|e| CacheError::Persist {
            path: path.to_path_buf(),
            reason: e.error.to_string(),
        })?;

        debug!(key, path = %path.display(), count = annotations.len(), "wrote annotation cache entry");
        Ok(())
    }
}

#[cfg(unix)]
fn set_mode(path: &Path, mode: u32) -> std::io::Result<()> {
    use std::os::unix::fs::PermissionsExt;
    fs::set_permissions(path, fs::Permissions::from_mode(mode))
}

#[cfg(not(unix))]
fn set_mode(_path: &Path, _mode: u32) -> std::io::Result<()> {
    Ok(())
}

impl<R: Reader> Reader for FileCacheReader<R> {
    fn class_annotations(&self, class: &str) -> AnnotationResult<Vec<AnnotationInstance>> {
        self.fetch(Member::Class(class))
    }

    fn property_annotations(
        &self,
        class: &str,
        property: &str,
    ) -> AnnotationResult<Vec<AnnotationInstance>> {
        self.fetch(Member::Property {
            class,
            name: property,
        })
    }

    fn method_annotations(
        &self,
        class: &str,
        method: &str,
    ) -> AnnotationResult<Vec<AnnotationInstance>> {
        self.fetch(Member::Method {
            class,
            name: method,
        })
    }

    fn source_modified(&self, class: &str) -> Option<SystemTime> {
        self.reader.source_modified(class)
    }
}

// ============================================================================
// TESTS
// ============================================================================
