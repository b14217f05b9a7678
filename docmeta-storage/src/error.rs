//! Error type for cache file operations.

use docmeta_core::AnnotationError;
use std::path::PathBuf;

#[derive(Debug, thiserror::Error)]
pub enum CacheError {
    /// The cache directory does not exist and could not be created.
    #[error("The directory \"{path}\" does not exist and could not be created: {reason}")]
    CreateDir { path: PathBuf, reason: String },

    #[error("Failed to serialize cache entry {key}: {reason}")]
    Serialization { key: String, reason: String },

    #[error("Failed to move cache file into place at {path}: {reason}")]
    Persist { path: PathBuf, reason: String },

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Readers report cache failures as storage errors.
impl From<CacheError> for AnnotationError {
    fn from(e: CacheError) -> Self {
        AnnotationError::Storage {
            reason: e.to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_converts_into_storage_error() {
        let err: AnnotationError = CacheError::Persist {
            path: PathBuf::from("/tmp/x.cache.json"),
            reason: "denied".to_string(),
        }
        .into();

        assert_eq!(
            err,
            AnnotationError::Storage {
                reason: "Failed to move cache file into place at /tmp/x.cache.json: denied"
                    .to_string()
            }
        );
    }
}
