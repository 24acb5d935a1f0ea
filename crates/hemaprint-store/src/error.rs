//! Error types for the ephemeral store
//!
//! Absent, expired and corrupted entries are not errors: reads report them
//! as `None`. Errors here cover the cases a caller can act on:
//! - Backend I/O (file backend cannot read or write)
//! - Encoding a value that does not serialize

use std::path::PathBuf;

/// Errors raised by a [`KvBackend`](crate::KvBackend)
#[derive(Debug, thiserror::Error)]
pub enum BackendError {
    /// IO error on the backing file
    #[error("io error on {path}: {source}")]
    Io {
        /// Backing file
        path: PathBuf,
        /// Underlying IO error
        #[source]
        source: std::io::Error,
    },

    /// Backing file exists but is not a valid key-value document
    #[error("corrupt backing file {path}: {message}")]
    Corrupt {
        /// Backing file
        path: PathBuf,
        /// Parser error
        message: String,
    },

    /// Backing document could not be serialized
    #[error("serialization failed: {0}")]
    Serialization(String),
}

impl BackendError {
    /// Create IO error for path
    pub fn io_error(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }
}

/// Errors raised by [`EphemeralStore`](crate::EphemeralStore) writes
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    /// Value could not be encoded into an envelope
    #[error("encode failed for key '{key}': {source}")]
    Encode {
        /// Key being written
        key: String,
        /// Serializer error
        #[source]
        source: serde_json::Error,
    },

    /// Backend failure
    #[error("backend error: {0}")]
    Backend(#[from] BackendError),
}

/// Result type alias for store operations
pub type StoreResult<T> = Result<T, StoreError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn backend_error_display() {
        let err = BackendError::Corrupt {
            path: PathBuf::from("/tmp/store.json"),
            message: "expected object".to_string(),
        };
        assert_eq!(
            err.to_string(),
            "corrupt backing file /tmp/store.json: expected object"
        );
    }

    #[test]
    fn error_conversions() {
        let backend = BackendError::Serialization("boom".to_string());
        let store: StoreError = backend.into();
        assert!(matches!(store, StoreError::Backend(_)));
    }
}
