//! Key-value backing for the ephemeral store
//!
//! Provides [`KvBackend`], the string-to-string seam the store writes
//! through, and [`MemoryBackend`], a radix-trie implementation whose prefix
//! scans walk only the matching subtree.

use crate::error::BackendError;
use parking_lot::RwLock;
use radix_trie::{Trie, TrieCommon};
use std::fmt::Debug;
use std::sync::Arc;

/// String key-value storage
///
/// Implementations must be internally synchronized; every method takes
/// `&self`.
pub trait KvBackend: Send + Sync + Debug {
    /// Read the raw value at `key`
    ///
    /// # Errors
    /// Backend-specific read failure
    fn get(&self, key: &str) -> Result<Option<String>, BackendError>;

    /// Write `value` at `key`, replacing any previous value
    ///
    /// # Errors
    /// Backend-specific write failure
    fn set(&self, key: &str, value: String) -> Result<(), BackendError>;

    /// Remove `key`; removing a missing key is not an error
    ///
    /// # Errors
    /// Backend-specific write failure
    fn remove(&self, key: &str) -> Result<(), BackendError>;

    /// All keys starting with `prefix`, in lexical order
    ///
    /// # Errors
    /// Backend-specific read failure
    fn keys_with_prefix(&self, prefix: &str) -> Result<Vec<String>, BackendError>;
}

impl<B: KvBackend + ?Sized> KvBackend for Arc<B> {
    fn get(&self, key: &str) -> Result<Option<String>, BackendError> {
        (**self).get(key)
    }

    fn set(&self, key: &str, value: String) -> Result<(), BackendError> {
        (**self).set(key, value)
    }

    fn remove(&self, key: &str) -> Result<(), BackendError> {
        (**self).remove(key)
    }

    fn keys_with_prefix(&self, prefix: &str) -> Result<Vec<String>, BackendError> {
        (**self).keys_with_prefix(prefix)
    }
}

/// In-memory backend using radix_trie for prefix matching
///
/// The equivalent of one browser tab's session storage: lives as long as
/// the value, shared by every clone of the `Arc` holding it.
#[derive(Debug, Default)]
pub struct MemoryBackend {
    trie: RwLock<Trie<String, String>>,
}

impl MemoryBackend {
    /// Create an empty backend
    #[inline]
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of stored keys
    #[inline]
    #[must_use]
    pub fn len(&self) -> usize {
        self.trie.read().len()
    }

    /// Whether nothing is stored
    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.trie.read().is_empty()
    }
}

impl KvBackend for MemoryBackend {
    fn get(&self, key: &str) -> Result<Option<String>, BackendError> {
        Ok(self.trie.read().get(key).cloned())
    }

    fn set(&self, key: &str, value: String) -> Result<(), BackendError> {
        self.trie.write().insert(key.to_string(), value);
        Ok(())
    }

    fn remove(&self, key: &str) -> Result<(), BackendError> {
        self.trie.write().remove(key);
        Ok(())
    }

    fn keys_with_prefix(&self, prefix: &str) -> Result<Vec<String>, BackendError> {
        let trie = self.trie.read();

        let mut keys: Vec<String> = if prefix.is_empty() {
            trie.keys().cloned().collect()
        } else {
            match trie.get_raw_descendant(prefix) {
                Some(subtrie) => subtrie.keys().cloned().collect(),
                None => Vec::new(),
            }
        };

        // Raw descendants are keyed by nibble boundaries; re-check the prefix.
        keys.retain(|k| k.starts_with(prefix));
        keys.sort();
        Ok(keys)
    }
}
