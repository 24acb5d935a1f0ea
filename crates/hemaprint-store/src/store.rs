//! Typed ephemeral store with lazy expiry
//!
//! Every read checks the envelope's expiry before handing out data. There is
//! no background timer: an expired entry stays in the backend until the next
//! read of its key or the next sweep.

use crate::backend::{KvBackend, MemoryBackend};
use crate::clock::{duration_millis, Clock, SystemClock};
use crate::envelope::Envelope;
use crate::error::{StoreError, StoreResult};
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::sync::Arc;
use std::time::Duration;

/// Outcome of a [`sweep_expired`](EphemeralStore::sweep_expired) pass
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SweepReport {
    /// Keys matching the prefix
    pub scanned: usize,
    /// Entries removed because they expired
    pub expired: usize,
    /// Entries removed because they did not decode
    pub corrupt: usize,
}

impl SweepReport {
    /// Total entries removed
    #[inline]
    #[must_use]
    pub fn removed(&self) -> usize {
        self.expired + self.corrupt
    }
}

/// Expiring key-value store over a [`KvBackend`]
///
/// Cheap to clone; clones share the backend and clock.
#[derive(Debug, Clone)]
pub struct EphemeralStore {
    backend: Arc<dyn KvBackend>,
    clock: Arc<dyn Clock>,
}

impl EphemeralStore {
    /// Create store over a backend and clock
    #[inline]
    #[must_use]
    pub fn new(backend: Arc<dyn KvBackend>, clock: Arc<dyn Clock>) -> Self {
        Self { backend, clock }
    }

    /// Fresh in-memory store on the wall clock
    #[inline]
    #[must_use]
    pub fn in_memory() -> Self {
        Self::new(Arc::new(MemoryBackend::new()), Arc::new(SystemClock))
    }

    /// Underlying backend, for direct inspection
    #[inline]
    #[must_use]
    pub fn backend(&self) -> &Arc<dyn KvBackend> {
        &self.backend
    }

    /// Current time per the store's clock
    #[inline]
    #[must_use]
    pub fn now_millis(&self) -> i64 {
        self.clock.now_millis()
    }

    /// Absolute expiry for an entry written now with `ttl`
    #[inline]
    #[must_use]
    pub fn expiry_for(&self, ttl: Duration) -> i64 {
        self.now_millis().saturating_add(duration_millis(ttl))
    }

    /// Store `value` under `key` for `ttl`, overwriting any existing entry
    ///
    /// # Errors
    /// Returns error if the value does not serialize or the backend write fails
    pub fn put<T: Serialize>(&self, key: &str, value: &T, ttl: Duration) -> StoreResult<()> {
        let envelope = Envelope::new(value, self.expiry_for(ttl));
        self.put_envelope(key, &envelope)
    }

    /// Store a pre-built envelope under `key`
    ///
    /// Lets one envelope (same expiry, same session id) be written under
    /// several keys.
    ///
    /// # Errors
    /// Returns error if the value does not serialize or the backend write fails
    pub fn put_envelope<T: Serialize>(&self, key: &str, envelope: &Envelope<T>) -> StoreResult<()> {
        let encoded = envelope.encode().map_err(|source| StoreError::Encode {
            key: key.to_string(),
            source,
        })?;
        self.backend.set(key, encoded)?;
        tracing::debug!(key, expiry = envelope.expiry, "stored entry");
        Ok(())
    }

    /// Read the value at `key`
    ///
    /// Missing, expired and undecodable entries all read as `None`; the
    /// latter two are deleted as a side effect.
    #[must_use]
    pub fn get<T: DeserializeOwned>(&self, key: &str) -> Option<T> {
        self.get_envelope(key).map(Envelope::into_data)
    }

    /// Read the whole envelope at `key`, with the same rules as [`get`](Self::get)
    #[must_use]
    pub fn get_envelope<T: DeserializeOwned>(&self, key: &str) -> Option<Envelope<T>> {
        let raw = match self.backend.get(key) {
            Ok(Some(raw)) => raw,
            Ok(None) => return None,
            Err(e) => {
                tracing::warn!(key, error = %e, "backend read failed; treating as absent");
                return None;
            }
        };

        let envelope = match Envelope::<T>::decode(&raw) {
            Ok(envelope) => envelope,
            Err(reason) => {
                tracing::warn!(key, %reason, "removing undecodable entry");
                self.remove_quietly(key);
                return None;
            }
        };

        if !envelope.is_live(self.now_millis()) {
            tracing::debug!(key, expiry = envelope.expiry, "removing expired entry");
            self.remove_quietly(key);
            return None;
        }

        Some(envelope)
    }

    /// Whether a live, decodable entry exists at `key`
    #[must_use]
    pub fn contains(&self, key: &str) -> bool {
        self.get_envelope::<serde_json::Value>(key).is_some()
    }

    /// Remove `key`
    ///
    /// # Errors
    /// Returns error if the backend write fails
    pub fn delete(&self, key: &str) -> StoreResult<()> {
        self.backend.remove(key)?;
        Ok(())
    }

    /// Remove every key starting with `prefix`, returning how many were removed
    ///
    /// # Errors
    /// Returns error if the backend scan or a removal fails
    pub fn delete_all_matching(&self, prefix: &str) -> StoreResult<usize> {
        let keys = self.backend.keys_with_prefix(prefix)?;
        for key in &keys {
            self.backend.remove(key)?;
        }
        tracing::debug!(prefix, removed = keys.len(), "deleted matching entries");
        Ok(keys.len())
    }

    /// Remove expired and undecodable entries under `prefix`
    ///
    /// Best effort: a key that fails to remove is logged and skipped.
    ///
    /// # Errors
    /// Returns error only if the backend cannot list keys
    pub fn sweep_expired(&self, prefix: &str) -> StoreResult<SweepReport> {
        let keys = self.backend.keys_with_prefix(prefix)?;
        let now = self.now_millis();
        let mut report = SweepReport {
            scanned: keys.len(),
            ..SweepReport::default()
        };

        for key in keys {
            let Ok(Some(raw)) = self.backend.get(&key) else {
                continue;
            };
            match Envelope::<serde::de::IgnoredAny>::decode(&raw) {
                Ok(envelope) if envelope.is_live(now) => {}
                Ok(_) => {
                    if self.remove_quietly(&key) {
                        report.expired += 1;
                    }
                }
                Err(_) => {
                    if self.remove_quietly(&key) {
                        report.corrupt += 1;
                    }
                }
            }
        }

        tracing::info!(
            prefix,
            scanned = report.scanned,
            expired = report.expired,
            corrupt = report.corrupt,
            "expiry sweep finished"
        );
        Ok(report)
    }

    fn remove_quietly(&self, key: &str) -> bool {
        match self.backend.remove(key) {
            Ok(()) => true,
            Err(e) => {
                tracing::warn!(key, error = %e, "failed to remove entry");
                false
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::clock::ManualClock;
    use pretty_assertions::assert_eq;
    use proptest::prelude::*;
    use serde::Deserialize;

    #[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
    struct Note {
        text: String,
        stars: u8,
    }

    fn store_at(start: i64) -> (EphemeralStore, ManualClock, Arc<MemoryBackend>) {
        let clock = ManualClock::new(start);
        let backend = Arc::new(MemoryBackend::new());
        let store = EphemeralStore::new(backend.clone(), Arc::new(clock.clone()));
        (store, clock, backend)
    }

    #[test]
    fn put_then_get_returns_value() {
        let (store, _, _) = store_at(0);
        let note = Note {
            text: "hi".into(),
            stars: 3,
        };

        store.put("note", &note, Duration::from_secs(10)).unwrap();
        assert_eq!(store.get::<Note>("note"), Some(note));
    }

    #[test]
    fn put_overwrites_existing_entry() {
        let (store, _, _) = store_at(0);
        store.put("k", &1u32, Duration::from_secs(10)).unwrap();
        store.put("k", &2u32, Duration::from_secs(10)).unwrap();
        assert_eq!(store.get::<u32>("k"), Some(2));
    }

    #[test]
    fn missing_key_is_absent() {
        let (store, _, _) = store_at(0);
        assert_eq!(store.get::<u32>("nothing"), None);
    }

    #[test]
    fn expired_entry_is_absent_and_removed() {
        let (store, clock, backend) = store_at(1_000);
        store.put("k", &"v", Duration::from_millis(500)).unwrap();

        clock.set(1_499);
        assert_eq!(store.get::<String>("k").as_deref(), Some("v"));

        // Expiry instant itself is already dead.
        clock.set(1_500);
        assert_eq!(store.get::<String>("k"), None);
        assert!(backend.get("k").unwrap().is_none());
    }

    #[test]
    fn corrupted_entry_is_absent_and_removed() {
        let (store, _, backend) = store_at(0);
        backend.set("k", "definitely not base64!".to_string()).unwrap();

        assert_eq!(store.get::<String>("k"), None);
        assert!(backend.get("k").unwrap().is_none());
    }

    #[test]
    fn type_mismatch_counts_as_corruption() {
        let (store, _, backend) = store_at(0);
        store.put("k", &"text", Duration::from_secs(1)).unwrap();

        assert_eq!(store.get::<Note>("k"), None);
        assert!(backend.get("k").unwrap().is_none());
    }

    #[test]
    fn delete_and_delete_all_matching() {
        let (store, _, backend) = store_at(0);
        let ttl = Duration::from_secs(60);
        store.put("session_a", &1u8, ttl).unwrap();
        store.put("session_b", &2u8, ttl).unwrap();
        store.put("form_data_backup", &3u8, ttl).unwrap();

        store.delete("session_a").unwrap();
        assert!(!store.contains("session_a"));

        assert_eq!(store.delete_all_matching("session_").unwrap(), 1);
        assert_eq!(backend.len(), 1);
        assert!(store.contains("form_data_backup"));
    }

    #[test]
    fn sweep_removes_expired_and_corrupt_under_prefix_only() {
        let (store, clock, backend) = store_at(0);
        store.put("session_old", &1u8, Duration::from_secs(1)).unwrap();
        store.put("session_new", &2u8, Duration::from_secs(100)).unwrap();
        store.put("form_data_backup", &3u8, Duration::from_secs(1)).unwrap();
        backend.set("session_junk", "@@@".to_string()).unwrap();

        clock.advance(Duration::from_secs(5));
        let report = store.sweep_expired("session_").unwrap();

        assert_eq!(
            report,
            SweepReport {
                scanned: 3,
                expired: 1,
                corrupt: 1,
            }
        );
        assert_eq!(report.removed(), 2);
        assert!(backend.get("session_new").unwrap().is_some());
        // Outside the prefix: left for lazy expiry.
        assert!(backend.get("form_data_backup").unwrap().is_some());
    }

    #[test]
    fn envelope_keeps_session_id() {
        let (store, _, _) = store_at(0);
        let envelope = Envelope::new(5u8, store.expiry_for(Duration::from_secs(1))).with_session("session_t");
        store.put_envelope("a", &envelope).unwrap();
        store.put_envelope("b", &envelope).unwrap();

        let a = store.get_envelope::<u8>("a").unwrap();
        let b = store.get_envelope::<u8>("b").unwrap();
        assert_eq!(a, b);
        assert_eq!(a.session_id.as_deref(), Some("session_t"));
    }

    proptest! {
        #[test]
        fn get_after_ttl_is_always_absent(ttl_ms in 0u64..10_000_000, extra in 0u64..10_000_000) {
            let (store, clock, backend) = store_at(1_700_000_000_000);
            store.put("k", &"payload", Duration::from_millis(ttl_ms)).unwrap();

            clock.advance(Duration::from_millis(ttl_ms + extra));
            prop_assert!(store.get::<String>("k").is_none());
            prop_assert!(backend.get("k").unwrap().is_none());
        }

        #[test]
        fn get_before_ttl_is_present(ttl_ms in 1u64..10_000_000, frac in 0.0f64..1.0) {
            let (store, clock, _) = store_at(0);
            store.put("k", &7u32, Duration::from_millis(ttl_ms)).unwrap();

            #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss, clippy::cast_precision_loss)]
            let elapsed = ((ttl_ms as f64) * frac) as u64;
            clock.advance(Duration::from_millis(elapsed.min(ttl_ms - 1)));
            prop_assert_eq!(store.get::<u32>("k"), Some(7));
        }
    }
}
