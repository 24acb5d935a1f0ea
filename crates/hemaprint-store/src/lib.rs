//! Hemaprint Ephemeral Store
//!
//! A small typed cache over any string key-value backing, where every value
//! is wrapped in an expiry envelope.
//!
//! # Core Operations
//!
//! - **Put**: wrap a value with `expiry = now + ttl`, encode, write under a key
//! - **Get**: decode and return the value only while `now < expiry`; expired
//!   or undecodable entries are deleted on the spot and read as absent
//! - **Sweep**: scan every key under a prefix and drop the dead ones
//!
//! # Architecture
//!
//! ```text
//! caller → EphemeralStore ── Envelope<T> ── base64(JSON) ──→ KvBackend
//!              │                                              ├─ MemoryBackend (radix trie)
//!              └─ Clock (system / manual)                     └─ FileBackend (JSON file)
//! ```
//!
//! # Example
//!
//! ```rust
//! use hemaprint_store::{EphemeralStore, ManualClock, MemoryBackend};
//! use std::sync::Arc;
//! use std::time::Duration;
//!
//! let clock = ManualClock::new(0);
//! let store = EphemeralStore::new(Arc::new(MemoryBackend::new()), Arc::new(clock.clone()));
//!
//! store.put("greeting", &"hello", Duration::from_secs(60)).unwrap();
//! assert_eq!(store.get::<String>("greeting").as_deref(), Some("hello"));
//!
//! clock.advance(Duration::from_secs(60));
//! assert_eq!(store.get::<String>("greeting"), None);
//! ```

#![warn(missing_docs)]
#![warn(unreachable_pub)]

pub mod backend;
pub mod clock;
pub mod envelope;
pub mod error;
pub mod file;
pub mod store;

// Re-exports for convenience
pub use backend::{KvBackend, MemoryBackend};
pub use clock::{Clock, ManualClock, SystemClock};
pub use envelope::Envelope;
pub use error::{BackendError, StoreError, StoreResult};
pub use file::FileBackend;
pub use store::{EphemeralStore, SweepReport};

/// Version of this crate
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Prelude module for common imports
pub mod prelude {
    //! Common imports for working with the ephemeral store
    pub use crate::backend::{KvBackend, MemoryBackend};
    pub use crate::clock::{Clock, ManualClock, SystemClock};
    pub use crate::envelope::Envelope;
    pub use crate::error::{StoreError, StoreResult};
    pub use crate::store::{EphemeralStore, SweepReport};
}
