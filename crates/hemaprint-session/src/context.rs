//! Explicit session context
//!
//! One value owns the store a browsing session writes to; pages receive the
//! context (or a view cut from it) instead of reaching for global keys.

use crate::config::SessionConfig;
use crate::draft::DraftStore;
use crate::error::SessionResult;
use crate::handoff::ResultHandoff;
use crate::keys::TOKEN_PREFIX;
use hemaprint_store::{EphemeralStore, SweepReport};

/// Store, lifetimes and the views built on them
#[derive(Debug, Clone)]
pub struct SessionContext {
    store: EphemeralStore,
    config: SessionConfig,
    startup_sweep: SweepReport,
}

impl SessionContext {
    /// Open a context over `store`, sweeping stale token entries first
    ///
    /// The sweep is best effort; a failure is logged and the context still
    /// opens, relying on lazy expiry.
    #[must_use]
    pub fn open(store: EphemeralStore, config: SessionConfig) -> Self {
        let startup_sweep = match store.sweep_expired(TOKEN_PREFIX) {
            Ok(report) => report,
            Err(e) => {
                tracing::warn!(error = %e, "startup sweep failed");
                SweepReport::default()
            }
        };

        Self {
            store,
            config,
            startup_sweep,
        }
    }

    /// Fresh in-memory context on the wall clock
    #[must_use]
    pub fn in_memory(config: SessionConfig) -> Self {
        Self::open(EphemeralStore::in_memory(), config)
    }

    /// Result of the sweep run by [`open`](Self::open)
    #[inline]
    #[must_use]
    pub fn startup_sweep(&self) -> SweepReport {
        self.startup_sweep
    }

    /// Run the expiry sweep again
    ///
    /// # Errors
    /// Returns error if the store cannot list keys
    pub fn sweep(&self) -> SessionResult<SweepReport> {
        Ok(self.store.sweep_expired(TOKEN_PREFIX)?)
    }

    /// Lifetimes in effect
    #[inline]
    #[must_use]
    pub fn config(&self) -> &SessionConfig {
        &self.config
    }

    /// Underlying store
    #[inline]
    #[must_use]
    pub fn store(&self) -> &EphemeralStore {
        &self.store
    }

    /// Draft view
    #[must_use]
    pub fn drafts(&self) -> DraftStore {
        DraftStore::new(self.store.clone(), self.config.draft_ttl())
    }

    /// Handoff view
    #[must_use]
    pub fn handoff(&self) -> ResultHandoff {
        ResultHandoff::new(self.store.clone(), self.config.result_ttl())
    }

    /// Forget everything: published results, current token and the draft
    ///
    /// # Errors
    /// Returns error if the store cannot remove the result entries
    pub fn end_session(&self) -> SessionResult<()> {
        self.handoff().end_session()?;
        self.drafts().clear();
        Ok(())
    }
}
