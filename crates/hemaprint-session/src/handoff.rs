//! Token-indirected result handoff
//!
//! `publish` stores a bundle under a fresh token and returns it; the results
//! address carries only that token. `resolve` turns the token back into the
//! bundle.
//!
//! # Resolution precedence
//!
//! 1. The token supplied by the caller, when well-formed
//! 2. The token recorded under [`CURRENT_SESSION_KEY`]
//! 3. The [`RESULT_FALLBACK_KEY`] copy of the most recent envelope
//!
//! The first live envelope wins. Resolving never deletes the entry it reads;
//! only expiry or [`end_session`](ResultHandoff::end_session) does.

use crate::error::SessionResult;
use crate::keys::{CURRENT_SESSION_KEY, RESULT_FALLBACK_KEY, TOKEN_PREFIX};
use crate::navigation::NavigationTarget;
use crate::token::SessionToken;
use hemaprint_model::ResultBundle;
use hemaprint_store::{EphemeralStore, Envelope};
use std::time::Duration;

/// Which precedence level answered a resolve
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResolvedFrom {
    /// The caller's token
    SuppliedToken,
    /// The recorded current-session token
    CurrentSession,
    /// The fixed fallback envelope
    Fallback,
}

/// A successful resolve
#[derive(Debug, Clone, PartialEq)]
pub struct Resolved {
    /// The published bundle
    pub bundle: ResultBundle,
    /// Token the bundle was published under, when known
    pub token: Option<SessionToken>,
    /// Where it was found
    pub source: ResolvedFrom,
    /// Envelope expiry, milliseconds since the Unix epoch
    pub expiry: i64,
}

/// Publishes and resolves result bundles
#[derive(Debug, Clone)]
pub struct ResultHandoff {
    store: EphemeralStore,
    ttl: Duration,
}

impl ResultHandoff {
    /// Create handoff whose bundles live for `ttl`
    #[inline]
    #[must_use]
    pub fn new(store: EphemeralStore, ttl: Duration) -> Self {
        Self { store, ttl }
    }

    /// Store `bundle` under a fresh token and record it as current
    ///
    /// Writes the envelope under the token key and the fallback key, and the
    /// token itself under the current-session key, all with the same expiry.
    ///
    /// # Errors
    /// Returns error if the bundle cannot be encoded or the store write fails
    pub fn publish(&self, bundle: &ResultBundle) -> SessionResult<SessionToken> {
        let token = SessionToken::generate(self.store.now_millis());
        let expiry = self.store.expiry_for(self.ttl);
        let envelope = Envelope::new(bundle, expiry).with_session(token.as_str());

        self.store.put_envelope(token.as_str(), &envelope)?;
        self.store.put_envelope(RESULT_FALLBACK_KEY, &envelope)?;
        self.record_current(&token, expiry)?;

        tracing::info!(token = %token, expiry, "published result bundle");
        Ok(token)
    }

    /// Navigation target for the results view of `token`
    #[inline]
    #[must_use]
    pub fn results_target(&self, token: &SessionToken) -> NavigationTarget {
        NavigationTarget::results(token)
    }

    /// Resolve the bundle for an incoming results address
    ///
    /// The token parameters are stripped from `target` whether or not the
    /// bundle is found. A miss also drops the stale current-session pointer.
    pub fn resolve(&self, target: &mut NavigationTarget) -> Option<ResultBundle> {
        let supplied = target.strip_session_token();
        match self.resolve_token(supplied.as_deref()) {
            Some(resolved) => {
                if let Some(token) = &resolved.token {
                    if let Err(e) = self.record_current(token, resolved.expiry) {
                        tracing::warn!(error = %e, "failed to record current session");
                    }
                }
                Some(resolved.bundle)
            }
            None => {
                if let Err(e) = self.store.delete(CURRENT_SESSION_KEY) {
                    tracing::warn!(error = %e, "failed to clear current session");
                }
                None
            }
        }
    }

    /// Look up a bundle by precedence without touching any navigation state
    #[must_use]
    pub fn resolve_token(&self, supplied: Option<&str>) -> Option<Resolved> {
        if let Some(raw) = supplied {
            match SessionToken::parse(raw) {
                Ok(token) => {
                    if let Some(found) = self.lookup(&token, ResolvedFrom::SuppliedToken) {
                        return Some(found);
                    }
                }
                Err(e) => tracing::debug!(error = %e, "ignoring supplied token"),
            }
        }

        if let Some(token) = self.current_token() {
            if supplied != Some(token.as_str()) {
                if let Some(found) = self.lookup(&token, ResolvedFrom::CurrentSession) {
                    return Some(found);
                }
            }
        }

        let envelope = self.store.get_envelope::<ResultBundle>(RESULT_FALLBACK_KEY);
        let Some(envelope) = envelope else {
            tracing::debug!("no result bundle to resolve");
            return None;
        };
        tracing::debug!("resolved result bundle from fallback key");
        Some(Resolved {
            token: envelope
                .session_id
                .as_deref()
                .and_then(|id| SessionToken::parse(id).ok()),
            expiry: envelope.expiry,
            bundle: envelope.data,
            source: ResolvedFrom::Fallback,
        })
    }

    /// Token recorded as current, if it is still live
    #[must_use]
    pub fn current_token(&self) -> Option<SessionToken> {
        self.store
            .get::<String>(CURRENT_SESSION_KEY)
            .and_then(|raw| SessionToken::parse(&raw).ok())
    }

    /// Destroy every published bundle and the current-session pointer
    ///
    /// # Errors
    /// Returns error if the store cannot list or remove entries
    pub fn end_session(&self) -> SessionResult<()> {
        let removed = self.store.delete_all_matching(TOKEN_PREFIX)?;
        self.store.delete(RESULT_FALLBACK_KEY)?;
        self.store.delete(CURRENT_SESSION_KEY)?;
        tracing::info!(removed, "ended result session");
        Ok(())
    }

    fn lookup(&self, token: &SessionToken, source: ResolvedFrom) -> Option<Resolved> {
        let envelope = self.store.get_envelope::<ResultBundle>(token.as_str())?;
        tracing::debug!(token = %token, ?source, "resolved result bundle");
        Some(Resolved {
            bundle: envelope.data,
            token: Some(token.clone()),
            source,
            expiry: envelope.expiry,
        })
    }

    fn record_current(&self, token: &SessionToken, expiry: i64) -> SessionResult<()> {
        let envelope = Envelope::new(token.as_str(), expiry);
        self.store.put_envelope(CURRENT_SESSION_KEY, &envelope)?;
        Ok(())
    }
}
