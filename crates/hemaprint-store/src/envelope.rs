//! Expiry envelope and its text encoding
//!
//! Wire form is `base64(JSON)` of `{"data": …, "expiry": <ms>, "sessionId": "…"}`
//! (`sessionId` omitted when unset), so entries can live in any store that
//! only holds strings.

use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};

/// A stored value with an absolute expiry
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Envelope<T> {
    /// Wrapped value
    pub data: T,
    /// Expiry, milliseconds since the Unix epoch
    pub expiry: i64,
    /// Token the entry was published under, if any
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub session_id: Option<String>,
}

impl<T> Envelope<T> {
    /// Wrap `data` expiring at `expiry`
    #[inline]
    #[must_use]
    pub fn new(data: T, expiry: i64) -> Self {
        Self {
            data,
            expiry,
            session_id: None,
        }
    }

    /// Attach the session token
    #[inline]
    #[must_use]
    pub fn with_session(mut self, session_id: impl Into<String>) -> Self {
        self.session_id = Some(session_id.into());
        self
    }

    /// Whether the envelope may still be read at `now`
    #[inline]
    #[must_use]
    pub fn is_live(&self, now: i64) -> bool {
        now < self.expiry
    }

    /// Unwrap the value
    #[inline]
    pub fn into_data(self) -> T {
        self.data
    }
}

impl<T: Serialize> Envelope<T> {
    /// Encode to the transportable text form
    ///
    /// # Errors
    /// Returns the serializer error if `data` does not serialize
    pub fn encode(&self) -> Result<String, serde_json::Error> {
        let json = serde_json::to_vec(self)?;
        Ok(STANDARD.encode(json))
    }
}

impl<T: DeserializeOwned> Envelope<T> {
    /// Decode from the text form
    ///
    /// # Errors
    /// Returns a description of the failure: bad base64, bad JSON, or a
    /// payload that does not match `T`
    pub fn decode(raw: &str) -> Result<Self, String> {
        let bytes = STANDARD
            .decode(raw.trim())
            .map_err(|e| format!("invalid base64: {e}"))?;
        serde_json::from_slice(&bytes).map_err(|e| format!("invalid envelope: {e}"))
    }
}
