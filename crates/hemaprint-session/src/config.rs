//! Session lifetimes

use serde::{Deserialize, Serialize};
use std::time::Duration;

/// How long session entries stay readable
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SessionConfig {
    /// Lifetime of a published result bundle, in seconds
    pub result_ttl_secs: u64,
    /// Lifetime of a questionnaire draft, in seconds
    pub draft_ttl_secs: u64,
}

impl SessionConfig {
    /// Create default configuration (2h results, 24h drafts)
    #[inline]
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// With result lifetime
    #[inline]
    #[must_use]
    pub fn with_result_ttl(mut self, ttl: Duration) -> Self {
        self.result_ttl_secs = ttl.as_secs();
        self
    }

    /// With draft lifetime
    #[inline]
    #[must_use]
    pub fn with_draft_ttl(mut self, ttl: Duration) -> Self {
        self.draft_ttl_secs = ttl.as_secs();
        self
    }

    /// Result lifetime
    #[inline]
    #[must_use]
    pub fn result_ttl(&self) -> Duration {
        Duration::from_secs(self.result_ttl_secs)
    }

    /// Draft lifetime
    #[inline]
    #[must_use]
    pub fn draft_ttl(&self) -> Duration {
        Duration::from_secs(self.draft_ttl_secs)
    }
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            result_ttl_secs: 2 * 60 * 60,
            draft_ttl_secs: 24 * 60 * 60,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_are_two_hours_and_one_day() {
        let config = SessionConfig::default();
        assert_eq!(config.result_ttl(), Duration::from_secs(7_200));
        assert_eq!(config.draft_ttl(), Duration::from_secs(86_400));
    }

    #[test]
    fn partial_document_keeps_defaults() {
        let config: SessionConfig = serde_json::from_str(r#"{"result_ttl_secs": 60}"#).unwrap();
        assert_eq!(config.result_ttl_secs, 60);
        assert_eq!(config.draft_ttl_secs, 86_400);
    }
}
