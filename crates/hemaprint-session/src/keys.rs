//! Well-known storage keys
//!
//! Names match what the browser client writes to session storage, so a
//! store populated by either side reads the same.

/// Token of the most recently published (or resolved) result
pub const CURRENT_SESSION_KEY: &str = "current_session_id";

/// Copy of the most recent result envelope, last writer wins
pub const RESULT_FALLBACK_KEY: &str = "health_results_data";

/// In-progress questionnaire
pub const FORM_DRAFT_KEY: &str = "form_data_backup";

/// Prefix of every token-keyed result entry; the startup sweep scans it
pub const TOKEN_PREFIX: &str = "session_";
