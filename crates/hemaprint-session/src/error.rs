//! Error types for the session layer

use hemaprint_store::StoreError;

/// Session layer errors
#[derive(Debug, thiserror::Error)]
pub enum SessionError {
    /// Token does not have the `session_<alphanumerics>` shape
    #[error("malformed session token: '{0}'")]
    MalformedToken(String),

    /// Underlying store failure
    #[error("store error: {0}")]
    Store(#[from] StoreError),
}

/// Result type alias for session operations
pub type SessionResult<T> = Result<T, SessionError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn malformed_token_display() {
        let err = SessionError::MalformedToken("x y".to_string());
        assert_eq!(err.to_string(), "malformed session token: 'x y'");
    }
}
