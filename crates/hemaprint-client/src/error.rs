//! Error types for the prediction client
//!
//! Classifies failures by what the user can do about them:
//! - Retryable: timeouts, connection failures, 5xx and 429 responses
//! - Not retryable: other 4xx responses, bodies that do not decode,
//!   explicit rejections

/// Prediction client errors
#[derive(Debug, thiserror::Error)]
pub enum ClientError {
    /// Request did not complete within the configured timeout
    #[error("request to {endpoint} timed out")]
    Timeout {
        /// Endpoint path relative to the base URL
        endpoint: String,
    },

    /// Connection or protocol failure before a response arrived
    #[error("transport error calling {endpoint}: {message}")]
    Transport {
        /// Endpoint path relative to the base URL
        endpoint: String,
        /// Underlying transport error
        message: String,
    },

    /// Non-2xx response
    #[error("{endpoint} returned status {status}: {body}")]
    Status {
        /// Endpoint path relative to the base URL
        endpoint: String,
        /// HTTP status code
        status: u16,
        /// Response body, truncated
        body: String,
    },

    /// 2xx response whose body is not the expected shape
    #[error("malformed response from {endpoint}: {message}")]
    MalformedBody {
        /// Endpoint path relative to the base URL
        endpoint: String,
        /// Decoder error
        message: String,
    },

    /// Service answered but reported failure
    #[error("{endpoint} rejected the request: {message}")]
    Rejected {
        /// Endpoint path relative to the base URL
        endpoint: String,
        /// Reason the service gave
        message: String,
    },

    /// Request could not be built (bad base URL, bad content type)
    #[error("invalid request: {0}")]
    InvalidRequest(String),
}

impl ClientError {
    /// Check if error is retryable
    #[inline]
    #[must_use]
    pub fn is_retryable(&self) -> bool {
        match self {
            Self::Timeout { .. } | Self::Transport { .. } => true,
            Self::Status { status, .. } => *status >= 500 || *status == 429,
            Self::MalformedBody { .. } | Self::Rejected { .. } | Self::InvalidRequest(_) => false,
        }
    }

    pub(crate) fn from_reqwest(endpoint: &str, err: &reqwest::Error) -> Self {
        if err.is_timeout() {
            Self::Timeout {
                endpoint: endpoint.to_string(),
            }
        } else if err.is_builder() {
            Self::InvalidRequest(err.to_string())
        } else {
            Self::Transport {
                endpoint: endpoint.to_string(),
                message: err.to_string(),
            }
        }
    }
}

/// Result type alias for client operations
pub type ClientResult<T> = Result<T, ClientError>;
