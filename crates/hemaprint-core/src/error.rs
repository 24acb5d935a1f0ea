//! Error types for the screening workflow
//!
//! Nothing here is fatal. Each variant names the state the user falls back
//! to:
//! - `Prediction`: stay on the page, offer a retry when retryable
//! - `Redirect`: go back to an earlier step whose data is missing
//! - `Validation`: stay on the page and show the message
//! - `SubmissionInFlight`: ignore the duplicate action

use crate::step::Step;
use hemaprint_client::ClientError;
use hemaprint_export::ExportError;
use hemaprint_session::SessionError;
use std::path::PathBuf;

/// Screening workflow errors
#[derive(Debug, thiserror::Error)]
pub enum ScreeningError {
    /// Prediction service call failed
    #[error("prediction service error: {0}")]
    Prediction(#[from] ClientError),

    /// Required upstream data is missing
    #[error("missing earlier step, redirect to {to}")]
    Redirect {
        /// Step to send the user back to
        to: Step,
    },

    /// A submission is already outstanding
    #[error("a submission is already in progress")]
    SubmissionInFlight,

    /// User input is incomplete
    #[error("{0}")]
    Validation(String),

    /// Session storage failed
    #[error("session storage error: {0}")]
    Session(#[from] SessionError),

    /// Report export failed
    #[error("export error: {0}")]
    Export(#[from] ExportError),
}

impl ScreeningError {
    /// Check if offering "try again" makes sense
    #[inline]
    #[must_use]
    pub fn is_retryable(&self) -> bool {
        match self {
            Self::Prediction(e) => e.is_retryable(),
            _ => false,
        }
    }

    /// Step to redirect to, if this error is a redirect
    #[inline]
    #[must_use]
    pub fn redirect_target(&self) -> Option<Step> {
        match self {
            Self::Redirect { to } => Some(*to),
            _ => None,
        }
    }
}

/// Result type alias for workflow operations
pub type ScreeningResult<T> = Result<T, ScreeningError>;

/// Configuration loading errors
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// Config file could not be read
    #[error("failed to read config {path}: {source}")]
    Read {
        /// File path
        path: PathBuf,
        /// Underlying error
        #[source]
        source: std::io::Error,
    },

    /// Config file is not valid TOML for this schema
    #[error("failed to parse config: {0}")]
    Parse(#[from] toml::de::Error),

    /// Config parsed but a value is out of range
    #[error("invalid config: {0}")]
    Invalid(String),
}

/// Result type alias for configuration
pub type ConfigResult<T> = Result<T, ConfigError>;
