//! Error types for export

use warp::http::StatusCode;

/// Export errors
#[derive(Debug, thiserror::Error)]
pub enum ExportError {
    /// Request used a method other than GET
    #[error("Method not allowed")]
    MethodNotAllowed,

    /// `format`, `data` or `filename` missing or empty
    #[error("Missing required parameters")]
    MissingParameters,

    /// `data` is not valid base64
    #[error("Invalid data payload: {0}")]
    InvalidPayload(#[from] base64::DecodeError),

    /// Format cannot be rendered locally
    #[error("Format {0} is not rendered locally")]
    Unsupported(crate::format::ExportFormat),

    /// Report could not be serialized
    #[error("Failed to render report: {0}")]
    Render(#[from] serde_json::Error),

    /// Share link base URL does not parse
    #[error("Invalid base url '{url}': {source}")]
    InvalidBaseUrl {
        /// The rejected URL
        url: String,
        /// Parser error
        #[source]
        source: url::ParseError,
    },
}

impl ExportError {
    /// HTTP status the download route answers with
    #[must_use]
    pub fn status(&self) -> StatusCode {
        match self {
            Self::MethodNotAllowed => StatusCode::METHOD_NOT_ALLOWED,
            Self::MissingParameters | Self::InvalidPayload(_) | Self::Unsupported(_) => {
                StatusCode::BAD_REQUEST
            }
            Self::Render(_) | Self::InvalidBaseUrl { .. } => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

/// Result type alias for export operations
pub type ExportResult<T> = Result<T, ExportError>;
