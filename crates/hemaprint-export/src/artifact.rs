//! Downloadable artifacts built from a download request

use crate::error::{ExportError, ExportResult};
use crate::format::ExportFormat;
use base64::alphabet;
use base64::engine::{DecodePaddingMode, GeneralPurpose, GeneralPurposeConfig};
use base64::Engine as _;
use serde::{Deserialize, Serialize};

/// Query parameters of a download request
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExportRequest {
    /// Requested format name
    pub format: Option<String>,
    /// Base64-encoded artifact body
    pub data: Option<String>,
    /// File name, with or without extension
    pub filename: Option<String>,
}

impl ExportRequest {
    /// Create a request with every parameter present
    #[must_use]
    pub fn new(
        format: impl Into<String>,
        data: impl Into<String>,
        filename: impl Into<String>,
    ) -> Self {
        Self {
            format: Some(format.into()),
            data: Some(data.into()),
            filename: Some(filename.into()),
        }
    }
}

/// A decoded artifact ready to be served as an attachment
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DownloadArtifact {
    /// Resolved format
    pub format: ExportFormat,
    /// File name including extension
    pub filename: String,
    /// Decoded body
    pub body: Vec<u8>,
}

/// Standard alphabet, padding optional
const PAYLOAD_ENGINE: GeneralPurpose = GeneralPurpose::new(
    &alphabet::STANDARD,
    GeneralPurposeConfig::new()
        .with_decode_padding_mode(DecodePaddingMode::Indifferent)
        .with_decode_allow_trailing_bits(true),
);

/// Map the URL-safe alphabet onto the standard one and undo form decoding,
/// which turns an unescaped '+' into a space
fn normalize_payload(data: &str) -> String {
    data.chars()
        .map(|c| match c {
            ' ' | '-' => '+',
            '_' => '/',
            c => c,
        })
        .collect()
}

fn required(param: Option<&String>) -> ExportResult<&str> {
    param
        .map(String::as_str)
        .filter(|s| !s.is_empty())
        .ok_or(ExportError::MissingParameters)
}

/// Drop characters that would break out of the quoted disposition value
fn sanitize_filename(filename: &str) -> String {
    filename
        .chars()
        .filter(|c| !c.is_control() && *c != '"' && *c != '\\')
        .collect()
}

impl DownloadArtifact {
    /// Decode a download request
    ///
    /// # Errors
    /// - `MissingParameters` if any parameter is absent or empty
    /// - `InvalidPayload` if `data` is not base64
    pub fn from_request(request: &ExportRequest) -> ExportResult<Self> {
        let format = ExportFormat::parse(required(request.format.as_ref())?);
        let data = required(request.data.as_ref())?;
        let filename = required(request.filename.as_ref())?;

        let body = PAYLOAD_ENGINE.decode(normalize_payload(data))?;

        Ok(Self {
            format,
            filename: format.ensure_extension(&sanitize_filename(filename)),
            body,
        })
    }

    /// Response headers, lowercase names
    #[must_use]
    pub fn headers(&self) -> Vec<(&'static str, String)> {
        vec![
            ("content-type", self.format.content_type().to_string()),
            (
                "content-disposition",
                format!("attachment; filename=\"{}\"", self.filename),
            ),
            (
                "cache-control",
                "no-cache, no-store, must-revalidate".to_string(),
            ),
            ("pragma", "no-cache".to_string()),
            ("expires", "0".to_string()),
            ("access-control-allow-origin", "*".to_string()),
            ("access-control-allow-methods", "GET".to_string()),
            ("access-control-allow-headers", "Content-Type".to_string()),
        ]
    }
}
