//! Export formats and their content metadata

use std::fmt;

/// Target format of a downloadable artifact
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ExportFormat {
    /// `application/pdf`
    Pdf,
    /// `application/json`
    Json,
    /// `text/csv`
    Csv,
    /// `text/plain`, also used for unrecognized formats
    Text,
}

impl ExportFormat {
    /// Parse a requested format; anything unrecognized is plain text
    #[must_use]
    pub fn parse(format: &str) -> Self {
        match format.trim().to_ascii_lowercase().as_str() {
            "pdf" => Self::Pdf,
            "json" => Self::Json,
            "csv" => Self::Csv,
            _ => Self::Text,
        }
    }

    /// MIME type sent as `Content-Type`
    #[inline]
    #[must_use]
    pub fn content_type(self) -> &'static str {
        match self {
            Self::Pdf => "application/pdf",
            Self::Json => "application/json",
            Self::Csv => "text/csv",
            Self::Text => "text/plain",
        }
    }

    /// File extension including the dot
    #[inline]
    #[must_use]
    pub fn extension(self) -> &'static str {
        match self {
            Self::Pdf => ".pdf",
            Self::Json => ".json",
            Self::Csv => ".csv",
            Self::Text => ".txt",
        }
    }

    /// Append the extension unless `filename` already ends with it
    #[must_use]
    pub fn ensure_extension(self, filename: &str) -> String {
        if filename.ends_with(self.extension()) {
            filename.to_string()
        } else {
            format!("{filename}{}", self.extension())
        }
    }
}

impl fmt::Display for ExportFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        // Extension without the dot doubles as the wire name
        f.write_str(&self.extension()[1..])
    }
}
