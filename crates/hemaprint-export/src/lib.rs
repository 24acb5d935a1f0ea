//! Hemaprint Export
//!
//! Turning results into something a participant can keep.
//!
//! # Pieces
//!
//! ```text
//! ResultBundle ──from_bundle──→ ResultReport ──render──→ JSON / CSV / text
//!                                    │
//!                                    └──share_link──→ /api/download-data?format=json&data=<b64>&filename=…
//!                                                            │
//!                              download_route (warp) ←───────┘
//!                                    │
//!                                    └──→ DownloadArtifact: decoded body + attachment headers
//! ```
//!
//! # Example
//!
//! ```rust
//! use hemaprint_export::{DownloadArtifact, ExportFormat, ExportRequest};
//!
//! let request = ExportRequest::new("csv", "YSxiCg==", "results");
//! let artifact = DownloadArtifact::from_request(&request).unwrap();
//! assert_eq!(artifact.format, ExportFormat::Csv);
//! assert_eq!(artifact.filename, "results.csv");
//! ```

#![warn(missing_docs)]
#![warn(unreachable_pub)]

pub mod artifact;
pub mod error;
pub mod format;
pub mod report;
pub mod route;

// Re-exports for convenience
pub use artifact::{DownloadArtifact, ExportRequest};
pub use error::{ExportError, ExportResult};
pub use format::ExportFormat;
pub use report::{share_link, AnalysisResults, ParticipantInfo, ReportMetadata, ResultReport};
pub use route::{download_route, error_response, handle_download};

/// Version of this crate
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Prelude module for common imports
pub mod prelude {
    //! Common imports for export
    pub use crate::{
        download_route, share_link, DownloadArtifact, ExportError, ExportFormat, ExportRequest,
        ExportResult, ResultReport,
    };
}
