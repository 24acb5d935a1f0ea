//! Hemaprint Prediction Client
//!
//! The boundary to the remote inference service. Everything behind it
//! (fingerprint classification, diabetes-risk model, PDF rendering) is an
//! external collaborator reached over HTTP.
//!
//! # Flow
//!
//! ```text
//! Submission ──submit_participant──→ SubmissionReceipt
//!                                        │
//!             ┌──── saved + consent ─────┴──── otherwise ────┐
//!             ↓                                               ↓
//!   PredictionSubject::Stored                     PredictionSubject::Inline
//!   (by participant id)                           (receipt JSON + re-attached images)
//!             └──────→ predict_diabetes_risk / predict_blood_group ←──────┘
//! ```
//!
//! Every call can fail; [`ClientError::is_retryable`] tells the caller
//! whether offering "try again" makes sense.

#![warn(missing_docs)]
#![warn(unreachable_pub)]

pub mod client;
pub mod config;
pub mod error;
pub mod http;
pub mod request;

// Re-exports for convenience
pub use client::PredictionClient;
pub use config::ClientConfig;
pub use error::{ClientError, ClientResult};
pub use http::HttpPredictionClient;
pub use request::{PredictionSubject, Submission};

/// Version of this crate
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Prelude module for common imports
pub mod prelude {
    //! Common imports for talking to the prediction service
    pub use crate::{
        ClientConfig, ClientError, ClientResult, HttpPredictionClient, PredictionClient,
        PredictionSubject, Submission,
    };
}
