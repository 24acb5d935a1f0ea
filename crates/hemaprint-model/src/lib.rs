//! Hemaprint domain model
//!
//! Plain, serializable records shared by every other crate in the workspace:
//!
//! - **Participant fields**: the questionnaire answers, kept as a tolerant
//!   name → value map so older and newer drafts decode alike
//! - **Fingerprints**: finger names in scan order and captured images
//! - **Predictions**: records returned by the remote inference service
//! - **Bundle**: the combined result handed from submission to the results view
//!
//! # Example
//!
//! ```rust
//! use hemaprint_model::{FieldValue, ParticipantFields};
//!
//! let mut fields = ParticipantFields::new();
//! fields.set("age", FieldValue::from(30));
//! fields.set("gender", FieldValue::from("female"));
//!
//! assert_eq!(fields.get("age").map(FieldValue::to_form_value).as_deref(), Some("30"));
//! ```

#![warn(missing_docs)]

pub mod bundle;
pub mod fingerprint;
pub mod participant;
pub mod prediction;

// Re-exports
pub use bundle::ResultBundle;
pub use fingerprint::{FingerName, FingerprintImage, FingerprintSet};
pub use participant::{FieldValue, ParticipantFields, REQUIRED_FIELDS};
pub use prediction::{
    BloodGroupResult, DiabetesResult, FingerPrediction, FingerprintRecord, SubmissionReceipt,
};

/// Prelude module for common imports
pub mod prelude {
    //! Common imports for working with screening records
    pub use crate::{
        BloodGroupResult, DiabetesResult, FieldValue, FingerName, FingerprintImage,
        FingerprintSet, ParticipantFields, ResultBundle, SubmissionReceipt,
    };
}

/// Version of this crate
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
