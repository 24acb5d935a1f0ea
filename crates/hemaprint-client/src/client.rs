//! The prediction service seam

use crate::error::ClientResult;
use crate::request::{PredictionSubject, Submission};
use async_trait::async_trait;
use hemaprint_model::{BloodGroupResult, DiabetesResult, SubmissionReceipt};
use serde_json::Value;

/// Operations the screening flow needs from the remote service
///
/// Implementations must be cheap to share across tasks; the workflow holds
/// one behind an `Arc`.
#[async_trait]
pub trait PredictionClient: Send + Sync {
    /// Record the consent answer; returns the consent the service stored
    async fn submit_consent(&self, consent: bool) -> ClientResult<bool>;

    /// Upload answers and fingerprints
    async fn submit_participant(&self, submission: &Submission) -> ClientResult<SubmissionReceipt>;

    /// Predict the blood group from the subject's fingerprints
    async fn predict_blood_group(&self, subject: &PredictionSubject)
        -> ClientResult<BloodGroupResult>;

    /// Predict diabetes risk for the subject
    async fn predict_diabetes_risk(
        &self,
        subject: &PredictionSubject,
    ) -> ClientResult<DiabetesResult>;

    /// Ask the service to render a PDF report; returns its download URL
    async fn generate_pdf(&self, report: &Value) -> ClientResult<String>;
}
