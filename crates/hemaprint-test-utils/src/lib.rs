//! Testing utilities for the Hemaprint workspace
//!
//! Shared fixtures and a scripted prediction client.

#![allow(missing_docs)]

use async_trait::async_trait;
use hemaprint_client::{ClientError, ClientResult, PredictionClient, PredictionSubject, Submission};
use hemaprint_model::{
    BloodGroupResult, DiabetesResult, FingerName, FingerPrediction, FingerprintImage,
    FingerprintRecord, FingerprintSet, ParticipantFields, ResultBundle, SubmissionReceipt,
};
use hemaprint_session::{FormDraft, SessionConfig, SessionContext};
use hemaprint_store::{EphemeralStore, ManualClock, MemoryBackend};
use parking_lot::Mutex;
use serde_json::{json, Value};
use std::sync::Arc;
use tokio::sync::Notify;

/// Milliseconds the manual clock starts at in fixtures
pub const FIXTURE_EPOCH_MS: i64 = 1_767_225_600_000;

pub fn sample_bundle() -> ResultBundle {
    serde_json::from_value(json!({
        "diabetesResult": {"diabetes_risk": "healthy"},
        "bloodGroupResult": {"predicted_blood_group": "O"},
        "participantData": {"age": 30}
    }))
    .unwrap()
}

pub fn sample_participant() -> ParticipantFields {
    ParticipantFields::new()
        .with("age", 30)
        .with("weight", 70)
        .with("height", 175)
        .with("gender", "female")
}

pub fn completed_draft() -> FormDraft {
    FormDraft {
        participant: sample_participant(),
        willing_to_donate: Some(true),
        completed: true,
        ..FormDraft::default()
    }
}

/// The first `count` fingers in scan order, each with a tiny PNG header
pub fn sample_images(count: usize) -> FingerprintSet {
    FingerName::ORDER
        .iter()
        .take(count)
        .map(|finger| {
            FingerprintImage::new(*finger, format!("{finger}.png"), vec![0x89, b'P', b'N', b'G'])
        })
        .collect()
}

pub fn receipt_for(images: &FingerprintSet, participant_id: Option<u64>) -> SubmissionReceipt {
    SubmissionReceipt {
        saved: participant_id.is_some(),
        participant_id,
        fingerprints: images
            .iter()
            .map(|image| FingerprintRecord {
                finger: image.finger,
                image_name: format!("upload_{}", image.file_name),
            })
            .collect(),
        ..SubmissionReceipt::default()
    }
}

pub fn sample_diabetes_result() -> DiabetesResult {
    DiabetesResult {
        success: true,
        diabetes_risk: "healthy".into(),
        confidence: Some(0.87),
        model_used: Some("random_forest".into()),
        ..DiabetesResult::default()
    }
}

pub fn sample_blood_group_result() -> BloodGroupResult {
    BloodGroupResult {
        success: true,
        results: vec![FingerPrediction {
            finger: "left_thumb".into(),
            predicted_blood_group: "O+".into(),
            confidence: 0.93,
            ..FingerPrediction::default()
        }],
        ..BloodGroupResult::default()
    }
}

/// In-memory session context on a manual clock
pub fn manual_context() -> (SessionContext, ManualClock) {
    let clock = ManualClock::new(FIXTURE_EPOCH_MS);
    let store = EphemeralStore::new(Arc::new(MemoryBackend::new()), Arc::new(clock.clone()));
    (SessionContext::open(store, SessionConfig::default()), clock)
}

/// A call the scripted client received
#[derive(Debug, Clone, PartialEq)]
pub enum Call {
    Consent(bool),
    Submit { fingerprints: usize, consent: bool },
    Diabetes(PredictionSubject),
    BloodGroup(PredictionSubject),
    Pdf(Value),
}

/// Prediction client answering from fixed responses and recording calls
#[derive(Debug)]
pub struct ScriptedClient {
    participant_id: Option<u64>,
    diabetes: DiabetesResult,
    blood_group: BloodGroupResult,
    submit_failure: Option<u16>,
    gate: Option<Arc<Notify>>,
    calls: Mutex<Vec<Call>>,
}

impl Default for ScriptedClient {
    fn default() -> Self {
        Self {
            participant_id: None,
            diabetes: sample_diabetes_result(),
            blood_group: sample_blood_group_result(),
            submit_failure: None,
            gate: None,
            calls: Mutex::new(Vec::new()),
        }
    }
}

impl ScriptedClient {
    pub fn new() -> Self {
        Self::default()
    }

    /// Backend stores the participant under `id` (consent given)
    pub fn storing_as(mut self, id: u64) -> Self {
        self.participant_id = Some(id);
        self
    }

    /// Submission answers with HTTP `status`
    pub fn failing_submit(mut self, status: u16) -> Self {
        self.submit_failure = Some(status);
        self
    }

    /// Submission waits until `gate` is notified
    pub fn gated(mut self, gate: Arc<Notify>) -> Self {
        self.gate = Some(gate);
        self
    }

    pub fn calls(&self) -> Vec<Call> {
        self.calls.lock().clone()
    }

    fn record(&self, call: Call) {
        self.calls.lock().push(call);
    }
}

#[async_trait]
impl PredictionClient for ScriptedClient {
    async fn submit_consent(&self, consent: bool) -> ClientResult<bool> {
        self.record(Call::Consent(consent));
        Ok(consent)
    }

    async fn submit_participant(&self, submission: &Submission) -> ClientResult<SubmissionReceipt> {
        self.record(Call::Submit {
            fingerprints: submission.images.len(),
            consent: submission.consent,
        });
        if let Some(gate) = &self.gate {
            gate.notified().await;
        }
        if let Some(status) = self.submit_failure {
            return Err(ClientError::Status {
                endpoint: "submit/".into(),
                status,
                body: "scripted failure".into(),
            });
        }
        let stored = self.participant_id.filter(|_| submission.consent);
        Ok(receipt_for(&submission.images, stored))
    }

    async fn predict_blood_group(
        &self,
        subject: &PredictionSubject,
    ) -> ClientResult<BloodGroupResult> {
        self.record(Call::BloodGroup(subject.clone()));
        Ok(self.blood_group.clone())
    }

    async fn predict_diabetes_risk(
        &self,
        subject: &PredictionSubject,
    ) -> ClientResult<DiabetesResult> {
        self.record(Call::Diabetes(subject.clone()));
        let mut result = self.diabetes.clone();
        if let PredictionSubject::Stored { participant_id, .. } = subject {
            result.saved = true;
            result.consent_given = true;
            result.participant_id = Some(*participant_id);
        }
        Ok(result)
    }

    async fn generate_pdf(&self, report: &Value) -> ClientResult<String> {
        self.record(Call::Pdf(report.clone()));
        Ok("/media/reports/scripted.pdf".into())
    }
}
