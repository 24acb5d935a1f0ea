//! Records exchanged with the remote inference service
//!
//! Every field carries a serde default and unknown keys are preserved in
//! `extra`, so a record decodes from whatever subset the backend sends and
//! re-encodes without losing anything.

use crate::fingerprint::FingerName;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::collections::BTreeMap;

/// Response to a participant submission
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SubmissionReceipt {
    /// Whether the backend persisted the participant (consent given)
    pub saved: bool,
    /// Backend id of the stored participant
    #[serde(skip_serializing_if = "Option::is_none")]
    pub participant_id: Option<u64>,
    /// Fingerprints the backend accepted
    pub fingerprints: Vec<FingerprintRecord>,
    /// Any other keys in the response
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl SubmissionReceipt {
    /// Participant id, only when the backend actually stored the participant
    #[inline]
    #[must_use]
    pub fn stored_participant(&self) -> Option<u64> {
        if self.saved {
            self.participant_id
        } else {
            None
        }
    }
}

/// A fingerprint as acknowledged by the backend
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FingerprintRecord {
    /// Finger the image belongs to
    pub finger: FingerName,
    /// Name the backend expects the re-uploaded file to carry
    pub image_name: String,
}

/// Diabetes-risk prediction
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DiabetesResult {
    /// Backend success flag
    pub success: bool,
    /// Risk label, e.g. `healthy` or `diabetic`
    pub diabetes_risk: String,
    /// Model confidence in `0.0..=1.0`
    #[serde(skip_serializing_if = "Option::is_none")]
    pub confidence: Option<f64>,
    /// Model identifier
    #[serde(skip_serializing_if = "Option::is_none")]
    pub model_used: Option<String>,
    /// Inputs the model saw
    #[serde(skip_serializing_if = "Option::is_none")]
    pub prediction_details: Option<Value>,
    /// Whether the result was stored server-side
    pub saved: bool,
    /// Whether the participant consented to storage
    pub consent_given: bool,
    /// Backend participant id, when stored
    #[serde(skip_serializing_if = "Option::is_none")]
    pub participant_id: Option<u64>,
    /// Backend result id, when stored
    #[serde(skip_serializing_if = "Option::is_none")]
    pub result_id: Option<u64>,
    /// Any other keys in the response
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// Per-finger blood-group prediction
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FingerPrediction {
    /// Finger wire name
    pub finger: String,
    /// Image the prediction was made from
    pub image_name: String,
    /// Predicted group, e.g. `O+`
    pub predicted_blood_group: String,
    /// Model confidence in `0.0..=1.0`
    pub confidence: f64,
    /// Probability per group
    pub all_probabilities: BTreeMap<String, f64>,
}

/// Blood-group prediction across all submitted fingers
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BloodGroupResult {
    /// Backend success flag
    pub success: bool,
    /// Per-finger predictions
    pub results: Vec<FingerPrediction>,
    /// Aggregate prediction, when the backend supplies one
    #[serde(skip_serializing_if = "Option::is_none")]
    pub predicted_blood_group: Option<String>,
    /// Any other keys in the response
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl BloodGroupResult {
    /// Per-finger prediction with the highest confidence
    #[must_use]
    pub fn best_prediction(&self) -> Option<&FingerPrediction> {
        self.results
            .iter()
            .filter(|p| p.confidence > 0.0)
            .max_by(|a, b| a.confidence.total_cmp(&b.confidence))
    }

    /// Group to show: the most confident finger, else the aggregate
    #[must_use]
    pub fn headline_group(&self) -> Option<&str> {
        self.best_prediction()
            .map(|p| p.predicted_blood_group.as_str())
            .or(self.predicted_blood_group.as_deref())
    }
}
