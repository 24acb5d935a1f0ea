//! The result bundle handed from submission to the results view

use crate::participant::ParticipantFields;
use crate::prediction::{BloodGroupResult, DiabetesResult};
use serde::{Deserialize, Serialize};

/// Combined outcome of one completed analysis
///
/// Created once when a submission succeeds and never mutated afterwards.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ResultBundle {
    /// Diabetes-risk prediction
    pub diabetes_result: DiabetesResult,
    /// Blood-group prediction
    pub blood_group_result: BloodGroupResult,
    /// Participant answers at submission time, including the donation answer
    pub participant_data: ParticipantFields,
}

impl ResultBundle {
    /// Assemble a bundle from its parts
    #[inline]
    #[must_use]
    pub fn new(
        diabetes_result: DiabetesResult,
        blood_group_result: BloodGroupResult,
        participant_data: ParticipantFields,
    ) -> Self {
        Self {
            diabetes_result,
            blood_group_result,
            participant_data,
        }
    }

    /// Backend participant id, if the submission was stored
    #[must_use]
    pub fn participant_id(&self) -> Option<u64> {
        self.diabetes_result.participant_id.or_else(|| {
            self.participant_data
                .get("participant_id")
                .and_then(crate::FieldValue::as_f64)
                .filter(|id| id.fract() == 0.0 && *id >= 0.0)
                .map(|id| id as u64)
        })
    }
}
