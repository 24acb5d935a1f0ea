//! Request payloads sent to the prediction service

use hemaprint_model::{FingerprintSet, ParticipantFields, SubmissionReceipt};

/// Form field carrying the consent answer
pub const CONSENT_FIELD: &str = "consent";
/// Form field carrying the donation answer
pub const DONATION_FIELD: &str = "willing_to_donate";

/// One participant's answers and captured fingerprints
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Submission {
    /// Questionnaire answers
    pub participant: ParticipantFields,
    /// Captured fingerprints
    pub images: FingerprintSet,
    /// Consent to store the participant server-side
    pub consent: bool,
    /// Willingness to donate blood
    pub willing_to_donate: bool,
}

impl Submission {
    /// Create a submission
    #[must_use]
    pub fn new(participant: ParticipantFields, images: FingerprintSet, consent: bool) -> Self {
        Self {
            participant,
            images,
            consent,
            willing_to_donate: false,
        }
    }

    /// With donation answer
    #[inline]
    #[must_use]
    pub fn with_willing_to_donate(mut self, willing: bool) -> Self {
        self.willing_to_donate = willing;
        self
    }

    /// Text parts of the multipart form, flags first
    ///
    /// Blank answers are left out. A participant field that shadows one of
    /// the flags is dropped in favor of the flag.
    #[must_use]
    pub fn form_fields(&self) -> Vec<(String, String)> {
        let mut fields = vec![
            (CONSENT_FIELD.to_string(), self.consent.to_string()),
            (DONATION_FIELD.to_string(), self.willing_to_donate.to_string()),
        ];
        fields.extend(
            self.participant
                .form_pairs()
                .into_iter()
                .filter(|(name, _)| name != CONSENT_FIELD && name != DONATION_FIELD),
        );
        fields
    }
}

/// What a prediction request is about
#[derive(Debug, Clone, PartialEq)]
pub enum PredictionSubject {
    /// A participant the backend stored on submission
    Stored {
        /// Backend participant id
        participant_id: u64,
        /// Consent flag forwarded with the request
        consent: bool,
    },
    /// An unsaved submission; the receipt travels with the request
    Inline {
        /// Submission response, forwarded verbatim
        receipt: SubmissionReceipt,
        /// Images to re-attach under the names the receipt lists
        images: FingerprintSet,
    },
}

impl PredictionSubject {
    /// Choose the subject for a receipt
    ///
    /// Stored only when consent was given and the backend both saved the
    /// participant and returned its id.
    #[must_use]
    pub fn for_receipt(receipt: &SubmissionReceipt, submission: &Submission) -> Self {
        match receipt.stored_participant() {
            Some(participant_id) if submission.consent => Self::Stored {
                participant_id,
                consent: true,
            },
            _ => Self::Inline {
                receipt: receipt.clone(),
                images: submission.images.clone(),
            },
        }
    }
}
