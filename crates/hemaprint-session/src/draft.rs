//! Questionnaire draft persistence
//!
//! The personal-information page saves on every edit. Write failures are
//! logged and swallowed; reads treat anything unusable as "no draft".

use crate::keys::FORM_DRAFT_KEY;
use hemaprint_model::{FieldValue, ParticipantFields};
use hemaprint_store::EphemeralStore;
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Field name the donation answer is copied to in participant snapshots
pub const WILLING_TO_DONATE_FIELD: &str = "willing_to_donate";

/// In-progress questionnaire state
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct FormDraft {
    /// Answers so far
    pub participant: ParticipantFields,
    /// Donation answer; `None` until the user picks one
    pub willing_to_donate: Option<bool>,
    /// When the draft was last written, milliseconds since the Unix epoch
    #[serde(rename = "timestamp")]
    pub saved_at: i64,
    /// Set once the personal-information step has been submitted
    pub completed: bool,
}

impl FormDraft {
    /// Empty draft
    #[inline]
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Participant answers plus the donation answer, as submitted
    #[must_use]
    pub fn snapshot(&self) -> ParticipantFields {
        let mut fields = self.participant.clone();
        if let Some(willing) = self.willing_to_donate {
            fields.set(WILLING_TO_DONATE_FIELD, FieldValue::Bool(willing));
        }
        fields
    }
}

/// Draft persistence over the session store
#[derive(Debug, Clone)]
pub struct DraftStore {
    store: EphemeralStore,
    ttl: Duration,
}

impl DraftStore {
    /// Create draft store writing entries that live for `ttl`
    #[inline]
    #[must_use]
    pub fn new(store: EphemeralStore, ttl: Duration) -> Self {
        Self { store, ttl }
    }

    /// Stamp `draft.saved_at` and write it; failures are logged, not returned
    pub fn save(&self, draft: &mut FormDraft) {
        draft.saved_at = self.store.now_millis();
        match self.store.put(FORM_DRAFT_KEY, &*draft, self.ttl) {
            Ok(()) => tracing::trace!(fields = draft.participant.len(), "saved form draft"),
            Err(e) => tracing::error!(error = %e, "failed to save form draft"),
        }
    }

    /// Last saved draft, unless none was saved or it expired
    #[must_use]
    pub fn load(&self) -> Option<FormDraft> {
        self.store.get(FORM_DRAFT_KEY)
    }

    /// Drop the draft immediately
    pub fn clear(&self) {
        match self.store.delete(FORM_DRAFT_KEY) {
            Ok(()) => tracing::debug!("cleared form draft"),
            Err(e) => tracing::error!(error = %e, "failed to clear form draft"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use hemaprint_store::{ManualClock, MemoryBackend};
    use pretty_assertions::assert_eq;
    use std::sync::Arc;

    fn drafts(clock: &ManualClock) -> DraftStore {
        let store = EphemeralStore::new(Arc::new(MemoryBackend::new()), Arc::new(clock.clone()));
        DraftStore::new(store, Duration::from_secs(24 * 60 * 60))
    }

    #[test]
    fn first_visit_has_no_draft() {
        let clock = ManualClock::new(0);
        assert_eq!(drafts(&clock).load(), None);
    }

    #[test]
    fn save_stamps_and_load_returns_last_save() {
        let clock = ManualClock::new(5_000);
        let store = drafts(&clock);

        let mut draft = FormDraft::new();
        draft.participant.set("age", 30);
        store.save(&mut draft);

        clock.advance(Duration::from_secs(1));
        draft.participant.set("weight", "70");
        draft.willing_to_donate = Some(true);
        store.save(&mut draft);

        let loaded = store.load().unwrap();
        assert_eq!(loaded, draft);
        assert_eq!(loaded.saved_at, 6_000);
    }

    #[test]
    fn clear_then_load_is_absent() {
        let clock = ManualClock::new(0);
        let store = drafts(&clock);
        store.save(&mut FormDraft::new());

        store.clear();
        assert_eq!(store.load(), None);
    }

    #[test]
    fn draft_expires_after_a_day() {
        let clock = ManualClock::new(0);
        let store = drafts(&clock);
        store.save(&mut FormDraft::new());

        clock.advance(Duration::from_secs(24 * 60 * 60));
        assert_eq!(store.load(), None);
    }

    #[test]
    fn old_and_new_shapes_decode() {
        let old: FormDraft =
            serde_json::from_str(r#"{"participant":{"age":"44"},"timestamp":1}"#).unwrap();
        assert_eq!(old.willing_to_donate, None);
        assert!(!old.completed);

        let newer: FormDraft = serde_json::from_str(
            r#"{"participant":{},"willingToDonate":false,"completed":true,"consentVersion":3}"#,
        )
        .unwrap();
        assert_eq!(newer.willing_to_donate, Some(false));
        assert!(newer.completed);
    }

    #[test]
    fn snapshot_includes_donation_answer() {
        let mut draft = FormDraft::new();
        draft.participant.set("age", 30);
        assert_eq!(draft.snapshot().get(WILLING_TO_DONATE_FIELD), None);

        draft.willing_to_donate = Some(false);
        assert_eq!(
            draft.snapshot().get(WILLING_TO_DONATE_FIELD),
            Some(&FieldValue::Bool(false))
        );
    }
}
