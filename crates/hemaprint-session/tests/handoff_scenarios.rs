//! End-to-end handoff and draft scenarios across "page loads"
//!
//! A page load is modeled as a new `SessionContext` over the same backend.

use hemaprint_model::ResultBundle;
use hemaprint_session::keys::RESULT_FALLBACK_KEY;
use hemaprint_session::{FormDraft, NavigationTarget, SessionConfig, SessionContext};
use hemaprint_store::{EphemeralStore, FileBackend, KvBackend, ManualClock, MemoryBackend};
use pretty_assertions::assert_eq;
use std::sync::Arc;
use std::time::Duration;

fn sample_bundle() -> ResultBundle {
    serde_json::from_value(serde_json::json!({
        "diabetesResult": {"diabetes_risk": "healthy"},
        "bloodGroupResult": {"predicted_blood_group": "O"},
        "participantData": {"age": 30}
    }))
    .unwrap()
}

#[test]
fn publish_navigate_resolve_then_expire() {
    let clock = ManualClock::new(1_700_000_000_000);
    let backend = Arc::new(MemoryBackend::new());
    let store = EphemeralStore::new(backend, Arc::new(clock.clone()));

    // Submission page publishes and navigates.
    let submit_page = SessionContext::open(store.clone(), SessionConfig::default());
    let bundle = sample_bundle();
    let token = submit_page.handoff().publish(&bundle).unwrap();
    let address = submit_page.handoff().results_target(&token).to_string();
    assert_eq!(address, format!("/result?s={token}"));
    assert!(!address.contains("healthy"));

    // Results page loads from the address alone.
    let results_page = SessionContext::open(store.clone(), SessionConfig::default());
    let mut target = NavigationTarget::parse(&address);
    assert_eq!(results_page.handoff().resolve(&mut target), Some(bundle.clone()));
    assert_eq!(target.to_string(), "/result");

    // Same token again, still there.
    let resolved = results_page.handoff().resolve_token(Some(token.as_str()));
    assert_eq!(resolved.map(|r| r.bundle), Some(bundle));

    // Two hours and a bit later.
    clock.advance(Duration::from_secs(2 * 60 * 60 + 1));
    let late_page = SessionContext::open(store, SessionConfig::default());
    assert!(late_page.handoff().resolve_token(Some(token.as_str())).is_none());
    let mut target = NavigationTarget::parse(&address);
    assert_eq!(late_page.handoff().resolve(&mut target), None);
}

#[test]
fn draft_survives_process_restart_with_file_backend() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("tab.json");
    let clock = ManualClock::new(0);

    let mut draft = FormDraft::new();
    draft.participant.set("age", 52);
    draft.participant.set("gender", "female");
    draft.willing_to_donate = Some(true);

    {
        let store = EphemeralStore::new(
            Arc::new(FileBackend::open(&path).unwrap()),
            Arc::new(clock.clone()),
        );
        SessionContext::open(store, SessionConfig::default())
            .drafts()
            .save(&mut draft);
    }

    let store = EphemeralStore::new(
        Arc::new(FileBackend::open(&path).unwrap()),
        Arc::new(clock.clone()),
    );
    let ctx = SessionContext::open(store, SessionConfig::default());
    assert_eq!(ctx.drafts().load(), Some(draft));

    ctx.drafts().clear();
    assert_eq!(ctx.drafts().load(), None);
}

#[test]
fn corrupted_result_entry_reads_as_absent_and_is_removed() {
    let clock = ManualClock::new(0);
    let backend = Arc::new(MemoryBackend::new());
    let store = EphemeralStore::new(backend.clone(), Arc::new(clock));
    let ctx = SessionContext::open(store, SessionConfig::default());

    let token = ctx.handoff().publish(&sample_bundle()).unwrap();
    backend.set(token.as_str(), "bm90IGpzb24=".to_string()).unwrap();
    backend.set(RESULT_FALLBACK_KEY, "!!".to_string()).unwrap();

    let resolved = ctx.handoff().resolve_token(Some(token.as_str()));
    assert!(resolved.is_none());
    assert!(backend.get(token.as_str()).unwrap().is_none());
    assert!(backend.get(RESULT_FALLBACK_KEY).unwrap().is_none());
}

// Two tabs sharing one backend is outside the supported model; this pins down
// what happens anyway: token entries stay independent, the fallback copy is
// last writer wins.
#[test]
fn two_tabs_keep_their_own_tokens() {
    let clock = ManualClock::new(0);
    let backend = Arc::new(MemoryBackend::new());
    let tab_a = SessionContext::open(
        EphemeralStore::new(backend.clone(), Arc::new(clock.clone())),
        SessionConfig::default(),
    );
    let tab_b = SessionContext::open(
        EphemeralStore::new(backend, Arc::new(clock)),
        SessionConfig::default(),
    );

    let mut bundle_a = sample_bundle();
    bundle_a.diabetes_result.diabetes_risk = "tab-a".into();
    let mut bundle_b = sample_bundle();
    bundle_b.diabetes_result.diabetes_risk = "tab-b".into();

    let token_a = tab_a.handoff().publish(&bundle_a).unwrap();
    let token_b = tab_b.handoff().publish(&bundle_b).unwrap();

    assert_eq!(
        tab_a.handoff().resolve_token(Some(token_a.as_str())).unwrap().bundle,
        bundle_a
    );
    assert_eq!(
        tab_b.handoff().resolve_token(Some(token_b.as_str())).unwrap().bundle,
        bundle_b
    );
    assert_eq!(tab_a.handoff().resolve_token(None).unwrap().bundle, bundle_b);
}
