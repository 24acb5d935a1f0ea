//! Screening workflow end to end, against scripted and mocked clients

use async_trait::async_trait;
use hemaprint_client::{ClientError, ClientResult, PredictionSubject};
use hemaprint_core::prelude::*;
use hemaprint_model::{BloodGroupResult, DiabetesResult, FieldValue, SubmissionReceipt};
use hemaprint_session::keys::TOKEN_PREFIX;
use hemaprint_test_utils::{
    completed_draft, manual_context, receipt_for, sample_blood_group_result,
    sample_diabetes_result, sample_images, sample_participant, Call, ScriptedClient,
};
use mockall::mock;
use pretty_assertions::assert_eq;
use serde_json::Value;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::Notify;

mock! {
    pub Client {}

    #[async_trait]
    impl PredictionClient for Client {
        async fn submit_consent(&self, consent: bool) -> ClientResult<bool>;
        async fn submit_participant(&self, submission: &Submission) -> ClientResult<SubmissionReceipt>;
        async fn predict_blood_group(&self, subject: &PredictionSubject) -> ClientResult<BloodGroupResult>;
        async fn predict_diabetes_risk(&self, subject: &PredictionSubject) -> ClientResult<DiabetesResult>;
        async fn generate_pdf(&self, report: &Value) -> ClientResult<String>;
    }
}

fn fill_personal_info<C: PredictionClient>(workflow: &ScreeningWorkflow<C>) {
    workflow.update_field("age", 30);
    workflow.update_field("weight", 70);
    workflow.update_field("height", 175);
    workflow.set_willing_to_donate(true);
    assert_eq!(workflow.complete_personal_info().unwrap(), Step::Fingerprint);
}

#[tokio::test]
async fn consented_flow_predicts_by_participant_id_and_hands_off_results() {
    let (session, clock) = manual_context();
    let client = Arc::new(ScriptedClient::new().storing_as(42));
    let workflow = ScreeningWorkflow::new(client.clone(), session);

    assert_eq!(workflow.give_consent(true).await.unwrap(), Step::PersonalInfo);
    assert_eq!(
        workflow.enter_fingerprint_step().unwrap_err().redirect_target(),
        Some(Step::PersonalInfo)
    );
    fill_personal_info(&workflow);

    let target = workflow.submit(sample_images(2)).await.unwrap();
    assert_eq!(target.path(), "/result");
    let token = target.session_token().unwrap().to_string();
    assert!(token.starts_with(TOKEN_PREFIX));
    assert!(workflow.session().drafts().load().is_none());

    let stored = PredictionSubject::Stored {
        participant_id: 42,
        consent: true,
    };
    assert_eq!(
        client.calls(),
        vec![
            Call::Consent(true),
            Call::Submit {
                fingerprints: 2,
                consent: true
            },
            Call::Diabetes(stored.clone()),
            Call::BloodGroup(stored),
        ]
    );

    let mut incoming = NavigationTarget::parse(&target.to_string());
    let bundle = match workflow.open_results(&mut incoming) {
        ResultsView::Ready(bundle) => bundle,
        ResultsView::NoResults => panic!("published bundle did not resolve"),
    };
    assert_eq!(incoming.session_token(), None);
    assert_eq!(bundle.participant_id(), Some(42));
    assert_eq!(
        bundle.participant_data.get("willing_to_donate"),
        Some(&FieldValue::Bool(true))
    );
    assert_eq!(bundle.blood_group_result.headline_group(), Some("O+"));

    clock.advance(Duration::from_secs(2 * 60 * 60 + 1));
    let mut later = NavigationTarget::parse(&format!("/result?s={token}"));
    assert_eq!(workflow.open_results(&mut later), ResultsView::NoResults);
}

#[tokio::test]
async fn declined_consent_predicts_from_the_submission_receipt() {
    let (session, _clock) = manual_context();
    let client = Arc::new(ScriptedClient::new().storing_as(42));
    let workflow = ScreeningWorkflow::new(client.clone(), session);

    workflow.give_consent(false).await.unwrap();
    fill_personal_info(&workflow);
    let images = sample_images(1);
    workflow.submit(images.clone()).await.unwrap();

    let inline = PredictionSubject::Inline {
        receipt: receipt_for(&images, None),
        images,
    };
    let calls = client.calls();
    assert_eq!(calls[2], Call::Diabetes(inline.clone()));
    assert_eq!(calls[3], Call::BloodGroup(inline));
}

#[tokio::test]
async fn failed_submission_leaves_draft_and_store_untouched() {
    let (session, _clock) = manual_context();
    let client = Arc::new(ScriptedClient::new().failing_submit(503));
    let workflow = ScreeningWorkflow::new(client, session);
    fill_personal_info(&workflow);
    let before = workflow.draft();

    let err = workflow.submit(sample_images(3)).await.unwrap_err();

    assert!(matches!(err, ScreeningError::Prediction(_)));
    assert!(err.is_retryable());
    assert_eq!(workflow.draft(), before);
    assert!(!workflow.is_submitting());
    assert!(workflow.session().handoff().current_token().is_none());
    assert_eq!(
        workflow
            .session()
            .store()
            .backend()
            .keys_with_prefix(TOKEN_PREFIX)
            .unwrap(),
        Vec::<String>::new()
    );
}

#[tokio::test]
async fn submission_requires_a_fingerprint() {
    let (session, _clock) = manual_context();
    let client = Arc::new(ScriptedClient::new());
    let workflow = ScreeningWorkflow::new(client.clone(), session);
    fill_personal_info(&workflow);

    let err = workflow.submit(FingerprintSet::new()).await.unwrap_err();

    assert!(matches!(err, ScreeningError::Validation(_)));
    assert!(client.calls().is_empty());
}

#[tokio::test]
async fn missing_answers_block_personal_info_completion() {
    let (session, _clock) = manual_context();
    let workflow = ScreeningWorkflow::new(Arc::new(ScriptedClient::new()), session);

    workflow.update_field("age", 30);
    workflow.update_field("weight", "");
    let err = workflow.complete_personal_info().unwrap_err();
    assert_eq!(err.to_string(), "Please fill out weight, height.");

    workflow.update_field("weight", 70);
    workflow.update_field("height", 175);
    let err = workflow.complete_personal_info().unwrap_err();
    assert!(err.to_string().contains("donate"));
    assert!(!workflow.draft().completed);
}

#[tokio::test]
async fn editing_after_completion_reopens_personal_info() {
    let (session, _clock) = manual_context();
    let client = Arc::new(ScriptedClient::new());
    let workflow = ScreeningWorkflow::new(client.clone(), session);
    fill_personal_info(&workflow);

    assert!(!workflow.update_field("age", "").completed);

    let err = workflow.submit(sample_images(1)).await.unwrap_err();
    assert_eq!(err.redirect_target(), Some(Step::PersonalInfo));
    assert!(client.calls().is_empty());

    workflow.update_field("age", 31);
    assert!(workflow.enter_fingerprint_step().is_err());
    assert_eq!(workflow.complete_personal_info().unwrap(), Step::Fingerprint);
    assert!(workflow.enter_fingerprint_step().is_ok());
}

#[tokio::test]
async fn completed_flag_without_required_answers_still_redirects() {
    let (session, _clock) = manual_context();
    let mut draft = completed_draft();
    draft.participant.set("height", "");
    session.drafts().save(&mut draft);
    let workflow = ScreeningWorkflow::new(Arc::new(ScriptedClient::new()), session);

    assert_eq!(
        workflow.enter_fingerprint_step().unwrap_err().redirect_target(),
        Some(Step::PersonalInfo)
    );
}

#[tokio::test]
async fn duplicate_submit_is_rejected_while_one_is_outstanding() {
    let (session, _clock) = manual_context();
    let gate = Arc::new(Notify::new());
    let client = Arc::new(ScriptedClient::new().gated(gate.clone()));
    let workflow = Arc::new(ScreeningWorkflow::new(client, session));
    fill_personal_info(&workflow);

    let first = tokio::spawn({
        let workflow = workflow.clone();
        async move { workflow.submit(sample_images(1)).await }
    });
    while !workflow.is_submitting() {
        tokio::task::yield_now().await;
    }

    let second = workflow.submit(sample_images(1)).await.unwrap_err();
    assert!(matches!(second, ScreeningError::SubmissionInFlight));

    gate.notify_one();
    first.await.unwrap().unwrap();

    // The flag is released; the next attempt fails on the cleared draft instead.
    let third = workflow.submit(sample_images(1)).await.unwrap_err();
    assert_eq!(third.redirect_target(), Some(Step::PersonalInfo));
}

#[tokio::test]
async fn end_session_forgets_results_and_consent() {
    let (session, _clock) = manual_context();
    let workflow = ScreeningWorkflow::new(Arc::new(ScriptedClient::new()), session);
    workflow.give_consent(true).await.unwrap();
    fill_personal_info(&workflow);
    let mut target = workflow.submit(sample_images(1)).await.unwrap();

    assert_eq!(workflow.end_session().unwrap(), Step::Consent);

    assert_eq!(workflow.consent(), None);
    assert_eq!(workflow.open_results(&mut target), ResultsView::NoResults);
}

#[tokio::test]
async fn prediction_failure_after_submit_publishes_nothing() {
    let (session, _clock) = manual_context();
    session.drafts().save(&mut completed_draft());

    let mut client = MockClient::new();
    client
        .expect_submit_participant()
        .withf(|submission: &Submission| !submission.consent && submission.willing_to_donate)
        .times(1)
        .returning(|submission| Ok(receipt_for(&submission.images, None)));
    client
        .expect_predict_diabetes_risk()
        .times(1)
        .returning(|_| Ok(sample_diabetes_result()));
    client
        .expect_predict_blood_group()
        .times(1)
        .returning(|_| {
            Err(ClientError::MalformedBody {
                endpoint: "identify-blood-group-from-json/".into(),
                message: "expected value".into(),
            })
        });

    let workflow = ScreeningWorkflow::new(Arc::new(client), session);
    let err = workflow.submit(sample_images(2)).await.unwrap_err();

    assert!(!err.is_retryable());
    assert!(workflow.draft().completed);
    assert!(workflow.session().handoff().resolve_token(None).is_none());
}

#[tokio::test]
async fn consent_failure_leaves_consent_unset() {
    let (session, _clock) = manual_context();
    let mut client = MockClient::new();
    client.expect_submit_consent().returning(|_| {
        Err(ClientError::Timeout {
            endpoint: "consent/".into(),
        })
    });

    let workflow = ScreeningWorkflow::new(Arc::new(client), session);
    let err = workflow.give_consent(true).await.unwrap_err();

    assert!(err.is_retryable());
    assert_eq!(workflow.consent(), None);
}

#[tokio::test]
async fn consent_keeps_the_participant_answer_over_the_echo() {
    let (session, _clock) = manual_context();
    let mut client = MockClient::new();
    client
        .expect_submit_consent()
        .withf(|consent| *consent)
        .times(1)
        .returning(|_| Ok(false));

    let workflow = ScreeningWorkflow::new(Arc::new(client), session);
    workflow.give_consent(true).await.unwrap();

    assert_eq!(workflow.consent(), Some(true));
}

#[tokio::test]
async fn pdf_request_sends_the_report() {
    let (session, _clock) = manual_context();
    let mut client = MockClient::new();
    client
        .expect_generate_pdf()
        .withf(|report: &Value| {
            report["analysisResults"]["predictedBloodGroup"] == "O+"
                && report["metadata"]["generatedDate"]
                    .as_str()
                    .is_some_and(|d| d.starts_with("2026-01-01"))
        })
        .times(1)
        .returning(|_| Ok("/media/report.pdf".into()));
    let workflow =
        ScreeningWorkflow::new(Arc::new(client), session).with_public_url("https://clinic.example");

    let bundle = ResultBundle::new(
        sample_diabetes_result(),
        sample_blood_group_result(),
        sample_participant(),
    );
    assert_eq!(
        workflow.request_pdf(&bundle).await.unwrap(),
        "/media/report.pdf"
    );

    let link = workflow.share_link(&bundle).unwrap();
    assert_eq!(link.host_str(), Some("clinic.example"));
    assert!(link
        .query()
        .unwrap()
        .contains("filename=health_results_anonymous_2026-01-01"));
}
