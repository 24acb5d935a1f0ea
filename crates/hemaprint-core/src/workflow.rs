//! The screening workflow
//!
//! Drives one participant through consent, personal information,
//! fingerprint capture and results. Page-level state lives in the
//! [`SessionContext`]; the only in-process state is the consent answer and
//! the in-flight submission flag.
//!
//! ```text
//! give_consent ─→ update_field* ─→ complete_personal_info ─→ submit ─→ open_results
//!                      │                    │                   │
//!                      └── draft saved ─────┘                   ├─ draft cleared
//!                          on every edit                        └─ bundle published
//! ```

use crate::config::DEFAULT_PUBLIC_URL;
use crate::error::{ScreeningError, ScreeningResult};
use crate::step::Step;
use chrono::{DateTime, Utc};
use hemaprint_client::{PredictionClient, PredictionSubject, Submission};
use hemaprint_export::{share_link, ExportError, ResultReport};
use hemaprint_model::{FieldValue, FingerprintSet, ResultBundle};
use hemaprint_session::{FormDraft, NavigationTarget, SessionContext};
use parking_lot::RwLock;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use url::Url;

/// What the results page shows
#[derive(Debug, Clone, PartialEq)]
pub enum ResultsView {
    /// A resolved bundle
    Ready(ResultBundle),
    /// Nothing to show; the user should start over
    NoResults,
}

impl ResultsView {
    /// The bundle, if any
    #[must_use]
    pub fn bundle(&self) -> Option<&ResultBundle> {
        match self {
            Self::Ready(bundle) => Some(bundle),
            Self::NoResults => None,
        }
    }
}

/// Clears the in-flight flag when the submission ends, however it ends
struct InFlight<'a>(&'a AtomicBool);

impl<'a> InFlight<'a> {
    fn acquire(flag: &'a AtomicBool) -> Option<Self> {
        flag.compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .ok()
            .map(|_| Self(flag))
    }
}

impl Drop for InFlight<'_> {
    fn drop(&mut self) {
        self.0.store(false, Ordering::Release);
    }
}

/// One participant's pass through the screening flow
#[derive(Debug)]
pub struct ScreeningWorkflow<C> {
    client: Arc<C>,
    session: SessionContext,
    consent: RwLock<Option<bool>>,
    submitting: AtomicBool,
    public_url: String,
}

impl<C: PredictionClient> ScreeningWorkflow<C> {
    /// Create a workflow over a session context
    #[must_use]
    pub fn new(client: Arc<C>, session: SessionContext) -> Self {
        Self {
            client,
            session,
            consent: RwLock::new(None),
            submitting: AtomicBool::new(false),
            public_url: DEFAULT_PUBLIC_URL.to_string(),
        }
    }

    /// With the origin share links point at
    #[inline]
    #[must_use]
    pub fn with_public_url(mut self, public_url: impl Into<String>) -> Self {
        self.public_url = public_url.into();
        self
    }

    /// Origin share links point at
    #[inline]
    #[must_use]
    pub fn public_url(&self) -> &str {
        &self.public_url
    }

    /// Session context the workflow writes to
    #[inline]
    #[must_use]
    pub fn session(&self) -> &SessionContext {
        &self.session
    }

    /// Consent answer, if given
    #[inline]
    #[must_use]
    pub fn consent(&self) -> Option<bool> {
        *self.consent.read()
    }

    /// Whether a submission is outstanding
    #[inline]
    #[must_use]
    pub fn is_submitting(&self) -> bool {
        self.submitting.load(Ordering::Acquire)
    }

    /// Record the consent answer with the service and move on
    ///
    /// The participant's own answer is kept once the service accepts it.
    ///
    /// # Errors
    /// Returns `Prediction` if the service call fails; consent stays unset
    pub async fn give_consent(&self, consent: bool) -> ScreeningResult<Step> {
        let echoed = self.client.submit_consent(consent).await?;
        if echoed != consent {
            tracing::warn!(consent, echoed, "service echoed a different consent answer");
        }
        *self.consent.write() = Some(consent);
        tracing::info!(consent, "consent recorded");
        Ok(Step::PersonalInfo)
    }

    /// Current draft, or an empty one for a first-time visitor
    #[must_use]
    pub fn draft(&self) -> FormDraft {
        self.session.drafts().load().unwrap_or_default()
    }

    /// Set one questionnaire answer and save the draft
    pub fn update_field(&self, name: &str, value: impl Into<FieldValue>) -> FormDraft {
        self.edit_draft(|draft| draft.participant.set(name, value))
    }

    /// Set the donation answer and save the draft
    pub fn set_willing_to_donate(&self, willing: bool) -> FormDraft {
        self.edit_draft(|draft| draft.willing_to_donate = Some(willing))
    }

    /// Throw the draft away
    pub fn reset_form(&self) {
        self.session.drafts().clear();
        tracing::info!("form reset");
    }

    /// Finish the personal-information step
    ///
    /// # Errors
    /// Returns `Validation` if a required answer or the donation answer is
    /// missing; the draft is left as it was
    pub fn complete_personal_info(&self) -> ScreeningResult<Step> {
        let mut draft = self.draft();

        let missing = draft.participant.missing_required();
        if !missing.is_empty() {
            return Err(ScreeningError::Validation(format!(
                "Please fill out {}.",
                missing.join(", ")
            )));
        }
        if draft.willing_to_donate.is_none() {
            return Err(ScreeningError::Validation(
                "Please indicate if you are willing to donate blood.".into(),
            ));
        }

        draft.completed = true;
        self.session.drafts().save(&mut draft);
        tracing::info!("personal information completed");
        Ok(Step::Fingerprint)
    }

    /// Enter the fingerprint step, returning the completed draft
    ///
    /// # Errors
    /// Returns `Redirect` to personal information unless the draft is
    /// completed and still carries every required answer
    pub fn enter_fingerprint_step(&self) -> ScreeningResult<FormDraft> {
        match self.session.drafts().load() {
            Some(draft)
                if draft.completed
                    && draft.participant.missing_required().is_empty()
                    && draft.willing_to_donate.is_some() =>
            {
                Ok(draft)
            }
            _ => {
                tracing::info!("no completed draft, redirecting to personal information");
                Err(ScreeningError::Redirect {
                    to: Step::PersonalInfo,
                })
            }
        }
    }

    /// Submit answers and fingerprints, predict, and publish the results
    ///
    /// At most one submission runs at a time. Nothing local changes unless
    /// every remote call succeeds; on success the draft is cleared and the
    /// returned target points at the published bundle.
    ///
    /// # Errors
    /// - `SubmissionInFlight` if another submission is outstanding
    /// - `Redirect` without a completed draft
    /// - `Validation` without any fingerprint
    /// - `Prediction` if a service call fails
    /// - `Session` if the bundle cannot be published
    pub async fn submit(&self, images: FingerprintSet) -> ScreeningResult<NavigationTarget> {
        let Some(_in_flight) = InFlight::acquire(&self.submitting) else {
            tracing::debug!("ignoring duplicate submission");
            return Err(ScreeningError::SubmissionInFlight);
        };

        let draft = self.enter_fingerprint_step()?;
        if images.is_empty() {
            return Err(ScreeningError::Validation(
                "Please scan at least one fingerprint.".into(),
            ));
        }

        let consent = self.consent().unwrap_or(false);
        let submission = Submission::new(draft.participant.clone(), images, consent)
            .with_willing_to_donate(draft.willing_to_donate.unwrap_or(false));

        tracing::info!(
            fingerprints = submission.images.len(),
            consent,
            "submitting participant"
        );
        let bundle = match self.predict(&submission, &draft).await {
            Ok(bundle) => bundle,
            Err(e) => {
                tracing::warn!(error = %e, retryable = e.is_retryable(), "submission failed");
                return Err(e);
            }
        };

        let handoff = self.session.handoff();
        let token = handoff.publish(&bundle)?;
        self.session.drafts().clear();

        tracing::info!(token = %token, "submission complete");
        Ok(handoff.results_target(&token))
    }

    /// Resolve the results page address into what to show
    ///
    /// The token is stripped from `target` either way.
    pub fn open_results(&self, target: &mut NavigationTarget) -> ResultsView {
        match self.session.handoff().resolve(target) {
            Some(bundle) => ResultsView::Ready(bundle),
            None => ResultsView::NoResults,
        }
    }

    /// Summary report of `bundle`, stamped with the session clock
    #[must_use]
    pub fn report(&self, bundle: &ResultBundle) -> ResultReport {
        ResultReport::from_bundle(bundle, self.now())
    }

    /// Download link on the public origin carrying the report inline, for
    /// the QR code
    ///
    /// # Errors
    /// Returns `Export` if the public origin does not parse
    pub fn share_link(&self, bundle: &ResultBundle) -> ScreeningResult<Url> {
        Ok(share_link(&self.public_url, &self.report(bundle))?)
    }

    /// Ask the service to render a PDF of `bundle`; returns its URL
    ///
    /// # Errors
    /// Returns `Prediction` if the service fails or declines
    pub async fn request_pdf(&self, bundle: &ResultBundle) -> ScreeningResult<String> {
        let report = serde_json::to_value(self.report(bundle)).map_err(ExportError::from)?;
        Ok(self.client.generate_pdf(&report).await?)
    }

    /// Forget results, draft and consent; the flow restarts at consent
    ///
    /// # Errors
    /// Returns `Session` if stored entries cannot be removed
    pub fn end_session(&self) -> ScreeningResult<Step> {
        self.session.end_session()?;
        *self.consent.write() = None;
        tracing::info!("session ended");
        Ok(Step::Consent)
    }

    async fn predict(
        &self,
        submission: &Submission,
        draft: &FormDraft,
    ) -> ScreeningResult<ResultBundle> {
        let receipt = self.client.submit_participant(submission).await?;
        let subject = PredictionSubject::for_receipt(&receipt, submission);

        let diabetes = self.client.predict_diabetes_risk(&subject).await?;
        let blood_group = self.client.predict_blood_group(&subject).await?;

        Ok(ResultBundle::new(diabetes, blood_group, draft.snapshot()))
    }

    /// Any edit reopens the personal-information step
    fn edit_draft(&self, edit: impl FnOnce(&mut FormDraft)) -> FormDraft {
        let drafts = self.session.drafts();
        let mut draft = drafts.load().unwrap_or_default();
        edit(&mut draft);
        draft.completed = false;
        drafts.save(&mut draft);
        draft
    }

    fn now(&self) -> DateTime<Utc> {
        DateTime::from_timestamp_millis(self.session.store().now_millis()).unwrap_or_else(Utc::now)
    }
}
