//! HTTP implementation of [`PredictionClient`]

use crate::client::PredictionClient;
use crate::config::ClientConfig;
use crate::error::{ClientError, ClientResult};
use crate::request::{PredictionSubject, Submission, CONSENT_FIELD};
use async_trait::async_trait;
use hemaprint_model::{
    BloodGroupResult, DiabetesResult, FingerprintImage, FingerprintSet, SubmissionReceipt,
};
use reqwest::multipart::{Form, Part};
use reqwest::{RequestBuilder, Url};
use serde::de::DeserializeOwned;
use serde::Deserialize;
use serde_json::Value;

/// Endpoint paths, relative to the service root
pub mod endpoints {
    /// Consent recording
    pub const CONSENT: &str = "consent/";
    /// Participant and fingerprint upload
    pub const SUBMIT: &str = "submit/";
    /// Diabetes risk for a stored participant
    pub const PREDICT_DIABETES: &str = "predict-diabetes/";
    /// Diabetes risk from a submission receipt
    pub const PREDICT_DIABETES_FROM_JSON: &str = "predict-diabetes-from-json/";
    /// Blood group for a stored participant
    pub const BLOOD_GROUP_FROM_PARTICIPANT: &str = "identify-blood-group-from-participant/";
    /// Blood group from a submission receipt and re-attached images
    pub const BLOOD_GROUP_FROM_JSON: &str = "identify-blood-group-from-json/";
    /// PDF report rendering
    pub const GENERATE_PDF: &str = "generate-pdf/";
}

/// Longest error body kept in [`ClientError::Status`]
const MAX_ERROR_BODY: usize = 512;

#[derive(Debug, Deserialize)]
struct ConsentAck {
    consent: bool,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct PdfResponse {
    success: bool,
    download_url: Option<String>,
    error: Option<String>,
}

/// Prediction client over HTTP
#[derive(Debug, Clone)]
pub struct HttpPredictionClient {
    http: reqwest::Client,
    base: Url,
}

impl HttpPredictionClient {
    /// Create a client for the service at `config.base_url`
    ///
    /// # Errors
    /// Returns error if the base URL does not parse or the HTTP client
    /// cannot be built
    pub fn new(config: &ClientConfig) -> ClientResult<Self> {
        let mut base = Url::parse(&config.base_url).map_err(|e| {
            ClientError::InvalidRequest(format!("base url '{}': {e}", config.base_url))
        })?;
        if !base.path().ends_with('/') {
            let path = format!("{}/", base.path());
            base.set_path(&path);
        }

        let http = reqwest::Client::builder()
            .timeout(config.timeout())
            .build()
            .map_err(|e| ClientError::InvalidRequest(e.to_string()))?;

        Ok(Self { http, base })
    }

    /// Service root all endpoints are joined onto
    #[inline]
    #[must_use]
    pub fn base_url(&self) -> &Url {
        &self.base
    }

    fn endpoint(&self, path: &str) -> ClientResult<Url> {
        self.base
            .join(path)
            .map_err(|e| ClientError::InvalidRequest(format!("endpoint '{path}': {e}")))
    }

    fn post(&self, path: &str) -> ClientResult<RequestBuilder> {
        Ok(self.http.post(self.endpoint(path)?))
    }

    async fn send<T: DeserializeOwned>(path: &str, request: RequestBuilder) -> ClientResult<T> {
        tracing::debug!(endpoint = path, "calling prediction service");

        let response = request
            .send()
            .await
            .map_err(|e| ClientError::from_reqwest(path, &e))?;
        let status = response.status();
        let body = response
            .bytes()
            .await
            .map_err(|e| ClientError::from_reqwest(path, &e))?;

        if !status.is_success() {
            tracing::warn!(
                endpoint = path,
                status = status.as_u16(),
                "prediction service returned an error status"
            );
            return Err(ClientError::Status {
                endpoint: path.to_string(),
                status: status.as_u16(),
                body: String::from_utf8_lossy(&body)
                    .chars()
                    .take(MAX_ERROR_BODY)
                    .collect(),
            });
        }

        serde_json::from_slice(&body).map_err(|e| ClientError::MalformedBody {
            endpoint: path.to_string(),
            message: e.to_string(),
        })
    }
}

fn image_part(image: &FingerprintImage, file_name: &str) -> ClientResult<Part> {
    Part::bytes(image.bytes.clone())
        .file_name(file_name.to_string())
        .mime_str(&image.content_type)
        .map_err(|e| {
            ClientError::InvalidRequest(format!(
                "content type '{}' for {}: {e}",
                image.content_type, image.finger
            ))
        })
}

/// Re-attach images under the names the receipt assigned them
fn attach_receipt_images(
    mut form: Form,
    receipt: &SubmissionReceipt,
    images: &FingerprintSet,
) -> ClientResult<Form> {
    for record in &receipt.fingerprints {
        match images.get(record.finger) {
            Some(image) => form = form.part("files", image_part(image, &record.image_name)?),
            None => tracing::warn!(
                finger = %record.finger,
                "receipt lists a fingerprint that was not captured"
            ),
        }
    }
    Ok(form)
}

#[async_trait]
impl PredictionClient for HttpPredictionClient {
    async fn submit_consent(&self, consent: bool) -> ClientResult<bool> {
        let form = Form::new().text(CONSENT_FIELD, consent.to_string());
        let request = self.post(endpoints::CONSENT)?.multipart(form);
        let ack: ConsentAck = Self::send(endpoints::CONSENT, request).await?;
        Ok(ack.consent)
    }

    async fn submit_participant(&self, submission: &Submission) -> ClientResult<SubmissionReceipt> {
        let mut form = Form::new();
        for (name, value) in submission.form_fields() {
            form = form.text(name, value);
        }
        for image in submission.images.iter() {
            form = form.part(image.finger.as_str(), image_part(image, &image.file_name)?);
        }

        let request = self.post(endpoints::SUBMIT)?.multipart(form);
        let receipt: SubmissionReceipt = Self::send(endpoints::SUBMIT, request).await?;

        tracing::info!(
            saved = receipt.saved,
            participant_id = ?receipt.participant_id,
            fingerprints = receipt.fingerprints.len(),
            "participant submitted"
        );
        Ok(receipt)
    }

    async fn predict_blood_group(
        &self,
        subject: &PredictionSubject,
    ) -> ClientResult<BloodGroupResult> {
        let (path, request) = match subject {
            PredictionSubject::Stored {
                participant_id,
                consent,
            } => {
                let form = Form::new().text(CONSENT_FIELD, consent.to_string());
                let request = self
                    .post(endpoints::BLOOD_GROUP_FROM_PARTICIPANT)?
                    .query(&[("participant_id", participant_id.to_string())])
                    .multipart(form);
                (endpoints::BLOOD_GROUP_FROM_PARTICIPANT, request)
            }
            PredictionSubject::Inline { receipt, images } => {
                let json = serde_json::to_string(receipt)
                    .map_err(|e| ClientError::InvalidRequest(e.to_string()))?;
                let form = attach_receipt_images(Form::new().text("json", json), receipt, images)?;
                let request = self.post(endpoints::BLOOD_GROUP_FROM_JSON)?.multipart(form);
                (endpoints::BLOOD_GROUP_FROM_JSON, request)
            }
        };

        let result: BloodGroupResult = Self::send(path, request).await?;
        tracing::info!(
            fingers = result.results.len(),
            group = ?result.headline_group(),
            "blood group predicted"
        );
        Ok(result)
    }

    async fn predict_diabetes_risk(
        &self,
        subject: &PredictionSubject,
    ) -> ClientResult<DiabetesResult> {
        let (path, request) = match subject {
            PredictionSubject::Stored {
                participant_id,
                consent,
            } => {
                let form = Form::new()
                    .text("participant_id", participant_id.to_string())
                    .text(CONSENT_FIELD, consent.to_string());
                let request = self.post(endpoints::PREDICT_DIABETES)?.multipart(form);
                (endpoints::PREDICT_DIABETES, request)
            }
            PredictionSubject::Inline { receipt, .. } => {
                let request = self.post(endpoints::PREDICT_DIABETES_FROM_JSON)?.json(receipt);
                (endpoints::PREDICT_DIABETES_FROM_JSON, request)
            }
        };

        let result: DiabetesResult = Self::send(path, request).await?;
        tracing::info!(risk = %result.diabetes_risk, saved = result.saved, "diabetes risk predicted");
        Ok(result)
    }

    async fn generate_pdf(&self, report: &Value) -> ClientResult<String> {
        let request = self.post(endpoints::GENERATE_PDF)?.json(report);
        let response: PdfResponse = Self::send(endpoints::GENERATE_PDF, request).await?;

        match response.download_url {
            Some(url) if response.success => Ok(url),
            _ => Err(ClientError::Rejected {
                endpoint: endpoints::GENERATE_PDF.to_string(),
                message: response
                    .error
                    .unwrap_or_else(|| "no download url in response".to_string()),
            }),
        }
    }
}
