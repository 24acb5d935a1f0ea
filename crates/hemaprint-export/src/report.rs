//! Downloadable result summary
//!
//! A [`ResultReport`] is the flattened view of a [`ResultBundle`] that a
//! participant takes home: what they entered, what the models said, and
//! enough metadata to find the stored record again. It renders to JSON, CSV
//! or plain text locally; PDF rendering belongs to the prediction service.

use crate::error::{ExportError, ExportResult};
use crate::format::ExportFormat;
use base64::engine::general_purpose::STANDARD;
use base64::Engine as _;
use chrono::{DateTime, Utc};
use hemaprint_model::{FieldValue, ResultBundle};
use serde::{Deserialize, Serialize};
use std::fmt::Write as _;
use url::Url;

/// Path of the download route, relative to the site origin
pub const DOWNLOAD_PATH: &str = "/api/download-data";

const NOT_AVAILABLE: &str = "N/A";
const UNKNOWN_GROUP: &str = "Unknown";

/// Participant answers, falling back to what the model reported seeing
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ParticipantInfo {
    /// Age
    #[serde(skip_serializing_if = "Option::is_none")]
    pub age: Option<FieldValue>,
    /// Gender
    #[serde(skip_serializing_if = "Option::is_none")]
    pub gender: Option<FieldValue>,
    /// Height
    #[serde(skip_serializing_if = "Option::is_none")]
    pub height: Option<FieldValue>,
    /// Weight
    #[serde(skip_serializing_if = "Option::is_none")]
    pub weight: Option<FieldValue>,
    /// Self-reported blood type
    #[serde(skip_serializing_if = "Option::is_none")]
    pub blood_type: Option<FieldValue>,
    /// Donation answer
    #[serde(skip_serializing_if = "Option::is_none")]
    pub willing_to_donate: Option<bool>,
}

/// Model outputs formatted for reading
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AnalysisResults {
    /// Risk label
    pub diabetes_risk: String,
    /// Confidence as `"82.0%"` or `"N/A"`
    pub diabetes_confidence: String,
    /// Most confident finger's group, or `"Unknown"`
    pub predicted_blood_group: String,
    /// Confidence of that finger as `"91.5%"` or `"N/A"`
    pub blood_group_confidence: String,
}

/// Where the report came from
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReportMetadata {
    /// Backend participant id, when stored
    pub participant_id: Option<u64>,
    /// Backend result id, when stored
    pub result_id: Option<u64>,
    /// When the report was generated
    pub generated_date: DateTime<Utc>,
    /// Whether the backend stored the result
    pub saved: bool,
}

/// Downloadable summary of one result bundle
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ResultReport {
    /// Participant answers
    pub participant_info: ParticipantInfo,
    /// Model outputs
    pub analysis_results: AnalysisResults,
    /// Provenance
    pub metadata: ReportMetadata,
}

fn percent(confidence: Option<f64>) -> String {
    match confidence {
        Some(c) if c > 0.0 => format!("{:.1}%", c * 100.0),
        _ => NOT_AVAILABLE.to_string(),
    }
}

fn participant_value(bundle: &ResultBundle, key: &str) -> Option<FieldValue> {
    let answered = bundle
        .participant_data
        .get(key)
        .filter(|v| !v.is_blank())
        .cloned();

    answered.or_else(|| {
        bundle
            .diabetes_result
            .prediction_details
            .as_ref()
            .and_then(|details| details.get(key))
            .and_then(|v| serde_json::from_value::<FieldValue>(v.clone()).ok())
            .filter(|v| !v.is_blank())
    })
}

fn csv_field(value: &str) -> String {
    if value.contains([',', '"', '\n', '\r']) {
        format!("\"{}\"", value.replace('"', "\"\""))
    } else {
        value.to_string()
    }
}

impl ResultReport {
    /// Summarize a bundle as of `generated`
    #[must_use]
    pub fn from_bundle(bundle: &ResultBundle, generated: DateTime<Utc>) -> Self {
        let diabetes = &bundle.diabetes_result;
        let best = bundle.blood_group_result.best_prediction();

        Self {
            participant_info: ParticipantInfo {
                age: participant_value(bundle, "age"),
                gender: participant_value(bundle, "gender"),
                height: participant_value(bundle, "height"),
                weight: participant_value(bundle, "weight"),
                blood_type: participant_value(bundle, "blood_type"),
                willing_to_donate: bundle
                    .participant_data
                    .get("willing_to_donate")
                    .and_then(FieldValue::as_bool),
            },
            analysis_results: AnalysisResults {
                diabetes_risk: diabetes.diabetes_risk.clone(),
                diabetes_confidence: percent(diabetes.confidence),
                predicted_blood_group: best.map_or_else(
                    || UNKNOWN_GROUP.to_string(),
                    |p| p.predicted_blood_group.clone(),
                ),
                blood_group_confidence: percent(best.map(|p| p.confidence)),
            },
            metadata: ReportMetadata {
                participant_id: bundle.participant_id(),
                result_id: diabetes.result_id,
                generated_date: generated,
                saved: diabetes.saved,
            },
        }
    }

    /// File name without extension: `health_results_<id|anonymous>_<date>`
    #[must_use]
    pub fn file_stem(&self) -> String {
        let owner = self
            .metadata
            .participant_id
            .map_or_else(|| "anonymous".to_string(), |id| id.to_string());
        format!(
            "health_results_{owner}_{}",
            self.metadata.generated_date.format("%Y-%m-%d")
        )
    }

    /// `(section, field, value)` rows in display order
    #[must_use]
    pub fn rows(&self) -> Vec<(&'static str, &'static str, String)> {
        let info = &self.participant_info;
        let opt = |v: &Option<FieldValue>| v.as_ref().map(ToString::to_string).unwrap_or_default();
        let analysis = &self.analysis_results;
        let meta = &self.metadata;
        let id = |v: Option<u64>| v.map(|id| id.to_string()).unwrap_or_default();

        vec![
            ("participant", "age", opt(&info.age)),
            ("participant", "gender", opt(&info.gender)),
            ("participant", "height", opt(&info.height)),
            ("participant", "weight", opt(&info.weight)),
            ("participant", "bloodType", opt(&info.blood_type)),
            (
                "participant",
                "willingToDonate",
                info.willing_to_donate
                    .map(|b| b.to_string())
                    .unwrap_or_default(),
            ),
            ("analysis", "diabetesRisk", analysis.diabetes_risk.clone()),
            (
                "analysis",
                "diabetesConfidence",
                analysis.diabetes_confidence.clone(),
            ),
            (
                "analysis",
                "predictedBloodGroup",
                analysis.predicted_blood_group.clone(),
            ),
            (
                "analysis",
                "bloodGroupConfidence",
                analysis.blood_group_confidence.clone(),
            ),
            ("metadata", "participantId", id(meta.participant_id)),
            ("metadata", "resultId", id(meta.result_id)),
            ("metadata", "generatedDate", meta.generated_date.to_rfc3339()),
            ("metadata", "saved", meta.saved.to_string()),
        ]
    }

    /// Pretty-printed JSON
    ///
    /// # Errors
    /// Returns error if serialization fails
    pub fn to_json(&self) -> ExportResult<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// CSV with a `section,field,value` header
    #[must_use]
    pub fn to_csv(&self) -> String {
        let mut out = String::from("section,field,value\n");
        for (section, field, value) in self.rows() {
            let _ = writeln!(out, "{section},{field},{}", csv_field(&value));
        }
        out
    }

    /// Human-readable text
    #[must_use]
    pub fn to_text(&self) -> String {
        let mut out = String::from("Health Screening Results\n");
        let mut current = "";
        for (section, field, value) in self.rows() {
            if section != current {
                let _ = write!(out, "\n[{section}]\n");
                current = section;
            }
            let value = if value.is_empty() { "-" } else { value.as_str() };
            let _ = writeln!(out, "{field}: {value}");
        }
        out
    }

    /// Render the report body for `format`
    ///
    /// # Errors
    /// - `Unsupported` for PDF, which the prediction service renders
    /// - `Render` if JSON serialization fails
    pub fn render(&self, format: ExportFormat) -> ExportResult<Vec<u8>> {
        match format {
            ExportFormat::Json => Ok(self.to_json()?.into_bytes()),
            ExportFormat::Csv => Ok(self.to_csv().into_bytes()),
            ExportFormat::Text => Ok(self.to_text().into_bytes()),
            ExportFormat::Pdf => Err(ExportError::Unsupported(format)),
        }
    }
}

/// Download URL for a report, as encoded in the results page QR code
///
/// The report travels inline as base64 JSON, so the link works without any
/// server-side state.
///
/// # Errors
/// Returns error if `base_url` does not parse or the report fails to serialize
pub fn share_link(base_url: &str, report: &ResultReport) -> ExportResult<Url> {
    let mut url = Url::parse(base_url).map_err(|source| ExportError::InvalidBaseUrl {
        url: base_url.to_string(),
        source,
    })?;
    let data = STANDARD.encode(report.to_json()?);

    url.set_path(DOWNLOAD_PATH);
    url.set_query(None);
    url.query_pairs_mut()
        .append_pair("format", "json")
        .append_pair("data", &data)
        .append_pair("filename", &report.file_stem());
    Ok(url)
}
