//! warp download route
//!
//! `GET /api/download-data?format=&data=&filename=` answers with the decoded
//! payload as an attachment. Errors come back as `{"message": …}` JSON.

use crate::artifact::{DownloadArtifact, ExportRequest};
use crate::error::ExportError;
use serde_json::json;
use warp::http::{HeaderName, HeaderValue, Method};
use warp::reply::Response;
use warp::{Filter, Rejection, Reply};

/// The download route
///
/// A query string that does not decode is treated like an empty one, so the
/// caller gets the usual "missing parameters" answer rather than a rejection.
pub fn download_route() -> impl Filter<Extract = (Response,), Error = Rejection> + Clone {
    warp::path!("api" / "download-data")
        .and(warp::method())
        .and(
            warp::query::<ExportRequest>()
                .or(warp::any().map(ExportRequest::default))
                .unify(),
        )
        .map(|method: Method, request: ExportRequest| handle_download(&method, &request))
}

/// Answer one download request
#[must_use]
pub fn handle_download(method: &Method, request: &ExportRequest) -> Response {
    if *method != Method::GET {
        return error_response(&ExportError::MethodNotAllowed);
    }

    match DownloadArtifact::from_request(request) {
        Ok(artifact) => {
            tracing::info!(
                format = %artifact.format,
                filename = %artifact.filename,
                bytes = artifact.body.len(),
                "serving download"
            );
            artifact_response(artifact)
        }
        Err(e) => {
            tracing::warn!(error = %e, "download request rejected");
            error_response(&e)
        }
    }
}

fn artifact_response(artifact: DownloadArtifact) -> Response {
    let headers = artifact.headers();
    let mut response = Response::new(artifact.body.into());

    for (name, value) in headers {
        match HeaderValue::from_str(&value) {
            Ok(value) => {
                response
                    .headers_mut()
                    .insert(HeaderName::from_static(name), value);
            }
            Err(e) => tracing::warn!(header = name, error = %e, "dropping invalid header"),
        }
    }
    response
}

/// JSON error body with the status the error maps to
#[must_use]
pub fn error_response(err: &ExportError) -> Response {
    warp::reply::with_status(
        warp::reply::json(&json!({ "message": err.to_string() })),
        err.status(),
    )
    .into_response()
}
