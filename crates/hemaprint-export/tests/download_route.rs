//! Download route behavior over warp's test harness

use base64::engine::general_purpose::STANDARD;
use base64::Engine as _;
use chrono::{TimeZone, Utc};
use hemaprint_export::prelude::*;
use hemaprint_model::{DiabetesResult, ParticipantFields, ResultBundle};
use pretty_assertions::assert_eq;
use serde_json::Value;

fn header<'a, B>(res: &'a warp::http::Response<B>, name: &str) -> &'a str {
    res.headers()
        .get(name)
        .and_then(|v| v.to_str().ok())
        .unwrap_or_default()
}

fn message(body: &[u8]) -> String {
    let json: Value = serde_json::from_slice(body).unwrap();
    json["message"].as_str().unwrap().to_string()
}

#[tokio::test]
async fn serves_csv_attachment_with_extension() {
    let data = STANDARD.encode("section,field,value\n");
    let res = warp::test::request()
        .method("GET")
        .path(&format!(
            "/api/download-data?format=csv&data={data}&filename=results"
        ))
        .reply(&download_route())
        .await;

    assert_eq!(res.status(), 200);
    assert_eq!(header(&res, "content-type"), "text/csv");
    assert_eq!(
        header(&res, "content-disposition"),
        "attachment; filename=\"results.csv\""
    );
    assert_eq!(
        header(&res, "cache-control"),
        "no-cache, no-store, must-revalidate"
    );
    assert_eq!(header(&res, "access-control-allow-origin"), "*");
    assert_eq!(&res.body()[..], b"section,field,value\n");
}

#[tokio::test]
async fn unknown_format_downloads_as_text() {
    let data = STANDARD.encode("hello");
    let res = warp::test::request()
        .path(&format!(
            "/api/download-data?format=docx&data={data}&filename=note"
        ))
        .reply(&download_route())
        .await;

    assert_eq!(res.status(), 200);
    assert_eq!(header(&res, "content-type"), "text/plain");
    assert_eq!(
        header(&res, "content-disposition"),
        "attachment; filename=\"note.txt\""
    );
}

#[tokio::test]
async fn missing_parameters_is_bad_request() {
    for path in [
        "/api/download-data",
        "/api/download-data?format=json&filename=x",
        "/api/download-data?format=json&data=&filename=x",
    ] {
        let res = warp::test::request()
            .path(path)
            .reply(&download_route())
            .await;

        assert_eq!(res.status(), 400, "{path}");
        assert_eq!(message(res.body()), "Missing required parameters");
    }
}

#[tokio::test]
async fn undecodable_payload_is_bad_request() {
    let res = warp::test::request()
        .path("/api/download-data?format=json&data=***&filename=x")
        .reply(&download_route())
        .await;

    assert_eq!(res.status(), 400);
    assert!(message(res.body()).starts_with("Invalid data payload"));
}

#[tokio::test]
async fn non_get_is_method_not_allowed() {
    let res = warp::test::request()
        .method("POST")
        .path("/api/download-data?format=json&data=e30=&filename=x")
        .reply(&download_route())
        .await;

    assert_eq!(res.status(), 405);
}

#[tokio::test]
async fn share_link_resolves_to_the_report() {
    let bundle = ResultBundle::new(
        DiabetesResult {
            diabetes_risk: "healthy".into(),
            participant_id: Some(5),
            ..DiabetesResult::default()
        },
        Default::default(),
        ParticipantFields::new().with("age", 30),
    );
    let generated = Utc.with_ymd_and_hms(2026, 1, 2, 3, 4, 5).unwrap();
    let report = ResultReport::from_bundle(&bundle, generated);
    let link = share_link("https://clinic.example", &report).unwrap();

    let path_and_query = format!("{}?{}", link.path(), link.query().unwrap());
    let res = warp::test::request()
        .path(&path_and_query)
        .reply(&download_route())
        .await;

    assert_eq!(res.status(), 200);
    assert_eq!(header(&res, "content-type"), "application/json");
    assert_eq!(
        header(&res, "content-disposition"),
        "attachment; filename=\"health_results_5_2026-01-02.json\""
    );
    let served: ResultReport = serde_json::from_slice(res.body()).unwrap();
    assert_eq!(served, report);
}
