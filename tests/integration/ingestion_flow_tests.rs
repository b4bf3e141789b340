//! End-to-end frame ingestion over HTTP.
//!
//! Covers the inactive-session rejection, test-mode cycling, multipart and
//! data-URL uploads, and every degraded path that must keep the session
//! alive.

use std::sync::Arc;

use serde_json::{json, Value};
use vision_relay::inference::responses::CANNED_RESPONSES;
use vision_relay::inference::VisionModel;

use super::test_helpers::{
    data_url_body, png_frame, spawn_default_server, spawn_server, test_app_state, test_config,
    FailingModel, FixedModel, PanickingModel, TestServer,
};

async fn upload(server: &TestServer, body: &Value) -> Value {
    let resp = server.post_json("/api/upload/", body).await;
    assert_eq!(resp.status(), 200);
    resp.json().await.expect("json body")
}

async fn start(server: &TestServer, test_mode: bool) {
    let resp = server
        .post_json("/api/start/", &json!({ "test_mode": test_mode }))
        .await;
    assert_eq!(resp.status(), 200);
}

#[tokio::test]
async fn upload_without_session_is_rejected_and_counts_nothing() {
    let server = spawn_default_server().await;

    let body = upload(&server, &data_url_body(&png_frame())).await;
    assert_eq!(body["status"], "error");
    assert_eq!(
        body["message"],
        "No active session. Please start session first."
    );

    let status = server.get_json("/api/status/").await;
    assert_eq!(status["processed_count"], 0);
    assert_eq!(status["frame_number"], 0);
    let latest = server.get_json("/api/latest/").await;
    assert_eq!(latest["latest_result"], "No results yet");
}

#[tokio::test]
async fn test_mode_session_cycles_canned_answers() {
    let server = spawn_default_server().await;
    start(&server, true).await;

    let mut results = Vec::new();
    for expected_count in 1..=3_u64 {
        let body = upload(&server, &data_url_body(&png_frame())).await;
        assert_eq!(body["status"], "success");
        assert_eq!(body["processed_count"], expected_count);
        assert_eq!(body["frame_number"], expected_count);
        results.push(body["result"].as_str().expect("result").to_owned());
    }

    assert_eq!(results, CANNED_RESPONSES[..3].to_vec());

    let end: Value = server
        .post_empty("/api/end/")
        .await
        .json()
        .await
        .expect("json body");
    assert_eq!(end["status"], "success");
    assert_eq!(end["processed_count"], 3);
    assert_eq!(end["total_frames"], 3);
}

#[tokio::test]
async fn data_url_upload_reaches_model() {
    let model = FixedModel::new("Q: 9\nA: C");
    let dyn_model: Arc<dyn VisionModel> = model.clone();
    let server = spawn_server(test_app_state(test_config(), Some(dyn_model))).await;
    start(&server, false).await;

    let body = upload(&server, &data_url_body(&png_frame())).await;
    assert_eq!(body["status"], "success");
    assert_eq!(body["result"], "Q: 9\nA: C");
    assert_eq!(model.calls(), 1);

    let latest = server.get_json("/api/latest/").await;
    assert_eq!(latest["latest_result"], "Q: 9\nA: C");
    assert_eq!(latest["processed_count"], 1);
    assert!(latest["last_update"].is_string());
}

#[tokio::test]
async fn multipart_upload_reaches_model() {
    let model = FixedModel::new("Q: Capital of Peru\nA: Lima");
    let dyn_model: Arc<dyn VisionModel> = model.clone();
    let server = spawn_server(test_app_state(test_config(), Some(dyn_model))).await;
    start(&server, false).await;

    let part = reqwest::multipart::Part::bytes(png_frame())
        .file_name("frame.png")
        .mime_str("image/png")
        .expect("mime");
    let form = reqwest::multipart::Form::new()
        .text("note", "ignored field")
        .part("image", part);
    let body: Value = server
        .client
        .post(server.url("/api/upload/"))
        .multipart(form)
        .send()
        .await
        .expect("POST multipart")
        .json()
        .await
        .expect("json body");

    assert_eq!(body["status"], "success");
    assert_eq!(body["result"], "Q: Capital of Peru\nA: Lima");
    assert_eq!(model.calls(), 1);
}

#[tokio::test]
async fn multipart_without_image_field_degrades() {
    let server = spawn_default_server().await;
    start(&server, false).await;

    let form = reqwest::multipart::Form::new().text("other", "value");
    let body: Value = server
        .client
        .post(server.url("/api/upload/"))
        .multipart(form)
        .send()
        .await
        .expect("POST multipart")
        .json()
        .await
        .expect("json body");

    assert_eq!(body["status"], "success");
    assert_eq!(body["result"], "Q: Frame 1\nA: Image capture issue - please retry");
    assert_eq!(body["processed_count"], 1);
}

#[tokio::test]
async fn malformed_base64_degrades_and_counts_once() {
    let server = spawn_default_server().await;
    start(&server, false).await;

    let body = upload(&server, &json!({ "image": "data:image/jpeg;base64,%%%%" })).await;
    assert_eq!(body["status"], "success");
    assert_eq!(body["result"], "Q: Frame 1\nA: Image capture issue - please retry");
    assert_eq!(body["processed_count"], 1);
    assert_eq!(body["frame_number"], 1);
}

#[tokio::test]
async fn malformed_input_in_test_mode_gets_canned_answer() {
    let server = spawn_default_server().await;
    start(&server, true).await;

    let resp = server
        .client
        .post(server.url("/api/upload/"))
        .body("garbage")
        .send()
        .await
        .expect("POST");
    assert_eq!(resp.status(), 200);
    let body: Value = resp.json().await.expect("json body");
    assert_eq!(body["status"], "success");
    assert_eq!(body["result"], CANNED_RESPONSES[0]);
}

#[tokio::test]
async fn missing_credential_is_recorded_as_result() {
    let server = spawn_default_server().await;
    start(&server, false).await;

    let body = upload(&server, &data_url_body(&png_frame())).await;
    assert_eq!(body["status"], "success");
    assert_eq!(body["result"], "Error: Gemini API not configured");
    assert_eq!(body["processed_count"], 1);
}

#[tokio::test]
async fn upstream_failure_degrades_to_processing_error() {
    let model: Arc<dyn VisionModel> = Arc::new(FailingModel);
    let server = spawn_server(test_app_state(test_config(), Some(model))).await;
    start(&server, false).await;

    let body = upload(&server, &data_url_body(&png_frame())).await;
    assert_eq!(body["status"], "success");
    assert_eq!(
        body["result"],
        "Q: Frame 1\nA: Processing error: inference: upstream unavailable"
    );

    let second = upload(&server, &data_url_body(&png_frame())).await;
    assert_eq!(second["processed_count"], 2);
    assert!(second["result"]
        .as_str()
        .expect("result")
        .starts_with("Q: Frame 2\n"));
}

#[tokio::test]
async fn panic_during_ingestion_keeps_session_alive() {
    let model: Arc<dyn VisionModel> = Arc::new(PanickingModel);
    let server = spawn_server(test_app_state(test_config(), Some(model))).await;
    start(&server, false).await;

    let body = upload(&server, &data_url_body(&png_frame())).await;
    assert_eq!(body["status"], "success");
    assert_eq!(body["result"], "Q: Frame 1\nA: System error (session continues)");
    assert_eq!(body["processed_count"], 1);

    let status = server.get_json("/api/status/").await;
    assert_eq!(status["active"], true);

    let again = upload(&server, &data_url_body(&png_frame())).await;
    assert_eq!(again["processed_count"], 2);
}

#[tokio::test]
async fn oversized_body_degrades_instead_of_failing() {
    let mut config = test_config();
    config.max_upload_bytes = 1024;
    let server = spawn_server(test_app_state(config, None)).await;
    start(&server, false).await;

    let big = vec![0_u8; 4096];
    let body = upload(&server, &data_url_body(&big)).await;
    assert_eq!(body["status"], "success");
    assert_eq!(body["result"], "Q: Frame 1\nA: Image capture issue - please retry");
}

#[tokio::test]
async fn upload_after_end_is_rejected() {
    let server = spawn_default_server().await;
    start(&server, true).await;
    upload(&server, &data_url_body(&png_frame())).await;
    server.post_empty("/api/end/").await;

    let body = upload(&server, &data_url_body(&png_frame())).await;
    assert_eq!(body["status"], "error");

    let status = server.get_json("/api/status/").await;
    assert_eq!(status["processed_count"], 1);
}

#[tokio::test]
async fn concurrent_uploads_keep_counters_in_step() {
    let server = spawn_default_server().await;
    start(&server, true).await;

    let mut tasks = Vec::new();
    for _ in 0..12 {
        let client = server.client.clone();
        let url = server.url("/api/upload");
        tasks.push(tokio::spawn(async move {
            client
                .post(url)
                .json(&data_url_body(&png_frame()))
                .send()
                .await
                .expect("POST")
                .status()
        }));
    }
    for task in tasks {
        assert_eq!(task.await.expect("task"), 200);
    }

    let status = server.get_json("/api/status/").await;
    assert_eq!(status["processed_count"], 12);
    assert_eq!(status["frame_number"], 12);
    let snapshot = server.state.session.snapshot().expect("snapshot");
    assert_eq!(snapshot.processed_count, snapshot.frame_number);
}
