//! Integration tests for the HTTP health endpoint and routing fallbacks.
//!
//! Uses an ephemeral port to avoid conflicts with running instances.

use super::test_helpers::spawn_default_server;

// ── GET /health returns 200 OK ───────────────────────────────

#[tokio::test]
async fn health_returns_ok() {
    let server = spawn_default_server().await;

    let resp = server
        .client
        .get(server.url("/health"))
        .send()
        .await
        .expect("HTTP GET /health");

    assert_eq!(resp.status(), 200);
    let body = resp.text().await.expect("body");
    assert_eq!(body, "ok");
}

// ── Non-existent route returns 404 ──────────────────────────

#[tokio::test]
async fn non_existent_route_returns_404() {
    let server = spawn_default_server().await;

    let resp = server
        .client
        .get(server.url("/nonexistent"))
        .send()
        .await
        .expect("HTTP GET /nonexistent");

    assert_eq!(resp.status(), 404);
}

// ── Wrong method on a known route ───────────────────────────

#[tokio::test]
async fn get_on_upload_is_method_not_allowed() {
    let server = spawn_default_server().await;

    let resp = server
        .client
        .get(server.url("/api/upload/"))
        .send()
        .await
        .expect("HTTP GET /api/upload/");

    assert_eq!(resp.status(), 405);
}
