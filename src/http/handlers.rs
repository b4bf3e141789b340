//! Session control, frame ingestion, polling, and tuning handlers.

use std::panic::AssertUnwindSafe;
use std::sync::Arc;

use axum::extract::{Request, State};
use axum::response::{IntoResponse, Response};
use axum::Json;
use bytes::Bytes;
use chrono::{DateTime, Utc};
use futures_util::FutureExt;
use serde::{Deserialize, Serialize};
use tracing::{error, info, info_span, warn, Instrument};

use super::error::ApiError;
use super::frame::extract_image;
use super::AppState;
use crate::inference::responses::{canned_response, capture_issue, system_error};
use crate::models::deserialize_lenient_bool;
use crate::models::settings::{CaptureSettings, CaptureSettingsPatch};

/// Message returned when a frame arrives outside a session.
pub const INACTIVE_MESSAGE: &str = "No active session. Please start session first.";

const SUCCESS: &str = "success";

type SharedState = State<Arc<AppState>>;

#[derive(Debug, Default, Deserialize)]
struct StartRequest {
    #[serde(default, deserialize_with = "deserialize_lenient_bool")]
    test_mode: Option<bool>,
}

#[derive(Serialize)]
pub(super) struct StartResponse {
    status: &'static str,
    message: &'static str,
    test_mode: bool,
}

#[derive(Serialize)]
pub(super) struct EndResponse {
    status: &'static str,
    processed_count: u64,
    total_frames: u64,
}

#[derive(Serialize)]
pub(super) struct UploadResponse {
    status: &'static str,
    result: String,
    processed_count: u64,
    frame_number: u64,
}

#[derive(Serialize)]
pub(super) struct InactiveResponse {
    status: &'static str,
    message: &'static str,
}

#[derive(Serialize)]
pub(super) struct StatusResponse {
    active: bool,
    processed_count: u64,
    frame_number: u64,
    test_mode: bool,
}

#[derive(Serialize)]
pub(super) struct LatestResponse {
    active: bool,
    latest_result: String,
    processed_count: u64,
    frame_number: u64,
    last_update: Option<DateTime<Utc>>,
}

#[derive(Serialize)]
pub(super) struct ConfigResponse {
    status: &'static str,
    config: CaptureSettings,
}

/// `GET /health`: plain-text liveness probe.
pub(super) async fn health() -> &'static str {
    "ok"
}

/// `POST /api/start/`: (re)start the session.
///
/// The body is optional; an unreadable body falls back to the configured
/// default test mode.
pub(super) async fn start_session(
    State(state): SharedState,
    body: Bytes,
) -> Result<Json<StartResponse>, ApiError> {
    let request = if body.iter().all(u8::is_ascii_whitespace) {
        StartRequest::default()
    } else {
        serde_json::from_slice::<StartRequest>(&body).unwrap_or_else(|err| {
            warn!(%err, "ignoring unreadable start request body");
            StartRequest::default()
        })
    };
    let test_mode = request
        .test_mode
        .unwrap_or_else(|| state.settings.current().test_mode);

    state.session.start(test_mode)?;
    info!(test_mode, "session started");

    Ok(Json(StartResponse {
        status: SUCCESS,
        message: "Session started successfully",
        test_mode,
    }))
}

/// `POST /api/end/`: stop accepting frames and report the final counters.
pub(super) async fn end_session(State(state): SharedState) -> Result<Json<EndResponse>, ApiError> {
    let summary = state.session.end()?;
    info!(
        processed_count = summary.processed_count,
        total_frames = summary.total_frames,
        "session ended"
    );
    Ok(Json(EndResponse {
        status: SUCCESS,
        processed_count: summary.processed_count,
        total_frames: summary.total_frames,
    }))
}

/// `POST /api/upload/`: ingest one frame.
///
/// Outside a session the request is rejected with `status: "error"`. Inside
/// a session every outcome, including malformed input, API failure, and a
/// panic during ingestion, is recorded as a result and reported as success.
pub(super) async fn upload_frame(
    State(state): SharedState,
    request: Request,
) -> Result<Response, ApiError> {
    let snapshot = state.session.snapshot()?;
    if !snapshot.active {
        info!("frame rejected: no active session");
        return Ok(Json(InactiveResponse {
            status: "error",
            message: INACTIVE_MESSAGE,
        })
        .into_response());
    }

    let frame_index = snapshot.next_frame_index();
    let test_mode = snapshot.test_mode;
    let span = info_span!("upload_frame", frame_index, test_mode);

    let outcome = AssertUnwindSafe(ingest(&state, request, frame_index, test_mode))
        .catch_unwind()
        .instrument(span)
        .await;
    let result = outcome.unwrap_or_else(|_| {
        error!(frame_index, "frame ingestion panicked; recording placeholder");
        system_error(frame_index)
    });

    let recorded = state.session.record_result(result.clone())?;
    Ok(Json(UploadResponse {
        status: SUCCESS,
        result,
        processed_count: recorded.processed_count,
        frame_number: recorded.frame_number,
    })
    .into_response())
}

async fn ingest(state: &AppState, request: Request, frame_index: u64, test_mode: bool) -> String {
    match extract_image(request).await {
        Ok(image) => {
            state
                .inference
                .process_image(&image, frame_index, test_mode)
                .await
        }
        Err(err) => {
            warn!(%err, "frame extraction failed");
            if test_mode {
                canned_response(frame_index).to_owned()
            } else {
                capture_issue(frame_index)
            }
        }
    }
}

/// `GET /api/status/`: lightweight liveness and counters.
pub(super) async fn session_status(
    State(state): SharedState,
) -> Result<Json<StatusResponse>, ApiError> {
    let snapshot = state.session.snapshot()?;
    Ok(Json(StatusResponse {
        active: snapshot.active,
        processed_count: snapshot.processed_count,
        frame_number: snapshot.frame_number,
        test_mode: snapshot.test_mode,
    }))
}

/// `GET /api/latest/`: polling payload for the display client.
pub(super) async fn latest_result(
    State(state): SharedState,
) -> Result<Json<LatestResponse>, ApiError> {
    let snapshot = state.session.snapshot()?;
    Ok(Json(LatestResponse {
        active: snapshot.active,
        latest_result: snapshot.latest_result,
        processed_count: snapshot.processed_count,
        frame_number: snapshot.frame_number,
        last_update: snapshot.last_update,
    }))
}

/// `GET /api/config/`: current capture settings.
pub(super) async fn get_config(State(state): SharedState) -> Json<ConfigResponse> {
    Json(ConfigResponse {
        status: SUCCESS,
        config: state.settings.current(),
    })
}

/// `POST /api/config/`: merge a partial settings update.
pub(super) async fn update_config(
    State(state): SharedState,
    body: Bytes,
) -> Result<Json<ConfigResponse>, ApiError> {
    let patch = if body.iter().all(u8::is_ascii_whitespace) {
        CaptureSettingsPatch::default()
    } else {
        serde_json::from_slice::<CaptureSettingsPatch>(&body)
            .map_err(|err| ApiError::BadRequest(format!("invalid config update: {err}")))?
    };

    Ok(Json(ConfigResponse {
        status: SUCCESS,
        config: state.settings.update(&patch),
    }))
}
