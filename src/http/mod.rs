//! HTTP surface for the camera and display clients.
//!
//! Routes are served with and without their trailing slash so both the
//! browser clients (`/api/start/`) and ad-hoc tooling (`/api/start`) work.

mod error;
mod frame;
mod handlers;

use std::sync::Arc;
use std::time::Instant;

use axum::extract::{DefaultBodyLimit, Request};
use axum::middleware::{self, Next};
use axum::response::Response;
use axum::routing::{get, post};
use axum::Router;
use tokio::net::TcpListener;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info};

pub use error::ApiError;
pub use frame::decode_json_image;

use crate::config::GlobalConfig;
use crate::inference::InferenceClient;
use crate::session::{SessionStore, SettingsStore};
use crate::{AppError, Result};

/// Shared application state handed to every request handler.
pub struct AppState {
    /// Startup configuration.
    pub config: Arc<GlobalConfig>,
    /// Session lifecycle and counters.
    pub session: SessionStore,
    /// Runtime capture tuning.
    pub settings: Arc<SettingsStore>,
    /// Frame inference client.
    pub inference: InferenceClient,
}

impl AppState {
    /// Assemble state around an explicit inference client.
    #[must_use]
    pub fn new(
        config: Arc<GlobalConfig>,
        settings: Arc<SettingsStore>,
        inference: InferenceClient,
    ) -> Self {
        Self {
            config,
            session: SessionStore::new(),
            settings,
            inference,
        }
    }

    /// Assemble state from configuration, wiring the Gemini model when a
    /// key was loaded.
    ///
    /// # Errors
    ///
    /// Returns `AppError::Config` if the inference HTTP client cannot be built.
    pub fn from_config(config: Arc<GlobalConfig>) -> Result<Self> {
        let settings = Arc::new(SettingsStore::new(config.capture_settings()));
        let inference = InferenceClient::from_config(&config.inference, Arc::clone(&settings))?;
        Ok(Self::new(config, settings, inference))
    }
}

/// Build the application router.
pub fn router(state: Arc<AppState>) -> Router {
    let body_limit = state.config.max_upload_bytes;
    Router::new()
        .route("/health", get(handlers::health))
        .route("/api/start/", post(handlers::start_session))
        .route("/api/start", post(handlers::start_session))
        .route("/api/end/", post(handlers::end_session))
        .route("/api/end", post(handlers::end_session))
        .route("/api/upload/", post(handlers::upload_frame))
        .route("/api/upload", post(handlers::upload_frame))
        .route("/api/status/", get(handlers::session_status))
        .route("/api/status", get(handlers::session_status))
        .route("/api/latest/", get(handlers::latest_result))
        .route("/api/latest", get(handlers::latest_result))
        .route(
            "/api/config/",
            get(handlers::get_config).post(handlers::update_config),
        )
        .route(
            "/api/config",
            get(handlers::get_config).post(handlers::update_config),
        )
        .layer(DefaultBodyLimit::max(body_limit))
        .layer(middleware::from_fn(log_request))
        .with_state(state)
}

async fn log_request(request: Request, next: Next) -> Response {
    let method = request.method().clone();
    let path = request.uri().path().to_owned();
    let started = Instant::now();
    let response = next.run(request).await;
    debug!(
        %method,
        %path,
        status = response.status().as_u16(),
        elapsed_ms = started.elapsed().as_millis(),
        "request served"
    );
    response
}

/// Bind `config.bind_addr()` and serve until `ct` is cancelled.
///
/// # Errors
///
/// Returns `AppError::Http` if the server fails to bind or serve.
pub async fn serve(state: Arc<AppState>, ct: CancellationToken) -> Result<()> {
    let bind = state.config.bind_addr();
    let listener = TcpListener::bind(bind)
        .await
        .map_err(|err| AppError::Http(format!("failed to bind {bind}: {err}")))?;
    serve_on(listener, state, ct).await
}

/// Serve on an already bound listener until `ct` is cancelled.
///
/// # Errors
///
/// Returns `AppError::Http` if the server fails.
pub async fn serve_on(
    listener: TcpListener,
    state: Arc<AppState>,
    ct: CancellationToken,
) -> Result<()> {
    let local = listener
        .local_addr()
        .map_err(|err| AppError::Http(format!("listener has no local address: {err}")))?;
    info!(%local, "starting HTTP server");

    axum::serve(listener, router(state))
        .with_graceful_shutdown(async move { ct.cancelled().await })
        .await
        .map_err(|err| AppError::Http(format!("server error: {err}")))?;

    info!("HTTP server shut down");
    Ok(())
}
