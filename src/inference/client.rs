//! Frame-level inference client.
//!
//! [`InferenceClient::process_image`] always yields result text: test mode
//! short-circuits to canned answers, a missing credential and every failure
//! become placeholder strings, and transient API errors are retried first.

use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use tokio::time::sleep;
use tracing::{info, info_span, warn, Instrument};

use super::encoding::to_jpeg_blocking;
use super::gemini::GeminiModel;
use super::responses::{canned_response, missing_credential, no_response, processing_error};
use super::{VisionModel, QUIZ_PROMPT};
use crate::config::InferenceConfig;
use crate::models::settings::CaptureSettings;
use crate::session::SettingsStore;
use crate::Result;

/// Attempt bound and pause between attempts.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    /// Total attempts, at least one.
    pub max_attempts: u32,
    /// Pause after each failed attempt except the last.
    pub delay: Duration,
}

impl From<&CaptureSettings> for RetryPolicy {
    fn from(settings: &CaptureSettings) -> Self {
        Self {
            max_attempts: settings.max_retries.max(1),
            delay: Duration::from_secs(settings.retry_delay),
        }
    }
}

/// Run `op` until it succeeds or `policy.max_attempts` is exhausted,
/// returning the last error in the latter case.
///
/// # Errors
///
/// Returns the error of the final attempt.
pub async fn call_with_retry<T, F, Fut>(policy: RetryPolicy, mut op: F) -> Result<T>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<T>>,
{
    let max_attempts = policy.max_attempts.max(1);
    let mut attempt = 1;
    loop {
        match op().await {
            Ok(value) => return Ok(value),
            Err(err) if attempt < max_attempts => {
                warn!(%err, attempt, max_attempts, delay = ?policy.delay, "vision api call failed; retrying");
                if !policy.delay.is_zero() {
                    sleep(policy.delay).await;
                }
                attempt += 1;
            }
            Err(err) => {
                warn!(%err, attempt, "vision api call failed; giving up");
                return Err(err);
            }
        }
    }
}

/// Turns frame bytes into `Q:`/`A:` text.
#[derive(Clone)]
pub struct InferenceClient {
    model: Option<Arc<dyn VisionModel>>,
    settings: Arc<SettingsStore>,
}

impl InferenceClient {
    /// Wrap an explicit model; `None` means no credential is configured.
    #[must_use]
    pub fn new(model: Option<Arc<dyn VisionModel>>, settings: Arc<SettingsStore>) -> Self {
        Self { model, settings }
    }

    /// Build a Gemini-backed client when `config.api_key` is present.
    ///
    /// # Errors
    ///
    /// Returns `AppError::Config` if the HTTP client cannot be built.
    pub fn from_config(config: &InferenceConfig, settings: Arc<SettingsStore>) -> Result<Self> {
        let model = match config.api_key.as_deref() {
            Some(key) => {
                let gemini: Arc<dyn VisionModel> = Arc::new(GeminiModel::new(config, key)?);
                info!(model = %config.model, "vision model configured");
                Some(gemini)
            }
            None => None,
        };
        Ok(Self::new(model, settings))
    }

    /// Whether a real model is available.
    #[must_use]
    pub fn is_configured(&self) -> bool {
        self.model.is_some()
    }

    /// Produce result text for one frame. Never fails.
    pub async fn process_image(&self, image: &[u8], frame_index: u64, test_mode: bool) -> String {
        if test_mode {
            return canned_response(frame_index).to_owned();
        }
        let Some(model) = self.model.as_deref() else {
            warn!(frame_index, "vision api not configured");
            return missing_credential();
        };

        let span = info_span!("process_image", frame_index, model = model.name());
        async move {
            match self.infer(model, image).await {
                Ok(Some(text)) => {
                    info!("frame answered");
                    text
                }
                Ok(None) => {
                    warn!("vision api returned no text");
                    no_response(frame_index)
                }
                Err(err) => {
                    warn!(%err, "frame processing failed");
                    processing_error(frame_index, &err.to_string())
                }
            }
        }
        .instrument(span)
        .await
    }

    async fn infer(&self, model: &dyn VisionModel, image: &[u8]) -> Result<Option<String>> {
        let settings = self.settings.current();
        let jpeg = to_jpeg_blocking(image.to_vec(), settings.quality).await?;
        let jpeg = jpeg.as_slice();
        let reply = call_with_retry(RetryPolicy::from(&settings), move || {
            model.generate(QUIZ_PROMPT, jpeg)
        })
        .await?;
        Ok(reply
            .map(|text| text.trim().to_owned())
            .filter(|text| !text.is_empty()))
    }
}
