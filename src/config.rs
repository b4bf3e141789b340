//! Global configuration parsing, validation, and credential loading.

use std::env;
use std::fs;
use std::net::{IpAddr, Ipv4Addr, SocketAddr};
use std::path::Path;
use std::time::Duration;

use serde::Deserialize;
use tracing::{info, warn};

use crate::models::settings::{CaptureSettings, MIN_CAPTURE_INTERVAL};
use crate::{AppError, Result};

/// Keychain service name used for credential lookups.
pub const KEYRING_SERVICE: &str = "vision-relay";

/// Environment variable consulted when the keychain has no API key.
pub const API_KEY_ENV: &str = "GEMINI_API_KEY";

/// Vision inference API settings.
///
/// The API key is loaded at runtime from the OS keychain or the
/// `GEMINI_API_KEY` environment variable, never from the TOML file.
#[derive(Debug, Clone, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub struct InferenceConfig {
    /// Model identifier passed to `generateContent`.
    #[serde(default = "default_model")]
    pub model: String,
    /// Base URL of the generative language API.
    #[serde(default = "default_api_base")]
    pub api_base: String,
    /// Attempts per frame before giving up.
    #[serde(default = "default_max_retries")]
    pub max_retries: u32,
    /// Pause between attempts.
    #[serde(default = "default_retry_delay")]
    pub retry_delay_seconds: u64,
    /// Per-request HTTP timeout.
    #[serde(default = "default_request_timeout")]
    pub request_timeout_seconds: u64,
    /// API key (populated at runtime).
    #[serde(skip)]
    pub api_key: Option<String>,
}

impl Default for InferenceConfig {
    fn default() -> Self {
        Self {
            model: default_model(),
            api_base: default_api_base(),
            max_retries: default_max_retries(),
            retry_delay_seconds: default_retry_delay(),
            request_timeout_seconds: default_request_timeout(),
            api_key: None,
        }
    }
}

impl InferenceConfig {
    /// Request timeout as a [`Duration`].
    #[must_use]
    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_seconds)
    }
}

/// Initial capture tuning; becomes the mutable runtime settings at startup.
#[derive(Debug, Clone, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub struct CaptureConfig {
    /// Seconds between camera captures suggested to clients.
    #[serde(default = "default_capture_interval")]
    pub capture_interval: u64,
    /// Default test mode when a start request does not specify one.
    #[serde(default)]
    pub test_mode: bool,
    /// JPEG quality used when re-encoding frames for the API.
    #[serde(default = "default_quality")]
    pub quality: u8,
}

impl Default for CaptureConfig {
    fn default() -> Self {
        Self {
            capture_interval: default_capture_interval(),
            test_mode: false,
            quality: default_quality(),
        }
    }
}

fn default_model() -> String {
    "gemini-2.5-flash".into()
}

fn default_api_base() -> String {
    "https://generativelanguage.googleapis.com/v1beta".into()
}

fn default_max_retries() -> u32 {
    3
}

fn default_retry_delay() -> u64 {
    2
}

fn default_request_timeout() -> u64 {
    30
}

fn default_capture_interval() -> u64 {
    3
}

fn default_quality() -> u8 {
    85
}

fn default_http_host() -> IpAddr {
    IpAddr::V4(Ipv4Addr::LOCALHOST)
}

fn default_http_port() -> u16 {
    8000
}

fn default_max_upload_bytes() -> usize {
    10 * 1024 * 1024
}

/// Global configuration parsed from `config.toml`.
#[derive(Debug, Clone, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub struct GlobalConfig {
    /// Interface the HTTP server binds to.
    #[serde(default = "default_http_host")]
    pub http_host: IpAddr,
    /// HTTP port; 0 lets the OS pick one.
    #[serde(default = "default_http_port")]
    pub http_port: u16,
    /// Maximum accepted request body for frame uploads.
    #[serde(default = "default_max_upload_bytes")]
    pub max_upload_bytes: usize,
    /// Vision API connectivity and retry policy.
    #[serde(default)]
    pub inference: InferenceConfig,
    /// Initial capture tuning.
    #[serde(default)]
    pub capture: CaptureConfig,
}

impl Default for GlobalConfig {
    fn default() -> Self {
        Self {
            http_host: default_http_host(),
            http_port: default_http_port(),
            max_upload_bytes: default_max_upload_bytes(),
            inference: InferenceConfig::default(),
            capture: CaptureConfig::default(),
        }
    }
}

impl GlobalConfig {
    /// Load and validate configuration from a TOML file path.
    ///
    /// # Errors
    ///
    /// Returns `AppError::Config` if the file cannot be read or contains
    /// invalid TOML, or if validation fails.
    pub fn load_from_path(path: impl AsRef<Path>) -> Result<Self> {
        let raw = fs::read_to_string(path)
            .map_err(|err| AppError::Config(format!("failed to read config: {err}")))?;
        Self::from_toml_str(&raw)
    }

    /// Parse configuration from a TOML string and validate it.
    ///
    /// # Errors
    ///
    /// Returns `AppError::Config` if parsing or validation fails.
    pub fn from_toml_str(raw: &str) -> Result<Self> {
        let mut config: Self = toml::from_str(raw)?;
        config.validate()?;
        Ok(config)
    }

    /// Socket address the HTTP server binds to.
    #[must_use]
    pub fn bind_addr(&self) -> SocketAddr {
        SocketAddr::new(self.http_host, self.http_port)
    }

    /// Initial runtime capture settings derived from the file.
    #[must_use]
    pub fn capture_settings(&self) -> CaptureSettings {
        CaptureSettings {
            capture_interval: self.capture.capture_interval,
            test_mode: self.capture.test_mode,
            quality: self.capture.quality,
            max_retries: self.inference.max_retries,
            retry_delay: self.inference.retry_delay_seconds,
        }
    }

    /// Load the vision API key from OS keychain with env-var fallback.
    ///
    /// A missing key is not an error: the server still runs and every
    /// non-test frame reports the missing configuration as its result.
    ///
    /// # Errors
    ///
    /// Returns `AppError::Config` if the keychain lookup task panics.
    pub async fn load_credentials(&mut self) -> Result<()> {
        self.inference.api_key = load_credential("gemini_api_key", API_KEY_ENV).await?;
        if self.inference.api_key.is_none() {
            warn!("no vision API key configured; only test mode will produce answers");
        } else {
            info!("vision API key loaded");
        }
        Ok(())
    }

    fn validate(&mut self) -> Result<()> {
        if self.inference.max_retries == 0 {
            return Err(AppError::Config(
                "inference.max_retries must be greater than zero".into(),
            ));
        }

        if self.inference.request_timeout_seconds == 0 {
            return Err(AppError::Config(
                "inference.request_timeout_seconds must be greater than zero".into(),
            ));
        }

        if !(1..=100).contains(&self.capture.quality) {
            return Err(AppError::Config(
                "capture.quality must be between 1 and 100".into(),
            ));
        }

        if self.capture.capture_interval < MIN_CAPTURE_INTERVAL {
            warn!(
                requested = self.capture.capture_interval,
                "capture_interval below minimum, clamping"
            );
            self.capture.capture_interval = MIN_CAPTURE_INTERVAL;
        }

        Ok(())
    }
}

/// Load a single credential from OS keychain with env-var fallback.
async fn load_credential(keyring_key: &str, env_key: &str) -> Result<Option<String>> {
    let key = keyring_key.to_owned();

    // keyring is synchronous I/O.
    let keychain_result = tokio::task::spawn_blocking(move || {
        keyring::Entry::new(KEYRING_SERVICE, &key).and_then(|entry| entry.get_password())
    })
    .await
    .map_err(|err| AppError::Config(format!("keychain task panicked: {err}")))?;

    match keychain_result {
        Ok(value) if !value.is_empty() => return Ok(Some(value)),
        Ok(_) => {
            warn!(key = keyring_key, "keychain entry is empty, trying env var");
        }
        Err(err) => {
            warn!(
                key = keyring_key,
                ?err,
                "keychain lookup failed, trying env var"
            );
        }
    }

    Ok(env::var(env_key).ok().filter(|value| !value.trim().is_empty()))
}
