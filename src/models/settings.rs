//! Runtime capture settings and partial updates.

use serde::{Deserialize, Serialize};

use super::{
    deserialize_lenient_bool, deserialize_lenient_u32, deserialize_lenient_u64,
    deserialize_lenient_u8,
};

/// Smallest capture interval (seconds) a client may be told to use.
pub const MIN_CAPTURE_INTERVAL: u64 = 2;

/// Process-wide tuning shared by the camera client and the inference client.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub struct CaptureSettings {
    /// Seconds between captures; never below [`MIN_CAPTURE_INTERVAL`].
    pub capture_interval: u64,
    /// Test mode applied when a start request omits the flag.
    pub test_mode: bool,
    /// JPEG quality used when re-encoding frames.
    pub quality: u8,
    /// Attempts per frame against the vision API.
    pub max_retries: u32,
    /// Seconds to wait between attempts.
    pub retry_delay: u64,
}

impl Default for CaptureSettings {
    fn default() -> Self {
        Self {
            capture_interval: 3,
            test_mode: false,
            quality: 85,
            max_retries: 3,
            retry_delay: 2,
        }
    }
}

impl CaptureSettings {
    /// Merge the fields present in `patch`, clamping the capture interval.
    pub fn apply(&mut self, patch: &CaptureSettingsPatch) {
        if let Some(interval) = patch.capture_interval {
            self.capture_interval = interval.max(MIN_CAPTURE_INTERVAL);
        }
        if let Some(test_mode) = patch.test_mode {
            self.test_mode = test_mode;
        }
        if let Some(quality) = patch.quality {
            self.quality = quality;
        }
        if let Some(max_retries) = patch.max_retries {
            self.max_retries = max_retries;
        }
        if let Some(retry_delay) = patch.retry_delay {
            self.retry_delay = retry_delay;
        }
    }
}

/// Partial settings update; absent fields are left unchanged and unknown
/// fields are ignored.
#[derive(Debug, Clone, Default, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub struct CaptureSettingsPatch {
    /// New capture interval in seconds.
    #[serde(default, deserialize_with = "deserialize_lenient_u64")]
    pub capture_interval: Option<u64>,
    /// New default test mode.
    #[serde(default, deserialize_with = "deserialize_lenient_bool")]
    pub test_mode: Option<bool>,
    /// New JPEG quality.
    #[serde(default, deserialize_with = "deserialize_lenient_u8")]
    pub quality: Option<u8>,
    /// New attempt bound.
    #[serde(default, deserialize_with = "deserialize_lenient_u32")]
    pub max_retries: Option<u32>,
    /// New retry delay in seconds.
    #[serde(default, deserialize_with = "deserialize_lenient_u64")]
    pub retry_delay: Option<u64>,
}

impl CaptureSettingsPatch {
    /// Whether the patch carries no recognized field.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self == &Self::default()
    }
}
