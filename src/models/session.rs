//! Session snapshot model and lifecycle banners.

use chrono::{DateTime, Utc};
use serde::Serialize;

/// `latest_result` before the first session starts.
pub const NO_RESULTS_BANNER: &str = "No results yet";

/// `latest_result` right after a session starts.
pub const STARTED_BANNER: &str = "Session started - waiting for first image...";

/// `latest_result` after a session ends.
#[must_use]
pub fn ended_banner(processed_count: u64) -> String {
    format!("Session ended. Processed {processed_count} frames.")
}

/// Owned, point-in-time copy of the session record.
#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub struct SessionSnapshot {
    /// Whether uploads are currently accepted.
    pub active: bool,
    /// Frames processed in the current (or last) session.
    pub processed_count: u64,
    /// Ingestion attempts in the current (or last) session.
    pub frame_number: u64,
    /// Latest `Q:`/`A:` text or lifecycle banner.
    pub latest_result: String,
    /// When the record last changed.
    pub last_update: Option<DateTime<Utc>>,
    /// Whether frames get canned responses instead of API calls.
    pub test_mode: bool,
}

impl Default for SessionSnapshot {
    fn default() -> Self {
        Self {
            active: false,
            processed_count: 0,
            frame_number: 0,
            latest_result: NO_RESULTS_BANNER.to_owned(),
            last_update: None,
            test_mode: false,
        }
    }
}

impl SessionSnapshot {
    /// Index handed to the inference client for the next frame.
    #[must_use]
    pub fn next_frame_index(&self) -> u64 {
        self.frame_number
    }
}

/// Counters reported when a session ends.
#[derive(Debug, Clone, Copy, Serialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub struct EndSummary {
    /// Frames processed during the session.
    pub processed_count: u64,
    /// Ingestion attempts during the session.
    pub total_frames: u64,
}
