//! Canned test-mode answers and the placeholder texts recorded when a
//! frame cannot be answered.
//!
//! Placeholders label frames with the 1-based ordinal `frame_index + 1`.

use crate::util::truncate_text;

/// Longest error message embedded in a processing-error placeholder.
pub const MAX_ERROR_LEN: usize = 100;

/// Deterministic answers cycled through in test mode.
pub const CANNED_RESPONSES: [&str; 5] = [
    "Q: 1\nA: B) 42",
    "Q: Solve 2x + 3 = 11\nA: x = 4",
    "Q: Capital of France\nA: Paris",
    "Q: 4\nA: C) Photosynthesis",
    "Q: No question detected\nA: N/A",
];

/// Canned answer for `frame_index`; wraps every five frames.
#[must_use]
pub fn canned_response(frame_index: u64) -> &'static str {
    #[allow(clippy::cast_possible_truncation)]
    let slot = (frame_index % CANNED_RESPONSES.len() as u64) as usize;
    CANNED_RESPONSES[slot]
}

/// Result when no API credential is configured.
#[must_use]
pub fn missing_credential() -> String {
    "Error: Gemini API not configured".to_owned()
}

/// Result when the API answered without any text.
#[must_use]
pub fn no_response(frame_index: u64) -> String {
    format!("Q: Frame {}\nA: No response from API", ordinal(frame_index))
}

/// Result when decoding, encoding, or every API attempt failed.
#[must_use]
pub fn processing_error(frame_index: u64, message: &str) -> String {
    format!(
        "Q: Frame {}\nA: Processing error: {}",
        ordinal(frame_index),
        truncate_text(message, MAX_ERROR_LEN)
    )
}

/// Result when the upload carried no usable image outside test mode.
#[must_use]
pub fn capture_issue(frame_index: u64) -> String {
    format!(
        "Q: Frame {}\nA: Image capture issue - please retry",
        ordinal(frame_index)
    )
}

/// Result when ingestion hit an unexpected fault.
#[must_use]
pub fn system_error(frame_index: u64) -> String {
    format!(
        "Q: Frame {}\nA: System error (session continues)",
        ordinal(frame_index)
    )
}

fn ordinal(frame_index: u64) -> u64 {
    frame_index.saturating_add(1)
}
