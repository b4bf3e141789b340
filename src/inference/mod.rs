//! Vision-language inference: prompt, model abstraction, and the
//! never-failing frame client built on top of it.

pub mod client;
pub mod encoding;
pub mod gemini;
pub mod responses;

use std::future::Future;
use std::pin::Pin;

use crate::Result;

pub use client::InferenceClient;
pub use gemini::GeminiModel;

/// Instruction sent alongside every frame.
pub const QUIZ_PROMPT: &str = "\
Analyze this image carefully. Focus only on the academic or quiz question \
that is clearly visible; ignore background objects, UI chrome, and any \
unrelated text.

If there is a clear question, math problem, or text requiring an answer:
1. If a question number is visible, put only the question number in the Q field.
2. If no question number is visible, give a very short summary of the question (2-5 words) in the Q field.
3. Put only the final answer in the A field (for multiple choice, the chosen option).

If no question is visible, answer \"No question detected\" in Q and \"N/A\" in A.

Respond with exactly two lines and nothing else:
Q: [question number, short summary, or \"No question detected\"]
A: [final answer or \"N/A\"]";

/// A multimodal model that answers a text instruction about one JPEG image.
///
/// Implementations return `Ok(None)` when the API replied without any text
/// and `Err` for transport, status, or decoding failures; the caller owns
/// the retry policy.
pub trait VisionModel: Send + Sync {
    /// Short identifier used in logs.
    fn name(&self) -> &str;

    /// Run one inference request.
    fn generate<'a>(
        &'a self,
        prompt: &'a str,
        jpeg: &'a [u8],
    ) -> Pin<Box<dyn Future<Output = Result<Option<String>>> + Send + 'a>>;
}
