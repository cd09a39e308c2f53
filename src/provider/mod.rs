pub mod client;
pub mod fallback;
pub mod questions;

// Public API exports
pub use client::{build_prompt, OpenRouterClient, DEFAULT_MODEL};
pub use questions::{fetch_questions, load_batch, QuestionSource};

use thiserror::Error;

/// Failures of the question provider. The state machine only distinguishes
/// "the initial load failed" from "it worked"; the variants exist so the log
/// says why.
#[derive(Debug, Error)]
pub enum ProviderError {
    #[error("provider request failed: {0}")]
    Request(String),
    #[error("provider returned a malformed payload: {0}")]
    Malformed(String),
    #[error("question provider unavailable")]
    Unavailable,
}
