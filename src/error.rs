//! Error taxonomy for the translation pipeline.
//!
//! Fatal conditions ([`ReferenceMissing`]) abort the run before any work is
//! generated. [`ProviderError`] covers everything that can go wrong talking to
//! the external translation service; the orchestrator counts those as failed
//! batches and moves on.

use std::path::PathBuf;
use thiserror::Error;

/// The reference language directory does not exist.
#[derive(Debug, Error)]
#[error("Reference locale directory not found: {}", path.display())]
pub struct ReferenceMissing {
    pub path: PathBuf,
}

/// Failure reported by (or while talking to) a translation provider.
#[derive(Debug, Error)]
pub enum ProviderError {
    #[error("Translation provider request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("OpenAI API error ({status}): {body}")]
    Api { status: u16, body: String },

    #[error("Translation response contained no choices")]
    EmptyResponse,

    #[error("Model refused the translation request: {0}")]
    Refusal(String),

    #[error("Failed to parse structured translation response: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("Translation response misaligned (expected {expected} items, received {received}): {detail}")]
    Misaligned {
        expected: usize,
        received: usize,
        detail: String,
    },
}

impl ProviderError {
    /// Whether another attempt could plausibly succeed.
    ///
    /// Rate limits (429) and server errors (5xx) are retried, as are transport,
    /// parse and alignment failures. Other 4xx responses (bad key, bad model)
    /// fail immediately.
    pub fn is_retryable(&self) -> bool {
        match self {
            ProviderError::Api { status, .. } => *status == 429 || *status >= 500,
            _ => true,
        }
    }
}
