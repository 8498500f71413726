//! Generator trait and client errors.

use async_trait::async_trait;
use thiserror::Error;

/// Errors a generation call can produce.
#[derive(Error, Debug)]
pub enum GeminiError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Authentication error: {0}")]
    Auth(String),

    #[error("API error: HTTP {status}: {body}")]
    Api { status: u16, body: String },

    #[error("Reply did not contain generated text")]
    MissingText { raw: String },
}

pub type Result<T> = std::result::Result<T, GeminiError>;

/// Abstraction over the upstream text generation service.
///
/// The pipeline talks to this trait so tests can substitute scripted
/// replies for the real HTTP client.
#[async_trait]
pub trait TextGenerator: Send + Sync {
    /// Generate a reply for a single prompt. Exactly one attempt.
    async fn generate(&self, prompt: &str) -> Result<String>;
}
