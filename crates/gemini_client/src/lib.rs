//! gemini_client - HTTP client for the Gemini generateContent API
//!
//! Sends a single prompt, extracts the generated text from the reply
//! envelope, and reports failures as typed errors. One attempt per call;
//! retries and streaming are out of scope.

pub mod client;
pub mod generator;
pub mod protocol;

pub use client::GeminiClient;
pub use generator::{GeminiError, Result, TextGenerator};
pub use protocol::{GeminiCandidate, GeminiContent, GeminiPart, GeminiRequest, GeminiResponse};
