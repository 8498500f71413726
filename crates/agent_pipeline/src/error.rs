//! Error taxonomy for the generation pipeline.
//!
//! Every failure an agent call can produce falls into exactly one of the
//! variants below. Callers branch on [`ErrorKind`] rather than string
//! matching, and [`ErrorReport`] is the wire-friendly rendering that keeps
//! the raw model text attached when one was in play.

use gemini_client::GeminiError;
use history_store::StoreError;
use serde::{Deserialize, Serialize};
use thiserror::Error;

pub type Result<T> = std::result::Result<T, AgentError>;

/// Everything that can go wrong between accepting a request and returning a
/// validated answer.
#[derive(Error, Debug)]
pub enum AgentError {
    /// The caller's input was unusable before any upstream work happened.
    #[error("invalid request: {0}")]
    InvalidRequest(String),

    /// The model endpoint could not be reached, refused the credentials, or
    /// answered with a non-success status.
    #[error("upstream unavailable: {detail}")]
    UpstreamUnavailable {
        detail: String,
        /// Upstream response body, when one arrived.
        raw: Option<String>,
    },

    /// The endpoint returned success but the reply envelope carried no
    /// usable generated text.
    #[error("malformed upstream response: {detail}")]
    MalformedUpstreamResponse { detail: String, raw: String },

    /// The sanitized output is not syntactically what the contract expects.
    #[error("invalid model output, expected {expected}: {detail}")]
    InvalidModelOutput {
        expected: &'static str,
        detail: String,
        raw: String,
    },

    /// The output parsed, but a contract field rule rejected it.
    #[error("contract violation: {detail}")]
    ContractViolation { detail: String, raw: String },

    /// History storage failed on a read or delete path. Writes after a
    /// successful generation are best-effort and never surface here.
    #[error("persistence failure: {0}")]
    PersistenceFailure(#[from] StoreError),
}

impl AgentError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            AgentError::InvalidRequest(_) => ErrorKind::InvalidRequest,
            AgentError::UpstreamUnavailable { .. } => ErrorKind::UpstreamUnavailable,
            AgentError::MalformedUpstreamResponse { .. } => ErrorKind::MalformedUpstreamResponse,
            AgentError::InvalidModelOutput { .. } => ErrorKind::InvalidModelOutput,
            AgentError::ContractViolation { .. } => ErrorKind::ContractViolation,
            AgentError::PersistenceFailure(_) => ErrorKind::PersistenceFailure,
        }
    }

    /// Raw model text attached to the failure, when any reached us.
    pub fn raw(&self) -> Option<&str> {
        match self {
            AgentError::UpstreamUnavailable { raw, .. } => raw.as_deref(),
            AgentError::MalformedUpstreamResponse { raw, .. }
            | AgentError::InvalidModelOutput { raw, .. }
            | AgentError::ContractViolation { raw, .. } => Some(raw),
            AgentError::InvalidRequest(_) | AgentError::PersistenceFailure(_) => None,
        }
    }

    pub fn report(&self) -> ErrorReport {
        ErrorReport {
            kind: self.kind(),
            detail: self.to_string(),
            raw: self.raw().map(str::to_string),
        }
    }
}

impl From<GeminiError> for AgentError {
    fn from(error: GeminiError) -> Self {
        match error {
            GeminiError::Api { status, body } => AgentError::UpstreamUnavailable {
                detail: format!("Gemini returned HTTP {status}"),
                raw: Some(body),
            },
            GeminiError::MissingText { raw } => AgentError::MalformedUpstreamResponse {
                detail: "no generated text in Gemini response".to_string(),
                raw,
            },
            other => AgentError::UpstreamUnavailable {
                detail: other.to_string(),
                raw: None,
            },
        }
    }
}

/// Discriminant-only view of [`AgentError`], stable across the wire.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorKind {
    InvalidRequest,
    UpstreamUnavailable,
    MalformedUpstreamResponse,
    InvalidModelOutput,
    ContractViolation,
    PersistenceFailure,
}

impl ErrorKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            ErrorKind::InvalidRequest => "invalid_request",
            ErrorKind::UpstreamUnavailable => "upstream_unavailable",
            ErrorKind::MalformedUpstreamResponse => "malformed_upstream_response",
            ErrorKind::InvalidModelOutput => "invalid_model_output",
            ErrorKind::ContractViolation => "contract_violation",
            ErrorKind::PersistenceFailure => "persistence_failure",
        }
    }
}

/// Serializable rendering of a pipeline failure.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorReport {
    pub kind: ErrorKind,
    pub detail: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub raw: Option<String>,
}
