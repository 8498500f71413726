//! agent_pipeline - Generation pipeline for the logic tutoring agent
//!
//! This crate turns a generation request into a validated, typed answer:
//! prompt building, a single Gemini call, response sanitization, contract
//! validation and best-effort history persistence, with an explicit state
//! machine tracking each pass.

pub mod agent;
pub mod error;
pub mod prompt;
pub mod sanitize;
pub mod state;
pub mod validate;

// Re-export commonly used types
pub use agent::{GenerationOutcome, LogicAgent};
pub use error::{AgentError, ErrorKind, ErrorReport, Result};
pub use sanitize::{repair_graph, sanitize, strip_fences, ExpectedFormat};
pub use state::{PipelineEvent, PipelineState, StateMachine, StateTransition};
pub use validate::{validate_diagram, validate_logic};
