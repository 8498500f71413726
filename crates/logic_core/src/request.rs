//! Generation requests - What callers submit to the agent
//!
//! A request names the desired output shape (mode) and carries the problem
//! statement plus optional multiple-choice candidates.

use serde::{Deserialize, Serialize};

/// What the caller wants the agent to produce.
#[derive(Serialize, Deserialize, Clone, Copy, Debug, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum GenerationMode {
    /// Structured solution: answer, explanation, category, difficulty.
    Explain,
    /// Mermaid flowchart describing the solution steps.
    Diagram,
    /// Same structured contract as `Explain`, oriented to code exercises.
    Code,
}

impl GenerationMode {
    /// Wire name used in requests and stored records.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Explain => "explain",
            Self::Diagram => "diagram",
            Self::Code => "code",
        }
    }

    /// Parse a wire name back into a mode.
    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "explain" => Some(Self::Explain),
            "diagram" => Some(Self::Diagram),
            "code" => Some(Self::Code),
            _ => None,
        }
    }
}

/// A logic problem submitted for solving.
#[derive(Serialize, Deserialize, Clone, Debug)]
#[serde(rename_all = "camelCase")]
pub struct GenerationRequest {
    pub mode: GenerationMode,
    pub problem_statement: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub options: Option<Vec<String>>,
}

impl GenerationRequest {
    /// Create a request without options.
    pub fn new(mode: GenerationMode, problem_statement: impl Into<String>) -> Self {
        Self {
            mode,
            problem_statement: problem_statement.into(),
            options: None,
        }
    }

    /// Attach multiple-choice options.
    pub fn with_options(mut self, options: Vec<String>) -> Self {
        self.options = Some(options);
        self
    }

    /// True when the problem statement is blank after trimming.
    pub fn is_blank(&self) -> bool {
        self.problem_statement.trim().is_empty()
    }
}
