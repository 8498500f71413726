//! Pipeline states - explicit FSM for one generation pass
//!
//! Every call walks the same forward path: built, sent, raw received,
//! sanitized, then validated or rejected, with an optional persisted tail.
//! The machine records each transition so a finished pass can explain how
//! it ended where it did.

use serde::{Deserialize, Serialize};

use crate::error::ErrorKind;

/// Defines the possible states of a single generation pass.
///
/// There is no retry loop anywhere in the graph: once a pass leaves a
/// state it never comes back.
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum PipelineState {
    /// Prompt assembled, nothing sent yet.
    Built,

    /// Request handed to the model endpoint, reply pending.
    Sent,

    /// Raw reply text received from the endpoint.
    RawReceived,

    /// Reply cleaned up, ready for validation.
    Sanitized,

    /// Output met the contract and became a typed answer.
    Validated,

    /// Validated answer also made it into history (terminal).
    Persisted,

    /// Output failed validation (terminal).
    Rejected { kind: ErrorKind },

    /// The endpoint call itself failed (terminal).
    UpstreamFailed,
}

impl Default for PipelineState {
    fn default() -> Self {
        PipelineState::Built
    }
}

impl PipelineState {
    /// Check if this is a terminal state (no more transitions expected).
    ///
    /// `Validated` is deliberately not terminal: persistence is optional,
    /// so a pass may finish there when the history write fails.
    pub fn is_terminal(&self) -> bool {
        matches!(
            self,
            Self::Persisted | Self::Rejected { .. } | Self::UpstreamFailed
        )
    }

    /// Get a human-readable description of the current state.
    pub fn description(&self) -> &str {
        match self {
            Self::Built => "Prompt built",
            Self::Sent => "Waiting for the model",
            Self::RawReceived => "Reply received",
            Self::Sanitized => "Reply cleaned up",
            Self::Validated => "Answer validated",
            Self::Persisted => "Answer stored",
            Self::Rejected { .. } => "Output rejected",
            Self::UpstreamFailed => "Model call failed",
        }
    }
}

/// Events that drive a pass from one state to the next.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum PipelineEvent {
    /// The prompt was handed to the model endpoint.
    RequestDispatched,
    /// The endpoint answered with usable text.
    ReplyReceived,
    /// Sanitization finished.
    OutputSanitized,
    /// Validation accepted the output.
    OutputAccepted,
    /// Validation rejected the output.
    OutputRejected { kind: ErrorKind },
    /// The endpoint call failed before any text arrived.
    GenerationFailed,
    /// The validated answer was written to history.
    RecordStored,
}

/// Represents a state transition result.
#[derive(Debug, Clone)]
pub struct StateTransition {
    /// The state before the transition.
    pub from: PipelineState,
    /// The state after the transition.
    pub to: PipelineState,
    /// The event that triggered the transition.
    pub event: PipelineEvent,
    /// Whether the state actually changed.
    pub changed: bool,
}

/// State machine tracking one generation pass.
#[derive(Debug, Clone)]
pub struct StateMachine {
    /// Current state.
    current_state: PipelineState,
    /// Transition history (limited).
    history: Vec<StateTransition>,
    /// Max history entries to keep.
    max_history: usize,
}

impl Default for StateMachine {
    fn default() -> Self {
        Self::new()
    }
}

impl StateMachine {
    /// Create a new state machine in the Built state.
    pub fn new() -> Self {
        Self {
            current_state: PipelineState::Built,
            history: Vec::new(),
            max_history: 16,
        }
    }

    /// Get the current state.
    pub fn state(&self) -> &PipelineState {
        &self.current_state
    }

    /// Get the transition history.
    pub fn history(&self) -> &[StateTransition] {
        &self.history
    }

    /// Handle an event and transition to a new state.
    pub fn handle_event(&mut self, event: PipelineEvent) -> StateTransition {
        let old_state = self.current_state.clone();
        let new_state = self.compute_next_state(&old_state, &event);
        let changed = old_state != new_state;

        self.current_state = new_state.clone();

        let transition = StateTransition {
            from: old_state,
            to: new_state,
            event,
            changed,
        };

        self.history.push(transition.clone());
        if self.history.len() > self.max_history {
            self.history.remove(0);
        }

        transition
    }

    /// Compute the next state given current state and event.
    fn compute_next_state(&self, state: &PipelineState, event: &PipelineEvent) -> PipelineState {
        use PipelineEvent::*;
        use PipelineState::*;

        match (state, event) {
            // ========== Forward Path ==========
            (Built, RequestDispatched) => Sent,
            (Sent, ReplyReceived) => RawReceived,
            (RawReceived, OutputSanitized) => Sanitized,
            (Sanitized, OutputAccepted) => Validated,
            (Validated, RecordStored) => Persisted,

            // ========== Failure Exits ==========
            (Sent, GenerationFailed) => UpstreamFailed,
            (Sanitized, OutputRejected { kind }) => Rejected { kind: *kind },

            // ========== Default: No transition ==========
            _ => state.clone(),
        }
    }

    /// Check if a transition is valid without executing it.
    pub fn can_transition(&self, event: &PipelineEvent) -> bool {
        let next = self.compute_next_state(&self.current_state, event);
        next != self.current_state
    }
}
