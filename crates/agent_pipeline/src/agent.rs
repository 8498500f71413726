//! LogicAgent - the pipeline orchestrator.
//!
//! One call runs one forward pass: build the prompt, call the model once,
//! sanitize, validate, then store. There are no retries anywhere; a failed
//! pass reports why and stops. History writes after validation are
//! best-effort, so a storage hiccup never costs the caller an answer that
//! already passed the contract.

use std::sync::Arc;

use uuid::Uuid;

use gemini_client::{GeminiClient, TextGenerator};
use history_store::{HistoryStore, SessionStore, SqliteHistoryStore, StoreError};
use logic_core::chat::RECENT_SESSIONS_LIMIT;
use logic_core::{
    AgentAnswer, AgentConfig, ChatMessage, ChatReply, ChatSession, ChatTurn, DiagramRecord,
    GenerationMode, GenerationRequest, HistoryPage, LogicRecord, NewDiagramRecord, NewLogicRecord,
    PageRequest, SessionSummary,
};

use crate::error::{AgentError, Result};
use crate::prompt;
use crate::sanitize::{sanitize, ExpectedFormat};
use crate::state::{PipelineEvent, PipelineState, StateMachine};
use crate::validate;

/// What a generation pass produced.
///
/// The answer is always present; the storage fields tell the caller whether
/// it also made it into history.
#[derive(Debug)]
pub struct GenerationOutcome {
    pub answer: AgentAnswer,
    /// Id of the stored record, when the history write succeeded.
    pub record_id: Option<String>,
    /// The storage failure, when it did not.
    pub persistence_error: Option<StoreError>,
    /// State the pass finished in: Persisted, or Validated when the
    /// history write failed.
    pub final_state: PipelineState,
}

/// Orchestrates prompt building, the model call, sanitization, validation
/// and persistence behind one typed surface.
pub struct LogicAgent {
    generator: Arc<dyn TextGenerator>,
    history: Arc<dyn HistoryStore>,
    sessions: Arc<dyn SessionStore>,
}

impl LogicAgent {
    pub fn new(
        generator: Arc<dyn TextGenerator>,
        history: Arc<dyn HistoryStore>,
        sessions: Arc<dyn SessionStore>,
    ) -> Self {
        Self {
            generator,
            history,
            sessions,
        }
    }

    /// Wire up the real Gemini client and SQLite store from configuration.
    pub fn from_config(config: &AgentConfig) -> Result<Self> {
        let client = GeminiClient::from_config(config)?;
        let store = Arc::new(SqliteHistoryStore::new(&config.db_path));
        Ok(Self::new(Arc::new(client), store.clone(), store))
    }

    /// Run one generation pass for the given request.
    pub async fn generate(&self, request: GenerationRequest) -> Result<GenerationOutcome> {
        if request.is_blank() {
            return Err(AgentError::InvalidRequest(
                "problem statement must not be empty".to_string(),
            ));
        }

        log::debug!("generation request: mode={}", request.mode.as_str());
        match request.mode {
            GenerationMode::Explain | GenerationMode::Code => self.generate_logic(request).await,
            GenerationMode::Diagram => self.generate_diagram(request).await,
        }
    }

    async fn generate_logic(&self, request: GenerationRequest) -> Result<GenerationOutcome> {
        let prompt = prompt::logic_prompt(&request);
        let mut machine = StateMachine::new();

        let raw = self.dispatch(&prompt, &mut machine).await?;
        let sanitized = sanitize(&raw, ExpectedFormat::Json);
        step(&mut machine, PipelineEvent::OutputSanitized);

        let answer = match validate::validate_logic(&sanitized, &raw) {
            Ok(answer) => answer,
            Err(error) => return Err(reject(&mut machine, error)),
        };
        step(&mut machine, PipelineEvent::OutputAccepted);

        let record = NewLogicRecord::from_request(&request, answer.clone());
        let (record_id, persistence_error) = match self.history.insert_logic(record).await {
            Ok(id) => {
                step(&mut machine, PipelineEvent::RecordStored);
                (Some(id), None)
            }
            Err(error) => {
                log::warn!("logic history write failed after validation: {error}");
                (None, Some(error))
            }
        };

        Ok(GenerationOutcome {
            answer: AgentAnswer::Logic(answer),
            record_id,
            persistence_error,
            final_state: machine.state().clone(),
        })
    }

    async fn generate_diagram(&self, request: GenerationRequest) -> Result<GenerationOutcome> {
        let prompt = prompt::diagram_prompt(&request);
        let mut machine = StateMachine::new();

        let raw = self.dispatch(&prompt, &mut machine).await?;
        let sanitized = sanitize(&raw, ExpectedFormat::MermaidGraph);
        step(&mut machine, PipelineEvent::OutputSanitized);

        let answer = match validate::validate_diagram(&sanitized, &raw) {
            Ok(answer) => answer,
            Err(error) => return Err(reject(&mut machine, error)),
        };
        step(&mut machine, PipelineEvent::OutputAccepted);

        let record = NewDiagramRecord::from_request(&request, answer.clone());
        let (record_id, persistence_error) = match self.history.insert_diagram(record).await {
            Ok(id) => {
                step(&mut machine, PipelineEvent::RecordStored);
                (Some(id), None)
            }
            Err(error) => {
                log::warn!("diagram history write failed after validation: {error}");
                (None, Some(error))
            }
        };

        Ok(GenerationOutcome {
            answer: AgentAnswer::Diagram(answer),
            record_id,
            persistence_error,
            final_state: machine.state().clone(),
        })
    }

    /// Send the prompt upstream, exactly once.
    async fn dispatch(&self, prompt: &str, machine: &mut StateMachine) -> Result<String> {
        step(machine, PipelineEvent::RequestDispatched);
        match self.generator.generate(prompt).await {
            Ok(raw) => {
                step(machine, PipelineEvent::ReplyReceived);
                Ok(raw)
            }
            Err(error) => {
                step(machine, PipelineEvent::GenerationFailed);
                log::error!("model call failed: {error}");
                Err(AgentError::from(error))
            }
        }
    }

    /// One page of stored logic results, newest first.
    pub async fn logic_history(&self, selector: PageRequest) -> Result<HistoryPage<LogicRecord>> {
        Ok(self.history.logic_page(selector).await?)
    }

    /// Remove a stored logic result. Returns false when the id is unknown.
    pub async fn delete_logic_entry(&self, id: &str) -> Result<bool> {
        Ok(self.history.delete_logic(id).await?)
    }

    /// One page of stored diagrams, newest first.
    pub async fn diagram_history(
        &self,
        selector: PageRequest,
    ) -> Result<HistoryPage<DiagramRecord>> {
        Ok(self.history.diagram_page(selector).await?)
    }

    /// Remove a stored diagram. Returns false when the id is unknown.
    pub async fn delete_diagram_entry(&self, id: &str) -> Result<bool> {
        Ok(self.history.delete_diagram(id).await?)
    }

    /// Run one tutoring turn. A missing session id starts a new session.
    pub async fn chat(&self, turn: ChatTurn) -> Result<ChatReply> {
        if turn.message.trim().is_empty() {
            return Err(AgentError::InvalidRequest(
                "message must not be empty".to_string(),
            ));
        }

        let session_id = turn
            .session_id
            .clone()
            .unwrap_or_else(|| Uuid::new_v4().to_string());

        let mut session = match self.sessions.session(&session_id).await? {
            Some(session) => session,
            None => ChatSession::start(session_id, &turn.message, turn.context.as_deref()),
        };

        session.push(ChatMessage::user(turn.message.clone()));

        let prompt = prompt::chat_prompt(turn.context.as_deref(), session.recent_messages());
        let reply = self.generator.generate(&prompt).await.map_err(AgentError::from)?;

        session.push(ChatMessage::assistant(reply.clone()));
        self.sessions.save_session(&session).await?;

        log::debug!(
            "chat session {} now holds {} messages",
            session.session_id,
            session.messages.len()
        );

        let message_count = session.messages.len();
        Ok(ChatReply {
            reply,
            session_id: session.session_id,
            message_count,
        })
    }

    /// Load a full session transcript.
    pub async fn chat_history(&self, session_id: &str) -> Result<Option<ChatSession>> {
        Ok(self.sessions.session(session_id).await?)
    }

    /// Delete a session. Returns false when the id is unknown.
    pub async fn delete_chat_session(&self, session_id: &str) -> Result<bool> {
        Ok(self.sessions.delete_session(session_id).await?)
    }

    /// Most recently active sessions, without their messages.
    pub async fn recent_sessions(&self) -> Result<Vec<SessionSummary>> {
        Ok(self.sessions.recent_sessions(RECENT_SESSIONS_LIMIT).await?)
    }

    /// Free-form passthrough: one prompt, one raw reply, no contract and no
    /// history.
    pub async fn raw_generate(&self, prompt: &str) -> Result<String> {
        if prompt.trim().is_empty() {
            return Err(AgentError::InvalidRequest(
                "prompt must not be empty".to_string(),
            ));
        }
        Ok(self.generator.generate(prompt).await?)
    }
}

fn step(machine: &mut StateMachine, event: PipelineEvent) {
    let transition = machine.handle_event(event);
    if transition.changed {
        log::debug!("pipeline: {:?} -> {:?}", transition.from, transition.to);
    }
}

fn reject(machine: &mut StateMachine, error: AgentError) -> AgentError {
    step(
        machine,
        PipelineEvent::OutputRejected { kind: error.kind() },
    );
    log::warn!("output rejected: {error}");
    error
}
