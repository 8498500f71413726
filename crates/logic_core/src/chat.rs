//! Chat sessions - Conversational tutor types
//!
//! Sessions are keyed by a caller-visible id, titled after the opening
//! message, and embed only a trailing window of messages in prompts.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// How many trailing messages are embedded in the tutor prompt.
pub const HISTORY_WINDOW: usize = 10;

/// Session titles truncate the opening message at this many characters.
pub const TITLE_MAX_CHARS: usize = 50;

/// How many sessions a listing returns.
pub const RECENT_SESSIONS_LIMIT: u32 = 20;

/// Who authored a chat message.
#[derive(Serialize, Deserialize, Clone, Copy, Debug, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum ChatRole {
    User,
    Assistant,
}

impl ChatRole {
    /// Wire name, also used as the transcript line prefix.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::User => "user",
            Self::Assistant => "assistant",
        }
    }
}

/// One message inside a session.
#[derive(Serialize, Deserialize, Clone, Debug)]
pub struct ChatMessage {
    pub role: ChatRole,
    pub content: String,
    pub timestamp: DateTime<Utc>,
}

impl ChatMessage {
    /// Create a user message timestamped now.
    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: ChatRole::User,
            content: content.into(),
            timestamp: Utc::now(),
        }
    }

    /// Create an assistant message timestamped now.
    pub fn assistant(content: impl Into<String>) -> Self {
        Self {
            role: ChatRole::Assistant,
            content: content.into(),
            timestamp: Utc::now(),
        }
    }
}

/// A stored tutoring conversation.
#[derive(Serialize, Deserialize, Clone, Debug)]
#[serde(rename_all = "camelCase")]
pub struct ChatSession {
    pub session_id: String,
    pub title: String,
    pub messages: Vec<ChatMessage>,
    /// Exercise context captured when the session started. May be empty.
    #[serde(default)]
    pub context: String,
    pub created_at: DateTime<Utc>,
    pub last_activity: DateTime<Utc>,
}

impl ChatSession {
    /// Start a session titled after the opening message.
    pub fn start(
        session_id: impl Into<String>,
        first_message: &str,
        context: Option<&str>,
    ) -> Self {
        let now = Utc::now();
        Self {
            session_id: session_id.into(),
            title: session_title(first_message),
            messages: Vec::new(),
            context: context.unwrap_or_default().to_string(),
            created_at: now,
            last_activity: now,
        }
    }

    /// Append a message and refresh the activity timestamp.
    pub fn push(&mut self, message: ChatMessage) {
        self.last_activity = Utc::now();
        self.messages.push(message);
    }

    /// The trailing message window embedded in prompts.
    pub fn recent_messages(&self) -> &[ChatMessage] {
        let start = self.messages.len().saturating_sub(HISTORY_WINDOW);
        &self.messages[start..]
    }

    /// Listing view of this session, without the messages.
    pub fn summary(&self) -> SessionSummary {
        SessionSummary {
            session_id: self.session_id.clone(),
            title: self.title.clone(),
            last_activity: self.last_activity,
            created_at: self.created_at,
        }
    }
}

/// Derive a session title from the opening message.
pub fn session_title(first_message: &str) -> String {
    let mut title: String = first_message.chars().take(TITLE_MAX_CHARS).collect();
    if first_message.chars().count() > TITLE_MAX_CHARS {
        title.push_str("...");
    }
    title
}

/// Session listing entry.
#[derive(Serialize, Deserialize, Clone, Debug)]
#[serde(rename_all = "camelCase")]
pub struct SessionSummary {
    pub session_id: String,
    pub title: String,
    pub last_activity: DateTime<Utc>,
    pub created_at: DateTime<Utc>,
}

/// Inbound chat turn. A missing session id starts a new session.
#[derive(Serialize, Deserialize, Clone, Debug)]
#[serde(rename_all = "camelCase")]
pub struct ChatTurn {
    pub message: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub session_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub context: Option<String>,
}

impl ChatTurn {
    /// Create a turn that starts a new session.
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            session_id: None,
            context: None,
        }
    }

    /// Address an existing session.
    pub fn with_session(mut self, session_id: impl Into<String>) -> Self {
        self.session_id = Some(session_id.into());
        self
    }

    /// Attach exercise context for the tutor.
    pub fn with_context(mut self, context: impl Into<String>) -> Self {
        self.context = Some(context.into());
        self
    }
}

/// Outbound chat reply.
#[derive(Serialize, Deserialize, Clone, Debug)]
#[serde(rename_all = "camelCase")]
pub struct ChatReply {
    #[serde(rename = "response")]
    pub reply: String,
    pub session_id: String,
    pub message_count: usize,
}
