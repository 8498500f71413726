//! logic_core - Domain types for the logic tutoring agent
//!
//! Shared request, answer, history and chat types plus environment
//! configuration, used by the client, pipeline and store crates.

pub mod answer;
pub mod chat;
pub mod config;
pub mod history;
pub mod request;

pub use answer::{AgentAnswer, DiagramAnswer, Difficulty, LogicAnswer};
pub use chat::{ChatMessage, ChatReply, ChatRole, ChatSession, ChatTurn, SessionSummary};
pub use config::AgentConfig;
pub use history::{
    DiagramRecord, HistoryPage, LogicRecord, NewDiagramRecord, NewLogicRecord, PageRequest,
    Pagination,
};
pub use request::{GenerationMode, GenerationRequest};
