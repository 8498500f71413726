//! history_store - Persistence for accepted results and chat sessions
//!
//! SQLite-backed store behind async traits. History records are immutable:
//! accepted results are inserted, read in pages newest first, and removed
//! only by id. The schema is created once per process on first use.

pub mod storage;

pub use storage::{HistoryStore, SessionStore, SqliteHistoryStore, StoreError, StoreResult};
