use std::path::{Path, PathBuf};
use std::sync::Arc;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use rusqlite::{params, Connection, OptionalExtension};
use thiserror::Error;
use tokio::sync::OnceCell;
use uuid::Uuid;

use logic_core::{
    ChatSession, DiagramRecord, Difficulty, GenerationMode, HistoryPage, LogicAnswer, LogicRecord,
    NewDiagramRecord, NewLogicRecord, PageRequest, Pagination, SessionSummary,
};

pub type StoreResult<T> = Result<T, StoreError>;

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("sqlite error: {0}")]
    Sqlite(#[from] rusqlite::Error),

    #[error("time parse error: {0}")]
    Chrono(#[from] chrono::ParseError),

    #[error("json column error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    #[error("storage task join error: {0}")]
    Task(String),

    #[error("invalid stored data: {0}")]
    InvalidData(String),
}

/// Persistence for accepted logic and diagram results.
#[async_trait]
pub trait HistoryStore: Send + Sync {
    /// Insert an accepted logic result and return its assigned id.
    async fn insert_logic(&self, record: NewLogicRecord) -> StoreResult<String>;

    /// Insert an accepted diagram result and return its assigned id.
    async fn insert_diagram(&self, record: NewDiagramRecord) -> StoreResult<String>;

    /// Read one page of logic records, newest first.
    async fn logic_page(&self, selector: PageRequest) -> StoreResult<HistoryPage<LogicRecord>>;

    /// Read one page of diagram records, newest first.
    async fn diagram_page(&self, selector: PageRequest) -> StoreResult<HistoryPage<DiagramRecord>>;

    /// Delete a logic record. Returns false when the id did not exist.
    async fn delete_logic(&self, id: &str) -> StoreResult<bool>;

    /// Delete a diagram record. Returns false when the id did not exist.
    async fn delete_diagram(&self, id: &str) -> StoreResult<bool>;
}

/// Persistence for tutoring chat sessions.
#[async_trait]
pub trait SessionStore: Send + Sync {
    /// Insert or update a session. Title and context are fixed at creation.
    async fn save_session(&self, session: &ChatSession) -> StoreResult<()>;

    /// Load a session by id.
    async fn session(&self, session_id: &str) -> StoreResult<Option<ChatSession>>;

    /// Delete a session. Returns false when the id did not exist.
    async fn delete_session(&self, session_id: &str) -> StoreResult<bool>;

    /// Most recently active sessions, without their messages.
    async fn recent_sessions(&self, limit: u32) -> StoreResult<Vec<SessionSummary>>;
}

/// SQLite-backed store.
///
/// Holds only the database path; every operation opens its own connection on
/// the blocking pool. The schema is created exactly once per process, guarded
/// so concurrent first uses do not race.
#[derive(Debug, Clone)]
pub struct SqliteHistoryStore {
    db_path: PathBuf,
    schema_ready: Arc<OnceCell<()>>,
}

impl SqliteHistoryStore {
    pub fn new(db_path: impl AsRef<Path>) -> Self {
        Self {
            db_path: db_path.as_ref().to_path_buf(),
            schema_ready: Arc::new(OnceCell::new()),
        }
    }

    /// Eagerly create the schema. Optional; first use does the same.
    pub async fn init(&self) -> StoreResult<()> {
        self.ensure_schema().await
    }

    async fn ensure_schema(&self) -> StoreResult<()> {
        let db_path = self.db_path.clone();
        self.schema_ready
            .get_or_try_init(|| async move {
                tokio::task::spawn_blocking(move || {
                    let connection = open_connection(&db_path)?;
                    create_schema(&connection)
                })
                .await
                .map_err(|error| StoreError::Task(error.to_string()))?
            })
            .await
            .map(|_| ())
    }

    async fn with_connection<T, F>(&self, func: F) -> StoreResult<T>
    where
        T: Send + 'static,
        F: FnOnce(&Connection) -> StoreResult<T> + Send + 'static,
    {
        self.ensure_schema().await?;
        let db_path = self.db_path.clone();
        tokio::task::spawn_blocking(move || {
            let connection = open_connection(&db_path)?;
            func(&connection)
        })
        .await
        .map_err(|error| StoreError::Task(error.to_string()))?
    }
}

#[async_trait]
impl HistoryStore for SqliteHistoryStore {
    async fn insert_logic(&self, record: NewLogicRecord) -> StoreResult<String> {
        let id = Uuid::new_v4().to_string();
        let row_id = id.clone();
        let created_at = format_timestamp(record.created_at);
        let options_json = record
            .options
            .as_ref()
            .map(serde_json::to_string)
            .transpose()?;

        self.with_connection(move |connection| {
            connection.execute(
                r#"
                INSERT INTO logic_history
                    (id, mode, problem_statement, options, answer, explanation, category, difficulty, created_at)
                VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9)
                "#,
                params![
                    row_id,
                    record.mode.as_str(),
                    record.problem_statement,
                    options_json,
                    record.answer.answer,
                    record.answer.explanation,
                    record.answer.category,
                    record.answer.difficulty.as_str(),
                    created_at,
                ],
            )?;
            Ok(())
        })
        .await?;

        log::debug!("stored logic record {}", id);
        Ok(id)
    }

    async fn insert_diagram(&self, record: NewDiagramRecord) -> StoreResult<String> {
        let id = Uuid::new_v4().to_string();
        let row_id = id.clone();
        let created_at = format_timestamp(record.created_at);

        self.with_connection(move |connection| {
            connection.execute(
                r#"
                INSERT INTO diagram_history (id, problem_statement, graph_source, created_at)
                VALUES (?1, ?2, ?3, ?4)
                "#,
                params![row_id, record.problem_statement, record.graph_source, created_at],
            )?;
            Ok(())
        })
        .await?;

        log::debug!("stored diagram record {}", id);
        Ok(id)
    }

    async fn logic_page(&self, selector: PageRequest) -> StoreResult<HistoryPage<LogicRecord>> {
        let normalized = selector.normalized();
        let offset = selector.offset();

        self.with_connection(move |connection| {
            let total = count_rows(connection, "logic_history")?;

            let mut stmt = connection.prepare(
                r#"
                SELECT id, mode, problem_statement, options, answer, explanation, category, difficulty, created_at
                FROM logic_history
                ORDER BY created_at DESC, rowid DESC
                LIMIT ?1 OFFSET ?2
                "#,
            )?;
            let mut rows = stmt.query(params![normalized.limit, offset])?;

            let mut history = Vec::new();
            while let Some(row) = rows.next()? {
                history.push(logic_record_from_row(row)?);
            }

            Ok(HistoryPage {
                history,
                pagination: Pagination::for_page(normalized, total),
            })
        })
        .await
    }

    async fn diagram_page(&self, selector: PageRequest) -> StoreResult<HistoryPage<DiagramRecord>> {
        let normalized = selector.normalized();
        let offset = selector.offset();

        self.with_connection(move |connection| {
            let total = count_rows(connection, "diagram_history")?;

            let mut stmt = connection.prepare(
                r#"
                SELECT id, problem_statement, graph_source, created_at
                FROM diagram_history
                ORDER BY created_at DESC, rowid DESC
                LIMIT ?1 OFFSET ?2
                "#,
            )?;
            let mut rows = stmt.query(params![normalized.limit, offset])?;

            let mut history = Vec::new();
            while let Some(row) = rows.next()? {
                history.push(DiagramRecord {
                    id: row.get(0)?,
                    problem_statement: row.get(1)?,
                    graph_source: row.get(2)?,
                    created_at: parse_timestamp(row.get(3)?)?,
                });
            }

            Ok(HistoryPage {
                history,
                pagination: Pagination::for_page(normalized, total),
            })
        })
        .await
    }

    async fn delete_logic(&self, id: &str) -> StoreResult<bool> {
        let id = id.to_string();
        let deleted = self
            .with_connection(move |connection| {
                Ok(connection.execute("DELETE FROM logic_history WHERE id = ?1", params![id])?)
            })
            .await?;
        Ok(deleted > 0)
    }

    async fn delete_diagram(&self, id: &str) -> StoreResult<bool> {
        let id = id.to_string();
        let deleted = self
            .with_connection(move |connection| {
                Ok(connection.execute("DELETE FROM diagram_history WHERE id = ?1", params![id])?)
            })
            .await?;
        Ok(deleted > 0)
    }
}

#[async_trait]
impl SessionStore for SqliteHistoryStore {
    async fn save_session(&self, session: &ChatSession) -> StoreResult<()> {
        let session_id = session.session_id.clone();
        let title = session.title.clone();
        let messages_json = serde_json::to_string(&session.messages)?;
        let context = session.context.clone();
        let created_at = format_timestamp(session.created_at);
        let last_activity = format_timestamp(session.last_activity);

        self.with_connection(move |connection| {
            connection.execute(
                r#"
                INSERT INTO chat_sessions
                    (session_id, title, messages, context, created_at, last_activity)
                VALUES (?1, ?2, ?3, ?4, ?5, ?6)
                ON CONFLICT(session_id) DO UPDATE SET
                    messages = excluded.messages,
                    last_activity = excluded.last_activity
                "#,
                params![session_id, title, messages_json, context, created_at, last_activity],
            )?;
            Ok(())
        })
        .await
    }

    async fn session(&self, session_id: &str) -> StoreResult<Option<ChatSession>> {
        let session_id = session_id.to_string();

        self.with_connection(move |connection| {
            let row = connection
                .query_row(
                    r#"
                    SELECT session_id, title, messages, context, created_at, last_activity
                    FROM chat_sessions
                    WHERE session_id = ?1
                    "#,
                    params![session_id],
                    |row| {
                        Ok((
                            row.get::<_, String>(0)?,
                            row.get::<_, String>(1)?,
                            row.get::<_, String>(2)?,
                            row.get::<_, String>(3)?,
                            row.get::<_, String>(4)?,
                            row.get::<_, String>(5)?,
                        ))
                    },
                )
                .optional()?;

            match row {
                Some((session_id, title, messages_raw, context, created_raw, activity_raw)) => {
                    Ok(Some(ChatSession {
                        session_id,
                        title,
                        messages: serde_json::from_str(&messages_raw)?,
                        context,
                        created_at: parse_timestamp(created_raw)?,
                        last_activity: parse_timestamp(activity_raw)?,
                    }))
                }
                None => Ok(None),
            }
        })
        .await
    }

    async fn delete_session(&self, session_id: &str) -> StoreResult<bool> {
        let session_id = session_id.to_string();
        let deleted = self
            .with_connection(move |connection| {
                Ok(connection.execute(
                    "DELETE FROM chat_sessions WHERE session_id = ?1",
                    params![session_id],
                )?)
            })
            .await?;
        Ok(deleted > 0)
    }

    async fn recent_sessions(&self, limit: u32) -> StoreResult<Vec<SessionSummary>> {
        self.with_connection(move |connection| {
            let mut stmt = connection.prepare(
                r#"
                SELECT session_id, title, last_activity, created_at
                FROM chat_sessions
                ORDER BY last_activity DESC
                LIMIT ?1
                "#,
            )?;
            let mut rows = stmt.query(params![limit])?;

            let mut summaries = Vec::new();
            while let Some(row) = rows.next()? {
                summaries.push(SessionSummary {
                    session_id: row.get(0)?,
                    title: row.get(1)?,
                    last_activity: parse_timestamp(row.get(2)?)?,
                    created_at: parse_timestamp(row.get(3)?)?,
                });
            }
            Ok(summaries)
        })
        .await
    }
}

fn open_connection(path: &Path) -> StoreResult<Connection> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?;
    }
    let connection = Connection::open(path)?;
    connection.execute_batch(
        r#"
        PRAGMA journal_mode = WAL;
        PRAGMA foreign_keys = ON;
        PRAGMA synchronous = NORMAL;
        "#,
    )?;
    Ok(connection)
}

fn create_schema(connection: &Connection) -> StoreResult<()> {
    connection.execute_batch(
        r#"
        CREATE TABLE IF NOT EXISTS logic_history (
            id TEXT PRIMARY KEY,
            mode TEXT NOT NULL,
            problem_statement TEXT NOT NULL,
            options TEXT,
            answer TEXT NOT NULL,
            explanation TEXT NOT NULL,
            category TEXT NOT NULL,
            difficulty TEXT NOT NULL,
            created_at TEXT NOT NULL
        );

        CREATE TABLE IF NOT EXISTS diagram_history (
            id TEXT PRIMARY KEY,
            problem_statement TEXT NOT NULL,
            graph_source TEXT NOT NULL,
            created_at TEXT NOT NULL
        );

        CREATE TABLE IF NOT EXISTS chat_sessions (
            session_id TEXT PRIMARY KEY,
            title TEXT NOT NULL,
            messages TEXT NOT NULL,
            context TEXT NOT NULL DEFAULT '',
            created_at TEXT NOT NULL,
            last_activity TEXT NOT NULL
        );

        CREATE INDEX IF NOT EXISTS idx_logic_created_at ON logic_history(created_at);
        CREATE INDEX IF NOT EXISTS idx_diagram_created_at ON diagram_history(created_at);
        CREATE INDEX IF NOT EXISTS idx_sessions_last_activity ON chat_sessions(last_activity);
        "#,
    )?;
    log::debug!("history schema ready");
    Ok(())
}

fn count_rows(connection: &Connection, table: &str) -> StoreResult<u64> {
    // Table names come from the fixed set above, never from callers.
    let count: i64 =
        connection.query_row(&format!("SELECT COUNT(*) FROM {table}"), [], |row| row.get(0))?;
    Ok(count as u64)
}

fn logic_record_from_row(row: &rusqlite::Row<'_>) -> StoreResult<LogicRecord> {
    let mode_raw: String = row.get(1)?;
    let mode = GenerationMode::parse(&mode_raw)
        .ok_or_else(|| StoreError::InvalidData(format!("unknown mode: {mode_raw}")))?;

    let options = row
        .get::<_, Option<String>>(3)?
        .map(|raw| serde_json::from_str(&raw))
        .transpose()?;

    let difficulty_raw: String = row.get(7)?;
    let difficulty = Difficulty::parse(&difficulty_raw)
        .ok_or_else(|| StoreError::InvalidData(format!("unknown difficulty: {difficulty_raw}")))?;

    Ok(LogicRecord {
        id: row.get(0)?,
        mode,
        problem_statement: row.get(2)?,
        options,
        answer: LogicAnswer {
            answer: row.get(4)?,
            explanation: row.get(5)?,
            category: row.get(6)?,
            difficulty,
        },
        created_at: parse_timestamp(row.get(8)?)?,
    })
}

fn format_timestamp(timestamp: DateTime<Utc>) -> String {
    timestamp.to_rfc3339()
}

fn parse_timestamp(raw: String) -> StoreResult<DateTime<Utc>> {
    Ok(DateTime::parse_from_rfc3339(&raw)?.with_timezone(&Utc))
}
