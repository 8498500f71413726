//! History records - Persisted results and paging types
//!
//! Records are immutable once stored: they are inserted when a result passes
//! validation and removed only by id. Reads are pages ordered newest first.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::answer::{DiagramAnswer, LogicAnswer};
use crate::request::{GenerationMode, GenerationRequest};

/// A stored logic result. Echoes the request inputs and the validated answer.
#[derive(Serialize, Deserialize, Clone, Debug)]
#[serde(rename_all = "camelCase")]
pub struct LogicRecord {
    pub id: String,
    pub mode: GenerationMode,
    pub problem_statement: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub options: Option<Vec<String>>,
    #[serde(flatten)]
    pub answer: LogicAnswer,
    pub created_at: DateTime<Utc>,
}

/// A stored diagram result.
#[derive(Serialize, Deserialize, Clone, Debug)]
#[serde(rename_all = "camelCase")]
pub struct DiagramRecord {
    pub id: String,
    pub problem_statement: String,
    #[serde(rename = "mermaid")]
    pub graph_source: String,
    pub created_at: DateTime<Utc>,
}

/// Draft of a logic record; the store assigns the id at insert.
#[derive(Clone, Debug)]
pub struct NewLogicRecord {
    pub mode: GenerationMode,
    pub problem_statement: String,
    pub options: Option<Vec<String>>,
    pub answer: LogicAnswer,
    pub created_at: DateTime<Utc>,
}

impl NewLogicRecord {
    /// Pair a validated answer with the request that produced it.
    pub fn from_request(request: &GenerationRequest, answer: LogicAnswer) -> Self {
        Self {
            mode: request.mode,
            problem_statement: request.problem_statement.clone(),
            options: request.options.clone(),
            answer,
            created_at: Utc::now(),
        }
    }
}

/// Draft of a diagram record; the store assigns the id at insert.
#[derive(Clone, Debug)]
pub struct NewDiagramRecord {
    pub problem_statement: String,
    pub graph_source: String,
    pub created_at: DateTime<Utc>,
}

impl NewDiagramRecord {
    /// Pair a validated flowchart with the request that produced it.
    pub fn from_request(request: &GenerationRequest, answer: DiagramAnswer) -> Self {
        Self {
            problem_statement: request.problem_statement.clone(),
            graph_source: answer.graph_source,
            created_at: Utc::now(),
        }
    }
}

/// Page selector for history reads. Values below 1 are treated as 1.
#[derive(Serialize, Deserialize, Clone, Copy, Debug, PartialEq, Eq)]
pub struct PageRequest {
    pub page: u32,
    pub limit: u32,
}

impl Default for PageRequest {
    fn default() -> Self {
        Self { page: 1, limit: 20 }
    }
}

impl PageRequest {
    pub fn new(page: u32, limit: u32) -> Self {
        Self { page, limit }
    }

    /// Clamp page and limit to at least 1.
    pub fn normalized(self) -> Self {
        Self {
            page: self.page.max(1),
            limit: self.limit.max(1),
        }
    }

    /// Index of the first entry covered by this page.
    pub fn offset(self) -> u32 {
        let normalized = self.normalized();
        (normalized.page - 1) * normalized.limit
    }
}

/// Paging metadata returned with every history page.
#[derive(Serialize, Deserialize, Clone, Copy, Debug, PartialEq, Eq)]
pub struct Pagination {
    pub current: u32,
    pub pages: u32,
    pub total: u64,
}

impl Pagination {
    /// Compute metadata for a page selector over a total row count.
    pub fn for_page(selector: PageRequest, total: u64) -> Self {
        let normalized = selector.normalized();
        Self {
            current: normalized.page,
            pages: total.div_ceil(normalized.limit as u64) as u32,
            total,
        }
    }
}

/// One page of history entries, newest first.
#[derive(Serialize, Deserialize, Clone, Debug)]
pub struct HistoryPage<T> {
    pub history: Vec<T>,
    pub pagination: Pagination,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::answer::Difficulty;

    fn sample_answer() -> LogicAnswer {
        LogicAnswer {
            answer: "42".to_string(),
            explanation: "Aritmética básica".to_string(),
            category: "calculo".to_string(),
            difficulty: Difficulty::Easy,
        }
    }

    #[test]
    fn test_logic_record_flattens_answer_fields() {
        let record = LogicRecord {
            id: "abc".to_string(),
            mode: GenerationMode::Explain,
            problem_statement: "¿Cuánto es 6x7?".to_string(),
            options: None,
            answer: sample_answer(),
            created_at: Utc::now(),
        };
        let json = serde_json::to_value(&record).unwrap();
        assert_eq!(json["problemStatement"], "¿Cuánto es 6x7?");
        assert_eq!(json["respuesta"], "42");
        assert_eq!(json["nivel"], "fácil");
        assert!(json.get("answer").is_none());
    }

    #[test]
    fn test_new_record_echoes_request_inputs() {
        let request = GenerationRequest::new(GenerationMode::Code, "Suma dos números")
            .with_options(vec!["a".to_string()]);
        let draft = NewLogicRecord::from_request(&request, sample_answer());
        assert_eq!(draft.mode, GenerationMode::Code);
        assert_eq!(draft.problem_statement, "Suma dos números");
        assert_eq!(draft.options.as_deref(), Some(&["a".to_string()][..]));
    }

    #[test]
    fn test_page_request_defaults_and_offset() {
        let selector = PageRequest::default();
        assert_eq!((selector.page, selector.limit), (1, 20));
        assert_eq!(selector.offset(), 0);
        assert_eq!(PageRequest::new(3, 20).offset(), 40);
        // Zero values clamp instead of underflowing.
        assert_eq!(PageRequest::new(0, 0).offset(), 0);
    }

    #[test]
    fn test_pagination_math() {
        assert_eq!(
            Pagination::for_page(PageRequest::new(1, 20), 0),
            Pagination {
                current: 1,
                pages: 0,
                total: 0
            }
        );
        assert_eq!(Pagination::for_page(PageRequest::new(2, 20), 41).pages, 3);
        assert_eq!(Pagination::for_page(PageRequest::new(2, 20), 40).pages, 2);
    }
}
