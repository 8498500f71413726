//! Validated answers - Typed results the pipeline can produce
//!
//! Field names on the wire follow the established Spanish output contract;
//! the Rust side uses English names throughout.

use serde::{Deserialize, Serialize};

/// Difficulty grade of a solved problem.
#[derive(Serialize, Deserialize, Clone, Copy, Debug, PartialEq, Eq)]
pub enum Difficulty {
    #[serde(rename = "fácil")]
    Easy,
    #[serde(rename = "medio")]
    Medium,
    #[serde(rename = "difícil")]
    Hard,
}

impl Difficulty {
    /// Wire value of this grade.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Easy => "fácil",
            Self::Medium => "medio",
            Self::Hard => "difícil",
        }
    }

    /// Parse a wire value. Matching is exact; the output contract is closed.
    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "fácil" => Some(Self::Easy),
            "medio" => Some(Self::Medium),
            "difícil" => Some(Self::Hard),
            _ => None,
        }
    }

    /// All wire values, for diagnostics.
    pub fn wire_values() -> [&'static str; 3] {
        ["fácil", "medio", "difícil"]
    }
}

/// Structured solution for `explain` and `code` requests.
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq, Eq)]
pub struct LogicAnswer {
    #[serde(rename = "respuesta")]
    pub answer: String,
    #[serde(rename = "explicacion")]
    pub explanation: String,
    #[serde(rename = "tipo")]
    pub category: String,
    #[serde(rename = "nivel")]
    pub difficulty: Difficulty,
}

/// Mermaid flowchart for `diagram` requests.
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq, Eq)]
pub struct DiagramAnswer {
    #[serde(rename = "mermaid")]
    pub graph_source: String,
}

/// Either result shape a generation call can yield.
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq, Eq)]
#[serde(untagged)]
pub enum AgentAnswer {
    Logic(LogicAnswer),
    Diagram(DiagramAnswer),
}

impl AgentAnswer {
    /// Get the structured solution if this is a logic answer.
    pub fn as_logic(&self) -> Option<&LogicAnswer> {
        match self {
            Self::Logic(answer) => Some(answer),
            Self::Diagram(_) => None,
        }
    }

    /// Get the flowchart if this is a diagram answer.
    pub fn as_diagram(&self) -> Option<&DiagramAnswer> {
        match self {
            Self::Diagram(answer) => Some(answer),
            Self::Logic(_) => None,
        }
    }
}

impl From<LogicAnswer> for AgentAnswer {
    fn from(answer: LogicAnswer) -> Self {
        Self::Logic(answer)
    }
}

impl From<DiagramAnswer> for AgentAnswer {
    fn from(answer: DiagramAnswer) -> Self {
        Self::Diagram(answer)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_difficulty_wire_values() {
        assert_eq!(
            serde_json::to_string(&Difficulty::Easy).unwrap(),
            "\"fácil\""
        );
        assert_eq!(
            serde_json::to_string(&Difficulty::Hard).unwrap(),
            "\"difícil\""
        );
        assert_eq!(Difficulty::parse("medio"), Some(Difficulty::Medium));
        assert_eq!(Difficulty::parse("Medio"), None);
        assert_eq!(Difficulty::parse("hard"), None);
    }

    #[test]
    fn test_logic_answer_from_contract_json() {
        let json = r#"{
            "respuesta": "A es falso",
            "explicacion": "Modus tollens",
            "tipo": "deduccion",
            "nivel": "fácil"
        }"#;
        let answer: LogicAnswer = serde_json::from_str(json).unwrap();
        assert_eq!(answer.answer, "A es falso");
        assert_eq!(answer.explanation, "Modus tollens");
        assert_eq!(answer.category, "deduccion");
        assert_eq!(answer.difficulty, Difficulty::Easy);
    }

    #[test]
    fn test_logic_answer_rejects_unknown_level() {
        let json = r#"{"respuesta":"x","explicacion":"y","tipo":"z","nivel":"imposible"}"#;
        assert!(serde_json::from_str::<LogicAnswer>(json).is_err());
    }

    #[test]
    fn test_agent_answer_serializes_flat() {
        let answer = AgentAnswer::Diagram(DiagramAnswer {
            graph_source: "graph TD\n  A-->B".to_string(),
        });
        let json = serde_json::to_value(&answer).unwrap();
        assert_eq!(json["mermaid"], "graph TD\n  A-->B");
        assert!(answer.as_diagram().is_some());
        assert!(answer.as_logic().is_none());
    }
}
