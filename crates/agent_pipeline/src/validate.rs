//! Contract validation of sanitized model output.
//!
//! The model promises a flat four-field JSON object for logic answers and a
//! Mermaid flowchart for diagrams. Validation is the gate that turns loose
//! text into a typed answer; anything that does not meet the contract is
//! rejected with the raw model text attached, never coerced or patched up.

use logic_core::{DiagramAnswer, Difficulty, LogicAnswer};
use serde_json::Value;

use crate::error::AgentError;
use crate::sanitize::ExpectedFormat;

/// Field names the flat JSON contract requires, in reporting order.
pub const REQUIRED_FIELDS: [&str; 4] = ["respuesta", "explicacion", "tipo", "nivel"];

/// Graph headers the diagram contract accepts.
pub const GRAPH_KEYWORDS: [&str; 2] = ["graph TD", "graph LR"];

/// Check sanitized text against the logic answer contract.
///
/// `raw` is the pre-sanitized model text; it rides along on every rejection
/// so callers can see what the model actually said.
pub fn validate_logic(sanitized: &str, raw: &str) -> Result<LogicAnswer, AgentError> {
    let value: Value =
        serde_json::from_str(sanitized).map_err(|error| AgentError::InvalidModelOutput {
            expected: ExpectedFormat::Json.as_str(),
            detail: error.to_string(),
            raw: raw.to_string(),
        })?;

    let object = match value.as_object() {
        Some(object) => object,
        None => return Err(violation("output is valid JSON but not an object", raw)),
    };

    for field in REQUIRED_FIELDS {
        let text = match object.get(field) {
            Some(Value::String(text)) => text,
            Some(_) => {
                return Err(violation(format!("field \"{field}\" must be a string"), raw));
            }
            None => return Err(violation(format!("missing field \"{field}\""), raw)),
        };
        if text.trim().is_empty() {
            return Err(violation(format!("field \"{field}\" must not be empty"), raw));
        }
        if field == "nivel" && Difficulty::parse(text).is_none() {
            return Err(violation(
                format!(
                    "field \"nivel\" must be one of {} (got \"{text}\")",
                    Difficulty::wire_values().join(", ")
                ),
                raw,
            ));
        }
    }

    serde_json::from_value(value)
        .map_err(|error| violation(format!("answer does not fit the contract: {error}"), raw))
}

/// Check sanitized text against the diagram contract.
pub fn validate_diagram(sanitized: &str, raw: &str) -> Result<DiagramAnswer, AgentError> {
    if !GRAPH_KEYWORDS
        .iter()
        .any(|keyword| sanitized.contains(keyword))
    {
        return Err(violation(
            "diagram must declare graph TD or graph LR",
            raw,
        ));
    }
    if sanitized.contains("[[") || sanitized.contains("]]") {
        return Err(violation("diagram still contains doubled brackets", raw));
    }

    Ok(DiagramAnswer {
        graph_source: sanitized.to_string(),
    })
}

fn violation(detail: impl Into<String>, raw: &str) -> AgentError {
    AgentError::ContractViolation {
        detail: detail.into(),
        raw: raw.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorKind;

    const GOOD: &str = r#"{"respuesta":"A es falso","explicacion":"Modus tollens","tipo":"deduccion","nivel":"fácil"}"#;

    fn kind_of(result: Result<LogicAnswer, AgentError>) -> ErrorKind {
        result.unwrap_err().kind()
    }

    #[test]
    fn test_accepts_complete_logic_answer() {
        let answer = validate_logic(GOOD, GOOD).unwrap();
        assert_eq!(answer.answer, "A es falso");
        assert_eq!(answer.explanation, "Modus tollens");
        assert_eq!(answer.category, "deduccion");
        assert_eq!(answer.difficulty, Difficulty::Easy);
    }

    #[test]
    fn test_unparseable_text_is_invalid_model_output() {
        let raw = "Lo siento, no puedo responder en JSON.";
        let error = validate_logic(raw, raw).unwrap_err();
        assert_eq!(error.kind(), ErrorKind::InvalidModelOutput);
        assert_eq!(error.raw(), Some(raw));
    }

    #[test]
    fn test_missing_any_required_field_is_a_contract_violation() {
        for field in REQUIRED_FIELDS {
            let mut value: serde_json::Value = serde_json::from_str(GOOD).unwrap();
            value.as_object_mut().unwrap().remove(field);
            let text = value.to_string();
            let error = validate_logic(&text, &text).unwrap_err();
            assert_eq!(error.kind(), ErrorKind::ContractViolation);
            assert!(error.to_string().contains(field));
        }
    }

    #[test]
    fn test_rejects_empty_and_non_string_fields() {
        let empty = r#"{"respuesta":"  ","explicacion":"e","tipo":"t","nivel":"medio"}"#;
        assert_eq!(
            kind_of(validate_logic(empty, empty)),
            ErrorKind::ContractViolation
        );

        let numeric = r#"{"respuesta":42,"explicacion":"e","tipo":"t","nivel":"medio"}"#;
        assert_eq!(
            kind_of(validate_logic(numeric, numeric)),
            ErrorKind::ContractViolation
        );
    }

    #[test]
    fn test_rejects_difficulty_outside_the_contract() {
        for nivel in ["facil", "FÁCIL", "hard", "media"] {
            let text = format!(
                r#"{{"respuesta":"r","explicacion":"e","tipo":"t","nivel":"{nivel}"}}"#
            );
            let error = validate_logic(&text, &text).unwrap_err();
            assert_eq!(error.kind(), ErrorKind::ContractViolation);
            assert!(error.to_string().contains("nivel"));
        }
    }

    #[test]
    fn test_rejects_non_object_json() {
        for text in ["[1,2,3]", "\"respuesta\"", "42"] {
            assert_eq!(
                kind_of(validate_logic(text, text)),
                ErrorKind::ContractViolation
            );
        }
    }

    #[test]
    fn test_accepts_graph_with_either_orientation() {
        let td = "graph TD\n  A[Inicio]\n  A-->B";
        assert_eq!(validate_diagram(td, td).unwrap().graph_source, td);

        let lr = "graph LR\n  A-->B";
        assert_eq!(validate_diagram(lr, lr).unwrap().graph_source, lr);
    }

    #[test]
    fn test_rejects_text_without_graph_declaration() {
        let prose = "flowchart: start, read, end";
        let error = validate_diagram(prose, prose).unwrap_err();
        assert_eq!(error.kind(), ErrorKind::ContractViolation);
    }

    #[test]
    fn test_never_accepts_doubled_brackets() {
        let source = "graph TD\n  A[[Inicio]]\n  A-->B";
        let error = validate_diagram(source, source).unwrap_err();
        assert_eq!(error.kind(), ErrorKind::ContractViolation);
        assert!(error.to_string().contains("doubled brackets"));
    }
}
