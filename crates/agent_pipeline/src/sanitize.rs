//! Textual cleanup of raw model output.
//!
//! Models wrap answers in Markdown fences and decorate Mermaid nodes with
//! syntax the renderer chokes on. Sanitization strips the wrapping and
//! repairs the known failure shapes before validation ever sees the text.
//! Rules run in a fixed order; each one is narrow enough to leave already
//! clean output untouched, so the pass is idempotent.

use once_cell::sync::Lazy;
use regex::{Captures, Regex};

/// Shape the contract expects the model's text to take after cleanup.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExpectedFormat {
    /// A single flat JSON object.
    Json,
    /// Mermaid flowchart source.
    MermaidGraph,
}

impl ExpectedFormat {
    pub fn as_str(&self) -> &'static str {
        match self {
            ExpectedFormat::Json => "json",
            ExpectedFormat::MermaidGraph => "mermaid graph",
        }
    }
}

/// Markdown code fence marker, with or without a language tag, and the line
/// break that follows it when there is one.
static FENCE_MARKER: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?i)```[a-z0-9]*[ \t]*\r?\n?").unwrap());

/// Semicolons at the end of a line. Mermaid tolerates them but the renderer
/// downstream does not.
static LINE_END_SEMICOLON: Lazy<Regex> = Lazy::new(|| Regex::new(r";+(\r?\n)").unwrap());

/// A round node whose whole label is a quoted string: `("texto")`.
static QUOTED_ROUND_NODE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r#"\(\s*"([^"()]*)"\s*\)"#).unwrap());

/// Parentheses inside a square-bracket node label.
static PAREN_IN_SQUARE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\[([^\[\]()]*)\(([^()\]]*)\)([^\[\]]*)\]").unwrap());

/// Parentheses inside a curly (decision) node label.
static PAREN_IN_CURLY: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\{([^{}()]*)\(([^(){}]*)\)([^{}]*)\}").unwrap());

/// Any remaining quoted span, for example in edge labels.
static QUOTED_SPAN: Lazy<Regex> = Lazy::new(|| Regex::new(r#""([^"]*)""#).unwrap());

/// Clean raw model text into the shape `format` calls for.
pub fn sanitize(raw: &str, format: ExpectedFormat) -> String {
    let stripped = strip_fences(raw);
    match format {
        ExpectedFormat::Json => stripped,
        ExpectedFormat::MermaidGraph => repair_graph(&stripped),
    }
}

/// Remove Markdown code fence markers anywhere in the text and trim the
/// surrounding whitespace. The fenced content itself is kept verbatim.
pub fn strip_fences(raw: &str) -> String {
    FENCE_MARKER.replace_all(raw, "").trim().to_string()
}

/// Repair the Mermaid constructs the renderer rejects: statement-terminating
/// semicolons, parentheses and quotes inside node labels, and doubled square
/// brackets. Quoted round nodes become square nodes so their label survives
/// the later quote strip.
pub fn repair_graph(source: &str) -> String {
    let source = LINE_END_SEMICOLON.replace_all(source, "$1");
    let source = QUOTED_ROUND_NODE.replace_all(&source, "[$1]");
    let source = PAREN_IN_SQUARE.replace_all(&source, |caps: &Captures| {
        rewrite_label("[", "]", &caps[1], &caps[2], &caps[3])
    });
    let source = PAREN_IN_CURLY.replace_all(&source, |caps: &Captures| {
        rewrite_label("{", "}", &caps[1], &caps[2], &caps[3])
    });
    let source = source.replace("[[", "[").replace("]]", "]");
    let source = QUOTED_SPAN.replace_all(&source, "$1");
    source.trim().to_string()
}

/// Join a node label back together with the parentheses dropped, keeping a
/// single space between the head text and what the parentheses held.
fn rewrite_label(open: &str, close: &str, head: &str, inner: &str, tail: &str) -> String {
    let head = head.trim_end();
    if head.is_empty() {
        format!("{open}{inner}{tail}{close}")
    } else {
        format!("{open}{head} {inner}{tail}{close}")
    }
}
