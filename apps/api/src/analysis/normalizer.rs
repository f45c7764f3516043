//! Pulls the JSON-bearing text out of whatever shape the gateway replied with.
//!
//! Gateways wrap the same payload differently, so this is tolerant rather
//! than prescriptive: it never fails, and anything it does not recognise is
//! handed on verbatim for the validator to reject.

use serde_json::Value;

/// The response shapes we know how to read, in the order they are tried.
#[derive(Debug, PartialEq)]
enum GatewayPayload<'a> {
    /// `{"output_text": "..."}`
    FlatText(&'a Value),
    /// `{"candidates": [{"content": {"parts": [{"text": "..."}]}}]}`
    CandidateParts(String),
    /// `{"candidates": [{"content": [{"text": "..."}]}]}`
    CandidateContent(String),
    Unrecognized(&'a Value),
}

fn classify(raw: &Value) -> GatewayPayload<'_> {
    if let Some(text) = raw.get("output_text").filter(|v| is_truthy(v)) {
        return GatewayPayload::FlatText(text);
    }

    let content = raw
        .get("candidates")
        .and_then(|candidates| candidates.get(0))
        .and_then(|candidate| candidate.get("content"));

    if let Some(parts) = content
        .and_then(|c| c.get("parts"))
        .and_then(Value::as_array)
    {
        let text = join_fragments(parts);
        if !text.is_empty() {
            return GatewayPayload::CandidateParts(text);
        }
    }

    if let Some(fragments) = content.and_then(Value::as_array) {
        let text = join_fragments(fragments);
        if !text.is_empty() {
            return GatewayPayload::CandidateContent(text);
        }
    }

    GatewayPayload::Unrecognized(raw)
}

/// Returns the text the validator should parse.
pub fn extract_json_text(raw: &Value) -> String {
    match classify(raw) {
        GatewayPayload::FlatText(value) => stringify(value),
        GatewayPayload::CandidateParts(text) | GatewayPayload::CandidateContent(text) => text,
        GatewayPayload::Unrecognized(value) => stringify(value),
    }
}

/// Joins the string `text` fields of `fragments` with newlines, dropping
/// empty or non-string ones, then trims and strips code fences.
fn join_fragments(fragments: &[Value]) -> String {
    let joined = fragments
        .iter()
        .filter_map(|fragment| fragment.get("text").and_then(Value::as_str))
        .filter(|text| !text.is_empty())
        .collect::<Vec<_>>()
        .join("\n");
    strip_code_fences(joined.trim()).to_string()
}

/// Strips a leading ```` ``` ```` / ```` ```json ```` fence and a trailing
/// ```` ``` ```` from LLM output. Text that does not open with a fence is
/// returned untouched.
fn strip_code_fences(text: &str) -> &str {
    let Some(rest) = text.strip_prefix("```") else {
        return text;
    };
    let rest = match rest.get(..4) {
        Some(tag) if tag.eq_ignore_ascii_case("json") => &rest[4..],
        _ => rest,
    };
    let rest = rest.trim();
    rest.strip_suffix("```").unwrap_or(rest).trim()
}

fn stringify(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

fn is_truthy(value: &Value) -> bool {
    match value {
        Value::Null => false,
        Value::Bool(b) => *b,
        Value::Number(n) => n.as_f64().is_some_and(|f| f != 0.0),
        Value::String(s) => !s.is_empty(),
        Value::Array(_) | Value::Object(_) => true,
    }
}
