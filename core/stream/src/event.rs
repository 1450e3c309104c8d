//! Structured stream events.
//!
//! Backends declared as `jsonl` emit one JSON object per line with a
//! `type` tag. The recognised vocabulary is small and fixed; anything
//! else is carried as [`StreamEvent::Unknown`] so it can still be
//! rendered and recorded.

use serde_json::Value;

/// A decoded stream event.
#[derive(Debug, Clone, PartialEq)]
pub enum StreamEvent {
    /// `run.start`: a run began; carries the run identifier.
    RunStart { run_id: String },

    /// `assistant.output`: a chunk of assistant text.
    AssistantOutput { output: String },

    /// `tool.call`: the backend invoked a tool.
    ToolCall { name: String, args: Value },

    /// `tool.result`: a tool returned.
    ToolResult { name: String, result: String },

    /// `error`: the backend reported an error.
    Error { message: String },

    /// `run.end`: the run finished with a status.
    RunEnd { status: String },

    /// Any unrecognised event type.
    Unknown { kind: String, payload: Value },
}

impl StreamEvent {
    /// Attempts to decode one line as a structured event.
    ///
    /// Returns `None` unless the line is a JSON object carrying a string
    /// `type` field; anything else is treated as plain text by the
    /// stream handler (protocol errors are downgraded, not raised).
    pub fn parse_line(line: &str) -> Option<(Self, Value)> {
        let trimmed = line.trim();
        if !trimmed.starts_with('{') {
            return None;
        }
        let value: Value = serde_json::from_str(trimmed).ok()?;
        let kind = value.get("type")?.as_str()?.to_string();
        let event = Self::from_parts(&kind, &value);
        Some((event, value))
    }

    /// Classifies an already-parsed payload by its `type` tag.
    pub fn from_parts(kind: &str, payload: &Value) -> Self {
        match kind {
            "run.start" => Self::RunStart {
                run_id: str_field(payload, "run_id"),
            },
            "assistant.output" => Self::AssistantOutput {
                output: str_field(payload, "output"),
            },
            "tool.call" => Self::ToolCall {
                name: str_field(payload, "name"),
                args: payload.get("args").cloned().unwrap_or(Value::Null),
            },
            "tool.result" => Self::ToolResult {
                name: str_field(payload, "name"),
                result: stringified_field(payload, "result"),
            },
            "error" => Self::Error {
                message: str_field(payload, "message"),
            },
            "run.end" => Self::RunEnd {
                status: str_field(payload, "status"),
            },
            other => Self::Unknown {
                kind: other.to_string(),
                payload: payload.clone(),
            },
        }
    }

    /// The wire `type` tag of this event.
    pub fn kind(&self) -> &str {
        match self {
            Self::RunStart { .. } => "run.start",
            Self::AssistantOutput { .. } => "assistant.output",
            Self::ToolCall { .. } => "tool.call",
            Self::ToolResult { .. } => "tool.result",
            Self::Error { .. } => "error",
            Self::RunEnd { .. } => "run.end",
            Self::Unknown { kind, .. } => kind,
        }
    }
}

/// Extracts a string field, empty when absent.
fn str_field(payload: &Value, key: &str) -> String {
    payload
        .get(key)
        .and_then(Value::as_str)
        .unwrap_or_default()
        .to_string()
}

/// Extracts a field as text, JSON-compacting non-string values.
fn stringified_field(payload: &Value, key: &str) -> String {
    match payload.get(key) {
        Some(Value::String(s)) => s.clone(),
        Some(other) => other.to_string(),
        None => String::new(),
    }
}

#[cfg(test)]
#[path = "event.test.rs"]
mod tests;
