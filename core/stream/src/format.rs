//! Human-readable rendering of structured stream events.
//!
//! Decorations (icons and colour) are process-wide flags: set once at
//! startup, read at render time, never mutated from worker code paths.
//! Colour may only be enabled when the sink is a terminal; callers
//! resolve that check once at startup so escape codes never reach a
//! pipe or redirected file.

use serde_json::Value;
use std::sync::atomic::AtomicBool;
use std::sync::atomic::Ordering;

use crate::event::StreamEvent;

/// Whether icons are prepended to rendered events.
static ICONS_ENABLED: AtomicBool = AtomicBool::new(true);

/// Whether error events are wrapped in ANSI colour.
static COLOR_ENABLED: AtomicBool = AtomicBool::new(true);

/// ANSI bright-red escape used for error events.
const ANSI_RED: &str = "\x1b[91m";

/// ANSI reset escape.
const ANSI_RESET: &str = "\x1b[0m";

/// Maximum characters of a tool-call args summary.
const MAX_ARGS_CHARS: usize = 120;

/// Maximum characters of a tool result excerpt.
const MAX_RESULT_CHARS: usize = 200;

/// Sets the process-wide decoration flags. Call once at startup.
pub fn set_decorations(icons: bool, color: bool) {
    ICONS_ENABLED.store(icons, Ordering::Relaxed);
    COLOR_ENABLED.store(color, Ordering::Relaxed);
}

/// Returns `(icons, color)` as currently configured.
pub fn decorations_enabled() -> (bool, bool) {
    (
        ICONS_ENABLED.load(Ordering::Relaxed),
        COLOR_ENABLED.load(Ordering::Relaxed),
    )
}

/// Renders one event as a single human-readable line.
pub fn format_event(event: &StreamEvent) -> String {
    let icons = ICONS_ENABLED.load(Ordering::Relaxed);
    match event {
        StreamEvent::RunStart { run_id } => {
            format!("{}Run started: {run_id}", icon(icons, "▶ "))
        }
        StreamEvent::AssistantOutput { output } => output.clone(),
        StreamEvent::ToolCall { name, args } => {
            format!("{}tool {name}({})", icon(icons, "↪ "), args_summary(args))
        }
        StreamEvent::ToolResult { name, result } => {
            format!("{}{name}: {}", icon(icons, "← "), excerpt(result))
        }
        StreamEvent::Error { message } => paint_error(message),
        StreamEvent::RunEnd { status } => {
            format!("{}Run ended ({status})", icon(icons, "■ "))
        }
        StreamEvent::Unknown { kind, payload } => {
            format!("[{kind}] {}", compact_payload(payload))
        }
    }
}

/// Returns the icon prefix or nothing, per the process-wide flag.
fn icon(enabled: bool, glyph: &'static str) -> &'static str {
    if enabled { glyph } else { "" }
}

/// Wraps an error message in ANSI red when colour is enabled.
fn paint_error(message: &str) -> String {
    if COLOR_ENABLED.load(Ordering::Relaxed) {
        format!("{ANSI_RED}{message}{ANSI_RESET}")
    } else {
        message.to_string()
    }
}

/// Compact one-line summary of tool-call arguments.
fn args_summary(args: &Value) -> String {
    let text = match args {
        Value::Null => String::new(),
        other => other.to_string(),
    };
    truncate(&text, MAX_ARGS_CHARS)
}

/// First part of a tool result, bounded.
fn excerpt(result: &str) -> String {
    truncate(result, MAX_RESULT_CHARS)
}

/// Compact JSON of an unknown payload, with the `type` tag elided.
fn compact_payload(payload: &Value) -> String {
    match payload {
        Value::Object(map) => {
            let mut rest = map.clone();
            rest.remove("type");
            Value::Object(rest).to_string()
        }
        other => other.to_string(),
    }
}

/// Character-budget truncation without an ellipsis marker.
fn truncate(text: &str, max: usize) -> String {
    if text.chars().count() > max {
        text.chars().take(max).collect()
    } else {
        text.to_string()
    }
}

#[cfg(test)]
#[path = "format.test.rs"]
mod tests;
