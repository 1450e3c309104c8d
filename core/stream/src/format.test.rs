use super::*;
use crate::event::StreamEvent;
use serde_json::json;
use serial_test::serial;

#[test]
#[serial(decorations)]
fn test_render_with_decorations() {
    set_decorations(true, true);

    let started = format_event(&StreamEvent::RunStart {
        run_id: "r-1".to_string(),
    });
    assert_eq!(started, "▶ Run started: r-1");

    let output = format_event(&StreamEvent::AssistantOutput {
        output: "pong".to_string(),
    });
    assert_eq!(output, "pong");

    let call = format_event(&StreamEvent::ToolCall {
        name: "read_file".to_string(),
        args: json!({"path": "x.rs"}),
    });
    assert_eq!(call, r#"↪ tool read_file({"path":"x.rs"})"#);

    let result = format_event(&StreamEvent::ToolResult {
        name: "read_file".to_string(),
        result: "fn main".to_string(),
    });
    assert_eq!(result, "← read_file: fn main");

    let ended = format_event(&StreamEvent::RunEnd {
        status: "ok".to_string(),
    });
    assert_eq!(ended, "■ Run ended (ok)");
}

#[test]
#[serial(decorations)]
fn test_error_painted_red_when_color_enabled() {
    set_decorations(true, true);
    let rendered = format_event(&StreamEvent::Error {
        message: "boom".to_string(),
    });
    assert_eq!(rendered, "\x1b[91mboom\x1b[0m");

    set_decorations(true, false);
    let plain = format_event(&StreamEvent::Error {
        message: "boom".to_string(),
    });
    assert_eq!(plain, "boom");

    set_decorations(true, true);
}

#[test]
#[serial(decorations)]
fn test_icons_can_be_disabled() {
    set_decorations(false, true);
    let started = format_event(&StreamEvent::RunStart {
        run_id: "r-1".to_string(),
    });
    assert_eq!(started, "Run started: r-1");
    assert_eq!(decorations_enabled().0, false);

    set_decorations(true, true);
}

#[test]
#[serial(decorations)]
fn test_unknown_rendering_elides_type_tag() {
    set_decorations(true, true);
    let (event, _) = StreamEvent::parse_line(r#"{"type":"usage.report","tokens":9}"#).expect("ok");
    assert_eq!(format_event(&event), r#"[usage.report] {"tokens":9}"#);
}

#[test]
#[serial(decorations)]
fn test_tool_result_excerpt_bounded() {
    set_decorations(true, true);
    let long = "y".repeat(500);
    let rendered = format_event(&StreamEvent::ToolResult {
        name: "t".to_string(),
        result: long,
    });
    // "← t: " prefix plus at most 200 characters of result.
    assert_eq!(rendered.chars().count(), "← t: ".chars().count() + 200);
}
