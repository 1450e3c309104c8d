use super::*;
use serde_json::json;

#[test]
fn test_parse_run_start() {
    let (event, payload) =
        StreamEvent::parse_line(r#"{"type":"run.start","run_id":"r-1"}"#).expect("parsed");
    assert_eq!(
        event,
        StreamEvent::RunStart {
            run_id: "r-1".to_string()
        }
    );
    assert_eq!(payload["run_id"], "r-1");
}

#[test]
fn test_parse_assistant_output() {
    let (event, _) =
        StreamEvent::parse_line(r#"{"type":"assistant.output","output":"pong"}"#).expect("parsed");
    assert_eq!(
        event,
        StreamEvent::AssistantOutput {
            output: "pong".to_string()
        }
    );
}

#[test]
fn test_parse_tool_events() {
    let (call, _) = StreamEvent::parse_line(
        r#"{"type":"tool.call","name":"read_file","args":{"path":"x.rs"}}"#,
    )
    .expect("parsed");
    assert_eq!(
        call,
        StreamEvent::ToolCall {
            name: "read_file".to_string(),
            args: json!({"path": "x.rs"}),
        }
    );

    let (result, _) =
        StreamEvent::parse_line(r#"{"type":"tool.result","name":"read_file","result":"fn main"}"#)
            .expect("parsed");
    assert_eq!(
        result,
        StreamEvent::ToolResult {
            name: "read_file".to_string(),
            result: "fn main".to_string(),
        }
    );
}

#[test]
fn test_tool_result_stringifies_non_string_payload() {
    let (event, _) =
        StreamEvent::parse_line(r#"{"type":"tool.result","name":"ls","result":{"n":2}}"#)
            .expect("parsed");
    assert_eq!(
        event,
        StreamEvent::ToolResult {
            name: "ls".to_string(),
            result: r#"{"n":2}"#.to_string(),
        }
    );
}

#[test]
fn test_unknown_type_preserved() {
    let (event, _) =
        StreamEvent::parse_line(r#"{"type":"usage.report","tokens":9}"#).expect("parsed");
    match event {
        StreamEvent::Unknown { kind, payload } => {
            assert_eq!(kind, "usage.report");
            assert_eq!(payload["tokens"], 9);
        }
        other => panic!("expected Unknown, got {other:?}"),
    }
}

#[test]
fn test_non_json_lines_are_not_events() {
    assert!(StreamEvent::parse_line("plain text").is_none());
    assert!(StreamEvent::parse_line("{broken json").is_none());
    // Valid JSON but no type tag.
    assert!(StreamEvent::parse_line(r#"{"run_id":"r-1"}"#).is_none());
    // Type tag that is not a string.
    assert!(StreamEvent::parse_line(r#"{"type":3}"#).is_none());
}

#[test]
fn test_kind_round_trip() {
    for raw in [
        r#"{"type":"run.start","run_id":"r"}"#,
        r#"{"type":"assistant.output","output":"o"}"#,
        r#"{"type":"tool.call","name":"t"}"#,
        r#"{"type":"tool.result","name":"t"}"#,
        r#"{"type":"error","message":"m"}"#,
        r#"{"type":"run.end","status":"ok"}"#,
        r#"{"type":"something.else"}"#,
    ] {
        let (event, payload) = StreamEvent::parse_line(raw).expect("parsed");
        assert_eq!(Some(event.kind()), payload["type"].as_str());
    }
}

#[test]
fn test_missing_fields_default_empty() {
    let (event, _) = StreamEvent::parse_line(r#"{"type":"run.start"}"#).expect("parsed");
    assert_eq!(
        event,
        StreamEvent::RunStart {
            run_id: String::new()
        }
    );
}
