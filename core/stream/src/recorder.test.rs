use super::*;
use crate::error::StreamError;
use crate::format::set_decorations;
use crate::sink::CaptureSink;
use serde_json::json;
use serial_test::serial;

fn sample_log(path: &Path) -> EventRecorder {
    let recorder = EventRecorder::create(path).expect("create recorder");
    recorder.record(&RecordedEvent::lifecycle(
        "codex",
        None,
        "task.start",
        json!({"prompt": "ping"}),
    ));
    recorder.record(&RecordedEvent::stream(
        "codex",
        None,
        Some("r-1".to_string()),
        "run.start",
        json!({"type": "run.start", "run_id": "r-1"}),
    ));
    recorder.record(&RecordedEvent::stream(
        "codex",
        None,
        Some("r-1".to_string()),
        "assistant.output",
        json!({"type": "assistant.output", "output": "pong"}),
    ));
    recorder.record(&RecordedEvent::lifecycle(
        "codex",
        None,
        "task.end",
        json!({"success": true}),
    ));
    recorder
}

#[test]
fn test_record_appends_one_json_per_line() {
    let tmp = tempfile::tempdir().expect("tempdir");
    let path = tmp.path().join("run.events.jsonl");
    sample_log(&path);

    let content = std::fs::read_to_string(&path).expect("read");
    assert_eq!(content.lines().count(), 4);
    for line in content.lines() {
        let record: RecordedEvent = serde_json::from_str(line).expect("valid record");
        assert!(!record.ts.is_empty());
        assert_eq!(record.backend, "codex");
    }
}

#[test]
#[serial(decorations)]
fn test_replay_text_renders_stream_events_only() {
    set_decorations(true, true);
    let tmp = tempfile::tempdir().expect("tempdir");
    let path = tmp.path().join("run.events.jsonl");
    sample_log(&path);

    let mut sink = CaptureSink::new();
    let stats = replay_events(&path, ReplayFormat::Text, &mut sink).expect("replay");

    assert_eq!(stats.events, 4);
    assert_eq!(stats.rendered, 2);
    assert_eq!(sink.captured(), "▶ Run started: r-1\npong\n");
}

#[test]
#[serial(decorations)]
fn test_replay_matches_live_rendering() {
    // The replay of a recorded stream must reproduce the exact bytes the
    // live formatter emitted for the same events.
    set_decorations(true, true);
    let tmp = tempfile::tempdir().expect("tempdir");
    let path = tmp.path().join("run.events.jsonl");

    let raw_lines = [
        json!({"type": "run.start", "run_id": "r-7"}),
        json!({"type": "tool.call", "name": "grep", "args": {"pattern": "x"}}),
        json!({"type": "tool.result", "name": "grep", "result": "3 matches"}),
        json!({"type": "run.end", "status": "ok"}),
    ];

    let recorder = EventRecorder::create(&path).expect("recorder");
    let mut live = String::new();
    for payload in &raw_lines {
        let kind = payload["type"].as_str().expect("type");
        let event = StreamEvent::from_parts(kind, payload);
        live.push_str(&format_event(&event));
        live.push('\n');
        recorder.record(&RecordedEvent::stream(
            "codex",
            None,
            Some("r-7".to_string()),
            kind,
            payload.clone(),
        ));
    }

    let mut sink = CaptureSink::new();
    replay_events(&path, ReplayFormat::Text, &mut sink).expect("replay");
    assert_eq!(sink.captured(), live);
}

#[test]
fn test_replay_jsonl_reemits_every_record() {
    let tmp = tempfile::tempdir().expect("tempdir");
    let path = tmp.path().join("run.events.jsonl");
    sample_log(&path);

    let mut sink = CaptureSink::new();
    let stats = replay_events(&path, ReplayFormat::Jsonl, &mut sink).expect("replay");

    assert_eq!(stats.events, 4);
    assert_eq!(stats.rendered, 4);
    for line in sink.captured().lines() {
        serde_json::from_str::<RecordedEvent>(line).expect("valid record");
    }
}

#[test]
fn test_replay_rejects_malformed_line() {
    let tmp = tempfile::tempdir().expect("tempdir");
    let path = tmp.path().join("bad.events.jsonl");
    std::fs::write(&path, "{\"ts\": \"t\"}\n").expect("write");

    let mut sink = CaptureSink::new();
    let err = replay_events(&path, ReplayFormat::Text, &mut sink).unwrap_err();
    assert!(err.to_string().contains("bad.events.jsonl:1"));
}

#[test]
fn test_replay_missing_file_is_io_error() {
    let mut sink = CaptureSink::new();
    let err = replay_events(
        Path::new("/nonexistent/events.jsonl"),
        ReplayFormat::Text,
        &mut sink,
    )
    .unwrap_err();
    assert!(matches!(err, StreamError::Io { .. }));
}

#[test]
fn test_recorder_creates_parent_directories() {
    let tmp = tempfile::tempdir().expect("tempdir");
    let path = tmp.path().join("nested/dir/run.events.jsonl");
    let recorder = EventRecorder::create(&path).expect("create");
    recorder.record(&RecordedEvent::lifecycle("codex", None, "task.start", json!({})));
    assert!(path.is_file());
    assert_eq!(recorder.path(), path);
}
