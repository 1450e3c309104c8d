use super::*;
use crate::format::set_decorations;
use crate::sink::CaptureSink;
use crate::sink::FnSink;
use serial_test::serial;
use std::io::Cursor;

async fn pump_lines(
    mode: FormatMode,
    input: &str,
    sink: &mut dyn LineSink,
    metadata: &mut ExecutionMetadata,
) -> u64 {
    let handler = StreamHandler::new(mode);
    handler
        .pump(Cursor::new(input.to_string()), sink, metadata)
        .await
        .expect("pump")
}

#[tokio::test]
#[serial(decorations)]
async fn test_structured_lines_are_rendered() {
    set_decorations(true, true);
    let input = "{\"type\":\"run.start\",\"run_id\":\"r-1\"}\n{\"type\":\"assistant.output\",\"output\":\"pong\"}\n";

    let mut sink = CaptureSink::new();
    let mut metadata = ExecutionMetadata::new();
    let read = pump_lines(FormatMode::Structured, input, &mut sink, &mut metadata).await;

    assert_eq!(read, 2);
    assert_eq!(sink.captured(), "▶ Run started: r-1\npong\n");
    assert_eq!(metadata.line_count, 2);
    assert_eq!(metadata.run_id.as_deref(), Some("r-1"));
}

#[tokio::test]
async fn test_raw_mode_passes_json_through() {
    let input = "{\"type\":\"run.start\",\"run_id\":\"r-1\"}\n";

    let mut sink = CaptureSink::new();
    let mut metadata = ExecutionMetadata::new();
    pump_lines(FormatMode::Raw, input, &mut sink, &mut metadata).await;

    assert_eq!(sink.captured(), "{\"type\":\"run.start\",\"run_id\":\"r-1\"}\n");
    // Metadata is extracted from the raw line either way.
    assert_eq!(metadata.run_id.as_deref(), Some("r-1"));
}

#[tokio::test]
async fn test_unparseable_line_downgrades_to_text() {
    let input = "not json\n{\"type\":\n";

    let mut sink = CaptureSink::new();
    let mut metadata = ExecutionMetadata::new();
    pump_lines(FormatMode::Structured, input, &mut sink, &mut metadata).await;

    assert_eq!(sink.captured(), "not json\n{\"type\":\n");
    assert_eq!(metadata.line_count, 2);
}

#[tokio::test]
async fn test_sink_failure_counted_not_fatal() {
    let input = "one\ntwo\nthree\n";

    let mut emitted = Vec::new();
    {
        let mut sink = FnSink::new(|line: &str| {
            if line == "two" {
                Err(std::io::Error::other("refused"))
            } else {
                emitted.push(line.to_string());
                Ok(())
            }
        });
        let mut metadata = ExecutionMetadata::new();
        let read = pump_lines(FormatMode::Raw, input, &mut sink, &mut metadata).await;

        assert_eq!(read, 3);
        assert_eq!(metadata.callback_errors, 1);
        assert_eq!(metadata.line_count, 3);
    }
    assert_eq!(emitted, vec!["one", "three"]);
}

#[tokio::test]
async fn test_producer_order_preserved() {
    let input: String = (0..100).map(|i| format!("line {i}\n")).collect();

    let mut sink = CaptureSink::new();
    let mut metadata = ExecutionMetadata::new();
    pump_lines(FormatMode::Raw, &input, &mut sink, &mut metadata).await;

    let expected: Vec<String> = (0..100).map(|i| format!("line {i}")).collect();
    let got: Vec<&str> = sink.captured().lines().collect();
    assert_eq!(got, expected);
}

#[tokio::test]
#[serial(decorations)]
async fn test_recorder_receives_stream_events() {
    set_decorations(true, true);
    let tmp = tempfile::tempdir().expect("tempdir");
    let log = tmp.path().join("events.jsonl");
    let recorder = EventRecorder::create(&log).expect("recorder");

    let input = "{\"type\":\"run.start\",\"run_id\":\"r-9\"}\nplain text\n{\"type\":\"run.end\",\"status\":\"ok\"}\n";
    let handler = StreamHandler::new(FormatMode::Structured)
        .with_recorder(&recorder)
        .with_context("codex", None);

    let mut sink = CaptureSink::new();
    let mut metadata = ExecutionMetadata::new();
    handler
        .pump(Cursor::new(input.to_string()), &mut sink, &mut metadata)
        .await
        .expect("pump");

    let content = std::fs::read_to_string(&log).expect("read log");
    let records: Vec<RecordedEvent> = content
        .lines()
        .map(|l| serde_json::from_str(l).expect("record"))
        .collect();

    // Plain text lines are not events; two records expected.
    assert_eq!(records.len(), 2);
    assert_eq!(records[0].kind, "run.start");
    assert_eq!(records[0].backend, "codex");
    assert_eq!(records[0].run_id.as_deref(), Some("r-9"));
    assert_eq!(records[1].kind, "run.end");
}
