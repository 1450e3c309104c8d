use super::*;
use pretty_assertions::assert_eq;

#[test]
fn test_run_id_from_jsonl() {
    let mut metadata = ExecutionMetadata::new();
    metadata.extract_from_line(r#"{"type":"run.start","run_id":"abc123def456"}"#, 0.0);

    assert_eq!(metadata.run_id.as_deref(), Some("abc123def456"));
    assert!(metadata.run_id_extracted);
    assert_eq!(metadata.line_count, 1);
    assert!(!metadata.error_detected);
}

#[test]
fn test_run_id_from_text_patterns() {
    for line in [
        "run_id: r-42",
        "run id: r-42",
        "Run ID: `r-42`",
        "RUN-ID: \"r-42\"",
    ] {
        let mut metadata = ExecutionMetadata::new();
        metadata.extract_from_line(line, 0.0);
        assert_eq!(metadata.run_id.as_deref(), Some("r-42"), "line: {line}");
    }
}

#[test]
fn test_run_id_extracted_at_most_once() {
    let mut metadata = ExecutionMetadata::new();
    metadata.extract_from_line("run_id: first", 0.0);
    metadata.extract_from_line("run_id: second", 0.0);
    assert_eq!(metadata.run_id.as_deref(), Some("first"));
}

#[test]
fn test_malformed_json_is_silent() {
    let mut metadata = ExecutionMetadata::new();
    metadata.extract_from_line("{not json at all", 0.0);
    assert!(metadata.run_id.is_none());
    assert_eq!(metadata.line_count, 1);
}

#[test]
fn test_error_keyword_detection() {
    let mut metadata = ExecutionMetadata::new();
    metadata.extract_from_line("all good", 0.0);
    assert!(!metadata.error_detected);

    metadata.extract_from_line("[ERROR] Something went wrong", 0.0);
    assert!(metadata.error_detected);
}

#[test]
fn test_error_scan_stops_at_first_hit() {
    let mut metadata = ExecutionMetadata::new();
    for i in 0..10 {
        metadata.extract_from_line(&format!("error number {i}"), 0.0);
    }
    metadata.finalize(1, None);

    // The keyword scan is gated on error_detected: only the line that
    // tripped it is captured.
    let error = metadata.error.expect("error populated");
    assert_eq!(error, "error number 0");
    assert!(metadata.error_detected);
}

#[test]
fn test_finalize_success() {
    let mut metadata = ExecutionMetadata::new();
    metadata.extract_from_line("fatal looking line", 0.0);
    metadata.finalize(0, Some("noise on stderr"));

    assert!(metadata.success);
    assert_eq!(metadata.returncode, Some(0));
    // Error keywords on a successful run do not produce an error message.
    assert!(metadata.error.is_none());
}

#[test]
fn test_finalize_uses_stderr_when_no_error_lines() {
    let mut metadata = ExecutionMetadata::new();
    metadata.extract_from_line("clean output", 0.0);
    metadata.finalize(2, Some("boom"));

    assert!(!metadata.success);
    assert_eq!(metadata.error.as_deref(), Some("boom"));
}

#[test]
fn test_finalize_truncates_stderr() {
    let mut metadata = ExecutionMetadata::new();
    let stderr = "x".repeat(2000);
    metadata.finalize(1, Some(&stderr));

    let error = metadata.error.expect("error populated");
    assert_eq!(error.chars().count(), 503); // 500 + "..."
    assert!(error.ends_with("..."));
}

#[test]
fn test_finalize_synthesizes_message() {
    let mut metadata = ExecutionMetadata::new();
    metadata.finalize(7, None);
    assert_eq!(
        metadata.error.as_deref(),
        Some("Process failed with exit code 7")
    );
}

#[test]
fn test_avg_line_processing_running_mean() {
    let mut metadata = ExecutionMetadata::new();
    metadata.extract_from_line("a", 10.0);
    metadata.extract_from_line("b", 20.0);
    metadata.extract_from_line("c", 30.0);
    assert!((metadata.avg_line_processing_ms - 20.0).abs() < 1e-9);
}

#[test]
fn test_summary_line_success() {
    let mut metadata = ExecutionMetadata {
        run_id: Some("abc12345xyz".to_string()),
        line_count: 1234,
        duration_seconds: 45.2,
        ..Default::default()
    };
    metadata.finalize(0, None);

    let summary = metadata.summary_line();
    assert_eq!(summary, "[Complete] | 45.20s | 1234 lines | run_id: abc12345...");
}

#[test]
fn test_summary_line_failure_includes_error_excerpt() {
    let mut metadata = ExecutionMetadata::new();
    metadata.extract_from_line("error: disk exploded", 0.0);
    metadata.duration_seconds = 1.5;
    metadata.finalize(1, None);

    let summary = metadata.summary_line();
    assert!(summary.starts_with("[Failed] | 1.50s | 1 lines"));
    assert!(summary.contains("error: error: disk exploded"));
}

#[test]
fn test_summary_line_localised_labels() {
    let mut metadata = ExecutionMetadata::new();
    metadata.finalize(0, None);

    let labels = SummaryLabels {
        complete: "完成",
        failed: "失败",
        lines: "行",
        error: "错误",
    };
    let summary = metadata.summary_line_with(&labels);
    assert!(summary.starts_with("[完成]"));
    assert!(summary.contains("0 行"));
}

#[test]
fn test_memory_footprint_independent_of_stream_size() {
    let mut metadata = ExecutionMetadata::new();

    // 10 000 lines x 100 bytes = ~1 MB of streamed output.
    let line = "x".repeat(100);
    for _ in 0..10_000 {
        metadata.extract_from_line(&line, 0.1);
    }
    metadata.finalize(0, None);

    assert_eq!(metadata.line_count, 10_000);

    // The tracker retains no payload: its serialised form stays tiny.
    let serialized = serde_json::to_string(&metadata).expect("serialize");
    assert!(
        serialized.len() < 10 * 1024,
        "metadata grew with stream size: {} bytes",
        serialized.len()
    );
}
