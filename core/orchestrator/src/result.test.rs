use super::*;

fn ok_result(backend: &str) -> TaskResult {
    let mut metadata = ExecutionMetadata::new();
    metadata.finalize(0, None);
    TaskResult {
        backend: backend.to_string(),
        prompt: "p".to_string(),
        success: true,
        duration_seconds: 1.0,
        output: String::new(),
        metadata,
        error: None,
    }
}

#[test]
fn test_failed_constructor() {
    let result = TaskResult::failed("codex", "p", "boom");
    assert!(!result.success);
    assert_eq!(result.error.as_deref(), Some("boom"));
    assert_eq!(result.metadata.error.as_deref(), Some("boom"));
    assert_eq!(result.output, "");
    assert_eq!(result.duration_seconds, 0.0);
}

#[test]
fn test_task_result_serializes_without_output_payload() {
    let json = serde_json::to_value(ok_result("codex")).expect("serialize");
    assert_eq!(json["output"], "");
    assert_eq!(json["backend"], "codex");
    assert!(json.get("error").is_none());
}

#[test]
fn test_parallel_result_order_and_lookup() {
    let parallel = ParallelResult::new(vec![
        ("codex".to_string(), ok_result("codex")),
        ("claude".to_string(), TaskResult::failed("claude", "p", "x")),
        ("gemini".to_string(), ok_result("gemini")),
    ]);

    assert_eq!(parallel.len(), 3);
    assert!(!parallel.is_empty());
    assert!(parallel.any_success());
    assert!(parallel.get("claude").is_some_and(|r| !r.success));
    assert!(parallel.get("missing").is_none());

    let names: Vec<&str> = parallel
        .results()
        .iter()
        .map(|(name, _)| name.as_str())
        .collect();
    assert_eq!(names, vec!["codex", "claude", "gemini"]);
}

#[test]
fn test_parallel_result_serialization_preserves_input_order() {
    // Deliberately not alphabetical: serialization must follow input
    // order, not key order.
    let parallel = ParallelResult::new(vec![
        ("gemini".to_string(), ok_result("gemini")),
        ("codex".to_string(), ok_result("codex")),
    ]);

    let text = serde_json::to_string(&parallel).expect("serialize");
    let gemini_at = text.find("\"gemini\"").expect("gemini key");
    let codex_at = text.find("\"codex\"").expect("codex key");
    assert!(gemini_at < codex_at, "input order not preserved: {text}");
    assert!(text.contains("\"success\":true"));
}

#[test]
fn test_parallel_result_all_failed() {
    let parallel = ParallelResult::new(vec![(
        "codex".to_string(),
        TaskResult::failed("codex", "p", "x"),
    )]);
    assert!(!parallel.any_success());
}

#[test]
fn test_pipeline_result_serialization() {
    let pipeline = PipelineResult {
        stages: vec![ok_result("codex"), ok_result("claude")],
        total_duration_seconds: 3.5,
        success: true,
    };
    let json = serde_json::to_value(&pipeline).expect("serialize");
    assert_eq!(json["stages"].as_array().map(Vec::len), Some(2));
    assert_eq!(json["total_duration_seconds"], 3.5);
    assert_eq!(json["success"], true);
}
