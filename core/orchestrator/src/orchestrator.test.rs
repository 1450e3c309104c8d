use super::*;
use maestro_config::BackendSpec;
use maestro_config::PromptVia;
use std::collections::BTreeMap;
use std::sync::Mutex as StdMutex;

fn sh_backend(script: &str, dialect: StreamDialect) -> BackendSpec {
    BackendSpec {
        command: "sh".to_string(),
        args: vec!["-c".to_string(), script.to_string()],
        model_args: Vec::new(),
        model_provider_args: Vec::new(),
        env: BTreeMap::new(),
        prompt_via: PromptVia::Argv,
        dialect,
    }
}

fn config_with(backends: Vec<(&str, BackendSpec)>) -> Arc<Config> {
    let mut config = Config::with_home(std::env::temp_dir().join("maestro-orch-test"));
    config.backends.clear();
    config.backend_order.clear();
    for (name, spec) in backends {
        config.backend_order.push(name.to_string());
        config.backends.insert(name.to_string(), spec);
    }
    Arc::new(config)
}

/// Sink appending into an `Arc<Mutex<String>>`, shareable across workers.
#[derive(Clone)]
struct SharedSink(Arc<StdMutex<String>>);

impl SharedSink {
    fn new() -> (Self, Arc<StdMutex<String>>) {
        let buffer = Arc::new(StdMutex::new(String::new()));
        (Self(Arc::clone(&buffer)), buffer)
    }
}

impl LineSink for SharedSink {
    fn emit(&mut self, line: &str) -> std::io::Result<()> {
        let mut buffer = self
            .0
            .lock()
            .map_err(|_| std::io::Error::other("poisoned"))?;
        buffer.push_str(line);
        buffer.push('\n');
        Ok(())
    }
}

#[tokio::test]
async fn test_run_task_streams_and_extracts_metadata() {
    let config = config_with(vec![(
        "codex",
        sh_backend(
            r#"echo '{"type":"run.start","run_id":"r-1"}'; echo '{"type":"assistant.output","output":"pong"}'"#,
            StreamDialect::Jsonl,
        ),
    )]);
    let orchestrator = BackendOrchestrator::new(config);

    let mut sink = CaptureSink::new();
    let result = orchestrator
        .run_task("codex", "ping", &TaskOptions::default(), &mut sink)
        .await;

    assert!(result.success, "error: {:?}", result.error);
    assert_eq!(result.output, "", "streaming path must not buffer output");
    assert_eq!(result.backend, "codex");
    assert_eq!(result.metadata.run_id.as_deref(), Some("r-1"));
    assert_eq!(result.metadata.line_count, 2);
    assert_eq!(result.metadata.returncode, Some(0));

    let captured = sink.into_string();
    assert!(captured.contains("Run started: r-1"), "got: {captured}");
    assert!(captured.contains("pong"));
}

#[tokio::test]
async fn test_run_task_nonzero_exit_uses_stderr() {
    let config = config_with(vec![(
        "codex",
        sh_backend("echo oops >&2; exit 3", StreamDialect::Text),
    )]);
    let orchestrator = BackendOrchestrator::new(config);

    let mut sink = CaptureSink::new();
    let result = orchestrator
        .run_task("codex", "p", &TaskOptions::default(), &mut sink)
        .await;

    assert!(!result.success);
    assert_eq!(result.metadata.returncode, Some(3));
    assert!(result.error.as_deref().is_some_and(|e| e.contains("oops")));
}

#[tokio::test]
async fn test_run_task_error_keyword_beats_stderr() {
    let config = config_with(vec![(
        "codex",
        sh_backend(
            "echo '[ERROR] exploded'; echo other >&2; exit 1",
            StreamDialect::Text,
        ),
    )]);
    let orchestrator = BackendOrchestrator::new(config);

    let mut sink = CaptureSink::new();
    let result = orchestrator
        .run_task("codex", "p", &TaskOptions::default(), &mut sink)
        .await;

    assert!(!result.success);
    assert!(result.metadata.error_detected);
    assert!(
        result
            .error
            .as_deref()
            .is_some_and(|e| e.contains("[ERROR] exploded"))
    );
}

#[tokio::test]
async fn test_run_task_spawn_failure() {
    let mut spec = sh_backend("true", StreamDialect::Text);
    spec.command = "maestro-test-no-such-binary".to_string();
    let config = config_with(vec![("codex", spec)]);
    let orchestrator = BackendOrchestrator::new(config);

    let mut sink = CaptureSink::new();
    let result = orchestrator
        .run_task("codex", "p", &TaskOptions::default(), &mut sink)
        .await;

    assert!(!result.success);
    assert!(
        result
            .error
            .as_deref()
            .is_some_and(|e| e.contains("Failed to spawn"))
    );
}

#[tokio::test]
async fn test_run_task_unknown_backend() {
    let config = config_with(vec![("codex", sh_backend("true", StreamDialect::Text))]);
    let orchestrator = BackendOrchestrator::new(config);

    let mut sink = CaptureSink::new();
    let result = orchestrator
        .run_task("mystery", "p", &TaskOptions::default(), &mut sink)
        .await;

    assert!(!result.success);
    assert!(
        result
            .error
            .as_deref()
            .is_some_and(|e| e.contains("mystery"))
    );
}

#[tokio::test]
async fn test_run_task_prompt_via_stdin() {
    let mut spec = sh_backend("cat", StreamDialect::Text);
    spec.prompt_via = PromptVia::Stdin;
    let config = config_with(vec![("codex", spec)]);
    let orchestrator = BackendOrchestrator::new(config);

    let mut sink = CaptureSink::new();
    let result = orchestrator
        .run_task("codex", "hello from stdin", &TaskOptions::default(), &mut sink)
        .await;

    assert!(result.success);
    assert_eq!(sink.into_string(), "hello from stdin\n");
}

#[tokio::test]
async fn test_run_fallback_returns_first_success() {
    let tmp = tempfile::tempdir().expect("tempdir");
    let events = tmp.path().join("run.events.jsonl");
    let recorder = Arc::new(EventRecorder::create(&events).expect("recorder"));

    let config = config_with(vec![
        ("codex", sh_backend("exit 2", StreamDialect::Text)),
        ("claude", sh_backend("echo ok", StreamDialect::Text)),
        ("gemini", sh_backend("echo never", StreamDialect::Text)),
    ]);
    let orchestrator = BackendOrchestrator::new(config).with_recorder(recorder);

    let backends: Vec<String> = ["codex", "claude", "gemini"]
        .iter()
        .map(ToString::to_string)
        .collect();
    let mut sink = CaptureSink::new();
    let result = orchestrator
        .run_fallback(&backends, "x", &TaskOptions::default(), &mut sink)
        .await;

    assert!(result.success);
    assert_eq!(result.backend, "claude");

    // Attempts recorded in order, and only for the backends tried.
    let log = std::fs::read_to_string(&events).expect("read log");
    let attempts: Vec<(String, u64)> = log
        .lines()
        .filter_map(|line| serde_json::from_str::<RecordedEvent>(line).ok())
        .filter(|record| record.kind == "task.attempt")
        .map(|record| {
            let attempt = record.payload["attempt"].as_u64().unwrap_or_default();
            (record.backend, attempt)
        })
        .collect();
    assert_eq!(
        attempts,
        vec![("codex".to_string(), 1), ("claude".to_string(), 2)]
    );
}

#[tokio::test]
async fn test_run_fallback_returns_last_failure() {
    let config = config_with(vec![
        ("codex", sh_backend("exit 1", StreamDialect::Text)),
        ("claude", sh_backend("exit 2", StreamDialect::Text)),
    ]);
    let orchestrator = BackendOrchestrator::new(config);

    let backends: Vec<String> = ["codex", "claude"].iter().map(ToString::to_string).collect();
    let mut sink = CaptureSink::new();
    let result = orchestrator
        .run_fallback(&backends, "x", &TaskOptions::default(), &mut sink)
        .await;

    assert!(!result.success);
    assert_eq!(result.backend, "claude");
}

#[tokio::test]
async fn test_run_fallback_empty_chain() {
    let config = config_with(vec![("codex", sh_backend("true", StreamDialect::Text))]);
    let orchestrator = BackendOrchestrator::new(config);

    let mut sink = CaptureSink::new();
    let result = orchestrator
        .run_fallback(&[], "x", &TaskOptions::default(), &mut sink)
        .await;

    assert!(!result.success);
    assert!(
        result
            .error
            .as_deref()
            .is_some_and(|e| e.contains("no backends"))
    );
}

#[tokio::test]
async fn test_run_parallel_reports_individual_statuses() {
    let config = config_with(vec![
        ("codex", sh_backend("echo a", StreamDialect::Text)),
        ("claude", sh_backend("echo b", StreamDialect::Text)),
        ("gemini", sh_backend("exit 5", StreamDialect::Text)),
    ]);
    let orchestrator = BackendOrchestrator::new(config);

    let backends: Vec<String> = ["codex", "claude", "gemini"]
        .iter()
        .map(ToString::to_string)
        .collect();
    let result = orchestrator
        .run_parallel(
            &backends,
            "x",
            3,
            &TaskOptions::default(),
            &|_backend: &str| -> Box<dyn LineSink> { Box::new(CaptureSink::new()) },
        )
        .await;

    assert!(result.any_success());
    let names: Vec<&str> = result
        .results()
        .iter()
        .map(|(name, _)| name.as_str())
        .collect();
    assert_eq!(names, vec!["codex", "claude", "gemini"]);
    assert!(result.get("codex").is_some_and(|r| r.success));
    assert!(result.get("claude").is_some_and(|r| r.success));
    assert!(result.get("gemini").is_some_and(|r| !r.success));
}

#[tokio::test]
async fn test_run_parallel_single_worker_still_completes_all() {
    let config = config_with(vec![
        ("codex", sh_backend("echo one", StreamDialect::Text)),
        ("claude", sh_backend("echo two", StreamDialect::Text)),
    ]);
    let orchestrator = BackendOrchestrator::new(config);

    let (sink, buffer) = SharedSink::new();
    let backends: Vec<String> = ["codex", "claude"].iter().map(ToString::to_string).collect();
    let result = orchestrator
        .run_parallel(
            &backends,
            "x",
            1,
            &TaskOptions::default(),
            &move |_backend: &str| -> Box<dyn LineSink> { Box::new(sink.clone()) },
        )
        .await;

    assert_eq!(result.len(), 2);
    assert!(result.any_success());
    let captured = buffer.lock().expect("lock").clone();
    assert!(captured.contains("one"));
    assert!(captured.contains("two"));
}

#[tokio::test]
async fn test_run_pipeline_passes_output_forward() {
    let config = config_with(vec![
        ("codex", sh_backend("echo hello", StreamDialect::Text)),
        ("claude", sh_backend("echo done", StreamDialect::Text)),
    ]);
    let orchestrator = BackendOrchestrator::new(config);

    let stages = vec![
        PipelineStage {
            backend: "codex".to_string(),
            prompt: "gen".to_string(),
        },
        PipelineStage {
            backend: "claude".to_string(),
            prompt: "review".to_string(),
        },
    ];
    let mut sink = CaptureSink::new();
    let result = orchestrator
        .run_pipeline(&stages, true, &TaskOptions::default(), None, &mut sink)
        .await;

    assert!(result.success);
    assert_eq!(result.stages.len(), 2);

    // Stage 2's effective prompt carries stage 1's output after a
    // delimiter, on its own line.
    let second_prompt = &result.stages[1].prompt;
    assert!(second_prompt.starts_with("review"), "got: {second_prompt}");
    assert!(second_prompt.contains("--- Output from previous stage (codex) ---"));
    assert!(second_prompt.contains("\nhello"));

    let stage_durations: f64 = result.stages.iter().map(|s| s.duration_seconds).sum();
    assert!(result.total_duration_seconds >= stage_durations);
}

#[tokio::test]
async fn test_run_pipeline_no_pass_output() {
    let config = config_with(vec![
        ("codex", sh_backend("echo hello", StreamDialect::Text)),
        ("claude", sh_backend("echo done", StreamDialect::Text)),
    ]);
    let orchestrator = BackendOrchestrator::new(config);

    let stages = vec![
        PipelineStage {
            backend: "codex".to_string(),
            prompt: "gen".to_string(),
        },
        PipelineStage {
            backend: "claude".to_string(),
            prompt: "review".to_string(),
        },
    ];
    let mut sink = CaptureSink::new();
    let result = orchestrator
        .run_pipeline(&stages, false, &TaskOptions::default(), None, &mut sink)
        .await;

    assert!(result.success);
    assert_eq!(result.stages[1].prompt, "review");
}

#[tokio::test]
async fn test_run_pipeline_stops_on_failure() {
    let config = config_with(vec![
        ("codex", sh_backend("exit 9", StreamDialect::Text)),
        ("claude", sh_backend("echo never", StreamDialect::Text)),
    ]);
    let orchestrator = BackendOrchestrator::new(config);

    let stages = vec![
        PipelineStage {
            backend: "codex".to_string(),
            prompt: "gen".to_string(),
        },
        PipelineStage {
            backend: "claude".to_string(),
            prompt: "review".to_string(),
        },
    ];
    let mut sink = CaptureSink::new();
    let result = orchestrator
        .run_pipeline(&stages, true, &TaskOptions::default(), None, &mut sink)
        .await;

    assert!(!result.success);
    assert_eq!(result.stages.len(), 1);
    assert!(!result.stages[0].success);
}

#[tokio::test]
async fn test_cancellation_terminates_child() {
    let config = config_with(vec![(
        "codex",
        sh_backend("sleep 30", StreamDialect::Text),
    )]);
    let orchestrator = BackendOrchestrator::new(config);
    let cancel = orchestrator.cancel_token();

    tokio::spawn(async move {
        tokio::time::sleep(Duration::from_millis(150)).await;
        cancel.cancel();
    });

    let started = Instant::now();
    let mut sink = CaptureSink::new();
    let result = orchestrator
        .run_task("codex", "p", &TaskOptions::default(), &mut sink)
        .await;

    assert!(!result.success);
    assert_eq!(result.error.as_deref(), Some("cancelled"));
    assert!(started.elapsed() < Duration::from_secs(10));
    // The sink was flushed with an error event.
    assert!(sink.into_string().contains("cancelled"));
}

#[tokio::test]
async fn test_timeout_behaves_as_cancel() {
    let config = config_with(vec![(
        "codex",
        sh_backend("sleep 30", StreamDialect::Text),
    )]);
    let orchestrator = BackendOrchestrator::new(config);

    let options = TaskOptions {
        timeout: Some(Duration::from_millis(200)),
        ..Default::default()
    };
    let started = Instant::now();
    let mut sink = CaptureSink::new();
    let result = orchestrator.run_task("codex", "p", &options, &mut sink).await;

    assert!(!result.success);
    assert!(
        result
            .error
            .as_deref()
            .is_some_and(|e| e.contains("timed out"))
    );
    assert!(started.elapsed() < Duration::from_secs(10));
}
