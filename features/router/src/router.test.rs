use super::*;
use maestro_config::BackendSpec;
use maestro_config::Config;
use maestro_config::PromptVia;
use maestro_config::StreamDialect;
use maestro_registry::ResourceKind;
use maestro_registry::ResourceScope;
use maestro_registry::Section;
use maestro_stream::CaptureSink;
use std::collections::BTreeMap;
use std::path::PathBuf;

fn sh_backend(script: &str) -> BackendSpec {
    BackendSpec {
        command: "sh".to_string(),
        args: vec!["-c".to_string(), script.to_string()],
        model_args: Vec::new(),
        model_provider_args: Vec::new(),
        env: BTreeMap::new(),
        prompt_via: PromptVia::Argv,
        dialect: StreamDialect::Text,
    }
}

fn test_config() -> Arc<Config> {
    let mut config = Config::with_home(std::env::temp_dir().join("maestro-router-test"));
    config.backends.clear();
    config.backend_order.clear();
    for (name, script) in [
        ("codex", r#"printf '%s\n' "{prompt}""#),
        ("claude", "exit 1"),
    ] {
        config.backend_order.push(name.to_string());
        config.backends.insert(name.to_string(), sh_backend(script));
    }
    Arc::new(config)
}

fn resource(name: &str, enabled: bool) -> Resource {
    Resource {
        name: name.to_string(),
        kind: ResourceKind::Skill,
        source: PathBuf::from(format!("/tmp/{name}.md")),
        scope: ResourceScope::User,
        priority: 50,
        enabled,
        description: None,
        backend: Some("codex".to_string()),
        tags: Vec::new(),
        dependencies: Vec::new(),
        version: None,
        category: None,
        assets: Vec::new(),
        extra: BTreeMap::new(),
        sections: vec![
            Section {
                heading: "System Prompt".to_string(),
                body: "You are concise.".to_string(),
            },
            Section {
                heading: "User Prompt Template".to_string(),
                body: "Request: {{request}}".to_string(),
            },
        ],
    }
}

fn intent_for(candidates: &[&str]) -> Intent {
    Intent {
        candidates: candidates.iter().map(ToString::to_string).collect(),
        ..Default::default()
    }
}

#[tokio::test]
async fn test_route_builds_prompt_from_sections() {
    let registry = UnifiedRegistry::hydrate(vec![resource("greet", true)]);
    let orchestrator = BackendOrchestrator::new(test_config());
    let router = ExecutionRouter::new(&registry, &orchestrator);

    let mut sink = CaptureSink::new();
    let (result, decision) = router
        .route(
            &intent_for(&["skill:greet"]),
            "say hello",
            &TaskOptions::default(),
            &mut sink,
        )
        .await;

    assert!(result.success, "error: {:?}", result.error);
    assert_eq!(decision.selected.as_deref(), Some("skill:greet"));
    assert!(result.prompt.contains("You are concise."));
    assert!(result.prompt.contains("Request: say hello"));

    let captured = sink.into_string();
    assert!(captured.contains("Request: say hello"), "got: {captured}");
}

#[tokio::test]
async fn test_route_skips_missing_and_disabled_candidates() {
    let registry =
        UnifiedRegistry::hydrate(vec![resource("off", false), resource("on", true)]);
    let orchestrator = BackendOrchestrator::new(test_config());
    let router = ExecutionRouter::new(&registry, &orchestrator);

    let mut sink = CaptureSink::new();
    let (result, decision) = router
        .route(
            &intent_for(&["skill:ghost", "skill:off", "skill:on"]),
            "x",
            &TaskOptions::default(),
            &mut sink,
        )
        .await;

    assert!(result.success);
    assert_eq!(decision.selected.as_deref(), Some("skill:on"));
    assert_eq!(decision.attempts.len(), 3);
    for attempt in &decision.attempts[..2] {
        assert!(matches!(
            attempt.feedback,
            CandidateFeedback::Skipped {
                reason: SkipReason::NotAvailable,
                ..
            }
        ));
    }
}

#[tokio::test]
async fn test_route_skips_on_missing_dependency() {
    let mut needy = resource("needy", true);
    needy.dependencies = vec!["skill:ghost".to_string()];
    let registry = UnifiedRegistry::hydrate(vec![needy, resource("solid", true)]);
    let orchestrator = BackendOrchestrator::new(test_config());
    let router = ExecutionRouter::new(&registry, &orchestrator);

    let mut sink = CaptureSink::new();
    let (result, decision) = router
        .route(
            &intent_for(&["skill:needy", "skill:solid"]),
            "x",
            &TaskOptions::default(),
            &mut sink,
        )
        .await;

    assert!(result.success);
    assert_eq!(decision.selected.as_deref(), Some("skill:solid"));
    assert!(matches!(
        decision.attempts[0].feedback,
        CandidateFeedback::Skipped {
            reason: SkipReason::DependencyMissing,
            ..
        }
    ));
}

#[tokio::test]
async fn test_route_dependency_on_disabled_resource_counts_as_missing() {
    let mut needy = resource("needy", true);
    needy.dependencies = vec!["skill:off".to_string()];
    let registry = UnifiedRegistry::hydrate(vec![needy, resource("off", false)]);
    let orchestrator = BackendOrchestrator::new(test_config());
    let router = ExecutionRouter::new(&registry, &orchestrator);

    let mut sink = CaptureSink::new();
    let (result, decision) = router
        .route(
            &intent_for(&["skill:needy"]),
            "x",
            &TaskOptions::default(),
            &mut sink,
        )
        .await;

    assert!(!result.success);
    assert_eq!(result.error.as_deref(), Some("no viable candidate"));
    assert!(matches!(
        decision.attempts[0].feedback,
        CandidateFeedback::Skipped {
            reason: SkipReason::DependencyMissing,
            ..
        }
    ));
}

#[tokio::test]
async fn test_route_failed_candidate_retried_by_next() {
    let mut flaky = resource("flaky", true);
    flaky.backend = Some("claude".to_string()); // exits 1
    let registry = UnifiedRegistry::hydrate(vec![flaky, resource("solid", true)]);
    let orchestrator = BackendOrchestrator::new(test_config());
    let router = ExecutionRouter::new(&registry, &orchestrator);

    let mut sink = CaptureSink::new();
    let (result, decision) = router
        .route(
            &intent_for(&["skill:flaky", "skill:solid"]),
            "x",
            &TaskOptions::default(),
            &mut sink,
        )
        .await;

    assert!(result.success);
    assert_eq!(result.backend, "codex");
    assert!(matches!(
        decision.attempts[0].feedback,
        CandidateFeedback::Failed { .. }
    ));
    assert!(matches!(
        decision.attempts[1].feedback,
        CandidateFeedback::Succeeded { .. }
    ));
}

#[tokio::test]
async fn test_route_empty_candidates_spawns_nothing() {
    let registry = UnifiedRegistry::new();
    let orchestrator = BackendOrchestrator::new(test_config());
    let router = ExecutionRouter::new(&registry, &orchestrator);

    let mut sink = CaptureSink::new();
    let (result, decision) = router
        .route(&Intent::default(), "x", &TaskOptions::default(), &mut sink)
        .await;

    assert!(!result.success);
    assert_eq!(result.error.as_deref(), Some("no viable candidate"));
    assert!(decision.attempts.is_empty());
    assert!(decision.selected.is_none());
    assert_eq!(sink.into_string(), "", "no process may run");
}

#[tokio::test]
async fn test_route_exhausted_reports_reasons() {
    let mut flaky = resource("flaky", true);
    flaky.backend = Some("claude".to_string());
    let registry = UnifiedRegistry::hydrate(vec![flaky]);
    let orchestrator = BackendOrchestrator::new(test_config());
    let router = ExecutionRouter::new(&registry, &orchestrator);

    let mut sink = CaptureSink::new();
    let (result, decision) = router
        .route(
            &intent_for(&["skill:flaky", "skill:ghost"]),
            "x",
            &TaskOptions::default(),
            &mut sink,
        )
        .await;

    assert!(!result.success);
    assert_eq!(result.error.as_deref(), Some("no viable candidate"));
    assert_eq!(decision.attempts.len(), 2);
    // The hard failure is not swallowed: it is visible in the reasons.
    assert!(matches!(
        decision.attempts[0].feedback,
        CandidateFeedback::Failed { .. }
    ));
}

#[tokio::test]
async fn test_route_rejects_unknown_placeholder() {
    let mut odd = resource("odd", true);
    odd.sections = vec![Section {
        heading: "User Prompt Template".to_string(),
        body: "Do {{verb}} with {{request}}".to_string(),
    }];
    let registry = UnifiedRegistry::hydrate(vec![odd]);
    let orchestrator = BackendOrchestrator::new(test_config());
    let router = ExecutionRouter::new(&registry, &orchestrator);

    let mut sink = CaptureSink::new();
    let (result, decision) = router
        .route(
            &intent_for(&["skill:odd"]),
            "x",
            &TaskOptions::default(),
            &mut sink,
        )
        .await;

    assert!(!result.success);
    match &decision.attempts[0].feedback {
        CandidateFeedback::Failed { error } => {
            assert!(error.contains("{{verb}}"), "got: {error}");
        }
        other => panic!("expected Failed, got {other:?}"),
    }
}

#[tokio::test]
async fn test_route_raw_request_without_prompt_sections() {
    let mut bare = resource("bare", true);
    bare.sections.clear();
    let registry = UnifiedRegistry::hydrate(vec![bare]);
    let orchestrator = BackendOrchestrator::new(test_config());
    let router = ExecutionRouter::new(&registry, &orchestrator);

    let mut sink = CaptureSink::new();
    let (result, _) = router
        .route(
            &intent_for(&["skill:bare"]),
            "just this",
            &TaskOptions::default(),
            &mut sink,
        )
        .await;

    assert!(result.success);
    assert_eq!(result.prompt, "just this");
}

#[tokio::test]
async fn test_backend_resolution_falls_back_to_default() {
    let mut bare = resource("bare", true);
    bare.backend = None;

    let mut config = Config::with_home(std::env::temp_dir().join("maestro-router-test"));
    config.backends.clear();
    config.backend_order.clear();
    config
        .backend_order
        .push("gemini".to_string());
    config
        .backends
        .insert("gemini".to_string(), sh_backend("echo via-gemini"));
    config.default_backend = Some("gemini".to_string());

    let registry = UnifiedRegistry::hydrate(vec![bare]);
    let orchestrator = BackendOrchestrator::new(Arc::new(config));
    let router = ExecutionRouter::new(&registry, &orchestrator);

    let mut sink = CaptureSink::new();
    let (result, _) = router
        .route(
            &intent_for(&["skill:bare"]),
            "x",
            &TaskOptions::default(),
            &mut sink,
        )
        .await;

    assert!(result.success);
    assert_eq!(result.backend, "gemini");
}

#[tokio::test]
async fn test_route_feedback_reaches_event_log() {
    let tmp = tempfile::tempdir().expect("tempdir");
    let events = tmp.path().join("run.events.jsonl");
    let recorder = Arc::new(EventRecorder::create(&events).expect("recorder"));

    let registry = UnifiedRegistry::hydrate(vec![resource("greet", true)]);
    let orchestrator = BackendOrchestrator::new(test_config());
    let router = ExecutionRouter::new(&registry, &orchestrator).with_recorder(recorder);

    let mut sink = CaptureSink::new();
    let (result, _) = router
        .route(
            &intent_for(&["skill:greet"]),
            "x",
            &TaskOptions::default(),
            &mut sink,
        )
        .await;
    assert!(result.success);

    let log = std::fs::read_to_string(&events).expect("read log");
    let feedback_count = log
        .lines()
        .filter(|line| line.contains("router.feedback"))
        .count();
    assert_eq!(feedback_count, 1);
}

#[tokio::test]
async fn test_route_runs_backend_in_scoped_workdir() {
    let tmp = tempfile::tempdir().expect("tempdir");
    let temp_manager = TempFileManager::new(
        tmp.path().join("temp"),
        std::time::Duration::from_secs(3600),
    );

    let mut config = Config::with_home(tmp.path().to_path_buf());
    config.backends.clear();
    config.backend_order.clear();
    config.backend_order.push("codex".to_string());
    config.backends.insert("codex".to_string(), sh_backend("pwd"));

    let registry = UnifiedRegistry::hydrate(vec![resource("where", true)]);
    let orchestrator = BackendOrchestrator::new(Arc::new(config));
    let router = ExecutionRouter::new(&registry, &orchestrator).with_workdir(&temp_manager);

    let mut sink = CaptureSink::new();
    let (result, _) = router
        .route(
            &intent_for(&["skill:where"]),
            "x",
            &TaskOptions::default(),
            &mut sink,
        )
        .await;

    assert!(result.success, "error: {:?}", result.error);
    // The backend ran inside the namespace's scoped directory.
    let cwd = sink.into_string();
    assert!(cwd.contains("skill-where"), "got: {cwd}");
    assert!(tmp.path().join("temp/skill-where").is_dir());
}

#[test]
fn test_unknown_placeholder_scanner() {
    assert_eq!(unknown_placeholder("plain text"), None);
    assert_eq!(unknown_placeholder("{{request}} only"), None);
    assert_eq!(
        unknown_placeholder("{{request}} and {{oops}}"),
        Some("{{oops}}".to_string())
    );
    // Unclosed braces are not a placeholder.
    assert_eq!(unknown_placeholder("{{dangling"), None);
}
