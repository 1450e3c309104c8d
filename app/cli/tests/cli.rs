//! End-to-end CLI tests against stub shell-script backends.

use assert_cmd::Command;
use std::fs;
use std::path::Path;

/// Creates a maestro home with three stub backends:
/// `fake` (JSONL happy path), `flaky` (always exits 3) and
/// `echo` (prints its prompt).
fn setup_home() -> tempfile::TempDir {
    let home = tempfile::tempdir().expect("tempdir");

    write_script(
        &home.path().join("fake.sh"),
        "#!/bin/sh\necho '{\"type\":\"run.start\",\"run_id\":\"r-1\"}'\necho '{\"type\":\"assistant.output\",\"output\":\"pong\"}'\n",
    );
    write_script(&home.path().join("flaky.sh"), "#!/bin/sh\nexit 3\n");
    write_script(&home.path().join("echo.sh"), "#!/bin/sh\nprintf '%s\\n' \"$1\"\n");

    let config = format!(
        r#"backend_order = ["fake", "flaky", "echo"]

[backends.fake]
command = "sh"
args = ["{home}/fake.sh"]
dialect = "jsonl"

[backends.flaky]
command = "sh"
args = ["{home}/flaky.sh"]
dialect = "text"

[backends.echo]
command = "sh"
args = ["{home}/echo.sh", "{{prompt}}"]
dialect = "text"
"#,
        home = home.path().display()
    );
    fs::write(home.path().join("config.toml"), config).expect("write config");

    home
}

fn write_script(path: &Path, content: &str) {
    fs::write(path, content).expect("write script");
}

fn maestro(home: &tempfile::TempDir) -> Command {
    let mut cmd = Command::cargo_bin("maestro").expect("binary");
    cmd.env("MAESTRO_HOME", home.path());
    cmd
}

#[test]
fn test_run_task_streams_and_summarises() {
    let home = setup_home();
    let output = maestro(&home)
        .args(["run-task", "--backend", "fake", "--prompt", "ping"])
        .output()
        .expect("run");

    assert!(output.status.success(), "stderr: {}", String::from_utf8_lossy(&output.stderr));
    let stdout = String::from_utf8_lossy(&output.stdout);
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stdout.contains("Run started: r-1"), "stdout: {stdout}");
    assert!(stdout.contains("pong"));
    assert!(stderr.contains("[Complete]"), "stderr: {stderr}");
    assert!(stderr.contains("run_id: r-1"));
}

#[test]
fn test_run_task_failure_exit_code() {
    let home = setup_home();
    let output = maestro(&home)
        .args(["run-task", "--backend", "flaky", "--prompt", "x"])
        .output()
        .expect("run");

    assert_eq!(output.status.code(), Some(1));
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("[Failed]"), "stderr: {stderr}");
}

#[test]
fn test_run_task_rejects_undeclared_backend() {
    let home = setup_home();
    let output = maestro(&home)
        .args(["run-task", "--backend", "mystery", "--prompt", "x"])
        .output()
        .expect("run");

    assert_eq!(output.status.code(), Some(1));
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("unknown backend"), "stderr: {stderr}");
}

#[test]
fn test_run_task_writes_result_file() {
    let home = setup_home();
    let result_path = home.path().join("out/result.json");
    let output = maestro(&home)
        .args([
            "run-task",
            "--backend",
            "fake",
            "--prompt",
            "ping",
            "--output",
        ])
        .arg(&result_path)
        .arg("--quiet")
        .output()
        .expect("run");

    assert!(output.status.success());
    let result: serde_json::Value =
        serde_json::from_str(&fs::read_to_string(&result_path).expect("read result"))
            .expect("valid json");
    assert_eq!(result["backend"], "fake");
    assert_eq!(result["success"], true);
    // Streaming invariant: no buffered output in the result.
    assert_eq!(result["output"], "");
    assert_eq!(result["metadata"]["run_id"], "r-1");
    assert_eq!(result["metadata"]["line_count"], 2);
}

#[test]
fn test_fallback_run_recovers_and_reports_chain() {
    let home = setup_home();
    let report_path = home.path().join("out/fallback.json");
    let output = maestro(&home)
        .args([
            "fallback-run",
            "--primary",
            "flaky",
            "--fallback",
            "fake",
            "--prompt",
            "x",
            "--output",
        ])
        .arg(&report_path)
        .output()
        .expect("run");

    assert!(output.status.success());
    let report: serde_json::Value =
        serde_json::from_str(&fs::read_to_string(&report_path).expect("read report"))
            .expect("valid json");
    assert_eq!(report["backend"], "fake");
    assert_eq!(report["fallback_chain"], serde_json::json!(["flaky", "fake"]));
    assert_eq!(
        report["attempted_backends"],
        serde_json::json!(["flaky", "fake"])
    );
}

#[test]
fn test_fallback_run_all_failed() {
    let home = setup_home();
    let output = maestro(&home)
        .args([
            "fallback-run",
            "--primary",
            "flaky",
            "--prompt",
            "x",
            "--quiet",
        ])
        .output()
        .expect("run");

    assert_eq!(output.status.code(), Some(1));
}

#[test]
fn test_parallel_run_writes_per_backend_results() {
    let home = setup_home();
    let out_dir = home.path().join("parallel");
    let output = maestro(&home)
        .args([
            "parallel-run",
            "--prompt",
            "x",
            "--backends",
            "fake,flaky",
            "--workers",
            "2",
            "--output",
        ])
        .arg(&out_dir)
        .output()
        .expect("run");

    // Any-success composite: fake succeeded.
    assert!(output.status.success());

    let summary: serde_json::Value = serde_json::from_str(
        &fs::read_to_string(out_dir.join("parallel_summary.json")).expect("read summary"),
    )
    .expect("valid json");
    assert_eq!(summary["success"], true);
    assert_eq!(summary["results"]["fake"]["success"], true);
    assert_eq!(summary["results"]["flaky"]["success"], false);

    assert!(out_dir.join("fake_summary.json").is_file());
    assert!(out_dir.join("flaky_summary.json").is_file());
}

#[test]
fn test_parallel_run_all_failed_exit_code() {
    let home = setup_home();
    let output = maestro(&home)
        .args([
            "parallel-run",
            "--prompt",
            "x",
            "--backends",
            "flaky",
            "--quiet",
        ])
        .output()
        .expect("run");

    assert_eq!(output.status.code(), Some(1));
}

#[test]
fn test_pipeline_passes_output_between_stages() {
    let home = setup_home();
    let out_dir = home.path().join("pipeline");
    let output = maestro(&home)
        .args([
            "pipeline",
            "--stage",
            "echo:hello",
            "--stage",
            "echo:review",
            "--output",
        ])
        .arg(&out_dir)
        .output()
        .expect("run");

    assert!(output.status.success(), "stderr: {}", String::from_utf8_lossy(&output.stderr));

    let stage2: serde_json::Value = serde_json::from_str(
        &fs::read_to_string(out_dir.join("stage_2_echo.json")).expect("read stage"),
    )
    .expect("valid json");
    let prompt = stage2["prompt"].as_str().expect("prompt");
    assert!(prompt.starts_with("review"));
    assert!(prompt.contains("--- Output from previous stage (echo) ---"));
    assert!(prompt.contains("\nhello"));

    let summary: serde_json::Value = serde_json::from_str(
        &fs::read_to_string(out_dir.join("pipeline_summary.json")).expect("read summary"),
    )
    .expect("valid json");
    assert_eq!(summary["success"], true);
    assert_eq!(summary["stages"].as_array().map(Vec::len), Some(2));
}

#[test]
fn test_pipeline_stops_on_stage_failure() {
    let home = setup_home();
    let output = maestro(&home)
        .args([
            "pipeline",
            "--stage",
            "flaky:x",
            "--stage",
            "echo:y",
            "--quiet",
        ])
        .output()
        .expect("run");

    assert_eq!(output.status.code(), Some(1));
}

#[test]
fn test_pipeline_rejects_malformed_stage() {
    let home = setup_home();
    let output = maestro(&home)
        .args(["pipeline", "--stage", "no-colon-here"])
        .output()
        .expect("run");

    assert_eq!(output.status.code(), Some(1));
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("backend:prompt"), "stderr: {stderr}");
}

#[test]
fn test_replay_reproduces_live_rendering() {
    let home = setup_home();
    let events = home.path().join("run.events.jsonl");

    let live = maestro(&home)
        .args([
            "run-task",
            "--backend",
            "fake",
            "--prompt",
            "ping",
            "--quiet",
            "--events",
        ])
        .arg(&events)
        .output()
        .expect("live run");
    assert!(live.status.success());

    let replayed = maestro(&home)
        .args(["replay-events", "--quiet", "--events"])
        .arg(&events)
        .output()
        .expect("replay");
    assert!(replayed.status.success());

    // Ordering-faithful reconstruction of the human-readable stream.
    assert_eq!(live.stdout, replayed.stdout);
}

#[test]
fn test_replay_missing_file_fails() {
    let home = setup_home();
    let output = maestro(&home)
        .args(["replay-events", "--events", "/nonexistent/run.events.jsonl"])
        .output()
        .expect("run");

    assert_eq!(output.status.code(), Some(1));
}

#[test]
fn test_route_through_registry() {
    let home = setup_home();
    fs::create_dir_all(home.path().join("skills")).expect("mkdir skills");
    fs::write(
        home.path().join("skills/greet.md"),
        "# greet\n\ndescription: Greeter\nbackend: echo\n\n## User Prompt Template\n\nGreeting request: {{request}}\n",
    )
    .expect("write skill");

    let output = maestro(&home)
        .args([
            "route",
            "--request",
            "hi there",
            "--candidate",
            "skill:greet",
        ])
        .output()
        .expect("run");

    assert!(output.status.success(), "stderr: {}", String::from_utf8_lossy(&output.stderr));
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("Greeting request: hi there"), "stdout: {stdout}");
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("Served by skill:greet"), "stderr: {stderr}");
}

#[test]
fn test_route_without_candidates_fails_cleanly() {
    let home = setup_home();
    let output = maestro(&home)
        .args(["route", "--request", "x"])
        .output()
        .expect("run");

    assert_eq!(output.status.code(), Some(1));
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("no viable candidate"), "stderr: {stderr}");
}

#[test]
fn test_cache_stats_and_clear_lifecycle() {
    let home = setup_home();

    // No cache before any scan.
    let before = maestro(&home)
        .args(["cache", "stats", "--json"])
        .output()
        .expect("stats");
    assert!(before.status.success());
    assert!(String::from_utf8_lossy(&before.stdout).contains("no_cache"));

    // A route populates the cache (even when routing finds nothing).
    maestro(&home)
        .args(["route", "--request", "x", "--quiet"])
        .output()
        .expect("route");

    let after = maestro(&home)
        .args(["cache", "stats", "--json"])
        .output()
        .expect("stats");
    assert!(String::from_utf8_lossy(&after.stdout).contains("cached"));

    // Clear drops it again.
    let cleared = maestro(&home)
        .args(["cache", "clear"])
        .output()
        .expect("clear");
    assert!(cleared.status.success());

    let final_stats = maestro(&home)
        .args(["cache", "stats", "--json"])
        .output()
        .expect("stats");
    assert!(String::from_utf8_lossy(&final_stats.stdout).contains("no_cache"));
}
