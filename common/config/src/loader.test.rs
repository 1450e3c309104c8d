use super::*;
use std::fs;

#[test]
fn test_load_without_config_file() {
    let tmp = tempfile::tempdir().expect("tempdir");
    let config = load_config_from(tmp.path()).expect("load defaults");
    assert_eq!(config.home, tmp.path());
    assert_eq!(config.backend_order.len(), 3);
}

#[test]
fn test_load_with_overrides() {
    let tmp = tempfile::tempdir().expect("tempdir");
    fs::write(
        tmp.path().join(CONFIG_FILE),
        r#"
default_backend = "claude"
cache_ttl_seconds = 60

[backends.echo]
command = "echo"
args = ["{prompt}"]
dialect = "text"
"#,
    )
    .expect("write config");

    let config = load_config_from(tmp.path()).expect("load");
    assert_eq!(config.default_backend.as_deref(), Some("claude"));
    assert_eq!(config.cache_ttl_seconds, 60);
    assert!(config.has_backend("echo"));
    // Declared backend joins the invocation order after the stock set.
    assert_eq!(config.backend_order.last().map(String::as_str), Some("echo"));
}

#[test]
fn test_load_replaces_stock_backend() {
    let tmp = tempfile::tempdir().expect("tempdir");
    fs::write(
        tmp.path().join(CONFIG_FILE),
        r#"
[backends.codex]
command = "my-codex"
args = []
prompt_via = "stdin"
"#,
    )
    .expect("write config");

    let config = load_config_from(tmp.path()).expect("load");
    assert_eq!(config.backend("codex").expect("codex").command, "my-codex");
    // Replacing a stock entry must not duplicate it in the order.
    let codex_count = config
        .backend_order
        .iter()
        .filter(|n| n.as_str() == "codex")
        .count();
    assert_eq!(codex_count, 1);
}

#[test]
fn test_load_rejects_malformed_toml() {
    let tmp = tempfile::tempdir().expect("tempdir");
    fs::write(tmp.path().join(CONFIG_FILE), "backends = 3").expect("write config");
    assert!(load_config_from(tmp.path()).is_err());
}

#[test]
fn test_explicit_backend_order_override() {
    let tmp = tempfile::tempdir().expect("tempdir");
    fs::write(
        tmp.path().join(CONFIG_FILE),
        r#"backend_order = ["gemini", "codex", "claude"]"#,
    )
    .expect("write config");

    let config = load_config_from(tmp.path()).expect("load");
    assert_eq!(config.fallback_backend(), Some("gemini"));
}
