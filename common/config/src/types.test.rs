use super::*;

#[test]
fn test_with_home_defaults() {
    let config = Config::with_home(PathBuf::from("/tmp/maestro-home"));
    assert_eq!(config.backend_order, vec!["codex", "claude", "gemini"]);
    assert_eq!(config.fallback_backend(), Some("codex"));
    assert_eq!(
        config.cache_dir,
        PathBuf::from("/tmp/maestro-home/orchestrator/registry")
    );
    assert_eq!(config.cache_ttl_seconds, DEFAULT_CACHE_TTL_SECS);
    assert!(config.project_root.is_none());
    config.validate().expect("defaults must validate");
}

#[test]
fn test_backend_lookup_rejects_unknown() {
    let config = Config::with_home(PathBuf::from("/tmp/x"));
    assert!(config.backend("codex").is_ok());
    let err = config.backend("mystery").unwrap_err();
    assert!(err.to_string().contains("mystery"));
    assert!(!config.has_backend("mystery"));
}

#[test]
fn test_validate_rejects_unknown_default() {
    let mut config = Config::with_home(PathBuf::from("/tmp/x"));
    config.default_backend = Some("nope".to_string());
    assert!(config.validate().is_err());
}

#[test]
fn test_validate_rejects_dangling_order_entry() {
    let mut config = Config::with_home(PathBuf::from("/tmp/x"));
    config.backend_order.push("ghost".to_string());
    assert!(config.validate().is_err());
}

#[test]
fn test_validate_rejects_empty_backend_table() {
    let mut config = Config::with_home(PathBuf::from("/tmp/x"));
    config.backends.clear();
    assert!(config.validate().is_err());
}
