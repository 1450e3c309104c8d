use super::*;

#[test]
fn test_default_backends_validate() {
    for (name, spec) in default_backends() {
        spec.validate(&name).expect("stock spec should validate");
    }
}

#[test]
fn test_default_backend_order() {
    let names: Vec<String> = default_backends().into_iter().map(|(n, _)| n).collect();
    assert_eq!(names, vec!["codex", "claude", "gemini"]);
}

#[test]
fn test_unknown_placeholder_rejected() {
    let spec = BackendSpec {
        command: "x".to_string(),
        args: vec!["--temp".to_string(), "{temperature}".to_string()],
        model_args: Vec::new(),
        model_provider_args: Vec::new(),
        env: BTreeMap::new(),
        prompt_via: PromptVia::Argv,
        dialect: StreamDialect::Text,
    };
    let err = spec.validate("x").unwrap_err();
    assert!(err.to_string().contains("{temperature}"));
}

#[test]
fn test_stdin_with_prompt_placeholder_rejected() {
    let spec = BackendSpec {
        command: "x".to_string(),
        args: vec!["{prompt}".to_string()],
        model_args: Vec::new(),
        model_provider_args: Vec::new(),
        env: BTreeMap::new(),
        prompt_via: PromptVia::Stdin,
        dialect: StreamDialect::Text,
    };
    assert!(spec.validate("x").is_err());
}

#[test]
fn test_empty_command_rejected() {
    let spec = BackendSpec {
        command: "  ".to_string(),
        args: Vec::new(),
        model_args: Vec::new(),
        model_provider_args: Vec::new(),
        env: BTreeMap::new(),
        prompt_via: PromptVia::Stdin,
        dialect: StreamDialect::Text,
    };
    assert!(spec.validate("x").is_err());
}

#[test]
fn test_extract_placeholders_multiple() {
    let found = extract_placeholders("{model}/{model_provider}");
    assert_eq!(found, vec!["{model}", "{model_provider}"]);
}

#[test]
fn test_spec_round_trips_through_toml() {
    let (_, spec) = default_backends().remove(0);
    let text = toml::to_string(&spec).expect("serialize");
    let back: BackendSpec = toml::from_str(&text).expect("deserialize");
    assert_eq!(back.command, spec.command);
    assert_eq!(back.args, spec.args);
    assert_eq!(back.prompt_via, spec.prompt_via);
    assert_eq!(back.dialect, spec.dialect);
}
