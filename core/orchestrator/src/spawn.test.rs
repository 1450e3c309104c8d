use super::*;
use std::collections::BTreeMap;

fn spec() -> BackendSpec {
    BackendSpec {
        command: "codex".to_string(),
        args: vec![
            "exec".to_string(),
            "--json".to_string(),
            "{prompt}".to_string(),
        ],
        model_args: vec!["--model".to_string(), "{model}".to_string()],
        model_provider_args: vec![
            "--model-provider".to_string(),
            "{model_provider}".to_string(),
        ],
        env: BTreeMap::from([("API_KEY".to_string(), "k".to_string())]),
        prompt_via: PromptVia::Argv,
        dialect: maestro_config::StreamDialect::Jsonl,
    }
}

#[test]
fn test_prompt_substitution_via_argv() {
    let prepared = prepare_command(&spec(), "do the thing", None, None);
    assert_eq!(prepared.program, "codex");
    assert_eq!(prepared.args, vec!["exec", "--json", "do the thing"]);
    assert!(prepared.stdin_prompt.is_none());
    assert_eq!(prepared.env, vec![("API_KEY".to_string(), "k".to_string())]);
}

#[test]
fn test_model_args_appended_only_when_given() {
    let without = prepare_command(&spec(), "p", None, None);
    assert!(!without.args.iter().any(|a| a == "--model"));

    let with = prepare_command(&spec(), "p", Some("gpt-5"), None);
    assert_eq!(
        with.args,
        vec!["exec", "--json", "p", "--model", "gpt-5"]
    );
}

#[test]
fn test_model_provider_args_appended_only_when_given() {
    let prepared = prepare_command(&spec(), "p", Some("m"), Some("openrouter"));
    assert_eq!(
        prepared.args,
        vec![
            "exec",
            "--json",
            "p",
            "--model",
            "m",
            "--model-provider",
            "openrouter"
        ]
    );
}

#[test]
fn test_stdin_prompt_delivery() {
    let mut spec = spec();
    spec.prompt_via = PromptVia::Stdin;
    spec.args = vec!["exec".to_string()];

    let prepared = prepare_command(&spec, "the prompt", None, None);
    assert_eq!(prepared.args, vec!["exec"]);
    assert_eq!(prepared.stdin_prompt.as_deref(), Some("the prompt"));
}
