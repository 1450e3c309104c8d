//! Backend adapter specifications.
//!
//! Each backend is an external command-line program treated as a black
//! box. The adapter spec declares how to invoke it: executable, argv
//! template, environment to inject, whether the prompt travels via stdin
//! or argv, and the stream dialect the process is expected to emit.
//!
//! The argv template recognises three placeholders: `{prompt}`,
//! `{model}` and `{model_provider}`. The substitution set is closed;
//! any other `{...}` token in a template is a validation error. The
//! model/provider argument groups are kept in separate vectors so they
//! are only appended when a value is actually supplied.

use serde::Deserialize;
use serde::Serialize;
use std::collections::BTreeMap;

use crate::error::Result;
use crate::error::config_error::ValidationSnafu;

/// How the prompt is delivered to the backend process.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum PromptVia {
    /// Prompt is written to the child's stdin and the pipe is closed.
    Stdin,
    /// Prompt replaces the `{prompt}` placeholder in the argv template.
    #[default]
    Argv,
}

/// Stream dialect the backend is declared to emit on stdout.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum StreamDialect {
    /// One JSON event object per line.
    #[default]
    Jsonl,
    /// Free-form text lines.
    Text,
}

/// Declarative invocation contract for one backend.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BackendSpec {
    /// Executable path or name resolved via `PATH`.
    pub command: String,

    /// Base argv template. May contain `{prompt}` when `prompt_via = "argv"`.
    #[serde(default)]
    pub args: Vec<String>,

    /// Arguments appended when a model is supplied. May contain `{model}`.
    #[serde(default)]
    pub model_args: Vec<String>,

    /// Arguments appended when a model provider is supplied.
    /// May contain `{model_provider}`.
    #[serde(default)]
    pub model_provider_args: Vec<String>,

    /// Environment variables injected into the child process.
    #[serde(default)]
    pub env: BTreeMap<String, String>,

    /// Prompt delivery channel.
    #[serde(default)]
    pub prompt_via: PromptVia,

    /// Declared stdout dialect.
    #[serde(default)]
    pub dialect: StreamDialect,
}

/// Placeholders recognised in argv templates.
const KNOWN_PLACEHOLDERS: &[&str] = &["{prompt}", "{model}", "{model_provider}"];

impl BackendSpec {
    /// Validates the argv templates against the closed placeholder set.
    ///
    /// Rejects unknown `{...}` tokens and a `{prompt}` placeholder in
    /// combination with stdin prompt delivery.
    pub fn validate(&self, name: &str) -> Result<()> {
        let all_args = self
            .args
            .iter()
            .chain(&self.model_args)
            .chain(&self.model_provider_args);
        for arg in all_args {
            for token in extract_placeholders(arg) {
                if !KNOWN_PLACEHOLDERS.contains(&token.as_str()) {
                    return ValidationSnafu {
                        message: format!("backend {name}: unknown argv placeholder {token}"),
                    }
                    .fail();
                }
            }
        }

        if self.prompt_via == PromptVia::Stdin && self.args.iter().any(|a| a.contains("{prompt}")) {
            return ValidationSnafu {
                message: format!("backend {name}: {{prompt}} placeholder with prompt_via = stdin"),
            }
            .fail();
        }

        if self.command.trim().is_empty() {
            return ValidationSnafu {
                message: format!("backend {name}: empty command"),
            }
            .fail();
        }

        Ok(())
    }
}

/// Extracts `{...}` placeholder tokens from one argv element.
fn extract_placeholders(arg: &str) -> Vec<String> {
    let mut out = Vec::new();
    let mut rest = arg;
    while let Some(start) = rest.find('{') {
        let Some(len) = rest[start..].find('}') else {
            break;
        };
        out.push(rest[start..start + len + 1].to_string());
        rest = &rest[start + len + 1..];
    }
    out
}

/// The stock backend adapter table.
///
/// These match the upstream CLI invocations the orchestrator was built
/// against. Entries are ordered; the first one doubles as the fallback
/// default backend when neither a resource hint nor a configured default
/// applies.
pub fn default_backends() -> Vec<(String, BackendSpec)> {
    vec![
        (
            "codex".to_string(),
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
                env: BTreeMap::new(),
                prompt_via: PromptVia::Argv,
                dialect: StreamDialect::Jsonl,
            },
        ),
        (
            "claude".to_string(),
            BackendSpec {
                command: "claude".to_string(),
                args: vec![
                    "-p".to_string(),
                    "{prompt}".to_string(),
                    "--output-format".to_string(),
                    "stream-json".to_string(),
                    "--verbose".to_string(),
                ],
                model_args: vec!["--model".to_string(), "{model}".to_string()],
                model_provider_args: Vec::new(),
                env: BTreeMap::new(),
                prompt_via: PromptVia::Argv,
                dialect: StreamDialect::Jsonl,
            },
        ),
        (
            "gemini".to_string(),
            BackendSpec {
                command: "gemini".to_string(),
                args: vec!["-p".to_string(), "{prompt}".to_string()],
                model_args: vec!["-m".to_string(), "{model}".to_string()],
                model_provider_args: Vec::new(),
                env: BTreeMap::new(),
                prompt_via: PromptVia::Argv,
                dialect: StreamDialect::Text,
            },
        ),
    ]
}

#[cfg(test)]
#[path = "backend.test.rs"]
mod tests;
