//! Backend process invocation from adapter specs.
//!
//! Turns a [`BackendSpec`] plus a prompt (and optional model overrides)
//! into a concrete argv + environment, resolving the closed placeholder
//! set `{prompt}` / `{model}` / `{model_provider}`.

use maestro_config::BackendSpec;
use maestro_config::PromptVia;

/// A fully-resolved invocation, ready to spawn.
#[derive(Debug, Clone, PartialEq)]
pub(crate) struct PreparedCommand {
    /// Executable path or name.
    pub program: String,

    /// Resolved argv (placeholders substituted).
    pub args: Vec<String>,

    /// Environment variables to inject.
    pub env: Vec<(String, String)>,

    /// Prompt to write to the child's stdin, when delivery is stdin.
    pub stdin_prompt: Option<String>,
}

/// Resolves a spec into a concrete invocation.
///
/// The model and model-provider argument groups are appended only when
/// the corresponding value is supplied.
pub(crate) fn prepare_command(
    spec: &BackendSpec,
    prompt: &str,
    model: Option<&str>,
    model_provider: Option<&str>,
) -> PreparedCommand {
    let mut args: Vec<String> = spec
        .args
        .iter()
        .map(|arg| substitute(arg, prompt, model, model_provider))
        .collect();

    if model.is_some() {
        args.extend(
            spec.model_args
                .iter()
                .map(|arg| substitute(arg, prompt, model, model_provider)),
        );
    }
    if model_provider.is_some() {
        args.extend(
            spec.model_provider_args
                .iter()
                .map(|arg| substitute(arg, prompt, model, model_provider)),
        );
    }

    PreparedCommand {
        program: spec.command.clone(),
        args,
        env: spec
            .env
            .iter()
            .map(|(k, v)| (k.clone(), v.clone()))
            .collect(),
        stdin_prompt: (spec.prompt_via == PromptVia::Stdin).then(|| prompt.to_string()),
    }
}

/// Substitutes the recognised placeholders in one argv element.
fn substitute(arg: &str, prompt: &str, model: Option<&str>, model_provider: Option<&str>) -> String {
    arg.replace("{prompt}", prompt)
        .replace("{model}", model.unwrap_or_default())
        .replace("{model_provider}", model_provider.unwrap_or_default())
}

#[cfg(test)]
#[path = "spawn.test.rs"]
mod tests;
