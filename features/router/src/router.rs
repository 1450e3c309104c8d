//! The execution router.

use serde::Serialize;
use serde_json::json;
use std::sync::Arc;

use maestro_orchestrator::BackendOrchestrator;
use maestro_orchestrator::TaskOptions;
use maestro_orchestrator::TaskResult;
use maestro_registry::Resource;
use maestro_registry::UnifiedRegistry;
use maestro_stream::EventRecorder;
use maestro_stream::LineSink;
use maestro_stream::RecordedEvent;
use maestro_workdir::TempFileManager;

use crate::intent::Intent;

/// The only placeholder recognised in prompt templates.
const REQUEST_PLACEHOLDER: &str = "{{request}}";

/// Section holding the resource's system prompt.
const SYSTEM_PROMPT_SECTION: &str = "System Prompt";

/// Section holding the resource's user prompt template.
const USER_PROMPT_SECTION: &str = "User Prompt Template";

/// Why a candidate was skipped without dispatching.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SkipReason {
    /// Resource missing from the registry or disabled.
    NotAvailable,
    /// A declared dependency does not resolve to an enabled resource.
    DependencyMissing,
}

impl SkipReason {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::NotAvailable => "not_available",
            Self::DependencyMissing => "dependency_missing",
        }
    }
}

/// Per-candidate feedback.
#[derive(Debug, Clone, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum CandidateFeedback {
    Skipped {
        reason: SkipReason,
        detail: String,
    },
    Failed {
        error: String,
    },
    Succeeded {
        duration_seconds: f64,
        #[serde(skip_serializing_if = "Option::is_none")]
        run_id: Option<String>,
    },
}

/// One candidate's outcome within a routing decision.
#[derive(Debug, Clone, Serialize)]
pub struct CandidateOutcome {
    pub namespace: String,
    #[serde(flatten)]
    pub feedback: CandidateFeedback,
}

/// The record of one routing decision.
#[derive(Debug, Clone, Default, Serialize)]
pub struct RouterDecision {
    /// Every candidate considered, in order, with its outcome.
    pub attempts: Vec<CandidateOutcome>,

    /// The namespace that served the request, when one did.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub selected: Option<String>,
}

/// Routes requests through the registry to the backend orchestrator.
pub struct ExecutionRouter<'a> {
    registry: &'a UnifiedRegistry,
    orchestrator: &'a BackendOrchestrator,
    recorder: Option<Arc<EventRecorder>>,
    workdir: Option<&'a TempFileManager>,
}

impl<'a> ExecutionRouter<'a> {
    /// Creates a router over a registry and an orchestrator.
    pub fn new(registry: &'a UnifiedRegistry, orchestrator: &'a BackendOrchestrator) -> Self {
        Self {
            registry,
            orchestrator,
            recorder: None,
            workdir: None,
        }
    }

    /// Attaches an event recorder for per-candidate feedback.
    pub fn with_recorder(mut self, recorder: Arc<EventRecorder>) -> Self {
        self.recorder = Some(recorder);
        self
    }

    /// Attaches a temp file manager; each dispatched backend then runs
    /// inside a scoped working directory for its namespace.
    pub fn with_workdir(mut self, workdir: &'a TempFileManager) -> Self {
        self.workdir = Some(workdir);
        self
    }

    /// Routes one request.
    ///
    /// Walks the candidate list in order; availability and dependency
    /// failures are retriable by the next candidate. When no candidate
    /// succeeds, a synthetic failed result with `error = "no viable
    /// candidate"` is returned alongside the per-candidate reasons; an
    /// empty candidate list spawns no process at all.
    pub async fn route(
        &self,
        intent: &Intent,
        request: &str,
        options: &TaskOptions,
        sink: &mut dyn LineSink,
    ) -> (TaskResult, RouterDecision) {
        let candidates = intent.candidate_list();
        let mut decision = RouterDecision::default();

        for namespace in &candidates {
            let Some(resource) = self.registry.get(namespace) else {
                self.skip(&mut decision, namespace, SkipReason::NotAvailable,
                    "resource missing or disabled".to_string());
                continue;
            };

            if let Some(missing) = self.missing_dependency(resource) {
                self.skip(&mut decision, namespace, SkipReason::DependencyMissing,
                    format!("dependency {missing} not available"));
                continue;
            }

            let backend = self.resolve_backend(resource);
            let Some(backend) = backend else {
                self.fail(&mut decision, namespace, "no backend configured".to_string());
                continue;
            };
            if !self.orchestrator.config().has_backend(&backend) {
                self.fail(
                    &mut decision,
                    namespace,
                    format!("backend {backend} not declared in configuration"),
                );
                continue;
            }

            let prompt = match build_prompt(resource, request) {
                Ok(prompt) => prompt,
                Err(error) => {
                    self.fail(&mut decision, namespace, error);
                    continue;
                }
            };

            let mut task_options = options.clone();
            if let Some(workdir) = self.workdir {
                match workdir.scoped_dir(namespace) {
                    Ok(dir) => task_options.cwd = Some(dir),
                    Err(err) => {
                        tracing::warn!(namespace = %namespace, error = %err, "no scoped workdir");
                    }
                }
            }

            tracing::debug!(
                namespace = %namespace,
                backend = %backend,
                "dispatching candidate"
            );
            let result = self
                .orchestrator
                .run_task(&backend, &prompt, &task_options, sink)
                .await;

            if result.success {
                let feedback = CandidateFeedback::Succeeded {
                    duration_seconds: result.duration_seconds,
                    run_id: result.metadata.run_id.clone(),
                };
                self.record_feedback(namespace, &feedback);
                decision.attempts.push(CandidateOutcome {
                    namespace: namespace.clone(),
                    feedback,
                });
                decision.selected = Some(namespace.clone());
                return (result, decision);
            }

            let error = result.error.clone().unwrap_or_else(|| "unknown error".to_string());
            self.fail(&mut decision, namespace, error);
        }

        let result = TaskResult::failed(String::new(), request, "no viable candidate");
        (result, decision)
    }

    /// Backend resolution order: resource hint, project-wide default,
    /// first configured backend.
    fn resolve_backend(&self, resource: &Resource) -> Option<String> {
        let config = self.orchestrator.config();
        resource
            .backend
            .clone()
            .or_else(|| config.default_backend.clone())
            .or_else(|| config.fallback_backend().map(str::to_string))
    }

    /// First declared dependency that does not resolve to an enabled
    /// resource, if any.
    fn missing_dependency(&self, resource: &Resource) -> Option<String> {
        resource
            .dependencies
            .iter()
            .find(|dependency| self.registry.get(dependency).is_none())
            .cloned()
    }

    fn skip(
        &self,
        decision: &mut RouterDecision,
        namespace: &str,
        reason: SkipReason,
        detail: String,
    ) {
        tracing::debug!(namespace = %namespace, reason = reason.as_str(), "candidate skipped");
        let feedback = CandidateFeedback::Skipped { reason, detail };
        self.record_feedback(namespace, &feedback);
        decision.attempts.push(CandidateOutcome {
            namespace: namespace.to_string(),
            feedback,
        });
    }

    fn fail(&self, decision: &mut RouterDecision, namespace: &str, error: String) {
        tracing::debug!(namespace = %namespace, error = %error, "candidate failed");
        let feedback = CandidateFeedback::Failed { error };
        self.record_feedback(namespace, &feedback);
        decision.attempts.push(CandidateOutcome {
            namespace: namespace.to_string(),
            feedback,
        });
    }

    /// Feedback is the sole degrade signal visible to callers; it goes
    /// to the event log alongside the in-memory decision record.
    fn record_feedback(&self, namespace: &str, feedback: &CandidateFeedback) {
        if let Some(recorder) = &self.recorder {
            let payload = serde_json::to_value(feedback).unwrap_or_else(|_| json!({}));
            recorder.record(&RecordedEvent::lifecycle(
                "",
                None,
                "router.feedback",
                json!({ "namespace": namespace, "feedback": payload }),
            ));
        }
    }
}

/// Builds the effective prompt from the resource's prompt sections.
///
/// `System Prompt` and `User Prompt Template` are concatenated with
/// `{{request}}` substituted; with neither section present the raw
/// request is used. The substitution set is closed: any other
/// `{{...}}` placeholder is rejected.
fn build_prompt(resource: &Resource, request: &str) -> Result<String, String> {
    let system = resource.section(SYSTEM_PROMPT_SECTION);
    let template = resource.section(USER_PROMPT_SECTION);

    if system.is_none() && template.is_none() {
        return Ok(request.to_string());
    }

    let mut parts = Vec::new();
    for section in [system, template].into_iter().flatten() {
        if let Some(unknown) = unknown_placeholder(section) {
            return Err(format!("unknown prompt placeholder {unknown}"));
        }
        parts.push(section.replace(REQUEST_PLACEHOLDER, request));
    }
    Ok(parts.join("\n\n"))
}

/// First `{{...}}` token that is not the request placeholder.
fn unknown_placeholder(text: &str) -> Option<String> {
    let mut rest = text;
    while let Some(start) = rest.find("{{") {
        let tail = &rest[start..];
        let Some(len) = tail.find("}}") else {
            return None;
        };
        let token = &tail[..len + 2];
        if token != REQUEST_PLACEHOLDER {
            return Some(token.to_string());
        }
        rest = &tail[len + 2..];
    }
    None
}

#[cfg(test)]
#[path = "router.test.rs"]
mod tests;
