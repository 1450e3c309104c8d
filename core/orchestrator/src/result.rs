//! Execution result types.

use maestro_stream::ExecutionMetadata;
use serde::Serialize;
use serde::ser::SerializeMap;
use serde::ser::SerializeStruct;

/// Outcome of one backend invocation.
///
/// In the streaming architecture `output` is always empty: observable
/// bytes flow through the stream sink, the result carries metadata only.
#[derive(Debug, Clone, Serialize)]
pub struct TaskResult {
    /// Backend identifier the task ran on.
    pub backend: String,

    /// The effective prompt the backend received.
    pub prompt: String,

    /// Whether the invocation succeeded.
    pub success: bool,

    /// Wall-clock duration of the invocation.
    pub duration_seconds: f64,

    /// Always empty in the streaming path.
    pub output: String,

    /// Extracted execution metadata.
    pub metadata: ExecutionMetadata,

    /// Error description when `success` is false.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl TaskResult {
    /// Builds a failed result without a process having run.
    pub fn failed(backend: impl Into<String>, prompt: impl Into<String>, error: impl Into<String>) -> Self {
        let error = error.into();
        let mut metadata = ExecutionMetadata::new();
        metadata.error = Some(error.clone());
        Self {
            backend: backend.into(),
            prompt: prompt.into(),
            success: false,
            duration_seconds: 0.0,
            output: String::new(),
            metadata,
            error: Some(error),
        }
    }

    /// One-line status summary delegated to the metadata tracker.
    pub fn summary_line(&self) -> String {
        self.metadata.summary_line()
    }
}

/// Outcome of a parallel fan-out.
///
/// Results preserve the input backend order; the composite succeeds if
/// at least one backend succeeded.
#[derive(Debug, Clone)]
pub struct ParallelResult {
    results: Vec<(String, TaskResult)>,
}

impl ParallelResult {
    /// Builds a result from `(backend, result)` pairs in input order.
    pub fn new(results: Vec<(String, TaskResult)>) -> Self {
        Self { results }
    }

    /// The per-backend results, in input order.
    pub fn results(&self) -> &[(String, TaskResult)] {
        &self.results
    }

    /// Looks up the result for one backend.
    pub fn get(&self, backend: &str) -> Option<&TaskResult> {
        self.results
            .iter()
            .find(|(name, _)| name == backend)
            .map(|(_, result)| result)
    }

    /// Composite status: any single success counts.
    pub fn any_success(&self) -> bool {
        self.results.iter().any(|(_, result)| result.success)
    }

    /// Number of backends in the fan-out.
    pub fn len(&self) -> usize {
        self.results.len()
    }

    /// Whether the fan-out was empty.
    pub fn is_empty(&self) -> bool {
        self.results.is_empty()
    }
}

impl Serialize for ParallelResult {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        struct OrderedResults<'a>(&'a [(String, TaskResult)]);

        impl Serialize for OrderedResults<'_> {
            fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
                let mut map = serializer.serialize_map(Some(self.0.len()))?;
                for (backend, result) in self.0 {
                    map.serialize_entry(backend, result)?;
                }
                map.end()
            }
        }

        let mut state = serializer.serialize_struct("ParallelResult", 2)?;
        state.serialize_field("results", &OrderedResults(&self.results))?;
        state.serialize_field("success", &self.any_success())?;
        state.end()
    }
}

/// Outcome of a sequential pipeline.
#[derive(Debug, Clone, Serialize)]
pub struct PipelineResult {
    /// Completed (and, for the last entry, possibly failed) stages.
    pub stages: Vec<TaskResult>,

    /// Wall-clock duration from first spawn to last exit.
    pub total_duration_seconds: f64,

    /// Whether every stage succeeded.
    pub success: bool,
}

#[cfg(test)]
#[path = "result.test.rs"]
mod tests;
