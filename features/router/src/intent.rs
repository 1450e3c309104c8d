//! Classified intent, produced externally and consumed by the router.

use serde::Deserialize;
use serde::Serialize;

/// Requested execution mode.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum IntentMode {
    Skill,
    Command,
    Agent,
    Prompt,
    /// No resource involved; the raw request goes straight to a backend.
    #[default]
    Plain,
}

/// Estimated task complexity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum Complexity {
    Low,
    #[default]
    Medium,
    High,
}

/// An already-classified request.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct Intent {
    /// Execution mode.
    #[serde(default)]
    pub mode: IntentMode,

    /// Free-form task tag (e.g. `code-review`).
    #[serde(default)]
    pub task_type: String,

    /// Estimated complexity.
    #[serde(default)]
    pub complexity: Complexity,

    /// Classifier confidence in `[0, 1]`.
    #[serde(default)]
    pub confidence: f64,

    /// Preferred namespace, when the classifier picked a single one.
    #[serde(default)]
    pub entity: Option<String>,

    /// Ranked candidate namespaces, primary first.
    #[serde(default)]
    pub candidates: Vec<String>,
}

impl Intent {
    /// The candidate list the router walks: `candidates` when
    /// non-empty, else the single `entity`, else nothing.
    ///
    /// When both are present and disagree, `candidates` wins.
    pub fn candidate_list(&self) -> Vec<String> {
        if !self.candidates.is_empty() {
            self.candidates.clone()
        } else if let Some(entity) = &self.entity {
            vec![entity.clone()]
        } else {
            Vec::new()
        }
    }
}

#[cfg(test)]
#[path = "intent.test.rs"]
mod tests;
