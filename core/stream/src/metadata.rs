//! Lightweight execution metadata tracker.
//!
//! Pure streaming architecture: no output content is buffered. Lines are
//! inspected as they pass through and only a fixed set of facts is
//! retained: run id, error signal, line count, timings. The struct's
//! size is independent of how much output the backend produced.

use regex::Regex;
use serde::Serialize;
use std::sync::LazyLock;

/// Maximum number of error lines retained for diagnostics.
const MAX_ERROR_LINES: usize = 3;

/// Maximum stderr length carried into the final error message.
const MAX_STDERR_CHARS: usize = 500;

/// Maximum error length shown in the summary line.
const MAX_SUMMARY_ERROR_CHARS: usize = 100;

/// Keywords that mark a line as an error signal (lowercase).
const ERROR_KEYWORDS: &[&str] = &[
    "error",
    "failed",
    "exception",
    "traceback",
    "fatal",
    "critical",
    "[error]",
    "[fail]",
];

/// Text-format run id patterns, tried after the JSON fast path.
static RUN_ID_PATTERNS: LazyLock<Vec<Regex>> = LazyLock::new(|| {
    [
        r#"(?i)run[_\s-]id[:\s]+["`]?([a-zA-Z0-9_-]+)"#,
        r#"(?i)Run\s+ID[:\s]+["`]?([a-zA-Z0-9_-]+)"#,
    ]
    .iter()
    .filter_map(|p| Regex::new(p).ok())
    .collect()
});

/// Localisable tokens used by [`ExecutionMetadata::summary_line_with`].
///
/// The summary line is the only user-facing string this crate produces
/// whose wording is not fixed by the event renderings, so its tokens are
/// parameterised rather than hard-coded to one language.
#[derive(Debug, Clone)]
pub struct SummaryLabels {
    /// Status token for a successful run.
    pub complete: &'static str,
    /// Status token for a failed run.
    pub failed: &'static str,
    /// Unit token after the line count.
    pub lines: &'static str,
    /// Prefix token before the error excerpt.
    pub error: &'static str,
}

impl Default for SummaryLabels {
    fn default() -> Self {
        Self {
            complete: "Complete",
            failed: "Failed",
            lines: "lines",
            error: "error",
        }
    }
}

/// Per-execution metadata, extracted from the token stream without
/// retaining payload.
///
/// Written to only during stream consumption, sealed by [`Self::finalize`].
#[derive(Debug, Clone, Default, Serialize)]
pub struct ExecutionMetadata {
    /// Opaque run identifier, extracted at most once.
    pub run_id: Option<String>,

    /// Whether the process exited with code 0.
    pub success: bool,

    /// Error description, populated by [`Self::finalize`] on failure.
    pub error: Option<String>,

    /// Number of lines observed on the stream.
    pub line_count: u64,

    /// Wall-clock duration, set by the orchestrator.
    pub duration_seconds: f64,

    /// Process exit code, if the process ran to completion.
    pub returncode: Option<i32>,

    /// Running mean of per-line sink processing time.
    pub avg_line_processing_ms: f64,

    /// Number of sink errors swallowed during streaming.
    pub callback_errors: u32,

    /// Whether run id extraction has been attempted and succeeded.
    #[serde(skip)]
    pub run_id_extracted: bool,

    /// Whether an error keyword has been seen on the stream.
    pub error_detected: bool,

    /// Captured error lines (bounded; the keyword scan stops at the
    /// first hit, so in practice this holds at most one line).
    #[serde(skip)]
    error_lines: Vec<String>,
}

impl ExecutionMetadata {
    /// Creates an empty tracker.
    pub fn new() -> Self {
        Self::default()
    }

    /// Consumes one line of output, extracting metadata only.
    ///
    /// The line content is not retained (except for the first line that
    /// trips the error keyword scan; the scan stops once an error has
    /// been seen). `line_processing_ms` feeds the running mean when
    /// positive.
    pub fn extract_from_line(&mut self, line: &str, line_processing_ms: f64) {
        self.line_count += 1;

        if line_processing_ms > 0.0 {
            let n = self.line_count as f64;
            self.avg_line_processing_ms =
                (self.avg_line_processing_ms * (n - 1.0) + line_processing_ms) / n;
        }

        if !self.run_id_extracted {
            if let Some(id) = parse_run_id(line) {
                tracing::debug!(run_id = %id, "extracted run_id");
                self.run_id = Some(id);
                self.run_id_extracted = true;
            }
        }

        if !self.error_detected && is_error_line(line) {
            self.error_detected = true;
            if self.error_lines.len() < MAX_ERROR_LINES {
                self.error_lines.push(line.trim().to_string());
            }
        }
    }

    /// Notes a sink failure without aborting the stream.
    pub fn record_callback_error(&mut self) {
        self.callback_errors += 1;
    }

    /// Seals the metadata once the process has exited.
    ///
    /// On failure, the error field is populated from the captured error
    /// lines, then stderr (truncated), then a synthetic message.
    pub fn finalize(&mut self, returncode: i32, stderr: Option<&str>) {
        self.returncode = Some(returncode);
        self.success = returncode == 0;

        if !self.success && self.error.is_none() {
            self.error = Some(if !self.error_lines.is_empty() {
                self.error_lines.join("\n")
            } else if let Some(stderr) = stderr.filter(|s| !s.trim().is_empty()) {
                truncate_chars(stderr, MAX_STDERR_CHARS)
            } else {
                format!("Process failed with exit code {returncode}")
            });
        }

        tracing::debug!(
            success = self.success,
            lines = self.line_count,
            run_id = ?self.run_id,
            "metadata finalized"
        );
    }

    /// One-line status summary with default (English) labels.
    pub fn summary_line(&self) -> String {
        self.summary_line_with(&SummaryLabels::default())
    }

    /// One-line status summary with caller-supplied labels.
    ///
    /// Form: `[Complete] | 45.20s | 1234 lines | run_id: abc12345... | error: ...`
    pub fn summary_line_with(&self, labels: &SummaryLabels) -> String {
        let status = if self.success {
            labels.complete
        } else {
            labels.failed
        };

        let mut parts = vec![
            format!("[{status}]"),
            format!("{:.2}s", self.duration_seconds),
            format!("{} {}", self.line_count, labels.lines),
        ];

        if let Some(run_id) = &self.run_id {
            let head: String = run_id.chars().take(8).collect();
            parts.push(format!("run_id: {head}..."));
        }

        if !self.success {
            if let Some(error) = &self.error {
                let first = error.lines().next().unwrap_or_default();
                let brief: String = first.chars().take(MAX_SUMMARY_ERROR_CHARS).collect();
                parts.push(format!("{}: {brief}", labels.error));
            }
        }

        parts.join(" | ")
    }
}

/// Parses a run id from one output line.
///
/// Tried in order: JSON object with a `run_id` field, then the text
/// patterns. First match wins.
fn parse_run_id(line: &str) -> Option<String> {
    let trimmed = line.trim();
    if trimmed.starts_with('{') {
        if let Ok(value) = serde_json::from_str::<serde_json::Value>(trimmed) {
            if let Some(id) = value.get("run_id").and_then(|v| v.as_str()) {
                return Some(id.to_string());
            }
        }
    }

    for pattern in RUN_ID_PATTERNS.iter() {
        if let Some(captures) = pattern.captures(line) {
            if let Some(m) = captures.get(1) {
                return Some(m.as_str().to_string());
            }
        }
    }

    None
}

/// Returns `true` if the line carries an error keyword.
fn is_error_line(line: &str) -> bool {
    let lower = line.to_lowercase();
    ERROR_KEYWORDS.iter().any(|kw| lower.contains(kw))
}

/// Truncates to a character budget, appending an ellipsis when cut.
fn truncate_chars(text: &str, max: usize) -> String {
    if text.chars().count() > max {
        let head: String = text.chars().take(max).collect();
        format!("{head}...")
    } else {
        text.to_string()
    }
}

#[cfg(test)]
#[path = "metadata.test.rs"]
mod tests;
