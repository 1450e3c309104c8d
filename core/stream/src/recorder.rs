//! Event recording and replay.
//!
//! Every lifecycle and stream event of every invocation is appended as
//! one JSON object per line to an event log. The file is opened in
//! append mode (`O_APPEND` on POSIX) so concurrent writers interleave
//! whole lines. Replay reads a log and re-emits each stream event
//! through the same formatter, reconstructing the human-readable output
//! in order (timing is not reproduced).

use chrono::SecondsFormat;
use chrono::Utc;
use serde::Deserialize;
use serde::Serialize;
use serde_json::Value;
use snafu::ResultExt;
use std::fs::OpenOptions;
use std::io::Write;
use std::path::Path;
use std::path::PathBuf;
use std::sync::Mutex;

use crate::error::Result;
use crate::error::stream_error::IoSnafu;
use crate::error::stream_error::MalformedEventSnafu;
use crate::event::StreamEvent;
use crate::format::format_event;
use crate::sink::LineSink;

/// Which side of the pipeline produced an event.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EventChannel {
    /// A structured event decoded from the backend's stdout.
    Stream,
    /// An orchestrator lifecycle event (task start/end, attempts, ...).
    Lifecycle,
}

/// One recorded event line.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RecordedEvent {
    /// RFC3339 timestamp of the record.
    pub ts: String,

    /// Run identifier, when already known.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub run_id: Option<String>,

    /// Backend the event belongs to.
    pub backend: String,

    /// Pipeline stage index, or `None` outside pipelines.
    #[serde(default)]
    pub stage: Option<u32>,

    /// Event type tag.
    #[serde(rename = "type")]
    pub kind: String,

    /// Stream or lifecycle.
    pub channel: EventChannel,

    /// Type-specific payload.
    #[serde(default)]
    pub payload: Value,
}

impl RecordedEvent {
    /// Builds a stream-channel record stamped with the current time.
    pub fn stream(
        backend: impl Into<String>,
        stage: Option<u32>,
        run_id: Option<String>,
        kind: impl Into<String>,
        payload: Value,
    ) -> Self {
        Self {
            ts: now_rfc3339(),
            run_id,
            backend: backend.into(),
            stage,
            kind: kind.into(),
            channel: EventChannel::Stream,
            payload,
        }
    }

    /// Builds a lifecycle-channel record stamped with the current time.
    pub fn lifecycle(
        backend: impl Into<String>,
        stage: Option<u32>,
        kind: impl Into<String>,
        payload: Value,
    ) -> Self {
        Self {
            ts: now_rfc3339(),
            run_id: None,
            backend: backend.into(),
            stage,
            kind: kind.into(),
            channel: EventChannel::Lifecycle,
            payload,
        }
    }
}

/// Append-only JSONL event log.
///
/// Recording is best-effort: a write failure is logged and swallowed so
/// it can never abort a run.
#[derive(Debug)]
pub struct EventRecorder {
    path: PathBuf,
    file: Mutex<std::fs::File>,
}

impl EventRecorder {
    /// Opens (or creates) the event log at `path` in append mode.
    pub fn create(path: &Path) -> Result<Self> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).context(IoSnafu {
                message: format!("create event log directory {}", parent.display()),
            })?;
        }
        let file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(path)
            .context(IoSnafu {
                message: format!("open event log {}", path.display()),
            })?;
        Ok(Self {
            path: path.to_path_buf(),
            file: Mutex::new(file),
        })
    }

    /// The log file path.
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Appends one event as a JSON line.
    pub fn record(&self, event: &RecordedEvent) {
        let line = match serde_json::to_string(event) {
            Ok(line) => line,
            Err(err) => {
                tracing::warn!(error = %err, "failed to serialize event record");
                return;
            }
        };
        let Ok(mut file) = self.file.lock() else {
            tracing::warn!("event log lock poisoned, dropping record");
            return;
        };
        if let Err(err) = writeln!(file, "{line}") {
            tracing::warn!(error = %err, path = %self.path.display(), "failed to append event");
        }
    }
}

/// Output format of a replay.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReplayFormat {
    /// Re-render stream events through the formatter (human-readable).
    Text,
    /// Re-emit every record as one compact JSON line.
    Jsonl,
}

/// Replay statistics.
#[derive(Debug, Default, Clone, Copy)]
pub struct ReplayStats {
    /// Total records read from the log.
    pub events: usize,
    /// Lines delivered to the sink.
    pub rendered: usize,
}

/// Replays an event log through the formatter into `sink`.
///
/// Ordering is preserved; timing is not reproduced. In text mode only
/// stream-channel events render (lifecycle records carry no
/// human-readable form of their own); in jsonl mode every record is
/// re-emitted verbatim.
pub fn replay_events(
    path: &Path,
    format: ReplayFormat,
    sink: &mut dyn LineSink,
) -> Result<ReplayStats> {
    let content = std::fs::read_to_string(path).context(IoSnafu {
        message: format!("read event log {}", path.display()),
    })?;

    let mut stats = ReplayStats::default();
    for (idx, line) in content.lines().enumerate() {
        if line.trim().is_empty() {
            continue;
        }
        let record: RecordedEvent =
            serde_json::from_str(line).context(MalformedEventSnafu {
                path: path.display().to_string(),
                line_no: idx + 1,
            })?;
        stats.events += 1;

        match format {
            ReplayFormat::Text => {
                if record.channel == EventChannel::Stream {
                    let event = StreamEvent::from_parts(&record.kind, &record.payload);
                    emit(sink, &format_event(&event))?;
                    stats.rendered += 1;
                }
            }
            ReplayFormat::Jsonl => {
                let compact = serde_json::to_string(&record).unwrap_or_else(|_| line.to_string());
                emit(sink, &compact)?;
                stats.rendered += 1;
            }
        }
    }

    Ok(stats)
}

fn emit(sink: &mut dyn LineSink, line: &str) -> Result<()> {
    sink.emit(line).context(IoSnafu {
        message: "emit replayed line",
    })
}

fn now_rfc3339() -> String {
    Utc::now().to_rfc3339_opts(SecondsFormat::Millis, true)
}

#[cfg(test)]
#[path = "recorder.test.rs"]
mod tests;
