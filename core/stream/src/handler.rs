//! Line-oriented stream consumption.
//!
//! The handler drives a child process's stdout: for each line it
//! optionally decodes a structured event, renders it, hands the result
//! to the caller's sink, and feeds `(line, delta_ms)` into the metadata
//! tracker. It owns no buffer of past lines; lines reach the sink in
//! strict producer order.

use std::borrow::Cow;
use std::time::Instant;
use tokio::io::AsyncBufRead;
use tokio::io::AsyncBufReadExt;

use crate::error::Result;
use crate::error::stream_error::IoSnafu;
use crate::event::StreamEvent;
use crate::format::format_event;
use crate::metadata::ExecutionMetadata;
use crate::recorder::EventRecorder;
use crate::recorder::RecordedEvent;
use crate::sink::LineSink;
use snafu::ResultExt;

/// How incoming lines are interpreted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum FormatMode {
    /// Lines pass through untouched.
    Raw,
    /// JSON event lines are decoded and re-rendered; anything that does
    /// not parse passes through as-is (protocol errors downgrade to
    /// text, they are never raised).
    #[default]
    Structured,
}

/// Drives line-oriented consumption of one stream source.
pub struct StreamHandler<'r> {
    format_mode: FormatMode,
    recorder: Option<&'r EventRecorder>,
    backend: String,
    stage: Option<u32>,
}

impl<'r> StreamHandler<'r> {
    /// Creates a handler with the given interpretation mode.
    pub fn new(format_mode: FormatMode) -> Self {
        Self {
            format_mode,
            recorder: None,
            backend: String::new(),
            stage: None,
        }
    }

    /// Attaches an event recorder; decoded stream events are appended
    /// to it as they pass through.
    pub fn with_recorder(mut self, recorder: &'r EventRecorder) -> Self {
        self.recorder = Some(recorder);
        self
    }

    /// Sets the backend/stage context stamped onto recorded events.
    pub fn with_context(mut self, backend: impl Into<String>, stage: Option<u32>) -> Self {
        self.backend = backend.into();
        self.stage = stage;
        self
    }

    /// Consumes the reader to EOF.
    ///
    /// For each line: render (per mode), emit to the sink (sink failures
    /// are counted and logged, never fatal), then extract metadata from
    /// the original line. Returns the number of lines read.
    pub async fn pump<R>(
        &self,
        reader: R,
        sink: &mut dyn LineSink,
        metadata: &mut ExecutionMetadata,
    ) -> Result<u64>
    where
        R: AsyncBufRead + Unpin,
    {
        let mut lines = reader.lines();
        let mut read = 0u64;

        loop {
            let line = lines.next_line().await.context(IoSnafu {
                message: "read stream line",
            })?;
            let Some(line) = line else {
                break;
            };
            read += 1;

            let started = Instant::now();

            let mut decoded: Option<(StreamEvent, serde_json::Value)> = None;
            let rendered: Cow<'_, str> = match self.format_mode {
                FormatMode::Structured => match StreamEvent::parse_line(&line) {
                    Some((event, payload)) => {
                        let text = format_event(&event);
                        decoded = Some((event, payload));
                        Cow::Owned(text)
                    }
                    None => Cow::Borrowed(&line),
                },
                FormatMode::Raw => Cow::Borrowed(&line),
            };

            if let Err(err) = sink.emit(&rendered) {
                metadata.record_callback_error();
                tracing::warn!(error = %err, "sink rejected line");
            }

            let delta_ms = started.elapsed().as_secs_f64() * 1000.0;
            metadata.extract_from_line(&line, delta_ms);

            if let (Some(recorder), Some((event, payload))) = (self.recorder, decoded) {
                recorder.record(&RecordedEvent::stream(
                    self.backend.clone(),
                    self.stage,
                    metadata.run_id.clone(),
                    event.kind(),
                    payload,
                ));
            }
        }

        Ok(read)
    }
}

#[cfg(test)]
#[path = "handler.test.rs"]
mod tests;
