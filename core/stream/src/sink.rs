//! Line sinks.
//!
//! A sink receives one rendered line at a time. Sinks are deliberately
//! synchronous and infallible from the stream handler's point of view:
//! an emit failure is counted and logged by the handler, never raised.

use std::io::Write;

/// Receives rendered output one line at a time.
pub trait LineSink: Send {
    /// Delivers one line (without a trailing newline).
    fn emit(&mut self, line: &str) -> std::io::Result<()>;
}

/// Sink writing to the process stdout, flushing per line.
#[derive(Debug, Default)]
pub struct StdoutSink;

impl StdoutSink {
    pub fn new() -> Self {
        Self
    }
}

impl LineSink for StdoutSink {
    fn emit(&mut self, line: &str) -> std::io::Result<()> {
        let stdout = std::io::stdout();
        let mut lock = stdout.lock();
        writeln!(lock, "{line}")?;
        lock.flush()
    }
}

/// Sink writing to an arbitrary writer (files, test buffers).
pub struct WriterSink<W: Write + Send> {
    writer: W,
}

impl<W: Write + Send> WriterSink<W> {
    pub fn new(writer: W) -> Self {
        Self { writer }
    }

    /// Consumes the sink, returning the underlying writer.
    pub fn into_inner(self) -> W {
        self.writer
    }
}

impl<W: Write + Send> LineSink for WriterSink<W> {
    fn emit(&mut self, line: &str) -> std::io::Result<()> {
        writeln!(self.writer, "{line}")?;
        self.writer.flush()
    }
}

/// Sink accumulating lines into a single string.
///
/// This is the **only** sanctioned capture point in the streaming
/// architecture: pipelines use it to carry one stage's output into the
/// next stage's prompt. Task results themselves never hold output.
#[derive(Debug, Default)]
pub struct CaptureSink {
    buffer: String,
}

impl CaptureSink {
    pub fn new() -> Self {
        Self::default()
    }

    /// The captured text so far.
    pub fn captured(&self) -> &str {
        &self.buffer
    }

    /// Consumes the sink, returning the captured text.
    pub fn into_string(self) -> String {
        self.buffer
    }
}

impl LineSink for CaptureSink {
    fn emit(&mut self, line: &str) -> std::io::Result<()> {
        self.buffer.push_str(line);
        self.buffer.push('\n');
        Ok(())
    }
}

/// Sink delegating to a closure. Useful in tests and embedding.
pub struct FnSink<F: FnMut(&str) -> std::io::Result<()> + Send> {
    callback: F,
}

impl<F: FnMut(&str) -> std::io::Result<()> + Send> FnSink<F> {
    pub fn new(callback: F) -> Self {
        Self { callback }
    }
}

impl<F: FnMut(&str) -> std::io::Result<()> + Send> LineSink for FnSink<F> {
    fn emit(&mut self, line: &str) -> std::io::Result<()> {
        (self.callback)(line)
    }
}

#[cfg(test)]
#[path = "sink.test.rs"]
mod tests;
