//! Streaming output pipeline for backend executions.
//!
//! This crate implements the zero-buffer streaming path: child process
//! stdout is consumed line by line, each line is optionally decoded as a
//! structured event and re-rendered for humans, handed to a caller
//! supplied sink, and mined for metadata, without ever retaining the
//! payload.
//!
//! # Architecture
//!
//! 1. **Pump**: [`handler::StreamHandler`] drives line-oriented
//!    consumption of an async reader
//! 2. **Decode**: [`event::StreamEvent`] classifies JSONL event lines
//! 3. **Render**: [`format`] turns events into human-readable lines
//! 4. **Track**: [`metadata::ExecutionMetadata`] extracts run id, error
//!    signal, line count and timings with O(1) memory
//! 5. **Record**: [`recorder::EventRecorder`] appends every event to a
//!    JSONL log; [`recorder::replay_events`] re-renders a log through
//!    the same formatter

pub mod event;
pub mod format;
pub mod handler;
pub mod metadata;
pub mod recorder;
pub mod sink;

mod error;

pub use error::Result;
pub use error::StreamError;
pub use event::StreamEvent;
pub use format::decorations_enabled;
pub use format::format_event;
pub use format::set_decorations;
pub use handler::FormatMode;
pub use handler::StreamHandler;
pub use metadata::ExecutionMetadata;
pub use metadata::SummaryLabels;
pub use recorder::EventChannel;
pub use recorder::EventRecorder;
pub use recorder::RecordedEvent;
pub use recorder::ReplayFormat;
pub use recorder::replay_events;
pub use sink::CaptureSink;
pub use sink::FnSink;
pub use sink::LineSink;
pub use sink::StdoutSink;
pub use sink::WriterSink;
