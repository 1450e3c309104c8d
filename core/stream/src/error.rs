//! Error types for the streaming pipeline.

use maestro_error::ErrorExt;
use maestro_error::Location;
use maestro_error::StatusCode;
use snafu::Snafu;
use std::any::Any;

/// Streaming pipeline error type.
#[derive(Debug, Snafu)]
#[snafu(visibility(pub(crate)), module(stream_error))]
pub enum StreamError {
    /// I/O error on the stream source or the event log.
    #[snafu(display("IO error: {message}"))]
    Io {
        message: String,
        #[snafu(source)]
        source: std::io::Error,
        #[snafu(implicit)]
        location: Location,
    },

    /// An event log line that is not a valid recorded event.
    #[snafu(display("Malformed event at {path}:{line_no}: {source}"))]
    MalformedEvent {
        path: String,
        line_no: usize,
        #[snafu(source)]
        source: serde_json::Error,
        #[snafu(implicit)]
        location: Location,
    },
}

impl ErrorExt for StreamError {
    fn status_code(&self) -> StatusCode {
        match self {
            Self::Io { .. } => StatusCode::IoError,
            Self::MalformedEvent { .. } => StatusCode::ProtocolError,
        }
    }

    fn as_any(&self) -> &dyn Any {
        self
    }
}

/// Result type alias for stream operations.
pub type Result<T> = std::result::Result<T, StreamError>;
