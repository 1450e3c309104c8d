//! Error types for working directory management.

use maestro_error::ErrorExt;
use maestro_error::Location;
use maestro_error::StatusCode;
use snafu::Snafu;
use std::any::Any;

/// Working directory error type.
#[derive(Debug, Snafu)]
#[snafu(visibility(pub(crate)), module(workdir_error))]
pub enum WorkdirError {
    /// I/O error (wraps std::io::Error).
    #[snafu(display("IO error: {message}: {source}"))]
    Io {
        message: String,
        #[snafu(source)]
        source: std::io::Error,
        #[snafu(implicit)]
        location: Location,
    },

    /// Logging initialization failed (already initialized, bad filter).
    #[snafu(display("Logging init error: {message}"))]
    LoggingInit {
        message: String,
        #[snafu(implicit)]
        location: Location,
    },
}

impl ErrorExt for WorkdirError {
    fn status_code(&self) -> StatusCode {
        match self {
            Self::Io { .. } => StatusCode::IoError,
            Self::LoggingInit { .. } => StatusCode::Internal,
        }
    }

    fn as_any(&self) -> &dyn Any {
        self
    }
}

/// Result type alias for workdir operations.
pub type Result<T> = std::result::Result<T, WorkdirError>;
