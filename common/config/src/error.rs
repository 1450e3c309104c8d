//! Error types for configuration loading.

use maestro_error::ErrorExt;
use maestro_error::Location;
use maestro_error::StatusCode;
use snafu::Snafu;
use std::any::Any;

/// Configuration error type.
///
/// Use snafu context selectors from the `config_error` module within the
/// crate:
/// ```ignore
/// use crate::error::config_error::*;
/// use snafu::ResultExt;
///
/// fs::read_to_string(path).context(IoSnafu { path: path.display().to_string() })?;
/// ```
#[derive(Debug, Snafu)]
#[snafu(visibility(pub(crate)), module(config_error))]
pub enum ConfigError {
    /// I/O error reading a config file.
    #[snafu(display("IO error reading {path}: {source}"))]
    Io {
        path: String,
        #[snafu(source)]
        source: std::io::Error,
        #[snafu(implicit)]
        location: Location,
    },

    /// TOML parse error.
    #[snafu(display("TOML parse error in {path}: {source}"))]
    TomlParse {
        path: String,
        #[snafu(source)]
        source: toml::de::Error,
        #[snafu(implicit)]
        location: Location,
    },

    /// Semantic validation failure.
    #[snafu(display("Invalid configuration: {message}"))]
    Validation {
        message: String,
        #[snafu(implicit)]
        location: Location,
    },

    /// A backend identifier is not declared in the adapter table.
    #[snafu(display("Unknown backend: {name}"))]
    UnknownBackend {
        name: String,
        #[snafu(implicit)]
        location: Location,
    },
}

impl ErrorExt for ConfigError {
    fn status_code(&self) -> StatusCode {
        match self {
            Self::Io { .. } => StatusCode::IoError,
            Self::TomlParse { .. } | Self::Validation { .. } => StatusCode::InvalidConfig,
            Self::UnknownBackend { .. } => StatusCode::InvalidInput,
        }
    }

    fn as_any(&self) -> &dyn Any {
        self
    }
}

/// Result type alias for config operations.
pub type Result<T> = std::result::Result<T, ConfigError>;
