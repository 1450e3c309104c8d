//! Error types for the registry system.

use maestro_error::ErrorExt;
use maestro_error::Location;
use maestro_error::StatusCode;
use snafu::Snafu;
use std::any::Any;

/// Registry error type.
///
/// Use snafu context selectors from the `registry_error` module within
/// the crate:
/// ```ignore
/// use crate::error::registry_error::*;
/// use snafu::ResultExt;
///
/// fs::read_to_string(path).context(IoSnafu { message: "read descriptor" })?;
/// ```
#[derive(Debug, Snafu)]
#[snafu(visibility(pub(crate)), module(registry_error))]
pub enum RegistryError {
    /// I/O error (wraps std::io::Error).
    #[snafu(display("IO error: {message}: {source}"))]
    Io {
        message: String,
        #[snafu(source)]
        source: std::io::Error,
        #[snafu(implicit)]
        location: Location,
    },

    /// Descriptor parse error.
    #[snafu(display("Descriptor parse error in {file}: {message}"))]
    DescriptorParse {
        file: String,
        message: String,
        #[snafu(implicit)]
        location: Location,
    },

    /// YAML front matter parse error.
    #[snafu(display("YAML parse error in {file}: {source}"))]
    YamlParse {
        file: String,
        #[snafu(source)]
        source: serde_yml::Error,
        #[snafu(implicit)]
        location: Location,
    },

    /// Cache file unreadable or malformed.
    #[snafu(display("Cache error in {file}: {source}"))]
    CacheParse {
        file: String,
        #[snafu(source)]
        source: serde_json::Error,
        #[snafu(implicit)]
        location: Location,
    },

    /// Snapshot serialization error.
    #[snafu(display("Snapshot serialize error: {source}"))]
    SnapshotSerialize {
        #[snafu(source)]
        source: serde_json::Error,
        #[snafu(implicit)]
        location: Location,
    },
}

impl ErrorExt for RegistryError {
    fn status_code(&self) -> StatusCode {
        match self {
            Self::Io { .. } => StatusCode::IoError,
            Self::DescriptorParse { .. } | Self::YamlParse { .. } => StatusCode::ResourceParse,
            Self::CacheParse { .. } => StatusCode::CacheInvalid,
            Self::SnapshotSerialize { .. } => StatusCode::Internal,
        }
    }

    fn as_any(&self) -> &dyn Any {
        self
    }
}

/// Result type alias for registry operations.
pub type Result<T> = std::result::Result<T, RegistryError>;
