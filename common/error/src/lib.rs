//! Shared error classification for the maestro workspace.
//!
//! Each crate defines its own `snafu` error enum; this crate provides the
//! [`StatusCode`] taxonomy and the [`ErrorExt`] trait that map those enums
//! onto a single classification used for logging and exit-code decisions.

pub mod status_code;

pub use snafu::Location;
pub use status_code::StatusCategory;
pub use status_code::StatusCode;
pub use status_code::StatusMeta;

use std::any::Any;

/// Extension trait implemented by every crate-level error enum.
pub trait ErrorExt: std::error::Error {
    /// Classifies this error under the workspace-wide [`StatusCode`] taxonomy.
    fn status_code(&self) -> StatusCode;

    /// Upcast for downcasting across crate boundaries.
    fn as_any(&self) -> &dyn Any;

    /// Whether a caller may reasonably retry the failed operation.
    fn is_retryable(&self) -> bool {
        self.status_code().meta().retryable
    }
}
