//! Scoped working directories and rotating log sinks.

pub mod logs;
pub mod temp;

mod error;

pub use error::Result;
pub use error::WorkdirError;
pub use logs::ERRORS_LOG;
pub use logs::LogGuards;
pub use logs::LogManager;
pub use logs::ORCHESTRATOR_LOG;
pub use temp::TempFileManager;
