//! Rotating log sinks.
//!
//! Two sinks live under the log directory:
//!
//! - `orchestrator.log`: every event, daily-rolled, pruned to a
//!   retention budget
//! - `errors.log`: ERROR severity only
//!
//! Initialization installs the global tracing subscriber; call it once
//! at process startup.

use snafu::ResultExt;
use std::path::Path;
use std::path::PathBuf;
use tracing_appender::non_blocking::WorkerGuard;
use tracing_appender::rolling;
use tracing_subscriber::EnvFilter;
use tracing_subscriber::Layer as _;
use tracing_subscriber::filter::LevelFilter;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;

use crate::error::Result;
use crate::error::workdir_error::IoSnafu;
use crate::error::workdir_error::LoggingInitSnafu;

/// Main rolling log file prefix.
pub const ORCHESTRATOR_LOG: &str = "orchestrator.log";

/// Error-severity log file prefix.
pub const ERRORS_LOG: &str = "errors.log";

/// Environment variable controlling the log filter.
pub const LOG_FILTER_ENV: &str = "MAESTRO_LOG";

/// Keeps the non-blocking writers alive; drop flushes them.
pub struct LogGuards {
    _all: WorkerGuard,
    _errors: WorkerGuard,
}

/// Builds and installs the rotating log sinks.
#[derive(Debug, Clone)]
pub struct LogManager {
    log_dir: PathBuf,
    max_files: usize,
}

impl LogManager {
    /// Creates a manager over a log directory with a rolled-file budget.
    pub fn new(log_dir: PathBuf, max_files: usize) -> Self {
        Self { log_dir, max_files }
    }

    /// The log directory.
    pub fn log_dir(&self) -> &Path {
        &self.log_dir
    }

    /// Installs the global tracing subscriber with both sinks.
    ///
    /// The filter comes from `MAESTRO_LOG` when set, else
    /// `default_filter`. Returns guards that must stay alive for the
    /// process lifetime.
    pub fn init(&self, default_filter: &str) -> Result<LogGuards> {
        std::fs::create_dir_all(&self.log_dir).context(IoSnafu {
            message: format!("create log dir {}", self.log_dir.display()),
        })?;

        let filter = EnvFilter::try_from_env(LOG_FILTER_ENV)
            .or_else(|_| EnvFilter::try_new(default_filter))
            .map_err(|err| {
                LoggingInitSnafu {
                    message: format!("bad log filter: {err}"),
                }
                .build()
            })?;

        let (all_writer, all_guard) =
            tracing_appender::non_blocking(rolling::daily(&self.log_dir, ORCHESTRATOR_LOG));
        let (errors_writer, errors_guard) =
            tracing_appender::non_blocking(rolling::daily(&self.log_dir, ERRORS_LOG));

        tracing_subscriber::registry()
            .with(filter)
            .with(
                tracing_subscriber::fmt::layer()
                    .with_writer(all_writer)
                    .with_ansi(false),
            )
            .with(
                tracing_subscriber::fmt::layer()
                    .with_writer(errors_writer)
                    .with_ansi(false)
                    .with_filter(LevelFilter::ERROR),
            )
            .try_init()
            .map_err(|err| {
                LoggingInitSnafu {
                    message: err.to_string(),
                }
                .build()
            })?;

        self.prune()?;
        Ok(LogGuards {
            _all: all_guard,
            _errors: errors_guard,
        })
    }

    /// Removes the oldest rolled files beyond the retention budget.
    ///
    /// Returns the number of files removed.
    pub fn prune(&self) -> Result<usize> {
        let mut removed = 0;
        for prefix in [ORCHESTRATOR_LOG, ERRORS_LOG] {
            removed += prune_prefix(&self.log_dir, prefix, self.max_files)?;
        }
        Ok(removed)
    }
}

/// Prunes rolled files (`<prefix>.<date>`) for one prefix.
fn prune_prefix(log_dir: &Path, prefix: &str, max_files: usize) -> Result<usize> {
    if !log_dir.is_dir() {
        return Ok(0);
    }
    let entries = std::fs::read_dir(log_dir).context(IoSnafu {
        message: format!("read log dir {}", log_dir.display()),
    })?;

    let dotted = format!("{prefix}.");
    let mut rolled: Vec<PathBuf> = entries
        .flatten()
        .map(|entry| entry.path())
        .filter(|path| {
            path.file_name()
                .and_then(|name| name.to_str())
                .is_some_and(|name| name.starts_with(&dotted))
        })
        .collect();

    if rolled.len() <= max_files {
        return Ok(0);
    }

    // Date-suffixed names sort chronologically.
    rolled.sort();
    let excess = rolled.len() - max_files;
    let mut removed = 0;
    for path in rolled.into_iter().take(excess) {
        match std::fs::remove_file(&path) {
            Ok(()) => {
                tracing::debug!(file = %path.display(), "pruned rolled log file");
                removed += 1;
            }
            Err(err) => {
                tracing::warn!(file = %path.display(), error = %err, "failed to prune log file");
            }
        }
    }
    Ok(removed)
}

#[cfg(test)]
#[path = "logs.test.rs"]
mod tests;
