//! Scoped temp directories with TTL-based cleanup.
//!
//! Each namespace gets its own working directory under the temp root
//! (`<temp>/<namespace>/`). Directories expire after the configured TTL
//! (measured from last modification) and are removed by
//! [`TempFileManager::cleanup_expired`] or explicitly per namespace.

use snafu::ResultExt;
use std::path::Path;
use std::path::PathBuf;
use std::time::Duration;
use std::time::SystemTime;

use crate::error::Result;
use crate::error::workdir_error::IoSnafu;

/// Manages scoped working directories under one temp root.
#[derive(Debug, Clone)]
pub struct TempFileManager {
    base_dir: PathBuf,
    ttl: Duration,
}

impl TempFileManager {
    /// Creates a manager rooted at `base_dir` with the given TTL.
    pub fn new(base_dir: PathBuf, ttl: Duration) -> Self {
        Self { base_dir, ttl }
    }

    /// The temp root.
    pub fn base_dir(&self) -> &Path {
        &self.base_dir
    }

    /// Returns (creating if needed) the scoped directory for a
    /// namespace. Namespace separators are made path-safe.
    pub fn scoped_dir(&self, namespace: &str) -> Result<PathBuf> {
        let dir = self.base_dir.join(sanitize(namespace));
        std::fs::create_dir_all(&dir).context(IoSnafu {
            message: format!("create scoped dir {}", dir.display()),
        })?;
        Ok(dir)
    }

    /// Removes one namespace's directory. Missing directories are fine.
    pub fn cleanup(&self, namespace: &str) -> Result<()> {
        let dir = self.base_dir.join(sanitize(namespace));
        match std::fs::remove_dir_all(&dir) {
            Ok(()) => Ok(()),
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(err) => Err(err).context(IoSnafu {
                message: format!("remove scoped dir {}", dir.display()),
            }),
        }
    }

    /// Removes every scoped directory older than the TTL.
    ///
    /// Returns the number of directories removed. Unreadable entries are
    /// skipped, not fatal.
    pub fn cleanup_expired(&self) -> Result<usize> {
        if !self.base_dir.is_dir() {
            return Ok(0);
        }
        let entries = std::fs::read_dir(&self.base_dir).context(IoSnafu {
            message: format!("read temp root {}", self.base_dir.display()),
        })?;

        let now = SystemTime::now();
        let mut removed = 0;
        for entry in entries.flatten() {
            let path = entry.path();
            if !path.is_dir() {
                continue;
            }
            let expired = entry
                .metadata()
                .and_then(|metadata| metadata.modified())
                .ok()
                .and_then(|modified| now.duration_since(modified).ok())
                .is_some_and(|age| age >= self.ttl);
            if expired {
                match std::fs::remove_dir_all(&path) {
                    Ok(()) => {
                        tracing::debug!(dir = %path.display(), "removed expired temp dir");
                        removed += 1;
                    }
                    Err(err) => {
                        tracing::warn!(dir = %path.display(), error = %err, "failed to remove temp dir");
                    }
                }
            }
        }
        Ok(removed)
    }
}

/// Makes a namespace path-safe (`skill:commit` → `skill-commit`).
fn sanitize(namespace: &str) -> String {
    namespace
        .chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() || c == '-' || c == '_' || c == '.' {
                c
            } else {
                '-'
            }
        })
        .collect()
}

#[cfg(test)]
#[path = "temp.test.rs"]
mod tests;
