//! Scan result persistence with fingerprint + TTL validation.
//!
//! Two files live under the cache directory:
//!
//! - `last_scan.json`: compact index: scan timestamp, duration, TTL and
//!   the sha256 fingerprint of every discovered descriptor
//! - `resources_snapshot.json`: the full resolved resource list
//!
//! The cache is fresh iff the TTL has not elapsed **and** every recorded
//! fingerprint still matches the file on disk (a missing file also
//! invalidates). Both files are written atomically (`*.tmp` + rename) so
//! readers never observe torn state.

use chrono::DateTime;
use chrono::Utc;
use serde::Deserialize;
use serde::Serialize;
use snafu::ResultExt;
use std::collections::BTreeMap;
use std::path::Path;
use std::path::PathBuf;
use std::time::Duration;
use std::time::Instant;

use crate::error::Result;
use crate::error::registry_error::CacheParseSnafu;
use crate::error::registry_error::IoSnafu;
use crate::error::registry_error::SnapshotSerializeSnafu;
use crate::resource::Resource;
use crate::scanner::ResourceScanner;
use crate::scanner::ScanWarning;
use crate::scanner::fingerprint;

/// Compact index file name.
pub const LAST_SCAN_FILE: &str = "last_scan.json";

/// Full snapshot file name.
pub const SNAPSHOT_FILE: &str = "resources_snapshot.json";

/// The compact index persisted as `last_scan.json`.
#[derive(Debug, Clone, Serialize, Deserialize)]
struct ScanIndex {
    scanned_at: DateTime<Utc>,
    scan_duration_ms: u64,
    ttl_seconds: u64,
    fingerprints: BTreeMap<String, String>,
}

/// An immutable scan result.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScanSnapshot {
    /// When the scan ran.
    pub scanned_at: DateTime<Utc>,

    /// How long the scan took.
    pub scan_duration_ms: u64,

    /// Content hash of every discovered descriptor file.
    pub file_fingerprints: BTreeMap<String, String>,

    /// The resolved resource set.
    pub resources: Vec<Resource>,
}

impl ScanSnapshot {
    /// Resource counts keyed by kind.
    pub fn resource_count_by_kind(&self) -> BTreeMap<String, usize> {
        let mut counts = BTreeMap::new();
        for resource in &self.resources {
            *counts.entry(resource.kind.to_string()).or_default() += 1;
        }
        counts
    }
}

/// Cache validation verdict.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum CacheStatus {
    /// A fresh cache exists.
    Cached,
    /// No cache files on disk.
    NoCache,
    /// Cache exists but is expired or stale.
    Invalid,
}

/// Cache statistics for the stats surface.
#[derive(Debug, Clone, Serialize)]
pub struct CacheStats {
    pub status: CacheStatus,
    pub is_valid: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub age_seconds: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub scan_duration_ms: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub total_resources: Option<usize>,
    pub ttl_seconds: u64,
}

/// Materialises scan results to disk and validates them on load.
#[derive(Debug, Clone)]
pub struct RegistryPersistence {
    registry_dir: PathBuf,
    ttl: Duration,
}

impl RegistryPersistence {
    /// Creates a persistence layer over a cache directory.
    pub fn new(registry_dir: PathBuf, ttl: Duration) -> Self {
        Self { registry_dir, ttl }
    }

    fn index_path(&self) -> PathBuf {
        self.registry_dir.join(LAST_SCAN_FILE)
    }

    fn snapshot_path(&self) -> PathBuf {
        self.registry_dir.join(SNAPSHOT_FILE)
    }

    /// Returns a fresh snapshot: from cache when valid, otherwise by
    /// running the scanner and persisting the result.
    ///
    /// Warnings are only produced on the scan path; a cache hit implies
    /// the previous scan's descriptors are byte-identical.
    pub fn load_or_scan(
        &self,
        scanner: &ResourceScanner,
    ) -> Result<(ScanSnapshot, Vec<ScanWarning>)> {
        if self.validate() == CacheStatus::Cached {
            match self.load_snapshot() {
                Ok(snapshot) => {
                    tracing::debug!(
                        resources = snapshot.resources.len(),
                        "registry cache hit"
                    );
                    return Ok((snapshot, Vec::new()));
                }
                Err(err) => {
                    tracing::warn!(error = %err, "snapshot unreadable, rescanning");
                }
            }
        }

        let started = Instant::now();
        let outcome = scanner.scan();
        let snapshot = ScanSnapshot {
            scanned_at: Utc::now(),
            scan_duration_ms: started.elapsed().as_millis() as u64,
            file_fingerprints: outcome.fingerprints,
            resources: outcome.resources,
        };
        self.persist(&snapshot)?;
        Ok((snapshot, outcome.warnings))
    }

    /// Validates the on-disk cache without loading the snapshot.
    pub fn validate(&self) -> CacheStatus {
        let Some(index) = self.read_index() else {
            return if self.index_path().exists() {
                CacheStatus::Invalid
            } else {
                CacheStatus::NoCache
            };
        };

        let age = Utc::now().signed_duration_since(index.scanned_at);
        if age.num_seconds() < 0 || age.num_seconds() as u64 >= index.ttl_seconds {
            tracing::debug!(age_seconds = age.num_seconds(), "cache expired");
            return CacheStatus::Invalid;
        }

        for (path, recorded) in &index.fingerprints {
            let Ok(content) = std::fs::read_to_string(path) else {
                tracing::debug!(path = %path, "fingerprinted file missing");
                return CacheStatus::Invalid;
            };
            if fingerprint(&content) != *recorded {
                tracing::debug!(path = %path, "fingerprint mismatch");
                return CacheStatus::Invalid;
            }
        }

        if !self.snapshot_path().is_file() {
            return CacheStatus::Invalid;
        }

        CacheStatus::Cached
    }

    /// Deletes both cache files. Missing files are fine.
    pub fn invalidate(&self) -> Result<()> {
        for path in [self.index_path(), self.snapshot_path()] {
            match std::fs::remove_file(&path) {
                Ok(()) => {}
                Err(err) if err.kind() == std::io::ErrorKind::NotFound => {}
                Err(err) => {
                    return Err(err).context(IoSnafu {
                        message: format!("remove {}", path.display()),
                    });
                }
            }
        }
        Ok(())
    }

    /// Cache statistics for the stats surface.
    pub fn get_stats(&self) -> CacheStats {
        let status = self.validate();
        let index = self.read_index();
        let total_resources = self
            .load_snapshot()
            .ok()
            .map(|snapshot| snapshot.resources.len());

        CacheStats {
            status,
            is_valid: status == CacheStatus::Cached,
            age_seconds: index.as_ref().map(|index| {
                Utc::now()
                    .signed_duration_since(index.scanned_at)
                    .num_seconds()
            }),
            scan_duration_ms: index.as_ref().map(|index| index.scan_duration_ms),
            total_resources,
            ttl_seconds: self.ttl.as_secs(),
        }
    }

    fn read_index(&self) -> Option<ScanIndex> {
        let content = std::fs::read_to_string(self.index_path()).ok()?;
        serde_json::from_str(&content).ok()
    }

    fn load_snapshot(&self) -> Result<ScanSnapshot> {
        let path = self.snapshot_path();
        let content = std::fs::read_to_string(&path).context(IoSnafu {
            message: format!("read {}", path.display()),
        })?;
        serde_json::from_str(&content).context(CacheParseSnafu {
            file: path.display().to_string(),
        })
    }

    /// Writes both cache files atomically.
    fn persist(&self, snapshot: &ScanSnapshot) -> Result<()> {
        std::fs::create_dir_all(&self.registry_dir).context(IoSnafu {
            message: format!("create {}", self.registry_dir.display()),
        })?;

        let index = ScanIndex {
            scanned_at: snapshot.scanned_at,
            scan_duration_ms: snapshot.scan_duration_ms,
            ttl_seconds: self.ttl.as_secs(),
            fingerprints: snapshot.file_fingerprints.clone(),
        };
        let index_json =
            serde_json::to_string_pretty(&index).context(SnapshotSerializeSnafu)?;
        let snapshot_json =
            serde_json::to_string_pretty(snapshot).context(SnapshotSerializeSnafu)?;

        write_atomic(&self.snapshot_path(), &snapshot_json)?;
        write_atomic(&self.index_path(), &index_json)?;
        tracing::debug!(dir = %self.registry_dir.display(), "registry cache persisted");
        Ok(())
    }
}

/// tmp + rename so readers never observe torn state.
fn write_atomic(path: &Path, content: &str) -> Result<()> {
    let tmp = path.with_extension("json.tmp");
    std::fs::write(&tmp, content).context(IoSnafu {
        message: format!("write {}", tmp.display()),
    })?;
    std::fs::rename(&tmp, path).context(IoSnafu {
        message: format!("rename {} -> {}", tmp.display(), path.display()),
    })
}

#[cfg(test)]
#[path = "persistence.test.rs"]
mod tests;
