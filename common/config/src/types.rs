//! Typed configuration structures.

use serde::Deserialize;
use serde::Serialize;
use std::collections::BTreeMap;
use std::path::PathBuf;

use crate::backend::BackendSpec;
use crate::backend::default_backends;
use crate::error::Result;
use crate::error::config_error::UnknownBackendSnafu;
use crate::error::config_error::ValidationSnafu;

/// Default registry cache TTL: one hour.
pub const DEFAULT_CACHE_TTL_SECS: u64 = 3600;

/// Default scoped temp directory TTL: one day.
pub const DEFAULT_TEMP_TTL_SECS: u64 = 86_400;

/// Default number of rolled log files to retain.
pub const DEFAULT_MAX_LOG_FILES: usize = 7;

/// Resolved application configuration.
///
/// Produced by [`crate::loader::load_config`]; all paths are absolute.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// Maestro home directory (`~/.maestro` unless overridden).
    pub home: PathBuf,

    /// Backend adapter table, keyed by the opaque backend identifier.
    pub backends: BTreeMap<String, BackendSpec>,

    /// Invocation order of backends; also defines the fallback default.
    pub backend_order: Vec<String>,

    /// Project-wide default backend used by the router when a resource
    /// carries no backend hint.
    pub default_backend: Option<String>,

    /// Registry cache directory (`<home>/orchestrator/registry`).
    pub cache_dir: PathBuf,

    /// Scoped temp directory root (`<home>/orchestrator/temp`).
    pub temp_dir: PathBuf,

    /// Log directory (`<home>/orchestrator/logs`).
    pub log_dir: PathBuf,

    /// Registry cache TTL in seconds.
    pub cache_ttl_seconds: u64,

    /// Scoped temp directory TTL in seconds.
    pub temp_ttl_seconds: u64,

    /// Rolled log files retained per log name.
    pub max_log_files: usize,

    /// User-scope resource root (`<home>` itself unless overridden).
    pub user_root: PathBuf,

    /// Project-scope resource root; resources here shadow user-scope
    /// resources of the same namespace.
    pub project_root: Option<PathBuf>,
}

impl Config {
    /// Builds a configuration from built-in defaults rooted at `home`.
    pub fn with_home(home: PathBuf) -> Self {
        let orchestrator = home.join("orchestrator");
        let mut backends = BTreeMap::new();
        let mut backend_order = Vec::new();
        for (name, spec) in default_backends() {
            backend_order.push(name.clone());
            backends.insert(name, spec);
        }
        Self {
            user_root: home.clone(),
            cache_dir: orchestrator.join("registry"),
            temp_dir: orchestrator.join("temp"),
            log_dir: orchestrator.join("logs"),
            home,
            backends,
            backend_order,
            default_backend: None,
            cache_ttl_seconds: DEFAULT_CACHE_TTL_SECS,
            temp_ttl_seconds: DEFAULT_TEMP_TTL_SECS,
            max_log_files: DEFAULT_MAX_LOG_FILES,
            project_root: None,
        }
    }

    /// Looks up a backend spec, rejecting identifiers outside the
    /// configured set.
    pub fn backend(&self, name: &str) -> Result<&BackendSpec> {
        self.backends
            .get(name)
            .ok_or_else(|| UnknownBackendSnafu { name }.build())
    }

    /// Returns `true` if `name` is a declared backend identifier.
    pub fn has_backend(&self, name: &str) -> bool {
        self.backends.contains_key(name)
    }

    /// The backend used when neither a resource hint nor an explicit
    /// default applies: first in configured order.
    pub fn fallback_backend(&self) -> Option<&str> {
        self.backend_order.first().map(String::as_str)
    }

    /// All configured backend names in invocation order.
    pub fn backend_names(&self) -> &[String] {
        &self.backend_order
    }

    /// Semantic validation of the whole configuration.
    pub fn validate(&self) -> Result<()> {
        if self.backends.is_empty() {
            return ValidationSnafu {
                message: "no backends configured".to_string(),
            }
            .fail();
        }
        for (name, spec) in &self.backends {
            spec.validate(name)?;
        }
        for name in &self.backend_order {
            if !self.backends.contains_key(name) {
                return ValidationSnafu {
                    message: format!("backend_order references unknown backend {name}"),
                }
                .fail();
            }
        }
        if let Some(default) = &self.default_backend {
            if !self.backends.contains_key(default) {
                return UnknownBackendSnafu { name: default }.fail();
            }
        }
        Ok(())
    }
}

/// On-disk shape of `config.toml`. Every field is optional; missing
/// values fall back to [`Config::with_home`] defaults.
#[derive(Debug, Default, Deserialize)]
pub(crate) struct ConfigFile {
    pub default_backend: Option<String>,
    pub backend_order: Option<Vec<String>>,
    #[serde(default)]
    pub backends: BTreeMap<String, BackendSpec>,
    pub cache_dir: Option<PathBuf>,
    pub temp_dir: Option<PathBuf>,
    pub log_dir: Option<PathBuf>,
    pub cache_ttl_seconds: Option<u64>,
    pub temp_ttl_seconds: Option<u64>,
    pub max_log_files: Option<usize>,
    pub user_root: Option<PathBuf>,
    pub project_root: Option<PathBuf>,
}

#[cfg(test)]
#[path = "types.test.rs"]
mod tests;
