//! Configuration file loading.
//!
//! Resolution order for the maestro home directory:
//! 1. `MAESTRO_HOME` environment variable (relative paths are resolved
//!    against the current working directory)
//! 2. `~/.maestro`
//!
//! `<home>/config.toml`, when present, overrides the built-in defaults
//! field by field. Backends declared in the file are merged over the
//! stock adapter table (same name replaces the stock entry).

use snafu::ResultExt;
use std::path::Path;
use std::path::PathBuf;
use tracing::debug;

use crate::error::Result;
use crate::error::config_error::IoSnafu;
use crate::error::config_error::TomlParseSnafu;
use crate::types::Config;
use crate::types::ConfigFile;

/// Default configuration directory name under the home directory.
pub const DEFAULT_CONFIG_DIR: &str = ".maestro";

/// Application configuration file name.
pub const CONFIG_FILE: &str = "config.toml";

/// Environment variable for a custom maestro home directory.
pub const MAESTRO_HOME_ENV: &str = "MAESTRO_HOME";

/// Returns the default home directory (`~/.maestro`).
pub fn default_home_dir() -> PathBuf {
    dirs::home_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join(DEFAULT_CONFIG_DIR)
}

/// Finds the maestro home directory.
///
/// Checks `MAESTRO_HOME` first, then falls back to `~/.maestro`.
pub fn find_maestro_home() -> PathBuf {
    if let Ok(custom) = std::env::var(MAESTRO_HOME_ENV) {
        let path = PathBuf::from(&custom);
        if path.is_absolute() {
            return path;
        }
        std::env::current_dir()
            .map(|cwd| cwd.join(&custom))
            .unwrap_or_else(|_| PathBuf::from(custom))
    } else {
        default_home_dir()
    }
}

/// Loads the configuration rooted at [`find_maestro_home`].
pub fn load_config() -> Result<Config> {
    load_config_from(&find_maestro_home())
}

/// Loads the configuration rooted at an explicit home directory.
///
/// A missing `config.toml` is not an error; defaults apply.
pub fn load_config_from(home: &Path) -> Result<Config> {
    let mut config = Config::with_home(home.to_path_buf());

    let file_path = home.join(CONFIG_FILE);
    if file_path.is_file() {
        let text = std::fs::read_to_string(&file_path).context(IoSnafu {
            path: file_path.display().to_string(),
        })?;
        let file: ConfigFile = toml::from_str(&text).context(TomlParseSnafu {
            path: file_path.display().to_string(),
        })?;
        apply_overrides(&mut config, file);
        debug!(path = %file_path.display(), "loaded config file");
    } else {
        debug!(path = %file_path.display(), "no config file, using defaults");
    }

    config.validate()?;
    Ok(config)
}

/// Applies file-level overrides onto the default config.
fn apply_overrides(config: &mut Config, file: ConfigFile) {
    for (name, spec) in file.backends {
        if !config.backend_order.contains(&name) {
            config.backend_order.push(name.clone());
        }
        config.backends.insert(name, spec);
    }
    if let Some(order) = file.backend_order {
        config.backend_order = order;
    }
    if let Some(default) = file.default_backend {
        config.default_backend = Some(default);
    }
    if let Some(dir) = file.cache_dir {
        config.cache_dir = dir;
    }
    if let Some(dir) = file.temp_dir {
        config.temp_dir = dir;
    }
    if let Some(dir) = file.log_dir {
        config.log_dir = dir;
    }
    if let Some(ttl) = file.cache_ttl_seconds {
        config.cache_ttl_seconds = ttl;
    }
    if let Some(ttl) = file.temp_ttl_seconds {
        config.temp_ttl_seconds = ttl;
    }
    if let Some(max) = file.max_log_files {
        config.max_log_files = max;
    }
    if let Some(root) = file.user_root {
        config.user_root = root;
    }
    if let Some(root) = file.project_root {
        config.project_root = Some(root);
    }
}

#[cfg(test)]
#[path = "loader.test.rs"]
mod tests;
