//! Configuration for the maestro orchestrator.
//!
//! Configuration lives in a single TOML file under the maestro home
//! directory (`~/.maestro/config.toml` by default, overridable via the
//! `MAESTRO_HOME` environment variable). It declares the backend adapter
//! table (§ backend contract), the default backend, cache/temp/log
//! directories and their TTLs, and the resource scan roots.
//!
//! Missing files fall back to built-in defaults so the CLI works out of
//! the box with the stock `codex` / `claude` / `gemini` adapters.

pub mod backend;
pub mod error;
pub mod loader;
pub mod types;

pub use backend::BackendSpec;
pub use backend::PromptVia;
pub use backend::StreamDialect;
pub use backend::default_backends;
pub use error::ConfigError;
pub use error::Result;
pub use loader::MAESTRO_HOME_ENV;
pub use loader::default_home_dir;
pub use loader::find_maestro_home;
pub use loader::load_config;
pub use types::Config;
