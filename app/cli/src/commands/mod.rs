//! CLI verb implementations and shared plumbing.

pub mod cache;
pub mod fallback;
pub mod parallel;
pub mod pipeline;
pub mod replay;
pub mod route;
pub mod run_task;

use anyhow::Context as _;
use std::path::Path;
use std::process::ExitCode;
use std::sync::Arc;
use std::time::Duration;

use maestro_config::Config;
use maestro_orchestrator::BackendOrchestrator;
use maestro_orchestrator::TaskOptions;
use maestro_stream::EventRecorder;
use maestro_stream::FormatMode;
use maestro_workdir::TempFileManager;

/// Shared state for one CLI invocation.
pub struct CommandContext {
    pub config: Arc<Config>,
    pub quiet: bool,
}

impl CommandContext {
    pub fn new(config: Config, quiet: bool) -> Self {
        Self {
            config: Arc::new(config),
            quiet,
        }
    }

    /// The scoped temp directory manager, sweeping expired directories
    /// as a side effect.
    pub fn temp_manager(&self) -> TempFileManager {
        let manager = TempFileManager::new(
            self.config.temp_dir.clone(),
            Duration::from_secs(self.config.temp_ttl_seconds),
        );
        match manager.cleanup_expired() {
            Ok(0) => {}
            Ok(removed) => tracing::debug!(removed, "swept expired temp directories"),
            Err(err) => tracing::warn!(error = %err, "temp sweep failed"),
        }
        manager
    }

    /// Prints a progress line to stderr unless `--quiet`.
    pub fn progress(&self, message: &str) {
        if !self.quiet {
            eprintln!("{message}");
        }
    }

    /// Builds the orchestrator with an event recorder and Ctrl-C
    /// cancellation wired up.
    ///
    /// `events_path` overrides the default log-directory location
    /// (`<logs>/events/<verb>-<uuid>.jsonl`).
    pub fn orchestrator(
        &self,
        verb: &str,
        events_path: Option<&Path>,
    ) -> anyhow::Result<(BackendOrchestrator, Arc<EventRecorder>)> {
        let path = match events_path {
            Some(path) => path.to_path_buf(),
            None => self
                .config
                .log_dir
                .join("events")
                .join(format!("{verb}-{}.jsonl", uuid::Uuid::new_v4())),
        };
        let recorder = Arc::new(EventRecorder::create(&path).context("open event log")?);
        let orchestrator = BackendOrchestrator::new(Arc::clone(&self.config))
            .with_recorder(Arc::clone(&recorder));

        let cancel = orchestrator.cancel_token();
        tokio::spawn(async move {
            if tokio::signal::ctrl_c().await.is_ok() {
                tracing::info!("interrupt received, cancelling");
                cancel.cancel();
            }
        });

        Ok((orchestrator, recorder))
    }

    /// Validates one backend identifier against the configured set.
    pub fn check_backend(&self, name: &str) -> anyhow::Result<()> {
        if self.config.has_backend(name) {
            Ok(())
        } else {
            anyhow::bail!(
                "unknown backend {name:?} (configured: {})",
                self.config.backend_names().join(", ")
            )
        }
    }
}

/// Stream format flag shared by the run verbs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, clap::ValueEnum)]
pub enum StreamFormatArg {
    /// Decode JSON event lines and render them for humans.
    Jsonl,
    /// Pass lines through untouched.
    Text,
}

impl StreamFormatArg {
    pub fn to_mode(self) -> FormatMode {
        match self {
            Self::Jsonl => FormatMode::Structured,
            Self::Text => FormatMode::Raw,
        }
    }
}

/// Builds task options from the common run-verb flags.
pub fn task_options(
    format: Option<StreamFormatArg>,
    model: Option<String>,
    model_provider: Option<String>,
    timeout_secs: Option<u64>,
) -> TaskOptions {
    TaskOptions {
        stream_format: format.map(StreamFormatArg::to_mode),
        model,
        model_provider,
        timeout: timeout_secs.map(Duration::from_secs),
        cwd: None,
        stage: None,
    }
}

/// Writes a serialisable value as pretty JSON, creating parent
/// directories.
pub fn write_json_file<T: serde::Serialize>(path: &Path, value: &T) -> anyhow::Result<()> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("create {}", parent.display()))?;
    }
    let json = serde_json::to_string_pretty(value).context("serialize result")?;
    std::fs::write(path, json).with_context(|| format!("write {}", path.display()))?;
    Ok(())
}

/// 0 on success, 1 on failure. The only two CLI exit codes.
pub fn exit_code(success: bool) -> ExitCode {
    if success {
        ExitCode::SUCCESS
    } else {
        ExitCode::FAILURE
    }
}
