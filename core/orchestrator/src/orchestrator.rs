//! The backend orchestrator.
//!
//! One invocation = one child process, one stream handler, one metadata
//! tracker, one sink. No global state is mutated during a run except the
//! append-only event recorder.
//!
//! Cancellation propagates through a [`CancellationToken`]: the current
//! child receives SIGTERM, then SIGKILL after a grace period; the sink is
//! flushed with an error event; the task result is marked failed with
//! `error = "cancelled"`. Timeouts expire into the same path.

use std::process::Stdio;
use std::sync::Arc;
use std::time::Duration;
use std::time::Instant;

use futures::future::join_all;
use maestro_config::Config;
use maestro_config::StreamDialect;
use maestro_stream::CaptureSink;
use maestro_stream::EventRecorder;
use maestro_stream::ExecutionMetadata;
use maestro_stream::FormatMode;
use maestro_stream::LineSink;
use maestro_stream::RecordedEvent;
use maestro_stream::StreamEvent;
use maestro_stream::StreamHandler;
use maestro_stream::format_event;
use serde_json::json;
use tokio::io::AsyncReadExt;
use tokio::io::AsyncWriteExt;
use tokio::io::BufReader;
use tokio::sync::Semaphore;
use tokio_util::sync::CancellationToken;

use crate::result::ParallelResult;
use crate::result::PipelineResult;
use crate::result::TaskResult;
use crate::spawn::prepare_command;

/// Grace period between SIGTERM and SIGKILL.
const SIGTERM_GRACE: Duration = Duration::from_secs(2);

/// Bound on retained stderr bytes per invocation.
const MAX_STDERR_BYTES: usize = 8192;

/// Produces one sink per parallel worker, keyed by backend name.
pub type SinkFactory = dyn Fn(&str) -> Box<dyn LineSink> + Send + Sync;

/// Per-invocation options.
#[derive(Debug, Clone, Default)]
pub struct TaskOptions {
    /// Override for the stream interpretation mode; `None` follows the
    /// backend's declared dialect.
    pub stream_format: Option<FormatMode>,

    /// Model override forwarded to the backend.
    pub model: Option<String>,

    /// Model provider override forwarded to the backend.
    pub model_provider: Option<String>,

    /// Per-task wall-clock deadline.
    pub timeout: Option<Duration>,

    /// Working directory for the backend process.
    pub cwd: Option<std::path::PathBuf>,

    /// Pipeline stage index, stamped onto recorded events.
    pub stage: Option<u32>,
}

/// One stage of a pipeline: a backend plus its prompt.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PipelineStage {
    pub backend: String,
    pub prompt: String,
}

/// Dispatches prompts to external backend processes.
pub struct BackendOrchestrator {
    config: Arc<Config>,
    recorder: Option<Arc<EventRecorder>>,
    cancel: CancellationToken,
}

enum PumpOutcome {
    /// Stream reached EOF; carries an I/O error message when reading broke.
    Finished(Option<String>),
    Cancelled,
    TimedOut,
}

enum WaitOutcome {
    Exited(std::io::Result<std::process::ExitStatus>),
    Cancelled,
    TimedOut,
}

impl BackendOrchestrator {
    /// Creates an orchestrator over the given configuration.
    pub fn new(config: Arc<Config>) -> Self {
        Self {
            config,
            recorder: None,
            cancel: CancellationToken::new(),
        }
    }

    /// Attaches an event recorder shared by all invocations.
    pub fn with_recorder(mut self, recorder: Arc<EventRecorder>) -> Self {
        self.recorder = Some(recorder);
        self
    }

    /// A clone of the cancellation token; cancelling it aborts in-flight
    /// and future invocations.
    pub fn cancel_token(&self) -> CancellationToken {
        self.cancel.clone()
    }

    /// The configuration this orchestrator dispatches against.
    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Runs one prompt on one backend, streaming output into `sink`.
    ///
    /// Exit code 0 maps to success; a non-zero exit, spawn failure or
    /// I/O error produces a failed result with a populated `error`.
    /// `TaskResult.output` is always empty; observable bytes flow
    /// through the sink only.
    pub async fn run_task(
        &self,
        backend: &str,
        prompt: &str,
        options: &TaskOptions,
        sink: &mut dyn LineSink,
    ) -> TaskResult {
        let started = Instant::now();
        let deadline = options.timeout.map(|t| tokio::time::Instant::now() + t);

        let spec = match self.config.backend(backend) {
            Ok(spec) => spec,
            Err(err) => return TaskResult::failed(backend, prompt, err.to_string()),
        };

        let format_mode = options.stream_format.unwrap_or(match spec.dialect {
            StreamDialect::Jsonl => FormatMode::Structured,
            StreamDialect::Text => FormatMode::Raw,
        });

        let prepared = prepare_command(
            spec,
            prompt,
            options.model.as_deref(),
            options.model_provider.as_deref(),
        );

        self.record_lifecycle(
            backend,
            options.stage,
            "task.start",
            json!({ "prompt": prompt }),
        );

        let mut command = tokio::process::Command::new(&prepared.program);
        command
            .args(&prepared.args)
            .envs(prepared.env.iter().cloned())
            .stdin(if prepared.stdin_prompt.is_some() {
                Stdio::piped()
            } else {
                Stdio::null()
            })
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true);
        if let Some(cwd) = &options.cwd {
            command.current_dir(cwd);
        }

        let mut child = match command.spawn() {
            Ok(child) => child,
            Err(err) => {
                let message = format!("Failed to spawn {}: {err}", prepared.program);
                tracing::error!(backend = %backend, error = %err, "spawn failed");
                let result = TaskResult::failed(backend, prompt, message);
                self.record_task_end(backend, options.stage, &result, started);
                return result;
            }
        };

        if let Some(stdin_prompt) = prepared.stdin_prompt {
            if let Some(mut stdin) = child.stdin.take() {
                tokio::spawn(async move {
                    if let Err(err) = stdin.write_all(stdin_prompt.as_bytes()).await {
                        tracing::debug!(error = %err, "failed to write prompt to stdin");
                    }
                    // Dropping stdin closes the pipe.
                });
            }
        }

        let stderr_task = child.stderr.take().map(|mut stderr| {
            tokio::spawn(async move {
                let mut buf = Vec::new();
                let mut tmp = [0u8; 1024];
                loop {
                    match stderr.read(&mut tmp).await {
                        Ok(0) | Err(_) => break,
                        Ok(n) => {
                            if buf.len() < MAX_STDERR_BYTES {
                                let take = n.min(MAX_STDERR_BYTES - buf.len());
                                buf.extend_from_slice(&tmp[..take]);
                            }
                        }
                    }
                }
                String::from_utf8_lossy(&buf).into_owned()
            })
        });

        let mut metadata = ExecutionMetadata::new();

        let pump_outcome = {
            let handler = self.stream_handler(format_mode, backend, options.stage);
            match child.stdout.take() {
                Some(stdout) => {
                    let pump = handler.pump(BufReader::new(stdout), sink, &mut metadata);
                    tokio::pin!(pump);
                    tokio::select! {
                        res = &mut pump => PumpOutcome::Finished(res.err().map(|e| e.to_string())),
                        _ = self.cancel.cancelled() => PumpOutcome::Cancelled,
                        _ = deadline_wait(deadline) => PumpOutcome::TimedOut,
                    }
                }
                None => PumpOutcome::Finished(None),
            }
        };

        match pump_outcome {
            PumpOutcome::Finished(io_error) => {
                let wait_outcome = tokio::select! {
                    status = child.wait() => WaitOutcome::Exited(status),
                    _ = self.cancel.cancelled() => WaitOutcome::Cancelled,
                    _ = deadline_wait(deadline) => WaitOutcome::TimedOut,
                };

                match wait_outcome {
                    WaitOutcome::Exited(status) => {
                        let returncode = match status {
                            Ok(status) => status.code().unwrap_or(-1),
                            Err(_) => -1,
                        };
                        let stderr = match stderr_task {
                            Some(task) => task.await.unwrap_or_default(),
                            None => String::new(),
                        };
                        if let Some(io_error) = io_error {
                            metadata.error = Some(io_error);
                        }
                        metadata.finalize(returncode, Some(&stderr));
                        self.seal(backend, prompt, options, metadata, started)
                    }
                    WaitOutcome::Cancelled => {
                        self.abort_task(backend, prompt, options, child, metadata, sink, started, "cancelled")
                            .await
                    }
                    WaitOutcome::TimedOut => {
                        let message = timeout_message(options.timeout);
                        self.abort_task(backend, prompt, options, child, metadata, sink, started, &message)
                            .await
                    }
                }
            }
            PumpOutcome::Cancelled => {
                self.abort_task(backend, prompt, options, child, metadata, sink, started, "cancelled")
                    .await
            }
            PumpOutcome::TimedOut => {
                let message = timeout_message(options.timeout);
                self.abort_task(backend, prompt, options, child, metadata, sink, started, &message)
                    .await
            }
        }
    }

    /// Tries each backend in order, returning the first success or the
    /// final failure. Attempts are recorded with a 1-based index.
    pub async fn run_fallback(
        &self,
        backends: &[String],
        prompt: &str,
        options: &TaskOptions,
        sink: &mut dyn LineSink,
    ) -> TaskResult {
        let total = backends.len();
        let mut last: Option<TaskResult> = None;

        for (index, backend) in backends.iter().enumerate() {
            self.record_lifecycle(
                backend,
                None,
                "task.attempt",
                json!({ "attempt": index + 1, "of": total }),
            );

            let result = self.run_task(backend, prompt, options, sink).await;
            if result.success {
                return result;
            }
            tracing::info!(
                backend = %backend,
                attempt = index + 1,
                error = ?result.error,
                "fallback attempt failed"
            );
            last = Some(result);

            if self.cancel.is_cancelled() {
                break;
            }
        }

        last.unwrap_or_else(|| TaskResult::failed("", prompt, "no backends provided"))
    }

    /// Fans the same prompt out to several backends with at most
    /// `max_workers` running concurrently. The result map preserves the
    /// input backend order; the composite succeeds if any backend did.
    /// Stragglers are not cancelled unless the shared token is.
    pub async fn run_parallel(
        &self,
        backends: &[String],
        prompt: &str,
        max_workers: usize,
        options: &TaskOptions,
        sink_factory: &SinkFactory,
    ) -> ParallelResult {
        self.record_lifecycle(
            "",
            None,
            "parallel.start",
            json!({ "backends": backends, "max_workers": max_workers }),
        );

        let semaphore = Arc::new(Semaphore::new(max_workers.max(1)));
        let tasks = backends.iter().map(|backend| {
            let semaphore = Arc::clone(&semaphore);
            async move {
                let _permit = semaphore.acquire().await.ok();
                let mut sink = sink_factory(backend);
                let result = self.run_task(backend, prompt, options, sink.as_mut()).await;
                (backend.clone(), result)
            }
        });

        let parallel = ParallelResult::new(join_all(tasks).await);
        self.record_lifecycle(
            "",
            None,
            "parallel.end",
            json!({ "success": parallel.any_success() }),
        );
        parallel
    }

    /// Runs stages strictly in order; stage *i+1* does not start until
    /// stage *i*'s process has exited.
    ///
    /// With `pass_output`, each stage's rendered stream is captured (the
    /// one sanctioned capture point) and appended to the next stage's
    /// prompt under a delimiter header. A failing stage stops the
    /// pipeline with completed stages intact.
    pub async fn run_pipeline(
        &self,
        stages: &[PipelineStage],
        pass_output: bool,
        options: &TaskOptions,
        deadline: Option<Duration>,
        sink: &mut dyn LineSink,
    ) -> PipelineResult {
        let started = Instant::now();
        let mut results = Vec::with_capacity(stages.len());
        let mut previous: Option<(String, String)> = None;
        let mut success = true;

        for (index, stage) in stages.iter().enumerate() {
            if self.cancel.is_cancelled() {
                success = false;
                break;
            }
            if let Some(limit) = deadline {
                if started.elapsed() >= limit {
                    results.push(TaskResult::failed(
                        &stage.backend,
                        &stage.prompt,
                        "pipeline deadline exceeded",
                    ));
                    success = false;
                    break;
                }
            }

            let effective_prompt = match &previous {
                Some((prev_backend, captured)) if pass_output && !captured.is_empty() => {
                    format!(
                        "{}\n\n--- Output from previous stage ({prev_backend}) ---\n{captured}",
                        stage.prompt
                    )
                }
                _ => stage.prompt.clone(),
            };

            let mut stage_options = options.clone();
            stage_options.stage = Some(index as u32);
            if let Some(limit) = deadline {
                let remaining = limit.saturating_sub(started.elapsed());
                stage_options.timeout =
                    Some(stage_options.timeout.map_or(remaining, |t| t.min(remaining)));
            }

            self.record_lifecycle(
                &stage.backend,
                Some(index as u32),
                "pipeline.stage",
                json!({ "stage": index, "backend": stage.backend }),
            );

            let result = if pass_output {
                let mut tee = TeeSink {
                    inner: &mut *sink,
                    capture: CaptureSink::new(),
                };
                let result = self
                    .run_task(&stage.backend, &effective_prompt, &stage_options, &mut tee)
                    .await;
                previous = Some((stage.backend.clone(), tee.capture.into_string()));
                result
            } else {
                self.run_task(&stage.backend, &effective_prompt, &stage_options, sink)
                    .await
            };

            let ok = result.success;
            results.push(result);
            if !ok {
                success = false;
                break;
            }
        }

        let total_duration_seconds = started.elapsed().as_secs_f64();
        self.record_lifecycle(
            "",
            None,
            "pipeline.end",
            json!({
                "success": success,
                "total_duration_seconds": total_duration_seconds,
                "stages": results.len(),
            }),
        );

        PipelineResult {
            stages: results,
            total_duration_seconds,
            success,
        }
    }

    fn stream_handler<'r>(
        &'r self,
        format_mode: FormatMode,
        backend: &str,
        stage: Option<u32>,
    ) -> StreamHandler<'r> {
        let handler = StreamHandler::new(format_mode).with_context(backend, stage);
        match &self.recorder {
            Some(recorder) => handler.with_recorder(recorder),
            None => handler,
        }
    }

    /// Terminates the child and seals a cancelled/timed-out result.
    #[allow(clippy::too_many_arguments)]
    async fn abort_task(
        &self,
        backend: &str,
        prompt: &str,
        options: &TaskOptions,
        mut child: tokio::process::Child,
        mut metadata: ExecutionMetadata,
        sink: &mut dyn LineSink,
        started: Instant,
        reason: &str,
    ) -> TaskResult {
        terminate_child(&mut child).await;

        // Flush the sink with an error event so consumers see the abort.
        let flush = format_event(&StreamEvent::Error {
            message: reason.to_string(),
        });
        if sink.emit(&flush).is_err() {
            metadata.record_callback_error();
        }

        metadata.error = Some(reason.to_string());
        metadata.finalize(-1, None);
        self.record_lifecycle(
            backend,
            options.stage,
            "task.cancelled",
            json!({ "reason": reason }),
        );
        self.seal(backend, prompt, options, metadata, started)
    }

    /// Builds the final result and records the task end.
    fn seal(
        &self,
        backend: &str,
        prompt: &str,
        options: &TaskOptions,
        mut metadata: ExecutionMetadata,
        started: Instant,
    ) -> TaskResult {
        metadata.duration_seconds = started.elapsed().as_secs_f64();
        let result = TaskResult {
            backend: backend.to_string(),
            prompt: prompt.to_string(),
            success: metadata.success,
            duration_seconds: metadata.duration_seconds,
            output: String::new(),
            error: metadata.error.clone(),
            metadata,
        };
        self.record_task_end(backend, options.stage, &result, started);
        result
    }

    fn record_task_end(
        &self,
        backend: &str,
        stage: Option<u32>,
        result: &TaskResult,
        started: Instant,
    ) {
        self.record_lifecycle(
            backend,
            stage,
            "task.end",
            json!({
                "success": result.success,
                "returncode": result.metadata.returncode,
                "duration_seconds": started.elapsed().as_secs_f64(),
                "error": result.error,
            }),
        );
    }

    fn record_lifecycle(
        &self,
        backend: &str,
        stage: Option<u32>,
        kind: &str,
        payload: serde_json::Value,
    ) {
        if let Some(recorder) = &self.recorder {
            recorder.record(&RecordedEvent::lifecycle(backend, stage, kind, payload));
        }
    }
}

/// Sink that both forwards to the caller and captures for the pipeline.
struct TeeSink<'a> {
    inner: &'a mut dyn LineSink,
    capture: CaptureSink,
}

impl LineSink for TeeSink<'_> {
    fn emit(&mut self, line: &str) -> std::io::Result<()> {
        self.capture.emit(line)?;
        self.inner.emit(line)
    }
}

/// SIGTERM, grace period, then SIGKILL.
async fn terminate_child(child: &mut tokio::process::Child) {
    #[cfg(unix)]
    {
        if let Some(pid) = child.id() {
            // Safety: plain kill(2) on the child's pid.
            unsafe {
                libc::kill(pid as i32, libc::SIGTERM);
            }
            if tokio::time::timeout(SIGTERM_GRACE, child.wait()).await.is_ok() {
                return;
            }
        }
    }
    if let Err(err) = child.kill().await {
        tracing::debug!(error = %err, "failed to kill child process");
    }
}

/// Sleeps until the deadline, or forever when there is none.
async fn deadline_wait(deadline: Option<tokio::time::Instant>) {
    match deadline {
        Some(deadline) => tokio::time::sleep_until(deadline).await,
        None => std::future::pending::<()>().await,
    }
}

fn timeout_message(timeout: Option<Duration>) -> String {
    match timeout {
        Some(timeout) => format!("timed out after {}s", timeout.as_secs()),
        None => "timed out".to_string(),
    }
}

#[cfg(test)]
#[path = "orchestrator.test.rs"]
mod tests;
