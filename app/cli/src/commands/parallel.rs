//! `maestro parallel-run`: fan the same prompt out to several backends.

use clap::Args;
use std::path::PathBuf;
use std::process::ExitCode;

use maestro_stream::LineSink;
use maestro_stream::StdoutSink;

use super::CommandContext;
use super::StreamFormatArg;
use super::exit_code;
use super::task_options;
use super::write_json_file;

/// Default worker cap.
const DEFAULT_WORKERS: usize = 3;

#[derive(Debug, Args)]
pub struct ParallelArgs {
    /// Task prompt to run on all backends.
    #[arg(long, short = 'p')]
    pub prompt: String,

    /// Comma-separated backends (default: all configured backends).
    #[arg(long, short = 'b', value_delimiter = ',')]
    pub backends: Vec<String>,

    /// Maximum concurrent workers.
    #[arg(long, short = 'w', default_value_t = DEFAULT_WORKERS)]
    pub workers: usize,

    /// Stream format override (defaults to each backend's dialect).
    #[arg(long, short = 'f', value_enum)]
    pub format: Option<StreamFormatArg>,

    /// Directory for per-backend result files and the summary.
    #[arg(long, short = 'o')]
    pub output: Option<PathBuf>,

    /// Event log path (defaults under the log directory).
    #[arg(long)]
    pub events: Option<PathBuf>,

    /// Per-backend deadline in seconds.
    #[arg(long)]
    pub timeout: Option<u64>,
}

pub async fn run(context: &CommandContext, args: ParallelArgs) -> anyhow::Result<ExitCode> {
    let backends = if args.backends.is_empty() {
        context.config.backend_names().to_vec()
    } else {
        args.backends.clone()
    };
    for backend in &backends {
        context.check_backend(backend)?;
    }

    let (orchestrator, _recorder) = context.orchestrator("parallel-run", args.events.as_deref())?;

    context.progress(&format!(
        "Parallel execution on {} backends ({} workers)...",
        backends.len(),
        args.workers
    ));

    let options = task_options(args.format, None, None, args.timeout);
    let result = orchestrator
        .run_parallel(
            &backends,
            &args.prompt,
            args.workers,
            &options,
            &|_backend: &str| -> Box<dyn LineSink> { Box::new(StdoutSink::new()) },
        )
        .await;

    if !context.quiet {
        eprintln!("Parallel results:");
        for (backend, task) in result.results() {
            let status = if task.success { "ok" } else { "failed" };
            eprintln!("  {backend}: {status} ({:.2}s)", task.duration_seconds);
        }
    }

    if let Some(output_dir) = &args.output {
        for (backend, task) in result.results() {
            write_json_file(&output_dir.join(format!("{backend}_summary.json")), task)?;
        }
        write_json_file(&output_dir.join("parallel_summary.json"), &result)?;
        context.progress(&format!("Results saved to {}", output_dir.display()));
    }

    Ok(exit_code(result.any_success()))
}
