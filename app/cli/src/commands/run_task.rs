//! `maestro run-task`: one prompt, one backend.

use clap::Args;
use std::path::PathBuf;
use std::process::ExitCode;

use maestro_stream::StdoutSink;

use super::CommandContext;
use super::StreamFormatArg;
use super::exit_code;
use super::task_options;
use super::write_json_file;

#[derive(Debug, Args)]
pub struct RunTaskArgs {
    /// Backend to run on.
    #[arg(long, short = 'b')]
    pub backend: String,

    /// Task prompt.
    #[arg(long, short = 'p')]
    pub prompt: String,

    /// Model override forwarded to the backend.
    #[arg(long, short = 'm')]
    pub model: Option<String>,

    /// Model provider override forwarded to the backend.
    #[arg(long)]
    pub model_provider: Option<String>,

    /// Stream format override (defaults to the backend's declared dialect).
    #[arg(long, short = 'f', value_enum)]
    pub format: Option<StreamFormatArg>,

    /// Write the task result as JSON to this path.
    #[arg(long, short = 'o')]
    pub output: Option<PathBuf>,

    /// Event log path (defaults under the log directory).
    #[arg(long)]
    pub events: Option<PathBuf>,

    /// Per-task deadline in seconds.
    #[arg(long)]
    pub timeout: Option<u64>,
}

pub async fn run(context: &CommandContext, args: RunTaskArgs) -> anyhow::Result<ExitCode> {
    context.check_backend(&args.backend)?;
    let (orchestrator, _recorder) = context.orchestrator("run-task", args.events.as_deref())?;

    context.progress(&format!("Running task on {}...", args.backend));

    let options = task_options(args.format, args.model, args.model_provider, args.timeout);
    let mut sink = StdoutSink::new();
    let result = orchestrator
        .run_task(&args.backend, &args.prompt, &options, &mut sink)
        .await;

    if let Some(output) = &args.output {
        write_json_file(output, &result)?;
        context.progress(&format!("Result saved to {}", output.display()));
    }

    if !context.quiet {
        eprintln!("{}", result.summary_line());
    }
    Ok(exit_code(result.success))
}
