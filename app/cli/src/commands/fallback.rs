//! `maestro fallback-run`: try backends in order until one succeeds.

use clap::Args;
use serde::Serialize;
use std::path::PathBuf;
use std::process::ExitCode;

use maestro_orchestrator::TaskResult;
use maestro_stream::StdoutSink;

use super::CommandContext;
use super::StreamFormatArg;
use super::exit_code;
use super::task_options;
use super::write_json_file;

#[derive(Debug, Args)]
pub struct FallbackArgs {
    /// Primary backend to try first.
    #[arg(long, short = '1')]
    pub primary: String,

    /// Fallback backend(s), in order of priority. Repeatable.
    #[arg(long, short = '2')]
    pub fallback: Vec<String>,

    /// Task prompt.
    #[arg(long, short = 'p')]
    pub prompt: String,

    /// Stream format override (defaults to each backend's dialect).
    #[arg(long, short = 'f', value_enum)]
    pub format: Option<StreamFormatArg>,

    /// Write the final result as JSON to this path.
    #[arg(long, short = 'o')]
    pub output: Option<PathBuf>,

    /// Event log path (defaults under the log directory).
    #[arg(long)]
    pub events: Option<PathBuf>,

    /// Per-attempt deadline in seconds.
    #[arg(long)]
    pub timeout: Option<u64>,
}

/// The written result: the task result plus the chain that produced it.
#[derive(Debug, Serialize)]
struct FallbackReport<'a> {
    #[serde(flatten)]
    result: &'a TaskResult,
    fallback_chain: &'a [String],
    attempted_backends: &'a [String],
}

pub async fn run(context: &CommandContext, args: FallbackArgs) -> anyhow::Result<ExitCode> {
    let chain: Vec<String> = std::iter::once(args.primary.clone())
        .chain(args.fallback.iter().cloned())
        .collect();
    for backend in &chain {
        context.check_backend(backend)?;
    }

    let (orchestrator, _recorder) = context.orchestrator("fallback-run", args.events.as_deref())?;

    context.progress(&format!("Fallback chain: {}", chain.join(" -> ")));

    let options = task_options(args.format, None, None, args.timeout);
    let mut sink = StdoutSink::new();
    let result = orchestrator
        .run_fallback(&chain, &args.prompt, &options, &mut sink)
        .await;

    if !context.quiet {
        if result.success {
            eprintln!("Task completed using {}", result.backend);
        } else {
            eprintln!("All backends failed");
        }
    }

    if let Some(output) = &args.output {
        let attempted_upto = chain
            .iter()
            .position(|backend| *backend == result.backend)
            .map_or(chain.len(), |index| index + 1);
        let report = FallbackReport {
            result: &result,
            fallback_chain: &chain,
            attempted_backends: &chain[..attempted_upto],
        };
        write_json_file(output, &report)?;
        context.progress(&format!("Result saved to {}", output.display()));
    }

    if !context.quiet {
        eprintln!("{}", result.summary_line());
    }
    Ok(exit_code(result.success))
}
