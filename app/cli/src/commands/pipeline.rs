//! `maestro pipeline`: sequential stages across backends.

use clap::Args;
use std::path::PathBuf;
use std::process::ExitCode;
use std::time::Duration;

use maestro_orchestrator::PipelineStage;
use maestro_stream::StdoutSink;

use super::CommandContext;
use super::StreamFormatArg;
use super::exit_code;
use super::task_options;
use super::write_json_file;

#[derive(Debug, Args)]
pub struct PipelineArgs {
    /// Stage in `backend:prompt` form. Repeatable, ordered.
    #[arg(long = "stage", short = 's', required = true)]
    pub stages: Vec<String>,

    /// Do not feed each stage's output into the next stage's prompt.
    #[arg(long)]
    pub no_pass_output: bool,

    /// Stream format override (defaults to each backend's dialect).
    #[arg(long, short = 'f', value_enum)]
    pub format: Option<StreamFormatArg>,

    /// Directory for per-stage result files and the summary.
    #[arg(long, short = 'o')]
    pub output: Option<PathBuf>,

    /// Event log path (defaults under the log directory).
    #[arg(long)]
    pub events: Option<PathBuf>,

    /// Per-stage deadline in seconds.
    #[arg(long)]
    pub timeout: Option<u64>,

    /// Whole-pipeline deadline in seconds.
    #[arg(long)]
    pub deadline: Option<u64>,
}

/// Parses one `backend:prompt` stage argument.
fn parse_stage(raw: &str) -> anyhow::Result<PipelineStage> {
    let Some((backend, prompt)) = raw.split_once(':') else {
        anyhow::bail!("invalid stage {raw:?}: expected \"backend:prompt\"");
    };
    let backend = backend.trim().to_lowercase();
    let prompt = prompt.trim().to_string();
    if backend.is_empty() || prompt.is_empty() {
        anyhow::bail!("invalid stage {raw:?}: backend and prompt must be non-empty");
    }
    Ok(PipelineStage { backend, prompt })
}

pub async fn run(context: &CommandContext, args: PipelineArgs) -> anyhow::Result<ExitCode> {
    let stages = args
        .stages
        .iter()
        .map(|raw| parse_stage(raw))
        .collect::<anyhow::Result<Vec<_>>>()?;
    for stage in &stages {
        context.check_backend(&stage.backend)?;
    }

    let (orchestrator, _recorder) = context.orchestrator("pipeline", args.events.as_deref())?;

    context.progress(&format!("Pipeline with {} stages...", stages.len()));

    let options = task_options(args.format, None, None, args.timeout);
    let mut sink = StdoutSink::new();
    let result = orchestrator
        .run_pipeline(
            &stages,
            !args.no_pass_output,
            &options,
            args.deadline.map(Duration::from_secs),
            &mut sink,
        )
        .await;

    if !context.quiet {
        eprintln!("Pipeline results:");
        for (index, stage) in result.stages.iter().enumerate() {
            let status = if stage.success { "ok" } else { "failed" };
            eprintln!(
                "  stage {} [{}]: {status} ({:.2}s)",
                index + 1,
                stage.backend,
                stage.duration_seconds
            );
        }
        eprintln!("Total duration: {:.2}s", result.total_duration_seconds);
    }

    if let Some(output_dir) = &args.output {
        for (index, stage) in result.stages.iter().enumerate() {
            write_json_file(
                &output_dir.join(format!("stage_{}_{}.json", index + 1, stage.backend)),
                stage,
            )?;
        }
        write_json_file(&output_dir.join("pipeline_summary.json"), &result)?;
        context.progress(&format!("Results saved to {}", output_dir.display()));
    }

    Ok(exit_code(result.success))
}
