//! `maestro replay-events`: re-render a recorded run.

use clap::Args;
use std::path::PathBuf;
use std::process::ExitCode;

use maestro_stream::ReplayFormat;
use maestro_stream::StdoutSink;
use maestro_stream::replay_events;

use super::CommandContext;
use super::exit_code;

#[derive(Debug, Clone, Copy, PartialEq, Eq, clap::ValueEnum)]
pub enum ReplayFormatArg {
    /// Human-readable rendering through the formatter.
    Text,
    /// Re-emit every record as one JSON line.
    Jsonl,
}

#[derive(Debug, Args)]
pub struct ReplayArgs {
    /// Path to the events JSONL file.
    #[arg(long, short = 'e')]
    pub events: PathBuf,

    /// Output format.
    #[arg(long, short = 'f', value_enum, default_value = "text")]
    pub format: ReplayFormatArg,
}

pub fn run(context: &CommandContext, args: ReplayArgs) -> anyhow::Result<ExitCode> {
    let format = match args.format {
        ReplayFormatArg::Text => ReplayFormat::Text,
        ReplayFormatArg::Jsonl => ReplayFormat::Jsonl,
    };

    context.progress(&format!("Replaying events from {}", args.events.display()));

    let mut sink = StdoutSink::new();
    match replay_events(&args.events, format, &mut sink) {
        Ok(stats) => {
            context.progress(&format!(
                "Replayed {} events ({} rendered)",
                stats.events, stats.rendered
            ));
            Ok(exit_code(true))
        }
        Err(err) => {
            eprintln!("maestro: replay failed: {err}");
            Ok(exit_code(false))
        }
    }
}
