//! The `maestro` binary.
//!
//! Five core verbs map 1:1 onto the orchestrator operations
//! (`run-task`, `fallback-run`, `parallel-run`, `pipeline`,
//! `replay-events`), plus `route` for registry-routed requests and
//! `cache` for registry cache maintenance.

mod commands;

use clap::Parser;
use clap::Subcommand;
use std::io::IsTerminal;
use std::process::ExitCode;

use maestro_config::Config;
use maestro_config::load_config;
use maestro_stream::set_decorations;
use maestro_workdir::LogManager;

use crate::commands::CommandContext;

#[derive(Debug, Parser)]
#[command(
    name = "maestro",
    about = "Cross-backend execution orchestrator",
    version
)]
struct Cli {
    #[command(subcommand)]
    command: Command,

    /// Suppress progress messages and the final summary line.
    #[arg(long, short = 'q', global = true)]
    quiet: bool,

    /// Disable icons and colour in rendered output.
    #[arg(long, global = true)]
    plain: bool,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Run a single prompt on one backend.
    RunTask(commands::run_task::RunTaskArgs),

    /// Try backends in order until one succeeds.
    FallbackRun(commands::fallback::FallbackArgs),

    /// Run the same prompt on several backends concurrently.
    ParallelRun(commands::parallel::ParallelArgs),

    /// Run a multi-stage pipeline across backends.
    Pipeline(commands::pipeline::PipelineArgs),

    /// Replay a recorded event log through the formatter.
    ReplayEvents(commands::replay::ReplayArgs),

    /// Route a classified request through the resource registry.
    Route(commands::route::RouteArgs),

    /// Registry cache maintenance.
    Cache(commands::cache::CacheArgs),
}

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();
    // Colour requires a terminal: never write escape codes into a pipe
    // or redirected file.
    let color = !cli.plain && std::io::stdout().is_terminal();
    set_decorations(!cli.plain, color);

    let config = match load_config() {
        Ok(config) => config,
        Err(err) => {
            eprintln!("maestro: {err}");
            return ExitCode::FAILURE;
        }
    };

    let _log_guards = init_logging(&config);

    let context = CommandContext::new(config, cli.quiet);
    let result = match cli.command {
        Command::RunTask(args) => commands::run_task::run(&context, args).await,
        Command::FallbackRun(args) => commands::fallback::run(&context, args).await,
        Command::ParallelRun(args) => commands::parallel::run(&context, args).await,
        Command::Pipeline(args) => commands::pipeline::run(&context, args).await,
        Command::ReplayEvents(args) => commands::replay::run(&context, args),
        Command::Route(args) => commands::route::run(&context, args).await,
        Command::Cache(args) => commands::cache::run(&context, args),
    };

    match result {
        Ok(code) => code,
        Err(err) => {
            eprintln!("maestro: {err:#}");
            ExitCode::FAILURE
        }
    }
}

/// Installs the rotating log sinks; logging failures are not fatal.
fn init_logging(config: &Config) -> Option<maestro_workdir::LogGuards> {
    let manager = LogManager::new(config.log_dir.clone(), config.max_log_files);
    match manager.init("info") {
        Ok(guards) => Some(guards),
        Err(err) => {
            eprintln!("maestro: logging disabled: {err}");
            None
        }
    }
}
