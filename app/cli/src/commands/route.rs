//! `maestro route`: dispatch a classified request through the registry.

use clap::Args;
use std::path::PathBuf;
use std::process::ExitCode;
use std::sync::Arc;
use std::time::Duration;

use maestro_registry::RegistryPersistence;
use maestro_registry::ResourceScanner;
use maestro_registry::UnifiedRegistry;
use maestro_router::Complexity;
use maestro_router::ExecutionRouter;
use maestro_router::Intent;
use maestro_router::IntentMode;
use maestro_stream::StdoutSink;

use super::CommandContext;
use super::StreamFormatArg;
use super::exit_code;
use super::task_options;
use super::write_json_file;

#[derive(Debug, Clone, Copy, PartialEq, Eq, clap::ValueEnum)]
pub enum ModeArg {
    Skill,
    Command,
    Agent,
    Prompt,
    Plain,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, clap::ValueEnum)]
pub enum ComplexityArg {
    Low,
    Medium,
    High,
}

#[derive(Debug, Args)]
pub struct RouteArgs {
    /// The original request text.
    #[arg(long, short = 'r')]
    pub request: String,

    /// Ranked candidate namespaces, primary first. Repeatable.
    #[arg(long = "candidate", short = 'c')]
    pub candidates: Vec<String>,

    /// Preferred namespace when no candidate list is given.
    #[arg(long)]
    pub entity: Option<String>,

    /// Classified execution mode.
    #[arg(long, value_enum, default_value = "plain")]
    pub mode: ModeArg,

    /// Free-form task tag.
    #[arg(long, default_value = "")]
    pub task_type: String,

    /// Estimated complexity.
    #[arg(long, value_enum, default_value = "medium")]
    pub complexity: ComplexityArg,

    /// Classifier confidence in [0, 1].
    #[arg(long, default_value_t = 1.0)]
    pub confidence: f64,

    /// Stream format override (defaults to the backend's dialect).
    #[arg(long, short = 'f', value_enum)]
    pub format: Option<StreamFormatArg>,

    /// Write the task result and router decision as JSON to this path.
    #[arg(long, short = 'o')]
    pub output: Option<PathBuf>,

    /// Event log path (defaults under the log directory).
    #[arg(long)]
    pub events: Option<PathBuf>,

    /// Per-dispatch deadline in seconds.
    #[arg(long)]
    pub timeout: Option<u64>,
}

pub async fn run(context: &CommandContext, args: RouteArgs) -> anyhow::Result<ExitCode> {
    // Load the registry, from cache when fresh.
    let scanner = ResourceScanner::new(
        context.config.user_root.clone(),
        context.config.project_root.clone(),
    );
    let persistence = RegistryPersistence::new(
        context.config.cache_dir.clone(),
        Duration::from_secs(context.config.cache_ttl_seconds),
    );
    let (snapshot, warnings) = persistence.load_or_scan(&scanner)?;
    for warning in &warnings {
        context.progress(&format!(
            "warning: {}: {}",
            warning.path.display(),
            warning.message
        ));
    }
    let registry = UnifiedRegistry::hydrate(snapshot.resources);

    let (orchestrator, recorder) = context.orchestrator("route", args.events.as_deref())?;
    let temp = context.temp_manager();
    let router = ExecutionRouter::new(&registry, &orchestrator)
        .with_recorder(Arc::clone(&recorder))
        .with_workdir(&temp);

    let intent = Intent {
        mode: match args.mode {
            ModeArg::Skill => IntentMode::Skill,
            ModeArg::Command => IntentMode::Command,
            ModeArg::Agent => IntentMode::Agent,
            ModeArg::Prompt => IntentMode::Prompt,
            ModeArg::Plain => IntentMode::Plain,
        },
        task_type: args.task_type.clone(),
        complexity: match args.complexity {
            ComplexityArg::Low => Complexity::Low,
            ComplexityArg::Medium => Complexity::Medium,
            ComplexityArg::High => Complexity::High,
        },
        confidence: args.confidence,
        entity: args.entity.clone(),
        candidates: args.candidates.clone(),
    };

    context.progress(&format!(
        "Routing across {} candidate(s)...",
        intent.candidate_list().len()
    ));

    let options = task_options(args.format, None, None, args.timeout);
    let mut sink = StdoutSink::new();
    let (result, decision) = router.route(&intent, &args.request, &options, &mut sink).await;

    if !context.quiet {
        match &decision.selected {
            Some(namespace) => eprintln!("Served by {namespace}"),
            None => {
                for attempt in &decision.attempts {
                    eprintln!(
                        "  {}: {}",
                        attempt.namespace,
                        serde_json::to_string(&attempt.feedback).unwrap_or_default()
                    );
                }
            }
        }
    }

    if let Some(output) = &args.output {
        write_json_file(
            output,
            &serde_json::json!({ "result": result, "decision": decision }),
        )?;
        context.progress(&format!("Result saved to {}", output.display()));
    }

    if !context.quiet {
        eprintln!("{}", result.summary_line());
    }
    Ok(exit_code(result.success))
}
