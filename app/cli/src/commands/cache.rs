//! `maestro cache`: registry cache maintenance.

use clap::Args;
use clap::Subcommand;
use std::process::ExitCode;
use std::time::Duration;

use maestro_registry::RegistryPersistence;

use super::CommandContext;
use super::exit_code;

#[derive(Debug, Args)]
pub struct CacheArgs {
    #[command(subcommand)]
    pub action: CacheAction,
}

#[derive(Debug, Subcommand)]
pub enum CacheAction {
    /// Show registry cache statistics.
    Stats {
        /// Print machine-readable JSON.
        #[arg(long)]
        json: bool,
    },
    /// Delete the registry cache files.
    Clear,
}

pub fn run(context: &CommandContext, args: CacheArgs) -> anyhow::Result<ExitCode> {
    let persistence = RegistryPersistence::new(
        context.config.cache_dir.clone(),
        Duration::from_secs(context.config.cache_ttl_seconds),
    );

    match args.action {
        CacheAction::Stats { json } => {
            let stats = persistence.get_stats();
            if json {
                println!("{}", serde_json::to_string_pretty(&stats)?);
            } else {
                println!("status: {}", status_label(&stats));
                println!("valid: {}", stats.is_valid);
                if let Some(age) = stats.age_seconds {
                    println!("age: {age}s");
                }
                if let Some(total) = stats.total_resources {
                    println!("resources: {total}");
                }
                println!("ttl: {}s", stats.ttl_seconds);
            }
            Ok(exit_code(true))
        }
        CacheAction::Clear => {
            persistence.invalidate()?;
            context.progress("Registry cache cleared");
            Ok(exit_code(true))
        }
    }
}

fn status_label(stats: &maestro_registry::CacheStats) -> &'static str {
    match stats.status {
        maestro_registry::CacheStatus::Cached => "cached",
        maestro_registry::CacheStatus::NoCache => "no_cache",
        maestro_registry::CacheStatus::Invalid => "invalid",
    }
}
