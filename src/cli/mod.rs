// ============================================================
// Layer 1 — CLI / Presentation Layer
// ============================================================
// Entry point for all user interaction, parsed with clap.
// All search logic is delegated to Layer 2 (application).
//
// Two commands are supported:
//   1. `search`      — runs one frontier search and archives the pairs
//   2. `init-config` — writes a preset configuration to edit by hand

pub mod commands;

use anyhow::Result;
use clap::Parser;
use commands::{Commands, InitConfigArgs, SearchArgs};

use crate::application::config::RunConfig;
use crate::infra::checkpoint::{read_config, write_config};

/// The main CLI struct
#[derive(Parser, Debug)]
#[command(
    name = "frontier-search",
    version = "0.1.0",
    about = "Find near-identical generated image pairs that a classifier labels differently."
)]
pub struct Cli {
    /// The subcommand to run (search or init-config)
    #[command(subcommand)]
    pub command: Commands,
}

impl Cli {
    /// Match on the subcommand and dispatch to the correct use case.
    pub fn run(self) -> Result<()> {
        match self.command {
            Commands::Search(args)     => run_search(args),
            Commands::InitConfig(args) => run_init_config(args),
        }
    }
}

/// Handles the `search` subcommand.
/// Builds the run config from preset or file plus flags, then hands off to Layer 2.
fn run_search(args: SearchArgs) -> Result<()> {
    use crate::application::search_use_case::SearchUseCase;

    let base = match &args.config {
        Some(path) => {
            tracing::info!("Loading run config from '{}'", path.display());
            read_config(path)?
        }
        None => RunConfig::preset(args.preset.into()),
    };
    let config = args.apply(base);

    let summary = SearchUseCase::new(config).execute()?;

    println!(
        "Run {}: {} frontier pairs ({} evaluated, {} skipped, {}) in {:.1}s -> {}",
        summary.run_id,
        summary.pair_files.len(),
        summary.stats.evaluated,
        summary.stats.adapter_failures,
        summary.stats.stop_reason.as_str(),
        summary.stats.elapsed_secs,
        summary.archive_dir.display(),
    );
    println!("Run report appended to {}", summary.report_path.display());
    Ok(())
}

/// Handles the `init-config` subcommand.
fn run_init_config(args: InitConfigArgs) -> Result<()> {
    let config = RunConfig::preset(args.preset.into());
    write_config(&args.out, &config)?;
    println!("Wrote {} configuration to {}", config.preset.as_str(), args.out.display());
    Ok(())
}
