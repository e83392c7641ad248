//! Tonebed CLI - Procedural Background-Track Synthesizer
//!
//! Command-line interface for the Tonebed synthesizer.

use anyhow::Context;
use clap::Parser;
use env_logger::Env;
use log::info;

use tonebed::cli::{commands, Cli, Commands};

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let default_filter = if cli.verbose { "debug" } else { "info" };
    env_logger::Builder::from_env(Env::default().default_filter_or(default_filter)).init();

    info!("Tonebed v{}", env!("CARGO_PKG_VERSION"));

    match cli.command {
        Some(cmd) => handle_command(cmd),
        None => {
            println!("Tonebed v{}", env!("CARGO_PKG_VERSION"));
            println!("Use --help for available commands");
            Ok(())
        }
    }
}

fn handle_command(cmd: Commands) -> anyhow::Result<()> {
    match cmd {
        Commands::Render(args) => commands::render(&args)
            .with_context(|| format!("failed to render {}", args.output.display())),
        Commands::Score { output } => {
            commands::print_score(output.as_deref()).context("failed to write score")
        }
        Commands::Inspect { path } => commands::inspect(&path)
            .with_context(|| format!("failed to inspect {}", path.display())),
    }
}
