// ABOUTME: Entry point for the diskdeploy CLI application.
// ABOUTME: Parses arguments and dispatches to appropriate command handlers.

mod cli;
mod commands;

use clap::Parser;
use cli::{Cli, Commands};
use diskdeploy::config;
use diskdeploy::error::Result;
use diskdeploy::output::{Output, OutputMode};
use std::env;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    let filter = if cli.verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::new("warn")
    };
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(true)
        .with_writer(std::io::stderr)
        .init();

    let mode = if cli.json {
        OutputMode::Json
    } else if cli.quiet {
        OutputMode::Quiet
    } else {
        OutputMode::Normal
    };

    if let Err(e) = run(cli.command, mode).await {
        Output::new(mode).error(&e.to_string());
        std::process::exit(1);
    }
}

async fn run(command: Commands, mode: OutputMode) -> Result<()> {
    let output = Output::new(mode);

    match command {
        Commands::Init { name, force } => {
            let cwd = env::current_dir()?;
            let path = config::init_manifest(&cwd, name.as_deref(), force)?;
            output.success(&format!("Created {}", path.display()));
            Ok(())
        }
        Commands::Deploy { manifest } => {
            let manifest = commands::load_manifest(manifest)?;
            commands::deploy(manifest, output).await
        }
        Commands::Disks { manifest } => {
            let manifest = commands::load_manifest(manifest)?;
            commands::disks(manifest, output).await
        }
    }
}
