// ABOUTME: Command-line interface definition using clap derive macros.
// ABOUTME: Defines all subcommands and their arguments.

use clap::{Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "diskdeploy")]
#[command(about = "Persistent disk deployment for a single VM")]
#[command(version)]
pub struct Cli {
    /// Enable debug logging
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Only print the final result
    #[arg(short, long, global = true, conflicts_with = "json")]
    pub quiet: bool,

    /// Print JSON lines instead of text
    #[arg(long, global = true)]
    pub json: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Initialize a new diskdeploy.yml manifest
    Init {
        /// Deployment name to put in the manifest
        #[arg(long)]
        name: Option<String>,

        /// Overwrite an existing manifest
        #[arg(short, long)]
        force: bool,
    },

    /// Ensure the deployment's persistent disk exists and is attached
    Deploy {
        /// Path to the manifest (discovered in the current directory by default)
        #[arg(short, long)]
        manifest: Option<PathBuf>,
    },

    /// List disks recorded for the deployment
    Disks {
        /// Path to the manifest (discovered in the current directory by default)
        #[arg(short, long)]
        manifest: Option<PathBuf>,
    },
}
