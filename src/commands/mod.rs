// ABOUTME: Command module aggregator for the diskdeploy CLI.
// ABOUTME: Re-exports deploy and disks command handlers.

mod deploy;
mod disks;

pub use deploy::deploy;
pub use disks::disks;

use diskdeploy::config::Manifest;
use diskdeploy::error::Result;
use std::env;
use std::path::PathBuf;

/// Load the manifest from an explicit path or discover it in the working directory.
pub fn load_manifest(path: Option<PathBuf>) -> Result<Manifest> {
    match path {
        Some(path) => Manifest::load(&path),
        None => Manifest::discover(&env::current_dir()?),
    }
}
