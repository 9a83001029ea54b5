// ABOUTME: Library root for diskdeploy - exposes the deployer and its capabilities.
// ABOUTME: The main binary is in main.rs.

pub mod cloud;
pub mod config;
pub mod deploy;
pub mod disk;
pub mod error;
pub mod output;
pub mod progress;
pub mod types;
pub mod vm;
