// ABOUTME: Persistent disk deployment for a single VM.
// ABOUTME: Exports the DiskDeployer orchestrator and its error types.

mod deployer;
mod error;

pub use deployer::{CREATE_DISK_STEP, DiskDeployer, attach_step_name};
pub use error::{DeployError, DeployErrorKind};
