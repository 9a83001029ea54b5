// ABOUTME: Local, file-backed cloud provider for running deploys without an IaaS.
// ABOUTME: Keeps one JSON state file of disks per deployment.

mod disk;
mod state;
mod vm;

pub use disk::{LocalDisk, LocalDiskManager, LocalManagerFactory};
pub use state::{DeploymentState, DiskRecord, LocalCloud, StoreError};
pub use vm::LocalVm;
