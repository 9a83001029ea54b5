// ABOUTME: Persistent disk capabilities consumed by the deployer.
// ABOUTME: Defines Disk, DiskManager, ManagerFactory and their errors.

mod error;
mod manager;

pub use error::DiskError;
pub use manager::{Disk, DiskManager, ManagerFactory};
