// ABOUTME: Capability traits for disks and the managers that find and create them.
// ABOUTME: Implemented by providers and by test doubles alike.

use async_trait::async_trait;

use super::DiskError;
use crate::config::{CloudProperties, DiskPool};
use crate::types::{DiskCid, VmCid};

/// Handle to a provisioned persistent disk.
///
/// Disks are never resized in place: a changed specification always results
/// in a new disk.
pub trait Disk: Send + Sync {
    /// Provider-assigned identity of this disk.
    fn cid(&self) -> &DiskCid;

    /// Whether this disk no longer satisfies the desired size and properties.
    ///
    /// Must be pure: identical inputs always give the same answer.
    fn needs_migration(&self, size: u64, cloud_properties: &CloudProperties) -> bool;
}

/// Finds and creates disks for one deployment against one cloud.
#[async_trait]
pub trait DiskManager: Send + Sync {
    type Disk: Disk;

    /// Locate the disk currently associated with the deployment.
    ///
    /// `Ok(None)` is the normal "no disk yet" case.
    async fn find_current(&self) -> Result<Option<Self::Disk>, DiskError>;

    /// Provision a new disk per `pool` and associate it with `vm_cid`.
    async fn create(&self, pool: &DiskPool, vm_cid: &VmCid) -> Result<Self::Disk, DiskError>;
}

/// Builds a disk manager bound to a cloud handle.
///
/// The cloud handle is opaque to callers; only the factory knows how to
/// turn it into a working manager.
pub trait ManagerFactory: Send + Sync {
    type Cloud: ?Sized + Send + Sync;
    type Manager: DiskManager;

    fn new_manager(&self, cloud: &Self::Cloud) -> Self::Manager;
}
