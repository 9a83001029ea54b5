// ABOUTME: Deployment target VM capability.
// ABOUTME: The deployer only attaches disks; it never creates or destroys VMs.

use async_trait::async_trait;

use crate::disk::Disk;
use crate::types::VmCid;

/// A VM that persistent disks can be attached to.
#[async_trait]
pub trait Vm: Send + Sync {
    fn cid(&self) -> &VmCid;

    async fn attach_disk(&self, disk: &dyn Disk) -> Result<(), VmError>;
}

/// Errors from VM operations.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum VmError {
    #[error("vm not found: {0}")]
    NotFound(String),

    #[error("disk {disk} is attached to another vm ({vm})")]
    DiskInUse { disk: String, vm: String },

    #[error("failed to attach disk {disk}: {reason}")]
    AttachFailed { disk: String, reason: String },

    #[error("provider error: {0}")]
    Provider(String),
}
