// ABOUTME: VM handle for the local provider.
// ABOUTME: Attaching marks the disk record as attached to this VM.

use async_trait::async_trait;

use super::state::{LocalCloud, StoreError};
use crate::disk::Disk;
use crate::types::VmCid;
use crate::vm::{Vm, VmError};

impl From<StoreError> for VmError {
    fn from(err: StoreError) -> Self {
        VmError::Provider(err.to_string())
    }
}

#[derive(Debug, Clone)]
pub struct LocalVm {
    cid: VmCid,
    cloud: LocalCloud,
    deployment: String,
}

impl LocalVm {
    pub fn new(cid: VmCid, cloud: LocalCloud, deployment: impl Into<String>) -> Self {
        Self {
            cid,
            cloud,
            deployment: deployment.into(),
        }
    }
}

#[async_trait]
impl Vm for LocalVm {
    fn cid(&self) -> &VmCid {
        &self.cid
    }

    async fn attach_disk(&self, disk: &dyn Disk) -> Result<(), VmError> {
        let disk_cid = disk.cid().clone();

        self.cloud
            .update(&self.deployment, |state| {
                let record = state
                    .disk_mut(&disk_cid)
                    .ok_or_else(|| VmError::AttachFailed {
                        disk: disk_cid.to_string(),
                        reason: "disk is unknown to this cloud".to_string(),
                    })?;

                match &record.vm {
                    Some(owner) if owner != &self.cid => {
                        return Err(VmError::DiskInUse {
                            disk: disk_cid.to_string(),
                            vm: owner.to_string(),
                        });
                    }
                    _ => {}
                }

                record.vm = Some(self.cid.clone());
                record.attached = true;
                Ok(())
            })
            .await?;

        tracing::debug!(vm = %self.cid, disk = %disk_cid, "attached disk");
        Ok(())
    }
}
