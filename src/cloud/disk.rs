// ABOUTME: Disk manager and disk handles backed by the local state file.
// ABOUTME: New disks become current only when the deployment has none yet.

use async_trait::async_trait;
use chrono::Utc;

use super::state::{DiskRecord, LocalCloud, StoreError};
use crate::config::{CloudProperties, DiskPool};
use crate::disk::{Disk, DiskError, DiskManager, ManagerFactory};
use crate::types::{DiskCid, VmCid};

impl From<StoreError> for DiskError {
    fn from(err: StoreError) -> Self {
        DiskError::Provider(err.to_string())
    }
}

/// A disk recorded by the local provider.
#[derive(Debug, Clone)]
pub struct LocalDisk {
    record: DiskRecord,
}

impl LocalDisk {
    pub fn record(&self) -> &DiskRecord {
        &self.record
    }
}

impl From<DiskRecord> for LocalDisk {
    fn from(record: DiskRecord) -> Self {
        Self { record }
    }
}

impl Disk for LocalDisk {
    fn cid(&self) -> &DiskCid {
        &self.record.cid
    }

    fn needs_migration(&self, size: u64, cloud_properties: &CloudProperties) -> bool {
        !self.record.matches(size, cloud_properties)
    }
}

/// Disk manager for one deployment on a [`LocalCloud`].
#[derive(Debug, Clone)]
pub struct LocalDiskManager {
    cloud: LocalCloud,
    deployment: String,
}

#[async_trait]
impl DiskManager for LocalDiskManager {
    type Disk = LocalDisk;

    async fn find_current(&self) -> Result<Option<LocalDisk>, DiskError> {
        let state = self.cloud.load(&self.deployment).await?;

        let Some(cid) = state.current_disk.as_ref() else {
            return Ok(None);
        };

        state
            .disk(cid)
            .cloned()
            .map(|record| Some(LocalDisk { record }))
            .ok_or_else(|| DiskError::NotFound(cid.to_string()))
    }

    async fn create(&self, pool: &DiskPool, vm_cid: &VmCid) -> Result<LocalDisk, DiskError> {
        let cloud_properties = pool
            .cloud_properties()
            .map_err(|e| DiskError::InvalidSpec(e.to_string()))?;

        let record = self
            .cloud
            .update(&self.deployment, |state| {
                let record = DiskRecord {
                    cid: state.allocate_cid(),
                    size: pool.size(),
                    cloud_properties,
                    vm: Some(vm_cid.clone()),
                    attached: false,
                    created_at: Utc::now(),
                };

                if state.current_disk.is_none() {
                    state.current_disk = Some(record.cid.clone());
                }
                state.disks.push(record.clone());

                Ok::<_, DiskError>(record)
            })
            .await?;

        tracing::debug!(
            deployment = %self.deployment,
            disk = %record.cid,
            size = record.size,
            "created disk"
        );

        Ok(LocalDisk { record })
    }
}

/// Builds [`LocalDiskManager`]s scoped to one deployment.
#[derive(Debug, Clone)]
pub struct LocalManagerFactory {
    deployment: String,
}

impl LocalManagerFactory {
    pub fn new(deployment: impl Into<String>) -> Self {
        Self {
            deployment: deployment.into(),
        }
    }
}

impl ManagerFactory for LocalManagerFactory {
    type Cloud = LocalCloud;
    type Manager = LocalDiskManager;

    fn new_manager(&self, cloud: &LocalCloud) -> LocalDiskManager {
        LocalDiskManager {
            cloud: cloud.clone(),
            deployment: self.deployment.clone(),
        }
    }
}
