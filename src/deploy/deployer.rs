// ABOUTME: Disk deployment orchestrator: find or create, attach, then check for migration.
// ABOUTME: Runs sequentially and reports each side-effecting call as a progress step.

use snafu::ResultExt;
use tracing::{debug, info};

use super::error::{
    CreateDiskSnafu, CreateSecondaryDiskSnafu, DeployError, FindCurrentSnafu,
    ResolveCloudPropertiesSnafu,
};
use crate::config::DiskPool;
use crate::disk::{Disk, DiskError, DiskManager, ManagerFactory};
use crate::progress::Stage;
use crate::types::{DiskCid, VmCid};
use crate::vm::Vm;

/// Step name used whenever a disk is provisioned.
pub const CREATE_DISK_STEP: &str = "Creating disk";

/// Step name used when attaching `disk` to `vm`.
pub fn attach_step_name(disk: &DiskCid, vm: &VmCid) -> String {
    format!("Attaching disk '{disk}' to VM '{vm}'")
}

/// Ensures a VM has a persistent disk matching its disk pool.
///
/// Nothing is retried or rolled back: the first failure ends the deploy and
/// whatever was already created or attached stays that way.
#[derive(Debug, Clone)]
pub struct DiskDeployer<F> {
    manager_factory: F,
}

impl<F: ManagerFactory> DiskDeployer<F> {
    pub fn new(manager_factory: F) -> Self {
        Self { manager_factory }
    }

    /// Make sure a disk for `pool` exists and is attached to `vm`.
    ///
    /// A disk that already existed is checked against `pool` after it is
    /// attached; if it no longer matches, a replacement disk is provisioned.
    /// The replacement is not attached and the old disk is left in place.
    ///
    /// # Errors
    ///
    /// Returns the first failure. Attach failures are returned as the
    /// underlying [`crate::vm::VmError`], everything else with context.
    pub async fn deploy<V>(
        &self,
        pool: &DiskPool,
        cloud: &F::Cloud,
        vm: &V,
        stage: &Stage,
    ) -> Result<(), DeployError>
    where
        V: Vm + ?Sized,
    {
        if !pool.requires_disk() {
            debug!(pool = %pool.name, "disk pool size is 0, skipping persistent disk");
            return Ok(());
        }

        debug!(vm = %vm.cid(), "creating and attaching disk to vm");
        let manager = self.manager_factory.new_manager(cloud);

        let current = manager.find_current().await.context(FindCurrentSnafu)?;
        let existing = current.is_some();

        let disk = match current {
            Some(disk) => {
                debug!(disk = %disk.cid(), "found existing disk");
                disk
            }
            None => create_disk(&manager, pool, vm.cid(), stage)
                .await
                .context(CreateDiskSnafu)?,
        };

        let attach_step = stage.new_step(attach_step_name(disk.cid(), vm.cid()));
        attach_step.start();
        if let Err(e) = vm.attach_disk(&disk).await {
            attach_step.fail(e.to_string());
            return Err(e.into());
        }
        attach_step.finish();

        // Only a disk from an earlier deploy can be out of date
        if existing {
            let cloud_properties = pool
                .cloud_properties()
                .context(ResolveCloudPropertiesSnafu)?;

            if disk.needs_migration(pool.size(), &cloud_properties) {
                migrate_disk(&manager, &disk, pool, vm.cid(), stage).await?;
            } else {
                debug!(disk = %disk.cid(), "existing disk matches disk pool");
            }
        }

        Ok(())
    }
}

/// Provision a replacement for `primary`.
///
/// Only the replacement is created; attaching it, copying data and removing
/// `primary` are left to the operator.
async fn migrate_disk<M: DiskManager>(
    manager: &M,
    primary: &M::Disk,
    pool: &DiskPool,
    vm_cid: &VmCid,
    stage: &Stage,
) -> Result<M::Disk, DeployError> {
    info!(
        disk = %primary.cid(),
        size = pool.size(),
        "disk no longer matches disk pool, creating replacement"
    );

    let secondary = create_disk(manager, pool, vm_cid, stage)
        .await
        .context(CreateSecondaryDiskSnafu)?;

    info!(
        primary = %primary.cid(),
        secondary = %secondary.cid(),
        "created replacement disk"
    );
    Ok(secondary)
}

async fn create_disk<M: DiskManager>(
    manager: &M,
    pool: &DiskPool,
    vm_cid: &VmCid,
    stage: &Stage,
) -> Result<M::Disk, DiskError> {
    let step = stage.new_step(CREATE_DISK_STEP);
    step.start();

    match manager.create(pool, vm_cid).await {
        Ok(disk) => {
            step.finish();
            Ok(disk)
        }
        Err(e) => {
            step.fail(e.to_string());
            Err(e)
        }
    }
}
