// ABOUTME: Recording test doubles for disks, disk managers and VMs.
// ABOUTME: Each double logs its calls and returns scripted results.

use async_trait::async_trait;
use diskdeploy::config::{CloudProperties, DiskPool};
use diskdeploy::disk::{Disk, DiskError, DiskManager, ManagerFactory};
use diskdeploy::types::{DiskCid, VmCid};
use diskdeploy::vm::{Vm, VmError};
use parking_lot::Mutex;
use std::collections::VecDeque;
use std::sync::Arc;

/// Arguments of one `needs_migration` call.
#[derive(Debug, Clone, PartialEq)]
pub struct NeedsMigrationInput {
    pub size: u64,
    pub cloud_properties: CloudProperties,
}

/// Disk whose migration answer is fixed up front.
///
/// Clones share the call log, so a test can keep a handle to a disk it
/// gave to the manager.
#[derive(Debug, Clone)]
pub struct FakeDisk {
    cid: DiskCid,
    needs_migration: bool,
    inputs: Arc<Mutex<Vec<NeedsMigrationInput>>>,
}

impl FakeDisk {
    pub fn new(cid: &str) -> Self {
        Self {
            cid: DiskCid::new(cid),
            needs_migration: false,
            inputs: Arc::default(),
        }
    }

    pub fn needing_migration(mut self) -> Self {
        self.needs_migration = true;
        self
    }

    pub fn needs_migration_inputs(&self) -> Vec<NeedsMigrationInput> {
        self.inputs.lock().clone()
    }
}

impl Disk for FakeDisk {
    fn cid(&self) -> &DiskCid {
        &self.cid
    }

    fn needs_migration(&self, size: u64, cloud_properties: &CloudProperties) -> bool {
        self.inputs.lock().push(NeedsMigrationInput {
            size,
            cloud_properties: cloud_properties.clone(),
        });
        self.needs_migration
    }
}

/// Arguments of one `create` call.
#[derive(Debug, Clone, PartialEq)]
pub struct CreateInput {
    pub pool: DiskPool,
    pub vm_cid: VmCid,
}

#[derive(Default)]
struct ManagerState {
    find_current: Option<Result<Option<FakeDisk>, String>>,
    find_current_calls: usize,
    create_results: VecDeque<Result<FakeDisk, String>>,
    create_inputs: Vec<CreateInput>,
}

/// Disk manager with scripted results. Clones share state.
#[derive(Clone, Default)]
pub struct FakeDiskManager {
    state: Arc<Mutex<ManagerState>>,
}

impl FakeDiskManager {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set_find_current(&self, disk: Option<FakeDisk>) {
        self.state.lock().find_current = Some(Ok(disk));
    }

    pub fn set_find_current_error(&self, message: &str) {
        self.state.lock().find_current = Some(Err(message.to_string()));
    }

    /// Queue the result of the next `create` call.
    pub fn push_create(&self, disk: FakeDisk) {
        self.state.lock().create_results.push_back(Ok(disk));
    }

    pub fn push_create_error(&self, message: &str) {
        self.state
            .lock()
            .create_results
            .push_back(Err(message.to_string()));
    }

    pub fn create_inputs(&self) -> Vec<CreateInput> {
        self.state.lock().create_inputs.clone()
    }

    pub fn find_current_calls(&self) -> usize {
        self.state.lock().find_current_calls
    }
}

#[async_trait]
impl DiskManager for FakeDiskManager {
    type Disk = FakeDisk;

    async fn find_current(&self) -> Result<Option<FakeDisk>, DiskError> {
        let mut state = self.state.lock();
        state.find_current_calls += 1;
        match state.find_current.clone() {
            Some(Ok(disk)) => Ok(disk),
            Some(Err(message)) => Err(DiskError::Provider(message)),
            None => Ok(None),
        }
    }

    async fn create(&self, pool: &DiskPool, vm_cid: &VmCid) -> Result<FakeDisk, DiskError> {
        let mut state = self.state.lock();
        state.create_inputs.push(CreateInput {
            pool: pool.clone(),
            vm_cid: vm_cid.clone(),
        });
        state
            .create_results
            .pop_front()
            .expect("unexpected create call")
            .map_err(DiskError::Provider)
    }
}

/// Opaque cloud handle for fake managers.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FakeCloud {
    pub name: String,
}

impl FakeCloud {
    pub fn new(name: &str) -> Self {
        Self {
            name: name.to_string(),
        }
    }
}

/// Hands out one shared fake manager and remembers which clouds it was given.
#[derive(Clone, Default)]
pub struct FakeManagerFactory {
    manager: FakeDiskManager,
    clouds: Arc<Mutex<Vec<FakeCloud>>>,
}

impl FakeManagerFactory {
    pub fn new(manager: FakeDiskManager) -> Self {
        Self {
            manager,
            clouds: Arc::default(),
        }
    }

    pub fn clouds(&self) -> Vec<FakeCloud> {
        self.clouds.lock().clone()
    }
}

impl ManagerFactory for FakeManagerFactory {
    type Cloud = FakeCloud;
    type Manager = FakeDiskManager;

    fn new_manager(&self, cloud: &FakeCloud) -> FakeDiskManager {
        self.clouds.lock().push(cloud.clone());
        self.manager.clone()
    }
}

/// VM that records attached disk ids and can be told to fail.
pub struct FakeVm {
    cid: VmCid,
    attach_error: Mutex<Option<VmError>>,
    attached: Mutex<Vec<DiskCid>>,
}

impl FakeVm {
    pub fn new(cid: &str) -> Self {
        Self {
            cid: VmCid::new(cid),
            attach_error: Mutex::new(None),
            attached: Mutex::new(Vec::new()),
        }
    }

    pub fn set_attach_error(&self, err: VmError) {
        *self.attach_error.lock() = Some(err);
    }

    pub fn attached(&self) -> Vec<DiskCid> {
        self.attached.lock().clone()
    }
}

#[async_trait]
impl Vm for FakeVm {
    fn cid(&self) -> &VmCid {
        &self.cid
    }

    async fn attach_disk(&self, disk: &dyn Disk) -> Result<(), VmError> {
        self.attached.lock().push(disk.cid().clone());
        match self.attach_error.lock().clone() {
            Some(err) => Err(err),
            None => Ok(()),
        }
    }
}
