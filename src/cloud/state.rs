// ABOUTME: Persistent state for the local provider and the cloud handle that owns it.
// ABOUTME: Read-modify-write of the state file is serialized per handle.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tokio::sync::Mutex;

use crate::config::CloudProperties;
use crate::types::{DiskCid, VmCid};

/// A disk provisioned by the local provider.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DiskRecord {
    pub cid: DiskCid,
    pub size: u64,
    #[serde(default)]
    pub cloud_properties: CloudProperties,
    /// VM the disk was created for.
    #[serde(default)]
    pub vm: Option<VmCid>,
    #[serde(default)]
    pub attached: bool,
    pub created_at: DateTime<Utc>,
}

impl DiskRecord {
    /// Whether the recorded disk has exactly the given size and properties.
    pub fn matches(&self, size: u64, cloud_properties: &CloudProperties) -> bool {
        self.size == size && self.cloud_properties == *cloud_properties
    }
}

/// Everything the local provider knows about one deployment.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DeploymentState {
    /// Disk the deployment currently uses.
    #[serde(default)]
    pub current_disk: Option<DiskCid>,
    #[serde(default)]
    pub next_id: u64,
    #[serde(default)]
    pub disks: Vec<DiskRecord>,
}

impl DeploymentState {
    pub fn disk(&self, cid: &DiskCid) -> Option<&DiskRecord> {
        self.disks.iter().find(|d| &d.cid == cid)
    }

    pub fn disk_mut(&mut self, cid: &DiskCid) -> Option<&mut DiskRecord> {
        self.disks.iter_mut().find(|d| &d.cid == cid)
    }

    /// Allocate the next disk id.
    pub fn allocate_cid(&mut self) -> DiskCid {
        self.next_id += 1;
        DiskCid::new(format!("disk-{}", self.next_id))
    }
}

/// Errors reading or writing provider state.
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("failed to access state file {path}: {source}")]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("corrupt state file {path}: {source}")]
    Corrupt {
        path: PathBuf,
        source: serde_json::Error,
    },
}

/// Cloud handle for the local provider.
///
/// Clones share the same state lock, so concurrent updates through any
/// clone are applied one at a time.
#[derive(Debug, Clone)]
pub struct LocalCloud {
    state_dir: PathBuf,
    lock: Arc<Mutex<()>>,
}

impl LocalCloud {
    pub fn new(state_dir: impl Into<PathBuf>) -> Self {
        Self {
            state_dir: state_dir.into(),
            lock: Arc::new(Mutex::new(())),
        }
    }

    pub fn state_dir(&self) -> &Path {
        &self.state_dir
    }

    pub fn state_path(&self, deployment: &str) -> PathBuf {
        self.state_dir.join(format!("{deployment}.json"))
    }

    /// Load the state for a deployment. A missing file is an empty state.
    pub async fn load(&self, deployment: &str) -> Result<DeploymentState, StoreError> {
        let _guard = self.lock.lock().await;
        self.read(deployment).await
    }

    /// Apply `f` to the deployment state and persist the result.
    ///
    /// Nothing is written when `f` fails.
    pub async fn update<T, E>(
        &self,
        deployment: &str,
        f: impl FnOnce(&mut DeploymentState) -> Result<T, E>,
    ) -> Result<T, E>
    where
        E: From<StoreError>,
    {
        let _guard = self.lock.lock().await;
        let mut state = self.read(deployment).await?;
        let value = f(&mut state)?;
        self.write(deployment, &state).await?;
        Ok(value)
    }

    async fn read(&self, deployment: &str) -> Result<DeploymentState, StoreError> {
        let path = self.state_path(deployment);
        let content = match tokio::fs::read(&path).await {
            Ok(content) => content,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                tracing::debug!(path = %path.display(), "no state file, starting empty");
                return Ok(DeploymentState::default());
            }
            Err(source) => return Err(StoreError::Io { path, source }),
        };

        serde_json::from_slice(&content).map_err(|source| StoreError::Corrupt { path, source })
    }

    async fn write(&self, deployment: &str, state: &DeploymentState) -> Result<(), StoreError> {
        let path = self.state_path(deployment);
        let io_err = |source: std::io::Error| StoreError::Io {
            path: path.clone(),
            source,
        };

        tokio::fs::create_dir_all(&self.state_dir)
            .await
            .map_err(io_err)?;

        let json = serde_json::to_vec_pretty(state).map_err(|source| StoreError::Corrupt {
            path: path.clone(),
            source,
        })?;

        // Write then rename so a crash never leaves a half-written file
        let tmp = path.with_extension("json.tmp");
        tokio::fs::write(&tmp, json).await.map_err(io_err)?;
        tokio::fs::rename(&tmp, &path).await.map_err(io_err)?;

        tracing::debug!(path = %path.display(), disks = state.disks.len(), "saved state");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::PropertyValue;

    fn record(size: u64) -> DiskRecord {
        DiskRecord {
            cid: DiskCid::new("disk-1"),
            size,
            cloud_properties: CloudProperties::from([(
                "type".to_string(),
                PropertyValue::from("ssd"),
            )]),
            vm: None,
            attached: false,
            created_at: Utc::now(),
        }
    }

    #[test]
    fn record_matches_only_identical_spec() {
        let rec = record(100);
        let props = rec.cloud_properties.clone();

        assert!(rec.matches(100, &props));
        assert!(!rec.matches(200, &props));
        assert!(!rec.matches(100, &CloudProperties::new()));
    }

    #[test]
    fn allocated_cids_are_sequential() {
        let mut state = DeploymentState::default();
        assert_eq!(state.allocate_cid().as_str(), "disk-1");
        assert_eq!(state.allocate_cid().as_str(), "disk-2");
    }
}
