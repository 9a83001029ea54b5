// ABOUTME: Desired persistent disk specification for a deployment.
// ABOUTME: Size plus cloud properties that resolve lazily from the manifest.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use super::property::{CloudProperties, PropertyError, PropertySource, resolve_properties};

/// Desired persistent disk for a deployment.
///
/// A `disk_size` of zero means no persistent disk is requested.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DiskPool {
    #[serde(default = "default_pool_name")]
    pub name: String,

    #[serde(default)]
    pub disk_size: u64,

    #[serde(default)]
    pub cloud_properties: BTreeMap<String, PropertySource>,
}

fn default_pool_name() -> String {
    "default".to_string()
}

impl Default for DiskPool {
    fn default() -> Self {
        Self::new(default_pool_name(), 0)
    }
}

impl DiskPool {
    pub fn new(name: impl Into<String>, disk_size: u64) -> Self {
        Self {
            name: name.into(),
            disk_size,
            cloud_properties: BTreeMap::new(),
        }
    }

    /// Add a cloud property source.
    pub fn with_property(
        mut self,
        key: impl Into<String>,
        source: impl Into<PropertySource>,
    ) -> Self {
        self.cloud_properties.insert(key.into(), source.into());
        self
    }

    pub fn size(&self) -> u64 {
        self.disk_size
    }

    /// Whether this pool asks for a persistent disk at all.
    pub fn requires_disk(&self) -> bool {
        self.disk_size > 0
    }

    /// Resolve the cloud properties, reading any referenced env vars now.
    pub fn cloud_properties(&self) -> Result<CloudProperties, PropertyError> {
        resolve_properties(&self.cloud_properties)
    }
}
