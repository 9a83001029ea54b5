// ABOUTME: Deployment manifest types and parsing for diskdeploy.yml.
// ABOUTME: Handles YAML parsing, manifest discovery, and template generation.

mod disk_pool;
mod property;

pub use disk_pool::DiskPool;
pub use property::{
    CloudProperties, EnvReference, PropertyError, PropertySource, PropertyValue,
    resolve_properties,
};

use crate::error::{Error, Result};
use crate::types::VmCid;
use serde::Deserialize;
use std::path::{Path, PathBuf};

pub const MANIFEST_FILENAME: &str = "diskdeploy.yml";
pub const MANIFEST_FILENAME_ALT: &str = "diskdeploy.yaml";
pub const MANIFEST_FILENAME_DIR: &str = ".diskdeploy/manifest.yml";

#[derive(Debug, Clone, Deserialize)]
pub struct Manifest {
    pub name: String,

    pub vm: VmConfig,

    #[serde(default)]
    pub disk_pool: DiskPool,

    #[serde(default = "default_state_dir")]
    pub state_dir: PathBuf,
}

#[derive(Debug, Clone, Deserialize)]
pub struct VmConfig {
    pub cid: VmCid,
}

fn default_state_dir() -> PathBuf {
    PathBuf::from(".diskdeploy")
}

impl Manifest {
    pub fn from_yaml(yaml: &str) -> Result<Self> {
        let manifest: Manifest = serde_yaml::from_str(yaml)?;
        manifest.validate()?;
        Ok(manifest)
    }

    /// Load a manifest. A relative `state_dir` is taken relative to the
    /// manifest's own directory.
    pub fn load(path: &Path) -> Result<Self> {
        let base = path.parent().unwrap_or_else(|| Path::new(""));
        Self::load_with_base(path, base)
    }

    /// Find the manifest in `dir`. A relative `state_dir` is taken relative
    /// to `dir`, wherever the manifest itself lives.
    pub fn discover(dir: &Path) -> Result<Self> {
        let candidates = [
            dir.join(MANIFEST_FILENAME),
            dir.join(MANIFEST_FILENAME_ALT),
            dir.join(MANIFEST_FILENAME_DIR),
        ];

        for path in &candidates {
            if path.exists() {
                return Self::load_with_base(path, dir);
            }
        }

        Err(Error::ConfigNotFound(dir.to_path_buf()))
    }

    fn load_with_base(path: &Path, base: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        let mut manifest = Self::from_yaml(&content)?;
        if manifest.state_dir.is_relative() {
            manifest.state_dir = base.join(&manifest.state_dir);
        }
        Ok(manifest)
    }

    /// Deployment names scope state files, so they must be filename-safe.
    fn validate(&self) -> Result<()> {
        if self.name.is_empty() {
            return Err(Error::InvalidConfig(
                "deployment name cannot be empty".to_string(),
            ));
        }

        if self.name.starts_with('.')
            || !self
                .name
                .chars()
                .all(|c| c.is_ascii_alphanumeric() || matches!(c, '-' | '_' | '.'))
        {
            return Err(Error::InvalidConfig(format!(
                "invalid deployment name '{}': use letters, digits, '-', '_' or '.'",
                self.name
            )));
        }

        if self.vm.cid.as_str().is_empty() {
            return Err(Error::InvalidConfig("vm cid cannot be empty".to_string()));
        }

        Ok(())
    }
}

pub fn init_manifest(dir: &Path, name: Option<&str>, force: bool) -> Result<PathBuf> {
    let manifest_path = dir.join(MANIFEST_FILENAME);

    if manifest_path.exists() && !force {
        return Err(Error::AlreadyExists(manifest_path));
    }

    let yaml = generate_template_yaml(name.unwrap_or("my-deployment"));

    // Validate before writing so a bad name never lands on disk
    Manifest::from_yaml(&yaml)?;
    std::fs::write(&manifest_path, yaml)?;

    Ok(manifest_path)
}

fn generate_template_yaml(name: &str) -> String {
    format!(
        r#"name: {name}
vm:
  cid: vm-1
disk_pool:
  name: default
  disk_size: 1024
  cloud_properties:
    type: ssd
"#
    )
}
