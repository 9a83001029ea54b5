// ABOUTME: Deploy command implementation.
// ABOUTME: Wires the local provider into the disk deployer and renders its steps.

use diskdeploy::cloud::{LocalCloud, LocalManagerFactory, LocalVm};
use diskdeploy::config::Manifest;
use diskdeploy::deploy::DiskDeployer;
use diskdeploy::error::Result;
use diskdeploy::output::Output;
use diskdeploy::progress::Stage;
use std::sync::Arc;

/// Deploy the manifest's disk pool to its VM.
pub async fn deploy(manifest: Manifest, mut output: Output) -> Result<()> {
    output.start_timer();
    let output = Arc::new(output);

    output.progress(&format!(
        "Deploying disk pool '{}' ({}) for {} to VM {}",
        manifest.disk_pool.name,
        manifest.disk_pool.size(),
        manifest.name,
        manifest.vm.cid
    ));

    let cloud = LocalCloud::new(&manifest.state_dir);
    let vm = LocalVm::new(manifest.vm.cid.clone(), cloud.clone(), &manifest.name);
    let deployer = DiskDeployer::new(LocalManagerFactory::new(&manifest.name));
    let stage = Stage::new("Deploying disk", output.clone());

    deployer
        .deploy(&manifest.disk_pool, &cloud, &vm, &stage)
        .await?;

    if stage.steps().is_empty() {
        output.progress("  → No persistent disk requested");
    }

    output.success("Deployment complete!");
    Ok(())
}
