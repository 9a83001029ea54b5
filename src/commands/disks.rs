// ABOUTME: Disks command implementation.
// ABOUTME: Lists the disks the local provider recorded for a deployment.

use diskdeploy::cloud::LocalCloud;
use diskdeploy::config::Manifest;
use diskdeploy::disk::DiskError;
use diskdeploy::error::Result;
use diskdeploy::output::{Output, OutputMode};

pub async fn disks(manifest: Manifest, output: Output) -> Result<()> {
    let cloud = LocalCloud::new(&manifest.state_dir);
    let state = cloud
        .load(&manifest.name)
        .await
        .map_err(DiskError::from)?;

    match output.mode() {
        OutputMode::Json => {
            let json = serde_json::to_string(&state).map_err(std::io::Error::other)?;
            println!("{json}");
        }
        OutputMode::Quiet => {
            for disk in &state.disks {
                println!("{}", disk.cid);
            }
        }
        OutputMode::Normal => {
            if state.disks.is_empty() {
                println!("No disks for {}", manifest.name);
                return Ok(());
            }

            println!(
                "{:<12} {:>8} {:<12} {:<9} CREATED",
                "CID", "SIZE", "VM", "ATTACHED"
            );
            for disk in &state.disks {
                let current = state.current_disk.as_ref() == Some(&disk.cid);
                println!(
                    "{:<12} {:>8} {:<12} {:<9} {}{}",
                    disk.cid.as_str(),
                    disk.size,
                    disk.vm.as_ref().map(|v| v.as_str()).unwrap_or("-"),
                    if disk.attached { "yes" } else { "no" },
                    disk.created_at.format("%Y-%m-%d %H:%M:%S"),
                    if current { "  (current)" } else { "" }
                );
            }
        }
    }

    Ok(())
}
