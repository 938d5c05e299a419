//! Sync command implementation.

use std::path::Path;
use std::sync::Arc;
use ticksync_engine::{error_chain, FileRemote, SyncConfig, SyncOrchestrator};
use tracing::info;

/// Runs one sync cycle against a file remote.
pub fn run(path: &Path, remote_path: &Path) -> Result<(), Box<dyn std::error::Error>> {
    let config = SyncConfig::new(path);
    let remote = Arc::new(FileRemote::new(remote_path));
    let orchestrator = SyncOrchestrator::new(config, remote);

    let report = orchestrator
        .sync_once()
        .map_err(|err| error_chain(&err))?;
    info!(?report, "sync cycle finished");

    println!(
        "synced: revision {}, {} task(s), {} tag(s){}{}",
        report.revision,
        report.tasks,
        report.tags,
        if report.pushed { ", pushed" } else { "" },
        if report.saved { ", saved" } else { "" },
    );
    Ok(())
}
