//! Sync command handler

use anyhow::{bail, Result};

use wallet_core::SyncCoordinator;

use crate::output::Output;

/// Push pending changes and run a background check against the remote store
pub async fn run(coordinator: &SyncCoordinator, output: &Output) -> Result<()> {
    if !coordinator.sync_enabled() {
        bail!(
            "Sync is not configured. Set remote credentials with:\n  \
             wallet config set project_id <project>\n  \
             wallet config set api_key <key>"
        );
    }

    output.message("Syncing...");

    coordinator.sync_pending_changes().await;
    coordinator.background_sync().await;

    if coordinator.pending_sync() {
        output.message("Sync incomplete - changes still pending upload");
    } else {
        output.success("Sync complete");
    }

    Ok(())
}
