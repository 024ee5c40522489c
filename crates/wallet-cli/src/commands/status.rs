//! Status command handlers

use anyhow::Result;

use wallet_core::SyncCoordinator;

use crate::output::{Output, OutputFormat};

/// Show status information
pub fn show(coordinator: &SyncCoordinator, output: &Output) -> Result<()> {
    let report = coordinator.status();
    let info = coordinator.storage_info();

    match output.format {
        OutputFormat::Json => {
            println!(
                "{}",
                serde_json::json!({
                    "storage_type": report.storage_type,
                    "description": report.description,
                    "sync_enabled": report.sync_enabled,
                    "user_id": report.user_id,
                    "pending_sync": coordinator.pending_sync(),
                    "storage": {
                        "used": info.used,
                        "quota": info.quota,
                        "remaining": info.remaining,
                        "used_percent": info.used_percent
                    }
                })
            );
        }
        OutputFormat::Quiet => {
            println!("{}", if report.sync_enabled { "enabled" } else { "disabled" });
        }
        OutputFormat::Human => {
            println!("Wallet Status");
            println!("=============");
            println!();
            println!("Storage: {}", report.storage_type);
            println!("  {}", report.description);
            println!();
            println!("Sync:");
            println!(
                "  Status: {}",
                if report.sync_enabled {
                    "enabled"
                } else {
                    "disabled"
                }
            );
            if let Some(ref user_id) = report.user_id {
                println!("  User:   {}", user_id);
            }
            if coordinator.pending_sync() {
                println!("  Note:   local changes pending upload");
            }
            println!();
            println!("Local store:");
            println!(
                "  Used: {} of {} bytes ({}%)",
                info.used, info.quota, info.used_percent
            );
        }
    }

    Ok(())
}

/// Show the full user fingerprint
pub fn fingerprint(coordinator: &SyncCoordinator, output: &Output) -> Result<()> {
    match coordinator.user_id() {
        Some(user_id) => {
            if output.is_json() {
                println!("{}", serde_json::json!({ "user_id": user_id }));
            } else {
                println!("{}", user_id);
            }
        }
        None => {
            output.message("Sync is disabled; no fingerprint has been generated.");
        }
    }

    Ok(())
}
