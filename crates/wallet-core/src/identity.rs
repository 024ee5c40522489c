//! User fingerprint
//!
//! A locally generated, persisted pseudo-identifier standing in for real
//! authentication. Generated once on first use and stable across restarts;
//! regenerated only if the stored value is corrupt.

use chrono::Utc;
use uuid::Uuid;

use crate::storage::{keys, SqliteStore, StorageResult};

/// Fallback identifier when the local store cannot be read at all
pub const ANONYMOUS_USER: &str = "anonymous_user";

/// Get the persisted fingerprint, generating and storing one on first run.
pub fn get_or_create(store: &SqliteStore) -> StorageResult<String> {
    if let Some(existing) = store.get::<String>(keys::USER_FINGERPRINT)? {
        if is_valid(&existing) {
            return Ok(existing);
        }
        tracing::warn!("stored fingerprint is corrupt, regenerating");
    }

    let fingerprint = generate();
    store.set(keys::USER_FINGERPRINT, &fingerprint)?;
    tracing::info!(fingerprint = %fingerprint, "generated user fingerprint");
    Ok(fingerprint)
}

/// Generate a fresh fingerprint: creation time plus a random suffix.
fn generate() -> String {
    let suffix: String = Uuid::new_v4().simple().to_string().chars().take(9).collect();
    format!("user_{}_{}", Utc::now().timestamp_millis(), suffix)
}

fn is_valid(fingerprint: &str) -> bool {
    !fingerprint.trim().is_empty()
}
