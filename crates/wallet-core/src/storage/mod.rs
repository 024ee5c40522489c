//! Local persistence
//!
//! A small key-value store over SQLite holding the item list, cache and
//! sync timestamps, the pending-sync flag, and the user fingerprint.

mod error;
mod kv;

pub use error::{StorageError, StorageResult};
pub use kv::SqliteStore;

/// Well-known store keys. The names match the wire-visible persistence
/// contract and must not change without migrating stored data.
pub mod keys {
    /// The full item list (a single JSON array value)
    pub const ITEMS: &str = "walletCards";
    /// Unix millis when the cached list was last written
    pub const CACHE_TIMESTAMP: &str = "cacheTimestamp";
    /// Unix millis of the last successful remote exchange
    pub const LAST_SYNC_TIME: &str = "lastSyncTime";
    /// Set when local changes have not reached the remote store
    pub const PENDING_SYNC: &str = "pendingSync";
    /// Generated pseudo-anonymous user identifier
    pub const USER_FINGERPRINT: &str = "userFingerprint";
    /// Version marker recorded at the last successful write
    pub const LOCAL_VERSION: &str = "localVersion";
}
