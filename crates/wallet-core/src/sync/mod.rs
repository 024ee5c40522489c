//! Synchronization between the local store and the remote document store
//!
//! The coordinator owns the policy: local writes always land first, remote
//! calls are best-effort, and every remote failure degrades to a pending
//! flag instead of an error.

mod clock;
mod coordinator;

pub use clock::{Clock, SystemClock};
pub use coordinator::{
    SaveOutcome, StatusReport, StorageInfo, SyncCoordinator, BACKGROUND_SYNC_MIN_INTERVAL_MILLIS,
    CACHE_FRESHNESS_MILLIS, LOCAL_QUOTA_BYTES,
};
