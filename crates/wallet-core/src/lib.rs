//! Wallet Core Library
//!
//! Core functionality for Wallet, a personal store of short name/value
//! records (links, credentials, notes) kept durable on the local device
//! and synchronized best-effort with a remote document store.
//!
//! # Architecture
//!
//! - **Local store**: SQLite key-value persistence; every operation lands
//!   here first and this copy is authoritative on the device.
//! - **Remote document client**: reads and wholesale-overwrites one JSON
//!   document per user over REST. No merging, no compare-and-swap.
//! - **Sync coordinator**: cache-first reads with a freshness window,
//!   best-effort pushes, and a pending flag replayed on reconnect.
//!
//! # Quick Start
//!
//! ```text
//! let config = Config::load()?;
//! let coordinator = SyncCoordinator::from_config(&config)?;
//!
//! let mut items = coordinator.load_items().await;
//! items.push(Item::new("Example", "https://example.com"));
//! let outcome = coordinator.save_items(&items).await;
//! ```
//!
//! # Modules
//!
//! - `sync`: load/save policy and the coordinator (main entry point)
//! - `models`: the wallet item record
//! - `storage`: local key-value store
//! - `remote`: wire codec and REST client
//! - `identity`: persisted pseudo-anonymous fingerprint
//! - `config`: application configuration

pub mod config;
pub mod icon;
pub mod identity;
pub mod models;
pub mod remote;
pub mod storage;
pub mod sync;

pub use config::Config;
pub use models::Item;
pub use remote::{DocumentApi, RemoteConfig, RemoteError, RemoteSnapshot, RestDocumentClient};
pub use storage::{SqliteStore, StorageError, StorageResult};
pub use sync::{
    Clock, SaveOutcome, StatusReport, StorageInfo, SyncCoordinator, SystemClock,
};
