//! Remote document store access
//!
//! The wire codec for the typed-field document format and the REST client
//! that reads and overwrites one document per user.

mod client;
mod document;

pub use client::{DocumentApi, RemoteConfig, RemoteError, RemoteSnapshot, RestDocumentClient};
pub use document::{decode_items, document_version, encode_items, WalletDocument};
