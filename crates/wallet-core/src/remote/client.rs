//! REST client for the remote document store
//!
//! One document per user at `{base_url}/wallets/{user_id}`, read with GET
//! and overwritten wholesale with PATCH. Both operations are idempotent at
//! document granularity. There is no retry loop here: a failure surfaces
//! as a typed error and the coordinator decides when to try again.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use reqwest::StatusCode;
use thiserror::Error;
use tracing::debug;

use super::document::{decode_items, document_version, encode_items};
use crate::models::Item;

/// Remote endpoint configuration
#[derive(Debug, Clone)]
pub struct RemoteConfig {
    api_key: String,
    base_url: String,
}

impl RemoteConfig {
    /// Configuration for the hosted document service of the given project.
    pub fn new(project_id: &str, api_key: &str) -> Self {
        Self {
            api_key: api_key.to_string(),
            base_url: format!(
                "https://firestore.googleapis.com/v1/projects/{}/databases/(default)/documents",
                project_id
            ),
        }
    }

    /// Point the client at a different endpoint root.
    pub fn with_base_url(mut self, base_url: &str) -> Self {
        self.base_url = base_url.trim_end_matches('/').to_string();
        self
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn document_url(&self, user_id: &str) -> String {
        format!("{}/wallets/{}", self.base_url, user_id)
    }
}

/// Errors from the remote document store
#[derive(Debug, Error)]
pub enum RemoteError {
    /// Non-success response other than not-found
    #[error("remote store rejected the request: HTTP {status}")]
    Rejected { status: u16, body: String },

    /// Transport-level failure (DNS, connect, TLS, decode)
    #[error("transport error: {0}")]
    Transport(#[from] reqwest::Error),
}

/// A successful read: the decoded item list plus the version marker.
#[derive(Debug, Clone)]
pub struct RemoteSnapshot {
    pub items: Vec<Item>,
    pub version: Option<i64>,
}

/// The seam between the sync coordinator and the wire.
///
/// Production uses [`RestDocumentClient`]; tests inject a fake.
#[async_trait]
pub trait DocumentApi: Send + Sync {
    /// Overwrite the user's document with the given item list.
    ///
    /// Returns the version marker that was written.
    async fn write(
        &self,
        user_id: &str,
        items: &[Item],
        now: DateTime<Utc>,
    ) -> Result<i64, RemoteError>;

    /// Fetch the user's document.
    ///
    /// `None` means no remote data yet (HTTP 404 or a document without an
    /// item list) - an expected state, not an error.
    async fn read(&self, user_id: &str) -> Result<Option<RemoteSnapshot>, RemoteError>;
}

/// HTTP implementation of [`DocumentApi`].
pub struct RestDocumentClient {
    config: RemoteConfig,
    http: reqwest::Client,
}

impl RestDocumentClient {
    pub fn new(config: RemoteConfig) -> Self {
        Self {
            config,
            http: reqwest::Client::new(),
        }
    }
}

#[async_trait]
impl DocumentApi for RestDocumentClient {
    async fn write(
        &self,
        user_id: &str,
        items: &[Item],
        now: DateTime<Utc>,
    ) -> Result<i64, RemoteError> {
        let doc = encode_items(items, now);
        let version = now.timestamp_millis();

        let response = self
            .http
            .patch(self.config.document_url(user_id))
            .query(&[("key", self.config.api_key.as_str())])
            .json(&doc)
            .send()
            .await?;

        let status = response.status();
        if status.is_success() {
            debug!(count = items.len(), version, "wrote wallet document");
            Ok(version)
        } else {
            let body = response.text().await.unwrap_or_default();
            Err(RemoteError::Rejected {
                status: status.as_u16(),
                body,
            })
        }
    }

    async fn read(&self, user_id: &str) -> Result<Option<RemoteSnapshot>, RemoteError> {
        let response = self
            .http
            .get(self.config.document_url(user_id))
            .query(&[("key", self.config.api_key.as_str())])
            .send()
            .await?;

        let status = response.status();
        if status == StatusCode::NOT_FOUND {
            debug!("no wallet document for this user yet");
            return Ok(None);
        }
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(RemoteError::Rejected {
                status: status.as_u16(),
                body,
            });
        }

        let doc = response.json().await?;
        Ok(decode_items(&doc).map(|items| RemoteSnapshot {
            items,
            version: document_version(&doc),
        }))
    }
}
