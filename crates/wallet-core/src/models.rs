//! Data models for Wallet
//!
//! Defines the wallet item record plus the id and category conventions
//! shared by the local store and the remote document encoding.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::icon::detect_icon;

/// Category applied when an item has none
pub const DEFAULT_CATEGORY: &str = "general";

/// A single stored name/value record (a link, credential, or note)
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Item {
    /// Unique identifier (generated, unique per device)
    pub id: String,
    /// Display name
    pub name: String,
    /// The stored value (URL, credential, note text)
    pub value: String,
    /// Open-ended grouping label
    pub category: String,
    /// Advisory icon name derived from the value
    pub icon: String,
    /// When this item was created
    pub created_at: DateTime<Utc>,
    /// When this item was last updated
    pub updated_at: DateTime<Utc>,
}

impl Item {
    /// Create a new item with a generated id
    pub fn new(name: impl Into<String>, value: impl Into<String>) -> Self {
        let value = value.into();
        let now = Utc::now();
        Self {
            id: generate_item_id(now.timestamp_millis()),
            name: name.into(),
            icon: detect_icon(&value).to_string(),
            value,
            category: DEFAULT_CATEGORY.to_string(),
            created_at: now,
            updated_at: now,
        }
    }

    /// Create an item with a specific id (for loading from storage)
    pub fn with_id(id: impl Into<String>, name: impl Into<String>, value: impl Into<String>) -> Self {
        let value = value.into();
        let now = Utc::now();
        Self {
            id: id.into(),
            name: name.into(),
            icon: detect_icon(&value).to_string(),
            value,
            category: DEFAULT_CATEGORY.to_string(),
            created_at: now,
            updated_at: now,
        }
    }

    /// Update the display name
    pub fn set_name(&mut self, name: impl Into<String>) {
        self.name = name.into();
        self.updated_at = Utc::now();
    }

    /// Update the stored value; the icon is re-derived from it
    pub fn set_value(&mut self, value: impl Into<String>) {
        self.value = value.into();
        self.icon = detect_icon(&self.value).to_string();
        self.updated_at = Utc::now();
    }

    /// Update the category, normalizing it at the boundary
    pub fn set_category(&mut self, category: impl Into<String>) {
        self.category = normalize_category(&category.into());
        self.updated_at = Utc::now();
    }
}

/// Normalize a free-text category: trimmed, empty falls back to the default.
pub fn normalize_category(category: &str) -> String {
    let trimmed = category.trim();
    if trimmed.is_empty() {
        DEFAULT_CATEGORY.to_string()
    } else {
        trimmed.to_string()
    }
}

/// Generate an item id: base36 creation time plus a random suffix.
///
/// Unique per device, sortable by creation time. Not a global identifier.
pub fn generate_item_id(now_millis: i64) -> String {
    let suffix: String = Uuid::new_v4().simple().to_string().chars().take(9).collect();
    format!("{}{}", encode_base36(now_millis.max(0) as u64), suffix)
}

fn encode_base36(mut n: u64) -> String {
    const DIGITS: &[u8] = b"0123456789abcdefghijklmnopqrstuvwxyz";
    if n == 0 {
        return "0".to_string();
    }
    let mut out = Vec::new();
    while n > 0 {
        out.push(DIGITS[(n % 36) as usize] as char);
        n /= 36;
    }
    out.iter().rev().collect()
}
