//! Typed-field document encoding
//!
//! The remote store keeps one JSON document per user, with every field
//! wrapped in a single-key object naming its type (`stringValue`,
//! `integerValue`, `timestampValue`, `arrayValue`, `mapValue`). The
//! document carries the full item list plus a `lastUpdated` timestamp and
//! a `version` ordering hint; there is no server-side compare-and-swap.
//!
//! Encoding is deterministic and order-preserving: items serialize in list
//! order and decode back in the same order. Only `id/name/value/category`
//! cross the wire; timestamps are back-filled from `lastUpdated` and the
//! icon is re-derived locally on decode.

use std::collections::BTreeMap;

use chrono::{DateTime, SecondsFormat, Utc};
use serde::{Deserialize, Serialize};

use crate::icon::detect_icon;
use crate::models::{normalize_category, Item};

/// A single typed wire value.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub enum WireValue {
    #[serde(rename = "stringValue")]
    String(String),
    /// Integers travel as strings on the wire
    #[serde(rename = "integerValue")]
    Integer(String),
    /// RFC 3339 timestamp
    #[serde(rename = "timestampValue")]
    Timestamp(String),
    #[serde(rename = "arrayValue")]
    Array(ArrayValue),
    #[serde(rename = "mapValue")]
    Map(MapValue),
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
pub struct ArrayValue {
    /// The server omits `values` for an empty array
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub values: Vec<WireValue>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
pub struct MapValue {
    #[serde(default)]
    pub fields: BTreeMap<String, WireValue>,
}

/// The wallet document as stored remotely.
///
/// Responses carry extra resource metadata (`name`, `createTime`, ...)
/// which is ignored on deserialization.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct WalletDocument {
    #[serde(default)]
    pub fields: BTreeMap<String, WireValue>,
}

/// Encode an item list into a wallet document.
pub fn encode_items(items: &[Item], now: DateTime<Utc>) -> WalletDocument {
    let values = items
        .iter()
        .map(|item| {
            let mut fields = BTreeMap::new();
            fields.insert("id".to_string(), WireValue::String(item.id.clone()));
            fields.insert("name".to_string(), WireValue::String(item.name.clone()));
            fields.insert("value".to_string(), WireValue::String(item.value.clone()));
            fields.insert(
                "category".to_string(),
                WireValue::String(item.category.clone()),
            );
            WireValue::Map(MapValue { fields })
        })
        .collect();

    let mut fields = BTreeMap::new();
    fields.insert(
        "items".to_string(),
        WireValue::Array(ArrayValue { values }),
    );
    fields.insert(
        "lastUpdated".to_string(),
        WireValue::Timestamp(now.to_rfc3339_opts(SecondsFormat::Millis, true)),
    );
    fields.insert(
        "version".to_string(),
        WireValue::Integer(now.timestamp_millis().to_string()),
    );

    WalletDocument { fields }
}

/// Decode the item list from a wallet document.
///
/// `None` means the document carries no usable item list, which callers
/// treat the same as an absent document. Entries without an id are skipped.
pub fn decode_items(doc: &WalletDocument) -> Option<Vec<Item>> {
    let Some(WireValue::Array(array)) = doc.fields.get("items") else {
        return None;
    };

    let stamp = last_updated(doc).unwrap_or_else(Utc::now);

    let mut items = Vec::with_capacity(array.values.len());
    for value in &array.values {
        let WireValue::Map(map) = value else {
            continue;
        };
        let Some(id) = get_string(&map.fields, "id") else {
            tracing::debug!("skipping wire item without an id");
            continue;
        };

        let item_value = get_string(&map.fields, "value").unwrap_or_default();
        items.push(Item {
            id: id.to_string(),
            name: get_string(&map.fields, "name").unwrap_or_default().to_string(),
            icon: detect_icon(item_value).to_string(),
            value: item_value.to_string(),
            category: normalize_category(get_string(&map.fields, "category").unwrap_or_default()),
            created_at: stamp,
            updated_at: stamp,
        });
    }

    Some(items)
}

/// The document's version marker, when present and parseable.
pub fn document_version(doc: &WalletDocument) -> Option<i64> {
    match doc.fields.get("version") {
        Some(WireValue::Integer(raw)) => raw.parse().ok(),
        _ => None,
    }
}

fn last_updated(doc: &WalletDocument) -> Option<DateTime<Utc>> {
    match doc.fields.get("lastUpdated") {
        Some(WireValue::Timestamp(raw)) => DateTime::parse_from_rfc3339(raw)
            .ok()
            .map(|dt| dt.with_timezone(&Utc)),
        _ => None,
    }
}

fn get_string<'a>(fields: &'a BTreeMap<String, WireValue>, key: &str) -> Option<&'a str> {
    match fields.get(key) {
        Some(WireValue::String(s)) => Some(s),
        _ => None,
    }
}
