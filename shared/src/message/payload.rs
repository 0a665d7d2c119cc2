use serde::de::DeserializeOwned;
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::{Map, Value};
use std::fmt;

use crate::models::LineItemStatus;

/// Field carrying the line item status in documents and update descriptions
pub const STATUS_FIELD: &str = "current_status";

// ==================== Operation Type ====================

/// 变更类型 (change-stream `operationType`)
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OperationType {
    Insert,
    Update,
    Replace,
    Delete,
    #[serde(other)]
    Other,
}

impl fmt::Display for OperationType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Insert => write!(f, "insert"),
            Self::Update => write!(f, "update"),
            Self::Replace => write!(f, "replace"),
            Self::Delete => write!(f, "delete"),
            Self::Other => write!(f, "other"),
        }
    }
}

// ==================== Payloads ====================

/// Identifies the changed document
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DocumentKey {
    #[serde(rename = "_id", deserialize_with = "object_id")]
    pub id: String,
}

/// Fields touched by an `update`
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateDescription {
    /// Dotted paths allowed, e.g. `"services.0.price"`
    #[serde(default)]
    pub updated_fields: Map<String, Value>,
    #[serde(default)]
    pub removed_fields: Vec<String>,
}

/// 变更描述载荷 (服务端 -> 客户端)
///
/// Mirrors the server's change stream. `full_document` is present for
/// inserts/replaces and, when the server asks for it, for updates too.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChangeEvent {
    pub operation_type: OperationType,
    #[serde(default)]
    pub document_key: Option<DocumentKey>,
    #[serde(default)]
    pub update_description: Option<UpdateDescription>,
    #[serde(default)]
    pub full_document: Option<Value>,
}

impl ChangeEvent {
    /// Id of the changed document, from `documentKey` or `fullDocument._id`
    pub fn document_id(&self) -> Option<&str> {
        if let Some(key) = &self.document_key {
            return Some(key.id.as_str());
        }
        self.full_document
            .as_ref()
            .and_then(|doc| doc.get("_id"))
            .and_then(object_id_str)
    }

    pub fn updated_fields(&self) -> Option<&Map<String, Value>> {
        self.update_description.as_ref().map(|d| &d.updated_fields)
    }

    /// Status carried by this change, if it touched the status field
    ///
    /// For `update` only `updatedFields` counts; an attached `fullDocument`
    /// holds the current status even when this edit left it alone.
    pub fn updated_status(&self) -> Option<LineItemStatus> {
        let raw = match self.operation_type {
            OperationType::Update => self
                .updated_fields()
                .and_then(|fields| fields.get(STATUS_FIELD)),
            OperationType::Insert | OperationType::Replace => self
                .full_document
                .as_ref()
                .and_then(|doc| doc.get(STATUS_FIELD)),
            OperationType::Delete | OperationType::Other => None,
        };

        raw.and_then(Value::as_str).map(LineItemStatus::from)
    }

    /// Status moved to "Picked Up"
    pub fn is_picked_up(&self) -> bool {
        self.updated_status().is_some_and(|s| s.is_picked_up())
    }

    /// Decode `fullDocument` into a record type
    pub fn full_document_as<T: DeserializeOwned>(&self) -> Option<Result<T, serde_json::Error>> {
        self.full_document.as_ref().map(T::deserialize)
    }
}

// ==================== ObjectId helpers ====================

/// Accept both `"abc"` and extended JSON `{"$oid": "abc"}`
fn object_id<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Value::deserialize(deserializer)?;
    object_id_str(&value)
        .map(str::to_string)
        .ok_or_else(|| serde::de::Error::custom("expected string or {\"$oid\": string}"))
}

fn object_id_str(value: &Value) -> Option<&str> {
    match value {
        Value::String(s) => Some(s.as_str()),
        Value::Object(obj) => obj.get("$oid").and_then(Value::as_str),
        _ => None,
    }
}
