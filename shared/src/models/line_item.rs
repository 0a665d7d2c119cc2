//! Line Item Model
//!
//! One pair of shoes within a transaction, tracked through the fixed
//! operational sequence in [`LineItemStatus`].

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Operational state of a line item
///
/// Serialized as the display string the server stores ("Ready for Pickup",
/// ...). Strings outside the known sequence are kept verbatim in `Other`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum LineItemStatus {
    Queued,
    ReadyForDelivery,
    IncomingWarehouse,
    InProcess,
    ReturningToBranch,
    ToPack,
    ReadyForPickup,
    PickedUp,
    Other(String),
}

impl LineItemStatus {
    /// Known states in operational order
    pub const SEQUENCE: [LineItemStatus; 8] = [
        Self::Queued,
        Self::ReadyForDelivery,
        Self::IncomingWarehouse,
        Self::InProcess,
        Self::ReturningToBranch,
        Self::ToPack,
        Self::ReadyForPickup,
        Self::PickedUp,
    ];

    pub fn as_str(&self) -> &str {
        match self {
            Self::Queued => "Queued",
            Self::ReadyForDelivery => "Ready for Delivery",
            Self::IncomingWarehouse => "Incoming Warehouse",
            Self::InProcess => "In Process",
            Self::ReturningToBranch => "Returning to Branch",
            Self::ToPack => "To Pack",
            Self::ReadyForPickup => "Ready for Pickup",
            Self::PickedUp => "Picked Up",
            Self::Other(s) => s,
        }
    }

    /// The state that follows this one, `None` for `PickedUp` and unknown states
    pub fn next(&self) -> Option<LineItemStatus> {
        let pos = Self::SEQUENCE.iter().position(|s| s == self)?;
        Self::SEQUENCE.get(pos + 1).cloned()
    }

    pub fn is_picked_up(&self) -> bool {
        matches!(self, Self::PickedUp)
    }

    /// Sitting at the branch, storage allowance is running
    pub fn awaits_pickup(&self) -> bool {
        matches!(self, Self::ReadyForPickup)
    }
}

impl From<String> for LineItemStatus {
    fn from(value: String) -> Self {
        match value.as_str() {
            "Queued" => Self::Queued,
            "Ready for Delivery" => Self::ReadyForDelivery,
            "Incoming Warehouse" => Self::IncomingWarehouse,
            "In Process" => Self::InProcess,
            "Returning to Branch" => Self::ReturningToBranch,
            "To Pack" => Self::ToPack,
            "Ready for Pickup" => Self::ReadyForPickup,
            "Picked Up" => Self::PickedUp,
            _ => Self::Other(value),
        }
    }
}

impl From<&str> for LineItemStatus {
    fn from(value: &str) -> Self {
        Self::from(value.to_string())
    }
}

impl From<LineItemStatus> for String {
    fn from(value: LineItemStatus) -> Self {
        match value {
            LineItemStatus::Other(s) => s,
            known => known.as_str().to_string(),
        }
    }
}

impl Default for LineItemStatus {
    fn default() -> Self {
        Self::Queued
    }
}

impl fmt::Display for LineItemStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Where the pair physically is
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ItemLocation {
    #[default]
    Branch,
    Hub,
}

/// Service priority
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Priority {
    #[default]
    Normal,
    Rush,
}

/// A service applied to a pair (cleaning, reglue, ...)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ServiceEntry {
    pub service_id: String,
    #[serde(default)]
    pub name: String,
    pub price: f64,
    #[serde(default = "default_quantity")]
    pub quantity: i64,
}

fn default_quantity() -> i64 {
    1
}

/// Line item record
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LineItem {
    #[serde(rename = "_id")]
    pub id: String,
    pub line_item_id: String,
    pub transaction_id: String,
    pub branch_id: String,
    /// Shoe description as written on the intake form
    #[serde(default)]
    pub shoes: String,
    #[serde(default)]
    pub services: Vec<ServiceEntry>,
    /// Storage fee already charged for this pair
    #[serde(default)]
    pub storage_fee: f64,
    /// When the customer was told the pair is ready
    #[serde(default)]
    pub pickup_notice: Option<DateTime<Utc>>,
    #[serde(default)]
    pub current_status: LineItemStatus,
    #[serde(default)]
    pub due_date: Option<DateTime<Utc>>,
    #[serde(default)]
    pub latest_update: Option<DateTime<Utc>>,
    #[serde(default)]
    pub location: ItemLocation,
    #[serde(default)]
    pub priority: Priority,
    #[serde(default)]
    pub before_img: Option<String>,
    #[serde(default)]
    pub after_img: Option<String>,
}

/// Bulk status change payload
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LineItemStatusUpdate {
    pub line_item_ids: Vec<String>,
    pub new_status: LineItemStatus,
}

/// Update line item payload
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct LineItemUpdate {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub storage_fee: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub pickup_notice: Option<DateTime<Utc>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub location: Option<ItemLocation>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub due_date: Option<DateTime<Utc>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub before_img: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub after_img: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_roundtrip_strings() {
        let s: LineItemStatus = serde_json::from_str("\"Ready for Pickup\"").unwrap();
        assert_eq!(s, LineItemStatus::ReadyForPickup);
        assert_eq!(serde_json::to_string(&s).unwrap(), "\"Ready for Pickup\"");

        let unknown: LineItemStatus = serde_json::from_str("\"Lost\"").unwrap();
        assert_eq!(unknown, LineItemStatus::Other("Lost".to_string()));
        assert_eq!(serde_json::to_string(&unknown).unwrap(), "\"Lost\"");
    }

    #[test]
    fn test_status_next() {
        assert_eq!(
            LineItemStatus::Queued.next(),
            Some(LineItemStatus::ReadyForDelivery)
        );
        assert_eq!(
            LineItemStatus::ReadyForPickup.next(),
            Some(LineItemStatus::PickedUp)
        );
        assert_eq!(LineItemStatus::PickedUp.next(), None);
        assert_eq!(LineItemStatus::Other("x".into()).next(), None);
    }

    #[test]
    fn test_line_item_defaults() {
        let json = serde_json::json!({
            "_id": "665f",
            "line_item_id": "LI-001",
            "transaction_id": "TX-001",
            "branch_id": "SMVAL-B-NCR"
        });
        let item: LineItem = serde_json::from_value(json).unwrap();
        assert_eq!(item.current_status, LineItemStatus::Queued);
        assert_eq!(item.storage_fee, 0.0);
        assert!(item.pickup_notice.is_none());
        assert!(item.services.is_empty());
    }
}
