//! 推送事件类型定义
//!
//! Named events pushed by the server over the real-time channel. Every event
//! carries a MongoDB change-stream style payload ([`ChangeEvent`]); clients
//! treat each one as "patch or re-fetch what changed".

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use std::fmt;

pub mod payload;
pub use payload::*;

/// Known push event names
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum EventName {
    /// A line item document changed (status, fee, location...)
    #[serde(rename = "lineItemUpdated")]
    LineItemUpdated,
    /// Lightweight line item change, same payload shape
    #[serde(rename = "lineItemDelta")]
    LineItemDelta,
    /// An appointment document changed
    #[serde(rename = "appointmentUpdated")]
    AppointmentUpdated,
}

impl EventName {
    pub const ALL: [EventName; 3] = [
        EventName::LineItemUpdated,
        EventName::LineItemDelta,
        EventName::AppointmentUpdated,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            EventName::LineItemUpdated => "lineItemUpdated",
            EventName::LineItemDelta => "lineItemDelta",
            EventName::AppointmentUpdated => "appointmentUpdated",
        }
    }

    /// Line item events (both full and delta)
    pub fn is_line_item(&self) -> bool {
        matches!(self, EventName::LineItemUpdated | EventName::LineItemDelta)
    }
}

impl TryFrom<&str> for EventName {
    type Error = ();

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        match value {
            "lineItemUpdated" => Ok(EventName::LineItemUpdated),
            "lineItemDelta" => Ok(EventName::LineItemDelta),
            "appointmentUpdated" => Ok(EventName::AppointmentUpdated),
            _ => Err(()),
        }
    }
}

impl fmt::Display for EventName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// 通道事件 - 一条已解帧的推送消息
///
/// `name` is kept as a string so events the client does not know about can
/// still be observed (diagnostics); use [`ChannelEvent::known_name`] to match.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChannelEvent {
    pub name: String,
    pub payload: serde_json::Value,
}

impl ChannelEvent {
    pub fn new(name: impl Into<String>, payload: serde_json::Value) -> Self {
        Self {
            name: name.into(),
            payload,
        }
    }

    pub fn known_name(&self) -> Option<EventName> {
        EventName::try_from(self.name.as_str()).ok()
    }

    /// 解析载荷为指定类型
    pub fn parse_payload<T: DeserializeOwned>(&self) -> Result<T, serde_json::Error> {
        T::deserialize(&self.payload)
    }

    /// Parse the payload as a change description
    pub fn change(&self) -> Result<ChangeEvent, serde_json::Error> {
        self.parse_payload()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_event_name_strings() {
        for name in EventName::ALL {
            assert_eq!(EventName::try_from(name.as_str()), Ok(name));
        }
        assert!(EventName::try_from("somethingElse").is_err());
        assert!(EventName::LineItemDelta.is_line_item());
        assert!(!EventName::AppointmentUpdated.is_line_item());
    }

    #[test]
    fn test_channel_event_change() {
        let event = ChannelEvent::new(
            "lineItemUpdated",
            json!({
                "operationType": "update",
                "documentKey": { "_id": "abc" },
                "updateDescription": { "updatedFields": { "current_status": "Picked Up" } }
            }),
        );

        assert_eq!(event.known_name(), Some(EventName::LineItemUpdated));
        let change = event.change().unwrap();
        assert_eq!(change.operation_type, OperationType::Update);
        assert_eq!(change.document_id(), Some("abc"));
    }

    #[test]
    fn test_unknown_event_kept() {
        let event = ChannelEvent::new("branchRenamed", json!({}));
        assert_eq!(event.known_name(), None);
    }
}
