//! Engine.IO v4 / Socket.IO v5 text framing
//!
//! Only the default namespace and text frames are handled:
//!
//! | Frame | Meaning |
//! |---|---|
//! | `0{"sid":..,"pingInterval":..}` | Engine.IO open |
//! | `1` | Engine.IO close |
//! | `2` / `3` | ping / pong (server pings, client answers) |
//! | `40` / `40{"sid":..}` | Socket.IO connect (request / ack) |
//! | `41` | Socket.IO disconnect |
//! | `42["name",payload]` | event |
//! | `44{"message":..}` | connect error |

use super::ChannelError;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::time::Duration;

/// Engine.IO open payload
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OpenInfo {
    pub sid: String,
    #[serde(default)]
    pub upgrades: Vec<String>,
    /// milliseconds
    #[serde(default = "default_ping_interval")]
    pub ping_interval: u64,
    /// milliseconds
    #[serde(default = "default_ping_timeout")]
    pub ping_timeout: u64,
    #[serde(default)]
    pub max_payload: u64,
}

fn default_ping_interval() -> u64 {
    25_000
}

fn default_ping_timeout() -> u64 {
    20_000
}

impl OpenInfo {
    /// Silence after which the server is presumed gone
    pub fn liveness_window(&self) -> Duration {
        Duration::from_millis(self.ping_interval.saturating_add(self.ping_timeout))
    }
}

/// A decoded text frame
#[derive(Debug, Clone, PartialEq)]
pub enum Packet {
    Open(OpenInfo),
    Close,
    Ping(String),
    Pong(String),
    Noop,
    Connect(Option<Value>),
    Disconnect,
    Event { name: String, payload: Value },
    ConnectError(Value),
}

impl Packet {
    pub fn event(name: impl Into<String>, payload: Value) -> Self {
        Self::Event {
            name: name.into(),
            payload,
        }
    }

    /// Encode into the wire text
    pub fn encode(&self) -> String {
        match self {
            Self::Open(info) => format!("0{}", json_text(info)),
            Self::Close => "1".to_string(),
            Self::Ping(data) => format!("2{}", data),
            Self::Pong(data) => format!("3{}", data),
            Self::Noop => "6".to_string(),
            Self::Connect(None) => "40".to_string(),
            Self::Connect(Some(auth)) => format!("40{}", auth),
            Self::Disconnect => "41".to_string(),
            Self::Event { name, payload } => {
                format!("42{}", Value::Array(vec![Value::String(name.clone()), payload.clone()]))
            }
            Self::ConnectError(data) => format!("44{}", data),
        }
    }

    /// Decode one text frame
    pub fn decode(text: &str) -> Result<Self, ChannelError> {
        let mut chars = text.chars();
        let kind = chars
            .next()
            .ok_or_else(|| ChannelError::Frame("empty frame".into()))?;
        let rest = chars.as_str();

        match kind {
            '0' => serde_json::from_str(rest)
                .map(Self::Open)
                .map_err(|e| ChannelError::Frame(format!("bad open payload: {}", e))),
            '1' => Ok(Self::Close),
            '2' => Ok(Self::Ping(rest.to_string())),
            '3' => Ok(Self::Pong(rest.to_string())),
            '4' => decode_socket(rest),
            '6' => Ok(Self::Noop),
            other => Err(ChannelError::Frame(format!("unknown packet type {:?}", other))),
        }
    }
}

fn decode_socket(text: &str) -> Result<Packet, ChannelError> {
    let mut chars = text.chars();
    let kind = chars
        .next()
        .ok_or_else(|| ChannelError::Frame("empty socket packet".into()))?;
    let rest = skip_namespace(chars.as_str());

    match kind {
        '0' => {
            if rest.is_empty() {
                Ok(Packet::Connect(None))
            } else {
                parse_json(rest).map(|v| Packet::Connect(Some(v)))
            }
        }
        '1' => Ok(Packet::Disconnect),
        '2' => {
            // optional ack id before the argument array
            let args = rest.trim_start_matches(|c: char| c.is_ascii_digit());
            let Value::Array(mut items) = parse_json(args)? else {
                return Err(ChannelError::Frame("event is not an array".into()));
            };
            if items.is_empty() {
                return Err(ChannelError::Frame("event without a name".into()));
            }
            let Value::String(name) = items.remove(0) else {
                return Err(ChannelError::Frame("event name is not a string".into()));
            };
            let payload = if items.is_empty() {
                Value::Null
            } else {
                items.swap_remove(0)
            };
            Ok(Packet::Event { name, payload })
        }
        '4' => {
            if rest.is_empty() {
                Ok(Packet::ConnectError(Value::Null))
            } else {
                parse_json(rest).map(Packet::ConnectError)
            }
        }
        other => Err(ChannelError::Frame(format!("unsupported socket packet {:?}", other))),
    }
}

/// Drop a `/namespace,` prefix
fn skip_namespace(text: &str) -> &str {
    if text.starts_with('/') {
        match text.find(',') {
            Some(idx) => &text[idx + 1..],
            None => "",
        }
    } else {
        text
    }
}

fn parse_json(text: &str) -> Result<Value, ChannelError> {
    serde_json::from_str(text).map_err(|e| ChannelError::Frame(e.to_string()))
}

fn json_text<T: Serialize>(value: &T) -> String {
    serde_json::to_string(value).unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_decode_open() {
        let packet = Packet::decode(
            r#"0{"sid":"abc","upgrades":[],"pingInterval":25000,"pingTimeout":20000,"maxPayload":1000000}"#,
        )
        .unwrap();
        let Packet::Open(info) = packet else {
            panic!("expected open packet");
        };
        assert_eq!(info.sid, "abc");
        assert_eq!(info.liveness_window(), Duration::from_secs(45));
    }

    #[test]
    fn test_liveness_window_saturates() {
        let packet = Packet::decode(&format!(
            r#"0{{"sid":"abc","upgrades":[],"pingInterval":{},"pingTimeout":{},"maxPayload":1}}"#,
            u64::MAX,
            u64::MAX
        ))
        .unwrap();
        let Packet::Open(info) = packet else {
            panic!("expected open packet");
        };
        assert_eq!(info.liveness_window(), Duration::from_millis(u64::MAX));
    }

    #[test]
    fn test_control_frames() {
        assert_eq!(Packet::decode("2").unwrap(), Packet::Ping(String::new()));
        assert_eq!(Packet::decode("3probe").unwrap(), Packet::Pong("probe".into()));
        assert_eq!(Packet::decode("1").unwrap(), Packet::Close);
        assert_eq!(Packet::decode("40").unwrap(), Packet::Connect(None));
        assert_eq!(
            Packet::decode(r#"40{"sid":"xyz"}"#).unwrap(),
            Packet::Connect(Some(json!({"sid": "xyz"})))
        );
        assert_eq!(Packet::decode("41").unwrap(), Packet::Disconnect);
        assert_eq!(Packet::Pong(String::new()).encode(), "3");
        assert_eq!(Packet::Connect(None).encode(), "40");
    }

    #[test]
    fn test_decode_event() {
        let packet = Packet::decode(
            r#"42["lineItemUpdated",{"operationType":"update","documentKey":{"_id":"li1"}}]"#,
        )
        .unwrap();
        assert_eq!(
            packet,
            Packet::event(
                "lineItemUpdated",
                json!({"operationType": "update", "documentKey": {"_id": "li1"}})
            )
        );
    }

    #[test]
    fn test_decode_event_with_namespace_and_ack() {
        let packet = Packet::decode(r#"42/admin,7["appointmentUpdated",{"x":1}]"#).unwrap();
        assert_eq!(packet, Packet::event("appointmentUpdated", json!({"x": 1})));

        let bare = Packet::decode(r#"42["ping"]"#).unwrap();
        assert_eq!(bare, Packet::event("ping", Value::Null));
    }

    #[test]
    fn test_event_encode_matches_decode() {
        let packet = Packet::event("lineItemDelta", json!({"operationType": "delete"}));
        let text = packet.encode();
        assert!(text.starts_with("42[\"lineItemDelta\""));
        assert_eq!(Packet::decode(&text).unwrap(), packet);
    }

    #[test]
    fn test_connect_error() {
        let packet = Packet::decode(r#"44{"message":"Not authorized"}"#).unwrap();
        assert_eq!(packet, Packet::ConnectError(json!({"message": "Not authorized"})));
    }

    #[test]
    fn test_malformed() {
        assert!(Packet::decode("").is_err());
        assert!(Packet::decode("9").is_err());
        assert!(Packet::decode("0not-json").is_err());
        assert!(Packet::decode("42{}").is_err());
        assert!(Packet::decode("42[]").is_err());
        assert!(Packet::decode("42[1,2]").is_err());
    }
}
