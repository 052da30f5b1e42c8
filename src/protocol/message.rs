//! Bridge message schema.
//!
//! Every message is a flat JSON object carrying a version tag `v` and a type
//! discriminator `t`:
//!
//! ```json
//! { "v": 1, "t": "HELLO", "caps": ["history", "logs"], "title": "Docs" }
//! { "v": 1, "t": "READY" }
//! { "v": 1, "t": "LOCATION", "href": "/pricing", "canGoBack": true, "canGoFwd": false }
//! { "v": 1, "t": "NAV", "cmd": "BACK" }
//! { "v": 1, "t": "PING", "ts": 1700000000000 }
//! ```
//!
//! Decoding never fails loudly. Anything that is not an object, lacks `v`
//! or `t`, carries another version, or does not match a known shape decodes
//! to `None` and is ignored by both sides.

// ============================================================================
// Imports
// ============================================================================

use std::fmt;

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::Result;

use super::capability::Capability;

// ============================================================================
// Constants
// ============================================================================

/// The only protocol version this crate speaks.
pub const PROTOCOL_VERSION: u64 = 1;

// ============================================================================
// NavCommand
// ============================================================================

/// Navigation command carried by `NAV`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum NavCommand {
    /// Go back one history entry.
    #[serde(rename = "BACK")]
    Back,
    /// Go forward one history entry.
    #[serde(rename = "FWD")]
    Forward,
    /// Go to the location given in `to`.
    #[serde(rename = "GO")]
    Go,
}

impl fmt::Display for NavCommand {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Self::Back => "BACK",
            Self::Forward => "FWD",
            Self::Go => "GO",
        };
        f.write_str(s)
    }
}

// ============================================================================
// BridgeMessage
// ============================================================================

/// A message exchanged between host and embedded document.
///
/// The version tag is not part of the enum; [`encode`] adds it and
/// [`decode`] checks it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "t")]
pub enum BridgeMessage {
    /// Embedded side announces itself and its capabilities.
    #[serde(rename = "HELLO")]
    Hello {
        /// Declared capabilities, unknown strings included.
        #[serde(default)]
        caps: Vec<Capability>,
        /// Document title at announcement time.
        #[serde(default, skip_serializing_if = "Option::is_none")]
        title: Option<String>,
    },

    /// Embedded side finished initializing and accepts commands.
    #[serde(rename = "READY")]
    Ready {},

    /// Embedded side's navigable location changed.
    #[serde(rename = "LOCATION")]
    Location {
        /// Current in-app location.
        href: String,
        /// Current document title.
        #[serde(default, skip_serializing_if = "Option::is_none")]
        title: Option<String>,
        /// Whether back navigation is possible.
        #[serde(rename = "canGoBack", default)]
        can_go_back: bool,
        /// Whether forward navigation is possible.
        #[serde(rename = "canGoFwd", default)]
        can_go_forward: bool,
    },

    /// Host asks the embedded side to navigate.
    #[serde(rename = "NAV")]
    Nav {
        /// Which navigation to perform.
        cmd: NavCommand,
        /// Destination for [`NavCommand::Go`].
        #[serde(default, skip_serializing_if = "Option::is_none")]
        to: Option<String>,
    },

    /// Liveness probe.
    #[serde(rename = "PING")]
    Ping {
        /// Sender timestamp in milliseconds since the epoch.
        ts: f64,
    },
}

impl BridgeMessage {
    /// Creates a `READY` message.
    #[inline]
    #[must_use]
    pub fn ready() -> Self {
        Self::Ready {}
    }

    /// Creates a `NAV` message.
    #[inline]
    #[must_use]
    pub fn nav(cmd: NavCommand, to: Option<String>) -> Self {
        Self::Nav { cmd, to }
    }

    /// Returns the wire discriminator of this message.
    #[must_use]
    pub fn kind(&self) -> &'static str {
        match self {
            Self::Hello { .. } => "HELLO",
            Self::Ready {} => "READY",
            Self::Location { .. } => "LOCATION",
            Self::Nav { .. } => "NAV",
            Self::Ping { .. } => "PING",
        }
    }
}

// ============================================================================
// Encoding
// ============================================================================

/// Serializes a message into its versioned wire envelope.
///
/// # Errors
///
/// Returns [`crate::Error::Json`] if serialization fails.
pub fn encode(message: &BridgeMessage) -> Result<Value> {
    let mut value = serde_json::to_value(message)?;
    if let Value::Object(map) = &mut value {
        map.insert("v".to_string(), Value::from(PROTOCOL_VERSION));
    }
    Ok(value)
}

/// Decodes a wire value, returning `None` for anything unrecognized.
#[must_use]
pub fn decode(value: &Value) -> Option<BridgeMessage> {
    let object = value.as_object()?;

    if object.get("v").and_then(Value::as_u64) != Some(PROTOCOL_VERSION) {
        return None;
    }
    object.get("t").and_then(Value::as_str)?;

    BridgeMessage::deserialize(value).ok()
}

/// Decodes a message delivered as a JSON string.
#[must_use]
pub fn decode_str(raw: &str) -> Option<BridgeMessage> {
    let value: Value = serde_json::from_str(raw).ok()?;
    decode(&value)
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_decode_hello() {
        let value = json!({ "v": 1, "t": "HELLO", "caps": ["history", "logs"], "title": "Docs" });
        let message = decode(&value).expect("valid hello");

        assert_eq!(
            message,
            BridgeMessage::Hello {
                caps: vec![Capability::History, Capability::Logs],
                title: Some("Docs".into()),
            }
        );
    }

    #[test]
    fn test_decode_location_wire_names() {
        let value = json!({
            "v": 1, "t": "LOCATION", "href": "/pricing", "canGoBack": true, "canGoFwd": false
        });

        match decode(&value) {
            Some(BridgeMessage::Location {
                href,
                title,
                can_go_back,
                can_go_forward,
            }) => {
                assert_eq!(href, "/pricing");
                assert_eq!(title, None);
                assert!(can_go_back);
                assert!(!can_go_forward);
            }
            other => panic!("unexpected decode result: {other:?}"),
        }
    }

    #[test]
    fn test_decode_ready_ignores_extra_fields() {
        let value = json!({ "v": 1, "t": "READY", "extra": { "added": "later" } });
        assert_eq!(decode(&value), Some(BridgeMessage::ready()));
    }

    #[test]
    fn test_decode_rejects_missing_or_wrong_version() {
        assert_eq!(decode(&json!({ "t": "READY" })), None);
        assert_eq!(decode(&json!({ "v": 2, "t": "READY" })), None);
        assert_eq!(decode(&json!({ "v": "1", "t": "READY" })), None);
    }

    #[test]
    fn test_decode_rejects_unknown_or_missing_type() {
        assert_eq!(decode(&json!({ "v": 1 })), None);
        assert_eq!(decode(&json!({ "v": 1, "t": "TELEPORT" })), None);
        assert_eq!(decode(&json!({ "v": 1, "t": 5 })), None);
    }

    #[test]
    fn test_decode_rejects_non_objects() {
        assert_eq!(decode(&json!(null)), None);
        assert_eq!(decode(&json!("HELLO")), None);
        assert_eq!(decode(&json!([1, "HELLO"])), None);
        assert_eq!(decode_str("not json"), None);
    }

    #[test]
    fn test_decode_rejects_malformed_fields() {
        // href must be a string
        assert_eq!(
            decode(&json!({ "v": 1, "t": "LOCATION", "href": 42 })),
            None
        );
        // unknown nav command
        assert_eq!(decode(&json!({ "v": 1, "t": "NAV", "cmd": "UP" })), None);
    }

    #[test]
    fn test_encode_adds_version() {
        let value = encode(&BridgeMessage::nav(NavCommand::Back, None)).expect("encode");
        assert_eq!(value, json!({ "v": 1, "t": "NAV", "cmd": "BACK" }));

        let value = encode(&BridgeMessage::nav(NavCommand::Go, Some("/docs".into())))
            .expect("encode");
        assert_eq!(value, json!({ "v": 1, "t": "NAV", "cmd": "GO", "to": "/docs" }));
    }

    #[test]
    fn test_encode_ready() {
        let value = encode(&BridgeMessage::ready()).expect("encode");
        assert_eq!(value, json!({ "v": 1, "t": "READY" }));
    }

    #[test]
    fn test_decode_str_ping() {
        let message = decode_str(r#"{"v":1,"t":"PING","ts":1700000000000}"#).expect("ping");
        assert_eq!(message, BridgeMessage::Ping { ts: 1_700_000_000_000.0 });
        assert_eq!(message.kind(), "PING");
    }
}
