//! Wire-level chat event types.
//!
//! `IncomingMessage` carries client-originated events into the hub;
//! `OutgoingMessage` is the only shape ever written back toward clients.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Kind of a client-originated event.
///
/// Anything that is not a typing indicator is treated as a text message,
/// including frames with an unknown or missing `type` field.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum IncomingKind {
    Typing,
    #[default]
    #[serde(other)]
    Text,
}

/// Kind of a server-originated event.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum OutgoingKind {
    Message,
    Typing,
    UserJoined,
    UserLeft,
}

/// Client -> server chat event.
///
/// The sender identity fields are advisory on the wire: the reader pump
/// overwrites them with the authenticated session's identity before the
/// envelope reaches the hub.
#[derive(Debug, Clone, Deserialize)]
pub struct IncomingMessage {
    #[serde(rename = "type", default)]
    pub kind: IncomingKind,
    #[serde(default)]
    pub content: String,
    #[serde(default)]
    pub room_id: String,
    #[serde(default)]
    pub user_id: i64,
    #[serde(default)]
    pub username: String,
}

/// Server -> clients chat event.
#[derive(Debug, Clone, Serialize)]
pub struct OutgoingMessage {
    /// Database id, present only for persisted chat messages.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id: Option<i64>,
    #[serde(rename = "type")]
    pub kind: OutgoingKind,
    pub content: String,
    pub room_id: String,
    pub user_id: i64,
    pub username: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub avatar: Option<String>,
    pub created_at: DateTime<Utc>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_incoming_decode() {
        let msg: IncomingMessage = serde_json::from_str(
            r#"{"type":"text","content":"hi","room_id":"r1","user_id":1,"username":"x"}"#,
        )
        .unwrap();
        assert_eq!(msg.kind, IncomingKind::Text);
        assert_eq!(msg.content, "hi");
        assert_eq!(msg.room_id, "r1");
    }

    #[test]
    fn test_incoming_unknown_kind_is_text() {
        let msg: IncomingMessage =
            serde_json::from_str(r#"{"type":"shout","content":"hi"}"#).unwrap();
        assert_eq!(msg.kind, IncomingKind::Text);

        let msg: IncomingMessage = serde_json::from_str(r#"{"content":"hi"}"#).unwrap();
        assert_eq!(msg.kind, IncomingKind::Text);
    }

    #[test]
    fn test_incoming_typing() {
        let msg: IncomingMessage =
            serde_json::from_str(r#"{"type":"typing","room_id":"r1"}"#).unwrap();
        assert_eq!(msg.kind, IncomingKind::Typing);
    }

    #[test]
    fn test_outgoing_encode_omits_empty_optionals() {
        let out = OutgoingMessage {
            id: None,
            kind: OutgoingKind::UserJoined,
            content: "x joined the chat".to_string(),
            room_id: "r1".to_string(),
            user_id: 1,
            username: "x".to_string(),
            avatar: None,
            created_at: Utc::now(),
        };
        let json = serde_json::to_string(&out).unwrap();
        assert!(json.contains(r#""type":"user_joined""#));
        assert!(!json.contains(r#""id""#));
        assert!(!json.contains(r#""avatar""#));
        assert!(json.contains(r#""created_at""#));
    }

    #[test]
    fn test_outgoing_encode_message() {
        let out = OutgoingMessage {
            id: Some(42),
            kind: OutgoingKind::Message,
            content: "hi".to_string(),
            room_id: "r1".to_string(),
            user_id: 1,
            username: "x".to_string(),
            avatar: Some("https://example.com/a.png".to_string()),
            created_at: Utc::now(),
        };
        let json = serde_json::to_string(&out).unwrap();
        assert!(json.contains(r#""id":42"#));
        assert!(json.contains(r#""type":"message""#));
        assert!(json.contains(r#""avatar""#));
    }
}
