//! Chat Message Types
//!
//! Frames exchanged with the chat endpoint and the messages shown in the
//! transcript.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Who wrote a transcript entry
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Sender {
    User,
    Bot,
}

impl fmt::Display for Sender {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Sender::User => f.write_str("user"),
            Sender::Bot => f.write_str("bot"),
        }
    }
}

/// One transcript entry. Immutable once created.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChatMessage {
    pub sender: Sender,
    pub text: String,
}

impl ChatMessage {
    pub fn user(text: impl Into<String>) -> Self {
        Self {
            sender: Sender::User,
            text: text.into(),
        }
    }

    pub fn bot(text: impl Into<String>) -> Self {
        Self {
            sender: Sender::Bot,
            text: text.into(),
        }
    }
}

/// Frame received from the server: `{"response": "..."}`
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct InboundFrame {
    pub response: String,
}

impl InboundFrame {
    pub fn parse(raw: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(raw)
    }
}

/// Frame sent to the server: `{"text": "..."}`
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct OutboundFrame {
    pub text: String,
}

impl OutboundFrame {
    pub fn encode(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string(self)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_inbound_frame_parse() {
        let frame = InboundFrame::parse(r#"{"response": "Hi there"}"#).unwrap();
        assert_eq!(frame.response, "Hi there");
    }

    #[test]
    fn test_inbound_frame_ignores_extra_fields() {
        let frame = InboundFrame::parse(r#"{"response": "ok", "model": "x"}"#).unwrap();
        assert_eq!(frame.response, "ok");
    }

    #[test]
    fn test_inbound_frame_rejects_wrong_shape() {
        assert!(InboundFrame::parse("not json").is_err());
        assert!(InboundFrame::parse(r#"{"text": "Hi"}"#).is_err());
        assert!(InboundFrame::parse(r#"{"response": 5}"#).is_err());
    }

    #[test]
    fn test_outbound_frame_encode() {
        let frame = OutboundFrame {
            text: "Hello".to_string(),
        };
        assert_eq!(frame.encode().unwrap(), r#"{"text":"Hello"}"#);
    }

    #[test]
    fn test_chat_message_serialize() {
        let json = serde_json::to_string(&ChatMessage::bot("Hi")).unwrap();
        assert_eq!(json, r#"{"sender":"bot","text":"Hi"}"#);
    }
}
