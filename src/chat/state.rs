//! Chat State
//!
//! The transcript and the channel's lifecycle, with no I/O. The view feeds
//! it what happened on the wire; it decides what gets appended.
//!
//! ```text
//! Connecting --> Open --> Closed(Clean | Error)
//!      |                      ^
//!      +----------------------+   (failed open)
//! ```
//!
//! `Closed` is terminal: once closed, nothing is appended any more.

use super::messages::{ChatMessage, InboundFrame, OutboundFrame};

/// Why the channel closed
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CloseReason {
    /// Closed by either side with a close handshake, or on unmount
    Clean,
    /// Open failed or the connection dropped
    Error(String),
}

/// Lifecycle of the chat channel
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConnectionState {
    Connecting,
    Open,
    Closed(CloseReason),
}

impl ConnectionState {
    pub fn is_open(&self) -> bool {
        matches!(self, ConnectionState::Open)
    }

    pub fn is_closed(&self) -> bool {
        matches!(self, ConnectionState::Closed(_))
    }
}

/// Result of feeding one inbound text frame
#[derive(Debug, Clone, PartialEq)]
pub enum Receipt {
    /// A bot message was appended
    Appended(ChatMessage),
    /// The frame was not `{"response": string}` and was dropped
    Malformed(String),
    /// The channel is already closed; the frame was discarded
    Ignored,
}

/// Transcript plus connection state for one mounted chat view
#[derive(Debug, Clone)]
pub struct ChatState {
    messages: Vec<ChatMessage>,
    connection: ConnectionState,
}

impl Default for ChatState {
    fn default() -> Self {
        Self::new()
    }
}

impl ChatState {
    pub fn new() -> Self {
        Self {
            messages: Vec::new(),
            connection: ConnectionState::Connecting,
        }
    }

    pub fn messages(&self) -> &[ChatMessage] {
        &self.messages
    }

    pub fn connection(&self) -> &ConnectionState {
        &self.connection
    }

    /// `Connecting -> Open`. Returns false for any other transition.
    pub fn open(&mut self) -> bool {
        if self.connection == ConnectionState::Connecting {
            self.connection = ConnectionState::Open;
            true
        } else {
            false
        }
    }

    /// Move to `Closed`. The first reason wins.
    pub fn close(&mut self, reason: CloseReason) -> bool {
        if self.connection.is_closed() {
            return false;
        }
        tracing::debug!(reason = ?reason, "Chat channel closed");
        self.connection = ConnectionState::Closed(reason);
        true
    }

    /// Frame to write for this input, or `None` for blank input
    pub fn outbound(&self, input: &str) -> Option<OutboundFrame> {
        if input.trim().is_empty() {
            return None;
        }
        Some(OutboundFrame {
            text: input.to_string(),
        })
    }

    /// Append the local echo of a sent message
    pub fn record_sent(&mut self, text: &str) -> Option<&ChatMessage> {
        if !self.connection.is_open() {
            return None;
        }
        self.messages.push(ChatMessage::user(text));
        self.messages.last()
    }

    /// Apply one inbound text frame
    pub fn receive(&mut self, raw: &str) -> Receipt {
        if self.connection.is_closed() {
            return Receipt::Ignored;
        }

        match InboundFrame::parse(raw) {
            Ok(frame) => {
                let message = ChatMessage::bot(frame.response);
                self.messages.push(message.clone());
                Receipt::Appended(message)
            }
            Err(e) => {
                tracing::warn!(error = %e, frame = %raw, "Dropping malformed chat frame");
                Receipt::Malformed(e.to_string())
            }
        }
    }
}
