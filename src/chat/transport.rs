//! Chat Transport
//!
//! The duplex channel underneath the chat view. [`WebSocketTransport`] is the
//! real one; tests substitute scripted transports.

use async_trait::async_trait;
use futures_util::{SinkExt, StreamExt};
use tokio::net::TcpStream;
use tokio_tungstenite::tungstenite::Message;
use tokio_tungstenite::{connect_async, MaybeTlsStream, WebSocketStream};

use super::error::ChatError;
use super::state::CloseReason;

/// Something that happened on the channel
#[derive(Debug, Clone, PartialEq)]
pub enum TransportEvent {
    /// A text frame arrived
    Text(String),
    /// The channel closed; no further events follow
    Closed(CloseReason),
}

/// A single duplex text channel
#[async_trait]
pub trait ChatTransport: Send {
    /// Write one text frame
    async fn send_text(&mut self, text: String) -> Result<(), ChatError>;

    /// Wait for the next event. Returns `None` once the channel has closed.
    ///
    /// Must be cancel-safe: dropping the future loses no frames.
    async fn next_event(&mut self) -> Option<TransportEvent>;

    /// Close the channel. Errors are swallowed.
    async fn close(&mut self);
}

/// WebSocket connection to the chat endpoint
pub struct WebSocketTransport {
    stream: WebSocketStream<MaybeTlsStream<TcpStream>>,
    finished: bool,
}

impl WebSocketTransport {
    /// Open a connection. No retry.
    pub async fn connect(url: &str) -> Result<Self, ChatError> {
        let (stream, response) = connect_async(url).await.map_err(|e| ChatError::Connect {
            url: url.to_string(),
            reason: e.to_string(),
        })?;

        tracing::info!(url = %url, status = response.status().as_u16(), "Chat channel open");

        Ok(Self {
            stream,
            finished: false,
        })
    }
}

#[async_trait]
impl ChatTransport for WebSocketTransport {
    async fn send_text(&mut self, text: String) -> Result<(), ChatError> {
        if self.finished {
            return Err(ChatError::NotConnected);
        }
        self.stream
            .send(Message::Text(text))
            .await
            .map_err(|e| ChatError::Send(e.to_string()))
    }

    async fn next_event(&mut self) -> Option<TransportEvent> {
        if self.finished {
            return None;
        }

        loop {
            match self.stream.next().await {
                Some(Ok(Message::Text(text))) => return Some(TransportEvent::Text(text)),
                Some(Ok(Message::Close(frame))) => {
                    tracing::debug!(frame = ?frame, "Server closed chat channel");
                    self.finished = true;
                    return Some(TransportEvent::Closed(CloseReason::Clean));
                }
                Some(Ok(Message::Binary(_))) => {
                    tracing::debug!("Ignoring binary chat frame");
                }
                // ping/pong are answered by tungstenite
                Some(Ok(_)) => {}
                Some(Err(e)) => {
                    tracing::warn!(error = %e, "Chat channel failed");
                    self.finished = true;
                    return Some(TransportEvent::Closed(CloseReason::Error(e.to_string())));
                }
                None => {
                    self.finished = true;
                    return Some(TransportEvent::Closed(CloseReason::Clean));
                }
            }
        }
    }

    async fn close(&mut self) {
        if self.finished {
            return;
        }
        self.finished = true;
        if let Err(e) = self.stream.close(None).await {
            tracing::debug!(error = %e, "Error while closing chat channel");
        }
    }
}
