//! Chat View
//!
//! Owns exactly one channel for as long as it is mounted. Mounting opens the
//! channel, [`ChatView::unmount`] closes it and discards the transcript.
//! Dropping a mounted view releases the socket without a close handshake.

use super::error::ChatError;
use super::messages::ChatMessage;
use super::state::{ChatState, CloseReason, ConnectionState, Receipt};
use super::transport::{ChatTransport, TransportEvent, WebSocketTransport};
use crate::config::ChatConfig;
use crate::notify::{Notification, Notifier};

/// What [`ChatView::next_update`] observed
#[derive(Debug, Clone, PartialEq)]
pub enum ChatUpdate {
    /// A bot message was appended to the transcript
    Message(ChatMessage),
    /// A malformed frame was dropped
    Dropped(String),
    /// The channel closed
    Closed(CloseReason),
}

/// A mounted chat widget
pub struct ChatView<T: ChatTransport = WebSocketTransport> {
    transport: Option<T>,
    state: ChatState,
    notifier: Notifier,
}

impl ChatView<WebSocketTransport> {
    /// Open the chat endpoint.
    ///
    /// A failed open is not an error: the view comes up `Closed(Error)` with
    /// a warning queued, and every send is rejected.
    pub async fn mount(config: &ChatConfig) -> Self {
        let mut view = Self::detached();
        match WebSocketTransport::connect(&config.url).await {
            Ok(transport) => view.attach(transport),
            Err(e) => {
                tracing::warn!(error = %e, "Chat channel unavailable");
                view.notifier.warning(format!("Chat unavailable: {}", e));
                view.state.close(CloseReason::Error(e.to_string()));
            }
        }
        view
    }
}

impl<T: ChatTransport> ChatView<T> {
    fn detached() -> Self {
        Self {
            transport: None,
            state: ChatState::new(),
            notifier: Notifier::default(),
        }
    }

    /// Mount over an already open transport
    pub fn with_transport(transport: T) -> Self {
        let mut view = Self::detached();
        view.attach(transport);
        view
    }

    fn attach(&mut self, transport: T) {
        self.transport = Some(transport);
        self.state.open();
    }

    pub fn messages(&self) -> &[ChatMessage] {
        self.state.messages()
    }

    pub fn connection(&self) -> &ConnectionState {
        self.state.connection()
    }

    pub fn notifier(&self) -> &Notifier {
        &self.notifier
    }

    pub fn take_notifications(&mut self) -> Vec<Notification> {
        self.notifier.drain()
    }

    /// Send user input.
    ///
    /// Blank input is a no-op and returns `Ok(false)`. Otherwise the frame is
    /// written and the user message is echoed into the transcript without
    /// waiting for any acknowledgment.
    pub async fn send(&mut self, input: &str) -> Result<bool, ChatError> {
        let Some(frame) = self.state.outbound(input) else {
            return Ok(false);
        };

        let transport = match self.transport.as_mut() {
            Some(t) if self.state.connection().is_open() => t,
            _ => return Err(ChatError::NotConnected),
        };

        let payload = frame.encode()?;
        if let Err(e) = transport.send_text(payload).await {
            tracing::warn!(error = %e, "Chat send failed");
            self.notifier.error("Message could not be sent");
            self.state.close(CloseReason::Error(e.to_string()));
            return Err(e);
        }

        self.state.record_sent(&frame.text);
        Ok(true)
    }

    /// Wait for the next inbound event and apply it.
    ///
    /// Returns `None` once the channel is closed. Cancel-safe as long as the
    /// transport is.
    pub async fn next_update(&mut self) -> Option<ChatUpdate> {
        loop {
            if self.state.connection().is_closed() {
                return None;
            }
            let transport = self.transport.as_mut()?;

            match transport.next_event().await {
                Some(TransportEvent::Text(raw)) => match self.state.receive(&raw) {
                    Receipt::Appended(message) => return Some(ChatUpdate::Message(message)),
                    Receipt::Malformed(reason) => {
                        self.notifier.warning("Dropped a malformed chat message");
                        return Some(ChatUpdate::Dropped(reason));
                    }
                    Receipt::Ignored => continue,
                },
                Some(TransportEvent::Closed(reason)) => {
                    if let CloseReason::Error(e) = &reason {
                        self.notifier.warning(format!("Chat disconnected: {}", e));
                    }
                    self.state.close(reason.clone());
                    return Some(ChatUpdate::Closed(reason));
                }
                None => {
                    self.state.close(CloseReason::Clean);
                    return Some(ChatUpdate::Closed(CloseReason::Clean));
                }
            }
        }
    }

    /// Close the channel unconditionally and discard the transcript
    pub async fn unmount(mut self) {
        if let Some(mut transport) = self.transport.take() {
            transport.close().await;
        }
        self.state.close(CloseReason::Clean);
        tracing::debug!(messages = self.state.messages().len(), "Chat view unmounted");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::chat::messages::Sender;
    use async_trait::async_trait;
    use std::sync::{Arc, Mutex};
    use tokio::sync::mpsc;

    #[derive(Default)]
    struct Wire {
        sent: Vec<String>,
        closed: bool,
        fail_sends: bool,
    }

    /// Transport fed from a channel, recording what was written
    struct ScriptedTransport {
        inbound: mpsc::UnboundedReceiver<TransportEvent>,
        wire: Arc<Mutex<Wire>>,
    }

    #[async_trait]
    impl ChatTransport for ScriptedTransport {
        async fn send_text(&mut self, text: String) -> Result<(), ChatError> {
            let mut wire = self.wire.lock().unwrap();
            if wire.fail_sends {
                return Err(ChatError::Send("broken pipe".to_string()));
            }
            wire.sent.push(text);
            Ok(())
        }

        async fn next_event(&mut self) -> Option<TransportEvent> {
            self.inbound.recv().await
        }

        async fn close(&mut self) {
            self.wire.lock().unwrap().closed = true;
            self.inbound.close();
        }
    }

    fn scripted() -> (
        ChatView<ScriptedTransport>,
        mpsc::UnboundedSender<TransportEvent>,
        Arc<Mutex<Wire>>,
    ) {
        let (tx, rx) = mpsc::unbounded_channel();
        let wire = Arc::new(Mutex::new(Wire::default()));
        let view = ChatView::with_transport(ScriptedTransport {
            inbound: rx,
            wire: Arc::clone(&wire),
        });
        (view, tx, wire)
    }

    fn frame(response: &str) -> TransportEvent {
        TransportEvent::Text(serde_json::json!({ "response": response }).to_string())
    }

    #[tokio::test]
    async fn test_hello_scenario() {
        let (mut view, tx, wire) = scripted();
        assert!(view.connection().is_open());

        assert!(view.send("Hello").await.unwrap());
        assert_eq!(view.messages(), &[ChatMessage::user("Hello")]);
        assert_eq!(wire.lock().unwrap().sent, vec![r#"{"text":"Hello"}"#]);

        tx.send(frame("Hi there")).unwrap();
        let update = view.next_update().await.unwrap();
        assert_eq!(update, ChatUpdate::Message(ChatMessage::bot("Hi there")));
        assert_eq!(
            view.messages(),
            &[ChatMessage::user("Hello"), ChatMessage::bot("Hi there")]
        );
    }

    #[tokio::test]
    async fn test_blank_input_is_a_no_op() {
        let (mut view, _tx, wire) = scripted();

        assert!(!view.send("").await.unwrap());
        assert!(!view.send("   ").await.unwrap());

        assert!(view.messages().is_empty());
        assert!(wire.lock().unwrap().sent.is_empty());
    }

    #[tokio::test]
    async fn test_each_send_appends_one_user_message() {
        let (mut view, _tx, wire) = scripted();
        let inputs = ["a", " b ", "c\n"];
        for input in inputs {
            view.send(input).await.unwrap();
        }

        assert_eq!(view.messages().len(), inputs.len());
        for (message, input) in view.messages().iter().zip(inputs) {
            assert_eq!(message.sender, Sender::User);
            assert_eq!(message.text, input);
        }
        assert_eq!(wire.lock().unwrap().sent.len(), 3);
    }

    #[tokio::test]
    async fn test_inbound_frames_keep_arrival_order() {
        let (mut view, tx, _wire) = scripted();
        for r in ["one", "two", "three"] {
            tx.send(frame(r)).unwrap();
        }
        for _ in 0..3 {
            view.next_update().await.unwrap();
        }

        let texts: Vec<_> = view.messages().iter().map(|m| m.text.as_str()).collect();
        assert_eq!(texts, vec!["one", "two", "three"]);
        assert!(view.messages().iter().all(|m| m.sender == Sender::Bot));
    }

    #[tokio::test]
    async fn test_malformed_frame_warns_and_continues() {
        let (mut view, tx, _wire) = scripted();
        tx.send(TransportEvent::Text("not json".to_string())).unwrap();
        tx.send(frame("still here")).unwrap();

        assert!(matches!(
            view.next_update().await,
            Some(ChatUpdate::Dropped(_))
        ));
        assert_eq!(
            view.next_update().await,
            Some(ChatUpdate::Message(ChatMessage::bot("still here")))
        );
        assert_eq!(view.messages().len(), 1);

        let notes = view.take_notifications();
        assert_eq!(notes.len(), 1);
        assert_eq!(notes[0].message, "Dropped a malformed chat message");
    }

    #[tokio::test]
    async fn test_abrupt_close_is_an_error_close() {
        let (mut view, tx, _wire) = scripted();
        tx.send(TransportEvent::Closed(CloseReason::Error("reset".to_string())))
            .unwrap();
        tx.send(frame("never seen")).unwrap();

        assert_eq!(
            view.next_update().await,
            Some(ChatUpdate::Closed(CloseReason::Error("reset".to_string())))
        );
        assert_eq!(view.next_update().await, None);
        assert!(view.messages().is_empty());

        assert!(matches!(
            view.send("hello?").await,
            Err(ChatError::NotConnected)
        ));
        assert!(view.messages().is_empty());
    }

    #[tokio::test]
    async fn test_send_failure_closes_without_echo() {
        let (mut view, _tx, wire) = scripted();
        wire.lock().unwrap().fail_sends = true;

        assert!(matches!(view.send("Hello").await, Err(ChatError::Send(_))));
        assert!(view.messages().is_empty());
        assert!(view.connection().is_closed());
        assert_eq!(
            view.notifier().latest().unwrap().message,
            "Message could not be sent"
        );
    }

    #[tokio::test]
    async fn test_unmount_closes_channel() {
        let (mut view, tx, wire) = scripted();
        view.send("one").await.unwrap();
        view.send("two").await.unwrap();
        tx.send(frame("reply")).unwrap();
        view.next_update().await.unwrap();

        view.unmount().await;

        let wire = wire.lock().unwrap();
        assert!(wire.closed);
        assert_eq!(wire.sent.len(), 2);
        assert!(tx.send(frame("after close")).is_err());
    }

    #[tokio::test]
    async fn test_mount_failure_leaves_view_closed() {
        let config = ChatConfig {
            url: "ws://127.0.0.1:1/ws/chat/".to_string(),
        };
        let mut view = ChatView::<WebSocketTransport>::mount(&config).await;

        assert!(matches!(
            view.connection(),
            ConnectionState::Closed(CloseReason::Error(_))
        ));
        assert!(matches!(view.send("hi").await, Err(ChatError::NotConnected)));
        assert_eq!(view.next_update().await, None);
        assert!(view
            .take_notifications()
            .iter()
            .any(|n| n.message.starts_with("Chat unavailable")));
    }
}
