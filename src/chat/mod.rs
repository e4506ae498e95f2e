//! Realtime Chat
//!
//! A chat assistant reached over one WebSocket per mounted view.
//!
//! ## Architecture
//!
//! - **State**: transcript and connection lifecycle, no I/O
//! - **Transport**: the duplex text channel (WebSocket in production)
//! - **View**: owns one transport for its lifetime and applies events to state
//!
//! ## Wire format
//!
//! One JSON object per text frame:
//!
//! ```text
//! client -> server   {"text": "Hello"}
//! server -> client   {"response": "Hi there"}
//! ```
//!
//! User messages are echoed into the transcript as soon as they are written
//! to the socket. There is no acknowledgment, retry or reconnection.

mod error;
mod messages;
mod state;
mod transport;
mod view;

pub use error::ChatError;
pub use messages::{ChatMessage, InboundFrame, OutboundFrame, Sender};
pub use state::{ChatState, CloseReason, ConnectionState, Receipt};
pub use transport::{ChatTransport, TransportEvent, WebSocketTransport};
pub use view::{ChatUpdate, ChatView};
