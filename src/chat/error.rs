//! Chat channel errors

use thiserror::Error;

#[derive(Error, Debug)]
pub enum ChatError {
    /// Opening the channel failed. Not retried.
    #[error("Failed to connect to {url}: {reason}")]
    Connect { url: String, reason: String },

    /// Send attempted while the channel is not open
    #[error("Chat channel is not open")]
    NotConnected,

    /// Writing a frame failed; the channel is closed afterwards
    #[error("Failed to send frame: {0}")]
    Send(String),

    #[error("Failed to encode frame: {0}")]
    Encode(#[from] serde_json::Error),
}
