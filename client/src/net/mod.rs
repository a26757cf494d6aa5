//! Networking: the transport seam, the websocket connector and REST login.
//!
//! SYSTEM CONTEXT
//! ==============
//! Relays only see [`Transport`]. [`socket`] implements it over a Socket.IO
//! websocket; tests implement it with an in-memory recorder.

pub mod api;
pub mod socket;

use packets::CodecError;
use packets::events::{ClientEvent, ServerEvent};

pub use socket::{Connection, Incoming, close, open};

/// Outbound half of an established connection.
pub trait Transport {
    /// Whether events can currently be sent.
    fn is_connected(&self) -> bool;

    /// Queue one event for sending.
    ///
    /// # Errors
    ///
    /// Returns [`TransportError::NotConnected`] once the connection is gone,
    /// or [`TransportError::Codec`] if the event cannot be encoded.
    fn emit(&self, event: &ClientEvent) -> Result<(), TransportError>;
}

/// What the connection reports to its owner.
#[derive(Clone, Debug, PartialEq)]
pub enum ConnectionEvent {
    /// Socket.IO namespace connected; diagnostics only.
    Connected { sid: String },
    Event(ServerEvent),
    /// The connection ended. No further events follow.
    Disconnected { reason: String },
}

#[derive(Debug, thiserror::Error)]
pub enum TransportError {
    #[error("not connected")]
    NotConnected,
    #[error("event encode failed: {0}")]
    Codec(#[from] CodecError),
}

#[derive(Debug, thiserror::Error)]
pub enum ConnectError {
    #[error("invalid base URL: {0}")]
    InvalidBaseUrl(String),
    #[error("websocket connect failed: {0}")]
    WsConnect(Box<tokio_tungstenite::tungstenite::Error>),
    #[error("packet decode failed: {0}")]
    Decode(#[from] CodecError),
    #[error("timed out waiting for the handshake")]
    Timeout,
    #[error("connection closed during the handshake")]
    Closed,
    #[error("server rejected the connection: {message}")]
    Rejected { message: String },
    #[error("unexpected packet during the handshake: {0}")]
    UnexpectedPacket(String),
}
