//! Shared packet model and text codec for the realtime socket transport.
//!
//! The backend speaks Socket.IO (protocol v5) layered on Engine.IO (protocol
//! v4). Over a websocket every text message carries exactly one Engine.IO
//! packet; Socket.IO packets ride inside Engine.IO `message` packets.
//!
//! ```text
//! 0{"sid":"..","pingInterval":25000,..}   engine open
//! 2 / 3                                   engine ping / pong
//! 40{"token":"..."}                       socket CONNECT with auth
//! 42["draw",{"roomId":"r1",..}]           socket EVENT
//! ```
//!
//! Typed event payloads (stroke segments, chat messages, session snapshots)
//! live in [`events`].

pub mod events;

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Namespace used when a packet carries no explicit `/nsp,` prefix.
pub const DEFAULT_NAMESPACE: &str = "/";

/// Error returned by the decode functions in this crate.
#[derive(Debug, thiserror::Error)]
pub enum CodecError {
    /// The packet text was empty.
    #[error("empty packet")]
    Empty,
    /// The leading digit is not a known Engine.IO packet type.
    #[error("unknown engine.io packet type `{0}`")]
    UnknownEngineType(char),
    /// The leading digit is not a known Socket.IO packet type.
    #[error("unknown socket.io packet type `{0}`")]
    UnknownSocketType(char),
    /// Binary events and acks need attachment reassembly, which this client does not do.
    #[error("binary socket.io packets are not supported")]
    UnsupportedBinary,
    /// An ACK packet arrived without an ack id.
    #[error("ack packet is missing its id")]
    MissingAckId,
    /// An EVENT payload was not an array starting with the event name.
    #[error("event payload must be an array starting with a string name")]
    MalformedEvent,
    /// JSON has no representation for NaN or infinite stroke coordinates.
    #[error("stroke coordinates must be finite")]
    NonFiniteCoordinate,
    /// The JSON part of the packet could not be parsed.
    #[error("invalid packet json: {0}")]
    Json(#[from] serde_json::Error),
    /// A known event carried a payload that does not match its schema.
    #[error("invalid `{event}` payload: {source}")]
    Payload {
        event: String,
        #[source]
        source: serde_json::Error,
    },
}

// =============================================================================
// ENGINE.IO
// =============================================================================

/// Handshake payload of the Engine.IO `open` packet.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OpenHandshake {
    /// Engine.IO session id.
    pub sid: String,
    /// Transports the server would upgrade to. Empty over a raw websocket.
    #[serde(default)]
    pub upgrades: Vec<String>,
    /// Milliseconds between server pings.
    pub ping_interval: u64,
    /// Milliseconds the server waits for a pong (and the client for the next ping).
    pub ping_timeout: u64,
    /// Maximum payload size in bytes, when advertised.
    #[serde(default)]
    pub max_payload: Option<u64>,
}

/// One Engine.IO packet.
#[derive(Clone, Debug, PartialEq)]
pub enum EnginePacket {
    Open(OpenHandshake),
    Close,
    Ping(Option<String>),
    Pong(Option<String>),
    /// Application payload; for this client always a Socket.IO packet.
    Message(String),
    Upgrade,
    Noop,
}

/// Decode one Engine.IO packet from websocket text.
///
/// # Errors
///
/// Returns [`CodecError::Empty`] for empty input, [`CodecError::UnknownEngineType`]
/// for an unrecognized type digit, and [`CodecError::Json`] for a malformed
/// `open` handshake.
pub fn decode_engine(text: &str) -> Result<EnginePacket, CodecError> {
    let mut chars = text.chars();
    let kind = chars.next().ok_or(CodecError::Empty)?;
    let rest = chars.as_str();

    let probe = || (!rest.is_empty()).then(|| rest.to_owned());
    match kind {
        '0' => Ok(EnginePacket::Open(serde_json::from_str(rest)?)),
        '1' => Ok(EnginePacket::Close),
        '2' => Ok(EnginePacket::Ping(probe())),
        '3' => Ok(EnginePacket::Pong(probe())),
        '4' => Ok(EnginePacket::Message(rest.to_owned())),
        '5' => Ok(EnginePacket::Upgrade),
        '6' => Ok(EnginePacket::Noop),
        other => Err(CodecError::UnknownEngineType(other)),
    }
}

/// Encode one Engine.IO packet as websocket text.
#[must_use]
pub fn encode_engine(packet: &EnginePacket) -> String {
    match packet {
        EnginePacket::Open(handshake) => {
            // Serializing a struct of strings and integers into a String cannot fail.
            let json = serde_json::to_string(handshake).unwrap_or_default();
            format!("0{json}")
        }
        EnginePacket::Close => "1".to_owned(),
        EnginePacket::Ping(probe) => format!("2{}", probe.as_deref().unwrap_or_default()),
        EnginePacket::Pong(probe) => format!("3{}", probe.as_deref().unwrap_or_default()),
        EnginePacket::Message(body) => format!("4{body}"),
        EnginePacket::Upgrade => "5".to_owned(),
        EnginePacket::Noop => "6".to_owned(),
    }
}

// =============================================================================
// SOCKET.IO
// =============================================================================

/// One Socket.IO packet.
#[derive(Clone, Debug, PartialEq)]
pub enum SocketPacket {
    /// Namespace connect. From the client `data` is the auth payload; from
    /// the server it carries the socket `sid`.
    Connect { namespace: String, data: Option<Value> },
    Disconnect { namespace: String },
    Event {
        namespace: String,
        ack_id: Option<u64>,
        name: String,
        args: Vec<Value>,
    },
    Ack {
        namespace: String,
        ack_id: u64,
        args: Vec<Value>,
    },
    /// Namespace connection refused, usually `{"message": ".."}`.
    ConnectError { namespace: String, data: Value },
}

impl SocketPacket {
    /// Build an event on the default namespace with a single argument.
    #[must_use]
    pub fn event(name: &str, payload: Value) -> Self {
        Self::Event {
            namespace: DEFAULT_NAMESPACE.to_owned(),
            ack_id: None,
            name: name.to_owned(),
            args: vec![payload],
        }
    }

    /// Namespace the packet is addressed to.
    #[must_use]
    pub fn namespace(&self) -> &str {
        match self {
            Self::Connect { namespace, .. }
            | Self::Disconnect { namespace }
            | Self::Event { namespace, .. }
            | Self::Ack { namespace, .. }
            | Self::ConnectError { namespace, .. } => namespace,
        }
    }
}

/// Decode a Socket.IO packet (the body of an Engine.IO `message`).
///
/// # Errors
///
/// Returns an error for unknown or binary packet types, malformed JSON,
/// ACKs without an id, and EVENTs whose payload is not `["name", ...]`.
pub fn decode_socket(text: &str) -> Result<SocketPacket, CodecError> {
    let mut chars = text.chars();
    let kind = chars.next().ok_or(CodecError::Empty)?;
    let rest = chars.as_str();

    match kind {
        '0'..='4' => {}
        '5' | '6' => return Err(CodecError::UnsupportedBinary),
        other => return Err(CodecError::UnknownSocketType(other)),
    }

    let (namespace, rest) = split_namespace(rest);
    let (ack_id, rest) = split_ack_id(rest);
    let payload = if rest.is_empty() {
        None
    } else {
        Some(serde_json::from_str::<Value>(rest)?)
    };

    match kind {
        '0' => Ok(SocketPacket::Connect { namespace, data: payload }),
        '1' => Ok(SocketPacket::Disconnect { namespace }),
        '2' => {
            let Some(Value::Array(mut items)) = payload else {
                return Err(CodecError::MalformedEvent);
            };
            if items.is_empty() {
                return Err(CodecError::MalformedEvent);
            }
            let Value::String(name) = items.remove(0) else {
                return Err(CodecError::MalformedEvent);
            };
            Ok(SocketPacket::Event { namespace, ack_id, name, args: items })
        }
        '3' => {
            let ack_id = ack_id.ok_or(CodecError::MissingAckId)?;
            let args = match payload {
                Some(Value::Array(items)) => items,
                Some(other) => vec![other],
                None => Vec::new(),
            };
            Ok(SocketPacket::Ack { namespace, ack_id, args })
        }
        _ => Ok(SocketPacket::ConnectError { namespace, data: payload.unwrap_or(Value::Null) }),
    }
}

/// Encode a Socket.IO packet (without the Engine.IO `4` prefix).
#[must_use]
pub fn encode_socket(packet: &SocketPacket) -> String {
    let mut out = String::new();
    let (kind, ack_id, payload) = match packet {
        SocketPacket::Connect { data, .. } => ('0', None, data.clone()),
        SocketPacket::Disconnect { .. } => ('1', None, None),
        SocketPacket::Event { ack_id, name, args, .. } => {
            let mut items = Vec::with_capacity(args.len() + 1);
            items.push(Value::String(name.clone()));
            items.extend(args.iter().cloned());
            ('2', *ack_id, Some(Value::Array(items)))
        }
        SocketPacket::Ack { ack_id, args, .. } => ('3', Some(*ack_id), Some(Value::Array(args.clone()))),
        SocketPacket::ConnectError { data, .. } => ('4', None, Some(data.clone())),
    };

    out.push(kind);
    let namespace = packet.namespace();
    if namespace != DEFAULT_NAMESPACE {
        out.push_str(namespace);
        out.push(',');
    }
    if let Some(id) = ack_id {
        out.push_str(&id.to_string());
    }
    if let Some(payload) = payload {
        out.push_str(&payload.to_string());
    }
    out
}

/// Encode a Socket.IO packet wrapped in an Engine.IO `message` packet,
/// ready to send as websocket text.
#[must_use]
pub fn encode_message(packet: &SocketPacket) -> String {
    encode_engine(&EnginePacket::Message(encode_socket(packet)))
}

fn split_namespace(rest: &str) -> (String, &str) {
    if !rest.starts_with('/') {
        return (DEFAULT_NAMESPACE.to_owned(), rest);
    }
    match rest.find(',') {
        Some(index) => (rest[..index].to_owned(), &rest[index + 1..]),
        None => (rest.to_owned(), ""),
    }
}

fn split_ack_id(rest: &str) -> (Option<u64>, &str) {
    let digits = rest.bytes().take_while(u8::is_ascii_digit).count();
    if digits == 0 {
        return (None, rest);
    }
    match rest[..digits].parse::<u64>() {
        Ok(id) => (Some(id), &rest[digits..]),
        Err(_) => (None, rest),
    }
}

#[cfg(test)]
#[path = "lib_test.rs"]
mod tests;
