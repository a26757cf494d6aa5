//! Typed event payloads carried in Socket.IO EVENT packets.
//!
//! DESIGN
//! ======
//! Outbound payloads are strict: the client only ever emits fully populated
//! values. Inbound payloads are lenient: every field except stroke
//! coordinates is optional, and a field of the wrong JSON type reads as
//! absent, so a sloppy backend degrades into default substitution instead
//! of dropped events. Normalization into client-side models happens in `client`.

#[cfg(test)]
#[path = "events_test.rs"]
mod events_test;

use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;

use crate::{CodecError, SocketPacket};

pub const JOIN_ROOM: &str = "joinRoom";
pub const CREATE_ROOM: &str = "createRoom";
pub const DRAW: &str = "draw";
pub const CHAT_MESSAGE: &str = "chatMessage";
pub const LOAD_SESSION: &str = "loadSession";

// =============================================================================
// PAYLOADS
// =============================================================================

/// One incremental draw/erase instruction.
///
/// `is_drawing == false` lifts the pen and moves it to `(x, y)`;
/// `is_drawing == true` draws a line from the current pen position.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StrokeSegment {
    /// Room scope. Snapshot entries may omit it on the wire.
    #[serde(default, deserialize_with = "lenient_text")]
    pub room_id: String,
    /// Logical (device-pixel-ratio independent) x coordinate.
    pub x: f64,
    /// Logical y coordinate.
    pub y: f64,
    #[serde(default, deserialize_with = "lenient_flag")]
    pub is_drawing: bool,
    #[serde(default, deserialize_with = "lenient_flag")]
    pub is_erasing: bool,
}

/// Chat message as emitted by this client.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OutgoingChatMessage {
    pub room_id: String,
    pub text: String,
    pub user: String,
    pub email: String,
    /// RFC 3339 instant generated at send time.
    pub timestamp: String,
}

/// Chat message as received from the server, live or inside a snapshot.
#[derive(Clone, Debug, Default, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WireChatMessage {
    /// Server-assigned identifier (`_id` from document stores, or `id`).
    #[serde(rename = "_id", alias = "id", default, deserialize_with = "lenient_string")]
    pub id: Option<String>,
    #[serde(default, deserialize_with = "lenient_string")]
    pub room_id: Option<String>,
    #[serde(default, deserialize_with = "lenient_string")]
    pub user: Option<String>,
    /// Older senders put the display name here instead of `user`.
    #[serde(default, deserialize_with = "lenient_string")]
    pub name: Option<String>,
    #[serde(default, deserialize_with = "lenient_string")]
    pub email: Option<String>,
    #[serde(default, deserialize_with = "lenient_string")]
    pub text: Option<String>,
    /// RFC 3339 string or epoch milliseconds.
    #[serde(default)]
    pub timestamp: Option<Value>,
    /// Legacy spelling of `timestamp`.
    #[serde(default)]
    pub time: Option<Value>,
}

/// One-time room snapshot sent after a join.
///
/// Entries stay as raw JSON so one bad entry does not reject the whole
/// snapshot; callers decode them individually.
#[derive(Clone, Debug, Default, PartialEq, Deserialize)]
pub struct WireSession {
    #[serde(default, deserialize_with = "lenient_list")]
    pub drawings: Vec<Value>,
    #[serde(default, deserialize_with = "lenient_list")]
    pub chats: Vec<Value>,
}

fn lenient_string<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Value::deserialize(deserializer)?;
    Ok(match value {
        Value::String(s) => Some(s),
        _ => None,
    })
}

fn lenient_text<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    lenient_string(deserializer).map(Option::unwrap_or_default)
}

fn lenient_flag<'de, D>(deserializer: D) -> Result<bool, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Value::deserialize(deserializer)?;
    Ok(matches!(value, Value::Bool(true)))
}

fn lenient_list<'de, D>(deserializer: D) -> Result<Vec<Value>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Value::deserialize(deserializer)?;
    Ok(match value {
        Value::Array(items) => items,
        _ => Vec::new(),
    })
}

// =============================================================================
// EVENTS
// =============================================================================

/// Events the client emits.
#[derive(Clone, Debug, PartialEq)]
pub enum ClientEvent {
    JoinRoom { room_id: String },
    CreateRoom { room_id: String },
    Draw(StrokeSegment),
    ChatMessage(OutgoingChatMessage),
}

impl ClientEvent {
    /// Wire event name.
    #[must_use]
    pub fn name(&self) -> &'static str {
        match self {
            Self::JoinRoom { .. } => JOIN_ROOM,
            Self::CreateRoom { .. } => CREATE_ROOM,
            Self::Draw(_) => DRAW,
            Self::ChatMessage(_) => CHAT_MESSAGE,
        }
    }

    /// Room the event is scoped to.
    #[must_use]
    pub fn room_id(&self) -> &str {
        match self {
            Self::JoinRoom { room_id } | Self::CreateRoom { room_id } => room_id,
            Self::Draw(segment) => &segment.room_id,
            Self::ChatMessage(message) => &message.room_id,
        }
    }

    /// Build the Socket.IO EVENT packet for this event.
    ///
    /// # Errors
    ///
    /// Returns [`CodecError::NonFiniteCoordinate`] for a stroke with a NaN or
    /// infinite coordinate, and [`CodecError::Json`] if serialization fails.
    pub fn to_packet(&self) -> Result<SocketPacket, CodecError> {
        let payload = match self {
            Self::JoinRoom { room_id } | Self::CreateRoom { room_id } => Value::String(room_id.clone()),
            Self::Draw(segment) => {
                if !(segment.x.is_finite() && segment.y.is_finite()) {
                    return Err(CodecError::NonFiniteCoordinate);
                }
                serde_json::to_value(segment)?
            }
            Self::ChatMessage(message) => serde_json::to_value(message)?,
        };
        Ok(SocketPacket::event(self.name(), payload))
    }
}

/// Events the server emits that this client understands.
#[derive(Clone, Debug, PartialEq)]
pub enum ServerEvent {
    Draw(StrokeSegment),
    ChatMessage(WireChatMessage),
    LoadSession(WireSession),
    /// Any event the client has no handler for.
    Other { name: String, args: Vec<Value> },
}

impl ServerEvent {
    /// Interpret a Socket.IO event by name and first argument.
    ///
    /// # Errors
    ///
    /// Returns [`CodecError::Payload`] when a known event's payload fails
    /// to decode.
    pub fn from_event(name: &str, mut args: Vec<Value>) -> Result<Self, CodecError> {
        let payload = if args.is_empty() { Value::Null } else { args.remove(0) };
        let wrap = |source| CodecError::Payload { event: name.to_owned(), source };

        match name {
            DRAW => serde_json::from_value(payload).map(Self::Draw).map_err(wrap),
            CHAT_MESSAGE => serde_json::from_value(payload).map(Self::ChatMessage).map_err(wrap),
            LOAD_SESSION => {
                if payload.is_null() {
                    return Ok(Self::LoadSession(WireSession::default()));
                }
                serde_json::from_value(payload).map(Self::LoadSession).map_err(wrap)
            }
            _ => {
                let mut all = Vec::with_capacity(args.len() + 1);
                if !payload.is_null() {
                    all.push(payload);
                }
                all.extend(args);
                Ok(Self::Other { name: name.to_owned(), args: all })
            }
        }
    }
}
