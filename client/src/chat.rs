//! Chat relay: room-scoped messages, normalization and the local log.
//!
//! Sending never echoes locally; a message shows up in the log when the
//! server broadcasts it back. Received messages are normalized so every
//! field the view reads is present.

#[cfg(test)]
#[path = "chat_test.rs"]
mod chat_test;

use std::fmt;
use std::rc::Rc;

use packets::events::{ClientEvent, OutgoingChatMessage, WireChatMessage};
use serde_json::Value;
use time::OffsetDateTime;
use time::format_description::well_known::Rfc3339;
use tracing::{debug, warn};
use uuid::Uuid;

use crate::identity::Identity;
use crate::net::Transport;
use crate::util::color::SenderColor;
use crate::util::label::{initials, time_label};

/// Sender shown for messages that carry no name.
pub const UNKNOWN_SENDER: &str = "Unknown";

/// A chat message with every field filled in.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ChatMessage {
    pub id: String,
    /// Empty for snapshot entries that omit it.
    pub room_id: String,
    pub user: String,
    pub email: String,
    pub text: String,
    /// RFC 3339, as received or generated at receipt.
    pub timestamp: String,
}

impl ChatMessage {
    /// Fill in missing fields: a fresh UUID for the id, `user` from `name`
    /// or [`UNKNOWN_SENDER`], empty email and text, and the receipt time
    /// when neither `timestamp` nor `time` is usable.
    #[must_use]
    pub fn normalize(wire: WireChatMessage) -> Self {
        let id = non_empty(wire.id).unwrap_or_else(|| Uuid::new_v4().to_string());
        let user = non_empty(wire.user)
            .or_else(|| non_empty(wire.name))
            .unwrap_or_else(|| UNKNOWN_SENDER.to_owned());
        let timestamp = wire
            .timestamp
            .as_ref()
            .and_then(timestamp_from_value)
            .or_else(|| wire.time.as_ref().and_then(timestamp_from_value))
            .unwrap_or_else(now_rfc3339);

        Self {
            id,
            room_id: wire.room_id.unwrap_or_default(),
            user,
            email: wire.email.unwrap_or_default(),
            text: wire.text.unwrap_or_default(),
            timestamp,
        }
    }

    /// Key for color assignment: email when present, else the user name.
    #[must_use]
    pub fn sender_key(&self) -> &str {
        if self.email.is_empty() { &self.user } else { &self.email }
    }

    /// User name, else email, else [`UNKNOWN_SENDER`].
    #[must_use]
    pub fn display_name(&self) -> &str {
        [self.user.as_str(), self.email.as_str()]
            .into_iter()
            .find(|s| !s.is_empty())
            .unwrap_or(UNKNOWN_SENDER)
    }

    #[must_use]
    pub fn color(&self) -> SenderColor {
        SenderColor::for_key(self.sender_key())
    }
}

fn non_empty(value: Option<String>) -> Option<String> {
    value.filter(|s| !s.is_empty())
}

/// RFC 3339 strings pass through; numbers are Unix epoch milliseconds.
#[allow(clippy::cast_possible_truncation)]
fn timestamp_from_value(value: &Value) -> Option<String> {
    match value {
        Value::String(s) if !s.is_empty() => Some(s.clone()),
        Value::Number(n) => {
            let millis = n.as_i64().or_else(|| n.as_f64().map(|f| f.round() as i64))?;
            let at = match OffsetDateTime::from_unix_timestamp_nanos(i128::from(millis) * 1_000_000) {
                Ok(at) => at,
                Err(error) => {
                    debug!(millis, %error, "epoch timestamp out of range");
                    return None;
                }
            };
            format_rfc3339(at)
        }
        _ => None,
    }
}

fn format_rfc3339(at: OffsetDateTime) -> Option<String> {
    match at.format(&Rfc3339) {
        Ok(s) => Some(s),
        Err(error) => {
            debug!(%error, "timestamp not representable as RFC 3339");
            None
        }
    }
}

/// Current UTC time as RFC 3339.
#[must_use]
pub fn now_rfc3339() -> String {
    format_rfc3339(OffsetDateTime::now_utc()).unwrap_or_default()
}

/// Append-only, arrival-ordered message log.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct ChatLog {
    messages: Vec<ChatMessage>,
}

impl ChatLog {
    pub fn push(&mut self, message: ChatMessage) {
        self.messages.push(message);
    }

    /// Put snapshot history ahead of whatever arrived live since the join.
    pub fn prepend(&mut self, history: Vec<ChatMessage>) {
        self.messages.splice(0..0, history);
    }

    /// Forget everything; only used when switching rooms.
    pub fn clear(&mut self) {
        self.messages.clear();
    }

    #[must_use]
    pub fn messages(&self) -> &[ChatMessage] {
        &self.messages
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.messages.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.messages.is_empty()
    }

    #[must_use]
    pub fn last(&self) -> Option<&ChatMessage> {
        self.messages.last()
    }
}

pub struct ChatRelay {
    transport: Rc<dyn Transport>,
    identity: Identity,
    compose: String,
    log: ChatLog,
}

impl ChatRelay {
    #[must_use]
    pub fn new(transport: Rc<dyn Transport>, identity: Identity) -> Self {
        Self { transport, identity, compose: String::new(), log: ChatLog::default() }
    }

    #[must_use]
    pub fn identity(&self) -> &Identity {
        &self.identity
    }

    /// The compose field contents.
    #[must_use]
    pub fn compose(&self) -> &str {
        &self.compose
    }

    pub fn set_compose(&mut self, text: impl Into<String>) {
        self.compose = text.into();
    }

    /// Send the trimmed compose text to `room` and clear the field.
    ///
    /// Returns `false` without sending or touching the field when the text
    /// is blank, no room is joined, or the transport is down or refuses the
    /// event.
    pub fn send(&mut self, room: Option<&str>) -> bool {
        let text = self.compose.trim();
        if text.is_empty() {
            return false;
        }
        let Some(room) = room.filter(|r| !r.is_empty()) else {
            debug!("chat send without a room");
            return false;
        };
        if !self.transport.is_connected() {
            debug!("chat send while disconnected");
            return false;
        }

        let message = OutgoingChatMessage {
            room_id: room.to_owned(),
            text: text.to_owned(),
            user: self.identity.display_name.clone(),
            email: self.identity.email().to_owned(),
            timestamp: now_rfc3339(),
        };
        match self.transport.emit(&ClientEvent::ChatMessage(message)) {
            Ok(()) => {
                self.compose.clear();
                true
            }
            Err(error) => {
                warn!(%error, "chat message not sent");
                false
            }
        }
    }

    /// Normalize and append a received message.
    pub fn on_receive(&mut self, wire: WireChatMessage) -> ChatMessage {
        let message = ChatMessage::normalize(wire);
        self.log.push(message.clone());
        message
    }

    /// Load snapshot history ahead of live messages.
    pub fn load_history(&mut self, history: Vec<ChatMessage>) {
        self.log.prepend(history);
    }

    #[must_use]
    pub fn log(&self) -> &ChatLog {
        &self.log
    }

    pub fn clear(&mut self) {
        self.log.clear();
    }

    /// Presentation of every message, oldest first.
    #[must_use]
    pub fn lines(&self) -> Vec<ChatLine> {
        self.log.messages().iter().map(|m| ChatLine::new(m, &self.identity)).collect()
    }
}

/// What a chat bubble shows.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ChatLine {
    pub own: bool,
    pub name: String,
    pub initials: String,
    pub color: SenderColor,
    /// `HH:MM`, empty when the timestamp does not parse.
    pub time: String,
    pub text: String,
}

impl ChatLine {
    #[must_use]
    pub fn new(message: &ChatMessage, me: &Identity) -> Self {
        let name = message.display_name().to_owned();
        Self {
            own: me.is_own(message),
            initials: initials(&name),
            name,
            color: message.color(),
            time: time_label(&message.timestamp),
            text: message.text.clone(),
        }
    }
}

impl fmt::Display for ChatLine {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if !self.time.is_empty() {
            write!(f, "[{}] ", self.time)?;
        }
        write!(f, "{}", self.name)?;
        if self.own {
            write!(f, " (you)")?;
        }
        write!(f, ": {}", self.text)
    }
}
