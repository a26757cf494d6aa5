//! Room session: which room this client is in.

#[cfg(test)]
#[path = "room_test.rs"]
mod room_test;

use std::rc::Rc;

use packets::events::ClientEvent;
use tracing::info;
use uuid::Uuid;

use crate::net::{Transport, TransportError};

#[derive(Debug, thiserror::Error)]
pub enum RoomError {
    #[error("room id is empty")]
    EmptyRoomId,
    #[error("not connected")]
    NotConnected,
    #[error("room event not sent: {0}")]
    Transport(#[from] TransportError),
}

pub struct RoomSession {
    transport: Rc<dyn Transport>,
    current: Option<String>,
}

impl RoomSession {
    #[must_use]
    pub fn new(transport: Rc<dyn Transport>) -> Self {
        Self { transport, current: None }
    }

    /// The joined room, if any.
    #[must_use]
    pub fn current(&self) -> Option<&str> {
        self.current.as_deref()
    }

    /// Join an existing room. Returns the trimmed id.
    ///
    /// # Errors
    ///
    /// Returns [`RoomError::EmptyRoomId`] for a blank id and
    /// [`RoomError::NotConnected`] or [`RoomError::Transport`] when the
    /// event cannot be sent. Nothing is sent and the current room is kept
    /// on error.
    pub fn join(&mut self, room_id: &str) -> Result<String, RoomError> {
        let room_id = room_id.trim();
        if room_id.is_empty() {
            return Err(RoomError::EmptyRoomId);
        }
        self.enter(ClientEvent::JoinRoom { room_id: room_id.to_owned() })
    }

    /// Create a room under a fresh UUID v4 and treat it as joined.
    ///
    /// # Errors
    ///
    /// Same as [`RoomSession::join`], minus the empty id case.
    pub fn create(&mut self) -> Result<String, RoomError> {
        self.enter(ClientEvent::CreateRoom { room_id: Uuid::new_v4().to_string() })
    }

    fn enter(&mut self, event: ClientEvent) -> Result<String, RoomError> {
        if !self.transport.is_connected() {
            return Err(RoomError::NotConnected);
        }
        self.transport.emit(&event)?;
        let room_id = event.room_id().to_owned();
        info!(room = %room_id, event = event.name(), "entered room");
        self.current = Some(room_id.clone());
        Ok(room_id)
    }

    /// Forget the current room locally. The server has no leave event.
    pub fn leave(&mut self) -> Option<String> {
        self.current.take()
    }
}
