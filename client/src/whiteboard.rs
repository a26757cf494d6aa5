//! The whiteboard composite: one room, two relays, one surface.
//!
//! SYSTEM CONTEXT
//! ==============
//! Every mutation of the surface or the chat log goes through
//! [`Whiteboard::handle`] (inbound) or the input methods (outbound), all
//! called from the driver task. Inbound draw and chat events for a room
//! other than the joined one are ignored.

#[cfg(test)]
#[path = "whiteboard_test.rs"]
mod whiteboard_test;

use std::rc::Rc;

use canvas::geometry::Point;
use canvas::surface::Surface;
use packets::events::{ServerEvent, StrokeSegment, WireChatMessage, WireSession};
use tracing::{debug, info, warn};

use crate::bootstrap::SessionBootstrap;
use crate::chat::{ChatLog, ChatMessage, ChatRelay};
use crate::config::EchoPolicy;
use crate::draw::{DrawRelay, apply_segment};
use crate::identity::Identity;
use crate::net::{ConnectionEvent, Transport};
use crate::room::{RoomError, RoomSession};
use crate::throttle::FrameScheduler;

/// What handling one connection event changed.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Applied {
    /// A stroke segment was painted.
    Stroke,
    /// A chat message was appended.
    Chat(ChatMessage),
    /// The join snapshot was loaded.
    Snapshot { strokes: usize, chats: usize, skipped: usize },
    Connected { sid: String },
    Disconnected { reason: String },
    /// Out of scope, unsolicited or unknown; nothing changed.
    Ignored,
}

pub struct Whiteboard<S: Surface> {
    room: RoomSession,
    draw: DrawRelay,
    chat: ChatRelay,
    bootstrap: SessionBootstrap,
    surface: S,
}

impl<S: Surface> Whiteboard<S> {
    #[must_use]
    pub fn new(
        transport: Rc<dyn Transport>,
        scheduler: Rc<dyn FrameScheduler>,
        surface: S,
        identity: Identity,
        echo: EchoPolicy,
    ) -> Self {
        Self {
            room: RoomSession::new(transport.clone()),
            draw: DrawRelay::new(transport.clone(), scheduler, echo),
            chat: ChatRelay::new(transport, identity),
            bootstrap: SessionBootstrap::new(),
            surface,
        }
    }

    // =========================================================================
    // ROOMS
    // =========================================================================

    /// Join `room_id`, starting from an empty surface and chat log.
    ///
    /// # Errors
    ///
    /// Propagates [`RoomError`]; local state is untouched on error.
    pub fn join(&mut self, room_id: &str) -> Result<String, RoomError> {
        let room_id = self.room.join(room_id)?;
        self.reset_room();
        Ok(room_id)
    }

    /// Create a room and join it.
    ///
    /// # Errors
    ///
    /// Propagates [`RoomError`]; local state is untouched on error.
    pub fn create(&mut self) -> Result<String, RoomError> {
        let room_id = self.room.create()?;
        self.reset_room();
        Ok(room_id)
    }

    fn reset_room(&mut self) {
        self.surface.clear();
        self.chat.clear();
        self.draw.reset();
        self.bootstrap.arm();
    }

    #[must_use]
    pub fn room_id(&self) -> Option<&str> {
        self.room.current()
    }

    // =========================================================================
    // LOCAL INPUT
    // =========================================================================

    pub fn pointer_down(&mut self, position: Point) {
        self.draw.pointer_down(self.room.current(), position);
    }

    pub fn pointer_move(&mut self, position: Point) {
        self.draw.pointer_move(position);
    }

    pub fn pointer_up(&mut self) {
        self.draw.pointer_up();
    }

    pub fn set_erasing(&mut self, erasing: bool) {
        self.draw.set_erasing(erasing, &mut self.surface);
    }

    #[must_use]
    pub fn is_erasing(&self) -> bool {
        self.draw.is_erasing()
    }

    pub fn set_compose(&mut self, text: impl Into<String>) {
        self.chat.set_compose(text);
    }

    #[must_use]
    pub fn compose(&self) -> &str {
        self.chat.compose()
    }

    /// Send the compose field to the joined room. See [`ChatRelay::send`].
    pub fn send_chat(&mut self) -> bool {
        self.chat.send(self.room.current())
    }

    /// Frame callback. Returns the number of segments sent.
    pub fn on_frame(&mut self) -> usize {
        self.draw.on_frame(&mut self.surface)
    }

    /// Whether segments are waiting for a frame.
    #[must_use]
    pub fn has_pending_frame(&self) -> bool {
        !self.draw.pending().is_empty()
    }

    // =========================================================================
    // INBOUND
    // =========================================================================

    pub fn handle(&mut self, event: ConnectionEvent) -> Applied {
        match event {
            ConnectionEvent::Connected { sid } => {
                info!(%sid, "connected");
                Applied::Connected { sid }
            }
            ConnectionEvent::Disconnected { reason } => {
                warn!(%reason, "disconnected");
                self.draw.reset();
                Applied::Disconnected { reason }
            }
            ConnectionEvent::Event(ServerEvent::Draw(segment)) => self.on_draw(&segment),
            ConnectionEvent::Event(ServerEvent::ChatMessage(message)) => self.on_chat(message),
            ConnectionEvent::Event(ServerEvent::LoadSession(session)) => self.on_session(&session),
            ConnectionEvent::Event(ServerEvent::Other { name, .. }) => {
                debug!(event = %name, "ignoring unhandled event");
                Applied::Ignored
            }
        }
    }

    fn in_scope(&self, room_id: Option<&str>, kind: &'static str) -> bool {
        let Some(current) = self.room.current() else {
            debug!(kind, "event before joining a room");
            return false;
        };
        match room_id.filter(|id| !id.is_empty()) {
            Some(id) if id != current => {
                debug!(kind, room = id, current, "event for another room");
                false
            }
            _ => true,
        }
    }

    fn on_draw(&mut self, segment: &StrokeSegment) -> Applied {
        if !self.in_scope(Some(&segment.room_id), "draw") {
            return Applied::Ignored;
        }
        apply_segment(&mut self.surface, segment);
        Applied::Stroke
    }

    fn on_chat(&mut self, message: WireChatMessage) -> Applied {
        if !self.in_scope(message.room_id.as_deref(), "chat") {
            return Applied::Ignored;
        }
        Applied::Chat(self.chat.on_receive(message))
    }

    fn on_session(&mut self, session: &WireSession) -> Applied {
        let Some(replay) = self.bootstrap.accept(&mut self.surface, session) else {
            return Applied::Ignored;
        };
        let applied = Applied::Snapshot {
            strokes: replay.strokes,
            chats: replay.chats.len(),
            skipped: replay.skipped_strokes + replay.skipped_chats,
        };
        self.chat.load_history(replay.chats);
        info!(room = ?self.room.current(), ?applied, "session loaded");
        applied
    }

    // =========================================================================
    // ACCESSORS
    // =========================================================================

    #[must_use]
    pub fn surface(&self) -> &S {
        &self.surface
    }

    pub fn surface_mut(&mut self) -> &mut S {
        &mut self.surface
    }

    #[must_use]
    pub fn chat_log(&self) -> &ChatLog {
        self.chat.log()
    }

    #[must_use]
    pub fn chat(&self) -> &ChatRelay {
        &self.chat
    }

    #[must_use]
    pub fn identity(&self) -> &Identity {
        self.chat.identity()
    }

    #[must_use]
    pub fn is_stroking(&self) -> bool {
        self.draw.is_stroking()
    }
}
