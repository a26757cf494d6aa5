//! Session bootstrap: the one-time snapshot a server sends after a join.
//!
//! Snapshot strokes replay through [`apply_segment`], the same path live
//! segments take, inside one `save`/`restore` pair. Entries that do not
//! decode are skipped; a partial snapshot still loads.

#[cfg(test)]
#[path = "bootstrap_test.rs"]
mod bootstrap_test;

use canvas::surface::Surface;
use packets::events::{StrokeSegment, WireChatMessage, WireSession};
use serde::Deserialize;
use serde_json::Value;
use tracing::{debug, warn};

use crate::chat::ChatMessage;
use crate::draw::apply_segment;

/// Gate that lets exactly one snapshot through per join.
#[derive(Debug, Default)]
pub struct SessionBootstrap {
    armed: bool,
}

impl SessionBootstrap {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Expect a snapshot; called on join and create.
    pub fn arm(&mut self) {
        self.armed = true;
    }

    #[must_use]
    pub fn is_armed(&self) -> bool {
        self.armed
    }

    /// Replay `session` onto `surface` if a snapshot is expected, and
    /// disarm. Returns `None` for an unsolicited snapshot.
    pub fn accept<S: Surface + ?Sized>(&mut self, surface: &mut S, session: &WireSession) -> Option<Replay> {
        if !self.armed {
            warn!(
                drawings = session.drawings.len(),
                chats = session.chats.len(),
                "ignoring unsolicited session snapshot"
            );
            return None;
        }
        self.armed = false;
        Some(replay_snapshot(surface, session))
    }
}

/// Outcome of one snapshot replay.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Replay {
    pub strokes: usize,
    pub skipped_strokes: usize,
    /// Normalized history, in snapshot order.
    pub chats: Vec<ChatMessage>,
    pub skipped_chats: usize,
}

/// Replay every decodable stroke in order and normalize every decodable
/// chat entry.
pub fn replay_snapshot<S: Surface + ?Sized>(surface: &mut S, session: &WireSession) -> Replay {
    let mut replay = Replay::default();

    surface.save();
    for (index, entry) in session.drawings.iter().enumerate() {
        match decode_stroke(entry) {
            Some(segment) => {
                apply_segment(surface, &segment);
                replay.strokes += 1;
            }
            None => {
                warn!(index, "skipping undecodable snapshot stroke");
                replay.skipped_strokes += 1;
            }
        }
    }
    surface.restore();

    for (index, entry) in session.chats.iter().enumerate() {
        match WireChatMessage::deserialize(entry) {
            Ok(wire) => replay.chats.push(ChatMessage::normalize(wire)),
            Err(error) => {
                warn!(index, %error, "skipping undecodable snapshot chat");
                replay.skipped_chats += 1;
            }
        }
    }

    debug!(
        strokes = replay.strokes,
        chats = replay.chats.len(),
        skipped = replay.skipped_strokes + replay.skipped_chats,
        "snapshot replayed"
    );
    replay
}

fn decode_stroke(entry: &Value) -> Option<StrokeSegment> {
    let segment = match StrokeSegment::deserialize(entry) {
        Ok(segment) => segment,
        Err(error) => {
            debug!(%error, "stroke entry does not decode");
            return None;
        }
    };
    (segment.x.is_finite() && segment.y.is_finite()).then_some(segment)
}
