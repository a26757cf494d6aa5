//! Draw relay: pointer input to stroke segments, and stroke segments onto
//! a surface.
//!
//! Outbound segments go through a [`FrameThrottle`], so a burst of pointer
//! moves inside one frame leaves as a single motion segment at the latest
//! position. Pen transitions are never dropped.
//!
//! ERROR HANDLING
//! ==============
//! Input without a joined room or a live connection is ignored. A flush
//! that finds the connection gone discards the frame; a segment the
//! transport refuses is logged and skipped.

#[cfg(test)]
#[path = "draw_test.rs"]
mod draw_test;

use std::rc::Rc;

use canvas::geometry::Point;
use canvas::surface::{Brush, Surface};
use packets::events::{ClientEvent, StrokeSegment};
use tracing::{debug, warn};

use crate::config::EchoPolicy;
use crate::net::Transport;
use crate::throttle::{FrameScheduler, FrameThrottle};

/// Paint one segment: load the pen or eraser, then either extend the
/// current subpath to the segment's point or start a new one there.
pub fn apply_segment<S: Surface + ?Sized>(surface: &mut S, segment: &StrokeSegment) {
    Brush::for_mode(segment.is_erasing).apply_to(surface);
    let point = Point::new(segment.x, segment.y);
    if segment.is_drawing {
        surface.line_to(point);
        surface.stroke();
    } else {
        surface.begin_path();
        surface.move_to(point);
    }
}

/// Pointer state of a stroke in progress.
#[derive(Clone, Debug, PartialEq)]
struct ActiveStroke {
    room_id: String,
    last: Point,
}

pub struct DrawRelay {
    transport: Rc<dyn Transport>,
    scheduler: Rc<dyn FrameScheduler>,
    throttle: FrameThrottle,
    echo: EchoPolicy,
    active: Option<ActiveStroke>,
    erasing: bool,
}

impl DrawRelay {
    #[must_use]
    pub fn new(transport: Rc<dyn Transport>, scheduler: Rc<dyn FrameScheduler>, echo: EchoPolicy) -> Self {
        Self { transport, scheduler, throttle: FrameThrottle::new(), echo, active: None, erasing: false }
    }

    #[must_use]
    pub fn is_erasing(&self) -> bool {
        self.erasing
    }

    /// Whether a pointer is down.
    #[must_use]
    pub fn is_stroking(&self) -> bool {
        self.active.is_some()
    }

    #[must_use]
    pub fn echo_policy(&self) -> EchoPolicy {
        self.echo
    }

    /// Segments waiting for the next frame.
    #[must_use]
    pub fn pending(&self) -> &[StrokeSegment] {
        self.throttle.pending()
    }

    /// Switch between pen and eraser. Starts a fresh path on `surface` so
    /// the next segment does not extend one painted in the other mode.
    pub fn set_erasing<S: Surface + ?Sized>(&mut self, erasing: bool, surface: &mut S) {
        if self.erasing != erasing {
            debug!(erasing, "tool changed");
        }
        self.erasing = erasing;
        surface.begin_path();
    }

    /// Start a stroke at `position`.
    pub fn pointer_down(&mut self, room: Option<&str>, position: Point) {
        let Some(room_id) = room.filter(|r| !r.is_empty()) else {
            debug!("pointer down without a room");
            return;
        };
        if !self.transport.is_connected() {
            debug!("pointer down while disconnected");
            return;
        }
        let stroke = ActiveStroke { room_id: room_id.to_owned(), last: position };
        self.queue(&stroke, false);
        self.active = Some(stroke);
    }

    /// Extend the active stroke to `position`. Ignored while no pointer is
    /// down.
    pub fn pointer_move(&mut self, position: Point) {
        let Some(mut stroke) = self.active.take() else {
            return;
        };
        stroke.last = position;
        if self.transport.is_connected() {
            self.queue(&stroke, true);
        }
        self.active = Some(stroke);
    }

    /// End the active stroke at its last known position. Covers pointer
    /// up, cancel and leave.
    pub fn pointer_up(&mut self) {
        let Some(stroke) = self.active.take() else {
            return;
        };
        if self.transport.is_connected() {
            self.queue(&stroke, false);
        }
    }

    /// Forget any stroke in progress and anything queued, e.g. on leaving
    /// a room.
    pub fn reset(&mut self) {
        self.active = None;
        let dropped = self.throttle.take().len();
        if dropped > 0 {
            debug!(dropped, "dropped queued segments");
        }
    }

    fn queue(&mut self, stroke: &ActiveStroke, is_drawing: bool) {
        let segment = StrokeSegment {
            room_id: stroke.room_id.clone(),
            x: stroke.last.x,
            y: stroke.last.y,
            is_drawing,
            is_erasing: self.erasing,
        };
        self.throttle.push(segment, self.scheduler.as_ref());
    }

    /// Frame callback: emit everything queued for this frame. Returns the
    /// number of segments sent.
    pub fn on_frame<S: Surface + ?Sized>(&mut self, surface: &mut S) -> usize {
        let frame = self.throttle.take();
        if frame.is_empty() {
            return 0;
        }
        if !self.transport.is_connected() {
            debug!(dropped = frame.len(), "connection gone, dropping frame");
            return 0;
        }

        let mut sent = 0;
        for segment in frame {
            if let Err(error) = self.transport.emit(&ClientEvent::Draw(segment.clone())) {
                warn!(%error, "draw segment not sent");
                continue;
            }
            sent += 1;
            if self.echo == EchoPolicy::ApplyLocally {
                apply_segment(surface, &segment);
            }
        }
        sent
    }
}
