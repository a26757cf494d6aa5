//! Per-frame trailing-edge coalescing of outbound stroke segments.
//!
//! Segments queue until the next frame callback. Pen transitions
//! (`is_drawing == false`) are never dropped; a motion segment replaces a
//! motion segment queued right before it for the same room and erase mode,
//! so each frame carries at most one motion per run of moves, at the latest
//! position.

#[cfg(test)]
#[path = "throttle_test.rs"]
mod throttle_test;

use packets::events::StrokeSegment;

/// The "run on next frame" primitive.
pub trait FrameScheduler {
    /// Ask for one frame callback. Repeated requests before the callback
    /// fires are harmless.
    fn request_frame(&self);
}

#[derive(Debug, Default)]
pub struct FrameThrottle {
    queue: Vec<StrokeSegment>,
    requested: bool,
}

impl FrameThrottle {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Queue `segment` for the next frame, requesting one if none is pending.
    pub fn push(&mut self, segment: StrokeSegment, scheduler: &dyn FrameScheduler) {
        match self.queue.last_mut() {
            Some(last) if supersedes(last, &segment) => *last = segment,
            _ => self.queue.push(segment),
        }
        if !self.requested {
            self.requested = true;
            scheduler.request_frame();
        }
    }

    /// Drain everything queued for this frame.
    pub fn take(&mut self) -> Vec<StrokeSegment> {
        self.requested = false;
        std::mem::take(&mut self.queue)
    }

    #[must_use]
    pub fn is_pending(&self) -> bool {
        !self.queue.is_empty()
    }

    #[must_use]
    pub fn pending(&self) -> &[StrokeSegment] {
        &self.queue
    }
}

fn supersedes(queued: &StrokeSegment, next: &StrokeSegment) -> bool {
    queued.is_drawing
        && next.is_drawing
        && queued.is_erasing == next.is_erasing
        && queued.room_id == next.room_id
}
