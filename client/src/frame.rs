//! `FrameClock`: the "run on next frame" primitive for a tokio host.
//!
//! A request arms a one-shot deadline one frame interval out; further
//! requests before it fires are folded into it. The driver sleeps until the
//! deadline and clears it before calling the frame callback.

#[cfg(test)]
#[path = "frame_test.rs"]
mod frame_test;

use std::cell::Cell;
use std::rc::Rc;
use std::time::Duration;

use tokio::time::Instant;

use crate::throttle::FrameScheduler;

/// Clones share one deadline.
#[derive(Clone, Debug)]
pub struct FrameClock {
    interval: Duration,
    deadline: Rc<Cell<Option<Instant>>>,
}

impl FrameClock {
    #[must_use]
    pub fn new(interval: Duration) -> Self {
        Self { interval, deadline: Rc::new(Cell::new(None)) }
    }

    #[must_use]
    pub fn interval(&self) -> Duration {
        self.interval
    }

    /// When the pending frame is due, if one was requested.
    #[must_use]
    pub fn deadline(&self) -> Option<Instant> {
        self.deadline.get()
    }

    /// Mark the pending frame as fired.
    pub fn clear(&self) {
        self.deadline.set(None);
    }
}

impl FrameScheduler for FrameClock {
    fn request_frame(&self) {
        if self.deadline.get().is_none() {
            self.deadline.set(Some(Instant::now() + self.interval));
        }
    }
}
