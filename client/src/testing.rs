//! In-memory doubles for the transport and frame seams.

use std::cell::{Cell, RefCell};

use packets::events::ClientEvent;

use crate::net::{Transport, TransportError};
use crate::throttle::FrameScheduler;

/// Records every event emitted while connected.
#[derive(Debug)]
pub struct FakeTransport {
    connected: Cell<bool>,
    fail_emits: Cell<bool>,
    sent: RefCell<Vec<ClientEvent>>,
}

impl FakeTransport {
    pub fn connected() -> Self {
        Self { connected: Cell::new(true), fail_emits: Cell::new(false), sent: RefCell::new(Vec::new()) }
    }

    pub fn disconnected() -> Self {
        let transport = Self::connected();
        transport.connected.set(false);
        transport
    }

    pub fn set_connected(&self, connected: bool) {
        self.connected.set(connected);
    }

    /// Make `emit` fail while still reporting connected.
    pub fn set_fail_emits(&self, fail: bool) {
        self.fail_emits.set(fail);
    }

    pub fn sent(&self) -> Vec<ClientEvent> {
        self.sent.borrow().clone()
    }

    pub fn take(&self) -> Vec<ClientEvent> {
        std::mem::take(&mut *self.sent.borrow_mut())
    }
}

impl Transport for FakeTransport {
    fn is_connected(&self) -> bool {
        self.connected.get()
    }

    fn emit(&self, event: &ClientEvent) -> Result<(), TransportError> {
        if !self.connected.get() || self.fail_emits.get() {
            return Err(TransportError::NotConnected);
        }
        event.to_packet()?;
        self.sent.borrow_mut().push(event.clone());
        Ok(())
    }
}

/// Counts frame requests.
#[derive(Debug, Default)]
pub struct FakeScheduler {
    requests: Cell<usize>,
}

impl FakeScheduler {
    pub fn requests(&self) -> usize {
        self.requests.get()
    }
}

impl FrameScheduler for FakeScheduler {
    fn request_frame(&self) {
        self.requests.set(self.requests.get() + 1);
    }
}
