//! Client core for the shared whiteboard.
//!
//! SYSTEM CONTEXT
//! ==============
//! A [`net::socket::open`] call yields a [`net::Connection`] (the
//! [`net::Transport`] every relay emits through) and an
//! [`net::Incoming`] stream of [`net::ConnectionEvent`]s. A
//! [`whiteboard::Whiteboard`] owns the room session, both relays, the
//! snapshot bootstrap and the drawing surface, and [`driver::run`] feeds it
//! connection events, host commands and frame callbacks from one task.
//!
//! ## Module layout
//!
//! | Module | Role |
//! |--------|------|
//! | [`config`] | `ClientConfig` loaded from the environment, echo policy |
//! | [`identity`] | Local sender identity and the "is this me" rule |
//! | [`room`] | Join/create against a named room |
//! | [`throttle`] | Per-frame trailing-edge coalescing of stroke segments |
//! | [`draw`] | Pointer input to stroke segments, segment replay onto a surface |
//! | [`chat`] | Chat relay, normalized messages, append-only log |
//! | [`bootstrap`] | One-shot session snapshot replay after a join |
//! | [`whiteboard`] | Composite that dispatches connection events |
//! | [`frame`] | `FrameClock`, the next-frame primitive |
//! | [`driver`] | Single-task event loop |
//! | [`net`] | Transport trait, websocket connector, REST login |
//! | [`util`] | Sender colors and chat labels |

pub mod bootstrap;
pub mod chat;
pub mod config;
pub mod draw;
pub mod driver;
pub mod frame;
pub mod identity;
pub mod net;
pub mod room;
pub mod throttle;
pub mod util;
pub mod whiteboard;

#[cfg(test)]
mod testing;

pub use config::{ClientConfig, EchoPolicy};
pub use identity::Identity;
pub use net::api::ApiError;
pub use net::{ConnectError, Connection, ConnectionEvent, Incoming, Transport, TransportError};
pub use room::RoomError;
pub use whiteboard::Whiteboard;
