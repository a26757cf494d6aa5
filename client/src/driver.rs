//! Single-task event loop.
//!
//! [`run`] owns the only `&mut Whiteboard` and multiplexes three sources
//! with `tokio::select!`: connection events, host commands, and the
//! [`FrameClock`] deadline. Callbacks never overlap.

#[cfg(test)]
#[path = "driver_test.rs"]
mod driver_test;

use canvas::geometry::Point;
use canvas::surface::Surface;
use tokio::sync::mpsc;
use tokio::time::{Instant, sleep_until};
use tracing::{debug, info, warn};

use crate::frame::FrameClock;
use crate::net::{ConnectionEvent, Incoming};
use crate::room::RoomError;
use crate::whiteboard::{Applied, Whiteboard};

/// Host input fed to the loop.
#[derive(Clone, Debug, PartialEq)]
pub enum Command {
    PointerDown(Point),
    PointerMove(Point),
    /// Pointer up, cancel or leave.
    PointerUp,
    SetErasing(bool),
    Compose(String),
    SendChat,
    Join(String),
    Create,
    /// Flush the pending frame and stop.
    Close,
}

/// What one turn of the loop did, reported to the observer.
#[derive(Debug)]
pub enum Step {
    Applied(Applied),
    Joined(String),
    RoomFailed(RoomError),
    ChatSent(bool),
    Input,
    Frame { sent: usize },
}

/// Why [`run`] returned.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum RunExit {
    Closed,
    CommandsClosed,
    Disconnected { reason: String },
}

/// Drive `whiteboard` until a `Close` command, the end of the command
/// stream, or a disconnect. `observe` sees the whiteboard after every step.
pub async fn run<S, F>(
    whiteboard: &mut Whiteboard<S>,
    clock: &FrameClock,
    incoming: &mut Incoming,
    commands: &mut mpsc::UnboundedReceiver<Command>,
    mut observe: F,
) -> RunExit
where
    S: Surface,
    F: FnMut(&Whiteboard<S>, &Step),
{
    loop {
        let deadline = clock.deadline();
        tokio::select! {
            event = incoming.recv() => {
                let Some(event) = event else {
                    return RunExit::Disconnected { reason: "event stream ended".to_owned() };
                };
                let reason = match &event {
                    ConnectionEvent::Disconnected { reason } => Some(reason.clone()),
                    _ => None,
                };
                let applied = whiteboard.handle(event);
                observe(whiteboard, &Step::Applied(applied));
                if let Some(reason) = reason {
                    clock.clear();
                    return RunExit::Disconnected { reason };
                }
            }
            command = commands.recv() => match command {
                Some(Command::Close) => {
                    flush(whiteboard, clock, &mut observe);
                    info!("closing");
                    return RunExit::Closed;
                }
                Some(command) => {
                    let step = execute(whiteboard, command);
                    observe(whiteboard, &step);
                }
                None => {
                    flush(whiteboard, clock, &mut observe);
                    debug!("command stream ended");
                    return RunExit::CommandsClosed;
                }
            },
            () = sleep_until(deadline.unwrap_or_else(Instant::now)), if deadline.is_some() => {
                flush(whiteboard, clock, &mut observe);
            }
        }
    }
}

fn flush<S, F>(whiteboard: &mut Whiteboard<S>, clock: &FrameClock, observe: &mut F)
where
    S: Surface,
    F: FnMut(&Whiteboard<S>, &Step),
{
    clock.clear();
    let sent = whiteboard.on_frame();
    if sent > 0 {
        observe(whiteboard, &Step::Frame { sent });
    }
}

fn execute<S: Surface>(whiteboard: &mut Whiteboard<S>, command: Command) -> Step {
    match command {
        Command::PointerDown(at) => whiteboard.pointer_down(at),
        Command::PointerMove(at) => whiteboard.pointer_move(at),
        Command::PointerUp => whiteboard.pointer_up(),
        Command::SetErasing(erasing) => whiteboard.set_erasing(erasing),
        Command::Compose(text) => whiteboard.set_compose(text),
        Command::SendChat => return Step::ChatSent(whiteboard.send_chat()),
        Command::Join(room_id) => return room_step(whiteboard.join(&room_id)),
        Command::Create => return room_step(whiteboard.create()),
        Command::Close => {}
    }
    Step::Input
}

fn room_step(result: Result<String, RoomError>) -> Step {
    match result {
        Ok(room_id) => Step::Joined(room_id),
        Err(error) => {
            warn!(%error, "room change failed");
            Step::RoomFailed(error)
        }
    }
}
