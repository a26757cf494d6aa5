//! Socket.IO connector over a plain websocket.
//!
//! `open` performs the Engine.IO/Socket.IO handshake on the caller's task,
//! then hands the socket to a background pump. The pump only moves packets:
//! it answers pings, forwards queued outbound text and decodes inbound
//! events into [`ConnectionEvent`]s. It never touches relay state.
//!
//! ERROR HANDLING
//! ==============
//! Handshake failures surface as [`ConnectError`]. After the handshake,
//! undecodable packets are logged and dropped; the connection only ends on
//! close, server disconnect or ping timeout, reported once as
//! [`ConnectionEvent::Disconnected`].

#[cfg(test)]
#[path = "socket_test.rs"]
mod socket_test;

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;

use futures_util::{SinkExt, StreamExt};
use packets::events::{ClientEvent, ServerEvent};
use packets::{
    DEFAULT_NAMESPACE, EnginePacket, OpenHandshake, SocketPacket, decode_engine, decode_socket,
    encode_engine, encode_message,
};
use serde_json::{Value, json};
use tokio::net::TcpStream;
use tokio::sync::{mpsc, watch};
use tokio::time::{Instant, sleep_until, timeout};
use tokio_tungstenite::tungstenite::{self, Message};
use tokio_tungstenite::{MaybeTlsStream, WebSocketStream, connect_async};
use tracing::{debug, info, warn};

use super::{ConnectError, ConnectionEvent, Transport, TransportError};
use crate::config::ClientConfig;

type WsStream = WebSocketStream<MaybeTlsStream<TcpStream>>;

/// How long `close` waits for the pump to say goodbye.
const CLOSE_GRACE: Duration = Duration::from_secs(1);

#[derive(Debug)]
enum Outbound {
    Text(String),
    Close,
}

/// Handle to an open connection. Clones share the same socket.
#[derive(Clone, Debug)]
pub struct Connection {
    sid: Arc<str>,
    outbound: mpsc::UnboundedSender<Outbound>,
    connected: Arc<AtomicBool>,
    finished: watch::Receiver<bool>,
}

impl Connection {
    /// Socket.IO socket id assigned by the server.
    #[must_use]
    pub fn sid(&self) -> &str {
        &self.sid
    }
}

impl Transport for Connection {
    fn is_connected(&self) -> bool {
        self.connected.load(Ordering::Acquire)
    }

    fn emit(&self, event: &ClientEvent) -> Result<(), TransportError> {
        if !self.is_connected() {
            return Err(TransportError::NotConnected);
        }
        let text = encode_message(&event.to_packet()?);
        debug!(event = event.name(), room = event.room_id(), "emit");
        self.outbound
            .send(Outbound::Text(text))
            .map_err(|_| TransportError::NotConnected)
    }
}

/// Inbound half of a connection.
#[derive(Debug)]
pub struct Incoming {
    rx: mpsc::UnboundedReceiver<ConnectionEvent>,
}

impl Incoming {
    /// An event stream fed by hand, for hosts that run their own socket.
    #[must_use]
    pub fn channel() -> (mpsc::UnboundedSender<ConnectionEvent>, Self) {
        let (tx, rx) = mpsc::unbounded_channel();
        (tx, Self { rx })
    }

    /// Next event, or `None` after `Disconnected` has been delivered.
    pub async fn recv(&mut self) -> Option<ConnectionEvent> {
        self.rx.recv().await
    }
}

/// Connect to the Socket.IO endpoint behind `config.base_url`, sending
/// `token` as the CONNECT auth payload.
///
/// The first event on the returned [`Incoming`] is always
/// [`ConnectionEvent::Connected`].
///
/// # Errors
///
/// Returns [`ConnectError`] if the URL is invalid, the websocket cannot be
/// opened, the server refuses the namespace, or the handshake does not
/// finish within `config.connect_timeout`.
pub async fn open(config: &ClientConfig, token: &str) -> Result<(Connection, Incoming), ConnectError> {
    let url = config.socket_url()?;
    let (stream, handshake, sid) = timeout(config.connect_timeout, handshake(&url, token))
        .await
        .map_err(|_| ConnectError::Timeout)??;
    info!(%sid, engine_sid = %handshake.sid, "connected");

    let connected = Arc::new(AtomicBool::new(true));
    let (out_tx, out_rx) = mpsc::unbounded_channel();
    let (in_tx, in_rx) = mpsc::unbounded_channel();
    let (done_tx, done_rx) = watch::channel(false);

    if in_tx.send(ConnectionEvent::Connected { sid: sid.clone() }).is_err() {
        debug!("event receiver dropped before connect");
    }

    let pump = Pump {
        stream,
        outbound: out_rx,
        events: in_tx,
        connected: Arc::clone(&connected),
        done: done_tx,
        liveness: Duration::from_millis(handshake.ping_interval.saturating_add(handshake.ping_timeout)),
    };
    tokio::spawn(pump.run());

    let connection = Connection { sid: sid.into(), outbound: out_tx, connected, finished: done_rx };
    Ok((connection, Incoming { rx: in_rx }))
}

/// Disconnect from the namespace and close the websocket.
///
/// Events already queued are sent before the DISCONNECT packet. Every clone
/// of the connection reports `is_connected() == false` afterwards.
pub async fn close(connection: Connection) {
    connection.connected.store(false, Ordering::Release);
    if connection.outbound.send(Outbound::Close).is_err() {
        debug!("pump already stopped");
    }
    let mut finished = connection.finished.clone();
    match timeout(CLOSE_GRACE, finished.wait_for(|done| *done)).await {
        Ok(Ok(_)) => debug!("closed"),
        Ok(Err(_)) => debug!("pump dropped without signalling"),
        Err(_) => warn!("pump did not stop within {CLOSE_GRACE:?}"),
    }
}

async fn handshake(url: &str, token: &str) -> Result<(WsStream, OpenHandshake, String), ConnectError> {
    let (mut stream, _) = connect_async(url)
        .await
        .map_err(|error| ConnectError::WsConnect(Box::new(error)))?;

    let open = match next_engine(&mut stream).await? {
        EnginePacket::Open(open) => open,
        other => return Err(ConnectError::UnexpectedPacket(encode_engine(&other))),
    };
    debug!(sid = %open.sid, ping_interval = open.ping_interval, ping_timeout = open.ping_timeout, "engine open");

    let connect = SocketPacket::Connect {
        namespace: DEFAULT_NAMESPACE.to_owned(),
        data: Some(json!({ "token": token })),
    };
    send_text(&mut stream, encode_message(&connect))
        .await
        .map_err(|error| ConnectError::WsConnect(Box::new(error)))?;

    loop {
        match next_engine(&mut stream).await? {
            EnginePacket::Message(text) => match decode_socket(&text)? {
                SocketPacket::Connect { data, .. } => {
                    let sid = data
                        .as_ref()
                        .and_then(|d| d.get("sid"))
                        .and_then(Value::as_str)
                        .map_or_else(|| open.sid.clone(), ToOwned::to_owned);
                    return Ok((stream, open, sid));
                }
                SocketPacket::ConnectError { data, .. } => {
                    return Err(ConnectError::Rejected { message: rejection_message(&data) });
                }
                other => debug!(?other, "ignoring packet before connect"),
            },
            EnginePacket::Ping(probe) => {
                send_text(&mut stream, encode_engine(&EnginePacket::Pong(probe)))
                    .await
                    .map_err(|error| ConnectError::WsConnect(Box::new(error)))?;
            }
            EnginePacket::Close => return Err(ConnectError::Closed),
            EnginePacket::Noop | EnginePacket::Pong(_) => {}
            other => return Err(ConnectError::UnexpectedPacket(encode_engine(&other))),
        }
    }
}

async fn next_engine(stream: &mut WsStream) -> Result<EnginePacket, ConnectError> {
    loop {
        let Some(message) = stream.next().await else {
            return Err(ConnectError::Closed);
        };
        match message.map_err(|error| ConnectError::WsConnect(Box::new(error)))? {
            Message::Text(text) => return Ok(decode_engine(text.as_str())?),
            Message::Close(_) => return Err(ConnectError::Closed),
            _ => {}
        }
    }
}

async fn send_text(stream: &mut WsStream, text: String) -> Result<(), tungstenite::Error> {
    stream.send(Message::Text(text.into())).await
}

/// Human-readable reason from a CONNECT_ERROR payload.
fn rejection_message(data: &Value) -> String {
    match data {
        Value::String(message) => message.clone(),
        _ => data
            .get("message")
            .and_then(Value::as_str)
            .map_or_else(|| data.to_string(), ToOwned::to_owned),
    }
}

enum Flow {
    Continue,
    /// A ping arrived; push the liveness deadline out.
    Alive,
    Stop(String),
}

struct Pump {
    stream: WsStream,
    outbound: mpsc::UnboundedReceiver<Outbound>,
    events: mpsc::UnboundedSender<ConnectionEvent>,
    connected: Arc<AtomicBool>,
    done: watch::Sender<bool>,
    /// `pingInterval + pingTimeout`: silence longer than this is a dead peer.
    liveness: Duration,
}

impl Pump {
    async fn run(mut self) {
        let reason = self.pump().await;
        self.connected.store(false, Ordering::Release);
        info!(%reason, "disconnected");
        if self.events.send(ConnectionEvent::Disconnected { reason }).is_err() {
            debug!("event receiver dropped");
        }
        self.done.send_modify(|done| *done = true);
    }

    async fn pump(&mut self) -> String {
        let mut deadline = Instant::now() + self.liveness;
        loop {
            tokio::select! {
                message = self.stream.next() => {
                    let flow = match message {
                        None => Flow::Stop("transport closed".to_owned()),
                        Some(Err(error)) => Flow::Stop(format!("transport error: {error}")),
                        Some(Ok(Message::Text(text))) => self.on_text(text.as_str()).await,
                        Some(Ok(Message::Close(_))) => Flow::Stop("transport closed".to_owned()),
                        Some(Ok(_)) => Flow::Continue,
                    };
                    match flow {
                        Flow::Continue => {}
                        Flow::Alive => deadline = Instant::now() + self.liveness,
                        Flow::Stop(reason) => return reason,
                    }
                }
                command = self.outbound.recv() => match command {
                    Some(Outbound::Text(text)) => {
                        if let Err(error) = send_text(&mut self.stream, text).await {
                            return format!("send failed: {error}");
                        }
                    }
                    Some(Outbound::Close) | None => {
                        self.shutdown().await;
                        return "client disconnect".to_owned();
                    }
                },
                () = sleep_until(deadline) => return "ping timeout".to_owned(),
            }
        }
    }

    async fn on_text(&mut self, text: &str) -> Flow {
        let packet = match decode_engine(text) {
            Ok(packet) => packet,
            Err(error) => {
                warn!(%error, "dropping undecodable engine packet");
                return Flow::Continue;
            }
        };
        match packet {
            EnginePacket::Ping(probe) => {
                match send_text(&mut self.stream, encode_engine(&EnginePacket::Pong(probe))).await {
                    Ok(()) => Flow::Alive,
                    Err(error) => Flow::Stop(format!("send failed: {error}")),
                }
            }
            EnginePacket::Message(payload) => self.on_socket(&payload),
            EnginePacket::Close => Flow::Stop("server closed".to_owned()),
            EnginePacket::Open(_) | EnginePacket::Pong(_) | EnginePacket::Upgrade | EnginePacket::Noop => {
                Flow::Continue
            }
        }
    }

    fn on_socket(&self, payload: &str) -> Flow {
        let packet = match decode_socket(payload) {
            Ok(packet) => packet,
            Err(error) => {
                warn!(%error, "dropping undecodable socket packet");
                return Flow::Continue;
            }
        };
        if packet.namespace() != DEFAULT_NAMESPACE {
            debug!(namespace = packet.namespace(), "ignoring packet for other namespace");
            return Flow::Continue;
        }
        match packet {
            SocketPacket::Event { name, args, .. } => {
                match ServerEvent::from_event(&name, args) {
                    Ok(event) => {
                        debug!(event = %name, "recv");
                        if self.events.send(ConnectionEvent::Event(event)).is_err() {
                            debug!("event receiver dropped");
                        }
                    }
                    Err(error) => warn!(%error, "dropping malformed event"),
                }
                Flow::Continue
            }
            SocketPacket::Disconnect { .. } => Flow::Stop("server disconnect".to_owned()),
            SocketPacket::ConnectError { data, .. } => {
                Flow::Stop(format!("server rejected: {}", rejection_message(&data)))
            }
            other => {
                debug!(?other, "ignoring packet");
                Flow::Continue
            }
        }
    }

    async fn shutdown(&mut self) {
        let disconnect = SocketPacket::Disconnect { namespace: DEFAULT_NAMESPACE.to_owned() };
        for text in [encode_message(&disconnect), encode_engine(&EnginePacket::Close)] {
            if let Err(error) = send_text(&mut self.stream, text).await {
                debug!(%error, "close packet not sent");
                return;
            }
        }
        if let Err(error) = self.stream.close(None).await {
            debug!(%error, "websocket close failed");
        }
    }
}
