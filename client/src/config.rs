//! Runtime configuration, loaded from environment variables.

#[cfg(test)]
#[path = "config_test.rs"]
mod config_test;

use std::str::FromStr;
use std::time::Duration;

use tracing::warn;

use crate::net::ConnectError;

pub const DEFAULT_BASE_URL: &str = "http://localhost:5000";
pub const DEFAULT_CONNECT_TIMEOUT: Duration = Duration::from_millis(5000);
/// One rendering frame at 60 Hz.
pub const DEFAULT_FRAME_INTERVAL: Duration = Duration::from_millis(16);

/// Socket.IO handshake path with the Engine.IO v4 websocket transport.
const SOCKET_PATH: &str = "/socket.io/?EIO=4&transport=websocket";

/// Whether local strokes are painted when flushed or when echoed back.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum EchoPolicy {
    /// Emit only; paint when the server broadcasts the segment back.
    #[default]
    ApplyOnReceipt,
    /// Paint on flush as well as on receipt, for servers that do not echo
    /// to the sender.
    ApplyLocally,
}

#[derive(Debug, thiserror::Error)]
#[error("unknown echo policy `{0}`; expected `receipt` or `local`")]
pub struct ParseEchoPolicyError(String);

impl FromStr for EchoPolicy {
    type Err = ParseEchoPolicyError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "receipt" | "apply-on-receipt" => Ok(Self::ApplyOnReceipt),
            "local" | "apply-locally" => Ok(Self::ApplyLocally),
            _ => Err(ParseEchoPolicyError(s.to_owned())),
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ClientConfig {
    /// HTTP base URL of the backend (e.g. `"http://localhost:5000"`).
    pub base_url: String,
    /// Upper bound on the websocket + Socket.IO handshake.
    pub connect_timeout: Duration,
    /// Delay between a frame request and its callback.
    pub frame_interval: Duration,
    pub echo_policy: EchoPolicy,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_owned(),
            connect_timeout: DEFAULT_CONNECT_TIMEOUT,
            frame_interval: DEFAULT_FRAME_INTERVAL,
            echo_policy: EchoPolicy::default(),
        }
    }
}

impl ClientConfig {
    /// Load config from `DRAWSYNC_*` environment variables with defaults.
    #[must_use]
    pub fn from_env() -> Self {
        Self::from_lookup(|key| match std::env::var(key) {
            Ok(value) => Some(value),
            Err(_) => None,
        })
    }

    /// Load config from an arbitrary key lookup. Unparsable values are
    /// logged and replaced by their defaults.
    #[must_use]
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let defaults = Self::default();
        let get = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        let base_url = get("DRAWSYNC_BASE_URL").unwrap_or(defaults.base_url);
        let connect_timeout = get("DRAWSYNC_CONNECT_TIMEOUT_MS")
            .and_then(|raw| parse_millis("DRAWSYNC_CONNECT_TIMEOUT_MS", &raw))
            .unwrap_or(defaults.connect_timeout);
        let frame_interval = get("DRAWSYNC_FRAME_INTERVAL_MS")
            .and_then(|raw| parse_millis("DRAWSYNC_FRAME_INTERVAL_MS", &raw))
            .unwrap_or(defaults.frame_interval);
        let echo_policy = match get("DRAWSYNC_ECHO").map(|raw| raw.parse::<EchoPolicy>()) {
            Some(Ok(policy)) => policy,
            Some(Err(err)) => {
                warn!(%err, "ignoring DRAWSYNC_ECHO");
                defaults.echo_policy
            }
            None => defaults.echo_policy,
        };

        Self { base_url, connect_timeout, frame_interval, echo_policy }
    }

    /// Websocket URL of the Socket.IO endpoint behind `base_url`.
    ///
    /// # Errors
    ///
    /// Returns [`ConnectError::InvalidBaseUrl`] unless the base URL is
    /// `http://` or `https://`.
    pub fn socket_url(&self) -> Result<String, ConnectError> {
        let base = self.base_url.trim().trim_end_matches('/');
        if let Some(rest) = base.strip_prefix("http://") {
            return Ok(format!("ws://{rest}{SOCKET_PATH}"));
        }
        if let Some(rest) = base.strip_prefix("https://") {
            return Ok(format!("wss://{rest}{SOCKET_PATH}"));
        }
        Err(ConnectError::InvalidBaseUrl(self.base_url.clone()))
    }

    /// Absolute URL of a REST endpoint.
    #[must_use]
    pub fn api_url(&self, path: &str) -> String {
        format!("{}{path}", self.base_url.trim().trim_end_matches('/'))
    }
}

fn parse_millis(key: &str, raw: &str) -> Option<Duration> {
    match raw.trim().parse::<u64>() {
        Ok(ms) => Some(Duration::from_millis(ms)),
        Err(err) => {
            warn!(key, raw, %err, "ignoring non-numeric duration");
            None
        }
    }
}
