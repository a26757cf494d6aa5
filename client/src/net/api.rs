//! REST helpers for the backend's auth endpoint.
//!
//! ERROR HANDLING
//! ==============
//! Transport failures surface as [`ApiError::Http`]; a non-success status
//! becomes [`ApiError::Rejected`] carrying the server's `message` when it
//! sent one.

#[cfg(test)]
#[path = "api_test.rs"]
mod api_test;

use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::{debug, info};

use crate::config::ClientConfig;
use crate::identity::Identity;

pub const LOGIN_PATH: &str = "/api/login";

/// Shown when a rejected login carries no message of its own.
const LOGIN_REJECTED_FALLBACK: &str = "Invalid email or password";

#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    #[error("http request failed: {0}")]
    Http(#[from] reqwest::Error),
    #[error("{message} (HTTP {status})")]
    Rejected { status: u16, message: String },
    #[error("unexpected response body: {0}")]
    InvalidBody(#[from] serde_json::Error),
}

#[derive(Debug, Serialize)]
struct LoginRequest<'a> {
    email: &'a str,
    password: &'a str,
}

#[derive(Clone, Debug, Default, PartialEq, Eq, Deserialize)]
pub struct LoginUser {
    #[serde(default)]
    pub email: String,
    /// Display name, when the backend sends one.
    #[serde(default, alias = "name")]
    pub username: Option<String>,
}

#[derive(Clone, Debug, PartialEq, Eq, Deserialize)]
pub struct LoginResponse {
    pub token: String,
    #[serde(default)]
    pub user: LoginUser,
}

impl LoginResponse {
    /// Sender identity for chat, falling back to the login email.
    #[must_use]
    pub fn identity(&self, fallback_email: &str) -> Identity {
        let email = if self.user.email.is_empty() { fallback_email } else { &self.user.email };
        Identity::new(self.user.username.as_deref(), Some(email))
    }
}

/// Exchange credentials for an auth token via `POST /api/login`.
///
/// # Errors
///
/// Returns [`ApiError::Rejected`] for a non-success status, [`ApiError::Http`]
/// if the request fails, and [`ApiError::InvalidBody`] if a success response
/// has no token.
pub async fn login(config: &ClientConfig, email: &str, password: &str) -> Result<LoginResponse, ApiError> {
    let url = config.api_url(LOGIN_PATH);
    debug!(%url, "login");
    let response = reqwest::Client::new()
        .post(&url)
        .json(&LoginRequest { email, password })
        .send()
        .await?;

    let status = response.status();
    let body = response.json::<Value>().await.unwrap_or(Value::Null);
    if !status.is_success() {
        return Err(ApiError::Rejected { status: status.as_u16(), message: rejection_message(&body) });
    }

    let login = serde_json::from_value::<LoginResponse>(body)?;
    info!(email = %login.user.email, "logged in");
    Ok(login)
}

fn rejection_message(body: &Value) -> String {
    body.get("message")
        .and_then(Value::as_str)
        .filter(|message| !message.is_empty())
        .unwrap_or(LOGIN_REJECTED_FALLBACK)
        .to_owned()
}
