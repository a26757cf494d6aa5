//! Local sender identity.

#[cfg(test)]
#[path = "identity_test.rs"]
mod identity_test;

use crate::chat::ChatMessage;

/// Display name used when nothing better is known.
pub const DEFAULT_DISPLAY_NAME: &str = "Me";

/// Who this client sends as. `stable_key` is the email when known and keys
/// both "is this me" and sender colors.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Identity {
    pub display_name: String,
    pub stable_key: String,
}

impl Default for Identity {
    fn default() -> Self {
        Self { display_name: DEFAULT_DISPLAY_NAME.to_owned(), stable_key: String::new() }
    }
}

impl Identity {
    /// Build an identity, falling back to the email's local part and then
    /// to [`DEFAULT_DISPLAY_NAME`] for the display name.
    #[must_use]
    pub fn new(display_name: Option<&str>, email: Option<&str>) -> Self {
        let email = email.map(str::trim).unwrap_or_default();
        let display_name = display_name
            .map(str::trim)
            .filter(|name| !name.is_empty())
            .or_else(|| email.split('@').next().filter(|local| !local.is_empty()))
            .unwrap_or(DEFAULT_DISPLAY_NAME);
        Self { display_name: display_name.to_owned(), stable_key: email.to_owned() }
    }

    #[must_use]
    pub fn from_email(email: &str) -> Self {
        Self::new(None, Some(email))
    }

    /// The email sent with chat messages; empty when unknown.
    #[must_use]
    pub fn email(&self) -> &str {
        &self.stable_key
    }

    /// Whether `message` was sent by this identity: same email when both
    /// have one, otherwise same display name on a message without email.
    #[must_use]
    pub fn is_own(&self, message: &ChatMessage) -> bool {
        if !self.stable_key.is_empty() && message.email == self.stable_key {
            return true;
        }
        !self.display_name.is_empty() && message.email.is_empty() && message.user == self.display_name
    }
}
