//! Short text labels shown next to chat bubbles.

#[cfg(test)]
#[path = "label_test.rs"]
mod label_test;

use time::OffsetDateTime;
use time::format_description::well_known::Rfc3339;
use time::macros::format_description;

/// Avatar initials: first letters of up to two words of the name, or of
/// the local part of an email. `"U"` when nothing usable remains.
#[must_use]
pub fn initials(name_or_email: &str) -> String {
    let base = name_or_email.split('@').next().unwrap_or_default();
    let cleaned: String =
        base.chars().map(|c| if c.is_ascii_alphanumeric() { c } else { ' ' }).collect();
    let letters: String = cleaned
        .split_whitespace()
        .take(2)
        .filter_map(|word| word.chars().next())
        .map(|c| c.to_ascii_uppercase())
        .collect();
    if letters.is_empty() { "U".to_owned() } else { letters }
}

/// `HH:MM` of an RFC 3339 timestamp, in the offset it was written with.
/// Empty when the timestamp does not parse.
#[must_use]
pub fn time_label(timestamp: &str) -> String {
    let Ok(at) = OffsetDateTime::parse(timestamp, &Rfc3339) else {
        return String::new();
    };
    match at.format(format_description!("[hour]:[minute]")) {
        Ok(label) => label,
        Err(_) => String::new(),
    }
}
