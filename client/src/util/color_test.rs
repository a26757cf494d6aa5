use std::collections::HashSet;

use super::*;

#[test]
fn sender_hash_matches_reference_values() {
    assert_eq!(sender_hash(""), 0);
    assert_eq!(sender_hash("a"), 97);
    assert_eq!(sender_hash("ab"), 3105);
    assert_eq!(sender_hash("ann@example.com"), 239_517_470);
}

#[test]
fn sender_hash_walks_utf16_units() {
    // One astral char is two UTF-16 units, hashed separately.
    assert_eq!(sender_hash("\u{1F600}"), 0xD83D * 31 + 0xDE00);
}

#[test]
fn hue_is_hash_mod_360() {
    assert_eq!(SenderColor::for_key("ab").hue(), 225);
    assert_eq!(SenderColor::for_key("ann@example.com").hue(), 110);
    assert_eq!(SenderColor::for_key("").hue(), 0);
}

#[test]
fn css_form_uses_fixed_saturation_and_lightness() {
    assert_eq!(SenderColor::for_key("a").to_css(), "hsl(97 75% 60%)");
}

#[test]
fn same_key_same_color() {
    assert_eq!(SenderColor::for_key("bob@example.com"), SenderColor::for_key("bob@example.com"));
}

#[test]
fn twenty_senders_do_not_collapse_to_one_color() {
    let hues = (0..20)
        .map(|i| SenderColor::for_key(&format!("user{i}@example.com")).hue())
        .collect::<HashSet<_>>();
    assert!(hues.len() >= 18, "only {} distinct hues", hues.len());
}

#[test]
fn hex_form_is_lowercase_rrggbb() {
    let hex = SenderColor::for_key("ann@example.com").to_hex();
    assert_eq!(hex.len(), 7);
    assert!(hex.starts_with('#'));
    assert!(hex[1..].chars().all(|c| c.is_ascii_hexdigit() && !c.is_ascii_uppercase()));
}

#[test]
fn red_hue_is_red_dominant() {
    let (r, g, b) = SenderColor::for_key("").to_rgb();
    assert!(r > g, "r={r} g={g}");
    assert_eq!(g, b);
}
