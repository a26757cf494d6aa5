//! Stable per-sender colors.

#[cfg(test)]
#[path = "color_test.rs"]
mod color_test;

const SATURATION: f64 = 0.75;
const LIGHTNESS: f64 = 0.60;

/// `h = h * 31 + unit` over UTF-16 code units, wrapping at 32 bits.
#[must_use]
pub fn sender_hash(key: &str) -> u32 {
    key.encode_utf16()
        .fold(0_u32, |h, unit| h.wrapping_mul(31).wrapping_add(u32::from(unit)))
}

/// Display color for a sender, fixed at 75% saturation and 60% lightness.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct SenderColor {
    hue: u16,
}

impl SenderColor {
    #[must_use]
    #[allow(clippy::cast_possible_truncation)]
    pub fn for_key(key: &str) -> Self {
        // `% 360` keeps the value well inside u16.
        Self { hue: (sender_hash(key) % 360) as u16 }
    }

    /// Hue in degrees, `0..360`.
    #[must_use]
    pub fn hue(self) -> u16 {
        self.hue
    }

    /// CSS Color 4 form, e.g. `hsl(110 75% 60%)`.
    #[must_use]
    pub fn to_css(self) -> String {
        format!("hsl({} 75% 60%)", self.hue)
    }

    #[must_use]
    #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss, clippy::many_single_char_names)]
    pub fn to_rgb(self) -> (u8, u8, u8) {
        let h = f64::from(self.hue) / 60.0;
        let c = (1.0 - (2.0 * LIGHTNESS - 1.0).abs()) * SATURATION;
        let x = c * (1.0 - (h % 2.0 - 1.0).abs());
        let m = LIGHTNESS - c / 2.0;
        let (r, g, b) = match self.hue / 60 {
            0 => (c, x, 0.0),
            1 => (x, c, 0.0),
            2 => (0.0, c, x),
            3 => (0.0, x, c),
            4 => (x, 0.0, c),
            _ => (c, 0.0, x),
        };
        let to_u8 = |v: f64| ((v + m) * 255.0).round().clamp(0.0, 255.0) as u8;
        (to_u8(r), to_u8(g), to_u8(b))
    }

    /// Lowercase `#rrggbb`.
    #[must_use]
    pub fn to_hex(self) -> String {
        let (r, g, b) = self.to_rgb();
        format!("#{r:02x}{g:02x}{b:02x}")
    }
}
