//! Shared numeric constants for the canvas crate.

use crate::surface::Rgba;

// ── Brushes ─────────────────────────────────────────────────────

/// Line width of the drawing pen, in logical pixels.
pub const DRAW_LINE_WIDTH: f64 = 3.0;

/// Line width of the eraser, in logical pixels. Always wider than the pen.
pub const ERASE_LINE_WIDTH: f64 = 16.0;

/// Ink color of the drawing pen.
pub const DRAW_COLOR: Rgba = Rgba::BLACK;

// ── Surface ─────────────────────────────────────────────────────

/// Default logical surface width.
pub const SURFACE_WIDTH: u32 = 700;

/// Default logical surface height.
pub const SURFACE_HEIGHT: u32 = 500;

/// Device pixel ratios below this are clamped up to it.
pub const MIN_DEVICE_PIXEL_RATIO: f64 = 1.0;
