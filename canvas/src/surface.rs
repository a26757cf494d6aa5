//! The drawing surface abstraction.
//!
//! `Surface` is a deliberately small slice of the browser 2D context: a
//! current path built with `move_to`/`line_to`, a `stroke` that paints it
//! with the current line width, color and compositing mode, and a
//! `save`/`restore` stack for those style values. The current path is not
//! part of the saved state, matching the browser.

#[cfg(test)]
#[path = "surface_test.rs"]
mod surface_test;

use crate::consts::{DRAW_COLOR, DRAW_LINE_WIDTH, ERASE_LINE_WIDTH};
use crate::geometry::Point;

/// Straight (non-premultiplied) RGBA color.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Rgba {
    pub r: u8,
    pub g: u8,
    pub b: u8,
    pub a: u8,
}

impl Rgba {
    pub const TRANSPARENT: Self = Self { r: 0, g: 0, b: 0, a: 0 };
    pub const BLACK: Self = Self { r: 0, g: 0, b: 0, a: 255 };

    #[must_use]
    pub const fn new(r: u8, g: u8, b: u8, a: u8) -> Self {
        Self { r, g, b, a }
    }

    /// CSS color string: `#rrggbb` when opaque, `rgba(r, g, b, a)` otherwise.
    #[must_use]
    pub fn to_css(self) -> String {
        if self.a == 255 {
            return format!("#{:02x}{:02x}{:02x}", self.r, self.g, self.b);
        }
        let alpha = f64::from(self.a) / 255.0;
        format!("rgba({}, {}, {}, {alpha:.3})", self.r, self.g, self.b)
    }
}

/// How a stroke combines with pixels already on the surface.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum CompositeOp {
    /// Paint over existing pixels (`source-over`).
    #[default]
    SourceOver,
    /// Remove existing pixels where the stroke covers them (`destination-out`).
    DestinationOut,
}

impl CompositeOp {
    /// The browser `globalCompositeOperation` name.
    #[must_use]
    pub fn as_css(self) -> &'static str {
        match self {
            Self::SourceOver => "source-over",
            Self::DestinationOut => "destination-out",
        }
    }

    /// Whether this mode removes pigment rather than adding it.
    #[must_use]
    pub fn is_destructive(self) -> bool {
        matches!(self, Self::DestinationOut)
    }
}

/// Style a stroke segment is painted with.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Brush {
    pub composite: CompositeOp,
    pub line_width: f64,
    /// Ink color. `None` for the eraser, which leaves the stroke color as is.
    pub color: Option<Rgba>,
}

impl Brush {
    /// The fixed narrow black pen.
    pub const PEN: Self = Self {
        composite: CompositeOp::SourceOver,
        line_width: DRAW_LINE_WIDTH,
        color: Some(DRAW_COLOR),
    };

    /// The fixed wide eraser.
    pub const ERASER: Self = Self {
        composite: CompositeOp::DestinationOut,
        line_width: ERASE_LINE_WIDTH,
        color: None,
    };

    #[must_use]
    pub fn for_mode(erasing: bool) -> Self {
        if erasing { Self::ERASER } else { Self::PEN }
    }

    /// Load this brush into the surface's current style.
    pub fn apply_to<S: Surface + ?Sized>(&self, surface: &mut S) {
        surface.set_composite(self.composite);
        surface.set_line_width(self.line_width);
        if let Some(color) = self.color {
            surface.set_stroke_color(color);
        }
    }
}

/// A 2D target that stroke segments are replayed onto.
pub trait Surface {
    fn set_composite(&mut self, op: CompositeOp);
    fn set_line_width(&mut self, width: f64);
    fn set_stroke_color(&mut self, color: Rgba);

    /// Discard the current path.
    fn begin_path(&mut self);
    /// Start a new subpath at `point` without painting.
    fn move_to(&mut self, point: Point);
    /// Extend the current subpath to `point`. Without a current point this
    /// behaves like `move_to`.
    fn line_to(&mut self, point: Point);
    /// Paint the current path with the current style.
    fn stroke(&mut self);

    /// Push the current style onto the state stack.
    fn save(&mut self);
    /// Pop the style pushed by the matching `save`. Unbalanced calls are ignored.
    fn restore(&mut self);

    /// Erase every pixel and discard the current path.
    fn clear(&mut self);
}
