//! Software RGBA raster implementing [`Surface`].
//!
//! Coverage is hard-edged: a device pixel is inside a stroke when its center
//! lies within half the line width of a path segment, which gives round caps
//! and joins for free. Because coverage has no anti-aliased fringe,
//! re-stroking a segment with an opaque brush changes nothing, so `stroke`
//! only rasterizes the segments added since the previous `stroke` instead of
//! the whole current path.

#[cfg(test)]
#[path = "raster_test.rs"]
mod raster_test;

use crate::consts::{SURFACE_HEIGHT, SURFACE_WIDTH};
use crate::geometry::{PixelScale, Point};
use crate::surface::{CompositeOp, Rgba, Surface};

#[derive(Debug, Clone, Copy, PartialEq)]
struct Style {
    composite: CompositeOp,
    line_width: f64,
    color: Rgba,
}

impl Default for Style {
    fn default() -> Self {
        Self { composite: CompositeOp::SourceOver, line_width: 1.0, color: Rgba::BLACK }
    }
}

/// An in-memory drawing surface.
#[derive(Debug, Clone)]
pub struct Raster {
    width: u32,
    height: u32,
    scale: PixelScale,
    device_width: u32,
    device_height: u32,
    pixels: Vec<Rgba>,
    style: Style,
    saved: Vec<Style>,
    current: Option<Point>,
    pending: Vec<(Point, Point)>,
}

impl Default for Raster {
    fn default() -> Self {
        Self::new(SURFACE_WIDTH, SURFACE_HEIGHT, 1.0)
    }
}

impl Raster {
    /// Create a transparent raster of `width` × `height` logical pixels
    /// backed by `dpr` device pixels per logical pixel.
    #[must_use]
    pub fn new(width: u32, height: u32, dpr: f64) -> Self {
        let scale = PixelScale::new(dpr);
        let device_width = scale.device_len(width);
        let device_height = scale.device_len(height);
        let len = device_width as usize * device_height as usize;
        Self {
            width,
            height,
            scale,
            device_width,
            device_height,
            pixels: vec![Rgba::TRANSPARENT; len],
            style: Style::default(),
            saved: Vec::new(),
            current: None,
            pending: Vec::new(),
        }
    }

    #[must_use]
    pub fn width(&self) -> u32 {
        self.width
    }

    #[must_use]
    pub fn height(&self) -> u32 {
        self.height
    }

    #[must_use]
    pub fn scale(&self) -> PixelScale {
        self.scale
    }

    /// Backing store size in device pixels.
    #[must_use]
    pub fn device_size(&self) -> (u32, u32) {
        (self.device_width, self.device_height)
    }

    /// Row-major device pixels.
    #[must_use]
    pub fn pixels(&self) -> &[Rgba] {
        &self.pixels
    }

    /// Device pixel at `(x, y)`, if in bounds.
    #[must_use]
    pub fn pixel(&self, x: u32, y: u32) -> Option<Rgba> {
        if x >= self.device_width || y >= self.device_height {
            return None;
        }
        self.pixels.get(self.index(x, y)).copied()
    }

    /// Device pixel under a logical point, if in bounds.
    #[must_use]
    #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
    pub fn sample(&self, point: Point) -> Option<Rgba> {
        let dx = self.scale.to_device(point.x).floor();
        let dy = self.scale.to_device(point.y).floor();
        if dx < 0.0 || dy < 0.0 {
            return None;
        }
        self.pixel(dx as u32, dy as u32)
    }

    /// Number of device pixels with any opacity.
    #[must_use]
    pub fn painted_pixels(&self) -> usize {
        self.pixels.iter().filter(|p| p.a > 0).count()
    }

    /// The current pen position, if a subpath is open.
    #[must_use]
    pub fn pen(&self) -> Option<Point> {
        self.current
    }

    fn index(&self, x: u32, y: u32) -> usize {
        y as usize * self.device_width as usize + x as usize
    }

    #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
    fn device_range(&self, lo: f64, hi: f64, limit: u32) -> (u32, u32) {
        let lo = self.scale.to_device(lo).floor().max(0.0);
        let hi = self.scale.to_device(hi).ceil().min(f64::from(limit));
        if hi <= lo {
            return (0, 0);
        }
        (lo as u32, hi as u32)
    }

    fn paint_segment(&mut self, a: Point, b: Point) {
        let half = self.style.line_width / 2.0;
        if half <= 0.0 {
            return;
        }
        let (x0, x1) = self.device_range(a.x.min(b.x) - half, a.x.max(b.x) + half, self.device_width);
        let (y0, y1) = self.device_range(a.y.min(b.y) - half, a.y.max(b.y) + half, self.device_height);

        for dy in y0..y1 {
            let cy = self.scale.device_center_to_logical(dy);
            for dx in x0..x1 {
                let cx = self.scale.device_center_to_logical(dx);
                if Point::new(cx, cy).distance_to_segment(a, b) > half {
                    continue;
                }
                let index = self.index(dx, dy);
                if let Some(pixel) = self.pixels.get_mut(index) {
                    *pixel = composite(*pixel, self.style.color, self.style.composite);
                }
            }
        }
    }
}

#[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
fn composite(dst: Rgba, src: Rgba, op: CompositeOp) -> Rgba {
    let sa = f64::from(src.a) / 255.0;
    let da = f64::from(dst.a) / 255.0;
    let to_u8 = |v: f64| v.round().clamp(0.0, 255.0) as u8;

    match op {
        CompositeOp::SourceOver => {
            let oa = sa + da * (1.0 - sa);
            if oa <= 0.0 {
                return Rgba::TRANSPARENT;
            }
            let channel = |s: u8, d: u8| {
                to_u8((f64::from(s) * sa + f64::from(d) * da * (1.0 - sa)) / oa)
            };
            Rgba {
                r: channel(src.r, dst.r),
                g: channel(src.g, dst.g),
                b: channel(src.b, dst.b),
                a: to_u8(oa * 255.0),
            }
        }
        CompositeOp::DestinationOut => {
            let oa = da * (1.0 - sa);
            if oa <= 0.0 {
                return Rgba::TRANSPARENT;
            }
            Rgba { a: to_u8(oa * 255.0), ..dst }
        }
    }
}

impl Surface for Raster {
    fn set_composite(&mut self, op: CompositeOp) {
        self.style.composite = op;
    }

    fn set_line_width(&mut self, width: f64) {
        // The browser ignores non-positive and non-finite widths.
        if width.is_finite() && width > 0.0 {
            self.style.line_width = width;
        }
    }

    fn set_stroke_color(&mut self, color: Rgba) {
        self.style.color = color;
    }

    fn begin_path(&mut self) {
        self.current = None;
        self.pending.clear();
    }

    fn move_to(&mut self, point: Point) {
        self.current = Some(point);
    }

    fn line_to(&mut self, point: Point) {
        if let Some(from) = self.current {
            self.pending.push((from, point));
        }
        self.current = Some(point);
    }

    fn stroke(&mut self) {
        let segments = std::mem::take(&mut self.pending);
        for (a, b) in segments {
            self.paint_segment(a, b);
        }
    }

    fn save(&mut self) {
        self.saved.push(self.style);
    }

    fn restore(&mut self) {
        if let Some(style) = self.saved.pop() {
            self.style = style;
        }
    }

    fn clear(&mut self) {
        self.pixels.fill(Rgba::TRANSPARENT);
        self.begin_path();
    }
}
