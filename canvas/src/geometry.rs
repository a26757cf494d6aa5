#[cfg(test)]
#[path = "geometry_test.rs"]
mod geometry_test;

use crate::consts::MIN_DEVICE_PIXEL_RATIO;

/// A point in logical (CSS pixel) surface coordinates.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Point {
    pub x: f64,
    pub y: f64,
}

impl Point {
    #[must_use]
    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    /// Distance from this point to the segment `a`–`b`.
    ///
    /// Never NaN: a segment whose geometry cannot be represented in `f64`
    /// is infinitely far from every point.
    #[must_use]
    pub fn distance_to_segment(self, a: Point, b: Point) -> f64 {
        // Project from the nearer endpoint so far-off coordinates do not
        // swamp the nearby ones.
        let (origin, far) = if self.distance_to(a) <= self.distance_to(b) { (a, b) } else { (b, a) };
        let hx = 0.5 * far.x - 0.5 * origin.x;
        let hy = 0.5 * far.y - 0.5 * origin.y;
        let half_len = hx.hypot(hy);
        if !half_len.is_finite() {
            return f64::INFINITY;
        }
        if half_len == 0.0 {
            return finite_or_infinite(self.distance_to(origin));
        }
        let (ux, uy) = (hx / half_len, hy / half_len);
        let along = ((self.x - origin.x) * ux + (self.y - origin.y) * uy).clamp(0.0, 2.0 * half_len);
        let foot = Point::new(origin.x + along * ux, origin.y + along * uy);
        finite_or_infinite(self.distance_to(foot))
    }

    fn distance_to(self, other: Point) -> f64 {
        (self.x - other.x).hypot(self.y - other.y)
    }
}

fn finite_or_infinite(distance: f64) -> f64 {
    if distance.is_nan() { f64::INFINITY } else { distance }
}

/// Logical-to-device pixel scale.
///
/// Stroke coordinates are always logical, so a stroke sent from a HiDPI
/// screen lands on the same spot of a 1x screen.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PixelScale {
    dpr: f64,
}

impl Default for PixelScale {
    fn default() -> Self {
        Self { dpr: MIN_DEVICE_PIXEL_RATIO }
    }
}

impl PixelScale {
    /// Build a scale from a device pixel ratio, clamping non-finite or
    /// sub-unit ratios to 1.
    #[must_use]
    pub fn new(dpr: f64) -> Self {
        let dpr = if dpr.is_finite() { dpr.max(MIN_DEVICE_PIXEL_RATIO) } else { MIN_DEVICE_PIXEL_RATIO };
        Self { dpr }
    }

    #[must_use]
    pub fn dpr(self) -> f64 {
        self.dpr
    }

    /// Device pixel count covering `logical` pixels.
    #[must_use]
    #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
    pub fn device_len(self, logical: u32) -> u32 {
        (f64::from(logical) * self.dpr).round() as u32
    }

    /// Logical coordinate of the center of device pixel `index`.
    #[must_use]
    pub fn device_center_to_logical(self, index: u32) -> f64 {
        (f64::from(index) + 0.5) / self.dpr
    }

    /// Device coordinate of a logical coordinate.
    #[must_use]
    pub fn to_device(self, logical: f64) -> f64 {
        logical * self.dpr
    }
}
