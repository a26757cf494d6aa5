//! A `Surface` that records calls instead of painting.

#[cfg(test)]
#[path = "recording_test.rs"]
mod recording_test;

use crate::geometry::Point;
use crate::surface::{CompositeOp, Rgba, Surface};

/// One recorded surface call.
#[derive(Debug, Clone, PartialEq)]
pub enum SurfaceOp {
    SetComposite(CompositeOp),
    SetLineWidth(f64),
    SetStrokeColor(Rgba),
    BeginPath,
    MoveTo(Point),
    LineTo(Point),
    Stroke,
    Save,
    Restore,
    Clear,
}

/// Surface double for relay tests.
#[derive(Debug, Clone, Default)]
pub struct RecordingSurface {
    ops: Vec<SurfaceOp>,
}

impl RecordingSurface {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn ops(&self) -> &[SurfaceOp] {
        &self.ops
    }

    /// Drain the recorded calls.
    pub fn take(&mut self) -> Vec<SurfaceOp> {
        std::mem::take(&mut self.ops)
    }

    /// Number of `stroke` calls so far.
    #[must_use]
    pub fn strokes(&self) -> usize {
        self.ops.iter().filter(|op| **op == SurfaceOp::Stroke).count()
    }

    /// `LineTo` targets in call order.
    #[must_use]
    pub fn lines(&self) -> Vec<Point> {
        self.ops
            .iter()
            .filter_map(|op| match op {
                SurfaceOp::LineTo(p) => Some(*p),
                _ => None,
            })
            .collect()
    }

    /// Whether every `restore` closes an earlier `save` and none are left open.
    #[must_use]
    pub fn is_balanced(&self) -> bool {
        let mut depth = 0usize;
        for op in &self.ops {
            match op {
                SurfaceOp::Save => depth += 1,
                SurfaceOp::Restore => {
                    let Some(next) = depth.checked_sub(1) else {
                        return false;
                    };
                    depth = next;
                }
                _ => {}
            }
        }
        depth == 0
    }
}

impl Surface for RecordingSurface {
    fn set_composite(&mut self, op: CompositeOp) {
        self.ops.push(SurfaceOp::SetComposite(op));
    }

    fn set_line_width(&mut self, width: f64) {
        self.ops.push(SurfaceOp::SetLineWidth(width));
    }

    fn set_stroke_color(&mut self, color: Rgba) {
        self.ops.push(SurfaceOp::SetStrokeColor(color));
    }

    fn begin_path(&mut self) {
        self.ops.push(SurfaceOp::BeginPath);
    }

    fn move_to(&mut self, point: Point) {
        self.ops.push(SurfaceOp::MoveTo(point));
    }

    fn line_to(&mut self, point: Point) {
        self.ops.push(SurfaceOp::LineTo(point));
    }

    fn stroke(&mut self) {
        self.ops.push(SurfaceOp::Stroke);
    }

    fn save(&mut self) {
        self.ops.push(SurfaceOp::Save);
    }

    fn restore(&mut self) {
        self.ops.push(SurfaceOp::Restore);
    }

    fn clear(&mut self) {
        self.ops.push(SurfaceOp::Clear);
    }
}
