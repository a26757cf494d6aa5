//! `Surface` backed by a browser `CanvasRenderingContext2d`.
//!
//! The context is prepared once for HiDPI output: the backing store is
//! sized in device pixels and the context transform scales logical
//! coordinates up, so stroke coordinates stay device-independent.

use wasm_bindgen::{JsCast, JsValue};
use web_sys::{CanvasRenderingContext2d, HtmlCanvasElement};

use crate::geometry::{PixelScale, Point};
use crate::surface::{CompositeOp, Rgba, Surface};

pub struct WebSurface {
    ctx: CanvasRenderingContext2d,
    width: f64,
    height: f64,
    error: Option<JsValue>,
}

impl WebSurface {
    /// Size `canvas` for `width` × `height` logical pixels at `dpr` and
    /// wrap its 2D context.
    ///
    /// # Errors
    ///
    /// Returns `Err` if the canvas has no 2D context or the transform
    /// cannot be set.
    pub fn prepare(canvas: &HtmlCanvasElement, width: u32, height: u32, dpr: f64) -> Result<Self, JsValue> {
        let scale = PixelScale::new(dpr);
        canvas.set_width(scale.device_len(width));
        canvas.set_height(scale.device_len(height));

        let ctx = canvas
            .get_context("2d")?
            .ok_or_else(|| JsValue::from_str("canvas has no 2d context"))?
            .dyn_into::<CanvasRenderingContext2d>()
            .map_err(|_| JsValue::from_str("2d context has unexpected type"))?;

        ctx.set_transform(scale.dpr(), 0.0, 0.0, scale.dpr(), 0.0, 0.0)?;
        ctx.set_line_cap("round");
        ctx.set_line_join("round");

        Ok(Self { ctx, width: f64::from(width), height: f64::from(height), error: None })
    }

    #[must_use]
    pub fn context(&self) -> &CanvasRenderingContext2d {
        &self.ctx
    }

    /// The first failed context call since the last check, if any.
    pub fn take_error(&mut self) -> Option<JsValue> {
        self.error.take()
    }

    fn record(&mut self, result: Result<(), JsValue>) {
        if let Err(err) = result {
            self.error.get_or_insert(err);
        }
    }
}

impl Surface for WebSurface {
    fn set_composite(&mut self, op: CompositeOp) {
        let result = self.ctx.set_global_composite_operation(op.as_css());
        self.record(result);
    }

    fn set_line_width(&mut self, width: f64) {
        self.ctx.set_line_width(width);
    }

    fn set_stroke_color(&mut self, color: Rgba) {
        self.ctx.set_stroke_style_str(&color.to_css());
    }

    fn begin_path(&mut self) {
        self.ctx.begin_path();
    }

    fn move_to(&mut self, point: Point) {
        self.ctx.move_to(point.x, point.y);
    }

    fn line_to(&mut self, point: Point) {
        self.ctx.line_to(point.x, point.y);
    }

    fn stroke(&mut self) {
        self.ctx.stroke();
    }

    fn save(&mut self) {
        self.ctx.save();
    }

    fn restore(&mut self) {
        self.ctx.restore();
    }

    fn clear(&mut self) {
        self.ctx.clear_rect(0.0, 0.0, self.width, self.height);
        self.ctx.begin_path();
    }
}
