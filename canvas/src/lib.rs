//! Drawing surfaces for the shared whiteboard.
//!
//! Stroke segments arriving from the network (or from local pointer input)
//! are replayed as 2D path operations against a [`surface::Surface`]. The
//! trait mirrors the handful of browser canvas calls the whiteboard needs, so
//! the same relay code drives a headless software raster, a recording used
//! in tests, or the real browser context.
//!
//! ## Module layout
//!
//! | Module | Role |
//! |--------|------|
//! | [`surface`] | The `Surface` trait, colors, compositing modes and brushes |
//! | [`geometry`] | Points and logical-to-device pixel scaling |
//! | [`raster`] | Software RGBA raster implementing `Surface` |
//! | [`recording`] | `Surface` that records every call, for assertions |
//! | [`consts`] | Brush widths, default surface size |
//! | `web` | `Surface` for `CanvasRenderingContext2d` (feature `web`) |

pub mod consts;
pub mod geometry;
pub mod raster;
pub mod recording;
pub mod surface;
#[cfg(feature = "web")]
pub mod web;
