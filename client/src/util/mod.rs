//! Presentation helpers for chat rendering.

pub mod color;
pub mod label;
