//! JSONL pointer scripts for `drawsync draw`.
//!
//! One JSON object per line:
//! `{"type":"down","x":1,"y":2}`, `{"type":"move",..}`, `{"type":"up"}`
//! (also `cancel`/`leave`) and `{"type":"tool","erasing":true}`. Blank
//! lines and `#` comments are skipped.

#[cfg(test)]
#[path = "input_test.rs"]
mod input_test;

use canvas::geometry::Point;
use client::driver::Command;
use serde::Deserialize;

#[derive(Debug, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
enum PointerLine {
    Down { x: f64, y: f64 },
    Move { x: f64, y: f64 },
    #[serde(alias = "cancel", alias = "leave")]
    Up {},
    Tool { erasing: bool },
}

/// Parse one script line. `Ok(None)` for blank and comment lines.
pub fn parse_line(line: &str) -> Result<Option<Command>, serde_json::Error> {
    let trimmed = line.trim();
    if trimmed.is_empty() || trimmed.starts_with('#') {
        return Ok(None);
    }
    let command = match serde_json::from_str::<PointerLine>(trimmed)? {
        PointerLine::Down { x, y } => Command::PointerDown(Point::new(x, y)),
        PointerLine::Move { x, y } => Command::PointerMove(Point::new(x, y)),
        PointerLine::Up {} => Command::PointerUp,
        PointerLine::Tool { erasing } => Command::SetErasing(erasing),
    };
    Ok(Some(command))
}
