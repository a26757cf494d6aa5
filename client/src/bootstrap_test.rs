use canvas::geometry::Point;
use canvas::raster::Raster;
use canvas::recording::{RecordingSurface, SurfaceOp};
use canvas::surface::Rgba;
use serde_json::json;

use super::*;

fn session(value: serde_json::Value) -> WireSession {
    serde_json::from_value(value).expect("session")
}

fn diagonal() -> WireSession {
    session(json!({
        "drawings": [
            { "x": 0, "y": 0, "isDrawing": false, "isErasing": false },
            { "x": 10, "y": 10, "isDrawing": true, "isErasing": false }
        ],
        "chats": []
    }))
}

#[test]
fn snapshot_replays_one_line() {
    let mut surface = RecordingSurface::new();
    let replay = replay_snapshot(&mut surface, &diagonal());

    assert_eq!(replay.strokes, 2);
    assert_eq!(surface.strokes(), 1);
    assert_eq!(surface.lines(), [Point::new(10.0, 10.0)]);
    assert!(surface.ops().contains(&SurfaceOp::MoveTo(Point::new(0.0, 0.0))));
    assert_eq!(surface.ops().first(), Some(&SurfaceOp::Save));
    assert_eq!(surface.ops().last(), Some(&SurfaceOp::Restore));
}

#[test]
fn snapshot_line_lands_on_a_raster() {
    let mut raster = Raster::new(20, 20, 1.0);
    replay_snapshot(&mut raster, &diagonal());
    assert_eq!(raster.sample(Point::new(5.0, 5.0)), Some(Rgba::BLACK));
    assert_eq!(raster.sample(Point::new(15.0, 15.0)).map(|p| p.a), Some(0));
    assert_eq!(raster.sample(Point::new(9.0, 1.0)).map(|p| p.a), Some(0));
}

#[test]
fn null_stroke_fields_read_as_defaults() {
    let mut surface = RecordingSurface::new();
    let replay = replay_snapshot(
        &mut surface,
        &session(json!({
            "drawings": [
                { "roomId": null, "x": 0, "y": 0, "isDrawing": null, "isErasing": null },
                { "roomId": null, "x": 10, "y": 10, "isDrawing": true, "isErasing": null }
            ]
        })),
    );

    assert_eq!(replay.strokes, 2);
    assert_eq!(replay.skipped_strokes, 0);
    assert_eq!(surface.lines(), [Point::new(10.0, 10.0)]);
}

#[test]
fn replaying_twice_draws_twice() {
    let mut surface = RecordingSurface::new();
    replay_snapshot(&mut surface, &diagonal());
    replay_snapshot(&mut surface, &diagonal());
    assert_eq!(surface.strokes(), 2);
    assert!(surface.is_balanced());
}

#[test]
fn bad_entries_are_skipped() {
    let mut surface = RecordingSurface::new();
    let replay = replay_snapshot(
        &mut surface,
        &session(json!({
            "drawings": [
                { "x": "left", "y": 0 },
                "junk",
                { "x": 1, "y": 2, "isDrawing": true }
            ],
            "chats": [ 42, { "text": "kept" } ]
        })),
    );
    assert_eq!((replay.strokes, replay.skipped_strokes), (1, 2));
    assert_eq!(replay.skipped_chats, 1);
    assert_eq!(replay.chats.len(), 1);
    assert_eq!(replay.chats[0].text, "kept");
    assert_eq!(replay.chats[0].user, "Unknown");
    assert!(surface.is_balanced());
}

#[test]
fn empty_snapshot_leaves_the_surface_alone() {
    let mut surface = RecordingSurface::new();
    let replay = replay_snapshot(&mut surface, &WireSession::default());
    assert_eq!(replay, Replay::default());
    assert_eq!(surface.ops(), [SurfaceOp::Save, SurfaceOp::Restore]);
}

#[test]
fn chats_keep_snapshot_order() {
    let mut surface = RecordingSurface::new();
    let replay = replay_snapshot(
        &mut surface,
        &session(json!({ "chats": [ { "_id": "a" }, { "_id": "b" }, { "_id": "c" } ] })),
    );
    let ids: Vec<&str> = replay.chats.iter().map(|c| c.id.as_str()).collect();
    assert_eq!(ids, ["a", "b", "c"]);
}

#[test]
fn gate_takes_one_snapshot_per_arm() {
    let mut surface = RecordingSurface::new();
    let mut gate = SessionBootstrap::new();
    assert!(gate.accept(&mut surface, &diagonal()).is_none());
    assert!(surface.ops().is_empty());

    gate.arm();
    assert!(gate.is_armed());
    assert!(gate.accept(&mut surface, &diagonal()).is_some());
    assert!(!gate.is_armed());
    assert!(gate.accept(&mut surface, &diagonal()).is_none());
    assert_eq!(surface.strokes(), 1);
}
