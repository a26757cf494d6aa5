use super::*;

#[test]
fn records_calls_in_order() {
    let mut s = RecordingSurface::new();
    s.begin_path();
    s.move_to(Point::new(1.0, 2.0));
    s.line_to(Point::new(3.0, 4.0));
    s.stroke();
    assert_eq!(
        s.ops(),
        &[
            SurfaceOp::BeginPath,
            SurfaceOp::MoveTo(Point::new(1.0, 2.0)),
            SurfaceOp::LineTo(Point::new(3.0, 4.0)),
            SurfaceOp::Stroke,
        ]
    );
    assert_eq!(s.strokes(), 1);
    assert_eq!(s.lines(), vec![Point::new(3.0, 4.0)]);
}

#[test]
fn take_drains() {
    let mut s = RecordingSurface::new();
    s.clear();
    assert_eq!(s.take(), vec![SurfaceOp::Clear]);
    assert!(s.ops().is_empty());
}

#[test]
fn balance_tracks_save_restore_pairs() {
    let mut s = RecordingSurface::new();
    assert!(s.is_balanced());
    s.save();
    assert!(!s.is_balanced());
    s.restore();
    assert!(s.is_balanced());
    s.restore();
    assert!(!s.is_balanced());
}
