// Integration tests for the trail line buffer.

use glam::{Vec2, Vec3};
use rings_core::{ConfigError, TrailLineBuffer, TrailParams, UploadRange};

#[test]
fn polyline_becomes_consecutive_segments() {
    let mut trails = TrailLineBuffer::new(TrailParams { max_lines: 16 }).unwrap();
    trails.add_polyline(&[
        Vec3::new(0.0, 0.0, 5.0),
        Vec3::new(1.0, 0.0, 5.0),
        Vec3::new(1.0, 1.0, 5.0),
        Vec3::new(0.0, 1.0, 5.0),
    ]);
    assert_eq!(trails.line_count(), 3);
    assert_eq!(trails.draw_range(), 0..6);
    assert_eq!(
        trails.positions(),
        &[
            [0.0, 0.0],
            [1.0, 0.0],
            [1.0, 0.0],
            [1.0, 1.0],
            [1.0, 1.0],
            [0.0, 1.0]
        ]
    );
    assert_eq!(trails.as_bytes().len(), 6 * 8);
    assert_eq!(
        trails.upload_range(),
        UploadRange::Span {
            offset: 0,
            count: 12
        }
    );
}

#[test]
fn full_buffer_drops_extra_lines() {
    let mut trails = TrailLineBuffer::new(TrailParams { max_lines: 2 }).unwrap();
    assert!(trails.add_line(Vec2::ZERO, Vec2::X));
    assert!(trails.add_line(Vec2::X, Vec2::Y));
    assert!(trails.is_full());
    assert!(!trails.add_line(Vec2::Y, Vec2::ONE));
    trails.add_polyline(&[Vec3::ZERO, Vec3::X, Vec3::Y]);
    assert_eq!(trails.line_count(), 2);
    assert_eq!(trails.capacity_bytes(), 2 * 2 * 8);
}

#[test]
fn clearing_keeps_capacity() {
    let mut trails = TrailLineBuffer::new(TrailParams { max_lines: 4 }).unwrap();
    trails.add_polyline(&[Vec3::ZERO, Vec3::X, Vec3::Y]);
    trails.clear_lines();
    assert_eq!(trails.line_count(), 0);
    assert!(trails.as_bytes().is_empty());
    assert_eq!(trails.max_lines(), 4);
    // a single point adds nothing
    trails.add_polyline(&[Vec3::ONE]);
    assert_eq!(trails.draw_range(), 0..0);
}

#[test]
fn zero_lines_is_rejected() {
    assert_eq!(
        TrailLineBuffer::new(TrailParams { max_lines: 0 }).err(),
        Some(ConfigError::ZeroCapacity)
    );
}
