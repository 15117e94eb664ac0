// Integration tests for pointer track lifetimes and per-step motion.

use glam::Vec2;
use rings_core::{MotionTracker, PointerId, TouchPoint, TrackHooks, TrackerParams};
use std::cell::RefCell;
use std::rc::Rc;

#[derive(Default)]
struct Log {
    created: Vec<PointerId>,
    destroyed: Vec<(PointerId, u32)>,
}

/// Hands out serial numbers and records every release.
struct RecordingHooks {
    log: Rc<RefCell<Log>>,
    next: u32,
}

impl TrackHooks for RecordingHooks {
    type Resource = u32;

    fn on_create(&mut self, id: PointerId, _position: Vec2) -> u32 {
        self.log.borrow_mut().created.push(id);
        self.next += 1;
        self.next
    }

    fn on_destroy(&mut self, id: PointerId, resource: u32) {
        self.log.borrow_mut().destroyed.push((id, resource));
    }
}

fn recording() -> (MotionTracker<RecordingHooks>, Rc<RefCell<Log>>) {
    let log = Rc::new(RefCell::new(Log::default()));
    let hooks = RecordingHooks {
        log: log.clone(),
        next: 0,
    };
    let tracker = MotionTracker::with_hooks(TrackerParams::default(), hooks).unwrap();
    (tracker, log)
}

#[test]
fn missing_touch_is_finalized_on_next_batch() {
    let (mut tracker, log) = recording();
    tracker.on_touch_batch(0.0, &[TouchPoint::new(1, 10.0, 10.0), TouchPoint::new(2, 50.0, 50.0)]);
    assert_eq!(tracker.len(), 2);

    tracker.on_touch_batch(16.0, &[TouchPoint::new(2, 55.0, 50.0)]);
    assert_eq!(tracker.len(), 1);
    assert!(tracker.contains(PointerId::Touch(2)));
    assert_eq!(log.borrow().destroyed, vec![(PointerId::Touch(1), 1)]);

    tracker.on_touch_batch(32.0, &[]);
    assert!(tracker.is_empty());
    assert_eq!(log.borrow().destroyed.len(), 2);
    assert_eq!(log.borrow().created.len(), 2);
}

#[test]
fn mouse_down_then_up_creates_and_destroys_once() {
    let (mut tracker, log) = recording();
    tracker.on_pointer_down(0.0, Vec2::new(100.0, 100.0));
    assert!(tracker.is_mouse_down());
    assert!(tracker.contains(PointerId::Mouse));
    tracker.on_pointer_up(5.0, Vec2::new(100.0, 100.0));
    assert!(tracker.is_empty());
    assert!(!tracker.is_mouse_down());
    assert_eq!(log.borrow().created, vec![PointerId::Mouse]);
    assert_eq!(log.borrow().destroyed, vec![(PointerId::Mouse, 1)]);
}

#[test]
fn move_without_button_is_ignored() {
    let (mut tracker, log) = recording();
    tracker.on_pointer_move(0.0, Vec2::new(3.0, 4.0));
    assert!(tracker.is_empty());
    assert!(log.borrow().created.is_empty());
}

#[test]
fn repeated_mouse_down_keeps_one_track() {
    let (mut tracker, log) = recording();
    tracker.on_pointer_down(0.0, Vec2::ZERO);
    tracker.on_pointer_down(10.0, Vec2::new(5.0, 5.0));
    assert_eq!(tracker.len(), 1);
    assert_eq!(log.borrow().created.len(), 1);
    let track = tracker.track(PointerId::Mouse).unwrap();
    assert_eq!(track.raw_position(), Vec2::new(5.0, 5.0));
}

#[test]
fn touch_batches_leave_the_mouse_alone() {
    let (mut tracker, _log) = recording();
    tracker.on_pointer_down(0.0, Vec2::ZERO);
    tracker.on_touch_batch(1.0, &[TouchPoint::new(9, 1.0, 1.0)]);
    tracker.on_touch_batch(2.0, &[]);
    assert_eq!(tracker.len(), 1);
    assert!(tracker.contains(PointerId::Mouse));
}

#[test]
fn stale_timestamps_do_not_move_the_raw_position() {
    let (mut tracker, _log) = recording();
    tracker.on_touch_batch(10.0, &[TouchPoint::new(1, 0.0, 0.0)]);
    tracker.on_touch_batch(10.0, &[TouchPoint::new(1, 50.0, 50.0)]);
    tracker.on_touch_batch(4.0, &[TouchPoint::new(1, 80.0, 80.0)]);
    let track = tracker.track(PointerId::Touch(1)).unwrap();
    assert_eq!(track.raw_position(), Vec2::ZERO);
    assert_eq!(track.last_time_ms(), 10.0);

    tracker.on_touch_batch(11.0, &[TouchPoint::new(1, 80.0, 80.0)]);
    let track = tracker.track(PointerId::Touch(1)).unwrap();
    assert_eq!(track.raw_position(), Vec2::new(80.0, 80.0));
}

#[test]
fn new_track_starts_at_the_contact_point() {
    let mut tracker = MotionTracker::new(TrackerParams::default()).unwrap();
    tracker.on_touch_batch(0.0, &[TouchPoint::new(4, 12.0, 34.0)]);
    let track = tracker.track(PointerId::Touch(4)).unwrap();
    assert_eq!(track.filtered_position(), Vec2::new(12.0, 34.0));
    assert_eq!(track.position(), Vec2::new(12.0, 34.0));
    assert_eq!(track.cursor(), 0.0);
    assert_eq!(track.curve().len(), 1);
    assert_eq!(track.velocity(), Vec2::ZERO);
}

#[test]
fn zero_step_changes_nothing() {
    let mut tracker = MotionTracker::new(TrackerParams::default()).unwrap();
    tracker.on_touch_batch(0.0, &[TouchPoint::new(1, 0.0, 0.0)]);
    tracker.on_touch_batch(1.0, &[TouchPoint::new(1, 100.0, 0.0)]);
    tracker.tick(0.0);
    tracker.tick(-16.0);
    let track = tracker.track(PointerId::Touch(1)).unwrap();
    assert_eq!(track.filtered_position(), Vec2::ZERO);
    assert_eq!(track.curve().len(), 1);
    assert!(track.trail().is_empty());
}

#[test]
fn step_follows_the_filtered_position() {
    let mut tracker = MotionTracker::new(TrackerParams::default()).unwrap();
    tracker.on_touch_batch(0.0, &[TouchPoint::new(1, 0.0, 0.0)]);
    tracker.on_touch_batch(1.0, &[TouchPoint::new(1, 100.0, 0.0)]);
    tracker.tick(16.0);

    let track = tracker.track(PointerId::Touch(1)).unwrap();
    assert!((track.filtered_position().x - 10.0).abs() < 1e-4);
    assert_eq!(track.curve().len(), 2);
    // 200 units/s for 16 ms
    assert!((track.cursor() - 3.2).abs() < 1e-4);
    assert!(track.cursor() <= track.curve().total_length());
    assert!(track.velocity().x > 0.0);
    assert_eq!(track.velocity().y, 0.0);
    assert!(track.trail().len() >= 4);
}

#[test]
fn cursor_never_passes_the_curve_end() {
    let mut tracker = MotionTracker::new(TrackerParams::default()).unwrap();
    tracker.on_touch_batch(0.0, &[TouchPoint::new(1, 0.0, 0.0)]);
    tracker.on_touch_batch(1.0, &[TouchPoint::new(1, 20.0, 0.0)]);
    for _ in 0..200 {
        tracker.tick(16.0);
        let track = tracker.track(PointerId::Touch(1)).unwrap();
        assert!(track.cursor() <= track.curve().total_length() + 1e-4);
    }
}

#[test]
fn snapshots_are_sorted_and_detached() {
    let mut tracker = MotionTracker::new(TrackerParams::default()).unwrap();
    tracker.on_pointer_down(0.0, Vec2::new(1.0, 1.0));
    tracker.on_touch_batch(0.0, &[TouchPoint::new(7, 0.0, 0.0), TouchPoint::new(3, 5.0, 5.0)]);
    tracker.tick(16.0);

    let snapshot = tracker.active_tracks();
    let ids: Vec<PointerId> = snapshot.iter().map(|s| s.id).collect();
    assert_eq!(
        ids,
        vec![PointerId::Touch(3), PointerId::Touch(7), PointerId::Mouse]
    );

    let kept = snapshot.clone();
    tracker.on_touch_batch(5.0, &[TouchPoint::new(7, 90.0, 90.0)]);
    for _ in 0..10 {
        tracker.tick(16.0);
    }
    assert_eq!(snapshot, kept);
}

#[test]
fn resources_are_reachable_while_tracks_live() {
    let (mut tracker, _log) = recording();
    tracker.on_touch_batch(0.0, &[TouchPoint::new(1, 0.0, 0.0), TouchPoint::new(2, 0.0, 0.0)]);
    let mut serials: Vec<u32> = tracker.resources_mut().map(|slot| *slot.resource).collect();
    serials.sort_unstable();
    assert_eq!(serials, vec![1, 2]);
    assert_eq!(tracker.track(PointerId::Touch(2)).map(|t| *t.resource()), Some(2));
}

#[test]
fn dropping_the_tracker_releases_everything() {
    let (mut tracker, log) = recording();
    tracker.on_pointer_down(0.0, Vec2::ZERO);
    tracker.on_touch_batch(0.0, &[TouchPoint::new(1, 0.0, 0.0)]);
    drop(tracker);
    assert_eq!(log.borrow().destroyed.len(), 2);
}

#[test]
fn release_all_finalizes_each_track_once() {
    let (mut tracker, log) = recording();
    tracker.on_touch_batch(0.0, &[TouchPoint::new(1, 0.0, 0.0), TouchPoint::new(2, 0.0, 0.0)]);
    tracker.release_all();
    assert!(tracker.is_empty());
    drop(tracker);
    assert_eq!(log.borrow().destroyed.len(), 2);
}

#[test]
fn invalid_blend_is_rejected() {
    let params = TrackerParams {
        filter_blend: 0.0,
        ..TrackerParams::default()
    };
    assert!(MotionTracker::new(params).is_err());
}
