// Integration tests for the composed scene: schedules, pulses and trails.

use glam::Vec2;
use rings_core::{
    screen_to_centered, AdvanceSummary, ConfigError, RingParams, RingScene, SceneParams,
    TouchPoint,
};
use std::time::Duration;

const VIEWPORT: Vec2 = Vec2::new(800.0, 600.0);

fn scene() -> RingScene {
    RingScene::new(SceneParams::default(), VIEWPORT).unwrap()
}

#[test]
fn centered_coordinates_flip_y() {
    assert_eq!(screen_to_centered(Vec2::ZERO, VIEWPORT), Vec2::new(-400.0, 300.0));
    assert_eq!(screen_to_centered(Vec2::new(400.0, 300.0), VIEWPORT), Vec2::ZERO);
    assert_eq!(
        screen_to_centered(Vec2::new(800.0, 600.0), VIEWPORT),
        Vec2::new(400.0, -300.0)
    );
}

#[test]
fn idle_scene_steps_without_spawning() {
    let mut s = scene();
    let summary = s.advance(Duration::from_millis(100), 0.1);
    assert_eq!(
        summary,
        AdvanceSummary {
            steps: 6,
            pulses: 1,
            rings_spawned: 0
        }
    );
    assert_eq!(s.rings().spawned(), 0);
    assert_eq!(s.trails().line_count(), 0);
}

#[test]
fn held_pointer_spawns_a_ring_per_pulse() {
    let mut s = scene();
    s.on_pointer_down(0.0, Vec2::new(400.0, 300.0));
    let summary = s.advance(Duration::from_millis(100), 1.5);
    assert_eq!(summary.rings_spawned, 1);

    let ring = s.rings().ring(0).unwrap();
    assert!(ring.position.length() < 1e-3);
    assert_eq!(ring.center_velocity, Vec2::ZERO);
    assert_eq!(ring.time, 1.5);
    assert!((ring.expansion_speed - 600.0).abs() < 1e-2);

    // stationary trail is four coincident points
    assert_eq!(s.trails().line_count(), 3);

    let summary = s.advance(Duration::from_millis(200), 1.7);
    assert_eq!(summary.rings_spawned, 2);
    assert_eq!(s.rings().spawned(), 3);
}

#[test]
fn downward_motion_gives_upward_negative_velocity() {
    let mut s = scene();
    s.on_touch_batch(0.0, &[TouchPoint::new(1, 400.0, 300.0)]);
    s.on_touch_batch(1.0, &[TouchPoint::new(1, 400.0, 400.0)]);
    s.advance(Duration::from_millis(100), 0.1);

    let ring = s.rings().ring(0).unwrap();
    assert!(ring.center_velocity.y < 0.0, "{:?}", ring.center_velocity);
    assert!(ring.center_velocity.x.abs() < 1e-2);
    // head moved down the screen, so below the centre
    assert!(ring.position.y < 0.0);
}

#[test]
fn every_live_track_pulses() {
    let mut s = scene();
    s.on_pointer_down(0.0, Vec2::new(10.0, 10.0));
    s.on_touch_batch(
        0.0,
        &[TouchPoint::new(1, 100.0, 100.0), TouchPoint::new(2, 700.0, 500.0)],
    );
    assert_eq!(s.pulse(0.0), 3);
    assert_eq!(s.rings().spawned(), 3);
}

#[test]
fn lifted_pointer_clears_its_trail() {
    let mut s = scene();
    s.on_pointer_down(0.0, Vec2::new(100.0, 100.0));
    s.step();
    assert!(s.trails().line_count() > 0);
    s.on_pointer_up(20.0, Vec2::new(100.0, 100.0));
    s.step();
    assert_eq!(s.trails().line_count(), 0);
    assert!(s.tracker().is_empty());
}

#[test]
fn shutdown_stops_both_schedules() {
    let mut s = scene();
    s.on_pointer_down(0.0, Vec2::new(1.0, 1.0));
    assert!(s.is_running());
    s.shutdown();
    assert!(!s.is_running());
    assert!(s.tracker().is_empty());
    let summary = s.advance(Duration::from_secs(1), 1.0);
    assert_eq!(summary, AdvanceSummary::default());
}

#[test]
fn pool_wraps_under_sustained_input() {
    let params = SceneParams {
        rings: RingParams {
            capacity: 4,
            segments: 8,
            band_width: 10.0,
        },
        ..SceneParams::default()
    };
    let mut s = RingScene::new(params, VIEWPORT).unwrap();
    s.on_pointer_down(0.0, Vec2::new(400.0, 300.0));
    for i in 0..6 {
        s.advance(Duration::from_millis(100), i as f32 * 0.1);
    }
    assert_eq!(s.rings().spawned(), 6);
    assert_eq!(s.rings().live_count(), 4);
    assert_eq!(s.rings().cursor(), 2);
    assert!(s.rings_mut().flush().is_some());
}

#[test]
fn bad_params_fail_construction() {
    let params = SceneParams {
        step_period: Duration::ZERO,
        ..SceneParams::default()
    };
    assert_eq!(RingScene::new(params, VIEWPORT).err(), Some(ConfigError::ZeroPeriod));

    let params = SceneParams {
        expansion_speed: -1.0,
        ..SceneParams::default()
    };
    assert!(RingScene::new(params, VIEWPORT).is_err());
}
