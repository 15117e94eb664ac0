// Integration tests for the render-loop driven periodic scheduler.

use rings_core::{ConfigError, Scheduler};
use std::time::Duration;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum Task {
    Step,
    Pulse,
}

fn two_tasks() -> Scheduler<Task> {
    let mut s = Scheduler::new();
    s.register(Duration::from_millis(16), Task::Step).unwrap();
    s.register(Duration::from_millis(100), Task::Pulse).unwrap();
    s
}

#[test]
fn earlier_registrations_fire_first() {
    let mut s = two_tasks();
    let mut out = Vec::new();
    s.advance(Duration::from_millis(100), &mut out);
    let mut expected = vec![Task::Step; 6];
    expected.push(Task::Pulse);
    assert_eq!(out, expected);
}

#[test]
fn nothing_fires_before_a_full_period() {
    let mut s = two_tasks();
    let mut out = Vec::new();
    s.advance(Duration::from_millis(15), &mut out);
    assert!(out.is_empty());
    s.advance(Duration::from_millis(1), &mut out);
    assert_eq!(out, vec![Task::Step]);
}

#[test]
fn relative_cadence_survives_irregular_frames() {
    let mut s = two_tasks();
    let mut out = Vec::new();
    // 1 s in uneven frames
    for ms in [7u64, 33, 16, 50, 4, 90, 17, 3, 120, 100, 110, 120, 80, 110, 70, 70] {
        s.advance(Duration::from_millis(ms), &mut out);
    }
    let steps = out.iter().filter(|t| **t == Task::Step).count();
    let pulses = out.iter().filter(|t| **t == Task::Pulse).count();
    assert_eq!(steps, 62);
    assert_eq!(pulses, 10);
}

#[test]
fn long_stall_is_capped() {
    let mut s = two_tasks().with_max_catch_up(8);
    let mut out = Vec::new();
    s.advance(Duration::from_secs(5), &mut out);
    let steps = out.iter().filter(|t| **t == Task::Step).count();
    let pulses = out.iter().filter(|t| **t == Task::Pulse).count();
    assert_eq!(steps, 8);
    assert_eq!(pulses, 8);
}

#[test]
fn cancelled_task_stops_firing() {
    let mut s = Scheduler::new();
    let step = s.register(Duration::from_millis(16), Task::Step).unwrap();
    let pulse = s.register(Duration::from_millis(100), Task::Pulse).unwrap();
    assert_eq!(s.len(), 2);
    assert_eq!(s.period(pulse), Some(Duration::from_millis(100)));

    assert!(s.cancel(step));
    assert!(!s.cancel(step));
    assert_eq!(s.period(step), None);

    let mut out = Vec::new();
    s.advance(Duration::from_millis(100), &mut out);
    assert_eq!(out, vec![Task::Pulse]);

    assert!(s.cancel(pulse));
    assert!(s.is_empty());
}

#[test]
fn zero_period_is_rejected() {
    let mut s: Scheduler<Task> = Scheduler::default();
    assert_eq!(
        s.register(Duration::ZERO, Task::Step),
        Err(ConfigError::ZeroPeriod)
    );
    assert!(s.is_empty());
}
