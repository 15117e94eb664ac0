//! The composed system: pointer tracks feeding ring spawns and trail lines on
//! two fixed schedules.
//!
//! A front-end constructs one [`RingScene`], forwards input events to it and
//! calls [`RingScene::advance`] once per rendered frame.

use crate::constants::{PULSE_PERIOD_MS, RING_EXPANSION_SPEED, STEP_PERIOD_MS};
use crate::error::ConfigError;
use crate::rings::{RingEventBuffer, RingParams};
use crate::scheduler::{Scheduler, TaskId};
use crate::tracker::{MotionTracker, NoHooks, TouchPoint, TrackHooks, TrackerParams};
use crate::trails::{TrailLineBuffer, TrailParams};
use glam::Vec2;
use std::time::Duration;

#[derive(Clone, Debug, PartialEq)]
pub struct SceneParams {
    pub tracker: TrackerParams,
    pub rings: RingParams,
    pub trails: TrailParams,
    pub step_period: Duration,
    pub pulse_period: Duration,
    /// Radial speed of new rings, in units per second.
    pub expansion_speed: f32,
}

impl Default for SceneParams {
    fn default() -> Self {
        Self {
            tracker: TrackerParams::default(),
            rings: RingParams::default(),
            trails: TrailParams::default(),
            step_period: Duration::from_millis(STEP_PERIOD_MS),
            pulse_period: Duration::from_millis(PULSE_PERIOD_MS),
            expansion_speed: RING_EXPANSION_SPEED,
        }
    }
}

impl SceneParams {
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.tracker.validate()?;
        self.rings.validate()?;
        if self.step_period.is_zero() || self.pulse_period.is_zero() {
            return Err(ConfigError::ZeroPeriod);
        }
        ConfigError::require_positive("expansion_speed", self.expansion_speed)
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SceneTask {
    Step,
    Pulse,
}

/// What one [`RingScene::advance`] did.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct AdvanceSummary {
    pub steps: u32,
    pub pulses: u32,
    pub rings_spawned: u32,
}

/// Maps input coordinates (origin top-left, y down) to ring coordinates
/// (origin at the viewport centre, y up).
pub fn screen_to_centered(p: Vec2, viewport: Vec2) -> Vec2 {
    Vec2::new(p.x - viewport.x * 0.5, viewport.y * 0.5 - p.y)
}

pub struct RingScene<H: TrackHooks = NoHooks> {
    tracker: MotionTracker<H>,
    rings: RingEventBuffer,
    trails: TrailLineBuffer,
    scheduler: Scheduler<SceneTask>,
    step_task: Option<TaskId>,
    pulse_task: Option<TaskId>,
    step_ms: f32,
    expansion_speed: f32,
    viewport: Vec2,
    due: Vec<SceneTask>,
}

impl RingScene<NoHooks> {
    pub fn new(params: SceneParams, viewport: Vec2) -> Result<Self, ConfigError> {
        Self::with_hooks(params, viewport, NoHooks)
    }
}

impl<H: TrackHooks> RingScene<H> {
    pub fn with_hooks(params: SceneParams, viewport: Vec2, hooks: H) -> Result<Self, ConfigError> {
        params.validate()?;
        let mut scheduler = Scheduler::new();
        // step first: a pulse in the same advance must see advanced tracks
        let step_task = scheduler.register(params.step_period, SceneTask::Step)?;
        let pulse_task = scheduler.register(params.pulse_period, SceneTask::Pulse)?;
        log::info!(
            "[scene] step every {:?}, pulse every {:?}, {} ring slots",
            params.step_period,
            params.pulse_period,
            params.rings.capacity
        );
        Ok(Self {
            tracker: MotionTracker::with_hooks(params.tracker, hooks)?,
            rings: RingEventBuffer::new(params.rings)?,
            trails: TrailLineBuffer::new(params.trails)?,
            scheduler,
            step_task: Some(step_task),
            pulse_task: Some(pulse_task),
            step_ms: params.step_period.as_secs_f32() * 1000.0,
            expansion_speed: params.expansion_speed,
            viewport,
            due: Vec::new(),
        })
    }

    pub fn viewport(&self) -> Vec2 {
        self.viewport
    }

    pub fn set_viewport(&mut self, viewport: Vec2) {
        self.viewport = viewport;
    }

    pub fn tracker(&self) -> &MotionTracker<H> {
        &self.tracker
    }

    pub fn tracker_mut(&mut self) -> &mut MotionTracker<H> {
        &mut self.tracker
    }

    pub fn rings(&self) -> &RingEventBuffer {
        &self.rings
    }

    /// Mutable access for the GPU owner, which flushes dirty ranges.
    pub fn rings_mut(&mut self) -> &mut RingEventBuffer {
        &mut self.rings
    }

    pub fn trails(&self) -> &TrailLineBuffer {
        &self.trails
    }

    /// Both GPU-facing buffers at once, for an upload pass.
    pub fn buffers_mut(&mut self) -> (&mut RingEventBuffer, &TrailLineBuffer) {
        (&mut self.rings, &self.trails)
    }

    pub fn on_touch_batch(&mut self, now_ms: f64, points: &[TouchPoint]) {
        self.tracker.on_touch_batch(now_ms, points);
    }

    pub fn on_pointer_down(&mut self, now_ms: f64, position: Vec2) {
        self.tracker.on_pointer_down(now_ms, position);
    }

    pub fn on_pointer_move(&mut self, now_ms: f64, position: Vec2) {
        self.tracker.on_pointer_move(now_ms, position);
    }

    pub fn on_pointer_up(&mut self, now_ms: f64, position: Vec2) {
        self.tracker.on_pointer_up(now_ms, position);
    }

    /// Runs every step and pulse that fell due during `dt`.
    /// `now_sec` stamps rings spawned by the pulses.
    pub fn advance(&mut self, dt: Duration, now_sec: f32) -> AdvanceSummary {
        let mut due = std::mem::take(&mut self.due);
        due.clear();
        self.scheduler.advance(dt, &mut due);

        let mut summary = AdvanceSummary::default();
        for task in &due {
            match task {
                SceneTask::Step => {
                    self.step();
                    summary.steps += 1;
                }
                SceneTask::Pulse => {
                    summary.rings_spawned += self.pulse(now_sec);
                    summary.pulses += 1;
                }
            }
        }
        self.due = due;
        summary
    }

    /// One simulation step: advance tracks, then rebuild the trail lines.
    pub fn step(&mut self) {
        self.tracker.tick(self.step_ms);
        self.trails.clear_lines();
        for track in self.tracker.iter() {
            self.trails.add_polyline(track.trail());
        }
    }

    /// Spawns one ring at every live track. Returns how many were spawned.
    pub fn pulse(&mut self, now_sec: f32) -> u32 {
        let mut spawned = 0;
        for track in self.tracker.iter() {
            let position = screen_to_centered(track.position(), self.viewport);
            let v = track.velocity();
            self.rings
                .spawn(position, Vec2::new(v.x, -v.y), now_sec, self.expansion_speed);
            spawned += 1;
        }
        spawned
    }

    /// Stops both schedules and finalizes every track.
    pub fn shutdown(&mut self) {
        for id in [self.step_task.take(), self.pulse_task.take()]
            .into_iter()
            .flatten()
        {
            self.scheduler.cancel(id);
        }
        self.tracker.release_all();
        self.trails.clear_lines();
        log::info!("[scene] shut down");
    }

    pub fn is_running(&self) -> bool {
        !self.scheduler.is_empty()
    }
}
