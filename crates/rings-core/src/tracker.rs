//! Multi-pointer motion tracking.
//!
//! Every concurrent touch, plus the mouse under [`PointerId::Mouse`], gets a
//! [`PointerTrack`] that lives exactly as long as the contact. Input events
//! only record raw positions; [`MotionTracker::tick`] does the filtering,
//! curve growth, trail resampling and velocity estimation on a fixed step.

use crate::constants::{APPEND_EPSILON, CURSOR_SPEED_PER_SEC, FILTER_BLEND};
use crate::error::ConfigError;
use crate::spline::{CurveParams, SplineCurve};
use fnv::FnvHashMap;
use glam::{Vec2, Vec3};
use smallvec::SmallVec;

/// Stable key of a pointer for as long as it touches.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum PointerId {
    Touch(u64),
    Mouse,
}

/// One entry of a touch-list style batch event.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct TouchPoint {
    pub id: u64,
    pub position: Vec2,
}

impl TouchPoint {
    pub fn new(id: u64, x: f32, y: f32) -> Self {
        Self {
            id,
            position: Vec2::new(x, y),
        }
    }
}

/// Acquires and releases whatever a collaborator binds to a pointer's
/// lifetime (an audio voice, for instance).
///
/// `on_create` runs once when a track appears; `on_destroy` receives the same
/// resource back exactly once when the track is removed.
pub trait TrackHooks {
    type Resource;

    fn on_create(&mut self, id: PointerId, position: Vec2) -> Self::Resource;

    fn on_destroy(&mut self, id: PointerId, resource: Self::Resource);
}

/// Hooks that bind nothing.
#[derive(Clone, Copy, Debug, Default)]
pub struct NoHooks;

impl TrackHooks for NoHooks {
    type Resource = ();

    fn on_create(&mut self, _id: PointerId, _position: Vec2) {}

    fn on_destroy(&mut self, _id: PointerId, _resource: ()) {}
}

#[derive(Clone, Debug, PartialEq)]
pub struct TrackerParams {
    /// Weight of the raw position in the per-step low-pass filter.
    pub filter_blend: f32,
    /// Filtered travel needed before a new control point is appended.
    pub append_epsilon: f32,
    /// Speed of the trail head along its curve, in units per second.
    pub cursor_speed: f32,
    pub curve: CurveParams,
}

impl Default for TrackerParams {
    fn default() -> Self {
        Self {
            filter_blend: FILTER_BLEND,
            append_epsilon: APPEND_EPSILON,
            cursor_speed: CURSOR_SPEED_PER_SEC,
            curve: CurveParams::default(),
        }
    }
}

impl TrackerParams {
    pub fn validate(&self) -> Result<(), ConfigError> {
        if !(self.filter_blend > 0.0 && self.filter_blend <= 1.0) {
            return Err(ConfigError::BlendOutOfRange(self.filter_blend));
        }
        if !self.append_epsilon.is_finite() || self.append_epsilon < 0.0 {
            return Err(ConfigError::NotPositive {
                name: "append_epsilon",
                value: self.append_epsilon,
            });
        }
        ConfigError::require_positive("cursor_speed", self.cursor_speed)?;
        self.curve.validate()
    }
}

#[derive(Debug)]
pub struct PointerTrack<R = ()> {
    id: PointerId,
    raw: Vec2,
    last_time_ms: f64,
    filtered: Vec2,
    cursor: f32,
    position: Vec2,
    velocity: Vec2,
    curve: SplineCurve,
    trail: Vec<Vec3>,
    resource: R,
}

impl<R> PointerTrack<R> {
    fn new(id: PointerId, now_ms: f64, raw: Vec2, curve: CurveParams, resource: R) -> Self {
        let mut curve = SplineCurve::with_params(curve);
        curve.add_point(raw.extend(0.0));
        Self {
            id,
            raw,
            last_time_ms: now_ms,
            filtered: raw,
            cursor: 0.0,
            position: raw,
            velocity: Vec2::ZERO,
            curve,
            trail: Vec::new(),
            resource,
        }
    }

    pub fn id(&self) -> PointerId {
        self.id
    }

    /// Last position reported by the input device.
    pub fn raw_position(&self) -> Vec2 {
        self.raw
    }

    pub fn last_time_ms(&self) -> f64 {
        self.last_time_ms
    }

    pub fn filtered_position(&self) -> Vec2 {
        self.filtered
    }

    /// Arc length along the curve reached by the trail head.
    pub fn cursor(&self) -> f32 {
        self.cursor
    }

    /// Trail head, evaluated on the curve at the cursor.
    pub fn position(&self) -> Vec2 {
        self.position
    }

    /// Units per second, from the last two steps.
    pub fn velocity(&self) -> Vec2 {
        self.velocity
    }

    pub fn curve(&self) -> &SplineCurve {
        &self.curve
    }

    pub fn trail(&self) -> &[Vec3] {
        &self.trail
    }

    pub fn resource(&self) -> &R {
        &self.resource
    }

    // Returns false when `now_ms` does not move time forward.
    fn record(&mut self, now_ms: f64, raw: Vec2) -> bool {
        if now_ms > self.last_time_ms {
            self.raw = raw;
            self.last_time_ms = now_ms;
            true
        } else {
            false
        }
    }

    fn step(&mut self, dt_ms: f32, params: &TrackerParams) {
        let f = params.filter_blend;
        self.filtered = self.raw * f + self.filtered * (1.0 - f);

        let filtered = self.filtered.extend(0.0);
        let moved = self
            .curve
            .last_point()
            .map_or(true, |last| last.distance(filtered) > params.append_epsilon);
        if moved {
            self.curve.add_point(filtered);
        }

        let total = self.curve.total_length();
        self.trail.clear();
        self.trail
            .extend(self.curve.resample_range(self.cursor, total));

        self.cursor = (self.cursor + params.cursor_speed * dt_ms / 1000.0).min(total);
        let head = self
            .curve
            .point_at(self.curve.param_at_length(self.cursor))
            .truncate();
        self.velocity = (head - self.position) * (1000.0 / dt_ms);
        self.position = head;
    }
}

/// Read-only copy of a track handed to renderers and audio.
#[derive(Clone, Debug, PartialEq)]
pub struct TrackSnapshot {
    pub id: PointerId,
    pub position: Vec2,
    pub velocity: Vec2,
    pub trail: Vec<Vec3>,
}

/// Mutable view on one track's hook resource, with the state needed to drive it.
pub struct ResourceSlot<'a, R> {
    pub id: PointerId,
    pub position: Vec2,
    pub velocity: Vec2,
    pub resource: &'a mut R,
}

pub struct MotionTracker<H: TrackHooks = NoHooks> {
    tracks: FnvHashMap<PointerId, PointerTrack<H::Resource>>,
    hooks: H,
    params: TrackerParams,
    mouse_down: bool,
}

impl MotionTracker<NoHooks> {
    pub fn new(params: TrackerParams) -> Result<Self, ConfigError> {
        Self::with_hooks(params, NoHooks)
    }
}

impl<H: TrackHooks> MotionTracker<H> {
    pub fn with_hooks(params: TrackerParams, hooks: H) -> Result<Self, ConfigError> {
        params.validate()?;
        Ok(Self {
            tracks: FnvHashMap::default(),
            hooks,
            params,
            mouse_down: false,
        })
    }

    pub fn params(&self) -> &TrackerParams {
        &self.params
    }

    pub fn hooks(&self) -> &H {
        &self.hooks
    }

    pub fn hooks_mut(&mut self) -> &mut H {
        &mut self.hooks
    }

    pub fn len(&self) -> usize {
        self.tracks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tracks.is_empty()
    }

    pub fn is_mouse_down(&self) -> bool {
        self.mouse_down
    }

    pub fn contains(&self, id: PointerId) -> bool {
        self.tracks.contains_key(&id)
    }

    pub fn track(&self, id: PointerId) -> Option<&PointerTrack<H::Resource>> {
        self.tracks.get(&id)
    }

    /// Live tracks in no particular order.
    pub fn iter(&self) -> impl Iterator<Item = &PointerTrack<H::Resource>> {
        self.tracks.values()
    }

    fn create(&mut self, id: PointerId, now_ms: f64, position: Vec2) {
        let resource = self.hooks.on_create(id, position);
        let track = PointerTrack::new(id, now_ms, position, self.params.curve.clone(), resource);
        self.tracks.insert(id, track);
        log::debug!(
            "[tracker] create {:?} at ({:.1},{:.1})",
            id,
            position.x,
            position.y
        );
    }

    fn destroy(&mut self, id: PointerId) {
        if let Some(track) = self.tracks.remove(&id) {
            self.hooks.on_destroy(id, track.resource);
            log::debug!("[tracker] destroy {:?}", id);
        }
    }

    fn upsert(&mut self, id: PointerId, now_ms: f64, position: Vec2) {
        match self.tracks.get_mut(&id) {
            Some(track) => {
                if !track.record(now_ms, position) {
                    log::trace!("[tracker] {:?} ignored non-advancing time", id);
                }
            }
            None => self.create(id, now_ms, position),
        }
    }

    /// Applies a touch-list event: `points` holds every touch still in contact.
    ///
    /// Touches missing from the list are finalized and removed, whether or not
    /// an explicit end event was seen for them. The mouse track is left alone.
    pub fn on_touch_batch(&mut self, now_ms: f64, points: &[TouchPoint]) {
        let mut seen: SmallVec<[PointerId; 10]> = SmallVec::new();
        for p in points {
            let id = PointerId::Touch(p.id);
            self.upsert(id, now_ms, p.position);
            seen.push(id);
        }
        let gone: SmallVec<[PointerId; 10]> = self
            .tracks
            .keys()
            .copied()
            .filter(|id| matches!(id, PointerId::Touch(_)) && !seen.contains(id))
            .collect();
        for id in gone {
            self.destroy(id);
        }
    }

    pub fn on_pointer_down(&mut self, now_ms: f64, position: Vec2) {
        self.mouse_down = true;
        self.upsert(PointerId::Mouse, now_ms, position);
    }

    pub fn on_pointer_move(&mut self, now_ms: f64, position: Vec2) {
        if !self.mouse_down {
            return;
        }
        if let Some(track) = self.tracks.get_mut(&PointerId::Mouse) {
            track.record(now_ms, position);
        }
    }

    pub fn on_pointer_up(&mut self, _now_ms: f64, _position: Vec2) {
        self.mouse_down = false;
        self.destroy(PointerId::Mouse);
    }

    /// Advances every live track by `dt_ms`. A non-positive step is ignored.
    pub fn tick(&mut self, dt_ms: f32) {
        if !dt_ms.is_finite() || dt_ms <= 0.0 {
            return;
        }
        for track in self.tracks.values_mut() {
            track.step(dt_ms, &self.params);
        }
    }

    /// Owned copies of every live track, ordered by id.
    pub fn active_tracks(&self) -> Vec<TrackSnapshot> {
        let mut out: Vec<TrackSnapshot> = self
            .tracks
            .values()
            .map(|t| TrackSnapshot {
                id: t.id,
                position: t.position,
                velocity: t.velocity,
                trail: t.trail.clone(),
            })
            .collect();
        out.sort_by_key(|s| s.id);
        out
    }

    pub fn resources_mut(&mut self) -> impl Iterator<Item = ResourceSlot<'_, H::Resource>> {
        self.tracks.values_mut().map(|t| ResourceSlot {
            id: t.id,
            position: t.position,
            velocity: t.velocity,
            resource: &mut t.resource,
        })
    }

    /// Finalizes and removes every track.
    pub fn release_all(&mut self) {
        let ids: Vec<PointerId> = self.tracks.keys().copied().collect();
        for id in ids {
            self.destroy(id);
        }
        self.mouse_down = false;
    }
}

impl<H: TrackHooks> Drop for MotionTracker<H> {
    fn drop(&mut self) {
        self.release_all();
    }
}
