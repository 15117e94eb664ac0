//! Fixed pool of expanding ring events laid out for a GPU vertex buffer.
//!
//! Each ring is a closed band of `2 * (segments + 1)` vertices: an inner row at
//! the spawn point and an outer row `band_width` further out. Attributes are
//! kept as parallel arrays so each one can be uploaded on its own, and only the
//! slots written since the last [`RingEventBuffer::flush`] need to go up.

use crate::constants::{MAX_RINGS, RING_BAND_WIDTH, RING_SEGMENTS};
use crate::error::ConfigError;
use glam::Vec2;
use std::ops::Range;

#[derive(Clone, Debug, PartialEq)]
pub struct RingParams {
    pub capacity: usize,
    /// Angular segments per ring; each becomes one quad of the band.
    pub segments: usize,
    pub band_width: f32,
}

impl Default for RingParams {
    fn default() -> Self {
        Self {
            capacity: MAX_RINGS,
            segments: RING_SEGMENTS,
            band_width: RING_BAND_WIDTH,
        }
    }
}

impl RingParams {
    pub fn vertices_per_ring(&self) -> usize {
        2 * (self.segments + 1)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.capacity == 0 {
            return Err(ConfigError::ZeroCapacity);
        }
        if self.segments < 3 {
            return Err(ConfigError::TooFewSegments(self.segments));
        }
        let vertices_per_ring = self.vertices_per_ring();
        let fits = self
            .capacity
            .checked_mul(vertices_per_ring)
            .is_some_and(|v| v <= u32::MAX as usize);
        if !fits {
            return Err(ConfigError::IndexOverflow {
                rings: self.capacity,
                vertices_per_ring,
            });
        }
        if !self.band_width.is_finite() || self.band_width < 0.0 {
            return Err(ConfigError::NotPositive {
                name: "band_width",
                value: self.band_width,
            });
        }
        Ok(())
    }
}

/// Per-vertex attribute streams of the ring pool.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum RingAttribute {
    StartPosition,
    Velocity,
    Direction,
    StartTime,
}

impl RingAttribute {
    pub const ALL: [RingAttribute; 4] = [
        RingAttribute::StartPosition,
        RingAttribute::Velocity,
        RingAttribute::Direction,
        RingAttribute::StartTime,
    ];

    /// Floats per vertex.
    pub fn components(self) -> usize {
        match self {
            RingAttribute::StartTime => 1,
            _ => 2,
        }
    }
}

/// Ring slots written since the last flush.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum DirtySlots {
    Span { offset: usize, count: usize },
    All,
}

/// Part of one attribute array to re-upload, in float elements.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum UploadRange {
    Span { offset: usize, count: usize },
    All,
}

impl UploadRange {
    /// `(offset, count)` with `count == -1` standing for the whole array.
    pub fn as_offset_count(self) -> (usize, isize) {
        match self {
            UploadRange::Span { offset, count } => (offset, count as isize),
            UploadRange::All => (0, -1),
        }
    }

    /// Element range within an array of `len` floats.
    pub fn elements(self, len: usize) -> Range<usize> {
        match self {
            UploadRange::Span { offset, count } => offset.min(len)..(offset + count).min(len),
            UploadRange::All => 0..len,
        }
    }

    /// Byte range within an array of `len` floats.
    pub fn bytes(self, len: usize) -> Range<usize> {
        let size = std::mem::size_of::<f32>();
        let r = self.elements(len);
        r.start * size..r.end * size
    }
}

/// Upload ranges for every attribute, produced by [`RingEventBuffer::flush`].
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct RingUpload {
    pub start_position: UploadRange,
    pub velocity: UploadRange,
    pub direction: UploadRange,
    pub start_time: UploadRange,
}

impl RingUpload {
    pub fn range(&self, attr: RingAttribute) -> UploadRange {
        match attr {
            RingAttribute::StartPosition => self.start_position,
            RingAttribute::Velocity => self.velocity,
            RingAttribute::Direction => self.direction,
            RingAttribute::StartTime => self.start_time,
        }
    }
}

/// A ring as it was spawned, read back from the attribute arrays.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct RingRecord {
    pub position: Vec2,
    pub center_velocity: Vec2,
    pub expansion_speed: f32,
    pub time: f32,
}

pub struct RingEventBuffer {
    params: RingParams,
    vertices_per_ring: usize,
    start_position: Vec<[f32; 2]>,
    velocity: Vec<[f32; 2]>,
    direction: Vec<[f32; 2]>,
    start_time: Vec<f32>,
    indices: Vec<u32>,
    // (cos, sin) for each of the segments + 1 angular steps
    unit_circle: Vec<Vec2>,
    cursor: usize,
    pending: Option<DirtySlots>,
    spawned: u64,
}

impl RingEventBuffer {
    pub fn new(params: RingParams) -> Result<Self, ConfigError> {
        params.validate()?;
        let segments = params.segments;
        let vertices_per_ring = params.vertices_per_ring();
        let vertex_count = params.capacity * vertices_per_ring;

        let unit_circle = (0..=segments)
            .map(|j| {
                let angle = std::f32::consts::TAU * j as f32 / segments as f32;
                Vec2::new(angle.cos(), angle.sin())
            })
            .collect();

        let mut indices = Vec::with_capacity(params.capacity * segments * 6);
        for ring in 0..params.capacity {
            let base = (ring * vertices_per_ring) as u32;
            let s = segments as u32;
            for j in 0..s {
                // quad in counter-clockwise order: inner j, outer j, outer j+1, inner j+1
                let i0 = base + j;
                let i1 = base + j + s + 1;
                let i2 = base + j + s + 2;
                let i3 = base + j + 1;
                indices.extend_from_slice(&[i0, i1, i3, i1, i2, i3]);
            }
        }

        log::debug!(
            "[rings] pool of {} rings, {} vertices, {} indices",
            params.capacity,
            vertex_count,
            indices.len()
        );

        Ok(Self {
            params,
            vertices_per_ring,
            start_position: vec![[0.0; 2]; vertex_count],
            velocity: vec![[0.0; 2]; vertex_count],
            direction: vec![[0.0; 2]; vertex_count],
            start_time: vec![0.0; vertex_count],
            indices,
            unit_circle,
            cursor: 0,
            pending: None,
            spawned: 0,
        })
    }

    pub fn params(&self) -> &RingParams {
        &self.params
    }

    pub fn capacity(&self) -> usize {
        self.params.capacity
    }

    pub fn vertices_per_ring(&self) -> usize {
        self.vertices_per_ring
    }

    pub fn vertex_count(&self) -> usize {
        self.start_time.len()
    }

    /// Slot the next spawn writes to.
    pub fn cursor(&self) -> usize {
        self.cursor
    }

    /// Rings spawned so far, including overwritten ones.
    pub fn spawned(&self) -> u64 {
        self.spawned
    }

    pub fn live_count(&self) -> usize {
        self.spawned.min(self.params.capacity as u64) as usize
    }

    /// Writes a ring into the next slot, overwriting the oldest once full.
    /// Returns the slot written.
    pub fn spawn(
        &mut self,
        position: Vec2,
        center_velocity: Vec2,
        time: f32,
        expansion_speed: f32,
    ) -> usize {
        let slot = self.cursor;
        let row_len = self.params.segments + 1;
        let first = slot * self.vertices_per_ring;
        for row in 0..2 {
            let offset = self.params.band_width * row as f32;
            for (j, dir) in self.unit_circle.iter().enumerate() {
                let index = first + row * row_len + j;
                self.start_position[index] = (position + *dir * offset).to_array();
                self.velocity[index] = center_velocity.to_array();
                self.direction[index] = (*dir * expansion_speed).to_array();
                self.start_time[index] = time;
            }
        }
        self.mark_dirty(slot);
        self.cursor = (slot + 1) % self.params.capacity;
        self.spawned += 1;
        if self.cursor == 0 {
            log::trace!("[rings] write cursor wrapped after {} spawns", self.spawned);
        }
        slot
    }

    fn mark_dirty(&mut self, slot: usize) {
        self.pending = Some(match self.pending {
            None => DirtySlots::Span {
                offset: slot,
                count: 1,
            },
            // contiguous and not wrapped: offset + count < capacity here
            Some(DirtySlots::Span { offset, count }) if offset + count == slot => {
                DirtySlots::Span {
                    offset,
                    count: count + 1,
                }
            }
            Some(DirtySlots::Span { .. }) => {
                log::trace!("[rings] pending range wrapped, uploading everything");
                DirtySlots::All
            }
            Some(DirtySlots::All) => DirtySlots::All,
        });
    }

    pub fn pending(&self) -> Option<DirtySlots> {
        self.pending
    }

    /// Converts pending slots into per-attribute element ranges and clears them.
    pub fn flush(&mut self) -> Option<RingUpload> {
        let pending = self.pending.take()?;
        let vpr = self.vertices_per_ring;
        let range = |components: usize| match pending {
            DirtySlots::Span { offset, count } => UploadRange::Span {
                offset: offset * vpr * components,
                count: count * vpr * components,
            },
            DirtySlots::All => UploadRange::All,
        };
        Some(RingUpload {
            start_position: range(RingAttribute::StartPosition.components()),
            velocity: range(RingAttribute::Velocity.components()),
            direction: range(RingAttribute::Direction.components()),
            start_time: range(RingAttribute::StartTime.components()),
        })
    }

    /// Reads back the ring stored in `slot`.
    pub fn ring(&self, slot: usize) -> Option<RingRecord> {
        if slot >= self.params.capacity {
            return None;
        }
        // inner row, angle 0: direction is (speed, 0)
        let first = slot * self.vertices_per_ring;
        Some(RingRecord {
            position: Vec2::from(self.start_position[first]),
            center_velocity: Vec2::from(self.velocity[first]),
            expansion_speed: self.direction[first][0],
            time: self.start_time[first],
        })
    }

    pub fn start_positions(&self) -> &[[f32; 2]] {
        &self.start_position
    }

    pub fn velocities(&self) -> &[[f32; 2]] {
        &self.velocity
    }

    pub fn directions(&self) -> &[[f32; 2]] {
        &self.direction
    }

    pub fn start_times(&self) -> &[f32] {
        &self.start_time
    }

    /// Triangle list joining each ring's inner and outer rows.
    pub fn indices(&self) -> &[u32] {
        &self.indices
    }

    pub fn attribute_bytes(&self, attr: RingAttribute) -> &[u8] {
        match attr {
            RingAttribute::StartPosition => bytemuck::cast_slice(&self.start_position),
            RingAttribute::Velocity => bytemuck::cast_slice(&self.velocity),
            RingAttribute::Direction => bytemuck::cast_slice(&self.direction),
            RingAttribute::StartTime => bytemuck::cast_slice(&self.start_time),
        }
    }

    /// Floats in one attribute array.
    pub fn attribute_len(&self, attr: RingAttribute) -> usize {
        self.vertex_count() * attr.components()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unit_circle_closes_on_itself() {
        let buf = RingEventBuffer::new(RingParams {
            capacity: 1,
            segments: 8,
            band_width: 1.0,
        })
        .unwrap();
        let first = buf.unit_circle[0];
        let last = buf.unit_circle[8];
        assert!((first - last).length() < 1e-5);
    }

    #[test]
    fn all_marker_is_sticky_until_flush() {
        let mut buf = RingEventBuffer::new(RingParams {
            capacity: 2,
            segments: 3,
            band_width: 1.0,
        })
        .unwrap();
        for _ in 0..3 {
            buf.spawn(Vec2::ZERO, Vec2::ZERO, 0.0, 1.0);
        }
        assert_eq!(buf.pending(), Some(DirtySlots::All));
        buf.spawn(Vec2::ZERO, Vec2::ZERO, 0.0, 1.0);
        assert_eq!(buf.pending(), Some(DirtySlots::All));
        assert!(buf.flush().is_some());
        assert_eq!(buf.pending(), None);
    }
}
