//! Line-segment vertex buffer that trail polylines are packed into each step.

use crate::constants::MAX_TRAIL_LINES;
use crate::error::ConfigError;
use crate::rings::UploadRange;
use glam::{Vec2, Vec3};
use std::ops::Range;

#[derive(Clone, Debug, PartialEq)]
pub struct TrailParams {
    pub max_lines: usize,
}

impl Default for TrailParams {
    fn default() -> Self {
        Self {
            max_lines: MAX_TRAIL_LINES,
        }
    }
}

/// Fixed storage for `max_lines` 2D segments, drawn as a line list.
///
/// Lines past capacity are dropped, never reallocated.
pub struct TrailLineBuffer {
    positions: Vec<[f32; 2]>,
    max_lines: usize,
    lines: usize,
}

impl TrailLineBuffer {
    pub fn new(params: TrailParams) -> Result<Self, ConfigError> {
        if params.max_lines == 0 {
            return Err(ConfigError::ZeroCapacity);
        }
        Ok(Self {
            positions: vec![[0.0; 2]; params.max_lines * 2],
            max_lines: params.max_lines,
            lines: 0,
        })
    }

    pub fn max_lines(&self) -> usize {
        self.max_lines
    }

    pub fn line_count(&self) -> usize {
        self.lines
    }

    pub fn is_full(&self) -> bool {
        self.lines >= self.max_lines
    }

    pub fn clear_lines(&mut self) {
        self.lines = 0;
    }

    /// Returns false when the buffer was already full.
    pub fn add_line(&mut self, a: Vec2, b: Vec2) -> bool {
        if self.is_full() {
            return false;
        }
        self.positions[2 * self.lines] = a.to_array();
        self.positions[2 * self.lines + 1] = b.to_array();
        self.lines += 1;
        true
    }

    /// Adds one segment per consecutive pair, dropping the z component.
    pub fn add_polyline(&mut self, points: &[Vec3]) {
        for pair in points.windows(2) {
            if !self.add_line(pair[0].truncate(), pair[1].truncate()) {
                log::trace!("[trails] line buffer full at {} lines", self.max_lines);
                break;
            }
        }
    }

    /// Vertex range to draw.
    pub fn draw_range(&self) -> Range<u32> {
        0..(2 * self.lines) as u32
    }

    /// Floats that changed since the buffer was cleared.
    pub fn upload_range(&self) -> UploadRange {
        UploadRange::Span {
            offset: 0,
            count: self.lines * 4,
        }
    }

    pub fn positions(&self) -> &[[f32; 2]] {
        &self.positions[..2 * self.lines]
    }

    /// Bytes of the used part of the buffer.
    pub fn as_bytes(&self) -> &[u8] {
        bytemuck::cast_slice(self.positions())
    }

    /// Size in bytes of the whole backing store, for sizing a GPU buffer.
    pub fn capacity_bytes(&self) -> usize {
        self.positions.len() * std::mem::size_of::<[f32; 2]>()
    }
}
