//! Cardinal (Catmull-Rom style) spline through 3D control points with a lazily
//! built arc-length table.
//!
//! The table maps uniformly sampled curve parameters to cumulative distance
//! along the curve. It is what lets trails be resampled evenly in space even
//! when control points arrive unevenly spaced.

use crate::constants::{DEFAULT_SAMPLES_PER_UNIT, DEFAULT_TENSION, MIN_RESAMPLE_POINTS};
use crate::error::ConfigError;
use glam::Vec3;
use std::cell::OnceCell;

/// Shape and sampling parameters of a [`SplineCurve`].
#[derive(Clone, Debug, PartialEq)]
pub struct CurveParams {
    /// Scale applied to `next - previous` when building knot tangents.
    pub tension: f32,
    /// Arc-length table samples (and resampled points) per unit of length.
    pub samples_per_unit: f32,
    /// Closed curve: the last point connects back to the first.
    pub looped: bool,
}

impl Default for CurveParams {
    fn default() -> Self {
        Self {
            tension: DEFAULT_TENSION,
            samples_per_unit: DEFAULT_SAMPLES_PER_UNIT,
            looped: false,
        }
    }
}

impl CurveParams {
    pub fn validate(&self) -> Result<(), ConfigError> {
        ConfigError::require_positive("samples_per_unit", self.samples_per_unit)?;
        if !self.tension.is_finite() {
            return Err(ConfigError::NotPositive {
                name: "tension",
                value: self.tension,
            });
        }
        Ok(())
    }
}

#[derive(Clone, Debug, Default)]
pub struct SplineCurve {
    points: Vec<Vec3>,
    params: CurveParams,
    // Sum of straight-line distances between consecutive control points.
    linear_length: f32,
    // Cumulative arc length at `i / samples`, cleared on every append.
    lengths: OnceCell<Vec<f32>>,
}

impl SplineCurve {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_params(params: CurveParams) -> Self {
        Self {
            params,
            ..Self::default()
        }
    }

    pub fn params(&self) -> &CurveParams {
        &self.params
    }

    pub fn set_loop(&mut self, looped: bool) {
        self.params.looped = looped;
        self.lengths = OnceCell::new();
    }

    pub fn set_tension(&mut self, tension: f32) {
        self.params.tension = tension;
        self.lengths = OnceCell::new();
    }

    pub fn points(&self) -> &[Vec3] {
        &self.points
    }

    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    pub fn last_point(&self) -> Option<Vec3> {
        self.points.last().copied()
    }

    /// Approximate length from control-point chords; needs no table rebuild.
    pub fn linear_length(&self) -> f32 {
        self.linear_length
    }

    /// Appends a control point and invalidates the arc-length table.
    pub fn add_point(&mut self, p: Vec3) {
        if let Some(prev) = self.points.last() {
            let d = prev.distance(p);
            if d.is_finite() {
                self.linear_length += d;
            }
        }
        self.points.push(p);
        self.lengths = OnceCell::new();
    }

    fn segment_count(&self) -> usize {
        let n = self.points.len();
        if self.params.looped {
            n.max(2)
        } else {
            n.saturating_sub(1).max(1)
        }
    }

    /// Position at `t` in `[0, 1]` across the whole curve.
    ///
    /// Open curves clamp missing neighbours to the endpoints, so `t = 0` and
    /// `t = 1` land exactly on the first and last control points.
    pub fn point_at(&self, t: f32) -> Vec3 {
        let n = self.points.len();
        match n {
            0 => return Vec3::ZERO,
            1 => return self.points[0],
            _ => {}
        }
        let segments = self.segment_count();
        let (seg, u) = if t >= 1.0 {
            (segments - 1, 1.0)
        } else {
            // f32::max drops NaN in favour of 0
            let x = t.max(0.0) * segments as f32;
            let seg = (x as usize).min(segments - 1);
            (seg, x - seg as f32)
        };

        let looped = self.params.looped;
        let last = n as isize - 1;
        let index = |k: isize| -> usize {
            if looped {
                k.rem_euclid(n as isize) as usize
            } else {
                k.clamp(0, last) as usize
            }
        };
        let seg = seg as isize;
        let n0 = self.points[index(seg - 1)];
        let n1 = self.points[index(seg)];
        let n2 = self.points[index(seg + 1)];
        let n3 = self.points[index(seg + 2)];

        let tension = self.params.tension;
        let m0 = (n2 - n0) * tension;
        let m1 = (n3 - n1) * tension;

        let inv = 1.0 - u;
        let h00 = (1.0 + 2.0 * u) * inv * inv;
        let h10 = u * inv * inv;
        let h01 = u * u * (3.0 - 2.0 * u);
        let h11 = u * u * (u - 1.0);
        n1 * h00 + m0 * h10 + n2 * h01 + m1 * h11
    }

    fn table_samples(&self) -> usize {
        let wanted = (self.params.samples_per_unit * self.linear_length).ceil();
        (wanted as usize).max(1)
    }

    fn build_length_table(&self) -> Vec<f32> {
        let samples = self.table_samples();
        let mut table = Vec::with_capacity(samples + 1);
        table.push(0.0);
        let mut total = 0.0f32;
        let mut last = self.point_at(0.0);
        for i in 1..=samples {
            let p = self.point_at(i as f32 / samples as f32);
            let d = p.distance(last);
            if d.is_finite() {
                total += d;
            }
            table.push(total);
            last = p;
        }
        log::trace!(
            "[spline] rebuilt length table: {} samples, total {:.2}",
            samples,
            total
        );
        table
    }

    /// The arc-length table, rebuilt first if a point was appended since the
    /// last query. Entry `i` is the length at parameter `i / (len - 1)`.
    pub fn calculate_lengths(&self) -> &[f32] {
        self.lengths.get_or_init(|| self.build_length_table())
    }

    /// Arc length from the start of the curve to parameter `t`.
    pub fn length_at(&self, t: f32) -> f32 {
        let table = self.calculate_lengths();
        let samples = table.len() - 1;
        if t >= 1.0 {
            return table[samples];
        }
        if t.is_nan() || t <= 0.0 {
            return 0.0;
        }
        let x = t * samples as f32;
        let i = (x as usize).min(samples - 1);
        let frac = x - i as f32;
        table[i] + (table[i + 1] - table[i]) * frac
    }

    pub fn total_length(&self) -> f32 {
        self.length_at(1.0)
    }

    /// Inverse of [`length_at`](Self::length_at).
    pub fn param_at_length(&self, len: f32) -> f32 {
        let table = self.calculate_lengths();
        let last = table.len() - 1;
        if len.is_nan() || len <= 0.0 {
            return 0.0;
        }
        if len >= table[last] {
            return 1.0;
        }
        // table[lo] <= len < table[hi] holds throughout
        let mut lo = 0usize;
        let mut hi = last;
        while hi - lo > 1 {
            let mid = lo + (hi - lo) / 2;
            if table[mid] <= len {
                lo = mid;
            } else {
                hi = mid;
            }
        }
        let (l0, l1) = (table[lo], table[hi]);
        let frac = (len - l0) / (l1 - l0);
        (lo as f32 + frac) / last as f32
    }

    /// Points evenly spaced in arc length over the whole curve.
    ///
    /// A closed curve omits the final sample, which would duplicate the first.
    pub fn resampled(&self) -> Resampled<'_> {
        let total = self.total_length();
        Resampled::new(self, 0.0, total, !self.params.looped)
    }

    pub fn resampled_buffer(&self) -> Vec<Vec3> {
        self.resampled().collect()
    }

    /// Points evenly spaced in arc length between `start` and `end`, both
    /// clamped to the curve. An inverted range collapses onto `start`.
    pub fn resample_range(&self, start: f32, end: f32) -> Resampled<'_> {
        let total = self.total_length();
        let start = if start.is_finite() {
            start.clamp(0.0, total)
        } else {
            0.0
        };
        let end = if end.is_finite() {
            end.clamp(start, total)
        } else {
            total
        };
        Resampled::new(self, start, end, true)
    }
}

/// Finite sequence of arc-length spaced points. Asking the curve again yields
/// the same points as long as no control point was appended in between.
#[derive(Clone, Debug)]
pub struct Resampled<'a> {
    curve: &'a SplineCurve,
    start: f32,
    step: f32,
    next: usize,
    count: usize,
}

impl<'a> Resampled<'a> {
    fn new(curve: &'a SplineCurve, start: f32, end: f32, include_end: bool) -> Self {
        let span = (end - start).max(0.0);
        let wanted = (curve.params.samples_per_unit * span) as usize;
        let count = wanted.max(MIN_RESAMPLE_POINTS);
        let divide_by = if include_end { count - 1 } else { count };
        Self {
            curve,
            start,
            step: span / divide_by as f32,
            next: 0,
            count,
        }
    }
}

impl Iterator for Resampled<'_> {
    type Item = Vec3;

    fn next(&mut self) -> Option<Vec3> {
        if self.next >= self.count {
            return None;
        }
        let len = self.start + self.step * self.next as f32;
        self.next += 1;
        Some(self.curve.point_at(self.curve.param_at_length(len)))
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        let left = self.count - self.next;
        (left, Some(left))
    }
}

impl ExactSizeIterator for Resampled<'_> {}
