// Shared tuning constants used by both web and native frontends.
// Distances are in input pixels, times in milliseconds unless noted.

// Spline
pub const DEFAULT_TENSION: f32 = 0.5; // cardinal tangent scale
pub const DEFAULT_SAMPLES_PER_UNIT: f32 = 1.0; // arc-length table / resample density
pub const MIN_RESAMPLE_POINTS: usize = 4; // keeps short trails drawable

// Pointer tracking
pub const FILTER_BLEND: f32 = 0.1; // filtered = f*raw + (1-f)*filtered, per step
pub const APPEND_EPSILON: f32 = 1.0; // min travel before a new control point
pub const CURSOR_SPEED_PER_SEC: f32 = 200.0; // trail head speed along the curve

// Ring pool
pub const MAX_RINGS: usize = 500;
pub const RING_SEGMENTS: usize = 200;
pub const RING_BAND_WIDTH: f32 = 10.0; // outer row offset from the spawn point
pub const RING_EXPANSION_SPEED: f32 = 600.0; // units per second

// Trail lines
pub const MAX_TRAIL_LINES: usize = 10_000;

// Schedules
pub const STEP_PERIOD_MS: u64 = 16;
pub const PULSE_PERIOD_MS: u64 = 100;
pub const MAX_CATCH_UP_FIRINGS: u32 = 8; // per task per advance
