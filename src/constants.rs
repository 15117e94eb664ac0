/// Front-end tuning: canvas lookup and the pointer-to-voice mapping.
///
/// Positions are canvas backing pixels (origin top-left), speeds are pixels
/// per second.
pub const CANVAS_ID: &str = "app-canvas";

// Voice pool
pub const MAX_VOICES: usize = 8; // further pointers stay silent
pub const MASTER_GAIN: f32 = 0.3;

// Pitch follows height on the canvas
pub const VOICE_MIN_HZ: f32 = 110.0; // bottom edge
pub const VOICE_OCTAVES: f32 = 3.0; // span up to the top edge

// Loudness follows pointer speed
pub const VOICE_IDLE_GAIN: f32 = 0.02; // held but still
pub const VOICE_MAX_GAIN: f32 = 0.25;
pub const VOICE_FULL_GAIN_SPEED: f32 = 800.0;

// AudioParam smoothing (seconds)
pub const VOICE_SMOOTH_SEC: f64 = 0.05;
pub const VOICE_RELEASE_SEC: f64 = 0.12;
