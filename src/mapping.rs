use crate::constants::{
    VOICE_FULL_GAIN_SPEED, VOICE_IDLE_GAIN, VOICE_MAX_GAIN, VOICE_MIN_HZ, VOICE_OCTAVES,
};
use glam::Vec2;

/// Target oscillator settings for one pointer.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct VoiceParams {
    pub frequency_hz: f32,
    pub gain: f32,
    /// -1 (left) to 1 (right).
    pub pan: f32,
}

/// Maps a track's head position (canvas pixels, y down) and velocity to a voice.
#[inline]
pub fn voice_params(position: Vec2, velocity: Vec2, canvas: Vec2) -> VoiceParams {
    let w = canvas.x.max(1.0);
    let h = canvas.y.max(1.0);
    let height = (1.0 - position.y / h).clamp(0.0, 1.0);
    let frequency_hz = VOICE_MIN_HZ * (VOICE_OCTAVES * height).exp2();

    let speed = velocity.length();
    let drive = if speed.is_finite() {
        (speed / VOICE_FULL_GAIN_SPEED).min(1.0)
    } else {
        0.0
    };
    let gain = VOICE_IDLE_GAIN + (VOICE_MAX_GAIN - VOICE_IDLE_GAIN) * drive;

    let pan = (2.0 * position.x / w - 1.0).clamp(-1.0, 1.0);
    VoiceParams {
        frequency_hz,
        gain,
        pan,
    }
}

/// Counts playing voices. Once `max` are live, new pointers get none until
/// one is released.
#[derive(Clone, Copy, Debug)]
pub struct VoiceBudget {
    max: usize,
    active: usize,
}

impl VoiceBudget {
    pub fn new(max: usize) -> Self {
        Self { max, active: 0 }
    }

    pub fn try_acquire(&mut self) -> bool {
        if self.active >= self.max {
            return false;
        }
        self.active += 1;
        true
    }

    pub fn release(&mut self) {
        self.active = self.active.saturating_sub(1);
    }

    pub fn active(&self) -> usize {
        self.active
    }

    pub fn max(&self) -> usize {
        self.max
    }
}
