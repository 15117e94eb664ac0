use instant::Instant;
use std::time::Duration;

/// Frame delta and time since start, measured with `instant` so the same code
/// runs in the browser and natively.
#[derive(Clone, Copy, Debug)]
pub struct FrameClock {
    start: Instant,
    last: Instant,
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct FrameTime {
    pub dt: Duration,
    /// Seconds since the clock was created; ring spawn times use this.
    pub elapsed_sec: f32,
}

impl Default for FrameClock {
    fn default() -> Self {
        Self::new()
    }
}

impl FrameClock {
    pub fn new() -> Self {
        let now = Instant::now();
        Self {
            start: now,
            last: now,
        }
    }

    pub fn tick(&mut self) -> FrameTime {
        let now = Instant::now();
        let dt = now.duration_since(self.last);
        self.last = now;
        FrameTime {
            dt,
            elapsed_sec: now.duration_since(self.start).as_secs_f32(),
        }
    }

    /// Milliseconds since start, for stamping input events.
    pub fn now_ms(&self) -> f64 {
        Instant::now()
            .duration_since(self.start)
            .as_secs_f64()
            * 1000.0
    }
}
