/// Rejected construction parameters.
///
/// Runtime anomalies (zero-length segments, `dt == 0`, unknown pointer ids)
/// never surface here; they are absorbed where they happen.
#[derive(thiserror::Error, Debug, Clone, PartialEq)]
pub enum ConfigError {
    #[error("ring capacity must be at least 1")]
    ZeroCapacity,

    #[error("ring needs at least 3 segments, got {0}")]
    TooFewSegments(usize),

    #[error("{rings} rings of {vertices_per_ring} vertices overflow u32 indices")]
    IndexOverflow {
        rings: usize,
        vertices_per_ring: usize,
    },

    #[error("{name} must be finite and positive, got {value}")]
    NotPositive { name: &'static str, value: f32 },

    #[error("filter blend must be in (0, 1], got {0}")]
    BlendOutOfRange(f32),

    #[error("scheduler period must be non-zero")]
    ZeroPeriod,
}

impl ConfigError {
    pub(crate) fn require_positive(name: &'static str, value: f32) -> Result<(), Self> {
        if value.is_finite() && value > 0.0 {
            Ok(())
        } else {
            Err(Self::NotPositive { name, value })
        }
    }
}
