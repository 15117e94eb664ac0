pub mod clock;
pub mod constants;
pub mod error;
#[cfg(feature = "gpu")]
pub mod gpu;
pub mod rings;
pub mod scene;
pub mod scheduler;
pub mod spline;
pub mod tracker;
pub mod trails;

pub static RINGS_WGSL: &str = include_str!("../shaders/rings.wgsl");
pub static TRAILS_WGSL: &str = include_str!("../shaders/trails.wgsl");

pub use clock::*;
pub use constants::*;
pub use error::*;
pub use rings::*;
pub use scene::*;
pub use scheduler::*;
pub use spline::*;
pub use tracker::*;
pub use trails::*;
