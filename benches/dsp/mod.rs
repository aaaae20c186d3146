//! Benchmarks for low-level primitives and the memoized stages.

mod distortion;
mod noise;
mod stages;

pub use distortion::bench_distortion;
pub use noise::bench_noise;
pub use stages::bench_stages;
