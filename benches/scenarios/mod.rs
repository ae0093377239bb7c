//! Benchmarks for complete processing paths.

mod chain;
mod render;

pub use chain::bench_chain;
pub use render::bench_render;
