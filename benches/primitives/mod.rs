//! Benchmarks for the building blocks the audio thread touches.

mod audio_buffer;
mod circular;
mod lookup;
mod param;

pub use audio_buffer::bench_audio_buffer;
pub use circular::bench_circular;
pub use lookup::bench_lookup;
pub use param::bench_param;
