//! Sample storage.
//!
//! Everything here is fixed-capacity and allocation-free once constructed,
//! except [`queue::block_queue`], which allocates its ring once at creation.

/// Multichannel fixed-length blocks.
pub mod audio;
/// Fixed-capacity ring with a compile-time overflow policy.
pub mod circular;
/// Cross-thread SPSC queue.
#[cfg(feature = "rtrb")]
pub mod queue;
/// Numeric sample abstraction.
pub mod sample;

pub use audio::{AudioBuffer, ChannelMask, ChannelStore, RingAudioBuffer};
pub use circular::{CircularBuffer, Discard, OverflowPolicy, Overwrite};
pub use sample::Sample;
