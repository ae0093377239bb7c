//! Realtime-safe block audio core.
//!
//! Everything reachable from a `process` call is allocation-free, lock-free
//! and bounded in cost. Construction, registration and table generation happen
//! up front on a control-rate thread; the audio callback only ever moves
//! samples through preallocated storage.

pub mod buffer; // Ring buffers, cross-thread queue, multichannel blocks
pub mod config;
pub mod driver; // Hardware boundary and block adaptation
pub mod dsp;
pub mod error;
pub mod graph; // Processables, modules and the processor chain
pub mod param; // Lock-free smoothed parameters

pub use buffer::audio::{AudioBuffer, ChannelMask, ChannelStore, RingAudioBuffer};
pub use buffer::circular::{CircularBuffer, Discard, OverflowPolicy, Overwrite};
pub use buffer::sample::Sample;
pub use config::DriverConfig;
pub use driver::{AudioContext, AudioDriver, DriverHandle, VolumeHandle};
#[cfg(feature = "cpal-backend")]
pub use driver::CpalDriver;
pub use dsp::lookup::{LookupTable, TableEdges};
pub use error::{BufferError, ConfigError, ControlError, DriverError, Error, Result};
pub use graph::gain::Gain;
pub use graph::module::AudioModule;
pub use graph::oscillator::SineOscillator;
pub use graph::processable::{AudioProcessable, Dummy, DummyMode, FaultKind, ProcessCtx, ProcessFault};
pub use graph::processor::{AudioProcessor, ControlSurface, ProcessorStatus, StatusSnapshot};
pub use graph::shaper::{Shaper, ShaperCurve};
pub use param::{AudioParameter, ParamSpec, ParamValue, ParameterHandle, Smoothing};

/// Sample rate used when the device does not dictate one.
pub const DEFAULT_SAMPLE_RATE: u32 = 44_100;
/// Samples per channel in one processing block.
pub const DEFAULT_BLOCK_SIZE: usize = 256;
/// Bit depth of the integer DAC output path.
pub const DEFAULT_BIT_DEPTH: u16 = 16;
pub const MAX_BLOCK_SIZE: usize = 2048;
/// Ramp length for parameters created without an explicit smoothing time.
pub const DEFAULT_TRANSITION_SAMPLES: usize = 100;

/// The stereo float block the bundled driver and demo run on.
pub type StereoBuffer = AudioBuffer<f32, 2, DEFAULT_BLOCK_SIZE>;
