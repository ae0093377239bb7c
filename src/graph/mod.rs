//! Block processing: the processable trait, modules and the processor chain.
//!
//! A processable transforms one [`AudioBuffer`](crate::AudioBuffer) in place.
//! A module pairs a processable with its parameters, and the processor runs
//! modules in series with fault recovery. Stock processables cover gain, a
//! table-driven sine and saturation.

/// Parameterised gain stage.
pub mod gain;
/// Named processable plus parameters.
pub mod module;
/// Table-driven sine source.
pub mod oscillator;
/// Core trait, process context and fault values.
pub mod processable;
/// Ordered module chain with status and control surface.
pub mod processor;
/// Table-driven saturator.
pub mod shaper;

pub use gain::Gain;
pub use module::AudioModule;
pub use oscillator::SineOscillator;
pub use processable::{AudioProcessable, Dummy, DummyMode, FaultKind, ProcessCtx, ProcessFault};
pub use processor::{AudioProcessor, ControlSurface, ProcessorStatus, StatusSnapshot};
pub use shaper::{Shaper, ShaperCurve};
