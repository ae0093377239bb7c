use crate::buffer::audio::{AudioBuffer, ChannelMask, ChannelStore};
use crate::buffer::sample::Sample;
use crate::param::AudioParameter;

/// What went wrong inside a `process` call.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FaultKind {
    /// NaN or infinity in the output.
    NonFinite,
    /// Processable-specific failure code.
    Internal(u32),
    /// An index or value left its valid range.
    OutOfRange,
}

/// Audio-rate error value.
///
/// `Copy` and allocation-free so it can be returned from the audio thread.
/// The processor resolves it by silencing `channels`; it never reaches a
/// control-rate caller.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
#[error("{kind:?} fault on channels {channels:?}")]
pub struct ProcessFault {
    pub channels: ChannelMask,
    pub kind: FaultKind,
}

impl ProcessFault {
    pub const fn new(channels: ChannelMask, kind: FaultKind) -> Self {
        Self { channels, kind }
    }

    /// Fault covering every channel of a `channels`-wide buffer.
    pub const fn all(channels: usize, kind: FaultKind) -> Self {
        Self::new(ChannelMask::first(channels), kind)
    }
}

/// Context passed to a processable for one block.
///
/// - sample_rate: Device sample rate in Hz
/// - block_index: Blocks processed before this one
/// - params: The owning module's parameters, in declaration order
#[derive(Debug, Clone, Copy)]
pub struct ProcessCtx<'a> {
    pub sample_rate: f32,
    pub block_index: u64,
    params: &'a [AudioParameter<f32>],
}

impl<'a> ProcessCtx<'a> {
    pub fn new(sample_rate: f32, block_index: u64) -> Self {
        Self {
            sample_rate,
            block_index,
            params: &[],
        }
    }

    /// Same block, with a module's parameters attached.
    pub fn with_params<'b>(&self, params: &'b [AudioParameter<f32>]) -> ProcessCtx<'b> {
        ProcessCtx {
            sample_rate: self.sample_rate,
            block_index: self.block_index,
            params,
        }
    }

    #[inline]
    pub fn params(&self) -> &'a [AudioParameter<f32>] {
        self.params
    }

    #[inline]
    pub fn param(&self, index: usize) -> Option<&'a AudioParameter<f32>> {
        self.params.get(index)
    }

    /// Smoothed value of parameter `index`, or `fallback` when the module
    /// declares fewer parameters.
    #[inline]
    pub fn value_or(&self, index: usize, fallback: f32) -> f32 {
        self.param(index).map_or(fallback, AudioParameter::get)
    }
}

/// Core trait for anything that processes one audio block in place.
///
/// `process` runs on the audio thread once per block. It must not allocate,
/// lock, block or panic; failures are reported as a [`ProcessFault`] and the
/// caller substitutes silence for the affected channels.
pub trait AudioProcessable<T, const CHANNELS: usize, const LEN: usize, S = [T; LEN]>: Send
where
    T: Sample,
    S: ChannelStore<T, LEN>,
{
    fn process(
        &mut self,
        buffer: &mut AudioBuffer<T, CHANNELS, LEN, S>,
        ctx: &ProcessCtx<'_>,
    ) -> Result<(), ProcessFault>;

    /// Called at control rate before the first block and whenever the sample
    /// rate changes.
    ///
    /// Default implementation does nothing.
    fn prepare(&mut self, _sample_rate: f32) {}

    /// Drop any internal state (phase, history).
    ///
    /// Default implementation does nothing.
    fn reset(&mut self) {}
}

/// Allow boxed processables to be used as processables (for dynamic dispatch)
impl<T, const CHANNELS: usize, const LEN: usize, S> AudioProcessable<T, CHANNELS, LEN, S>
    for Box<dyn AudioProcessable<T, CHANNELS, LEN, S>>
where
    T: Sample,
    S: ChannelStore<T, LEN>,
{
    fn process(
        &mut self,
        buffer: &mut AudioBuffer<T, CHANNELS, LEN, S>,
        ctx: &ProcessCtx<'_>,
    ) -> Result<(), ProcessFault> {
        (**self).process(buffer, ctx)
    }

    fn prepare(&mut self, sample_rate: f32) {
        (**self).prepare(sample_rate)
    }

    fn reset(&mut self) {
        (**self).reset()
    }
}

/// Behaviour of a [`Dummy`] processable.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum DummyMode {
    /// Zero-fill every channel.
    #[default]
    Silence,
    /// Leave the buffer untouched.
    PassThrough,
}

/// Placeholder processable for wiring up a driver before real processing
/// exists.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Dummy {
    mode: DummyMode,
}

impl Dummy {
    pub const fn new(mode: DummyMode) -> Self {
        Self { mode }
    }

    pub const fn silence() -> Self {
        Self::new(DummyMode::Silence)
    }

    pub const fn pass_through() -> Self {
        Self::new(DummyMode::PassThrough)
    }

    pub const fn mode(&self) -> DummyMode {
        self.mode
    }
}

impl<T, const CHANNELS: usize, const LEN: usize, S> AudioProcessable<T, CHANNELS, LEN, S> for Dummy
where
    T: Sample,
    S: ChannelStore<T, LEN>,
{
    #[inline]
    fn process(
        &mut self,
        buffer: &mut AudioBuffer<T, CHANNELS, LEN, S>,
        _ctx: &ProcessCtx<'_>,
    ) -> Result<(), ProcessFault> {
        if self.mode == DummyMode::Silence {
            buffer.clear();
        }
        Ok(())
    }
}
