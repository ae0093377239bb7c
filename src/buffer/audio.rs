use crate::buffer::circular::{CircularBuffer, Overwrite};
use crate::buffer::sample::Sample;
use crate::dsp::amplify;
use crate::error::BufferError;

/*
Audio Buffer
============

A block of audio: CHANNELS independent channels of exactly LEN samples each.
All channels advance in lock-step; there is no per-channel length. A freshly
constructed buffer holds LEN zeros per channel, so every channel reports LEN
valid samples from the start.

Storage
-------

Each channel is a `ChannelStore`. Two stores are provided:

  [T; LEN]                          Plain array. The per-callback scratch
                                    block; reads and writes touch the array
                                    directly.

  CircularBuffer<T, LEN, Overwrite> Ring that is always full. A block write
                                    resets the ring and pushes LEN samples, so
                                    the ring's read index returns to zero and
                                    the storage is in logical order again.

Neither store touches the heap. The buffer itself is `[S; CHANNELS]`, so an
`AudioBuffer` can live on the stack or inline inside the processor.

     channel 0:  [ s0 s1 s2 ... s(LEN-1) ]
     channel 1:  [ s0 s1 s2 ... s(LEN-1) ]
        ...

Channels never alias: writing one channel leaves every other channel's
samples untouched.
*/

/// Storage for one channel of an [`AudioBuffer`].
pub trait ChannelStore<T: Sample, const LEN: usize>: Send {
    /// A store holding LEN zero samples.
    fn silent() -> Self;

    /// The block, oldest sample first.
    fn block(&self) -> &[T; LEN];

    /// Mutable access to the block for in-place processing.
    fn block_mut(&mut self) -> &mut [T; LEN];

    /// Replace the block with `samples`.
    fn write(&mut self, samples: &[T; LEN]);
}

impl<T: Sample, const LEN: usize> ChannelStore<T, LEN> for [T; LEN] {
    #[inline]
    fn silent() -> Self {
        [T::ZERO; LEN]
    }

    #[inline]
    fn block(&self) -> &[T; LEN] {
        self
    }

    #[inline]
    fn block_mut(&mut self) -> &mut [T; LEN] {
        self
    }

    #[inline]
    fn write(&mut self, samples: &[T; LEN]) {
        self.copy_from_slice(samples);
    }
}

impl<T: Sample, const LEN: usize> ChannelStore<T, LEN> for CircularBuffer<T, LEN, Overwrite> {
    #[inline]
    fn silent() -> Self {
        CircularBuffer::filled(T::ZERO)
    }

    #[inline]
    fn block(&self) -> &[T; LEN] {
        debug_assert!(self.is_full() && self.is_aligned());
        self.storage()
    }

    #[inline]
    fn block_mut(&mut self) -> &mut [T; LEN] {
        debug_assert!(self.is_full() && self.is_aligned());
        self.storage_mut()
    }

    #[inline]
    fn write(&mut self, samples: &[T; LEN]) {
        self.clear();
        for &sample in samples {
            self.push(sample);
        }
    }
}

/// Set of channel indices, one bit per channel.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub struct ChannelMask(u64);

impl ChannelMask {
    pub const NONE: Self = Self(0);

    /// Largest channel count a mask can describe.
    pub const MAX_CHANNELS: usize = 64;

    /// Mask with the first `count` channels set.
    pub const fn first(count: usize) -> Self {
        if count >= 64 {
            Self(u64::MAX)
        } else {
            Self((1u64 << count) - 1)
        }
    }

    pub const fn single(channel: usize) -> Self {
        if channel >= 64 {
            Self(0)
        } else {
            Self(1u64 << channel)
        }
    }

    pub const fn from_bits(bits: u64) -> Self {
        Self(bits)
    }

    pub const fn bits(self) -> u64 {
        self.0
    }

    #[must_use]
    pub const fn with(self, channel: usize) -> Self {
        Self(self.0 | Self::single(channel).0)
    }

    #[must_use]
    pub const fn union(self, other: Self) -> Self {
        Self(self.0 | other.0)
    }

    pub const fn contains(self, channel: usize) -> bool {
        channel < 64 && self.0 & (1u64 << channel) != 0
    }

    pub const fn is_empty(self) -> bool {
        self.0 == 0
    }

    pub const fn count(self) -> u32 {
        self.0.count_ones()
    }
}

/// Multichannel block of `LEN` samples per channel.
pub struct AudioBuffer<T: Sample, const CHANNELS: usize, const LEN: usize, S = [T; LEN]>
where
    S: ChannelStore<T, LEN>,
{
    channels: [S; CHANNELS],
    _sample: std::marker::PhantomData<T>,
}

/// Audio buffer whose channels are always-full overwrite rings.
pub type RingAudioBuffer<T, const CHANNELS: usize, const LEN: usize> =
    AudioBuffer<T, CHANNELS, LEN, CircularBuffer<T, LEN, Overwrite>>;

impl<T, const CHANNELS: usize, const LEN: usize, S> AudioBuffer<T, CHANNELS, LEN, S>
where
    T: Sample,
    S: ChannelStore<T, LEN>,
{
    const SHAPE_OK: () = {
        assert!(CHANNELS > 0, "AudioBuffer needs at least one channel");
        assert!(LEN > 0, "AudioBuffer block length must be non-zero");
        assert!(
            CHANNELS <= ChannelMask::MAX_CHANNELS,
            "AudioBuffer supports at most 64 channels"
        );
    };

    /// Silent buffer.
    pub fn new() -> Self {
        #[allow(clippy::let_unit_value)]
        let () = Self::SHAPE_OK;
        Self {
            channels: std::array::from_fn(|_| S::silent()),
            _sample: std::marker::PhantomData,
        }
    }

    #[inline]
    pub const fn channel_count(&self) -> usize {
        CHANNELS
    }

    #[inline]
    pub const fn block_length(&self) -> usize {
        LEN
    }

    /// Replace one channel's block with `samples`.
    ///
    /// `samples` must hold exactly one block. Other channels are untouched.
    pub fn write_block(&mut self, channel: usize, samples: &[T]) -> Result<(), BufferError> {
        let block: &[T; LEN] = samples
            .try_into()
            .map_err(|_| BufferError::LengthMismatch {
                expected: LEN,
                actual: samples.len(),
            })?;
        self.store_mut(channel)?.write(block);
        Ok(())
    }

    /// Read-only view of one channel's block.
    pub fn read_block(&self, channel: usize) -> Result<&[T], BufferError> {
        self.channels
            .get(channel)
            .map(|store| store.block().as_slice())
            .ok_or(BufferError::OutOfRange {
                channel,
                channels: CHANNELS,
            })
    }

    /// Channel samples, or `None` past the last channel.
    #[inline]
    pub fn channel(&self, channel: usize) -> Option<&[T; LEN]> {
        self.channels.get(channel).map(ChannelStore::block)
    }

    #[inline]
    pub fn channel_mut(&mut self, channel: usize) -> Option<&mut [T; LEN]> {
        self.channels.get_mut(channel).map(ChannelStore::block_mut)
    }

    /// Every channel's samples, in channel order.
    pub fn channels(&self) -> impl Iterator<Item = &[T; LEN]> + '_ {
        self.channels.iter().map(ChannelStore::block)
    }

    pub fn channels_mut(&mut self) -> impl Iterator<Item = &mut [T; LEN]> + '_ {
        self.channels.iter_mut().map(ChannelStore::block_mut)
    }

    /// Zero-fill every channel.
    pub fn clear(&mut self) {
        for channel in self.channels_mut() {
            channel.fill(T::ZERO);
        }
    }

    /// Zero-fill one channel.
    pub fn clear_channel(&mut self, channel: usize) -> Result<(), BufferError> {
        self.store_mut(channel)?.block_mut().fill(T::ZERO);
        Ok(())
    }

    /// Zero-fill every channel in `mask`. Bits past the channel count are
    /// ignored.
    pub fn silence_mask(&mut self, mask: ChannelMask) {
        for (index, channel) in self.channels_mut().enumerate() {
            if mask.contains(index) {
                channel.fill(T::ZERO);
            }
        }
    }

    /// Channels holding at least one NaN or infinite sample.
    pub fn non_finite_mask(&self) -> ChannelMask {
        let mut mask = ChannelMask::NONE;
        for (index, channel) in self.channels().enumerate() {
            if channel.iter().any(|sample| !sample.is_finite()) {
                mask = mask.with(index);
            }
        }
        mask
    }

    /// Multiply every sample by `gain`.
    pub fn apply_gain(&mut self, gain: f32) {
        for channel in self.channels_mut() {
            amplify::apply_gain(channel, gain);
        }
    }

    /// Sum `other` into this buffer, channel by channel.
    pub fn add<R: ChannelStore<T, LEN>>(&mut self, other: &AudioBuffer<T, CHANNELS, LEN, R>) {
        for (dst, src) in self.channels_mut().zip(other.channels()) {
            amplify::add_in_place(dst, src);
        }
    }

    /// Multiply this buffer by `other`, sample by sample.
    pub fn multiply<R: ChannelStore<T, LEN>>(&mut self, other: &AudioBuffer<T, CHANNELS, LEN, R>) {
        for (dst, src) in self.channels_mut().zip(other.channels()) {
            amplify::multiply_in_place(dst, src);
        }
    }

    /// Copy every channel of `other` into this buffer.
    pub fn copy_from<R: ChannelStore<T, LEN>>(&mut self, other: &AudioBuffer<T, CHANNELS, LEN, R>) {
        for (dst, src) in self.channels.iter_mut().zip(other.channels()) {
            dst.write(src);
        }
    }

    /// Copy a mono buffer onto one channel.
    pub fn copy_on_channel<R: ChannelStore<T, LEN>>(
        &mut self,
        mono: &AudioBuffer<T, 1, LEN, R>,
        channel: usize,
    ) -> Result<(), BufferError> {
        let src = mono.channels[0].block();
        self.store_mut(channel)?.write(src);
        Ok(())
    }

    #[inline]
    fn store_mut(&mut self, channel: usize) -> Result<&mut S, BufferError> {
        self.channels.get_mut(channel).ok_or(BufferError::OutOfRange {
            channel,
            channels: CHANNELS,
        })
    }
}

impl<T, const CHANNELS: usize, const LEN: usize, S> Default for AudioBuffer<T, CHANNELS, LEN, S>
where
    T: Sample,
    S: ChannelStore<T, LEN>,
{
    fn default() -> Self {
        Self::new()
    }
}

impl<T, const CHANNELS: usize, const LEN: usize, S> std::fmt::Debug
    for AudioBuffer<T, CHANNELS, LEN, S>
where
    T: Sample,
    S: ChannelStore<T, LEN>,
{
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AudioBuffer")
            .field("channels", &CHANNELS)
            .field("block_length", &LEN)
            .finish()
    }
}
