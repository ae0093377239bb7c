//! Hardware boundary.
//!
//! An [`AudioContext`] is built once on the control thread and then moved into
//! the device callback. There is no global driver state: everything the
//! callback needs is owned by the context, and everything the control side
//! needs (volume, status, parameters) is reached through shared atomic
//! handles taken before the move.

use std::any::Any;
use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::Arc;

use log::info;

use crate::buffer::audio::AudioBuffer;
use crate::config::DriverConfig;
use crate::graph::processor::{AudioProcessor, ControlSurface, ProcessorStatus};

#[cfg(feature = "cpal-backend")]
mod cpal_backend;
#[cfg(feature = "cpal-backend")]
pub use cpal_backend::CpalDriver;

/*
Block Adaptation
================

Devices call back with whatever buffer size they negotiated: 441 frames, 512,
sometimes a different count every call. The processor only ever sees blocks
of exactly LEN frames. The context bridges the two with a frame cursor:

    callback 1 (3 frames)      callback 2 (5 frames)
    ┌───┬───┬───┐              ┌───┬───┬───┬───┬───┐
    │ 0 │ 1 │ 2 │              │ 3 │ 0 │ 1 │ 2 │ 3 │      (LEN = 4)
    └───┴───┴───┘              └───┴───┴───┴───┴───┘
                                     ▲
                                     block complete: process()

For every frame the cursor position is used twice:

  - the output frame is read from the last processed block,
  - the input frame (or silence) is written into the working buffer.

When the cursor reaches LEN the working buffer is processed, becomes the new
output block, and the cursor wraps to 0. Output therefore trails input by one
block, independent of the callback size, and the processed stream is identical
however the device slices it.

Master volume is applied on the way out, after processing, like a DAC
attenuator. 16-bit output clamps to [-1, 1] before scaling.
*/

/// Master volume shared between the control side and the audio callback.
#[derive(Debug, Clone)]
pub struct VolumeHandle {
    bits: Arc<AtomicU32>,
}

impl VolumeHandle {
    pub fn new(volume: f32) -> Self {
        let handle = Self {
            bits: Arc::new(AtomicU32::new(0)),
        };
        handle.set(volume);
        handle
    }

    /// Set the volume, clamped into `[0, 1]`. NaN mutes.
    pub fn set(&self, volume: f32) {
        let volume = if volume.is_nan() {
            0.0
        } else {
            volume.clamp(0.0, 1.0)
        };
        self.bits.store(volume.to_bits(), Ordering::Relaxed);
    }

    #[inline]
    pub fn get(&self) -> f32 {
        f32::from_bits(self.bits.load(Ordering::Relaxed))
    }
}

impl Default for VolumeHandle {
    fn default() -> Self {
        Self::new(1.0)
    }
}

/// Everything the device callback owns: the processor, the output block and
/// the frame cursor.
pub struct AudioContext<const CHANNELS: usize, const LEN: usize> {
    processor: AudioProcessor<f32, CHANNELS, LEN>,
    output: AudioBuffer<f32, CHANNELS, LEN>,
    cursor: usize,
    volume: VolumeHandle,
}

impl<const CHANNELS: usize, const LEN: usize> AudioContext<CHANNELS, LEN> {
    pub fn new(processor: AudioProcessor<f32, CHANNELS, LEN>) -> Self {
        Self {
            processor,
            output: AudioBuffer::new(),
            cursor: 0,
            volume: VolumeHandle::default(),
        }
    }

    #[must_use]
    pub fn with_volume(self, volume: f32) -> Self {
        self.volume.set(volume);
        self
    }

    pub fn volume_handle(&self) -> VolumeHandle {
        self.volume.clone()
    }

    pub fn set_volume(&self, volume: f32) {
        self.volume.set(volume);
    }

    pub fn volume(&self) -> f32 {
        self.volume.get()
    }

    pub fn sample_rate(&self) -> f32 {
        self.processor.sample_rate()
    }

    pub fn processor(&self) -> &AudioProcessor<f32, CHANNELS, LEN> {
        &self.processor
    }

    pub fn processor_mut(&mut self) -> &mut AudioProcessor<f32, CHANNELS, LEN> {
        &mut self.processor
    }

    pub fn status(&self) -> Arc<ProcessorStatus> {
        self.processor.status()
    }

    pub fn control_surface(&self) -> ControlSurface {
        self.processor.control_surface()
    }

    /// Adopt the rate the device actually runs at and the configured volume.
    /// A volume in `config` replaces one set through
    /// [`with_volume`](Self::with_volume); `None` leaves it alone.
    pub fn configure(&mut self, config: &DriverConfig, device_sample_rate: u32) {
        self.processor.set_sample_rate(device_sample_rate as f32);
        if let Some(volume) = config.volume {
            self.volume.set(volume);
        }
    }

    /// Process one whole block. For devices whose callback size is exactly
    /// `LEN` frames and which deliver planar buffers.
    ///
    /// Returns the processed block before master volume.
    pub fn on_block_ready(
        &mut self,
        input: &AudioBuffer<f32, CHANNELS, LEN>,
    ) -> &AudioBuffer<f32, CHANNELS, LEN> {
        self.processor.buffer_mut().copy_from(input);
        self.processor.process();
        self.processor.buffer()
    }

    /// Fill an interleaved float output buffer of any size.
    ///
    /// `input`, when present, is interleaved with the same channel count;
    /// frames it does not cover are treated as silence. Trailing samples that
    /// do not form a whole frame are zeroed.
    pub fn render_interleaved(&mut self, input: Option<&[f32]>, output: &mut [f32]) {
        let volume = self.volume.get();
        self.render_frames(input, output, |sample| sample * volume);
    }

    /// Fill an interleaved 16-bit DAC buffer of any size. Input is silence.
    pub fn render_interleaved_i16(&mut self, output: &mut [i16]) {
        let volume = self.volume.get();
        self.render_frames(None, output, |sample| to_i16(sample * volume));
    }

    fn render_frames<O: Copy + Default>(
        &mut self,
        input: Option<&[f32]>,
        output: &mut [O],
        convert: impl Fn(f32) -> O,
    ) {
        let input = input.unwrap_or(&[]);
        let mut frames = output.chunks_exact_mut(CHANNELS);
        let mut offset = 0;

        for frame in frames.by_ref() {
            for (channel, slot) in frame.iter_mut().enumerate() {
                let out = self
                    .output
                    .channel(channel)
                    .map_or(0.0, |block| block[self.cursor]);
                *slot = convert(out);

                let sample = input.get(offset + channel).copied().unwrap_or(0.0);
                if let Some(block) = self.processor.buffer_mut().channel_mut(channel) {
                    block[self.cursor] = sample;
                }
            }
            offset += CHANNELS;

            self.cursor += 1;
            if self.cursor == LEN {
                self.processor.process();
                self.output.copy_from(self.processor.buffer());
                self.cursor = 0;
            }
        }

        frames.into_remainder().fill(O::default());
    }
}

impl<const CHANNELS: usize, const LEN: usize> std::fmt::Debug for AudioContext<CHANNELS, LEN> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AudioContext")
            .field("processor", &self.processor)
            .field("cursor", &self.cursor)
            .field("volume", &self.volume.get())
            .finish()
    }
}

#[inline]
fn to_i16(sample: f32) -> i16 {
    (sample.clamp(-1.0, 1.0) * i16::MAX as f32).round() as i16
}

/// Running output stream. Dropping it stops audio.
pub struct DriverHandle {
    _stream: Box<dyn Any>,
    sample_rate: u32,
    channels: usize,
    volume: VolumeHandle,
    status: Arc<ProcessorStatus>,
}

impl DriverHandle {
    /// Wrap a backend stream object; `stream` is kept alive until the handle
    /// is dropped.
    pub fn new(
        stream: Box<dyn Any>,
        sample_rate: u32,
        channels: usize,
        volume: VolumeHandle,
        status: Arc<ProcessorStatus>,
    ) -> Self {
        Self {
            _stream: stream,
            sample_rate,
            channels,
            volume,
            status,
        }
    }

    pub fn sample_rate(&self) -> u32 {
        self.sample_rate
    }

    pub fn channels(&self) -> usize {
        self.channels
    }

    pub fn volume(&self) -> &VolumeHandle {
        &self.volume
    }

    pub fn status(&self) -> &Arc<ProcessorStatus> {
        &self.status
    }

    /// Stop the stream and release the device.
    pub fn stop(self) {
        let blocks = self.status.blocks_processed();
        drop(self);
        info!("audio stream stopped after {blocks} blocks");
    }
}

impl std::fmt::Debug for DriverHandle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DriverHandle")
            .field("sample_rate", &self.sample_rate)
            .field("channels", &self.channels)
            .finish_non_exhaustive()
    }
}

/// A backend that can run an [`AudioContext`] on real hardware.
pub trait AudioDriver {
    /// Open the device and start calling into `context`. Audio runs until the
    /// returned handle is dropped.
    fn start<const CHANNELS: usize, const LEN: usize>(
        self,
        context: AudioContext<CHANNELS, LEN>,
    ) -> crate::Result<DriverHandle>;
}
