use std::f32::consts::TAU;
use std::sync::Arc;

use crate::buffer::audio::{AudioBuffer, ChannelMask, ChannelStore};
use crate::buffer::sample::Sample;
use crate::dsp::lookup::LookupTable;
use crate::graph::processable::{AudioProcessable, FaultKind, ProcessCtx, ProcessFault};
use crate::param::ParamSpec;

/*
Sine Oscillator
===============

The simplest sound source: a single frequency with no harmonics. Useful as a
test tone, a sub-bass layer or a modulation source.

Phase Accumulator
-----------------

The oscillator keeps a phase in [0, 2π). Each sample it reads the sine table
at that phase and then steps forward:

    phase += 2π × frequency / sample_rate

At 440 Hz and 48 kHz the step is about 0.0576 rad, so one cycle takes ~109
samples. The phase carries over between blocks, which keeps the waveform
continuous across block boundaries (no click every 256 samples).

Parameters
----------

  index  name        range         meaning
  -----  ---------   -----------   ------------------------------------
  0      frequency   [0, 20000]    Pitch in Hz, interpolated per sample
  1      amplitude   [0, 1]        Peak level, interpolated per sample

Without parameters the oscillator plays its construction frequency at full
scale. Every channel receives the same signal.

The sine table is shared: oscillators built with `with_table` reuse one
allocation instead of holding 16 KB each.
*/

/// Entries in the sine table.
pub const SINE_TABLE_SIZE: usize = 4096;

pub struct SineOscillator {
    table: Arc<LookupTable<SINE_TABLE_SIZE>>,
    /// Frequency (Hz) used when no frequency parameter is declared.
    frequency: f32,
    phase: f32,
}

impl SineOscillator {
    pub const FREQUENCY: &'static str = "frequency";
    pub const AMPLITUDE: &'static str = "amplitude";

    /// Oscillator with its own sine table. Builds the table; control rate only.
    pub fn new(frequency: f32) -> Self {
        Self::with_table(Arc::new(LookupTable::sine()), frequency)
    }

    /// Oscillator reading a shared sine table.
    pub fn with_table(table: Arc<LookupTable<SINE_TABLE_SIZE>>, frequency: f32) -> Self {
        Self {
            table,
            frequency,
            phase: 0.0,
        }
    }

    pub fn frequency_parameter(default: f32) -> ParamSpec {
        ParamSpec::new(Self::FREQUENCY, 0.0, 20_000.0, default)
    }

    pub fn amplitude_parameter(default: f32) -> ParamSpec {
        ParamSpec::new(Self::AMPLITUDE, 0.0, 1.0, default)
    }

    pub fn table(&self) -> &Arc<LookupTable<SINE_TABLE_SIZE>> {
        &self.table
    }

    /// Current phase in radians, `[0, 2π)`.
    pub fn phase(&self) -> f32 {
        self.phase
    }
}

/// Fold a phase back into `[0, 2π)`. Negative frequencies step backwards and
/// frequencies above the sample rate step more than one cycle.
#[inline]
fn wrap_phase(phase: f32) -> f32 {
    if (0.0..TAU).contains(&phase) {
        return phase;
    }
    if !phase.is_finite() {
        return 0.0;
    }
    let wrapped = phase.rem_euclid(TAU);
    // rem_euclid of a tiny negative value rounds up to TAU
    if wrapped >= TAU {
        0.0
    } else {
        wrapped
    }
}

impl<T, const CHANNELS: usize, const LEN: usize, S> AudioProcessable<T, CHANNELS, LEN, S>
    for SineOscillator
where
    T: Sample,
    S: ChannelStore<T, LEN>,
{
    fn process(
        &mut self,
        buffer: &mut AudioBuffer<T, CHANNELS, LEN, S>,
        ctx: &ProcessCtx<'_>,
    ) -> Result<(), ProcessFault> {
        if !(ctx.sample_rate.is_finite() && ctx.sample_rate > 0.0) {
            return Err(ProcessFault::new(
                ChannelMask::first(CHANNELS),
                FaultKind::OutOfRange,
            ));
        }

        let frequency = ctx.param(0);
        let amplitude = ctx.param(1);
        let radians_per_hz = TAU / ctx.sample_rate;

        for i in 0..LEN {
            let hz = frequency.map_or(self.frequency, |p| p.interpolated_at(i + 1));
            let level = amplitude.map_or(1.0, |p| p.interpolated_at(i + 1));
            let value = T::from_f32(self.table.eval(self.phase) * level);

            for channel in buffer.channels_mut() {
                channel[i] = value;
            }

            self.phase = wrap_phase(self.phase + radians_per_hz * hz);
        }
        Ok(())
    }

    fn reset(&mut self) {
        self.phase = 0.0;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::graph::module::AudioModule;

    #[test]
    fn renders_a_sine_on_every_channel() {
        let mut osc = SineOscillator::new(1_000.0);
        let mut buffer = AudioBuffer::<f32, 2, 48>::new();
        osc.process(&mut buffer, &ProcessCtx::new(48_000.0, 0)).unwrap();

        let left = buffer.read_block(0).unwrap();
        assert_eq!(left, buffer.read_block(1).unwrap());
        for (i, &sample) in left.iter().enumerate() {
            let expected = (TAU * 1_000.0 * i as f32 / 48_000.0).sin();
            assert!((sample - expected).abs() < 1e-3, "sample {i}");
        }
    }

    #[test]
    fn phase_is_continuous_across_blocks() {
        let mut osc = SineOscillator::new(440.0);
        let ctx = ProcessCtx::new(48_000.0, 0);
        let mut whole = AudioBuffer::<f32, 1, 64>::new();
        osc.process(&mut whole, &ctx).unwrap();

        let mut split = SineOscillator::with_table(Arc::clone(osc.table()), 440.0);
        let mut first = AudioBuffer::<f32, 1, 32>::new();
        let mut second = AudioBuffer::<f32, 1, 32>::new();
        split.process(&mut first, &ctx).unwrap();
        split.process(&mut second, &ctx).unwrap();

        let joined: Vec<f32> = first
            .read_block(0)
            .unwrap()
            .iter()
            .chain(second.read_block(0).unwrap())
            .copied()
            .collect();
        for (a, b) in whole.read_block(0).unwrap().iter().zip(&joined) {
            assert!((a - b).abs() < 1e-4);
        }
    }

    #[test]
    fn amplitude_parameter_scales_output() {
        let mut module = AudioModule::new("osc", SineOscillator::new(100.0))
            .with_parameter(SineOscillator::frequency_parameter(100.0))
            .unwrap()
            .with_parameter(SineOscillator::amplitude_parameter(0.25))
            .unwrap();
        let mut buffer = AudioBuffer::<f32, 1, 256>::new();
        module.process(&mut buffer, &ProcessCtx::new(8_000.0, 0)).unwrap();
        let peak = buffer
            .read_block(0)
            .unwrap()
            .iter()
            .fold(0.0f32, |acc, s| acc.max(s.abs()));
        assert!(peak <= 0.25 + 1e-4);
        assert!(peak > 0.24);
    }

    #[test]
    fn negative_frequency_runs_backwards_within_one_cycle() {
        let mut osc = SineOscillator::new(-100.0);
        let ctx = ProcessCtx::new(1_000.0, 0);
        let mut buffer = AudioBuffer::<f32, 1, 16>::new();
        osc.process(&mut buffer, &ctx).unwrap();
        let value = buffer.read_block(0).unwrap()[1];
        assert!((value - (-0.1 * TAU).sin()).abs() < 1e-3);

        for _ in 1..100 {
            assert!((0.0..TAU).contains(&osc.phase()), "phase = {}", osc.phase());
            osc.process(&mut buffer, &ctx).unwrap();
        }
        // 1600 steps of -0.1 cycle land back on a whole cycle
        assert!(osc.phase() < 1e-2 || TAU - osc.phase() < 1e-2);
    }

    #[test]
    fn wrap_phase_folds_both_directions() {
        assert_eq!(wrap_phase(1.0), 1.0);
        assert!((wrap_phase(-1.0) - (TAU - 1.0)).abs() < 1e-6);
        assert!((wrap_phase(TAU + 0.5) - 0.5).abs() < 1e-5);
        assert_eq!(wrap_phase(-1e-9), 0.0);
        assert_eq!(wrap_phase(f32::NAN), 0.0);
    }

    #[test]
    fn phase_stays_wrapped_above_sample_rate() {
        let mut osc = SineOscillator::new(100_000.0);
        let mut buffer = AudioBuffer::<f32, 1, 16>::new();
        osc.process(&mut buffer, &ProcessCtx::new(8_000.0, 0)).unwrap();
        assert!((0.0..TAU).contains(&osc.phase()));
        assert!(buffer.non_finite_mask().is_empty());
    }

    #[test]
    fn invalid_sample_rate_faults() {
        let mut osc = SineOscillator::new(440.0);
        let mut buffer = AudioBuffer::<f32, 2, 8>::new();
        let fault = osc.process(&mut buffer, &ProcessCtx::new(0.0, 0)).unwrap_err();
        assert_eq!(fault.kind, FaultKind::OutOfRange);
        assert_eq!(fault.channels, ChannelMask::first(2));
    }

    #[test]
    fn reset_rewinds_phase() {
        let mut osc = SineOscillator::new(440.0);
        let mut buffer = AudioBuffer::<f32, 1, 16>::new();
        osc.process(&mut buffer, &ProcessCtx::new(48_000.0, 0)).unwrap();
        assert!(osc.phase() > 0.0);
        <SineOscillator as AudioProcessable<f32, 1, 16>>::reset(&mut osc);
        assert_eq!(osc.phase(), 0.0);
    }
}
