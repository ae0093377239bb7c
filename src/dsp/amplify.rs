//! Gain, summing and sample-wise multiplication over any [`Sample`] type.

/*
Gain and Mixing
===============

Three per-sample operations cover most of what a block container needs:

  gain          output[i] = signal[i] × g          (g is always an f32 factor)
  sum           output[i] = a[i] + b[i]
  product       output[i] = a[i] × b[i]

For float samples these are plain arithmetic. Integer samples would overflow,
so the `Sample` implementation saturates instead: summing two loud i16 blocks
clips at i16::MAX rather than wrapping around to a large negative value (which
sounds like a loud click). Products of integer samples treat both operands as
fixed-point values in [-1, 1) (Q15 for i16, Q31 for i32), so multiplying by a
full-scale block leaves the signal near where it was instead of exploding.


Decibels
--------

    dB = 20 × log₁₀(gain)

    ×1.0   =   0 dB
    ×0.5   =  -6 dB
    ×0.001 = -60 dB   (the "settled" threshold used by exponential smoothing)

All operations here are stateless and allocation-free. The slices must be the
same length; the block container guarantees that by construction.
*/

use crate::buffer::sample::Sample;

/// Multiply every sample by a constant factor, in place.
#[inline]
pub fn apply_gain<T: Sample>(signal: &mut [T], gain: f32) {
    if gain == 1.0 {
        return;
    }
    for sample in signal.iter_mut() {
        *sample = sample.scale(gain);
    }
}

/// Multiply by a per-sample gain curve, in place.
#[inline]
pub fn apply_gain_ramp<T: Sample>(signal: &mut [T], mut gain_at: impl FnMut(usize) -> f32) {
    for (i, sample) in signal.iter_mut().enumerate() {
        *sample = sample.scale(gain_at(i));
    }
}

/// Add `other` into `signal`, sample by sample.
#[inline]
pub fn add_in_place<T: Sample>(signal: &mut [T], other: &[T]) {
    debug_assert_eq!(signal.len(), other.len());
    for (s, &o) in signal.iter_mut().zip(other.iter()) {
        *s = s.mix(o);
    }
}

/// Multiply `signal` by `modulator`, sample by sample.
#[inline]
pub fn multiply_in_place<T: Sample>(signal: &mut [T], modulator: &[T]) {
    debug_assert_eq!(signal.len(), modulator.len());
    for (s, &m) in signal.iter_mut().zip(modulator.iter()) {
        *s = s.modulate(m);
    }
}

/// Convert a linear gain factor to decibels.
#[inline]
pub fn gain_to_db(gain: f32) -> f32 {
    20.0 * gain.abs().max(f32::MIN_POSITIVE).log10()
}

/// Convert decibels to a linear gain factor.
#[inline]
pub fn db_to_gain(db: f32) -> f32 {
    10f32.powf(db / 20.0)
}
