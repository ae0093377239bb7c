//! Waveshaping transfer functions.
//!
//! A waveshaper maps each sample through a fixed curve:
//!   output = f(input * drive)
//!
//! At low drive the signal stays in the near-linear middle of the curve. As
//! drive rises, peaks reach the flat shoulders and get squashed, which adds
//! harmonics.
//!
//! # Curves
//!
//! Tanh:
//!   f(x) = tanh(x)
//!   - The reference "analog" saturation curve
//!   - Too expensive per sample on small targets, so it is read from a
//!     lookup table with extended edges (beyond ±4 tanh is flat to 1e-3)
//!
//! Soft Clip:
//!   f(x) = x / (1 + |x|)
//!   - Cheap rational approximation of the same shape
//!   - Approaches ±1 more slowly than tanh
//!
//! Hard Clip:
//!   f(x) = clamp(x, -threshold, threshold)
//!   - Harsh, odd harmonics

use crate::dsp::lookup::{LookupTable, TableEdges};

/// Entries in the shared tanh table.
pub const TANH_TABLE_SIZE: usize = 1024;

/// Half-width of the tanh table's input range.
pub const TANH_RANGE: f32 = 4.0;

/// tanh over `[-4, 4)`, flat beyond.
pub fn tanh_table() -> LookupTable<TANH_TABLE_SIZE> {
    LookupTable::generate(f32::tanh, -TANH_RANGE, TANH_RANGE, TableEdges::Extended)
}

/// x / (1 + |x|) after applying `drive`.
#[inline]
pub fn soft_clip(sample: f32, drive: f32) -> f32 {
    let x = sample * drive;
    x / (1.0 + x.abs())
}

/// Clamp at `threshold` after applying `drive`.
#[inline]
pub fn hard_clip(sample: f32, drive: f32, threshold: f32) -> f32 {
    let x = sample * drive;
    crate::dsp::math::clip(x, -threshold, threshold)
}
