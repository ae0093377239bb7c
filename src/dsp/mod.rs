//! Low-level DSP primitives.
//!
//! These are allocation-free and realtime-safe once constructed. Lookup tables
//! are generated at startup and only read afterwards.

/// Gain, summing and sample-wise products over any sample type.
pub mod amplify;
/// Waveshaping transfer curves.
pub mod distortion;
/// Precomputed function tables.
pub mod lookup;
/// Interpolation, range mapping and clipping.
pub mod math;

pub use lookup::{LookupTable, TableEdges};
