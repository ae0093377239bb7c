//! Precomputed function tables with linear interpolation.

/*
Lookup Tables
=============

Evaluating sin() or tanh() per sample is expensive on small targets. A lookup
table samples the function once, at startup, and answers each query with two
array reads and one interpolation:

    table[i] = f(arg_min + (arg_max - arg_min) × i / N)      for i in 0..N

    eval(x):
        pos   = (x - arg_min) / (arg_max - arg_min) × N
        i     = floor(pos)
        frac  = pos - i
        y     = table[i] × (1 - frac) + table[i + 1] × frac

The range is half-open: [arg_min, arg_max). The last interval, between
table[N - 1] and the point at arg_max, needs one extra entry. That guard
entry is chosen by the edge policy:

  Edges      guard entry        outside the range
  ---------  -----------------  ------------------------------------------
  Zeroed     0.0                0.0
  Extended   table[N - 1]       table[0] below, table[N - 1] at or above
  Periodic   table[0]           x wrapped into the range (rem_euclid)

Periodic wrapping uses `rem_euclid`, so any finite input costs the same as an
in-range one. Non-finite inputs evaluate to 0.0.

Accuracy
--------

Linear interpolation error for a smooth f is bounded by h² × max|f''| / 8,
with h = (arg_max - arg_min) / N. A 4096-point sine over [0, 2π) stays well
under 1e-6 away from sin().
*/

use std::f32::consts::TAU;

use crate::dsp::math::{linear_interpolation, linear_map};
use crate::error::ConfigError;

/// What a [`LookupTable`] returns outside `[arg_min, arg_max)`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum TableEdges {
    /// Zero outside the range.
    Zeroed,
    /// First entry below the range, last entry above it.
    #[default]
    Extended,
    /// The function repeats with period `arg_max - arg_min`.
    Periodic,
}

/// `N` samples of a function over `[arg_min, arg_max)`.
///
/// Immutable after construction. Lives inline; a large table should be
/// boxed or placed in a `static` by the caller.
#[derive(Clone)]
pub struct LookupTable<const N: usize> {
    table: [f32; N],
    guard: f32,
    arg_min: f32,
    arg_max: f32,
    edges: TableEdges,
}

impl<const N: usize> LookupTable<N> {
    const NON_EMPTY: () = assert!(N > 0, "LookupTable needs at least one entry");

    /// Sample `f` over `[arg_min, arg_max)`.
    ///
    /// Runs `f` N times; call it during setup, not from the audio thread.
    ///
    /// # Panics
    /// Panics if `arg_max <= arg_min` or either bound is not finite. Use
    /// [`try_generate`](Self::try_generate) for ranges that are not literals.
    pub fn generate(f: impl Fn(f32) -> f32, arg_min: f32, arg_max: f32, edges: TableEdges) -> Self {
        match Self::try_generate(f, arg_min, arg_max, edges) {
            Ok(table) => table,
            Err(err) => panic!("{err}"),
        }
    }

    /// Fallible form of [`generate`](Self::generate).
    pub fn try_generate(
        f: impl Fn(f32) -> f32,
        arg_min: f32,
        arg_max: f32,
        edges: TableEdges,
    ) -> Result<Self, ConfigError> {
        #[allow(clippy::let_unit_value)]
        let () = Self::NON_EMPTY;

        if !(arg_min.is_finite() && arg_max.is_finite() && arg_max > arg_min) {
            return Err(ConfigError::InvalidTableRange {
                min: arg_min,
                max: arg_max,
            });
        }

        let table: [f32; N] = std::array::from_fn(|i| {
            let x = linear_interpolation(arg_min, arg_max, i as f32 / N as f32);
            f(x)
        });

        let guard = match edges {
            TableEdges::Zeroed => 0.0,
            TableEdges::Extended => table[N - 1],
            TableEdges::Periodic => table[0],
        };

        Ok(Self {
            table,
            guard,
            arg_min,
            arg_max,
            edges,
        })
    }

    /// Number of sampled entries, excluding the guard.
    #[inline]
    pub const fn size(&self) -> usize {
        N
    }

    /// Entry `index`, or `None` past the end.
    #[inline]
    pub fn at(&self, index: usize) -> Option<f32> {
        self.table.get(index).copied()
    }

    /// Entry `index % N`.
    #[inline]
    pub fn at_wrapping(&self, index: usize) -> f32 {
        self.table[index % N]
    }

    #[inline]
    pub fn range(&self) -> (f32, f32) {
        (self.arg_min, self.arg_max)
    }

    #[inline]
    pub fn edges(&self) -> TableEdges {
        self.edges
    }

    /// Approximate `f(x)`.
    #[inline]
    pub fn eval(&self, x: f32) -> f32 {
        if x >= self.arg_min && x < self.arg_max {
            return self.interpolate(x);
        }

        match self.edges {
            TableEdges::Zeroed => 0.0,
            TableEdges::Extended => {
                if x < self.arg_min {
                    self.table[0]
                } else if x >= self.arg_max {
                    self.table[N - 1]
                } else {
                    // NaN
                    0.0
                }
            }
            TableEdges::Periodic => {
                if !x.is_finite() {
                    return 0.0;
                }
                let period = self.arg_max - self.arg_min;
                let wrapped = self.arg_min + (x - self.arg_min).rem_euclid(period);
                // rem_euclid can round up to exactly `period`
                if wrapped >= self.arg_max {
                    self.table[0]
                } else {
                    self.interpolate(wrapped)
                }
            }
        }
    }

    /// Interpolate inside `[arg_min, arg_max)`.
    #[inline]
    fn interpolate(&self, x: f32) -> f32 {
        let pos = linear_map(x, self.arg_min, self.arg_max, 0.0, N as f32);
        // pos may land on N through rounding just below arg_max
        let index = (pos as usize).min(N - 1);
        let frac = pos - index as f32;
        let a = self.table[index];
        let b = if index + 1 < N {
            self.table[index + 1]
        } else {
            self.guard
        };
        linear_interpolation(a, b, frac)
    }
}

impl LookupTable<4096> {
    /// Periodic sine over `[0, 2π)`.
    pub fn sine() -> Self {
        Self::generate(f32::sin, 0.0, TAU, TableEdges::Periodic)
    }
}

impl<const N: usize> std::fmt::Debug for LookupTable<N> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LookupTable")
            .field("size", &N)
            .field("arg_min", &self.arg_min)
            .field("arg_max", &self.arg_max)
            .field("edges", &self.edges)
            .finish()
    }
}
