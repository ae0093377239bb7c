//! Lock-free smoothed parameters.

/*
Audio Parameters
================

A parameter is written by the control side (a UI, a MIDI handler, a test) and
read by the audio thread once per block. The two never share a lock:

    control thread                       audio thread
    --------------                       ------------
    ParameterHandle::set(v)              AudioParameter::advance(block)
        clamp v into [min, max]              load target (relaxed)
        store target bits  ─────────────►    new target? restart ramp
                                             step ramp, publish current
    ParameterHandle::current()  ◄─────────  store current bits

Both values live in one `Arc<ParamCell>` as `AtomicU64` bit patterns, so a
read is never torn. Ordering is relaxed: a new target is picked up on the next
block or the one after, which is all a smoothed parameter needs.


Smoothing
---------

A jump from one value to another in the middle of a block clicks. The ramp
spreads the change over `total` samples:

  None          current = target immediately.

  Linear        current = start + (target - start) × passed / total
                Exact: after `total` samples the value equals the target.

  Exponential   current = target + (start - target) × 0.001^(passed / total)
                Fast at first, slow at the end. At `passed == total` the
                remaining distance is down by 60 dB and the value snaps to the
                target so the ramp always terminates.

A new target arriving mid-ramp restarts the ramp from wherever the value
currently is, so there is never a discontinuity.
*/

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use crate::error::ConfigError;
use crate::DEFAULT_TRANSITION_SAMPLES;

/// Remaining fraction of an exponential ramp at its nominal end (-60 dB).
const EXP_FLOOR: f64 = 0.001;

/// Scalar types a parameter can hold.
pub trait ParamValue: Copy + PartialOrd + Send + Sync + std::fmt::Debug + 'static {
    const LOWEST: Self;
    const HIGHEST: Self;

    fn to_bits64(self) -> u64;
    fn from_bits64(bits: u64) -> Self;
    fn to_f64(self) -> f64;
    fn from_f64(value: f64) -> Self;

    fn is_nan(self) -> bool;
}

impl ParamValue for f32 {
    const LOWEST: Self = f32::MIN;
    const HIGHEST: Self = f32::MAX;

    #[inline]
    fn to_bits64(self) -> u64 {
        self.to_bits() as u64
    }

    #[inline]
    fn from_bits64(bits: u64) -> Self {
        f32::from_bits(bits as u32)
    }

    #[inline]
    fn to_f64(self) -> f64 {
        self as f64
    }

    #[inline]
    fn from_f64(value: f64) -> Self {
        value as f32
    }

    #[inline]
    fn is_nan(self) -> bool {
        f32::is_nan(self)
    }
}

impl ParamValue for f64 {
    const LOWEST: Self = f64::MIN;
    const HIGHEST: Self = f64::MAX;

    #[inline]
    fn to_bits64(self) -> u64 {
        self.to_bits()
    }

    #[inline]
    fn from_bits64(bits: u64) -> Self {
        f64::from_bits(bits)
    }

    #[inline]
    fn to_f64(self) -> f64 {
        self
    }

    #[inline]
    fn from_f64(value: f64) -> Self {
        value
    }

    #[inline]
    fn is_nan(self) -> bool {
        f64::is_nan(self)
    }
}

/// Ramp shape used when the target changes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Smoothing {
    None,
    #[default]
    Linear,
    Exponential,
}

/// Declared shape of a parameter: name, range, default and ramp.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ParamSpec<V = f32> {
    pub name: String,
    pub min: V,
    pub max: V,
    pub default: V,
    /// Ramp length. `None` uses the default transition length in samples.
    pub smoothing_ms: Option<f32>,
    pub smoothing: Smoothing,
}

impl<V: ParamValue> ParamSpec<V> {
    pub fn new(name: impl Into<String>, min: V, max: V, default: V) -> Self {
        Self {
            name: name.into(),
            min,
            max,
            default,
            smoothing_ms: None,
            smoothing: Smoothing::default(),
        }
    }

    #[must_use]
    pub fn smoothing_ms(mut self, ms: f32) -> Self {
        self.smoothing_ms = Some(ms);
        self
    }

    #[must_use]
    pub fn smoothing(mut self, smoothing: Smoothing) -> Self {
        self.smoothing = smoothing;
        self
    }

    /// Check the declaration. Called once, at registration.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.name.is_empty() {
            return Err(ConfigError::EmptyName);
        }
        if self.min.is_nan() || self.max.is_nan() || self.min > self.max {
            return Err(ConfigError::InvalidRange {
                name: self.name.clone(),
                min: self.min.to_f64(),
                max: self.max.to_f64(),
            });
        }
        if self.default.is_nan() || self.default < self.min || self.default > self.max {
            return Err(ConfigError::DefaultOutOfRange {
                name: self.name.clone(),
                default: self.default.to_f64(),
                min: self.min.to_f64(),
                max: self.max.to_f64(),
            });
        }
        if let Some(ms) = self.smoothing_ms {
            if !ms.is_finite() || ms < 0.0 {
                return Err(ConfigError::InvalidSmoothing {
                    name: self.name.clone(),
                    smoothing_ms: ms,
                });
            }
        }
        Ok(())
    }

    /// Ramp length in samples at `sample_rate`.
    pub fn transition_samples(&self, sample_rate: f32) -> usize {
        match self.smoothing_ms {
            Some(ms) => ms_to_samples(ms, sample_rate),
            None => DEFAULT_TRANSITION_SAMPLES,
        }
    }
}

#[inline]
fn ms_to_samples(ms: f32, sample_rate: f32) -> usize {
    // float -> int `as` saturates and maps NaN to 0
    (ms as f64 * sample_rate as f64 / 1000.0).round() as usize
}

/// State shared between the audio-side parameter and its handles.
struct ParamCell<V> {
    name: String,
    min: V,
    max: V,
    target: AtomicU64,
    current: AtomicU64,
}

impl<V: ParamValue> ParamCell<V> {
    #[inline]
    fn clamp(&self, value: V) -> V {
        if value.is_nan() || value < self.min {
            self.min
        } else if value > self.max {
            self.max
        } else {
            value
        }
    }

    #[inline]
    fn store_target(&self, value: V) {
        self.target.store(self.clamp(value).to_bits64(), Ordering::Relaxed);
    }

    #[inline]
    fn load_target(&self) -> V {
        V::from_bits64(self.target.load(Ordering::Relaxed))
    }

    #[inline]
    fn store_current(&self, value: V) {
        self.current.store(value.to_bits64(), Ordering::Relaxed);
    }

    #[inline]
    fn load_current(&self) -> V {
        V::from_bits64(self.current.load(Ordering::Relaxed))
    }
}

/// Audio-side parameter state.
///
/// Owned by exactly one module. Every method is allocation-free; only
/// construction allocates (the shared cell).
pub struct AudioParameter<V: ParamValue = f32> {
    cell: Arc<ParamCell<V>>,
    current: V,
    /// Value the running ramp started from.
    start: V,
    /// Target the running ramp heads for.
    target: V,
    passed: usize,
    /// `passed` before the most recent `advance`.
    block_start: usize,
    total: usize,
    smoothing: Smoothing,
    smoothing_ms: Option<f32>,
}

impl<V: ParamValue> AudioParameter<V> {
    /// Build from a declaration. Does not validate; see [`ParamSpec::validate`].
    pub fn new(spec: &ParamSpec<V>) -> Self {
        let cell = ParamCell {
            name: spec.name.clone(),
            min: spec.min,
            max: spec.max,
            target: AtomicU64::new(0),
            current: AtomicU64::new(0),
        };
        let initial = cell.clamp(spec.default);
        cell.store_target(initial);
        cell.store_current(initial);

        Self {
            cell: Arc::new(cell),
            current: initial,
            start: initial,
            target: initial,
            passed: DEFAULT_TRANSITION_SAMPLES,
            block_start: DEFAULT_TRANSITION_SAMPLES,
            total: DEFAULT_TRANSITION_SAMPLES,
            smoothing: spec.smoothing,
            smoothing_ms: spec.smoothing_ms,
        }
        .with_total(spec.transition_samples(crate::DEFAULT_SAMPLE_RATE as f32))
    }

    /// Unnamed parameter with an unbounded range and a linear ramp.
    pub fn from_value(value: V) -> Self {
        Self::new(&ParamSpec::new(String::new(), V::LOWEST, V::HIGHEST, value))
    }

    fn with_total(mut self, total: usize) -> Self {
        self.set_transition_samples(total);
        self
    }

    /// Set a new target, clamped into range. NaN maps to the minimum.
    ///
    /// Takes effect at the next [`advance`](Self::advance).
    #[inline]
    pub fn set(&self, value: V) {
        self.cell.store_target(value);
    }

    /// Current smoothed value.
    #[inline]
    pub fn get(&self) -> V {
        self.current
    }

    /// Latest target requested by any writer.
    #[inline]
    pub fn target(&self) -> V {
        self.cell.load_target()
    }

    /// Value the running ramp started from.
    #[inline]
    pub fn last_value(&self) -> V {
        self.start
    }

    pub fn name(&self) -> &str {
        &self.cell.name
    }

    pub fn range(&self) -> (V, V) {
        (self.cell.min, self.cell.max)
    }

    /// Control-side handle sharing this parameter's cell.
    pub fn handle(&self) -> ParameterHandle<V> {
        ParameterHandle {
            cell: Arc::clone(&self.cell),
        }
    }

    /// Pick up a changed target, then move `samples` along the ramp.
    pub fn advance(&mut self, samples: usize) {
        self.pick_up_target();
        self.block_start = self.passed;
        self.passed = self.passed.saturating_add(samples).min(self.total);
        self.current = self.value_at(self.passed);
        self.cell.store_current(self.current);
    }

    /// Pick up a changed target and move straight to it.
    pub fn jump(&mut self) {
        self.pick_up_target();
        self.passed = self.total;
        self.block_start = self.total;
        self.start = self.target;
        self.current = self.target;
        self.cell.store_current(self.current);
    }

    /// Progress of the running ramp in `[0, 1]`.
    pub fn transition_index(&self) -> f32 {
        if self.total == 0 {
            1.0
        } else {
            self.passed as f32 / self.total as f32
        }
    }

    /// True once the ramp has reached its target.
    pub fn is_settled(&self) -> bool {
        self.passed >= self.total || self.smoothing == Smoothing::None
    }

    /// True when the span covered by the last [`advance`](Self::advance)
    /// started on the target, so every [`interpolated_at`](Self::interpolated_at)
    /// in it returns the same value.
    #[inline]
    pub fn is_constant_over_block(&self) -> bool {
        self.block_start >= self.total || self.smoothing == Smoothing::None
    }

    /// Ramp length in samples. A running ramp keeps its progress, capped at
    /// the new length.
    pub fn set_transition_samples(&mut self, samples: usize) {
        let settled = self.passed >= self.total;
        self.total = samples;
        if settled {
            self.passed = samples;
            self.block_start = samples;
        } else {
            self.passed = self.passed.min(samples);
            self.block_start = self.block_start.min(samples);
        }
    }

    /// Ramp length in seconds at `sample_rate`.
    pub fn set_transition_time(&mut self, seconds: f32, sample_rate: f32) {
        self.set_transition_samples(ms_to_samples(seconds * 1000.0, sample_rate));
    }

    /// Recompute the ramp length from the declared smoothing time.
    pub(crate) fn prepare(&mut self, sample_rate: f32) {
        if let Some(ms) = self.smoothing_ms {
            self.set_transition_samples(ms_to_samples(ms, sample_rate));
        }
    }

    pub fn smoothing(&self) -> Smoothing {
        self.smoothing
    }

    /// Value `offset` samples into the span covered by the last
    /// [`advance`](Self::advance). `offset == samples` gives [`get`](Self::get).
    #[inline]
    pub fn interpolated_at(&self, offset: usize) -> V {
        self.value_at(self.block_start.saturating_add(offset).min(self.total))
    }

    fn pick_up_target(&mut self) {
        let target = self.cell.load_target();
        if target.to_bits64() != self.target.to_bits64() {
            self.start = self.current;
            self.target = target;
            self.passed = 0;
            self.block_start = 0;
        }
    }

    #[inline]
    fn value_at(&self, passed: usize) -> V {
        if passed >= self.total || self.smoothing == Smoothing::None {
            return self.target;
        }
        let t = passed as f64 / self.total as f64;
        let start = self.start.to_f64();
        let target = self.target.to_f64();
        let value = match self.smoothing {
            Smoothing::Linear => start + (target - start) * t,
            Smoothing::Exponential => target + (start - target) * EXP_FLOOR.powf(t),
            Smoothing::None => target,
        };
        V::from_f64(value)
    }
}

impl<V: ParamValue> std::fmt::Debug for AudioParameter<V> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AudioParameter")
            .field("name", &self.cell.name)
            .field("current", &self.current)
            .field("target", &self.target)
            .field("passed", &self.passed)
            .field("total", &self.total)
            .finish()
    }
}

/// Control-side view of an [`AudioParameter`].
///
/// Cheap to clone and safe to use from any thread.
pub struct ParameterHandle<V: ParamValue = f32> {
    cell: Arc<ParamCell<V>>,
}

impl<V: ParamValue> Clone for ParameterHandle<V> {
    fn clone(&self) -> Self {
        Self {
            cell: Arc::clone(&self.cell),
        }
    }
}

impl<V: ParamValue> ParameterHandle<V> {
    /// Request a new value, clamped into range. NaN maps to the minimum.
    #[inline]
    pub fn set(&self, value: V) {
        self.cell.store_target(value);
    }

    #[inline]
    pub fn target(&self) -> V {
        self.cell.load_target()
    }

    /// Value the audio thread published at its last block.
    #[inline]
    pub fn current(&self) -> V {
        self.cell.load_current()
    }

    pub fn name(&self) -> &str {
        &self.cell.name
    }

    pub fn range(&self) -> (V, V) {
        (self.cell.min, self.cell.max)
    }
}

impl<V: ParamValue> std::fmt::Debug for ParameterHandle<V> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ParameterHandle")
            .field("name", &self.cell.name)
            .field("target", &self.target())
            .field("current", &self.current())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn approx(a: f32, b: f32) -> bool {
        (a - b).abs() < 1e-4
    }

    fn param(default: f32, samples: usize) -> AudioParameter {
        let mut p = AudioParameter::new(&ParamSpec::new("p", 0.0, 100.0, default));
        p.set_transition_samples(samples);
        p
    }

    #[test]
    fn starts_at_default() {
        let p = AudioParameter::from_value(30.0f32);
        assert_eq!(p.get(), 30.0);
        assert_eq!(p.last_value(), 30.0);
        assert_eq!(p.target(), 30.0);
        assert!(p.is_settled());
    }

    #[test]
    fn set_updates_target_not_current() {
        let mut p = param(30.0, 10);
        p.set(50.0);
        assert_eq!(p.target(), 50.0);
        assert_eq!(p.get(), 30.0);
        p.advance(0);
        assert_eq!(p.last_value(), 30.0);
        assert_eq!(p.get(), 30.0);
    }

    #[test]
    fn linear_ramp_reaches_target() {
        let mut p = param(30.0, 10);
        p.set(60.0);
        p.advance(0);
        assert!(approx(p.transition_index(), 0.0));

        p.advance(5);
        assert!(!p.is_settled());
        assert!(approx(p.transition_index(), 0.5));
        assert!(approx(p.get(), 45.0));

        p.advance(5);
        assert!(p.is_settled());
        assert!(approx(p.transition_index(), 1.0));
        assert_eq!(p.get(), 60.0);
    }

    #[test]
    fn overshooting_advance_caps_progress() {
        let mut p = param(30.0, 10);
        p.set(60.0);
        p.advance(100);
        assert!(p.is_settled());
        assert!(approx(p.transition_index(), 1.0));
        assert_eq!(p.get(), 60.0);
    }

    #[test]
    fn transition_time_in_seconds() {
        let mut p = param(30.0, 0);
        p.set_transition_time(10.0, 1.0);
        p.set(60.0);
        p.advance(0);
        assert!(!p.is_settled());
        p.advance(10);
        assert!(p.is_settled());
    }

    #[test]
    fn reaches_target_within_ceil_blocks() {
        let mut p = param(0.0, 100);
        p.set(1.0);
        let block = 32;
        for _ in 0..100usize.div_ceil(block) {
            p.advance(block);
        }
        assert_eq!(p.get(), 1.0);
    }

    #[test]
    fn retarget_mid_ramp_starts_from_current() {
        let mut p = param(0.0, 10);
        p.set(100.0);
        p.advance(5);
        assert!(approx(p.get(), 50.0));

        p.set(0.0);
        p.advance(0);
        assert!(approx(p.last_value(), 50.0));
        assert!(approx(p.get(), 50.0));
        p.advance(10);
        assert_eq!(p.get(), 0.0);
    }

    #[test]
    fn clamps_and_maps_nan_to_min() {
        let p = param(10.0, 10);
        p.set(250.0);
        assert_eq!(p.target(), 100.0);
        p.set(-5.0);
        assert_eq!(p.target(), 0.0);
        p.set(f32::NAN);
        assert_eq!(p.target(), 0.0);
    }

    #[test]
    fn no_smoothing_jumps() {
        let spec = ParamSpec::new("p", 0.0f32, 1.0, 0.0).smoothing(Smoothing::None);
        let mut p = AudioParameter::new(&spec);
        p.set(1.0);
        p.advance(1);
        assert_eq!(p.get(), 1.0);
        assert!(p.is_settled());
    }

    #[test]
    fn exponential_is_monotonic_and_snaps() {
        let spec = ParamSpec::new("p", 0.0f32, 1.0, 0.0).smoothing(Smoothing::Exponential);
        let mut p = AudioParameter::new(&spec);
        p.set_transition_samples(100);
        p.set(1.0);

        let mut last = 0.0;
        for _ in 0..9 {
            p.advance(10);
            assert!(p.get() > last);
            assert!(p.get() < 1.0);
            last = p.get();
        }
        // fast start
        assert!(p.interpolated_at(0) > 0.99);
        p.advance(10);
        assert_eq!(p.get(), 1.0);
    }

    #[test]
    fn interpolated_at_spans_last_block() {
        let mut p = param(0.0, 8);
        p.set(8.0);
        p.advance(4);
        assert!(approx(p.interpolated_at(0), 0.0));
        assert!(approx(p.interpolated_at(2), 2.0));
        assert!(approx(p.interpolated_at(4), p.get()));
        p.advance(4);
        assert!(approx(p.interpolated_at(1), 5.0));
    }

    #[test]
    fn jump_skips_the_ramp() {
        let mut p = param(0.0, 100);
        p.set(42.0);
        p.jump();
        assert_eq!(p.get(), 42.0);
        assert!(p.is_settled());
    }

    #[test]
    fn handle_sees_published_current() {
        let mut p = param(0.0, 4);
        let handle = p.handle();
        assert_eq!(handle.name(), "p");
        assert_eq!(handle.range(), (0.0, 100.0));

        handle.set(40.0);
        assert_eq!(p.target(), 40.0);
        p.advance(2);
        assert!(approx(handle.current(), 20.0));
        p.advance(2);
        assert_eq!(handle.current(), 40.0);
    }

    #[test]
    fn handle_crosses_threads() {
        let mut p = param(0.0, 0);
        let handle = p.handle();
        std::thread::spawn(move || handle.set(75.0)).join().unwrap();
        p.advance(1);
        assert_eq!(p.get(), 75.0);
    }

    #[test]
    fn validate_rejects_bad_specs() {
        assert_eq!(
            ParamSpec::new("", 0.0f32, 1.0, 0.5).validate(),
            Err(ConfigError::EmptyName)
        );
        assert!(matches!(
            ParamSpec::new("g", 1.0f32, 0.0, 0.5).validate(),
            Err(ConfigError::InvalidRange { .. })
        ));
        assert!(matches!(
            ParamSpec::new("g", 0.0f32, 1.0, 2.0).validate(),
            Err(ConfigError::DefaultOutOfRange { .. })
        ));
        assert!(matches!(
            ParamSpec::new("g", 0.0f32, 1.0, 0.5).smoothing_ms(-1.0).validate(),
            Err(ConfigError::InvalidSmoothing { .. })
        ));
        assert!(ParamSpec::new("g", 0.0f32, 1.0, 0.5).smoothing_ms(5.0).validate().is_ok());
    }

    #[test]
    fn smoothing_ms_sets_transition_length() {
        let spec = ParamSpec::new("g", 0.0f32, 1.0, 0.0).smoothing_ms(10.0);
        assert_eq!(spec.transition_samples(48_000.0), 480);
        let mut p = AudioParameter::new(&spec);
        p.prepare(1_000.0);
        p.set(1.0);
        p.advance(5);
        assert!(approx(p.get(), 0.5));
    }

    #[test]
    fn block_that_finishes_a_ramp_is_not_constant() {
        let mut p = AudioParameter::from_value(0.0f32);
        p.set_transition_samples(8);
        assert!(p.is_constant_over_block());

        p.set(1.0);
        p.advance(4);
        assert!(!p.is_constant_over_block());
        p.advance(4);
        assert!(p.is_settled());
        assert!(!p.is_constant_over_block());
        p.advance(4);
        assert!(p.is_constant_over_block());
    }
}
