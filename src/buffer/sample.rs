/// Numeric type stored in audio buffers.
///
/// Float samples live in `[-1.0, 1.0]`; integer samples use their full range.
/// Gain is always expressed as an `f32` factor so one gain path covers both.
pub trait Sample: Copy + Default + PartialEq + Send + Sync + 'static {
    const ZERO: Self;

    /// Sum of two samples, saturating for integer types.
    fn mix(self, other: Self) -> Self;

    /// Product of two samples treated as normalized values.
    fn modulate(self, other: Self) -> Self;

    /// Scale by a float factor, saturating for integer types.
    fn scale(self, gain: f32) -> Self;

    /// Convert from a normalized float sample.
    fn from_f32(value: f32) -> Self;

    /// Convert to a normalized float sample.
    fn to_f32(self) -> f32;

    /// False for NaN and infinities. Integers are always finite.
    fn is_finite(self) -> bool {
        true
    }
}

impl Sample for f32 {
    const ZERO: Self = 0.0;

    #[inline]
    fn mix(self, other: Self) -> Self {
        self + other
    }

    #[inline]
    fn modulate(self, other: Self) -> Self {
        self * other
    }

    #[inline]
    fn scale(self, gain: f32) -> Self {
        self * gain
    }

    #[inline]
    fn from_f32(value: f32) -> Self {
        value
    }

    #[inline]
    fn to_f32(self) -> f32 {
        self
    }

    #[inline]
    fn is_finite(self) -> bool {
        f32::is_finite(self)
    }
}

impl Sample for f64 {
    const ZERO: Self = 0.0;

    #[inline]
    fn mix(self, other: Self) -> Self {
        self + other
    }

    #[inline]
    fn modulate(self, other: Self) -> Self {
        self * other
    }

    #[inline]
    fn scale(self, gain: f32) -> Self {
        self * gain as f64
    }

    #[inline]
    fn from_f32(value: f32) -> Self {
        value as f64
    }

    #[inline]
    fn to_f32(self) -> f32 {
        self as f32
    }

    #[inline]
    fn is_finite(self) -> bool {
        f64::is_finite(self)
    }
}

impl Sample for i16 {
    const ZERO: Self = 0;

    #[inline]
    fn mix(self, other: Self) -> Self {
        self.saturating_add(other)
    }

    #[inline]
    fn modulate(self, other: Self) -> Self {
        // Q15 product; MIN x MIN is the only overflow
        ((self as i32 * other as i32) >> 15).clamp(i16::MIN as i32, i16::MAX as i32) as i16
    }

    #[inline]
    fn scale(self, gain: f32) -> Self {
        // `as` saturates float -> int
        (self as f32 * gain).round() as i16
    }

    #[inline]
    fn from_f32(value: f32) -> Self {
        (value.clamp(-1.0, 1.0) * i16::MAX as f32).round() as i16
    }

    #[inline]
    fn to_f32(self) -> f32 {
        self as f32 / i16::MAX as f32
    }
}

impl Sample for i32 {
    const ZERO: Self = 0;

    #[inline]
    fn mix(self, other: Self) -> Self {
        self.saturating_add(other)
    }

    #[inline]
    fn modulate(self, other: Self) -> Self {
        // Q31 product; MIN x MIN is the only overflow
        ((self as i64 * other as i64) >> 31).clamp(i32::MIN as i64, i32::MAX as i64) as i32
    }

    #[inline]
    fn scale(self, gain: f32) -> Self {
        (self as f64 * gain as f64).round() as i32
    }

    #[inline]
    fn from_f32(value: f32) -> Self {
        (value.clamp(-1.0, 1.0) as f64 * i32::MAX as f64).round() as i32
    }

    #[inline]
    fn to_f32(self) -> f32 {
        (self as f64 / i32::MAX as f64) as f32
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn float_scale_is_multiplication() {
        assert_eq!(0.5f32.scale(0.5), 0.25);
        assert_eq!((-1.0f64).scale(2.0), -2.0);
    }

    #[test]
    fn integer_scale_saturates() {
        assert_eq!(i16::MAX.scale(2.0), i16::MAX);
        assert_eq!(i16::MIN.scale(2.0), i16::MIN);
        assert_eq!(100i16.scale(0.5), 50);
    }

    #[test]
    fn integer_mix_saturates() {
        assert_eq!(i16::MAX.mix(1), i16::MAX);
        assert_eq!(i32::MIN.mix(-1), i32::MIN);
        assert_eq!(3i16.mix(4), 7);
    }

    #[test]
    fn q15_modulate_halves() {
        let half = i16::MAX / 2 + 1; // 0.5 in Q15
        assert_eq!(1000i16.modulate(half), 500);
    }

    #[test]
    fn full_scale_negative_product_saturates_positive() {
        assert_eq!(i16::MIN.modulate(i16::MIN), i16::MAX);
        assert_eq!(i32::MIN.modulate(i32::MIN), i32::MAX);
        assert_eq!(i16::MIN.modulate(i16::MAX), -i16::MAX);
    }

    #[test]
    fn i16_conversion_clamps() {
        assert_eq!(i16::from_f32(1.0), i16::MAX);
        assert_eq!(i16::from_f32(4.0), i16::MAX);
        assert_eq!(i16::from_f32(0.0), 0);
        assert!((i16::from_f32(-0.5).to_f32() + 0.5).abs() < 1e-4);
    }

    #[test]
    fn non_finite_floats_are_detected() {
        assert!(!Sample::is_finite(f32::NAN));
        assert!(!Sample::is_finite(f64::INFINITY));
        assert!(Sample::is_finite(0.25f32));
        assert!(Sample::is_finite(i32::MIN));
    }
}
