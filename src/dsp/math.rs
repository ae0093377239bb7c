//! Scalar helpers shared by the lookup table and the parameter ramps.

/// Blend `a` and `b`: `mix = 0` gives `a`, `mix = 1` gives `b`.
#[inline]
pub fn linear_interpolation(a: f32, b: f32, mix: f32) -> f32 {
    a * (1.0 - mix) + b * mix
}

/// Map `x` from `[in_min, in_max]` onto `[out_min, out_max]`.
///
/// Not clamped: values outside the input range extrapolate.
#[inline]
pub fn linear_map(x: f32, in_min: f32, in_max: f32, out_min: f32, out_max: f32) -> f32 {
    (x - in_min) / (in_max - in_min) * (out_max - out_min) + out_min
}

/// Clamp `x` into `[min, max]`.
///
/// Unlike [`f32::clamp`] this never panics when `min > max`; the upper bound
/// wins.
#[inline]
pub fn clip(x: f32, min: f32, max: f32) -> f32 {
    let x = if x < min { min } else { x };
    if x > max {
        max
    } else {
        x
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn approx(a: f32, b: f32) -> bool {
        (a - b).abs() < 1e-5
    }

    #[test]
    fn interpolation_endpoints_and_midpoint() {
        assert!(approx(linear_interpolation(-10.0, 10.0, 0.0), -10.0));
        assert!(approx(linear_interpolation(-10.0, 10.0, 0.5), 0.0));
        assert!(approx(linear_interpolation(-10.0, 10.0, 1.0), 10.0));
    }

    #[test]
    fn map_round_trips() {
        let y = linear_map(5.0, 0.0, 10.0, 30.0, 50.0);
        assert!(approx(y, 40.0));
        assert!(approx(linear_map(y, 30.0, 50.0, 0.0, 10.0), 5.0));
    }

    #[test]
    fn map_can_invert() {
        assert!(approx(linear_map(5.0, 0.0, 1.0, 0.0, -1.0), -5.0));
    }

    #[test]
    fn clip_normalized_range() {
        assert!(approx(clip(0.5, 0.0, 1.0), 0.5));
        assert!(approx(clip(-1.0, 0.0, 1.0), 0.0));
        assert!(approx(clip(2.0, 0.0, 1.0), 1.0));
    }

    #[test]
    fn clip_wide_range() {
        assert!(approx(clip(5.1, -10.0, 10.0), 5.1));
        assert!(approx(clip(-13.1, -10.0, 10.0), -10.0));
        assert!(approx(clip(204.5, -10.0, 10.0), 10.0));
    }
}
