//! Fast trigonometry for the per-row projection loop.
//!
//! The projectors only need one sine/cosine pair per image row, but they run
//! on embedded targets where `libm` calls are comparatively expensive. The
//! polynomial below is accurate to a few micro-units, which is far below the
//! millimetre resolution of the voxel grid.
//!
//! Both implementations sit behind the [`Trig`] trait so the projectors can
//! be instantiated with either one without any other change.

use std::f32::consts::{FRAC_PI_2, PI};

use serde::{Deserialize, Serialize};

/// Odd degree-7 polynomial approximation of `sin(x)`.
///
/// The input is folded into `[-π/2, π/2]` with up to three reflections, which
/// covers angles in roughly `[-5π/2, 7π/2]`. Average error is about `1e-6`
/// and the maximum error about `2.4e-6` over the folded range.
///
/// # Example
/// ```
/// use drishti::core::math::sin_approx;
///
/// assert!((sin_approx(0.5) - 0.5f32.sin()).abs() < 3e-6);
/// ```
#[inline]
#[allow(clippy::excessive_precision)]
pub fn sin_approx(x: f32) -> f32 {
    let mut x = x;
    if x > FRAC_PI_2 {
        x = PI - x;
    }
    if x < -FRAC_PI_2 {
        x = -PI - x;
    }
    if x > FRAC_PI_2 {
        x = PI - x;
    }

    // Coefficients solve S(1)=1, S'(1)=0, S'(0)=π/2 and match the mean of
    // sin over the quarter period, rescaled from z = x/(π/2) back to x.
    let x2 = x * x;
    x * (x2 * (x2 * ((x2 * -0.000_182_690_409_230_001_67) + 0.008_304_602_241_873_476)
        - 0.166_651_012_143_695_15)
        + 1.0)
}

/// Cosine derived from [`sin_approx`] with a quarter-period shift.
#[inline]
pub fn cos_approx(x: f32) -> f32 {
    sin_approx(x + FRAC_PI_2)
}

/// Sine/cosine provider used by the projectors.
pub trait Trig: Send + Sync {
    /// Sine of `angle` (radians).
    fn sin(&self, angle: f32) -> f32;

    /// Cosine of `angle` (radians).
    fn cos(&self, angle: f32) -> f32;

    /// Both at once, `(sin, cos)`.
    #[inline]
    fn sin_cos(&self, angle: f32) -> (f32, f32) {
        (self.sin(angle), self.cos(angle))
    }
}

/// Polynomial approximation ([`sin_approx`] / [`cos_approx`]).
#[derive(Clone, Copy, Debug, Default)]
pub struct PolynomialTrig;

impl Trig for PolynomialTrig {
    #[inline]
    fn sin(&self, angle: f32) -> f32 {
        sin_approx(angle)
    }

    #[inline]
    fn cos(&self, angle: f32) -> f32 {
        cos_approx(angle)
    }
}

/// Exact `f32::sin` / `f32::cos`.
#[derive(Clone, Copy, Debug, Default)]
pub struct ExactTrig;

impl Trig for ExactTrig {
    #[inline]
    fn sin(&self, angle: f32) -> f32 {
        angle.sin()
    }

    #[inline]
    fn cos(&self, angle: f32) -> f32 {
        angle.cos()
    }

    #[inline]
    fn sin_cos(&self, angle: f32) -> (f32, f32) {
        angle.sin_cos()
    }
}

/// Runtime selection between the two implementations (used by configuration).
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TrigMode {
    /// Polynomial approximation (default, matches the reference output).
    #[default]
    Polynomial,
    /// Standard library trigonometry.
    Exact,
}

impl std::fmt::Display for TrigMode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            TrigMode::Polynomial => write!(f, "polynomial"),
            TrigMode::Exact => write!(f, "exact"),
        }
    }
}

impl std::str::FromStr for TrigMode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "polynomial" => Ok(TrigMode::Polynomial),
            "exact" => Ok(TrigMode::Exact),
            other => Err(format!("unknown trig mode '{}'", other)),
        }
    }
}

impl Trig for TrigMode {
    #[inline]
    fn sin(&self, angle: f32) -> f32 {
        match self {
            TrigMode::Polynomial => PolynomialTrig.sin(angle),
            TrigMode::Exact => ExactTrig.sin(angle),
        }
    }

    #[inline]
    fn cos(&self, angle: f32) -> f32 {
        match self {
            TrigMode::Polynomial => PolynomialTrig.cos(angle),
            TrigMode::Exact => ExactTrig.cos(angle),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_trig_mode_parse() {
        assert_eq!("exact".parse::<TrigMode>(), Ok(TrigMode::Exact));
        assert_eq!("Polynomial".parse::<TrigMode>(), Ok(TrigMode::Polynomial));
        assert!("taylor".parse::<TrigMode>().is_err());
        assert_eq!(TrigMode::Exact.to_string(), "exact");
    }

    #[test]
    fn test_sin_approx_reduced_range() {
        let mut max_err = 0.0f32;
        let steps = 2000;
        for i in 0..=steps {
            let x = -FRAC_PI_2 + PI * i as f32 / steps as f32;
            max_err = max_err.max((sin_approx(x) - x.sin()).abs());
        }
        assert!(max_err < 3e-6, "max error {}", max_err);
    }

    #[test]
    fn test_sin_approx_reflected_range() {
        // Accumulated azimuth angles may drift outside one period
        for i in -200..=200 {
            let x = i as f32 * 0.03;
            assert_relative_eq!(sin_approx(x), x.sin(), epsilon = 5e-6);
        }
    }

    #[test]
    fn test_sin_approx_exact_points() {
        assert_relative_eq!(sin_approx(0.0), 0.0);
        assert_relative_eq!(sin_approx(FRAC_PI_2), 1.0, epsilon = 1e-6);
        assert_relative_eq!(sin_approx(-FRAC_PI_2), -1.0, epsilon = 1e-6);
        assert_relative_eq!(sin_approx(PI), 0.0, epsilon = 1e-6);
    }

    #[test]
    fn test_sin_approx_is_odd() {
        for i in 0..50 {
            let x = i as f32 * 0.05;
            assert_relative_eq!(sin_approx(-x), -sin_approx(x));
        }
    }

    #[test]
    fn test_cos_approx() {
        assert_relative_eq!(cos_approx(0.0), 1.0, epsilon = 1e-6);
        assert_relative_eq!(cos_approx(FRAC_PI_2), 0.0, epsilon = 1e-6);
        for i in -100..=100 {
            let x = i as f32 * 0.05;
            assert_relative_eq!(cos_approx(x), x.cos(), epsilon = 5e-6);
        }
    }

    #[test]
    fn test_trig_implementations_interchangeable() {
        let modes = [TrigMode::Polynomial, TrigMode::Exact];
        for angle in [-2.0f32, -0.7, 0.0, 0.3, 1.2, 2.9] {
            let (s0, c0) = modes[0].sin_cos(angle);
            let (s1, c1) = modes[1].sin_cos(angle);
            assert_relative_eq!(s0, s1, epsilon = 5e-6);
            assert_relative_eq!(c0, c1, epsilon = 5e-6);
        }
    }

    #[test]
    fn test_trig_mode_yaml() {
        let mode: TrigMode = serde_yaml::from_str("exact").unwrap();
        assert_eq!(mode, TrigMode::Exact);
        assert_eq!(TrigMode::default(), TrigMode::Polynomial);
    }
}
