//! Easing Curves
//!
//! Normalized motion curves for the spin profile. Every curve maps
//! `t ∈ [0, 1]` to `[0, 1]` and exposes its derivative and running integral,
//! so the physics engine can evaluate position in closed form instead of
//! accumulating per-frame velocity.

use serde::{Deserialize, Serialize};

/// Easing curve used by the spin profile
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
#[repr(u8)]
pub enum EaseCurve {
    /// Linear interpolation (constant rate)
    Linear = 0,
    /// Hermite smoothstep `3t² − 2t³` (zero slope at both ends)
    #[default]
    SmoothStep = 1,
    /// Quadratic ease-in-out
    InOutQuad = 2,
    /// Cubic ease-out `1 − (1 − t)³`
    OutCubic = 3,
    /// Quintic ease-out `1 − (1 − t)⁵`
    OutQuint = 4,
}

impl EaseCurve {
    /// Convert from u8 index
    #[inline]
    pub fn from_index(index: u8) -> Self {
        match index {
            0 => Self::Linear,
            1 => Self::SmoothStep,
            2 => Self::InOutQuad,
            3 => Self::OutCubic,
            4 => Self::OutQuint,
            _ => Self::Linear,
        }
    }

    /// Get display name
    pub fn name(&self) -> &'static str {
        match self {
            Self::Linear => "Linear",
            Self::SmoothStep => "SmoothStep",
            Self::InOutQuad => "InOutQuad",
            Self::OutCubic => "OutCubic",
            Self::OutQuint => "OutQuint",
        }
    }

    /// Evaluate curve at position t (0.0 - 1.0)
    #[inline]
    pub fn evaluate(&self, t: f64) -> f64 {
        let t = t.clamp(0.0, 1.0);

        match self {
            Self::Linear => t,
            Self::SmoothStep => t * t * (3.0 - 2.0 * t),
            Self::InOutQuad => {
                if t < 0.5 {
                    2.0 * t * t
                } else {
                    1.0 - (-2.0 * t + 2.0).powi(2) / 2.0
                }
            }
            Self::OutCubic => 1.0 - (1.0 - t).powi(3),
            Self::OutQuint => 1.0 - (1.0 - t).powi(5),
        }
    }

    /// Slope dy/dt at position t
    #[inline]
    pub fn derivative(&self, t: f64) -> f64 {
        let t = t.clamp(0.0, 1.0);

        match self {
            Self::Linear => 1.0,
            Self::SmoothStep => 6.0 * t * (1.0 - t),
            Self::InOutQuad => {
                if t < 0.5 {
                    4.0 * t
                } else {
                    4.0 * (1.0 - t)
                }
            }
            Self::OutCubic => 3.0 * (1.0 - t).powi(2),
            Self::OutQuint => 5.0 * (1.0 - t).powi(4),
        }
    }

    /// Area under the curve from 0 to t
    #[inline]
    pub fn integral(&self, t: f64) -> f64 {
        let t = t.clamp(0.0, 1.0);

        match self {
            Self::Linear => t * t / 2.0,
            Self::SmoothStep => t.powi(3) - t.powi(4) / 2.0,
            Self::InOutQuad => {
                if t < 0.5 {
                    2.0 * t.powi(3) / 3.0
                } else {
                    // ∫ 1 − 2(1 − x)² from 0.5 to t, plus the first half (1/12)
                    let u = 1.0 - t;
                    1.0 / 12.0 + (t - 0.5) + (2.0 * u.powi(3) - 0.25) / 3.0
                }
            }
            Self::OutCubic => t + ((1.0 - t).powi(4) - 1.0) / 4.0,
            Self::OutQuint => t + ((1.0 - t).powi(6) - 1.0) / 6.0,
        }
    }

    /// Usable as a velocity ramp: starts at 0, ends at 1
    pub fn is_ramp(&self) -> bool {
        matches!(self, Self::Linear | Self::SmoothStep | Self::InOutQuad)
    }

    /// Usable as a stopping position curve: arrives with zero slope
    pub fn is_ease_out(&self) -> bool {
        matches!(self, Self::OutCubic | Self::OutQuint)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const ALL: [EaseCurve; 5] = [
        EaseCurve::Linear,
        EaseCurve::SmoothStep,
        EaseCurve::InOutQuad,
        EaseCurve::OutCubic,
        EaseCurve::OutQuint,
    ];

    #[test]
    fn test_curve_endpoints() {
        for curve in ALL {
            assert!(curve.evaluate(0.0).abs() < 1e-12, "{}", curve.name());
            assert!((curve.evaluate(1.0) - 1.0).abs() < 1e-12, "{}", curve.name());
        }
    }

    #[test]
    fn test_curves_monotonic() {
        for curve in ALL {
            let mut prev = curve.evaluate(0.0);
            for i in 1..=1000 {
                let v = curve.evaluate(i as f64 / 1000.0);
                assert!(v >= prev - 1e-12, "{} not monotonic at {}", curve.name(), i);
                prev = v;
            }
        }
    }

    #[test]
    fn test_integral_matches_numeric() {
        for curve in ALL {
            let steps = 20_000;
            let mut area = 0.0;
            for i in 0..steps {
                let t = (i as f64 + 0.5) / steps as f64;
                area += curve.evaluate(t) / steps as f64;
            }
            assert!(
                (area - curve.integral(1.0)).abs() < 1e-6,
                "{}: numeric {} closed {}",
                curve.name(),
                area,
                curve.integral(1.0)
            );
        }
    }

    #[test]
    fn test_integral_continuous_at_midpoint() {
        let below = EaseCurve::InOutQuad.integral(0.5 - 1e-9);
        let above = EaseCurve::InOutQuad.integral(0.5 + 1e-9);
        assert!((below - above).abs() < 1e-8);
    }

    #[test]
    fn test_derivative_matches_difference() {
        for curve in ALL {
            for &t in &[0.1, 0.3, 0.7, 0.9] {
                let h = 1e-6;
                let numeric = (curve.evaluate(t + h) - curve.evaluate(t - h)) / (2.0 * h);
                assert!((numeric - curve.derivative(t)).abs() < 1e-4, "{}", curve.name());
            }
        }
    }

    #[test]
    fn test_curve_roles() {
        assert!(EaseCurve::SmoothStep.is_ramp());
        assert!(!EaseCurve::OutCubic.is_ramp());
        assert!(EaseCurve::OutCubic.is_ease_out());
        assert_eq!(EaseCurve::OutCubic.derivative(1.0), 0.0);
        assert_eq!(EaseCurve::from_index(3), EaseCurve::OutCubic);
        assert_eq!(EaseCurve::from_index(99), EaseCurve::Linear);
    }
}
