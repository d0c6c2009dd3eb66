//! Timing profiles for the spin animation

use rand::Rng;
use serde::{Deserialize, Serialize};

use wf_core::{WfError, WfResult};

use crate::curve::EaseCurve;

/// Timing profile for spins
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TimingProfile {
    /// Show floor timing (long, dramatic deceleration)
    #[default]
    Normal,
    /// Short spins for demos
    Quick,
    /// Studio mode (fast, for testing the rig)
    Studio,
    /// Hand-tuned values
    Custom,
}

/// Detailed spin timing configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SpinTiming {
    /// Profile type
    pub profile: TimingProfile,

    /// Velocity ramp-up duration (s)
    pub wind_up_secs: f64,

    /// Shortest deceleration phase (s)
    pub min_spin_secs: f64,

    /// Longest deceleration phase (s)
    pub max_spin_secs: f64,

    /// Fewest full revolutions before the stop
    pub min_revolutions: u32,

    /// Most full revolutions before the stop
    pub max_revolutions: u32,

    /// Settle wobble duration (s), 0 disables
    pub settle_secs: f64,

    /// Settle wobble peak amplitude (degrees)
    pub settle_wobble_deg: f64,

    /// Largest delta-time accepted by one `advance` call (s)
    pub max_step_secs: f64,

    /// Velocity shape during wind-up
    pub wind_up_curve: EaseCurve,

    /// Position shape during deceleration
    pub decel_curve: EaseCurve,
}

/// Upper bound for the settle wobble amplitude (degrees)
pub const MAX_SETTLE_WOBBLE_DEG: f64 = 5.0;

/// Upper bound for the settle wobble duration (s)
pub const MAX_SETTLE_SECS: f64 = 0.5;

/// Fewest revolutions any profile may use
pub const MIN_REVOLUTIONS: u32 = 3;

impl SpinTiming {
    /// Show floor timing
    pub fn normal() -> Self {
        Self {
            profile: TimingProfile::Normal,
            wind_up_secs: 3.0,
            min_spin_secs: 28.0,
            max_spin_secs: 38.0,
            min_revolutions: 4,
            max_revolutions: 8,
            settle_secs: 0.35,
            settle_wobble_deg: 1.8,
            max_step_secs: 0.1,
            wind_up_curve: EaseCurve::SmoothStep,
            decel_curve: EaseCurve::OutCubic,
        }
    }

    /// Short spins
    pub fn quick() -> Self {
        Self {
            profile: TimingProfile::Quick,
            wind_up_secs: 1.0,
            min_spin_secs: 6.0,
            max_spin_secs: 9.0,
            min_revolutions: 3,
            max_revolutions: 5,
            settle_secs: 0.3,
            settle_wobble_deg: 1.5,
            ..Self::normal()
        }
    }

    /// Studio mode
    pub fn studio() -> Self {
        Self {
            profile: TimingProfile::Studio,
            wind_up_secs: 0.5,
            min_spin_secs: 2.0,
            max_spin_secs: 3.0,
            min_revolutions: 3,
            max_revolutions: 4,
            settle_secs: 0.2,
            settle_wobble_deg: 1.0,
            ..Self::normal()
        }
    }

    /// Get config for profile
    pub fn from_profile(profile: TimingProfile) -> Self {
        match profile {
            TimingProfile::Normal => Self::normal(),
            TimingProfile::Quick => Self::quick(),
            TimingProfile::Studio => Self::studio(),
            TimingProfile::Custom => Self::normal(),
        }
    }

    /// Check ranges, bounds and curve roles
    pub fn validate(&self) -> WfResult<()> {
        let positive = |name: &str, v: f64| {
            if v.is_finite() && v > 0.0 {
                Ok(())
            } else {
                Err(WfError::config(format!("{} must be positive, got {}", name, v)))
            }
        };

        positive("wind_up_secs", self.wind_up_secs)?;
        positive("min_spin_secs", self.min_spin_secs)?;
        positive("max_spin_secs", self.max_spin_secs)?;
        positive("max_step_secs", self.max_step_secs)?;

        if self.min_spin_secs > self.max_spin_secs {
            return Err(WfError::config(format!(
                "min_spin_secs {} exceeds max_spin_secs {}",
                self.min_spin_secs, self.max_spin_secs
            )));
        }
        if self.min_revolutions < MIN_REVOLUTIONS {
            return Err(WfError::config(format!(
                "min_revolutions must be at least {}, got {}",
                MIN_REVOLUTIONS, self.min_revolutions
            )));
        }
        if self.min_revolutions > self.max_revolutions {
            return Err(WfError::config(format!(
                "min_revolutions {} exceeds max_revolutions {}",
                self.min_revolutions, self.max_revolutions
            )));
        }
        if !(0.0..=MAX_SETTLE_SECS).contains(&self.settle_secs) {
            return Err(WfError::config(format!(
                "settle_secs must be within 0..={}, got {}",
                MAX_SETTLE_SECS, self.settle_secs
            )));
        }
        if !(0.0..=MAX_SETTLE_WOBBLE_DEG).contains(&self.settle_wobble_deg) {
            return Err(WfError::config(format!(
                "settle_wobble_deg must be within 0..={}, got {}",
                MAX_SETTLE_WOBBLE_DEG, self.settle_wobble_deg
            )));
        }
        if !self.wind_up_curve.is_ramp() {
            return Err(WfError::config(format!(
                "wind_up_curve {} is not a velocity ramp",
                self.wind_up_curve.name()
            )));
        }
        if !self.decel_curve.is_ease_out() {
            return Err(WfError::config(format!(
                "decel_curve {} is not an ease-out curve",
                self.decel_curve.name()
            )));
        }
        Ok(())
    }

    /// Draw revolutions and deceleration duration for one spin
    pub fn draw<R: Rng + ?Sized>(&self, rng: &mut R) -> (u32, f64) {
        let revolutions = rng.random_range(self.min_revolutions..=self.max_revolutions);
        let decel_secs = if self.max_spin_secs > self.min_spin_secs {
            rng.random_range(self.min_spin_secs..=self.max_spin_secs)
        } else {
            self.min_spin_secs
        };
        (revolutions, decel_secs)
    }
}

impl Default for SpinTiming {
    fn default() -> Self {
        Self::normal()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand_chacha::ChaCha8Rng;

    #[test]
    fn test_profiles_validate() {
        for profile in [
            TimingProfile::Normal,
            TimingProfile::Quick,
            TimingProfile::Studio,
            TimingProfile::Custom,
        ] {
            SpinTiming::from_profile(profile).validate().unwrap();
        }
    }

    #[test]
    fn test_validation_rejects_bad_ranges() {
        let mut timing = SpinTiming::normal();
        timing.min_spin_secs = 40.0;
        assert!(timing.validate().is_err());

        let mut timing = SpinTiming::normal();
        timing.min_revolutions = 2;
        assert!(timing.validate().is_err());

        let mut timing = SpinTiming::normal();
        timing.settle_wobble_deg = 12.0;
        assert!(timing.validate().is_err());

        let mut timing = SpinTiming::normal();
        timing.decel_curve = EaseCurve::SmoothStep;
        assert!(timing.validate().is_err());

        let mut timing = SpinTiming::normal();
        timing.wind_up_secs = 0.0;
        assert!(timing.validate().is_err());
    }

    #[test]
    fn test_draw_within_bounds() {
        let timing = SpinTiming::normal();
        let mut rng = ChaCha8Rng::seed_from_u64(42);
        for _ in 0..1000 {
            let (revs, secs) = timing.draw(&mut rng);
            assert!((4..=8).contains(&revs));
            assert!((28.0..=38.0).contains(&secs));
        }
    }

    #[test]
    fn test_fixed_duration_draw() {
        let timing = SpinTiming {
            min_spin_secs: 5.0,
            max_spin_secs: 5.0,
            ..SpinTiming::quick()
        };
        let mut rng = ChaCha8Rng::seed_from_u64(1);
        assert_eq!(timing.draw(&mut rng).1, 5.0);
    }

    #[test]
    fn test_partial_deserialize_uses_defaults() {
        let timing: SpinTiming = serde_json::from_str(r#"{"wind_up_secs": 2.0}"#).unwrap();
        assert_eq!(timing.wind_up_secs, 2.0);
        assert_eq!(timing.max_spin_secs, 38.0);
    }
}
