//! Spin Physics Engine
//!
//! Closed-form rotation profile: every sample is computed from elapsed time
//! alone, so the wheel lands on the same angle whatever the frame timing.
//!
//! ```text
//! velocity
//!    │      ________
//!    │    /         ‾‾‾‾‾‾‾‾‾‾‾‾‾‾‾‾‾‾‾‾‾‾‾‾‾‾‾‾‾‾‾‾‾‾‾‾‾‾‾‾‾‾‾‾‾‾‾‾‾‾‾‾‾‾‾
//!    │   /                        ‾‾‾‾‾‾‾‾‾‾‾‾‾‾‾‾‾‾‾‾‾‾‾‾‾‾‾‾‾‾
//!    │  /                                           ‾‾‾‾‾‾‾‾‾‾‾‾‾‾‾‾‾‾‾
//!    │_/                                                              ~~.
//!    └──────────────────────────────────────────────────────────────────── t
//!      WindingUp │ Decelerating                                   │Settling
//! ```
//!
//! Angles are degrees. The cumulative angle keeps counting past 360 and
//! drives the distance math; the display angle is the cumulative angle
//! modulo 360. Segment `k` of `N` spans `[k·360/N, (k+1)·360/N)`.

use std::f64::consts::PI;
use std::time::Duration;

use rand::Rng;
use serde::{Deserialize, Serialize};

use wf_core::{SegmentId, WfError, WfResult};

use crate::curve::EaseCurve;
use crate::spin::SpinResult;
use crate::timing::SpinTiming;

/// Decay rate of the settle wobble envelope
const SETTLE_DECAY: f64 = 3.0;

// ═══════════════════════════════════════════════════════════════════════════════
// PHASE
// ═══════════════════════════════════════════════════════════════════════════════

/// Animation phase of the wheel
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SpinPhase {
    /// At rest, no spin since startup
    #[default]
    Idle,
    /// Velocity ramping up
    WindingUp,
    /// Easing out towards the target
    Decelerating,
    /// Damped wobble around the target
    Settling,
    /// At rest on the last result
    Complete,
}

impl SpinPhase {
    /// A spin is in flight
    pub fn is_active(&self) -> bool {
        matches!(self, Self::WindingUp | Self::Decelerating | Self::Settling)
    }

    pub fn name(&self) -> &'static str {
        match self {
            Self::Idle => "Idle",
            Self::WindingUp => "WindingUp",
            Self::Decelerating => "Decelerating",
            Self::Settling => "Settling",
            Self::Complete => "Complete",
        }
    }
}

// ═══════════════════════════════════════════════════════════════════════════════
// GEOMETRY
// ═══════════════════════════════════════════════════════════════════════════════

/// Angular width of one segment
#[inline]
pub fn segment_width(segment_count: usize) -> f64 {
    360.0 / segment_count.max(1) as f64
}

/// Center angle of segment `k`
#[inline]
pub fn segment_center(segment: SegmentId, segment_count: usize) -> f64 {
    (segment.index() as f64 + 0.5) * segment_width(segment_count)
}

/// Segment whose span contains `angle`
pub fn segment_at(angle: f64, segment_count: usize) -> SegmentId {
    let count = segment_count.max(1);
    let index = (angle.rem_euclid(360.0) / segment_width(count)).floor() as usize;
    SegmentId::from_index(index.min(count - 1))
}

/// Cumulative stop angle landing on the center of `segment`
pub fn target_angle(start: f64, revolutions: u32, segment: SegmentId, segment_count: usize) -> f64 {
    let center = segment_center(segment, segment_count);
    start + revolutions as f64 * 360.0 + (center - start).rem_euclid(360.0)
}

// ═══════════════════════════════════════════════════════════════════════════════
// PLAN
// ═══════════════════════════════════════════════════════════════════════════════

/// Fully resolved motion of one spin, fixed at start
#[derive(Debug, Clone, PartialEq)]
pub struct SpinPlan {
    /// Terminal segment
    pub segment: SegmentId,
    /// Terminal segment was chosen by the operator
    pub forced: bool,
    /// Full revolutions before the stop
    pub revolutions: u32,
    /// Cumulative angle at start
    pub start_angle: f64,
    /// Cumulative angle at rest
    pub target_angle: f64,
    /// Wind-up duration (s)
    pub wind_up_secs: f64,
    /// Deceleration duration (s)
    pub decel_secs: f64,
    /// Settle duration (s), 0 when disabled
    pub settle_secs: f64,
    /// Settle wobble amplitude (degrees)
    pub wobble_deg: f64,
    /// Velocity reached at the end of wind-up (deg/s)
    pub peak_velocity: f64,
    wind_up_curve: EaseCurve,
    decel_curve: EaseCurve,
}

impl SpinPlan {
    /// Build the motion for a spin from `start_angle` to `segment`
    pub fn new(
        segment: SegmentId,
        segment_count: usize,
        start_angle: f64,
        revolutions: u32,
        decel_secs: f64,
        timing: &SpinTiming,
    ) -> Self {
        let target = target_angle(start_angle, revolutions, segment, segment_count);
        let distance = target - start_angle;

        // Wind-up ends at V and deceleration starts at V:
        // V·Tw·∫ramp + V·Td/ease'(0) = distance
        let tw = timing.wind_up_secs;
        let ramp_area = timing.wind_up_curve.integral(1.0);
        let decel_slope = timing.decel_curve.derivative(0.0);
        let peak_velocity = distance / (tw * ramp_area + decel_secs / decel_slope);

        let (settle_secs, wobble_deg) =
            if timing.settle_secs > 0.0 && timing.settle_wobble_deg > 0.0 {
                (timing.settle_secs, timing.settle_wobble_deg)
            } else {
                (0.0, 0.0)
            };

        Self {
            segment,
            forced: false,
            revolutions,
            start_angle,
            target_angle: target,
            wind_up_secs: tw,
            decel_secs,
            settle_secs,
            wobble_deg,
            peak_velocity,
            wind_up_curve: timing.wind_up_curve,
            decel_curve: timing.decel_curve,
        }
    }

    /// Total rotation (degrees)
    pub fn distance(&self) -> f64 {
        self.target_angle - self.start_angle
    }

    /// Spin length from start to rest (s)
    pub fn total_secs(&self) -> f64 {
        self.wind_up_secs + self.decel_secs + self.settle_secs
    }

    /// Distance covered during wind-up
    fn wind_up_distance(&self) -> f64 {
        self.peak_velocity * self.wind_up_secs * self.wind_up_curve.integral(1.0)
    }

    /// Phase, cumulative angle and velocity at `elapsed` seconds
    pub fn sample(&self, elapsed: f64) -> (SpinPhase, f64, f64) {
        let t = elapsed.max(0.0);
        let tw = self.wind_up_secs;
        let td = self.decel_secs;

        if t < tw {
            let u = t / tw;
            let angle = self.start_angle
                + self.peak_velocity * tw * self.wind_up_curve.integral(u);
            let velocity = self.peak_velocity * self.wind_up_curve.evaluate(u);
            return (SpinPhase::WindingUp, angle, velocity);
        }

        if t < tw + td {
            let u = (t - tw) / td;
            let wind_up = self.wind_up_distance();
            let remaining = self.distance() - wind_up;
            let angle = self.start_angle + wind_up + remaining * self.decel_curve.evaluate(u);
            let velocity = remaining / td * self.decel_curve.derivative(u);
            return (SpinPhase::Decelerating, angle, velocity);
        }

        if t < self.total_secs() {
            let s = (t - tw - td) / self.settle_secs;
            let envelope = (-SETTLE_DECAY * s).exp();
            let angle = self.target_angle + self.wobble_deg * (PI * s).sin() * envelope;
            let velocity = self.wobble_deg
                * envelope
                * (PI * (PI * s).cos() - SETTLE_DECAY * (PI * s).sin())
                / self.settle_secs;
            return (SpinPhase::Settling, angle, velocity);
        }

        (SpinPhase::Complete, self.target_angle, 0.0)
    }
}

// ═══════════════════════════════════════════════════════════════════════════════
// STATE / FRAME
// ═══════════════════════════════════════════════════════════════════════════════

/// Transient state of the spin in flight
#[derive(Debug, Clone)]
pub struct SpinState {
    /// Time since spin start (s)
    pub elapsed: f64,
    /// Current cumulative angle
    pub angle: f64,
    /// Current angular velocity (deg/s)
    pub velocity: f64,
    /// Cumulative stop angle
    pub target_angle: f64,
    pub phase: SpinPhase,
    pub plan: SpinPlan,
}

/// Per-frame output of the engine
#[derive(Debug, Clone)]
pub struct SpinFrame {
    /// Display angle in `[0, 360)`
    pub angle: f64,
    /// Cumulative angle
    pub cumulative_angle: f64,
    /// Angular velocity (deg/s)
    pub velocity: f64,
    pub phase: SpinPhase,
    /// Segment currently under the pointer
    pub pointer_segment: SegmentId,
    /// Set on the frame the spin comes to rest, and only that frame
    pub completed: Option<SpinResult>,
}

// ═══════════════════════════════════════════════════════════════════════════════
// ENGINE
// ═══════════════════════════════════════════════════════════════════════════════

/// Wheel rotation engine, driven by `advance(dt)` once per frame
#[derive(Debug, Clone)]
pub struct SpinEngine {
    segment_count: usize,
    timing: SpinTiming,
    /// Cumulative angle while at rest
    rest_angle: f64,
    /// Phase while at rest (Idle or Complete)
    rest_phase: SpinPhase,
    state: Option<SpinState>,
}

impl SpinEngine {
    pub fn new(segment_count: usize, timing: SpinTiming) -> WfResult<Self> {
        if segment_count == 0 {
            return Err(WfError::config("wheel needs at least one segment"));
        }
        timing.validate()?;

        Ok(Self {
            segment_count,
            timing,
            rest_angle: 0.0,
            rest_phase: SpinPhase::Idle,
            state: None,
        })
    }

    pub fn segment_count(&self) -> usize {
        self.segment_count
    }

    pub fn timing(&self) -> &SpinTiming {
        &self.timing
    }

    pub fn phase(&self) -> SpinPhase {
        self.state
            .as_ref()
            .map(|s| s.phase)
            .unwrap_or(self.rest_phase)
    }

    pub fn is_spinning(&self) -> bool {
        self.state.is_some()
    }

    /// Current cumulative angle
    pub fn cumulative_angle(&self) -> f64 {
        self.state.as_ref().map(|s| s.angle).unwrap_or(self.rest_angle)
    }

    /// Current display angle in `[0, 360)`
    pub fn angle(&self) -> f64 {
        self.cumulative_angle().rem_euclid(360.0)
    }

    /// Segment currently under the pointer
    pub fn pointer_segment(&self) -> SegmentId {
        segment_at(self.cumulative_angle(), self.segment_count)
    }

    /// Spin in flight, if any
    pub fn state(&self) -> Option<&SpinState> {
        self.state.as_ref()
    }

    /// Start a spin landing on `segment`
    pub fn start<R: Rng + ?Sized>(&mut self, segment: SegmentId, rng: &mut R) -> WfResult<&SpinPlan> {
        let plan = self.plan(segment, rng)?;
        self.start_with_plan(plan)
    }

    /// Start a spin onto an operator-chosen segment
    pub fn start_forced<R: Rng + ?Sized>(
        &mut self,
        segment: SegmentId,
        rng: &mut R,
    ) -> WfResult<&SpinPlan> {
        let mut plan = self.plan(segment, rng)?;
        plan.forced = true;
        self.start_with_plan(plan)
    }

    /// Draw the motion for a spin from the current rest angle
    pub fn plan<R: Rng + ?Sized>(&self, segment: SegmentId, rng: &mut R) -> WfResult<SpinPlan> {
        if self.is_spinning() {
            return Err(WfError::ReentrancyViolation("spin"));
        }
        self.check_segment(segment)?;

        let (revolutions, decel_secs) = self.timing.draw(rng);
        Ok(SpinPlan::new(
            segment,
            self.segment_count,
            self.rest_angle,
            revolutions,
            decel_secs,
            &self.timing,
        ))
    }

    /// Start a pre-built plan
    pub fn start_with_plan(&mut self, plan: SpinPlan) -> WfResult<&SpinPlan> {
        if self.is_spinning() {
            return Err(WfError::ReentrancyViolation("spin"));
        }
        self.check_segment(plan.segment)?;

        log::info!(
            "[Wheel] Spin started → segment {}{} ({} revs, {:.1}s)",
            plan.segment,
            if plan.forced { " (forced)" } else { "" },
            plan.revolutions,
            plan.total_secs()
        );

        let state = SpinState {
            elapsed: 0.0,
            angle: plan.start_angle,
            velocity: 0.0,
            target_angle: plan.target_angle,
            phase: SpinPhase::WindingUp,
            plan,
        };
        Ok(&self.state.insert(state).plan)
    }

    /// Advance the animation by `dt` seconds
    pub fn advance(&mut self, dt: f64) -> SpinFrame {
        let dt = self.clamp_step(dt);

        let Some(state) = self.state.as_mut() else {
            return self.frame(0.0, None);
        };

        state.elapsed += dt;
        let (phase, angle, velocity) = state.plan.sample(state.elapsed);
        state.phase = phase;
        state.angle = angle;
        state.velocity = velocity;

        if phase != SpinPhase::Complete {
            return self.frame(velocity, None);
        }

        let Some(finished) = self.state.take() else {
            return self.frame(0.0, None);
        };
        self.rest_angle = segment_center(finished.plan.segment, self.segment_count);
        self.rest_phase = SpinPhase::Complete;

        let mut result = SpinResult::new(
            finished.plan.segment,
            Duration::from_secs_f64(finished.plan.total_secs()),
        );
        if finished.plan.forced {
            result = result.forced();
        }

        log::info!(
            "[Wheel] Spin complete: segment {} after {:.2}s",
            result.segment,
            result.duration_secs()
        );

        self.frame(0.0, Some(result))
    }

    /// Run the spin in flight to completion at the maximum step
    pub fn fast_forward(&mut self) -> Option<SpinResult> {
        let step = self.timing.max_step_secs;
        while self.is_spinning() {
            if let Some(result) = self.advance(step).completed {
                return Some(result);
            }
        }
        None
    }

    /// Rotate the idle wheel so `segment` sits under the pointer
    pub fn snap_to(&mut self, segment: SegmentId) -> WfResult<()> {
        if self.is_spinning() {
            return Err(WfError::ReentrancyViolation("snap"));
        }
        self.check_segment(segment)?;
        self.rest_angle = segment_center(segment, self.segment_count);
        Ok(())
    }

    fn check_segment(&self, segment: SegmentId) -> WfResult<()> {
        if segment.index() >= self.segment_count {
            return Err(WfError::UnknownSegment(segment));
        }
        Ok(())
    }

    fn clamp_step(&self, dt: f64) -> f64 {
        if !dt.is_finite() || dt < 0.0 {
            log::debug!("[Wheel] Ignoring invalid step {}", dt);
            return 0.0;
        }
        let max = self.timing.max_step_secs;
        if dt > max {
            log::debug!("[Wheel] Clamping step {:.3}s to {:.3}s", dt, max);
            return max;
        }
        dt
    }

    fn frame(&self, velocity: f64, completed: Option<SpinResult>) -> SpinFrame {
        let cumulative = self.cumulative_angle();
        SpinFrame {
            angle: cumulative.rem_euclid(360.0),
            cumulative_angle: cumulative,
            velocity,
            phase: self.phase(),
            pointer_segment: segment_at(cumulative, self.segment_count),
            completed,
        }
    }
}
