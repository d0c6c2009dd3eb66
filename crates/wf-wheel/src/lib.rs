//! # wf-wheel — Prize Wheel Engine for WheelForge
//!
//! Drives a Chuck-a-Luck style prize wheel: weighted outcome selection,
//! frame-rate independent spin physics, and rolling/lifetime statistics.
//!
//! ## Features
//!
//! - **Outcome Model**: Ordered segment table with weighted sampling
//! - **Payout Table**: Display view grouped by payout, per-face dice odds
//! - **Spin Physics**: Closed-form wind-up / ease-out deceleration / settle wobble
//! - **Timing Profiles**: Normal, Quick, Studio spin timing
//! - **Statistics**: All-time histogram + 45-spin rolling window, copy-on-write snapshots
//!
//! ## Architecture
//!
//! ```text
//! SegmentTable ──weighted_pick──> SegmentId
//!     │                               │
//!     │                               v
//!     │                         SpinEngine (advance(dt) per frame)
//!     │                               │
//!     v                               v
//! PayoutTable                   SpinResult ──record──> StatisticsStore
//!                                                           │
//!                                                           v
//!                                                   StatisticsSnapshot
//! ```

pub mod curve;
pub mod paytable;
pub mod physics;
pub mod segments;
pub mod spin;
pub mod stats;
pub mod timing;

pub use curve::*;
pub use paytable::*;
pub use physics::*;
pub use segments::*;
pub use spin::*;
pub use stats::*;
pub use timing::*;
