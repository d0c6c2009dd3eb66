//! wf-core: Shared types for WheelForge
//!
//! This crate provides the foundational types used across all WheelForge crates.

mod error;
mod ids;

pub use error::*;
pub use ids::*;

/// Standard rolling window capacity (spins kept for the "recent" panels)
pub const DEFAULT_WINDOW_CAPACITY: usize = 45;

/// Standard silent simulation batch size
pub const DEFAULT_SIMULATION_SPINS: usize = 45;
