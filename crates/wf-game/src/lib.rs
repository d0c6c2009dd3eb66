//! # wf-game — WheelForge Game Session
//!
//! Mode controller, normalized input queue, frame loop and session config.
//!
//! ```text
//! keyboard ─┐                                   ┌─> SpinEngine
//!           ├─> EventQueue ─> GameController ───┼─> StatisticsStore
//! button ───┘   (crossbeam)        │            └─> DeviceSynchronizer ─> button lights
//!  (via DeviceSynchronizer)        v
//!                              FrameView ─> Renderer
//! ```

pub mod config;
pub mod controller;
pub mod event;
pub mod runner;

pub use config::*;
pub use controller::*;
pub use event::*;
pub use runner::*;
