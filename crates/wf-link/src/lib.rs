//! # wf-link — WheelForge Device Link
//!
//! Keeps the wireless spin button's lights in step with the game and turns
//! its presses into spin requests.
//!
//! ## Features
//!
//! - Plain-string wire protocol (`idle`, `spin_start`, `spin_result:<id>`, `error`)
//! - Edge-triggered publishing with reconnect republish
//! - Press debouncing
//! - MQTT transport with exponential reconnect backoff
//! - Offline and loopback links for local play and tests

pub mod backoff;
pub mod debounce;
pub mod error;
pub mod link;
pub mod mqtt;
pub mod protocol;
pub mod sync;

pub use backoff::*;
pub use debounce::*;
pub use error::*;
pub use link::*;
pub use mqtt::*;
pub use protocol::*;
pub use sync::*;
