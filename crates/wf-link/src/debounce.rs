//! Button press debouncing

use std::time::{Duration, Instant};

/// Drops presses closer than `window` to the last accepted press
#[derive(Debug, Clone)]
pub struct Debouncer {
    window: Duration,
    last_accepted: Option<Instant>,
}

impl Debouncer {
    pub fn new(window: Duration) -> Self {
        Self {
            window,
            last_accepted: None,
        }
    }

    pub fn window(&self) -> Duration {
        self.window
    }

    /// Should a press received at `at` count?
    pub fn accept(&mut self, at: Instant) -> bool {
        if let Some(last) = self.last_accepted {
            // Out-of-order timestamps count as inside the window
            if at.saturating_duration_since(last) < self.window {
                return false;
            }
        }
        self.last_accepted = Some(at);
        true
    }
}
