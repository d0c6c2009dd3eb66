//! Spin result

use std::time::Duration;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use wf_core::SegmentId;

/// Outcome of one completed spin
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SpinResult {
    /// Segment under the pointer
    pub segment: SegmentId,
    /// Wall-clock completion time
    pub timestamp: DateTime<Utc>,
    /// Time from spin start to rest
    pub duration: Duration,
    /// Terminal segment chosen by the operator (test mode)
    #[serde(default)]
    pub forced: bool,
}

impl SpinResult {
    pub fn new(segment: SegmentId, duration: Duration) -> Self {
        Self {
            segment,
            timestamp: Utc::now(),
            duration,
            forced: false,
        }
    }

    /// Mark as operator-forced
    pub fn forced(mut self) -> Self {
        self.forced = true;
        self
    }

    /// Spin duration in seconds
    pub fn duration_secs(&self) -> f64 {
        self.duration.as_secs_f64()
    }
}
