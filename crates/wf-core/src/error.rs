//! Error types for WheelForge

use thiserror::Error;

use crate::SegmentId;

/// Core error type
#[derive(Error, Debug)]
pub enum WfError {
    /// Bad or empty segment table, bad timing. Fatal at startup.
    #[error("Configuration error: {0}")]
    Configuration(String),

    /// Broker unreachable or publish failed. Recoverable.
    #[error("Transport error: {0}")]
    Transport(String),

    /// Spin or mode switch requested while a spin is in flight
    #[error("Rejected while a spin is active: {0}")]
    ReentrancyViolation(&'static str),

    #[error("Unknown segment: {0}")]
    UnknownSegment(SegmentId),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(String),
}

impl WfError {
    /// Shorthand for a configuration error
    pub fn config(msg: impl Into<String>) -> Self {
        Self::Configuration(msg.into())
    }

    /// Errors that must abort startup
    pub fn is_fatal(&self) -> bool {
        matches!(self, Self::Configuration(_) | Self::Serialization(_))
    }
}

/// Result type alias
pub type WfResult<T> = Result<T, WfError>;
