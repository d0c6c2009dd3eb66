//! Wire protocol between the game and the spin button
//!
//! Plain UTF-8 payloads, QoS 0, never retained.
//!
//! | Direction     | Topic (default) | Payloads                                      |
//! |---------------|-----------------|-----------------------------------------------|
//! | Game → Device | `wheel/state`   | `idle`, `spin_start`, `spin_result:<id>`, `error` |
//! | Device → Game | `wheel/spin`    | `button_pressed` (legacy firmware: `pressed`) |

use std::fmt;
use std::sync::Arc;
use std::sync::atomic::{AtomicU8, Ordering};
use std::time::Duration;

use serde::{Deserialize, Serialize};

use wf_core::SegmentId;

use crate::error::LinkError;

// ═══════════════════════════════════════════════════════════════════════════════
// MESSAGES
// ═══════════════════════════════════════════════════════════════════════════════

/// Game → Device command
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DeviceCommand {
    Idle,
    SpinStart,
    SpinResult(SegmentId),
    Error,
}

impl DeviceCommand {
    /// Wire payload
    pub fn to_payload(&self) -> String {
        match self {
            Self::Idle => "idle".to_string(),
            Self::SpinStart => "spin_start".to_string(),
            Self::SpinResult(id) => format!("spin_result:{}", id),
            Self::Error => "error".to_string(),
        }
    }

    /// Parse a wire payload
    pub fn parse(payload: &str) -> Result<Self, LinkError> {
        let payload = payload.trim();
        match payload {
            "idle" => Ok(Self::Idle),
            "spin_start" => Ok(Self::SpinStart),
            "error" => Ok(Self::Error),
            _ => {
                let id = payload
                    .strip_prefix("spin_result:")
                    .ok_or_else(|| LinkError::Protocol(format!("unknown command '{}'", payload)))?;
                id.parse::<SegmentId>()
                    .map(Self::SpinResult)
                    .map_err(|e| LinkError::Protocol(format!("bad segment id '{}': {}", id, e)))
            }
        }
    }

    /// Device state the button shows after this command
    pub fn device_state(&self) -> DeviceState {
        match self {
            Self::Idle => DeviceState::Idle,
            Self::SpinStart => DeviceState::Spinning,
            Self::SpinResult(_) => DeviceState::Flashing,
            Self::Error => DeviceState::Error,
        }
    }
}

impl fmt::Display for DeviceCommand {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_payload())
    }
}

/// Device → Game event
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DeviceEvent {
    ButtonPressed,
}

impl DeviceEvent {
    pub fn parse(payload: &str) -> Result<Self, LinkError> {
        match payload.trim() {
            "button_pressed" | "pressed" => Ok(Self::ButtonPressed),
            other => Err(LinkError::Protocol(format!("unknown device event '{}'", other))),
        }
    }

    pub fn to_payload(&self) -> &'static str {
        match self {
            Self::ButtonPressed => "button_pressed",
        }
    }
}

// ═══════════════════════════════════════════════════════════════════════════════
// DEVICE STATE
// ═══════════════════════════════════════════════════════════════════════════════

/// What the button is currently showing
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
#[repr(u8)]
pub enum DeviceState {
    #[default]
    Idle = 0,
    Spinning = 1,
    Flashing = 2,
    Error = 3,
}

impl DeviceState {
    #[inline]
    pub fn from_u8(value: u8) -> Self {
        match value {
            0 => Self::Idle,
            1 => Self::Spinning,
            2 => Self::Flashing,
            _ => Self::Error,
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            Self::Idle => "Idle",
            Self::Spinning => "Spinning",
            Self::Flashing => "Flashing",
            Self::Error => "Error",
        }
    }
}

/// Lock-free device state cell. One writer (the synchronizer), any number of readers.
#[derive(Debug, Clone, Default)]
pub struct DeviceStateCell(Arc<AtomicU8>);

impl DeviceStateCell {
    pub fn new(state: DeviceState) -> Self {
        Self(Arc::new(AtomicU8::new(state as u8)))
    }

    #[inline]
    pub fn get(&self) -> DeviceState {
        DeviceState::from_u8(self.0.load(Ordering::Acquire))
    }

    #[inline]
    pub(crate) fn set(&self, state: DeviceState) {
        self.0.store(state as u8, Ordering::Release);
    }
}

// ═══════════════════════════════════════════════════════════════════════════════
// CONFIG
// ═══════════════════════════════════════════════════════════════════════════════

/// Link configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LinkConfig {
    /// Broker host
    pub host: String,

    /// Broker port
    pub port: u16,

    /// MQTT client id
    pub client_id: String,

    /// Game → Device topic
    pub state_topic: String,

    /// Device → Game topic
    pub spin_topic: String,

    /// Keep-alive interval in seconds
    pub keep_alive_secs: u64,

    /// Presses closer than this to the last accepted one are dropped
    pub debounce_ms: u64,

    /// First reconnect delay
    pub backoff_min_ms: u64,

    /// Reconnect delay ceiling
    pub backoff_max_ms: u64,

    /// Inbound event ring buffer size
    pub inbound_capacity: usize,
}

impl Default for LinkConfig {
    fn default() -> Self {
        Self {
            host: "localhost".to_string(),
            port: 1883,
            client_id: "wheelforge".to_string(),
            state_topic: "wheel/state".to_string(),
            spin_topic: "wheel/spin".to_string(),
            keep_alive_secs: 60,
            debounce_ms: 300,
            backoff_min_ms: 500,
            backoff_max_ms: 30_000,
            inbound_capacity: 256,
        }
    }
}

impl LinkConfig {
    /// Config for a broker at `host:port`
    pub fn broker(host: &str, port: u16) -> Self {
        Self {
            host: host.to_string(),
            port,
            ..Self::default()
        }
    }

    /// Parse `host:port` (port optional, defaults to 1883)
    pub fn parse_broker(addr: &str) -> Result<(String, u16), LinkError> {
        let addr = addr.trim();
        match addr.rsplit_once(':') {
            Some((host, port)) => {
                let port = port
                    .parse::<u16>()
                    .map_err(|e| LinkError::InvalidConfig(format!("bad port '{}': {}", port, e)))?;
                Ok((host.to_string(), port))
            }
            None => Ok((addr.to_string(), 1883)),
        }
    }

    /// Set client id
    pub fn client_id(mut self, id: &str) -> Self {
        self.client_id = id.to_string();
        self
    }

    /// Set both topics
    pub fn topics(mut self, state_topic: &str, spin_topic: &str) -> Self {
        self.state_topic = state_topic.to_string();
        self.spin_topic = spin_topic.to_string();
        self
    }

    /// Set debounce window
    pub fn debounce(mut self, window: Duration) -> Self {
        self.debounce_ms = window.as_millis() as u64;
        self
    }

    /// Set reconnect backoff bounds
    pub fn backoff(mut self, min: Duration, max: Duration) -> Self {
        self.backoff_min_ms = min.as_millis() as u64;
        self.backoff_max_ms = max.as_millis() as u64;
        self
    }

    pub fn debounce_window(&self) -> Duration {
        Duration::from_millis(self.debounce_ms)
    }

    pub fn keep_alive(&self) -> Duration {
        Duration::from_secs(self.keep_alive_secs)
    }

    pub fn validate(&self) -> Result<(), LinkError> {
        if self.host.trim().is_empty() {
            return Err(LinkError::InvalidConfig("broker host is empty".into()));
        }
        if self.port == 0 {
            return Err(LinkError::InvalidConfig("broker port is 0".into()));
        }
        if self.client_id.trim().is_empty() {
            return Err(LinkError::InvalidConfig("client id is empty".into()));
        }
        if self.state_topic.is_empty() || self.spin_topic.is_empty() {
            return Err(LinkError::InvalidConfig("topics must not be empty".into()));
        }
        if self.state_topic == self.spin_topic {
            return Err(LinkError::InvalidConfig(format!(
                "state and spin topics are both '{}'",
                self.state_topic
            )));
        }
        if self.keep_alive_secs < 5 {
            return Err(LinkError::InvalidConfig(format!(
                "keep-alive must be at least 5s, got {}s",
                self.keep_alive_secs
            )));
        }
        if self.backoff_min_ms == 0 || self.backoff_min_ms > self.backoff_max_ms {
            return Err(LinkError::InvalidConfig(format!(
                "backoff range {}..{}ms is invalid",
                self.backoff_min_ms, self.backoff_max_ms
            )));
        }
        if self.inbound_capacity == 0 {
            return Err(LinkError::InvalidConfig("inbound capacity is 0".into()));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_command_payloads() {
        assert_eq!(DeviceCommand::Idle.to_payload(), "idle");
        assert_eq!(DeviceCommand::SpinStart.to_payload(), "spin_start");
        assert_eq!(DeviceCommand::SpinResult(SegmentId(12)).to_payload(), "spin_result:12");
        assert_eq!(DeviceCommand::Error.to_string(), "error");
    }

    #[test]
    fn test_command_parse() {
        assert_eq!(DeviceCommand::parse(" idle\n").unwrap(), DeviceCommand::Idle);
        assert_eq!(
            DeviceCommand::parse("spin_result:53").unwrap(),
            DeviceCommand::SpinResult(SegmentId(53))
        );
        assert!(DeviceCommand::parse("spin_result:").is_err());
        assert!(DeviceCommand::parse("spin_result:-1").is_err());
        assert!(DeviceCommand::parse("spinning").is_err());
    }

    #[test]
    fn test_event_parse_accepts_legacy_token() {
        assert_eq!(DeviceEvent::parse("button_pressed").unwrap(), DeviceEvent::ButtonPressed);
        assert_eq!(DeviceEvent::parse("pressed").unwrap(), DeviceEvent::ButtonPressed);
        assert!(DeviceEvent::parse("released").is_err());
    }

    #[test]
    fn test_command_device_states() {
        assert_eq!(DeviceCommand::SpinStart.device_state(), DeviceState::Spinning);
        assert_eq!(
            DeviceCommand::SpinResult(SegmentId(0)).device_state(),
            DeviceState::Flashing
        );
        assert_eq!(DeviceCommand::Idle.device_state(), DeviceState::Idle);
    }

    #[test]
    fn test_state_cell_shared() {
        let cell = DeviceStateCell::default();
        let reader = cell.clone();
        assert_eq!(reader.get(), DeviceState::Idle);
        cell.set(DeviceState::Error);
        assert_eq!(reader.get(), DeviceState::Error);
    }

    #[test]
    fn test_config_defaults_and_validation() {
        let config = LinkConfig::default();
        config.validate().unwrap();
        assert_eq!(config.port, 1883);
        assert_eq!(config.debounce_window(), Duration::from_millis(300));

        let bad = LinkConfig::default().topics("wheel/x", "wheel/x");
        assert!(bad.validate().is_err());

        let bad = LinkConfig {
            backoff_min_ms: 60_000,
            ..LinkConfig::default()
        };
        assert!(bad.validate().is_err());
    }

    #[test]
    fn test_parse_broker() {
        assert_eq!(
            LinkConfig::parse_broker("10.0.0.5:1884").unwrap(),
            ("10.0.0.5".to_string(), 1884)
        );
        assert_eq!(
            LinkConfig::parse_broker("broker.local").unwrap(),
            ("broker.local".to_string(), 1883)
        );
        assert!(LinkConfig::parse_broker("host:abc").is_err());
    }

    #[test]
    fn test_config_partial_json() {
        let config: LinkConfig = serde_json::from_str(r#"{"host": "pi.local"}"#).unwrap();
        assert_eq!(config.host, "pi.local");
        assert_eq!(config.spin_topic, "wheel/spin");
    }
}
