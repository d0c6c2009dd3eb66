//! Transport seam between the synchronizer and the broker

use std::collections::VecDeque;
use std::sync::Arc;
use std::time::Instant;

use parking_lot::Mutex;

use crate::error::LinkError;
use crate::protocol::{DeviceCommand, DeviceEvent};

/// Event surfaced by a link, polled once per frame
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LinkEvent {
    /// Broker session established (initial or reconnect)
    Connected,
    /// Broker session lost
    Disconnected { reason: String },
    /// Button press, stamped when the listener received it
    ButtonPressed { at: Instant },
}

/// Non-blocking device transport
pub trait DeviceLink: Send {
    /// Short name for logs
    fn name(&self) -> &'static str;

    /// Fire-and-forget publish of a game → device command
    fn publish(&mut self, command: &DeviceCommand) -> Result<(), LinkError>;

    /// Next pending inbound event, if any
    fn try_recv(&mut self) -> Option<LinkEvent>;

    fn is_connected(&self) -> bool;
}

// ═══════════════════════════════════════════════════════════════════════════════
// OFFLINE
// ═══════════════════════════════════════════════════════════════════════════════

/// No broker: local play only
#[derive(Debug, Default)]
pub struct OfflineLink;

impl DeviceLink for OfflineLink {
    fn name(&self) -> &'static str {
        "offline"
    }

    fn publish(&mut self, _command: &DeviceCommand) -> Result<(), LinkError> {
        Err(LinkError::NotConnected)
    }

    fn try_recv(&mut self) -> Option<LinkEvent> {
        None
    }

    fn is_connected(&self) -> bool {
        false
    }
}

// ═══════════════════════════════════════════════════════════════════════════════
// LOOPBACK
// ═══════════════════════════════════════════════════════════════════════════════

#[derive(Debug, Default)]
struct LoopbackShared {
    connected: bool,
    fail_publishes: bool,
    inbound: VecDeque<LinkEvent>,
    published: Vec<DeviceCommand>,
}

/// In-memory link. The paired [`LoopbackDevice`] plays the button side.
#[derive(Debug)]
pub struct LoopbackLink {
    shared: Arc<Mutex<LoopbackShared>>,
}

/// Device side of a [`LoopbackLink`]
#[derive(Debug, Clone)]
pub struct LoopbackDevice {
    shared: Arc<Mutex<LoopbackShared>>,
}

impl LoopbackLink {
    /// Disconnected link plus its device handle
    pub fn pair() -> (Self, LoopbackDevice) {
        let shared = Arc::new(Mutex::new(LoopbackShared::default()));
        (
            Self {
                shared: Arc::clone(&shared),
            },
            LoopbackDevice { shared },
        )
    }
}

impl DeviceLink for LoopbackLink {
    fn name(&self) -> &'static str {
        "loopback"
    }

    fn publish(&mut self, command: &DeviceCommand) -> Result<(), LinkError> {
        let mut shared = self.shared.lock();
        if !shared.connected {
            return Err(LinkError::NotConnected);
        }
        if shared.fail_publishes {
            return Err(LinkError::PublishFailed("loopback publish rejected".into()));
        }
        shared.published.push(*command);
        Ok(())
    }

    fn try_recv(&mut self) -> Option<LinkEvent> {
        self.shared.lock().inbound.pop_front()
    }

    fn is_connected(&self) -> bool {
        self.shared.lock().connected
    }
}

impl LoopbackDevice {
    /// Broker comes up
    pub fn connect(&self) {
        let mut shared = self.shared.lock();
        shared.connected = true;
        shared.inbound.push_back(LinkEvent::Connected);
    }

    /// Broker goes away
    pub fn disconnect(&self, reason: &str) {
        let mut shared = self.shared.lock();
        shared.connected = false;
        shared.inbound.push_back(LinkEvent::Disconnected {
            reason: reason.to_string(),
        });
    }

    /// Queue a raw notice without touching the connection flag
    pub fn inject(&self, event: LinkEvent) {
        self.shared.lock().inbound.push_back(event);
    }

    /// Press the button now
    pub fn press(&self) {
        self.press_at(Instant::now());
    }

    pub fn press_at(&self, at: Instant) {
        self.inject(LinkEvent::ButtonPressed { at });
    }

    /// Deliver a raw payload as the firmware would
    pub fn send_payload(&self, payload: &str, at: Instant) -> Result<(), LinkError> {
        match DeviceEvent::parse(payload)? {
            DeviceEvent::ButtonPressed => self.press_at(at),
        }
        Ok(())
    }

    /// Discard queued notices, as an overflowing listener would
    pub fn take_inbound(&self) -> Vec<LinkEvent> {
        self.shared.lock().inbound.drain(..).collect()
    }

    /// Make publishes fail while connected
    pub fn fail_publishes(&self, fail: bool) {
        self.shared.lock().fail_publishes = fail;
    }

    /// Commands received so far
    pub fn published(&self) -> Vec<DeviceCommand> {
        self.shared.lock().published.clone()
    }

    /// Drain received commands
    pub fn take_published(&self) -> Vec<DeviceCommand> {
        std::mem::take(&mut self.shared.lock().published)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_offline_never_connects() {
        let mut link = OfflineLink;
        assert!(!link.is_connected());
        assert!(matches!(link.publish(&DeviceCommand::Idle), Err(LinkError::NotConnected)));
        assert!(link.try_recv().is_none());
    }

    #[test]
    fn test_loopback_roundtrip() {
        let (mut link, device) = LoopbackLink::pair();
        assert!(link.publish(&DeviceCommand::Idle).is_err());

        device.connect();
        assert_eq!(link.try_recv(), Some(LinkEvent::Connected));
        link.publish(&DeviceCommand::SpinStart).unwrap();
        assert_eq!(device.published(), vec![DeviceCommand::SpinStart]);

        device.send_payload("pressed", Instant::now()).unwrap();
        assert!(matches!(link.try_recv(), Some(LinkEvent::ButtonPressed { .. })));
        assert!(device.send_payload("garbage", Instant::now()).is_err());
        assert!(link.try_recv().is_none());

        device.fail_publishes(true);
        assert!(matches!(
            link.publish(&DeviceCommand::Idle),
            Err(LinkError::PublishFailed(_))
        ));
    }
}
