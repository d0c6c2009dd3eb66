//! Device State Synchronizer
//!
//! Single writer of [`DeviceState`]. Publishes one command per game phase
//! transition, re-publishes the current one exactly once after each
//! reconnect, and turns debounced button presses into spin requests.

use std::time::Instant;

use serde::Serialize;

use crate::debounce::Debouncer;
use crate::link::{DeviceLink, LinkEvent};
use crate::protocol::{DeviceCommand, DeviceState, DeviceStateCell, LinkConfig};

/// Counters for diagnostics
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct SyncStats {
    /// Commands handed to the transport
    pub published: u64,
    /// Repeats of the current command that were not sent
    pub suppressed: u64,
    /// Publishes the transport rejected
    pub failures: u64,
    /// Transitions recorded while disconnected
    pub deferred: u64,
    pub presses_accepted: u64,
    pub presses_debounced: u64,
    /// Broker sessions established
    pub connects: u64,
    pub disconnects: u64,
}

/// Debounced button press, ready to become a spin request
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RemotePress {
    pub at: Instant,
}

/// Keeps the button consistent with the game phase
pub struct DeviceSynchronizer {
    link: Box<dyn DeviceLink>,
    state: DeviceStateCell,
    /// Command for the current phase
    current: DeviceCommand,
    connected: bool,
    debouncer: Debouncer,
    stats: SyncStats,
}

impl DeviceSynchronizer {
    pub fn new(link: Box<dyn DeviceLink>, config: &LinkConfig) -> Self {
        log::info!("[Sync] Using {} link", link.name());

        let mut sync = Self {
            link,
            state: DeviceStateCell::new(DeviceState::Error),
            current: DeviceCommand::Idle,
            connected: false,
            debouncer: Debouncer::new(config.debounce_window()),
            stats: SyncStats::default(),
        };
        // Session may already be up; its queued notice then counts as a duplicate
        if sync.link.is_connected() {
            sync.on_connected();
        }
        sync
    }

    /// Read handle for the device state
    pub fn state_cell(&self) -> DeviceStateCell {
        self.state.clone()
    }

    pub fn device_state(&self) -> DeviceState {
        self.state.get()
    }

    pub fn current_command(&self) -> DeviceCommand {
        self.current
    }

    pub fn is_connected(&self) -> bool {
        self.connected
    }

    pub fn stats(&self) -> &SyncStats {
        &self.stats
    }

    /// Enter a new game phase. Repeats of the current command are suppressed.
    pub fn set_phase(&mut self, command: DeviceCommand) {
        if command == self.current {
            self.stats.suppressed += 1;
            log::debug!("[Sync] Suppressed repeat of '{}'", command);
            return;
        }
        self.current = command;
        self.publish_current();
    }

    /// Drain link events. Returns the presses that survived debouncing.
    pub fn poll_input(&mut self) -> Vec<RemotePress> {
        let mut presses = Vec::new();
        while let Some(event) = self.link.try_recv() {
            match event {
                LinkEvent::Connected => self.on_connected(),
                LinkEvent::Disconnected { reason } => self.on_disconnected(&reason),
                LinkEvent::ButtonPressed { at } => {
                    if self.debouncer.accept(at) {
                        self.stats.presses_accepted += 1;
                        log::info!("[Sync] Button pressed");
                        presses.push(RemotePress { at });
                    } else {
                        self.stats.presses_debounced += 1;
                        log::debug!("[Sync] Debounced button press");
                    }
                }
            }
        }
        self.reconcile_connection();
        presses
    }

    /// Follow the link's own flag when a connect or disconnect notice was lost
    fn reconcile_connection(&mut self) {
        match (self.link.is_connected(), self.connected) {
            (true, false) => self.on_connected(),
            (false, true) => self.on_disconnected("link reported down"),
            _ => {}
        }
    }

    fn on_connected(&mut self) {
        if self.connected {
            log::debug!("[Sync] Duplicate connect notice ignored");
            return;
        }
        self.connected = true;
        self.stats.connects += 1;
        log::info!("[Sync] Link up, restoring '{}'", self.current);
        self.publish_current();
    }

    fn on_disconnected(&mut self, reason: &str) {
        if !self.connected {
            return;
        }
        self.connected = false;
        self.stats.disconnects += 1;
        self.state.set(DeviceState::Error);
        log::warn!("[Sync] Link down: {}", reason);
    }

    fn publish_current(&mut self) {
        let command = self.current;
        if !self.connected {
            self.stats.deferred += 1;
            self.state.set(DeviceState::Error);
            log::debug!("[Sync] Offline, '{}' deferred until reconnect", command);
            return;
        }

        match self.link.publish(&command) {
            Ok(()) => {
                self.stats.published += 1;
                self.state.set(command.device_state());
                log::debug!("[Sync] Published '{}'", command);
            }
            Err(e) => {
                self.stats.failures += 1;
                self.state.set(DeviceState::Error);
                log::warn!("[Sync] Publish of '{}' failed: {}", command, e);
            }
        }
    }
}
