//! Normalized input events
//!
//! Keyboard, GUI and device input all become [`GameEvent`]s pushed into one
//! bounded crossbeam queue. The controller is the only consumer.

use crossbeam_channel::{Receiver, Sender, TrySendError, bounded};

use wf_core::SegmentId;

/// Default queue depth
pub const EVENT_QUEUE_CAPACITY: usize = 256;

/// Where a spin request came from
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum InputSource {
    /// Keyboard / operator console
    Local,
    /// Wireless spin button
    Device,
}

/// Game input
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GameEvent {
    TriggerSpin { source: InputSource },
    ToggleStatsView,
    ToggleTestMode,
    RunSimulation,
    SelectNextSegment,
    SelectPreviousSegment,
    SelectSegment(SegmentId),
    ResetStatistics,
    Quit,
}

impl GameEvent {
    pub fn local_spin() -> Self {
        Self::TriggerSpin {
            source: InputSource::Local,
        }
    }

    pub fn device_spin() -> Self {
        Self::TriggerSpin {
            source: InputSource::Device,
        }
    }
}

/// Cloneable producer handle
#[derive(Debug, Clone)]
pub struct EventSender {
    tx: Sender<GameEvent>,
}

impl EventSender {
    /// Queue an event without blocking. Returns false if it was dropped.
    pub fn send(&self, event: GameEvent) -> bool {
        match self.tx.try_send(event) {
            Ok(()) => true,
            Err(TrySendError::Full(event)) => {
                log::warn!("[Game] Event queue full, dropping {:?}", event);
                false
            }
            Err(TrySendError::Disconnected(_)) => false,
        }
    }
}

/// Multi-producer, single-consumer event queue
#[derive(Debug)]
pub struct EventQueue {
    tx: Sender<GameEvent>,
    rx: Receiver<GameEvent>,
}

impl EventQueue {
    pub fn new(capacity: usize) -> Self {
        let (tx, rx) = bounded(capacity.max(1));
        Self { tx, rx }
    }

    pub fn sender(&self) -> EventSender {
        EventSender {
            tx: self.tx.clone(),
        }
    }

    /// Events queued so far, oldest first
    pub fn drain(&self) -> impl Iterator<Item = GameEvent> + '_ {
        self.rx.try_iter()
    }

    pub fn len(&self) -> usize {
        self.rx.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rx.is_empty()
    }
}

impl Default for EventQueue {
    fn default() -> Self {
        Self::new(EVENT_QUEUE_CAPACITY)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_multi_producer_order() {
        let queue = EventQueue::default();
        let a = queue.sender();
        let b = queue.sender();

        assert!(a.send(GameEvent::local_spin()));
        assert!(b.send(GameEvent::ToggleStatsView));
        assert!(a.send(GameEvent::Quit));

        let events: Vec<_> = queue.drain().collect();
        assert_eq!(
            events,
            vec![GameEvent::local_spin(), GameEvent::ToggleStatsView, GameEvent::Quit]
        );
        assert!(queue.is_empty());
    }

    #[test]
    fn test_full_queue_drops() {
        let queue = EventQueue::new(2);
        let tx = queue.sender();
        assert!(tx.send(GameEvent::RunSimulation));
        assert!(tx.send(GameEvent::RunSimulation));
        assert!(!tx.send(GameEvent::RunSimulation));
        assert_eq!(queue.len(), 2);
    }

    #[test]
    fn test_sender_from_thread() {
        let queue = EventQueue::default();
        let tx = queue.sender();
        std::thread::spawn(move || {
            tx.send(GameEvent::device_spin());
        })
        .join()
        .unwrap();
        assert_eq!(queue.drain().next(), Some(GameEvent::device_spin()));
    }
}
