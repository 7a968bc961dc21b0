use dashmap::DashMap;
use tokio::sync::broadcast;

use crate::model::{Event, PractitionerId};

const CHANNEL_CAPACITY: usize = 256;

/// Broadcast hub for booking events, per practitioner plus one feed of everything.
pub struct NotifyHub {
    channels: DashMap<PractitionerId, broadcast::Sender<Event>>,
    all: broadcast::Sender<Event>,
}

impl Default for NotifyHub {
    fn default() -> Self {
        Self::new()
    }
}

impl NotifyHub {
    pub fn new() -> Self {
        Self {
            channels: DashMap::new(),
            all: broadcast::channel(CHANNEL_CAPACITY).0,
        }
    }

    /// Subscribe to one practitioner's events. Creates the channel if needed.
    pub fn subscribe(&self, practitioner_id: PractitionerId) -> broadcast::Receiver<Event> {
        let sender = self
            .channels
            .entry(practitioner_id)
            .or_insert_with(|| broadcast::channel(CHANNEL_CAPACITY).0);
        sender.subscribe()
    }

    /// Every event, whichever practitioner it concerns.
    pub fn subscribe_all(&self) -> broadcast::Receiver<Event> {
        self.all.subscribe()
    }

    /// Send a notification. No-op if nobody is listening.
    pub fn send(&self, event: &Event) {
        let _ = self.all.send(event.clone());
        if let Some(sender) = self.channels.get(&event.practitioner_id()) {
            let _ = sender.send(event.clone());
        }
    }

    /// Drop a practitioner's channel; its receivers see the stream close.
    pub fn remove(&self, practitioner_id: &PractitionerId) {
        self.channels.remove(practitioner_id);
    }
}
