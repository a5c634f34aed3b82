//! In-memory notification bus for tests/dev.

use std::sync::{Mutex, mpsc};

use crate::bus::{NotificationBus, Subscription};
use crate::notification::NotificationEvent;

#[derive(Debug)]
pub enum InMemoryBusError {
    /// Publish failed due to internal lock poisoning.
    Poisoned,
}

/// In-memory pub/sub bus.
///
/// - No IO / no async
/// - Best-effort fan-out; dead subscribers are dropped while publishing
#[derive(Debug, Default)]
pub struct InMemoryNotificationBus {
    subscribers: Mutex<Vec<mpsc::Sender<NotificationEvent>>>,
}

impl InMemoryNotificationBus {
    pub fn new() -> Self {
        Self::default()
    }
}

impl NotificationBus for InMemoryNotificationBus {
    type Error = InMemoryBusError;

    fn publish(&self, event: NotificationEvent) -> Result<(), Self::Error> {
        let mut subs = self
            .subscribers
            .lock()
            .map_err(|_| InMemoryBusError::Poisoned)?;

        subs.retain(|tx| tx.send(event.clone()).is_ok());

        Ok(())
    }

    fn subscribe(&self) -> Subscription<NotificationEvent> {
        let (tx, rx) = mpsc::channel();

        // If the lock is poisoned we still return a subscription; it just
        // won't receive messages until the process restarts.
        if let Ok(mut subs) = self.subscribers.lock() {
            subs.push(tx);
        }

        Subscription::new(rx)
    }
}
