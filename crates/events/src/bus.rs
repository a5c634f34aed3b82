//! Notification publishing/subscription abstraction (mechanics only).
//!
//! The bus is the hand-off point to the notification gateway. It is strictly
//! fire-and-forget relative to the transaction that produced the event: the
//! store has already committed by the time anything is published, and a
//! publish failure must never fail or roll back an order operation.
//!
//! Delivery is best-effort, at-least-once at most. The store — not the bus —
//! is the source of truth; anything a consumer misses can be re-derived from
//! orders and movements.

use std::sync::Arc;
use std::sync::mpsc::Receiver;
use std::time::Duration;

use crate::notification::NotificationEvent;

/// A subscription to the notification stream.
///
/// Each subscription receives a copy of every event published after it was
/// created (broadcast semantics). Designed for single-threaded consumption;
/// hand the subscription to one worker.
#[derive(Debug)]
pub struct Subscription<M> {
    receiver: Receiver<M>,
}

impl<M> Subscription<M> {
    pub fn new(receiver: Receiver<M>) -> Self {
        Self { receiver }
    }

    /// Block until the next message is available.
    pub fn recv(&self) -> Result<M, std::sync::mpsc::RecvError> {
        self.receiver.recv()
    }

    /// Try to receive a message without blocking.
    pub fn try_recv(&self) -> Result<M, std::sync::mpsc::TryRecvError> {
        self.receiver.try_recv()
    }

    /// Block for up to `timeout` waiting for a message.
    pub fn recv_timeout(&self, timeout: Duration) -> Result<M, std::sync::mpsc::RecvTimeoutError> {
        self.receiver.recv_timeout(timeout)
    }
}

/// The notification gateway seam.
///
/// Implementations must return from `publish` without waiting on delivery;
/// transports that need IO should enqueue and drain elsewhere.
pub trait NotificationBus: Send + Sync {
    type Error: core::fmt::Debug + Send + Sync + 'static;

    fn publish(&self, event: NotificationEvent) -> Result<(), Self::Error>;

    fn subscribe(&self) -> Subscription<NotificationEvent>;
}

impl<B> NotificationBus for Arc<B>
where
    B: NotificationBus + ?Sized,
{
    type Error = B::Error;

    fn publish(&self, event: NotificationEvent) -> Result<(), Self::Error> {
        (**self).publish(event)
    }

    fn subscribe(&self) -> Subscription<NotificationEvent> {
        (**self).subscribe()
    }
}
