//! Notification events and the gateway seam.
//!
//! The core never delivers notifications; it emits [`NotificationEvent`]s
//! into a [`NotificationBus`] and moves on. Delivery (push, email, polling)
//! is an external collaborator behind the bus.

pub mod bus;
pub mod event;
pub mod in_memory_bus;
pub mod notification;

pub use bus::{NotificationBus, Subscription};
pub use event::Event;
pub use in_memory_bus::InMemoryNotificationBus;
pub use notification::{NotificationEvent, OrderStatusChanged, StockAlertRaised};
