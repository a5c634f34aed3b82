//! Sales order domain module.
//!
//! This crate contains the order lifecycle's business rules, implemented
//! purely as deterministic domain logic (no IO, no HTTP, no storage): the
//! status state machine, the order/line-item records with their total
//! identity, and order-number generation.

pub mod number;
pub mod order;
pub mod status;

pub use number::order_number;
pub use order::{Order, OrderId, OrderItem, PaymentStatus};
pub use status::{OrderStatus, StockEffect};
