//! Inventory movement ledger domain module.
//!
//! The append-only record types for every stock change, plus the pure replay
//! routines behind the audit guarantee: replaying all movements for a product
//! from its baseline must reproduce the live `stock_quantity` exactly.

pub mod movement;
pub mod replay;

pub use movement::{InventoryMovement, MovementId, MovementReference, MovementType};
pub use replay::{ReplayError, baseline, replay, verify_chain};
