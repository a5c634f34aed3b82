//! The stock ledger engine: the single authority over `stock_quantity`.
//!
//! Every successful operation pairs exactly one stock write with exactly one
//! appended movement row, inside the caller's unit of work. Nothing else in
//! the system writes stock.

use chrono::{DateTime, Utc};
use tracing::debug;

use stockline_catalog::ProductId;
use stockline_core::{EntityId, UserId};
use stockline_ledger::{InventoryMovement, MovementId, MovementReference, MovementType};
use stockline_orders::OrderId;

use crate::lifecycle::LifecycleError;
use crate::store::StoreTx;

/// Stateless engine; operations run inside a caller-opened transaction, so a
/// failure anywhere in the unit of work discards the stock write and the
/// movement row together.
#[derive(Debug, Clone, Copy, Default)]
pub struct StockLedger;

impl StockLedger {
    pub fn new() -> Self {
        Self
    }

    /// Reserve stock for one order line.
    ///
    /// The store performs the conditional check-and-decrement; a shortfall
    /// surfaces as [`LifecycleError::InsufficientStock`] and aborts the whole
    /// transaction, which is what makes multi-line reservation all-or-nothing.
    pub fn reserve<T: StoreTx>(
        &self,
        tx: &mut T,
        product_id: ProductId,
        quantity: i64,
        order_id: OrderId,
        actor: UserId,
        now: DateTime<Utc>,
    ) -> Result<InventoryMovement, LifecycleError> {
        if quantity <= 0 {
            return Err(LifecycleError::Validation(
                "quantity must be positive".to_string(),
            ));
        }

        let change = tx.reserve_stock(product_id, quantity, now)?;
        let movement = InventoryMovement::new(
            MovementId::new(EntityId::new()),
            product_id,
            MovementType::Out,
            quantity,
            MovementReference::Order(order_id),
            change.previous,
            change.new,
            None,
            actor,
            now,
        )?;
        tx.append_movement(&movement)?;

        debug!(%product_id, quantity, previous = change.previous, new = change.new, "stock reserved");
        Ok(movement)
    }

    /// Return a reservation to stock.
    ///
    /// Always succeeds for an existing product; restoring more than was ever
    /// reserved is a logic error the caller must prevent, not the ledger.
    pub fn restore<T: StoreTx>(
        &self,
        tx: &mut T,
        product_id: ProductId,
        quantity: i64,
        order_id: OrderId,
        actor: UserId,
        now: DateTime<Utc>,
    ) -> Result<InventoryMovement, LifecycleError> {
        if quantity <= 0 {
            return Err(LifecycleError::Validation(
                "quantity must be positive".to_string(),
            ));
        }

        let change = tx.release_stock(product_id, quantity, now)?;
        let movement = InventoryMovement::new(
            MovementId::new(EntityId::new()),
            product_id,
            MovementType::In,
            quantity,
            MovementReference::Return(order_id),
            change.previous,
            change.new,
            None,
            actor,
            now,
        )?;
        tx.append_movement(&movement)?;

        debug!(%product_id, quantity, previous = change.previous, new = change.new, "stock restored");
        Ok(movement)
    }

    /// Manual correction outside the order flow. Clamps the result at zero.
    ///
    /// The movement records the *applied* delta, so ledger replay stays exact
    /// even when the clamp truncated the request. Returns `None` when the
    /// clamp absorbed the whole delta (stock already at zero): no stock
    /// changed, so no movement is written.
    pub fn adjust<T: StoreTx>(
        &self,
        tx: &mut T,
        product_id: ProductId,
        delta: i64,
        reason: impl Into<String>,
        actor: UserId,
        now: DateTime<Utc>,
    ) -> Result<Option<InventoryMovement>, LifecycleError> {
        if delta == 0 {
            return Err(LifecycleError::Validation(
                "adjustment delta cannot be zero".to_string(),
            ));
        }
        let reason = reason.into();
        if reason.trim().is_empty() {
            return Err(LifecycleError::Validation(
                "adjustment reason is required".to_string(),
            ));
        }

        let change = tx.adjust_stock(product_id, delta, now)?;
        let applied = change.applied();
        if applied == 0 {
            return Ok(None);
        }

        let (movement_type, quantity) = if applied < 0 {
            (MovementType::Out, -applied)
        } else {
            (MovementType::In, applied)
        };

        let movement = InventoryMovement::new(
            MovementId::new(EntityId::new()),
            product_id,
            movement_type,
            quantity,
            MovementReference::Adjustment,
            change.previous,
            change.new,
            Some(reason),
            actor,
            now,
        )?;
        tx.append_movement(&movement)?;

        debug!(%product_id, requested = delta, applied, "stock adjusted");
        Ok(Some(movement))
    }
}
