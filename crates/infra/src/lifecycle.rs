//! Order lifecycle orchestration.
//!
//! `OrderLifecycle` is the application-level pipeline for every order-affecting
//! request: validate the input shape, open a unit of work, make pure domain
//! decisions, persist atomically, and only then hand events to the
//! notification bus. Constructed once at process start over an injected store
//! and bus; shared read-only thereafter.

use std::collections::HashMap;

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use thiserror::Error;
use tracing::{info, instrument, warn};

use stockline_alerts::evaluate;
use stockline_catalog::ProductId;
use stockline_core::{CustomerId, DomainError, UserId};
use stockline_events::{NotificationBus, NotificationEvent, OrderStatusChanged, StockAlertRaised};
use stockline_ledger::InventoryMovement;
use stockline_orders::{
    Order, OrderId, OrderItem, OrderStatus, StockEffect, order_number,
};
use stockline_pricing::{LineInput, PricingConfig, price_order};

use crate::stock_ledger::StockLedger;
use crate::store::{Store, StoreError, StoreTx};

/// Failure taxonomy at the lifecycle boundary.
///
/// Validation variants are rejected before any transaction opens; conflict
/// variants carry enough detail to retry correctly; `TransactionFailed` means
/// the whole unit of work rolled back and the caller may safely retry.
#[derive(Debug, Error)]
pub enum LifecycleError {
    #[error("order has no line items")]
    EmptyOrder,

    #[error("validation failed: {0}")]
    Validation(String),

    #[error("product not found: {0}")]
    ProductNotFound(ProductId),

    #[error("product cannot be sold: {0}")]
    ProductInactive(ProductId),

    #[error(
        "insufficient stock for product {product_id}: requested {requested}, available {available}"
    )]
    InsufficientStock {
        product_id: ProductId,
        requested: i64,
        available: i64,
    },

    #[error("order not found: {0}")]
    OrderNotFound(OrderId),

    #[error("invalid transition {from} -> {to}; valid targets: {valid:?}")]
    InvalidTransition {
        from: OrderStatus,
        to: OrderStatus,
        valid: &'static [OrderStatus],
    },

    #[error("transaction failed: {0}")]
    TransactionFailed(String),
}

impl From<StoreError> for LifecycleError {
    fn from(value: StoreError) -> Self {
        match value {
            StoreError::InsufficientStock {
                product_id,
                requested,
                available,
            } => Self::InsufficientStock {
                product_id,
                requested,
                available,
            },
            StoreError::ProductNotFound(id) => Self::ProductNotFound(id),
            StoreError::OrderNotFound(id) => Self::OrderNotFound(id),
            other => Self::TransactionFailed(other.to_string()),
        }
    }
}

impl From<DomainError> for LifecycleError {
    fn from(value: DomainError) -> Self {
        match value {
            DomainError::Validation(msg)
            | DomainError::InvalidId(msg)
            | DomainError::InvariantViolation(msg) => Self::Validation(msg),
            DomainError::NotFound => Self::Validation("not found".to_string()),
            DomainError::Conflict(msg) => Self::TransactionFailed(msg),
        }
    }
}

/// One requested line of a checkout.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CheckoutItem {
    pub product_id: ProductId,
    pub quantity: i64,
}

/// Checkout input, as received from the customer-facing collaborator.
///
/// The caller supplies `order_id`; retrying the same request with the same id
/// is idempotent and returns the already-persisted receipt.
#[derive(Debug, Clone)]
pub struct CheckoutRequest {
    pub order_id: OrderId,
    pub customer_id: CustomerId,
    pub items: Vec<CheckoutItem>,
    pub shipping_address: String,
    pub actor: UserId,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CheckoutReceipt {
    pub order_id: OrderId,
    pub order_number: String,
    pub status: OrderStatus,
    pub total_amount: Decimal,
}

/// Status transition input, as received from the admin collaborator.
#[derive(Debug, Clone)]
pub struct TransitionRequest {
    pub order_id: OrderId,
    pub target_status: OrderStatus,
    pub actor: UserId,
    pub notes: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TransitionReceipt {
    pub order_id: OrderId,
    pub status: OrderStatus,
}

/// The order lifecycle state machine, wired to a store and a notification bus.
#[derive(Debug)]
pub struct OrderLifecycle<S, B> {
    store: S,
    bus: B,
    ledger: StockLedger,
    pricing: PricingConfig,
}

impl<S, B> OrderLifecycle<S, B>
where
    S: Store,
    B: NotificationBus,
{
    pub fn new(store: S, bus: B, pricing: PricingConfig) -> Self {
        Self {
            store,
            bus,
            ledger: StockLedger::new(),
            pricing,
        }
    }

    /// Place an order: price it, reserve every line item, persist `pending`.
    ///
    /// All-or-nothing: if any line is short on stock, no stock moves and no
    /// order is created.
    #[instrument(
        skip(self, request),
        fields(
            order_id = %request.order_id,
            customer_id = %request.customer_id,
            item_count = request.items.len(),
        ),
        err
    )]
    pub fn checkout(&self, request: CheckoutRequest) -> Result<CheckoutReceipt, LifecycleError> {
        // Shape validation; nothing below opens a transaction until this holds.
        if request.items.is_empty() {
            return Err(LifecycleError::EmptyOrder);
        }
        if request.shipping_address.trim().is_empty() {
            return Err(LifecycleError::Validation(
                "shipping_address cannot be empty".to_string(),
            ));
        }
        for item in &request.items {
            if item.quantity <= 0 {
                return Err(LifecycleError::Validation(
                    "quantity must be positive".to_string(),
                ));
            }
        }
        for (index, item) in request.items.iter().enumerate() {
            if request.items[..index]
                .iter()
                .any(|other| other.product_id == item.product_id)
            {
                return Err(LifecycleError::Validation(format!(
                    "duplicate line for product {}",
                    item.product_id
                )));
            }
        }

        let now = Utc::now();
        let mut tx = self.store.begin()?;

        // Idempotent retry: the order id was already persisted.
        if let Some(existing) = tx.order(request.order_id)? {
            return Ok(CheckoutReceipt {
                order_id: existing.id,
                order_number: existing.order_number,
                status: existing.status,
                total_amount: existing.total_amount,
            });
        }

        // Snapshot prices and alert thresholds while the rows are in view.
        let mut lines = Vec::with_capacity(request.items.len());
        let mut thresholds = HashMap::new();
        for item in &request.items {
            let product = tx.product(item.product_id)?;
            if !product.can_be_sold() {
                return Err(LifecycleError::ProductInactive(product.id));
            }
            thresholds.insert(product.id, (product.minimum_stock, product.maximum_stock));
            lines.push(LineInput {
                product_id: product.id,
                quantity: item.quantity,
                unit_price: product.price,
            });
        }

        let totals = price_order(&lines, self.pricing.shipping_fee, self.pricing.tax_rate)?;

        let items = lines
            .iter()
            .map(|line| {
                OrderItem::new(request.order_id, line.product_id, line.quantity, line.unit_price)
            })
            .collect::<Result<Vec<_>, _>>()?;

        let order = Order::new(
            request.order_id,
            order_number(request.order_id, now),
            request.customer_id,
            &items,
            totals.subtotal,
            totals.shipping_fee,
            totals.tax_amount,
            totals.total_amount,
            request.shipping_address.clone(),
            now,
        )?;

        let mut movements = Vec::with_capacity(items.len());
        for item in &items {
            movements.push(self.ledger.reserve(
                &mut tx,
                item.product_id,
                item.quantity,
                order.id,
                request.actor,
                now,
            )?);
        }

        tx.insert_order(&order, &items)?;
        tx.commit()?;

        info!(
            order_id = %order.id,
            order_number = %order.order_number,
            total_amount = %order.total_amount,
            "order placed"
        );

        self.publish(NotificationEvent::OrderStatusChanged(OrderStatusChanged {
            order_id: order.id,
            old_status: None,
            new_status: OrderStatus::Pending,
            occurred_at: now,
        }));
        self.publish_stock_alerts(&movements, &thresholds, now);

        Ok(CheckoutReceipt {
            order_id: order.id,
            order_number: order.order_number,
            status: order.status,
            total_amount: order.total_amount,
        })
    }

    /// Move an order along its lifecycle.
    ///
    /// Idempotent under retry: requesting the status the order already has is
    /// a no-op success, so stock is restored exactly once. The status update
    /// and any restoration commit together or not at all.
    #[instrument(
        skip(self, request),
        fields(
            order_id = %request.order_id,
            target_status = %request.target_status,
        ),
        err
    )]
    pub fn transition(
        &self,
        request: TransitionRequest,
    ) -> Result<TransitionReceipt, LifecycleError> {
        let now = Utc::now();
        let mut tx = self.store.begin()?;

        let order = tx
            .order(request.order_id)?
            .ok_or(LifecycleError::OrderNotFound(request.order_id))?;

        if order.status == request.target_status {
            return Ok(TransitionReceipt {
                order_id: order.id,
                status: order.status,
            });
        }
        if !order.status.can_transition_to(request.target_status) {
            return Err(LifecycleError::InvalidTransition {
                from: order.status,
                to: request.target_status,
                valid: order.status.valid_next_states(),
            });
        }

        let mut movements = Vec::new();
        let mut thresholds = HashMap::new();
        if order.status.stock_effect(request.target_status) == StockEffect::Restore {
            // Restore from the immutable line-item snapshots.
            let items = tx.order_items(order.id)?;
            for item in &items {
                let product = tx.product(item.product_id)?;
                thresholds.insert(product.id, (product.minimum_stock, product.maximum_stock));
                movements.push(self.ledger.restore(
                    &mut tx,
                    item.product_id,
                    item.quantity,
                    order.id,
                    request.actor,
                    now,
                )?);
            }
        }

        tx.set_order_status(order.id, request.target_status, now)?;
        tx.commit()?;

        info!(
            order_id = %order.id,
            from = %order.status,
            to = %request.target_status,
            notes = ?request.notes,
            "order transitioned"
        );

        self.publish(NotificationEvent::OrderStatusChanged(OrderStatusChanged {
            order_id: order.id,
            old_status: Some(order.status),
            new_status: request.target_status,
            occurred_at: now,
        }));
        self.publish_stock_alerts(&movements, &thresholds, now);

        Ok(TransitionReceipt {
            order_id: order.id,
            status: request.target_status,
        })
    }

    /// Administrator stock correction, outside the order flow.
    #[instrument(skip(self, reason), fields(product_id = %product_id), err)]
    pub fn adjust_stock(
        &self,
        product_id: ProductId,
        delta: i64,
        reason: impl Into<String>,
        actor: UserId,
    ) -> Result<Option<InventoryMovement>, LifecycleError> {
        let now = Utc::now();
        let mut tx = self.store.begin()?;

        let product = tx.product(product_id)?;
        let movement = self
            .ledger
            .adjust(&mut tx, product_id, delta, reason, actor, now)?;
        tx.commit()?;

        if let Some(movement) = &movement {
            info!(
                product_id = %product_id,
                applied = movement.delta(),
                new_stock = movement.new_stock,
                "stock adjusted"
            );
            let mut thresholds = HashMap::new();
            thresholds.insert(product.id, (product.minimum_stock, product.maximum_stock));
            self.publish_stock_alerts(std::slice::from_ref(movement), &thresholds, now);
        }

        Ok(movement)
    }

    /// Hand an event to the notification gateway.
    ///
    /// Fire-and-forget: the transaction already committed, so a publish
    /// failure is logged and swallowed, never surfaced to the caller.
    fn publish(&self, event: NotificationEvent) {
        if let Err(error) = self.bus.publish(event) {
            warn!(?error, "notification publish failed");
        }
    }

    /// Evaluate post-commit stock levels and publish at most one alert per
    /// movement.
    fn publish_stock_alerts(
        &self,
        movements: &[InventoryMovement],
        thresholds: &HashMap<ProductId, (i64, i64)>,
        now: DateTime<Utc>,
    ) {
        for movement in movements {
            let Some(&(minimum, maximum)) = thresholds.get(&movement.product_id) else {
                continue;
            };
            if let Some(alert) = evaluate(movement.product_id, movement.new_stock, minimum, maximum)
            {
                self.publish(NotificationEvent::StockAlert(StockAlertRaised {
                    product_id: alert.product_id,
                    alert_type: alert.alert_type,
                    current_stock: alert.current_stock,
                    threshold: alert.threshold,
                    occurred_at: now,
                }));
            }
        }
    }
}
