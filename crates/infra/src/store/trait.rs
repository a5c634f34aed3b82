use std::sync::Arc;

use chrono::{DateTime, Utc};
use thiserror::Error;

use stockline_catalog::{Product, ProductId};
use stockline_ledger::InventoryMovement;
use stockline_orders::{Order, OrderId, OrderItem, OrderStatus};

/// Storage operation error.
///
/// These are storage-layer failures; deterministic domain failures
/// (validation, invariants) are rejected before a transaction opens and never
/// reach the store.
#[derive(Debug, Error)]
pub enum StoreError {
    /// The conditional stock decrement found fewer units than requested.
    #[error(
        "insufficient stock for product {product_id}: requested {requested}, available {available}"
    )]
    InsufficientStock {
        product_id: ProductId,
        requested: i64,
        available: i64,
    },

    #[error("product not found: {0}")]
    ProductNotFound(ProductId),

    #[error("order not found: {0}")]
    OrderNotFound(OrderId),

    #[error("duplicate sku: {0}")]
    DuplicateSku(String),

    #[error("duplicate order: {0}")]
    DuplicateOrder(OrderId),

    /// A persisted row failed to map back into a domain record.
    #[error("invalid record: {0}")]
    InvalidRecord(String),

    /// The underlying transaction or connection failed.
    #[error("transaction failed: {0}")]
    Transaction(String),
}

/// Net effect of one stock write, as applied by the store.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StockChange {
    pub product_id: ProductId,
    pub previous: i64,
    pub new: i64,
}

impl StockChange {
    /// Signed delta the store actually applied (clamping included).
    pub fn applied(&self) -> i64 {
        self.new - self.previous
    }
}

/// One unit of work against the store.
///
/// Every mutation made through a transaction becomes visible to other readers
/// only at `commit`; dropping the transaction without committing discards all
/// of it. Implementations must make `reserve_stock` a single conditional
/// check-and-decrement, never a read followed by a separate write.
pub trait StoreTx {
    fn product(&mut self, id: ProductId) -> Result<Product, StoreError>;

    fn order(&mut self, id: OrderId) -> Result<Option<Order>, StoreError>;

    fn order_items(&mut self, id: OrderId) -> Result<Vec<OrderItem>, StoreError>;

    /// Atomically check `stock_quantity >= quantity` and decrement it.
    ///
    /// Fails with [`StoreError::InsufficientStock`] without touching the row
    /// when the check does not hold.
    fn reserve_stock(
        &mut self,
        id: ProductId,
        quantity: i64,
        now: DateTime<Utc>,
    ) -> Result<StockChange, StoreError>;

    /// Increment stock by `quantity`.
    fn release_stock(
        &mut self,
        id: ProductId,
        quantity: i64,
        now: DateTime<Utc>,
    ) -> Result<StockChange, StoreError>;

    /// Apply a signed correction, clamping the result at zero.
    fn adjust_stock(
        &mut self,
        id: ProductId,
        delta: i64,
        now: DateTime<Utc>,
    ) -> Result<StockChange, StoreError>;

    /// Persist an order together with its line items.
    fn insert_order(&mut self, order: &Order, items: &[OrderItem]) -> Result<(), StoreError>;

    fn set_order_status(
        &mut self,
        id: OrderId,
        status: OrderStatus,
        updated_at: DateTime<Utc>,
    ) -> Result<(), StoreError>;

    /// Append a row to the movement ledger (append-only).
    fn append_movement(&mut self, movement: &InventoryMovement) -> Result<(), StoreError>;

    /// Make every change in this unit of work durable and visible.
    fn commit(self) -> Result<(), StoreError>
    where
        Self: Sized;
}

/// Shared store handle: catalog, orders, and the movement ledger.
///
/// Created once at process start and injected into the components that need
/// it; all multi-step mutations go through [`Store::begin`].
pub trait Store: Send + Sync {
    type Tx<'a>: StoreTx
    where
        Self: 'a;

    /// Open a unit of work.
    fn begin(&self) -> Result<Self::Tx<'_>, StoreError>;

    /// Register a catalog record (single-row write, atomic on its own).
    fn insert_product(&self, product: Product) -> Result<(), StoreError>;

    fn get_product(&self, id: ProductId) -> Result<Option<Product>, StoreError>;

    fn get_order(&self, id: OrderId) -> Result<Option<Order>, StoreError>;

    fn get_order_items(&self, id: OrderId) -> Result<Vec<OrderItem>, StoreError>;

    /// Full movement history for one product, oldest-first (audit replay).
    fn product_movements(&self, id: ProductId) -> Result<Vec<InventoryMovement>, StoreError>;
}

impl<S> Store for Arc<S>
where
    S: Store + ?Sized,
{
    type Tx<'a>
        = S::Tx<'a>
    where
        Self: 'a;

    fn begin(&self) -> Result<Self::Tx<'_>, StoreError> {
        (**self).begin()
    }

    fn insert_product(&self, product: Product) -> Result<(), StoreError> {
        (**self).insert_product(product)
    }

    fn get_product(&self, id: ProductId) -> Result<Option<Product>, StoreError> {
        (**self).get_product(id)
    }

    fn get_order(&self, id: OrderId) -> Result<Option<Order>, StoreError> {
        (**self).get_order(id)
    }

    fn get_order_items(&self, id: OrderId) -> Result<Vec<OrderItem>, StoreError> {
        (**self).get_order_items(id)
    }

    fn product_movements(&self, id: ProductId) -> Result<Vec<InventoryMovement>, StoreError> {
        (**self).product_movements(id)
    }
}
