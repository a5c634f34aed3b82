//! In-memory store.
//!
//! Intended for tests/dev. Not optimized for performance: a transaction holds
//! the state lock for its whole duration and works on a staged copy, which is
//! swapped in wholesale on commit. That gives the two properties the order
//! flow needs without a database: readers never observe partial writes, and
//! dropping an uncommitted transaction is a complete rollback.

use std::collections::HashMap;
use std::sync::{Mutex, MutexGuard};

use chrono::{DateTime, Utc};

use stockline_catalog::{Product, ProductId};
use stockline_ledger::InventoryMovement;
use stockline_orders::{Order, OrderId, OrderItem, OrderStatus};

use super::query::{MovementFilter, MovementQuery, MovementQueryResult, Pagination};
use super::r#trait::{StockChange, Store, StoreError, StoreTx};

#[derive(Debug, Clone, Default)]
struct State {
    products: HashMap<ProductId, Product>,
    sku_index: HashMap<String, ProductId>,
    orders: HashMap<OrderId, Order>,
    order_items: HashMap<OrderId, Vec<OrderItem>>,
    movements: Vec<InventoryMovement>,
}

/// In-memory store over a single mutex-guarded state.
#[derive(Debug, Default)]
pub struct InMemoryStore {
    state: Mutex<State>,
}

impl InMemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> Result<MutexGuard<'_, State>, StoreError> {
        self.state
            .lock()
            .map_err(|_| StoreError::Transaction("state lock poisoned".to_string()))
    }
}

/// A unit of work over a staged copy of the store state.
#[derive(Debug)]
pub struct InMemoryTx<'a> {
    guard: MutexGuard<'a, State>,
    working: State,
}

impl StoreTx for InMemoryTx<'_> {
    fn product(&mut self, id: ProductId) -> Result<Product, StoreError> {
        self.working
            .products
            .get(&id)
            .cloned()
            .ok_or(StoreError::ProductNotFound(id))
    }

    fn order(&mut self, id: OrderId) -> Result<Option<Order>, StoreError> {
        Ok(self.working.orders.get(&id).cloned())
    }

    fn order_items(&mut self, id: OrderId) -> Result<Vec<OrderItem>, StoreError> {
        Ok(self.working.order_items.get(&id).cloned().unwrap_or_default())
    }

    fn reserve_stock(
        &mut self,
        id: ProductId,
        quantity: i64,
        now: DateTime<Utc>,
    ) -> Result<StockChange, StoreError> {
        if quantity <= 0 {
            return Err(StoreError::InvalidRecord(
                "reserve quantity must be positive".to_string(),
            ));
        }
        let product = self
            .working
            .products
            .get_mut(&id)
            .ok_or(StoreError::ProductNotFound(id))?;

        // Single conditional check-and-decrement under the state lock: the
        // in-memory analogue of
        // `UPDATE products SET stock_quantity = stock_quantity - $qty
        //  WHERE id = $id AND stock_quantity >= $qty`.
        if product.stock_quantity < quantity {
            return Err(StoreError::InsufficientStock {
                product_id: id,
                requested: quantity,
                available: product.stock_quantity,
            });
        }

        let previous = product.stock_quantity;
        product.stock_quantity -= quantity;
        product.updated_at = now;

        Ok(StockChange {
            product_id: id,
            previous,
            new: product.stock_quantity,
        })
    }

    fn release_stock(
        &mut self,
        id: ProductId,
        quantity: i64,
        now: DateTime<Utc>,
    ) -> Result<StockChange, StoreError> {
        if quantity <= 0 {
            return Err(StoreError::InvalidRecord(
                "release quantity must be positive".to_string(),
            ));
        }
        let product = self
            .working
            .products
            .get_mut(&id)
            .ok_or(StoreError::ProductNotFound(id))?;

        let previous = product.stock_quantity;
        product.stock_quantity += quantity;
        product.updated_at = now;

        Ok(StockChange {
            product_id: id,
            previous,
            new: product.stock_quantity,
        })
    }

    fn adjust_stock(
        &mut self,
        id: ProductId,
        delta: i64,
        now: DateTime<Utc>,
    ) -> Result<StockChange, StoreError> {
        let product = self
            .working
            .products
            .get_mut(&id)
            .ok_or(StoreError::ProductNotFound(id))?;

        let previous = product.stock_quantity;
        product.stock_quantity = (previous + delta).max(0);
        product.updated_at = now;

        Ok(StockChange {
            product_id: id,
            previous,
            new: product.stock_quantity,
        })
    }

    fn insert_order(&mut self, order: &Order, items: &[OrderItem]) -> Result<(), StoreError> {
        if self.working.orders.contains_key(&order.id) {
            return Err(StoreError::DuplicateOrder(order.id));
        }
        self.working.orders.insert(order.id, order.clone());
        self.working.order_items.insert(order.id, items.to_vec());
        Ok(())
    }

    fn set_order_status(
        &mut self,
        id: OrderId,
        status: OrderStatus,
        updated_at: DateTime<Utc>,
    ) -> Result<(), StoreError> {
        let order = self
            .working
            .orders
            .get_mut(&id)
            .ok_or(StoreError::OrderNotFound(id))?;
        order.status = status;
        order.updated_at = updated_at;
        Ok(())
    }

    fn append_movement(&mut self, movement: &InventoryMovement) -> Result<(), StoreError> {
        self.working.movements.push(movement.clone());
        Ok(())
    }

    fn commit(self) -> Result<(), StoreError> {
        let InMemoryTx { mut guard, working } = self;
        *guard = working;
        Ok(())
    }
}

impl Store for InMemoryStore {
    type Tx<'a>
        = InMemoryTx<'a>
    where
        Self: 'a;

    fn begin(&self) -> Result<InMemoryTx<'_>, StoreError> {
        let guard = self.lock()?;
        let working = guard.clone();
        Ok(InMemoryTx { guard, working })
    }

    fn insert_product(&self, product: Product) -> Result<(), StoreError> {
        let mut state = self.lock()?;
        if state.sku_index.contains_key(&product.sku) {
            return Err(StoreError::DuplicateSku(product.sku));
        }
        state.sku_index.insert(product.sku.clone(), product.id);
        state.products.insert(product.id, product);
        Ok(())
    }

    fn get_product(&self, id: ProductId) -> Result<Option<Product>, StoreError> {
        Ok(self.lock()?.products.get(&id).cloned())
    }

    fn get_order(&self, id: OrderId) -> Result<Option<Order>, StoreError> {
        Ok(self.lock()?.orders.get(&id).cloned())
    }

    fn get_order_items(&self, id: OrderId) -> Result<Vec<OrderItem>, StoreError> {
        Ok(self.lock()?.order_items.get(&id).cloned().unwrap_or_default())
    }

    fn product_movements(&self, id: ProductId) -> Result<Vec<InventoryMovement>, StoreError> {
        // Append order is chronological, so this is already oldest-first.
        Ok(self
            .lock()?
            .movements
            .iter()
            .filter(|m| m.product_id == id)
            .cloned()
            .collect())
    }
}

#[async_trait::async_trait]
impl MovementQuery for InMemoryStore {
    async fn query_movements(
        &self,
        filter: MovementFilter,
        pagination: Pagination,
    ) -> Result<MovementQueryResult, StoreError> {
        let matches_filter = |m: &InventoryMovement| {
            filter.product_id.is_none_or(|id| m.product_id == id)
                && filter.movement_type.is_none_or(|t| m.movement_type == t)
                && filter.created_after.is_none_or(|t| m.created_at >= t)
                && filter.created_before.is_none_or(|t| m.created_at <= t)
        };

        let state = self.lock()?;
        // Newest-first: reverse of append order, stable for equal timestamps.
        let mut matched: Vec<InventoryMovement> = state
            .movements
            .iter()
            .rev()
            .filter(|&m| matches_filter(m))
            .cloned()
            .collect();
        matched.sort_by(|a, b| b.created_at.cmp(&a.created_at));

        let total = matched.len() as u64;
        let movements: Vec<InventoryMovement> = matched
            .into_iter()
            .skip(pagination.offset as usize)
            .take(pagination.limit as usize)
            .collect();
        let has_more = total > u64::from(pagination.offset) + u64::from(pagination.limit);

        Ok(MovementQueryResult {
            movements,
            total,
            pagination,
            has_more,
        })
    }
}
