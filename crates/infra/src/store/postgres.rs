//! Postgres-backed store implementation.
//!
//! Persists the catalog, orders, and the movement ledger in PostgreSQL.
//! Expected schema:
//!
//! ```sql
//! CREATE TABLE products (
//!     id             UUID PRIMARY KEY,
//!     sku            TEXT NOT NULL UNIQUE,
//!     name           TEXT NOT NULL,
//!     price          NUMERIC(12, 2) NOT NULL,
//!     stock_quantity BIGINT NOT NULL CHECK (stock_quantity >= 0),
//!     minimum_stock  BIGINT NOT NULL,
//!     maximum_stock  BIGINT NOT NULL,
//!     is_active      BOOLEAN NOT NULL,
//!     created_at     TIMESTAMPTZ NOT NULL,
//!     updated_at     TIMESTAMPTZ NOT NULL
//! );
//!
//! CREATE TABLE orders (
//!     id               UUID PRIMARY KEY,
//!     order_number     TEXT NOT NULL UNIQUE,
//!     customer_id      UUID NOT NULL,
//!     status           TEXT NOT NULL,
//!     subtotal         NUMERIC(12, 2) NOT NULL,
//!     shipping_fee     NUMERIC(12, 2) NOT NULL,
//!     tax_amount       NUMERIC(12, 2) NOT NULL,
//!     total_amount     NUMERIC(12, 2) NOT NULL,
//!     shipping_address TEXT NOT NULL,
//!     payment_status   TEXT NOT NULL,
//!     created_at       TIMESTAMPTZ NOT NULL,
//!     updated_at       TIMESTAMPTZ NOT NULL
//! );
//!
//! CREATE TABLE order_items (
//!     order_id   UUID NOT NULL REFERENCES orders (id),
//!     product_id UUID NOT NULL REFERENCES products (id),
//!     quantity   BIGINT NOT NULL CHECK (quantity > 0),
//!     unit_price NUMERIC(12, 2) NOT NULL,
//!     subtotal   NUMERIC(12, 2) NOT NULL
//! );
//!
//! CREATE TABLE inventory_movements (
//!     id             UUID PRIMARY KEY,
//!     product_id     UUID NOT NULL REFERENCES products (id),
//!     movement_type  TEXT NOT NULL,
//!     quantity       BIGINT NOT NULL CHECK (quantity > 0),
//!     reference_type TEXT NOT NULL,
//!     reference_id   UUID,
//!     previous_stock BIGINT NOT NULL,
//!     new_stock      BIGINT NOT NULL,
//!     reason         TEXT,
//!     created_by     UUID NOT NULL,
//!     created_at     TIMESTAMPTZ NOT NULL
//! );
//! ```
//!
//! ## Reservation semantics
//!
//! `reserve_stock` is a **single conditional update**:
//!
//! ```sql
//! UPDATE products
//! SET stock_quantity = stock_quantity - $qty, updated_at = $now
//! WHERE id = $id AND stock_quantity >= $qty
//! RETURNING stock_quantity
//! ```
//!
//! The row count decides the outcome; there is no separate read of the stock
//! level before the write, so two concurrent reservations for the last units
//! cannot both succeed. The follow-up `SELECT` on the miss path only
//! distinguishes "insufficient" from "no such product" for the error detail.
//!
//! ## Error mapping
//!
//! | SQLx error | PostgreSQL code | StoreError | Scenario |
//! |------------|-----------------|------------|----------|
//! | Database (unique violation) | `23505` | `DuplicateOrder` / `DuplicateSku` | retried insert |
//! | Database (check violation) | `23514` | `Transaction` | bad row data |
//! | Database (other) | any | `Transaction` | other database errors |
//! | PoolClosed / network | n/a | `Transaction` | infrastructure failure |
//!
//! ## Thread safety
//!
//! `PostgresStore` is `Send + Sync` over the SQLx connection pool. The
//! synchronous [`Store`] trait is bridged with `tokio::runtime::Handle`; the
//! caller must be inside a tokio runtime context. A dropped, uncommitted
//! `sqlx::Transaction` is rolled back when its connection returns to the pool.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use sqlx::{FromRow, PgPool, Postgres, Row, Transaction};
use tracing::instrument;

use stockline_catalog::{Product, ProductId};
use stockline_core::{EntityId, UserId};
use stockline_ledger::{InventoryMovement, MovementId, MovementReference, MovementType};
use stockline_orders::{Order, OrderId, OrderItem, OrderStatus, PaymentStatus};

use super::query::{MovementFilter, MovementQuery, MovementQueryResult, Pagination};
use super::r#trait::{StockChange, Store, StoreError, StoreTx};

/// Postgres-backed store.
#[derive(Debug, Clone)]
pub struct PostgresStore {
    pool: Arc<PgPool>,
}

impl PostgresStore {
    /// Create a new store over an existing connection pool.
    pub fn new(pool: PgPool) -> Self {
        Self {
            pool: Arc::new(pool),
        }
    }

    #[instrument(skip(self, product), fields(product_id = %product.id, sku = %product.sku), err)]
    pub async fn insert_product_async(&self, product: Product) -> Result<(), StoreError> {
        sqlx::query(
            r#"
            INSERT INTO products (
                id, sku, name, price, stock_quantity,
                minimum_stock, maximum_stock, is_active, created_at, updated_at
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10)
            "#,
        )
        .bind(product.id.0.as_uuid())
        .bind(&product.sku)
        .bind(&product.name)
        .bind(product.price)
        .bind(product.stock_quantity)
        .bind(product.minimum_stock)
        .bind(product.maximum_stock)
        .bind(product.is_active)
        .bind(product.created_at)
        .bind(product.updated_at)
        .execute(&*self.pool)
        .await
        .map_err(|e| {
            if is_unique_violation(&e) {
                StoreError::DuplicateSku(product.sku.clone())
            } else {
                map_sqlx_error("insert_product", e)
            }
        })?;

        Ok(())
    }

    pub async fn fetch_product(&self, id: ProductId) -> Result<Option<Product>, StoreError> {
        let row = sqlx::query(&format!("{PRODUCT_COLUMNS} WHERE id = $1"))
            .bind(id.0.as_uuid())
            .fetch_optional(&*self.pool)
            .await
            .map_err(|e| map_sqlx_error("fetch_product", e))?;

        row.map(|r| product_from_row(&r)).transpose()
    }

    pub async fn fetch_order(&self, id: OrderId) -> Result<Option<Order>, StoreError> {
        let row = sqlx::query(&format!("{ORDER_COLUMNS} WHERE id = $1"))
            .bind(id.0.as_uuid())
            .fetch_optional(&*self.pool)
            .await
            .map_err(|e| map_sqlx_error("fetch_order", e))?;

        row.map(|r| order_from_row(&r)).transpose()
    }

    pub async fn fetch_order_items(&self, id: OrderId) -> Result<Vec<OrderItem>, StoreError> {
        let rows = sqlx::query(
            "SELECT order_id, product_id, quantity, unit_price, subtotal \
             FROM order_items WHERE order_id = $1",
        )
        .bind(id.0.as_uuid())
        .fetch_all(&*self.pool)
        .await
        .map_err(|e| map_sqlx_error("fetch_order_items", e))?;

        rows.iter().map(item_from_row).collect()
    }

    pub async fn fetch_product_movements(
        &self,
        id: ProductId,
    ) -> Result<Vec<InventoryMovement>, StoreError> {
        let rows = sqlx::query(&format!(
            "{MOVEMENT_COLUMNS} WHERE product_id = $1 ORDER BY created_at ASC, id ASC"
        ))
        .bind(id.0.as_uuid())
        .fetch_all(&*self.pool)
        .await
        .map_err(|e| map_sqlx_error("fetch_product_movements", e))?;

        rows.iter().map(movement_from_row).collect()
    }
}

/// A unit of work over one `sqlx::Transaction`.
pub struct PostgresTx {
    tx: Transaction<'static, Postgres>,
    handle: tokio::runtime::Handle,
}

impl StoreTx for PostgresTx {
    fn product(&mut self, id: ProductId) -> Result<Product, StoreError> {
        let handle = self.handle.clone();
        let row = handle
            .block_on(
                sqlx::query(&format!("{PRODUCT_COLUMNS} WHERE id = $1"))
                    .bind(id.0.as_uuid())
                    .fetch_optional(&mut *self.tx),
            )
            .map_err(|e| map_sqlx_error("tx_product", e))?;

        match row {
            Some(row) => product_from_row(&row),
            None => Err(StoreError::ProductNotFound(id)),
        }
    }

    fn order(&mut self, id: OrderId) -> Result<Option<Order>, StoreError> {
        let handle = self.handle.clone();
        let row = handle
            .block_on(
                sqlx::query(&format!("{ORDER_COLUMNS} WHERE id = $1"))
                    .bind(id.0.as_uuid())
                    .fetch_optional(&mut *self.tx),
            )
            .map_err(|e| map_sqlx_error("tx_order", e))?;

        row.map(|r| order_from_row(&r)).transpose()
    }

    fn order_items(&mut self, id: OrderId) -> Result<Vec<OrderItem>, StoreError> {
        let handle = self.handle.clone();
        let rows = handle
            .block_on(
                sqlx::query(
                    "SELECT order_id, product_id, quantity, unit_price, subtotal \
                     FROM order_items WHERE order_id = $1",
                )
                .bind(id.0.as_uuid())
                .fetch_all(&mut *self.tx),
            )
            .map_err(|e| map_sqlx_error("tx_order_items", e))?;

        rows.iter().map(item_from_row).collect()
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

        let handle = self.handle.clone();
        let row = handle
            .block_on(
                sqlx::query(
                    r#"
                    UPDATE products
                    SET stock_quantity = stock_quantity - $2, updated_at = $3
                    WHERE id = $1 AND stock_quantity >= $2
                    RETURNING stock_quantity
                    "#,
                )
                .bind(id.0.as_uuid())
                .bind(quantity)
                .bind(now)
                .fetch_optional(&mut *self.tx),
            )
            .map_err(|e| map_sqlx_error("reserve_stock", e))?;

        match row {
            Some(row) => {
                let new: i64 = row
                    .try_get("stock_quantity")
                    .map_err(|e| StoreError::InvalidRecord(e.to_string()))?;
                Ok(StockChange {
                    product_id: id,
                    previous: new + quantity,
                    new,
                })
            }
            // The conditional update matched nothing; read once to tell
            // "insufficient" apart from "no such product" for the error.
            None => {
                let available = handle
                    .block_on(
                        sqlx::query("SELECT stock_quantity FROM products WHERE id = $1")
                            .bind(id.0.as_uuid())
                            .fetch_optional(&mut *self.tx),
                    )
                    .map_err(|e| map_sqlx_error("reserve_stock_available", e))?
                    .map(|r| r.try_get::<i64, _>("stock_quantity"))
                    .transpose()
                    .map_err(|e| StoreError::InvalidRecord(e.to_string()))?;

                match available {
                    Some(available) => Err(StoreError::InsufficientStock {
                        product_id: id,
                        requested: quantity,
                        available,
                    }),
                    None => Err(StoreError::ProductNotFound(id)),
                }
            }
        }
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

        let handle = self.handle.clone();
        let row = handle
            .block_on(
                sqlx::query(
                    r#"
                    UPDATE products
                    SET stock_quantity = stock_quantity + $2, updated_at = $3
                    WHERE id = $1
                    RETURNING stock_quantity
                    "#,
                )
                .bind(id.0.as_uuid())
                .bind(quantity)
                .bind(now)
                .fetch_optional(&mut *self.tx),
            )
            .map_err(|e| map_sqlx_error("release_stock", e))?;

        match row {
            Some(row) => {
                let new: i64 = row
                    .try_get("stock_quantity")
                    .map_err(|e| StoreError::InvalidRecord(e.to_string()))?;
                Ok(StockChange {
                    product_id: id,
                    previous: new - quantity,
                    new,
                })
            }
            None => Err(StoreError::ProductNotFound(id)),
        }
    }

    fn adjust_stock(
        &mut self,
        id: ProductId,
        delta: i64,
        now: DateTime<Utc>,
    ) -> Result<StockChange, StoreError> {
        let handle = self.handle.clone();
        let row = handle
            .block_on(
                sqlx::query(
                    r#"
                    UPDATE products p
                    SET stock_quantity = GREATEST(p.stock_quantity + $2, 0), updated_at = $3
                    FROM (
                        SELECT id, stock_quantity AS previous_stock
                        FROM products WHERE id = $1 FOR UPDATE
                    ) prev
                    WHERE p.id = prev.id
                    RETURNING prev.previous_stock, p.stock_quantity
                    "#,
                )
                .bind(id.0.as_uuid())
                .bind(delta)
                .bind(now)
                .fetch_optional(&mut *self.tx),
            )
            .map_err(|e| map_sqlx_error("adjust_stock", e))?;

        match row {
            Some(row) => {
                let previous: i64 = row
                    .try_get("previous_stock")
                    .map_err(|e| StoreError::InvalidRecord(e.to_string()))?;
                let new: i64 = row
                    .try_get("stock_quantity")
                    .map_err(|e| StoreError::InvalidRecord(e.to_string()))?;
                Ok(StockChange {
                    product_id: id,
                    previous,
                    new,
                })
            }
            None => Err(StoreError::ProductNotFound(id)),
        }
    }

    fn insert_order(&mut self, order: &Order, items: &[OrderItem]) -> Result<(), StoreError> {
        let handle = self.handle.clone();

        handle
            .block_on(
                sqlx::query(
                    r#"
                    INSERT INTO orders (
                        id, order_number, customer_id, status,
                        subtotal, shipping_fee, tax_amount, total_amount,
                        shipping_address, payment_status, created_at, updated_at
                    )
                    VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12)
                    "#,
                )
                .bind(order.id.0.as_uuid())
                .bind(&order.order_number)
                .bind(order.customer_id.as_uuid())
                .bind(order.status.as_str())
                .bind(order.subtotal)
                .bind(order.shipping_fee)
                .bind(order.tax_amount)
                .bind(order.total_amount)
                .bind(&order.shipping_address)
                .bind(order.payment_status.as_str())
                .bind(order.created_at)
                .bind(order.updated_at)
                .execute(&mut *self.tx),
            )
            .map_err(|e| {
                if is_unique_violation(&e) {
                    StoreError::DuplicateOrder(order.id)
                } else {
                    map_sqlx_error("insert_order", e)
                }
            })?;

        for item in items {
            handle
                .block_on(
                    sqlx::query(
                        r#"
                        INSERT INTO order_items (order_id, product_id, quantity, unit_price, subtotal)
                        VALUES ($1, $2, $3, $4, $5)
                        "#,
                    )
                    .bind(item.order_id.0.as_uuid())
                    .bind(item.product_id.0.as_uuid())
                    .bind(item.quantity)
                    .bind(item.unit_price)
                    .bind(item.subtotal)
                    .execute(&mut *self.tx),
                )
                .map_err(|e| map_sqlx_error("insert_order_item", e))?;
        }

        Ok(())
    }

    fn set_order_status(
        &mut self,
        id: OrderId,
        status: OrderStatus,
        updated_at: DateTime<Utc>,
    ) -> Result<(), StoreError> {
        let handle = self.handle.clone();
        let result = handle
            .block_on(
                sqlx::query("UPDATE orders SET status = $2, updated_at = $3 WHERE id = $1")
                    .bind(id.0.as_uuid())
                    .bind(status.as_str())
                    .bind(updated_at)
                    .execute(&mut *self.tx),
            )
            .map_err(|e| map_sqlx_error("set_order_status", e))?;

        if result.rows_affected() == 0 {
            return Err(StoreError::OrderNotFound(id));
        }
        Ok(())
    }

    fn append_movement(&mut self, movement: &InventoryMovement) -> Result<(), StoreError> {
        let handle = self.handle.clone();
        handle
            .block_on(
                sqlx::query(
                    r#"
                    INSERT INTO inventory_movements (
                        id, product_id, movement_type, quantity,
                        reference_type, reference_id, previous_stock, new_stock,
                        reason, created_by, created_at
                    )
                    VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11)
                    "#,
                )
                .bind(movement.id.0.as_uuid())
                .bind(movement.product_id.0.as_uuid())
                .bind(movement.movement_type.as_str())
                .bind(movement.quantity)
                .bind(movement.reference.kind())
                .bind(movement.reference.order_id().map(|id| *id.0.as_uuid()))
                .bind(movement.previous_stock)
                .bind(movement.new_stock)
                .bind(movement.reason.as_deref())
                .bind(movement.created_by.as_uuid())
                .bind(movement.created_at)
                .execute(&mut *self.tx),
            )
            .map_err(|e| map_sqlx_error("append_movement", e))?;

        Ok(())
    }

    fn commit(self) -> Result<(), StoreError> {
        let PostgresTx { tx, handle } = self;
        handle
            .block_on(tx.commit())
            .map_err(|e| map_sqlx_error("commit", e))
    }
}

impl Store for PostgresStore {
    type Tx<'a>
        = PostgresTx
    where
        Self: 'a;

    fn begin(&self) -> Result<PostgresTx, StoreError> {
        let handle = runtime_handle()?;
        let tx = handle
            .block_on(self.pool.begin())
            .map_err(|e| map_sqlx_error("begin", e))?;
        Ok(PostgresTx { tx, handle })
    }

    fn insert_product(&self, product: Product) -> Result<(), StoreError> {
        runtime_handle()?.block_on(self.insert_product_async(product))
    }

    fn get_product(&self, id: ProductId) -> Result<Option<Product>, StoreError> {
        runtime_handle()?.block_on(self.fetch_product(id))
    }

    fn get_order(&self, id: OrderId) -> Result<Option<Order>, StoreError> {
        runtime_handle()?.block_on(self.fetch_order(id))
    }

    fn get_order_items(&self, id: OrderId) -> Result<Vec<OrderItem>, StoreError> {
        runtime_handle()?.block_on(self.fetch_order_items(id))
    }

    fn product_movements(&self, id: ProductId) -> Result<Vec<InventoryMovement>, StoreError> {
        runtime_handle()?.block_on(self.fetch_product_movements(id))
    }
}

#[async_trait::async_trait]
impl MovementQuery for PostgresStore {
    #[instrument(skip(self), err)]
    async fn query_movements(
        &self,
        filter: MovementFilter,
        pagination: Pagination,
    ) -> Result<MovementQueryResult, StoreError> {
        let product_param: Option<uuid::Uuid> = filter.product_id.map(|id| *id.0.as_uuid());
        let type_param: Option<&str> = filter.movement_type.map(MovementType::as_str);

        let count_row = sqlx::query(
            r#"
            SELECT COUNT(*) AS total
            FROM inventory_movements
            WHERE ($1::uuid IS NULL OR product_id = $1)
                AND ($2::text IS NULL OR movement_type = $2)
                AND ($3::timestamptz IS NULL OR created_at >= $3)
                AND ($4::timestamptz IS NULL OR created_at <= $4)
            "#,
        )
        .bind(product_param)
        .bind(type_param)
        .bind(filter.created_after)
        .bind(filter.created_before)
        .fetch_one(&*self.pool)
        .await
        .map_err(|e| map_sqlx_error("count_movements", e))?;

        let total: i64 = count_row
            .try_get("total")
            .map_err(|e| StoreError::InvalidRecord(e.to_string()))?;

        let rows = sqlx::query(&format!(
            r#"
            {MOVEMENT_COLUMNS}
            WHERE ($1::uuid IS NULL OR product_id = $1)
                AND ($2::text IS NULL OR movement_type = $2)
                AND ($3::timestamptz IS NULL OR created_at >= $3)
                AND ($4::timestamptz IS NULL OR created_at <= $4)
            ORDER BY created_at DESC, id DESC
            LIMIT $5 OFFSET $6
            "#
        ))
        .bind(product_param)
        .bind(type_param)
        .bind(filter.created_after)
        .bind(filter.created_before)
        .bind(i64::from(pagination.limit))
        .bind(i64::from(pagination.offset))
        .fetch_all(&*self.pool)
        .await
        .map_err(|e| map_sqlx_error("query_movements", e))?;

        let movements = rows
            .iter()
            .map(movement_from_row)
            .collect::<Result<Vec<_>, _>>()?;

        let has_more = total as u64 > u64::from(pagination.offset) + u64::from(pagination.limit);

        Ok(MovementQueryResult {
            movements,
            total: total as u64,
            pagination,
            has_more,
        })
    }
}

const PRODUCT_COLUMNS: &str = "SELECT id, sku, name, price, stock_quantity, \
    minimum_stock, maximum_stock, is_active, created_at, updated_at FROM products";

const ORDER_COLUMNS: &str = "SELECT id, order_number, customer_id, status, subtotal, \
    shipping_fee, tax_amount, total_amount, shipping_address, payment_status, \
    created_at, updated_at FROM orders";

const MOVEMENT_COLUMNS: &str = "SELECT id, product_id, movement_type, quantity, \
    reference_type, reference_id, previous_stock, new_stock, reason, created_by, \
    created_at FROM inventory_movements";

fn runtime_handle() -> Result<tokio::runtime::Handle, StoreError> {
    tokio::runtime::Handle::try_current().map_err(|_| {
        StoreError::Transaction(
            "PostgresStore requires an async runtime (tokio); call from within a runtime context"
                .to_string(),
        )
    })
}

/// Map SQLx errors to StoreError.
fn map_sqlx_error(operation: &str, err: sqlx::Error) -> StoreError {
    match err {
        sqlx::Error::Database(db_err) => StoreError::Transaction(format!(
            "database error in {}: {}",
            operation,
            db_err.message()
        )),
        sqlx::Error::PoolClosed => {
            StoreError::Transaction(format!("connection pool closed in {operation}"))
        }
        other => StoreError::Transaction(format!("sqlx error in {operation}: {other}")),
    }
}

/// Check if an error is a unique constraint violation (PostgreSQL `23505`).
fn is_unique_violation(err: &sqlx::Error) -> bool {
    if let sqlx::Error::Database(db_err) = err {
        if let Some(code) = db_err.code() {
            return code.as_ref() == "23505";
        }
    }
    false
}

// SQLx row types

#[derive(Debug)]
struct ProductRow {
    id: uuid::Uuid,
    sku: String,
    name: String,
    price: Decimal,
    stock_quantity: i64,
    minimum_stock: i64,
    maximum_stock: i64,
    is_active: bool,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl<'r> FromRow<'r, sqlx::postgres::PgRow> for ProductRow {
    fn from_row(row: &'r sqlx::postgres::PgRow) -> Result<Self, sqlx::Error> {
        Ok(ProductRow {
            id: row.try_get("id")?,
            sku: row.try_get("sku")?,
            name: row.try_get("name")?,
            price: row.try_get("price")?,
            stock_quantity: row.try_get("stock_quantity")?,
            minimum_stock: row.try_get("minimum_stock")?,
            maximum_stock: row.try_get("maximum_stock")?,
            is_active: row.try_get("is_active")?,
            created_at: row.try_get("created_at")?,
            updated_at: row.try_get("updated_at")?,
        })
    }
}

fn product_from_row(row: &sqlx::postgres::PgRow) -> Result<Product, StoreError> {
    let row = ProductRow::from_row(row).map_err(|e| StoreError::InvalidRecord(e.to_string()))?;
    Ok(Product {
        id: ProductId::new(EntityId::from_uuid(row.id)),
        sku: row.sku,
        name: row.name,
        price: row.price,
        stock_quantity: row.stock_quantity,
        minimum_stock: row.minimum_stock,
        maximum_stock: row.maximum_stock,
        is_active: row.is_active,
        created_at: row.created_at,
        updated_at: row.updated_at,
    })
}

#[derive(Debug)]
struct OrderRow {
    id: uuid::Uuid,
    order_number: String,
    customer_id: uuid::Uuid,
    status: String,
    subtotal: Decimal,
    shipping_fee: Decimal,
    tax_amount: Decimal,
    total_amount: Decimal,
    shipping_address: String,
    payment_status: String,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl<'r> FromRow<'r, sqlx::postgres::PgRow> for OrderRow {
    fn from_row(row: &'r sqlx::postgres::PgRow) -> Result<Self, sqlx::Error> {
        Ok(OrderRow {
            id: row.try_get("id")?,
            order_number: row.try_get("order_number")?,
            customer_id: row.try_get("customer_id")?,
            status: row.try_get("status")?,
            subtotal: row.try_get("subtotal")?,
            shipping_fee: row.try_get("shipping_fee")?,
            tax_amount: row.try_get("tax_amount")?,
            total_amount: row.try_get("total_amount")?,
            shipping_address: row.try_get("shipping_address")?,
            payment_status: row.try_get("payment_status")?,
            created_at: row.try_get("created_at")?,
            updated_at: row.try_get("updated_at")?,
        })
    }
}

fn order_from_row(row: &sqlx::postgres::PgRow) -> Result<Order, StoreError> {
    let row = OrderRow::from_row(row).map_err(|e| StoreError::InvalidRecord(e.to_string()))?;
    let status: OrderStatus = row
        .status
        .parse()
        .map_err(|e| StoreError::InvalidRecord(format!("{e}")))?;
    let payment_status: PaymentStatus = row
        .payment_status
        .parse()
        .map_err(|e| StoreError::InvalidRecord(format!("{e}")))?;

    Ok(Order {
        id: OrderId::new(EntityId::from_uuid(row.id)),
        order_number: row.order_number,
        customer_id: stockline_core::CustomerId::from_uuid(row.customer_id),
        status,
        subtotal: row.subtotal,
        shipping_fee: row.shipping_fee,
        tax_amount: row.tax_amount,
        total_amount: row.total_amount,
        shipping_address: row.shipping_address,
        payment_status,
        created_at: row.created_at,
        updated_at: row.updated_at,
    })
}

fn item_from_row(row: &sqlx::postgres::PgRow) -> Result<OrderItem, StoreError> {
    let order_id: uuid::Uuid = row
        .try_get("order_id")
        .map_err(|e| StoreError::InvalidRecord(e.to_string()))?;
    let product_id: uuid::Uuid = row
        .try_get("product_id")
        .map_err(|e| StoreError::InvalidRecord(e.to_string()))?;
    let quantity: i64 = row
        .try_get("quantity")
        .map_err(|e| StoreError::InvalidRecord(e.to_string()))?;
    let unit_price: Decimal = row
        .try_get("unit_price")
        .map_err(|e| StoreError::InvalidRecord(e.to_string()))?;
    let subtotal: Decimal = row
        .try_get("subtotal")
        .map_err(|e| StoreError::InvalidRecord(e.to_string()))?;

    Ok(OrderItem {
        order_id: OrderId::new(EntityId::from_uuid(order_id)),
        product_id: ProductId::new(EntityId::from_uuid(product_id)),
        quantity,
        unit_price,
        subtotal,
    })
}

#[derive(Debug)]
struct MovementRow {
    id: uuid::Uuid,
    product_id: uuid::Uuid,
    movement_type: String,
    quantity: i64,
    reference_type: String,
    reference_id: Option<uuid::Uuid>,
    previous_stock: i64,
    new_stock: i64,
    reason: Option<String>,
    created_by: uuid::Uuid,
    created_at: DateTime<Utc>,
}

impl<'r> FromRow<'r, sqlx::postgres::PgRow> for MovementRow {
    fn from_row(row: &'r sqlx::postgres::PgRow) -> Result<Self, sqlx::Error> {
        Ok(MovementRow {
            id: row.try_get("id")?,
            product_id: row.try_get("product_id")?,
            movement_type: row.try_get("movement_type")?,
            quantity: row.try_get("quantity")?,
            reference_type: row.try_get("reference_type")?,
            reference_id: row.try_get("reference_id")?,
            previous_stock: row.try_get("previous_stock")?,
            new_stock: row.try_get("new_stock")?,
            reason: row.try_get("reason")?,
            created_by: row.try_get("created_by")?,
            created_at: row.try_get("created_at")?,
        })
    }
}

fn movement_from_row(row: &sqlx::postgres::PgRow) -> Result<InventoryMovement, StoreError> {
    let row = MovementRow::from_row(row).map_err(|e| StoreError::InvalidRecord(e.to_string()))?;
    let movement_type: MovementType = row
        .movement_type
        .parse()
        .map_err(|e| StoreError::InvalidRecord(format!("{e}")))?;
    let reference = MovementReference::from_parts(&row.reference_type, row.reference_id)
        .map_err(|e| StoreError::InvalidRecord(format!("{e}")))?;

    InventoryMovement::new(
        MovementId::new(EntityId::from_uuid(row.id)),
        ProductId::new(EntityId::from_uuid(row.product_id)),
        movement_type,
        row.quantity,
        reference,
        row.previous_stock,
        row.new_stock,
        row.reason,
        UserId::from_uuid(row.created_by),
        row.created_at,
    )
    .map_err(|e| StoreError::InvalidRecord(format!("{e}")))
}
