//! Movement query interface for reporting collaborators.
//!
//! Read-only, filterable, always newest-first, paginated by default.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use stockline_catalog::ProductId;
use stockline_ledger::{InventoryMovement, MovementType};

use super::r#trait::StoreError;

/// Pagination parameters for movement queries.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct Pagination {
    /// Maximum number of movements to return.
    pub limit: u32,
    /// Offset for pagination (0-based).
    pub offset: u32,
}

impl Default for Pagination {
    fn default() -> Self {
        Self {
            limit: 50,
            offset: 0,
        }
    }
}

impl Pagination {
    pub fn new(limit: Option<u32>, offset: Option<u32>) -> Self {
        Self {
            limit: limit.unwrap_or(50).min(1000),
            offset: offset.unwrap_or(0),
        }
    }
}

/// Filter criteria for movement queries. All fields optional.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct MovementFilter {
    pub product_id: Option<ProductId>,
    pub movement_type: Option<MovementType>,
    pub created_after: Option<DateTime<Utc>>,
    pub created_before: Option<DateTime<Utc>>,
}

/// Paginated movement query result.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MovementQueryResult {
    /// Movements matching the filter, newest-first.
    pub movements: Vec<InventoryMovement>,
    /// Total matches across all pages.
    pub total: u64,
    pub pagination: Pagination,
    pub has_more: bool,
}

/// Async query interface over the movement ledger.
#[async_trait::async_trait]
pub trait MovementQuery: Send + Sync {
    /// Query movements with optional filters and pagination.
    ///
    /// Ordered by `created_at` descending; ties broken by insertion order,
    /// newest first.
    async fn query_movements(
        &self,
        filter: MovementFilter,
        pagination: Pagination,
    ) -> Result<MovementQueryResult, StoreError>;
}
