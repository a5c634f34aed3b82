//! Ledger audit: verify that movement history and live stock agree.
//!
//! A failure here is a data-integrity alarm requiring manual reconciliation,
//! not a runtime recovery path; callers should page an operator, not retry.

use thiserror::Error;
use tracing::error;

use stockline_catalog::ProductId;
use stockline_ledger::{ReplayError, verify_chain};

use crate::store::{Store, StoreError};

#[derive(Debug, Error)]
pub enum AuditError {
    #[error("product not found: {0}")]
    ProductNotFound(ProductId),

    #[error(transparent)]
    Replay(#[from] ReplayError),

    #[error(transparent)]
    Store(#[from] StoreError),
}

/// Replay a product's movement chain against its live `stock_quantity`.
///
/// The chain must be gapless and must land exactly on the live value; see
/// [`stockline_ledger::verify_chain`].
pub fn verify_stock_ledger<S: Store>(store: &S, product_id: ProductId) -> Result<(), AuditError> {
    let product = store
        .get_product(product_id)?
        .ok_or(AuditError::ProductNotFound(product_id))?;
    let movements = store.product_movements(product_id)?;

    if let Err(mismatch) = verify_chain(&movements, product.stock_quantity) {
        error!(
            %product_id,
            live_stock = product.stock_quantity,
            movement_count = movements.len(),
            %mismatch,
            "stock ledger integrity violation; manual reconciliation required"
        );
        return Err(mismatch.into());
    }

    Ok(())
}
