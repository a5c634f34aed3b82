use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use stockline_core::{DomainError, DomainResult, Entity, EntityId};

/// Product identifier.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ProductId(pub EntityId);

impl ProductId {
    pub fn new(id: EntityId) -> Self {
        Self(id)
    }
}

impl core::fmt::Display for ProductId {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        core::fmt::Display::fmt(&self.0, f)
    }
}

/// A stock-keeping unit in the catalog.
///
/// `stock_quantity` is written exclusively by the stock ledger; every change
/// produces exactly one inventory movement row. The catalog itself only
/// validates the record at creation and answers sellability questions.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Product {
    pub id: ProductId,
    pub sku: String,
    pub name: String,
    /// Unit sales price. Non-negative.
    pub price: Decimal,
    /// Live on-hand stock. Never negative.
    pub stock_quantity: i64,
    /// At or below this level the product counts as low on stock.
    pub minimum_stock: i64,
    /// At or above this level the product counts as overstocked.
    pub maximum_stock: i64,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Product {
    /// Validate and construct a catalog record.
    pub fn new(
        id: ProductId,
        sku: impl Into<String>,
        name: impl Into<String>,
        price: Decimal,
        initial_stock: i64,
        minimum_stock: i64,
        maximum_stock: i64,
        now: DateTime<Utc>,
    ) -> DomainResult<Self> {
        let sku = sku.into();
        let name = name.into();

        if sku.trim().is_empty() {
            return Err(DomainError::validation("sku cannot be empty"));
        }
        if name.trim().is_empty() {
            return Err(DomainError::validation("name cannot be empty"));
        }
        if price.is_sign_negative() {
            return Err(DomainError::validation("price cannot be negative"));
        }
        if initial_stock < 0 {
            return Err(DomainError::invariant("stock cannot go negative"));
        }
        if minimum_stock < 0 {
            return Err(DomainError::validation("minimum_stock cannot be negative"));
        }
        if maximum_stock <= minimum_stock {
            return Err(DomainError::validation(
                "maximum_stock must exceed minimum_stock",
            ));
        }

        Ok(Self {
            id,
            sku,
            name,
            price,
            stock_quantity: initial_stock,
            minimum_stock,
            maximum_stock,
            is_active: true,
            created_at: now,
            updated_at: now,
        })
    }

    /// Check if the product can appear on a new order.
    pub fn can_be_sold(&self) -> bool {
        self.is_active
    }
}

impl Entity for Product {
    type Id = ProductId;

    fn id(&self) -> &Self::Id {
        &self.id
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;
    use stockline_core::EntityId;

    fn test_product_id() -> ProductId {
        ProductId::new(EntityId::new())
    }

    fn test_time() -> DateTime<Utc> {
        Utc::now()
    }

    fn valid_product() -> Product {
        Product::new(
            test_product_id(),
            "SKU-001",
            "Steel Bolt M8",
            dec!(2.50),
            100,
            10,
            500,
            test_time(),
        )
        .unwrap()
    }

    #[test]
    fn valid_product_is_active_and_sellable() {
        let product = valid_product();
        assert!(product.is_active);
        assert!(product.can_be_sold());
        assert_eq!(product.stock_quantity, 100);
    }

    #[test]
    fn deactivated_product_is_not_sellable() {
        let mut product = valid_product();
        product.is_active = false;
        assert!(!product.can_be_sold());
    }

    #[test]
    fn empty_sku_is_rejected() {
        let err = Product::new(
            test_product_id(),
            "   ",
            "Steel Bolt M8",
            dec!(2.50),
            100,
            10,
            500,
            test_time(),
        )
        .unwrap_err();
        assert!(matches!(err, DomainError::Validation(_)));
    }

    #[test]
    fn negative_price_is_rejected() {
        let err = Product::new(
            test_product_id(),
            "SKU-001",
            "Steel Bolt M8",
            dec!(-0.01),
            100,
            10,
            500,
            test_time(),
        )
        .unwrap_err();
        assert!(matches!(err, DomainError::Validation(_)));
    }

    #[test]
    fn negative_initial_stock_is_rejected() {
        let err = Product::new(
            test_product_id(),
            "SKU-001",
            "Steel Bolt M8",
            dec!(2.50),
            -1,
            10,
            500,
            test_time(),
        )
        .unwrap_err();
        assert!(matches!(err, DomainError::InvariantViolation(_)));
    }

    #[test]
    fn thresholds_must_be_ordered() {
        let err = Product::new(
            test_product_id(),
            "SKU-001",
            "Steel Bolt M8",
            dec!(2.50),
            100,
            500,
            10,
            test_time(),
        )
        .unwrap_err();
        assert!(matches!(err, DomainError::Validation(_)));
    }

    mod proptest_tests {
        use super::*;
        use proptest::prelude::*;

        proptest! {
            /// Property: any product that validates has non-negative stock and
            /// ordered thresholds.
            #[test]
            fn constructed_products_respect_invariants(
                stock in 0i64..1_000_000,
                minimum in 0i64..1_000,
                span in 1i64..1_000,
            ) {
                let product = Product::new(
                    test_product_id(),
                    "SKU-P",
                    "Prop Product",
                    dec!(1.00),
                    stock,
                    minimum,
                    minimum + span,
                    test_time(),
                ).unwrap();

                prop_assert!(product.stock_quantity >= 0);
                prop_assert!(product.minimum_stock < product.maximum_stock);
            }
        }
    }
}
