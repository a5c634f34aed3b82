use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use stockline_catalog::ProductId;
use stockline_core::{CustomerId, DomainError, DomainResult, Entity, EntityId, ValueObject};

use crate::status::OrderStatus;

/// Sales order identifier.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct OrderId(pub EntityId);

impl OrderId {
    pub fn new(id: EntityId) -> Self {
        Self(id)
    }
}

impl core::fmt::Display for OrderId {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        core::fmt::Display::fmt(&self.0, f)
    }
}

/// Payment state carried on the order record.
///
/// Payment *processing* is an external collaborator; the core only tracks the
/// reported state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PaymentStatus {
    #[default]
    Unpaid,
    Paid,
    Refunded,
}

impl PaymentStatus {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Unpaid => "unpaid",
            Self::Paid => "paid",
            Self::Refunded => "refunded",
        }
    }
}

impl core::str::FromStr for PaymentStatus {
    type Err = DomainError;

    fn from_str(s: &str) -> DomainResult<Self> {
        match s {
            "unpaid" => Ok(Self::Unpaid),
            "paid" => Ok(Self::Paid),
            "refunded" => Ok(Self::Refunded),
            other => Err(DomainError::validation(format!(
                "unknown payment status: {other}"
            ))),
        }
    }
}

/// Order line: product, quantity, unit-price snapshot.
///
/// Created atomically with its order and immutable thereafter — quantity
/// changes require cancel + re-order, so the reservation amount and the
/// snapshot can never diverge.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OrderItem {
    pub order_id: OrderId,
    pub product_id: ProductId,
    pub quantity: i64,
    /// Price at time of order.
    pub unit_price: Decimal,
    /// Always `quantity * unit_price`.
    pub subtotal: Decimal,
}

impl OrderItem {
    pub fn new(
        order_id: OrderId,
        product_id: ProductId,
        quantity: i64,
        unit_price: Decimal,
    ) -> DomainResult<Self> {
        if quantity <= 0 {
            return Err(DomainError::validation("quantity must be positive"));
        }
        if unit_price.is_sign_negative() {
            return Err(DomainError::validation("unit_price cannot be negative"));
        }

        Ok(Self {
            order_id,
            product_id,
            quantity,
            unit_price,
            subtotal: unit_price * Decimal::from(quantity),
        })
    }
}

impl ValueObject for OrderItem {}

/// A customer order.
///
/// Created by checkout in `pending`; mutated only by lifecycle transitions;
/// never deleted (cancelled orders are retained for audit).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Order {
    pub id: OrderId,
    /// Globally unique, generated at creation. See [`crate::number`].
    pub order_number: String,
    pub customer_id: CustomerId,
    pub status: OrderStatus,
    pub subtotal: Decimal,
    pub shipping_fee: Decimal,
    pub tax_amount: Decimal,
    pub total_amount: Decimal,
    pub shipping_address: String,
    pub payment_status: PaymentStatus,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Order {
    /// Validate and construct a pending order from its line items and totals.
    ///
    /// Enforces the total identity: `total_amount == subtotal + shipping_fee +
    /// tax_amount` and `subtotal == Σ item.subtotal`.
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        id: OrderId,
        order_number: impl Into<String>,
        customer_id: CustomerId,
        items: &[OrderItem],
        subtotal: Decimal,
        shipping_fee: Decimal,
        tax_amount: Decimal,
        total_amount: Decimal,
        shipping_address: impl Into<String>,
        now: DateTime<Utc>,
    ) -> DomainResult<Self> {
        let order_number = order_number.into();
        let shipping_address = shipping_address.into();

        if items.is_empty() {
            return Err(DomainError::validation("order must have line items"));
        }
        if order_number.trim().is_empty() {
            return Err(DomainError::validation("order_number cannot be empty"));
        }
        if shipping_address.trim().is_empty() {
            return Err(DomainError::validation("shipping_address cannot be empty"));
        }
        if let Some(item) = items.iter().find(|i| i.order_id != id) {
            return Err(DomainError::invariant(format!(
                "line item belongs to order {}",
                item.order_id
            )));
        }
        if shipping_fee.is_sign_negative() || tax_amount.is_sign_negative() {
            return Err(DomainError::validation("amounts cannot be negative"));
        }

        let item_sum: Decimal = items.iter().map(|i| i.subtotal).sum();
        if subtotal != item_sum {
            return Err(DomainError::invariant(format!(
                "subtotal {subtotal} does not match line items {item_sum}"
            )));
        }
        if total_amount != subtotal + shipping_fee + tax_amount {
            return Err(DomainError::invariant(
                "total_amount must equal subtotal + shipping_fee + tax_amount",
            ));
        }

        Ok(Self {
            id,
            order_number,
            customer_id,
            status: OrderStatus::Pending,
            subtotal,
            shipping_fee,
            tax_amount,
            total_amount,
            shipping_address,
            payment_status: PaymentStatus::default(),
            created_at: now,
            updated_at: now,
        })
    }
}

impl Entity for Order {
    type Id = OrderId;

    fn id(&self) -> &Self::Id {
        &self.id
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;
    use stockline_core::EntityId;

    fn test_order_id() -> OrderId {
        OrderId::new(EntityId::new())
    }

    fn test_product_id() -> ProductId {
        ProductId::new(EntityId::new())
    }

    fn test_customer_id() -> CustomerId {
        CustomerId::new()
    }

    fn test_time() -> DateTime<Utc> {
        Utc::now()
    }

    fn two_items(order_id: OrderId) -> Vec<OrderItem> {
        vec![
            OrderItem::new(order_id, test_product_id(), 2, dec!(100.00)).unwrap(),
            OrderItem::new(order_id, test_product_id(), 1, dec!(50.00)).unwrap(),
        ]
    }

    #[test]
    fn item_subtotal_is_quantity_times_unit_price() {
        let item = OrderItem::new(test_order_id(), test_product_id(), 3, dec!(2.50)).unwrap();
        assert_eq!(item.subtotal, dec!(7.50));
    }

    #[test]
    fn non_positive_quantity_is_rejected() {
        for quantity in [0, -1] {
            let err = OrderItem::new(test_order_id(), test_product_id(), quantity, dec!(1.00))
                .unwrap_err();
            assert!(matches!(err, DomainError::Validation(_)));
        }
    }

    #[test]
    fn new_order_starts_pending_and_unpaid() {
        let order_id = test_order_id();
        let items = two_items(order_id);
        let order = Order::new(
            order_id,
            "SO-20260806-abcd1234",
            test_customer_id(),
            &items,
            dec!(250.00),
            dec!(250.00),
            dec!(12.50),
            dec!(512.50),
            "12 Wharf Road",
            test_time(),
        )
        .unwrap();

        assert_eq!(order.status, OrderStatus::Pending);
        assert_eq!(order.payment_status, PaymentStatus::Unpaid);
        assert_eq!(order.total_amount, dec!(512.50));
    }

    #[test]
    fn subtotal_must_match_line_items() {
        let order_id = test_order_id();
        let items = two_items(order_id);
        let err = Order::new(
            order_id,
            "SO-20260806-abcd1234",
            test_customer_id(),
            &items,
            dec!(240.00),
            dec!(250.00),
            dec!(12.50),
            dec!(502.50),
            "12 Wharf Road",
            test_time(),
        )
        .unwrap_err();
        assert!(matches!(err, DomainError::InvariantViolation(_)));
    }

    #[test]
    fn total_identity_is_enforced() {
        let order_id = test_order_id();
        let items = two_items(order_id);
        let err = Order::new(
            order_id,
            "SO-20260806-abcd1234",
            test_customer_id(),
            &items,
            dec!(250.00),
            dec!(250.00),
            dec!(12.50),
            dec!(500.00),
            "12 Wharf Road",
            test_time(),
        )
        .unwrap_err();
        assert!(matches!(err, DomainError::InvariantViolation(_)));
    }

    #[test]
    fn order_without_items_is_rejected() {
        let err = Order::new(
            test_order_id(),
            "SO-20260806-abcd1234",
            test_customer_id(),
            &[],
            dec!(0.00),
            dec!(0.00),
            dec!(0.00),
            dec!(0.00),
            "12 Wharf Road",
            test_time(),
        )
        .unwrap_err();
        assert!(matches!(err, DomainError::Validation(_)));
    }

    #[test]
    fn foreign_line_items_are_rejected() {
        let order_id = test_order_id();
        let foreign = two_items(test_order_id());
        let err = Order::new(
            order_id,
            "SO-20260806-abcd1234",
            test_customer_id(),
            &foreign,
            dec!(250.00),
            dec!(250.00),
            dec!(12.50),
            dec!(512.50),
            "12 Wharf Road",
            test_time(),
        )
        .unwrap_err();
        assert!(matches!(err, DomainError::InvariantViolation(_)));
    }

    mod proptest_tests {
        use super::*;
        use proptest::prelude::*;

        proptest! {
            /// Property: an order built from any set of valid line items with
            /// consistent totals upholds the total identity.
            #[test]
            fn constructed_orders_uphold_total_identity(
                lines in prop::collection::vec((1i64..50, 1i64..100_000), 1..8),
                shipping_cents in 0i64..100_000,
                tax_cents in 0i64..100_000,
            ) {
                let order_id = test_order_id();
                let items: Vec<OrderItem> = lines
                    .iter()
                    .map(|&(quantity, price_cents)| {
                        OrderItem::new(
                            order_id,
                            test_product_id(),
                            quantity,
                            Decimal::new(price_cents, 2),
                        )
                        .unwrap()
                    })
                    .collect();

                let subtotal: Decimal = items.iter().map(|i| i.subtotal).sum();
                let shipping = Decimal::new(shipping_cents, 2);
                let tax = Decimal::new(tax_cents, 2);

                let order = Order::new(
                    order_id,
                    "SO-20260806-abcd1234",
                    test_customer_id(),
                    &items,
                    subtotal,
                    shipping,
                    tax,
                    subtotal + shipping + tax,
                    "12 Wharf Road",
                    test_time(),
                ).unwrap();

                prop_assert_eq!(
                    order.total_amount,
                    order.subtotal + order.shipping_fee + order.tax_amount
                );
                let item_sum: Decimal = items.iter().map(|i| i.subtotal).sum();
                prop_assert_eq!(order.subtotal, item_sum);
            }
        }
    }
}
