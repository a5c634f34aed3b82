use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use stockline_catalog::ProductId;
use stockline_core::{DomainError, DomainResult, EntityId, UserId};
use stockline_orders::OrderId;

/// Inventory movement identifier.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct MovementId(pub EntityId);

impl MovementId {
    pub fn new(id: EntityId) -> Self {
        Self(id)
    }
}

impl core::fmt::Display for MovementId {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        core::fmt::Display::fmt(&self.0, f)
    }
}

/// Direction of a stock change.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MovementType {
    In,
    Out,
}

impl MovementType {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::In => "in",
            Self::Out => "out",
        }
    }
}

impl core::str::FromStr for MovementType {
    type Err = DomainError;

    fn from_str(s: &str) -> DomainResult<Self> {
        match s {
            "in" => Ok(Self::In),
            "out" => Ok(Self::Out),
            other => Err(DomainError::validation(format!(
                "unknown movement type: {other}"
            ))),
        }
    }
}

/// What caused a movement.
///
/// A closed variant set instead of a loose `reference_type` string, so every
/// consumer handles all causes exhaustively at compile time.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", content = "order_id", rename_all = "lowercase")]
pub enum MovementReference {
    /// Reservation made by a checkout.
    Order(OrderId),
    /// Reservation returned by a cancellation or rejection.
    Return(OrderId),
    /// Manual administrator correction.
    Adjustment,
}

impl MovementReference {
    /// Storage discriminant; the inverse of [`Self::from_parts`].
    pub fn kind(self) -> &'static str {
        match self {
            Self::Order(_) => "order",
            Self::Return(_) => "return",
            Self::Adjustment => "adjustment",
        }
    }

    pub fn order_id(self) -> Option<OrderId> {
        match self {
            Self::Order(id) | Self::Return(id) => Some(id),
            Self::Adjustment => None,
        }
    }

    /// Rebuild from the storage columns `(reference_type, reference_id)`.
    pub fn from_parts(kind: &str, order_id: Option<Uuid>) -> DomainResult<Self> {
        match (kind, order_id) {
            ("order", Some(id)) => Ok(Self::Order(OrderId::new(EntityId::from_uuid(id)))),
            ("return", Some(id)) => Ok(Self::Return(OrderId::new(EntityId::from_uuid(id)))),
            ("adjustment", None) => Ok(Self::Adjustment),
            (kind, id) => Err(DomainError::validation(format!(
                "invalid movement reference: kind={kind}, order_id={id:?}"
            ))),
        }
    }
}

/// One row of the append-only inventory ledger.
///
/// Never updated or deleted. `previous_stock`/`new_stock` capture the stock
/// bracket of the change, which is what makes the ledger replayable.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InventoryMovement {
    pub id: MovementId,
    pub product_id: ProductId,
    pub movement_type: MovementType,
    /// Applied quantity, always positive; direction comes from `movement_type`.
    pub quantity: i64,
    pub reference: MovementReference,
    pub previous_stock: i64,
    pub new_stock: i64,
    pub reason: Option<String>,
    pub created_by: UserId,
    pub created_at: DateTime<Utc>,
}

impl InventoryMovement {
    /// Validate and construct a ledger row.
    ///
    /// Enforces internal consistency: positive quantity, non-negative stock on
    /// both sides, and `new_stock == previous_stock ± quantity` matching the
    /// movement direction.
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        id: MovementId,
        product_id: ProductId,
        movement_type: MovementType,
        quantity: i64,
        reference: MovementReference,
        previous_stock: i64,
        new_stock: i64,
        reason: Option<String>,
        created_by: UserId,
        created_at: DateTime<Utc>,
    ) -> DomainResult<Self> {
        if quantity <= 0 {
            return Err(DomainError::validation("quantity must be positive"));
        }
        if previous_stock < 0 || new_stock < 0 {
            return Err(DomainError::invariant("stock cannot go negative"));
        }

        let expected = match movement_type {
            MovementType::In => previous_stock + quantity,
            MovementType::Out => previous_stock - quantity,
        };
        if new_stock != expected {
            return Err(DomainError::invariant(format!(
                "movement does not balance: {previous_stock} {} {quantity} != {new_stock}",
                match movement_type {
                    MovementType::In => "+",
                    MovementType::Out => "-",
                },
            )));
        }

        Ok(Self {
            id,
            product_id,
            movement_type,
            quantity,
            reference,
            previous_stock,
            new_stock,
            reason,
            created_by,
            created_at,
        })
    }

    /// Signed stock delta applied by this movement.
    pub fn delta(&self) -> i64 {
        match self.movement_type {
            MovementType::In => self.quantity,
            MovementType::Out => -self.quantity,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use stockline_core::EntityId;

    fn test_movement_id() -> MovementId {
        MovementId::new(EntityId::new())
    }

    fn test_product_id() -> ProductId {
        ProductId::new(EntityId::new())
    }

    fn test_order_id() -> OrderId {
        OrderId::new(EntityId::new())
    }

    fn out_movement(previous: i64, quantity: i64, new: i64) -> DomainResult<InventoryMovement> {
        InventoryMovement::new(
            test_movement_id(),
            test_product_id(),
            MovementType::Out,
            quantity,
            MovementReference::Order(test_order_id()),
            previous,
            new,
            None,
            UserId::new(),
            Utc::now(),
        )
    }

    #[test]
    fn balanced_out_movement_is_accepted() {
        let movement = out_movement(10, 7, 3).unwrap();
        assert_eq!(movement.delta(), -7);
    }

    #[test]
    fn unbalanced_movement_is_rejected() {
        let err = out_movement(10, 7, 4).unwrap_err();
        assert!(matches!(err, DomainError::InvariantViolation(_)));
    }

    #[test]
    fn zero_quantity_is_rejected() {
        let err = out_movement(10, 0, 10).unwrap_err();
        assert!(matches!(err, DomainError::Validation(_)));
    }

    #[test]
    fn negative_resulting_stock_is_rejected() {
        let err = out_movement(3, 7, -4).unwrap_err();
        assert!(matches!(err, DomainError::InvariantViolation(_)));
    }

    #[test]
    fn reference_round_trips_through_storage_parts() {
        let order_id = test_order_id();
        for reference in [
            MovementReference::Order(order_id),
            MovementReference::Return(order_id),
            MovementReference::Adjustment,
        ] {
            let rebuilt = MovementReference::from_parts(
                reference.kind(),
                reference.order_id().map(|id| *id.0.as_uuid()),
            )
            .unwrap();
            assert_eq!(rebuilt, reference);
        }
    }

    #[test]
    fn adjustment_with_order_id_is_rejected() {
        let err =
            MovementReference::from_parts("adjustment", Some(*test_order_id().0.as_uuid()))
                .unwrap_err();
        assert!(matches!(err, DomainError::Validation(_)));
    }

    #[test]
    fn reference_serializes_as_tagged_object() {
        let order_id = test_order_id();
        let json = serde_json::to_value(MovementReference::Return(order_id)).unwrap();
        assert_eq!(json["type"], "return");
        assert_eq!(json["order_id"], order_id.to_string());

        let json = serde_json::to_value(MovementReference::Adjustment).unwrap();
        assert_eq!(json["type"], "adjustment");
    }
}
