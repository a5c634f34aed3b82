use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use stockline_alerts::AlertType;
use stockline_catalog::ProductId;
use stockline_orders::{OrderId, OrderStatus};

use crate::event::Event;

/// An order moved through its lifecycle.
///
/// `old_status` is `None` for the creation transition (checkout → pending).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OrderStatusChanged {
    pub order_id: OrderId,
    pub old_status: Option<OrderStatus>,
    pub new_status: OrderStatus,
    pub occurred_at: DateTime<Utc>,
}

/// A movement left a product outside its normal stock band.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StockAlertRaised {
    pub product_id: ProductId,
    pub alert_type: AlertType,
    pub current_stock: i64,
    pub threshold: i64,
    pub occurred_at: DateTime<Utc>,
}

/// Everything the core hands to the notification gateway.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "event", rename_all = "snake_case")]
pub enum NotificationEvent {
    OrderStatusChanged(OrderStatusChanged),
    StockAlert(StockAlertRaised),
}

impl Event for NotificationEvent {
    fn event_type(&self) -> &'static str {
        match self {
            Self::OrderStatusChanged(_) => "order.status_changed",
            Self::StockAlert(_) => "inventory.stock_alert",
        }
    }

    fn occurred_at(&self) -> DateTime<Utc> {
        match self {
            Self::OrderStatusChanged(e) => e.occurred_at,
            Self::StockAlert(e) => e.occurred_at,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use stockline_core::EntityId;

    #[test]
    fn event_types_are_stable() {
        let changed = NotificationEvent::OrderStatusChanged(OrderStatusChanged {
            order_id: OrderId::new(EntityId::new()),
            old_status: Some(OrderStatus::Pending),
            new_status: OrderStatus::Confirmed,
            occurred_at: Utc::now(),
        });
        assert_eq!(changed.event_type(), "order.status_changed");

        let alert = NotificationEvent::StockAlert(StockAlertRaised {
            product_id: ProductId::new(EntityId::new()),
            alert_type: AlertType::LowStock,
            current_stock: 3,
            threshold: 5,
            occurred_at: Utc::now(),
        });
        assert_eq!(alert.event_type(), "inventory.stock_alert");
    }
}
