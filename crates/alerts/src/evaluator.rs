use serde::{Deserialize, Serialize};

use stockline_catalog::ProductId;

/// Alert-worthy stock conditions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AlertType {
    OutOfStock,
    LowStock,
    Overstock,
}

impl AlertType {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::OutOfStock => "out_of_stock",
            Self::LowStock => "low_stock",
            Self::Overstock => "overstock",
        }
    }
}

/// Classification of a stock level against its thresholds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StockLevel {
    OutOfStock,
    LowStock,
    Overstock,
    Normal,
}

/// One alert, produced by at most one per movement.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct StockAlert {
    pub product_id: ProductId,
    pub alert_type: AlertType,
    pub current_stock: i64,
    /// The threshold that was crossed: 0, `minimum_stock`, or `maximum_stock`.
    pub threshold: i64,
}

/// Classify a stock level. Exhaustion wins over the low-stock band.
pub fn classify(stock: i64, minimum_stock: i64, maximum_stock: i64) -> StockLevel {
    if stock <= 0 {
        StockLevel::OutOfStock
    } else if stock <= minimum_stock {
        StockLevel::LowStock
    } else if stock >= maximum_stock {
        StockLevel::Overstock
    } else {
        StockLevel::Normal
    }
}

/// Evaluate a post-movement stock level; `None` means nothing to report.
///
/// Repeated low-stock states keep producing alerts; deduplication across
/// movements is the notification layer's call.
pub fn evaluate(
    product_id: ProductId,
    stock: i64,
    minimum_stock: i64,
    maximum_stock: i64,
) -> Option<StockAlert> {
    let (alert_type, threshold) = match classify(stock, minimum_stock, maximum_stock) {
        StockLevel::OutOfStock => (AlertType::OutOfStock, 0),
        StockLevel::LowStock => (AlertType::LowStock, minimum_stock),
        StockLevel::Overstock => (AlertType::Overstock, maximum_stock),
        StockLevel::Normal => return None,
    };

    Some(StockAlert {
        product_id,
        alert_type,
        current_stock: stock,
        threshold,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use stockline_core::EntityId;

    fn test_product_id() -> ProductId {
        ProductId::new(EntityId::new())
    }

    #[test]
    fn zero_stock_is_out_of_stock() {
        assert_eq!(classify(0, 5, 100), StockLevel::OutOfStock);
    }

    #[test]
    fn out_of_stock_wins_over_low_stock_band() {
        // minimum_stock 5 includes 0, but exhaustion is the stronger signal.
        let alert = evaluate(test_product_id(), 0, 5, 100).unwrap();
        assert_eq!(alert.alert_type, AlertType::OutOfStock);
        assert_eq!(alert.threshold, 0);
    }

    #[test]
    fn stock_at_minimum_is_low() {
        assert_eq!(classify(5, 5, 100), StockLevel::LowStock);
        let alert = evaluate(test_product_id(), 3, 5, 100).unwrap();
        assert_eq!(alert.alert_type, AlertType::LowStock);
        assert_eq!(alert.current_stock, 3);
        assert_eq!(alert.threshold, 5);
    }

    #[test]
    fn stock_at_maximum_is_overstock() {
        assert_eq!(classify(100, 5, 100), StockLevel::Overstock);
        let alert = evaluate(test_product_id(), 120, 5, 100).unwrap();
        assert_eq!(alert.alert_type, AlertType::Overstock);
        assert_eq!(alert.threshold, 100);
    }

    #[test]
    fn stock_between_thresholds_raises_nothing() {
        assert_eq!(classify(6, 5, 100), StockLevel::Normal);
        assert_eq!(classify(99, 5, 100), StockLevel::Normal);
        assert!(evaluate(test_product_id(), 50, 5, 100).is_none());
    }
}
