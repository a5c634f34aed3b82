use rust_decimal::{Decimal, RoundingStrategy};
use serde::{Deserialize, Serialize};

use stockline_catalog::ProductId;
use stockline_core::{DomainError, DomainResult, ValueObject};

/// One priced line of a checkout request: quantity at a unit-price snapshot.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct LineInput {
    pub product_id: ProductId,
    pub quantity: i64,
    pub unit_price: Decimal,
}

/// Order totals, each rounded to two decimal places (round half-up).
///
/// `total_amount` is the sum of the other three *after* rounding, so the
/// total identity holds exactly on the persisted order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct OrderTotals {
    pub subtotal: Decimal,
    pub tax_amount: Decimal,
    pub shipping_fee: Decimal,
    pub total_amount: Decimal,
}

impl ValueObject for OrderTotals {}

/// Flat pricing parameters, injected once at process start.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PricingConfig {
    /// Fraction of the subtotal, e.g. `0.05` for 5%.
    pub tax_rate: Decimal,
    /// Flat fee per order; zero for free shipping.
    pub shipping_fee: Decimal,
}

impl Default for PricingConfig {
    fn default() -> Self {
        Self {
            tax_rate: Decimal::new(5, 2),
            shipping_fee: Decimal::ZERO,
        }
    }
}

/// Round half-up to two decimal places.
fn round_money(amount: Decimal) -> Decimal {
    amount.round_dp_with_strategy(2, RoundingStrategy::MidpointAwayFromZero)
}

/// Compute order totals from line items, a flat shipping fee, and a tax rate.
///
/// Pure function: validation then arithmetic, nothing else. Rejects empty
/// input and non-positive quantities before any computation.
pub fn price_order(
    lines: &[LineInput],
    shipping_fee: Decimal,
    tax_rate: Decimal,
) -> DomainResult<OrderTotals> {
    if lines.is_empty() {
        return Err(DomainError::validation("cannot price an empty order"));
    }
    if shipping_fee.is_sign_negative() {
        return Err(DomainError::validation("shipping_fee cannot be negative"));
    }
    if tax_rate.is_sign_negative() {
        return Err(DomainError::validation("tax_rate cannot be negative"));
    }

    let mut subtotal = Decimal::ZERO;
    for line in lines {
        if line.quantity <= 0 {
            return Err(DomainError::validation("quantity must be positive"));
        }
        if line.unit_price.is_sign_negative() {
            return Err(DomainError::validation("unit_price cannot be negative"));
        }
        subtotal += line.unit_price * Decimal::from(line.quantity);
    }

    let subtotal = round_money(subtotal);
    let tax_amount = round_money(subtotal * tax_rate);
    let shipping_fee = round_money(shipping_fee);

    Ok(OrderTotals {
        subtotal,
        tax_amount,
        shipping_fee,
        total_amount: subtotal + tax_amount + shipping_fee,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;
    use stockline_core::EntityId;

    fn line(quantity: i64, unit_price: Decimal) -> LineInput {
        LineInput {
            product_id: ProductId::new(EntityId::new()),
            quantity,
            unit_price,
        }
    }

    #[test]
    fn two_line_order_with_flat_shipping() {
        // [(2 x 100.00), (1 x 50.00)], 5% tax, 250.00 shipping.
        let totals = price_order(
            &[line(2, dec!(100.00)), line(1, dec!(50.00))],
            dec!(250.00),
            dec!(0.05),
        )
        .unwrap();

        assert_eq!(totals.subtotal, dec!(250.00));
        assert_eq!(totals.tax_amount, dec!(12.50));
        assert_eq!(totals.shipping_fee, dec!(250.00));
        assert_eq!(totals.total_amount, dec!(512.50));
    }

    #[test]
    fn tax_rounds_half_up() {
        // 10.10 * 0.05 = 0.505 -> 0.51
        let totals = price_order(&[line(1, dec!(10.10))], Decimal::ZERO, dec!(0.05)).unwrap();
        assert_eq!(totals.tax_amount, dec!(0.51));
        assert_eq!(totals.total_amount, dec!(10.61));
    }

    #[test]
    fn sub_cent_unit_prices_round_in_the_subtotal() {
        // 3 * 0.335 = 1.005 -> 1.01
        let totals = price_order(&[line(3, dec!(0.335))], Decimal::ZERO, Decimal::ZERO).unwrap();
        assert_eq!(totals.subtotal, dec!(1.01));
    }

    #[test]
    fn zero_shipping_and_zero_tax_are_valid() {
        let totals = price_order(&[line(4, dec!(25.00))], Decimal::ZERO, Decimal::ZERO).unwrap();
        assert_eq!(totals.subtotal, dec!(100.00));
        assert_eq!(totals.tax_amount, dec!(0.00));
        assert_eq!(totals.total_amount, dec!(100.00));
    }

    #[test]
    fn empty_order_cannot_be_priced() {
        let err = price_order(&[], Decimal::ZERO, dec!(0.05)).unwrap_err();
        assert!(matches!(err, DomainError::Validation(_)));
    }

    #[test]
    fn non_positive_quantity_is_rejected() {
        for quantity in [0, -2] {
            let err =
                price_order(&[line(quantity, dec!(1.00))], Decimal::ZERO, dec!(0.05)).unwrap_err();
            assert!(matches!(err, DomainError::Validation(_)));
        }
    }

    #[test]
    fn default_config_is_five_percent_tax_free_shipping() {
        let config = PricingConfig::default();
        assert_eq!(config.tax_rate, dec!(0.05));
        assert_eq!(config.shipping_fee, Decimal::ZERO);
    }

    mod proptest_tests {
        use super::*;
        use proptest::prelude::*;

        proptest! {
            /// Property: for any priced order, the total identity holds and
            /// every amount is non-negative with at most two decimal places.
            #[test]
            fn totals_are_rounded_and_consistent(
                lines in prop::collection::vec((1i64..100, 0i64..10_000_000), 1..10),
                shipping_cents in 0i64..100_000,
            ) {
                let inputs: Vec<LineInput> = lines
                    .iter()
                    .map(|&(quantity, price_cents)| line(quantity, Decimal::new(price_cents, 2)))
                    .collect();

                let totals = price_order(
                    &inputs,
                    Decimal::new(shipping_cents, 2),
                    dec!(0.05),
                ).unwrap();

                prop_assert_eq!(
                    totals.total_amount,
                    totals.subtotal + totals.tax_amount + totals.shipping_fee
                );
                prop_assert!(totals.subtotal >= Decimal::ZERO);
                prop_assert!(totals.tax_amount >= Decimal::ZERO);
                prop_assert!(totals.total_amount.scale() <= 2);
            }
        }
    }
}
