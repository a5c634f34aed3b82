//! Pricing domain module.
//!
//! Pure totals computation over order line items: no side effects, no IO,
//! fully unit-testable in isolation.

pub mod calculator;

pub use calculator::{LineInput, OrderTotals, PricingConfig, price_order};
