//! Stock alert evaluation domain module.
//!
//! Classifies post-movement stock levels against the product thresholds and
//! decides whether an alert-worthy event should fire. Pure and deterministic;
//! delivery and deduplication belong to the notification layer.

pub mod evaluator;

pub use evaluator::{AlertType, StockAlert, StockLevel, classify, evaluate};
