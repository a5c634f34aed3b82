//! Order-number generation.

use chrono::{DateTime, Utc};

use crate::order::OrderId;

/// Build the human-facing order number: `SO-YYYYMMDD-xxxxxxxx`.
///
/// The suffix is the tail of the order id, so the number is globally unique
/// and stable across retries of the same checkout request.
pub fn order_number(id: OrderId, on: DateTime<Utc>) -> String {
    let hex = id.0.as_uuid().simple().to_string();
    let suffix = &hex[hex.len() - 8..];
    format!("SO-{}-{}", on.format("%Y%m%d"), suffix)
}
