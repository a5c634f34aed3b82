//! Value object trait: equality by value, not identity.

/// Marker trait for value objects.
///
/// Value objects are immutable and compared by their attribute values; to
/// "modify" one, construct a new value. `OrderTotals` is a value object,
/// `Order` (whose identity survives state changes) is not.
pub trait ValueObject: Clone + PartialEq + core::fmt::Debug {}
