//! Event trait: the minimal contract every emitted event satisfies.

use chrono::{DateTime, Utc};

/// Emitted event metadata.
pub trait Event {
    /// Stable, dot-separated type name (e.g. `"order.status_changed"`).
    fn event_type(&self) -> &'static str;

    /// When the underlying change happened.
    fn occurred_at(&self) -> DateTime<Utc>;
}
