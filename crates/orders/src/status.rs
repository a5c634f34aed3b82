//! Order status state machine.

use serde::{Deserialize, Serialize};

use stockline_core::{DomainError, DomainResult};

/// Order status lifecycle.
///
/// Success path: `pending → confirmed → processing → shipped → delivered`.
/// Failure exits: `pending|confirmed → cancelled`, `pending → rejected`.
/// Fulfilment may skip forward past intermediate states, never backward.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OrderStatus {
    Pending,
    Confirmed,
    Processing,
    Shipped,
    Delivered,
    Cancelled,
    Rejected,
}

/// Stock side-effect of a status transition.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StockEffect {
    /// No stock movement (reservation stays in place or was never made).
    None,
    /// Every line item's reservation is returned to stock.
    Restore,
}

impl OrderStatus {
    /// No further transition is valid from a terminal status.
    pub fn is_terminal(self) -> bool {
        matches!(self, Self::Delivered | Self::Cancelled | Self::Rejected)
    }

    /// Position on the fulfilment path, if the status is on it.
    fn fulfilment_rank(self) -> Option<u8> {
        match self {
            Self::Pending => Some(0),
            Self::Confirmed => Some(1),
            Self::Processing => Some(2),
            Self::Shipped => Some(3),
            Self::Delivered => Some(4),
            Self::Cancelled | Self::Rejected => None,
        }
    }

    /// Whether the `self → target` edge is in the transition table.
    pub fn can_transition_to(self, target: OrderStatus) -> bool {
        if self.is_terminal() || self == target {
            return false;
        }
        match target {
            OrderStatus::Cancelled => matches!(self, Self::Pending | Self::Confirmed),
            OrderStatus::Rejected => self == Self::Pending,
            // Approval is the only exit from pending onto the fulfilment path.
            OrderStatus::Confirmed => self == Self::Pending,
            OrderStatus::Pending => false,
            _ => match (self.fulfilment_rank(), target.fulfilment_rank()) {
                (Some(from), Some(to)) => self != Self::Pending && to > from,
                _ => false,
            },
        }
    }

    /// Valid targets from this status, for conflict-error detail.
    pub fn valid_next_states(self) -> &'static [OrderStatus] {
        match self {
            Self::Pending => &[Self::Confirmed, Self::Cancelled, Self::Rejected],
            Self::Confirmed => &[
                Self::Processing,
                Self::Shipped,
                Self::Delivered,
                Self::Cancelled,
            ],
            Self::Processing => &[Self::Shipped, Self::Delivered],
            Self::Shipped => &[Self::Delivered],
            Self::Delivered | Self::Cancelled | Self::Rejected => &[],
        }
    }

    /// Stock side-effect of a valid `self → target` edge.
    ///
    /// Callers must have checked [`Self::can_transition_to`] first; the result
    /// is meaningless for edges outside the table.
    pub fn stock_effect(self, target: OrderStatus) -> StockEffect {
        match target {
            OrderStatus::Cancelled | OrderStatus::Rejected => StockEffect::Restore,
            _ => StockEffect::None,
        }
    }

    /// Storage representation; the inverse of [`core::str::FromStr`].
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::Confirmed => "confirmed",
            Self::Processing => "processing",
            Self::Shipped => "shipped",
            Self::Delivered => "delivered",
            Self::Cancelled => "cancelled",
            Self::Rejected => "rejected",
        }
    }
}

impl core::fmt::Display for OrderStatus {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl core::str::FromStr for OrderStatus {
    type Err = DomainError;

    fn from_str(s: &str) -> DomainResult<Self> {
        match s {
            "pending" => Ok(Self::Pending),
            "confirmed" => Ok(Self::Confirmed),
            "processing" => Ok(Self::Processing),
            "shipped" => Ok(Self::Shipped),
            "delivered" => Ok(Self::Delivered),
            "cancelled" => Ok(Self::Cancelled),
            "rejected" => Ok(Self::Rejected),
            other => Err(DomainError::validation(format!(
                "unknown order status: {other}"
            ))),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use OrderStatus::*;

    const ALL: [OrderStatus; 7] = [
        Pending, Confirmed, Processing, Shipped, Delivered, Cancelled, Rejected,
    ];

    #[test]
    fn pending_can_only_be_approved_cancelled_or_rejected() {
        for target in ALL {
            let expected = matches!(target, Confirmed | Cancelled | Rejected);
            assert_eq!(Pending.can_transition_to(target), expected, "{target:?}");
        }
    }

    #[test]
    fn confirmed_can_advance_or_cancel_but_not_reject() {
        assert!(Confirmed.can_transition_to(Processing));
        assert!(Confirmed.can_transition_to(Shipped));
        assert!(Confirmed.can_transition_to(Delivered));
        assert!(Confirmed.can_transition_to(Cancelled));
        assert!(!Confirmed.can_transition_to(Rejected));
        assert!(!Confirmed.can_transition_to(Pending));
    }

    #[test]
    fn fulfilment_never_moves_backward() {
        assert!(!Processing.can_transition_to(Confirmed));
        assert!(!Shipped.can_transition_to(Processing));
        assert!(!Delivered.can_transition_to(Shipped));
    }

    #[test]
    fn cancellation_window_closes_at_processing() {
        assert!(!Processing.can_transition_to(Cancelled));
        assert!(!Shipped.can_transition_to(Cancelled));
    }

    #[test]
    fn terminal_states_admit_nothing() {
        for terminal in [Delivered, Cancelled, Rejected] {
            assert!(terminal.is_terminal());
            for target in ALL {
                assert!(!terminal.can_transition_to(target), "{terminal:?} -> {target:?}");
            }
            assert!(terminal.valid_next_states().is_empty());
        }
    }

    #[test]
    fn self_transition_is_not_an_edge() {
        for status in ALL {
            assert!(!status.can_transition_to(status));
        }
    }

    #[test]
    fn only_failure_exits_restore_stock() {
        assert_eq!(Pending.stock_effect(Cancelled), StockEffect::Restore);
        assert_eq!(Pending.stock_effect(Rejected), StockEffect::Restore);
        assert_eq!(Confirmed.stock_effect(Cancelled), StockEffect::Restore);
        assert_eq!(Pending.stock_effect(Confirmed), StockEffect::None);
        assert_eq!(Confirmed.stock_effect(Shipped), StockEffect::None);
        assert_eq!(Shipped.stock_effect(Delivered), StockEffect::None);
    }

    #[test]
    fn valid_next_states_agree_with_transition_table() {
        for from in ALL {
            for to in ALL {
                let listed = from.valid_next_states().contains(&to);
                assert_eq!(listed, from.can_transition_to(to), "{from:?} -> {to:?}");
            }
        }
    }

    #[test]
    fn status_round_trips_through_storage_form() {
        for status in ALL {
            let parsed: OrderStatus = status.as_str().parse().unwrap();
            assert_eq!(parsed, status);
        }
        assert!("unknown".parse::<OrderStatus>().is_err());
    }
}
