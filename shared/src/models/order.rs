//! Order lifecycle types
//!
//! `OrderStatus` is a closed enum with an explicit transition table.
//! The storage layer persists it as the Postgres enum `order_status`;
//! malformed status strings are rejected at deserialization.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use uuid::Uuid;

/// Order lifecycle status
///
/// Normal flow: `pending → confirmed → preparing → ready → completed`.
/// `cancelled` is reachable before payment succeeds. Direct jumps are
/// permitted on manual paths (staff may correct mistakes) with two
/// exceptions, encoded in [`OrderStatus::manual_transition_allowed`]:
/// - `pending → confirmed` is system-triggered only (payment success)
/// - terminal states accept no further transitions without an explicit
///   staff override
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, sqlx::Type)]
#[serde(rename_all = "lowercase")]
#[sqlx(type_name = "order_status", rename_all = "lowercase")]
pub enum OrderStatus {
    Pending,
    Confirmed,
    Preparing,
    Ready,
    Completed,
    Cancelled,
}

impl OrderStatus {
    /// Wire/database representation
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::Confirmed => "confirmed",
            Self::Preparing => "preparing",
            Self::Ready => "ready",
            Self::Completed => "completed",
            Self::Cancelled => "cancelled",
        }
    }

    /// Terminal states accept no further transitions (override excepted)
    pub const fn is_terminal(&self) -> bool {
        matches!(self, Self::Completed | Self::Cancelled)
    }

    /// Whether a manual (staff-issued) transition from `self` to `to`
    /// is allowed without the override flag.
    ///
    /// Re-asserting the current status is a no-op and always allowed.
    pub fn manual_transition_allowed(&self, to: OrderStatus) -> bool {
        if *self == to {
            return true;
        }
        if self.is_terminal() {
            return false;
        }
        // Confirmation is driven by payment reconciliation, not staff.
        !(matches!(self, Self::Pending) && matches!(to, Self::Confirmed))
    }
}

impl fmt::Display for OrderStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Error for unrecognized status strings
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InvalidOrderStatus(pub String);

impl fmt::Display for InvalidOrderStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "invalid order status: {}", self.0)
    }
}

impl std::error::Error for InvalidOrderStatus {}

impl FromStr for OrderStatus {
    type Err = InvalidOrderStatus;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "pending" => Ok(Self::Pending),
            "confirmed" => Ok(Self::Confirmed),
            "preparing" => Ok(Self::Preparing),
            "ready" => Ok(Self::Ready),
            "completed" => Ok(Self::Completed),
            "cancelled" => Ok(Self::Cancelled),
            other => Err(InvalidOrderStatus(other.to_string())),
        }
    }
}

/// Order record
///
/// Invariant: `total = subtotal + tax`, computed once at creation and
/// never recomputed after persistence. `version` is an
/// optimistic-concurrency counter bumped on every status transition.
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct Order {
    pub id: Uuid,
    pub restaurant_id: Uuid,
    pub table_id: Uuid,
    pub status: OrderStatus,
    pub subtotal: Decimal,
    pub tax: Decimal,
    pub total: Decimal,
    pub special_instructions: Option<String>,
    pub version: i32,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Order line item
///
/// `menu_item_id` is a reference, not ownership: the menu item may later
/// be deleted or repriced without altering the historical `item_name`
/// and `price_at_time` snapshots.
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct OrderItem {
    pub id: Uuid,
    pub order_id: Uuid,
    pub menu_item_id: Option<Uuid>,
    pub item_name: String,
    pub quantity: i32,
    pub price_at_time: Decimal,
    pub special_instructions: Option<String>,
    pub created_at: DateTime<Utc>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_roundtrip() {
        for s in [
            OrderStatus::Pending,
            OrderStatus::Confirmed,
            OrderStatus::Preparing,
            OrderStatus::Ready,
            OrderStatus::Completed,
            OrderStatus::Cancelled,
        ] {
            assert_eq!(s.as_str().parse::<OrderStatus>().unwrap(), s);
        }
    }

    #[test]
    fn test_status_parse_invalid() {
        assert!("shipped".parse::<OrderStatus>().is_err());
        assert!("PENDING".parse::<OrderStatus>().is_err());
        assert!("".parse::<OrderStatus>().is_err());
    }

    #[test]
    fn test_serde_lowercase() {
        let json = serde_json::to_string(&OrderStatus::Preparing).unwrap();
        assert_eq!(json, "\"preparing\"");
        let parsed: OrderStatus = serde_json::from_str("\"cancelled\"").unwrap();
        assert_eq!(parsed, OrderStatus::Cancelled);
    }

    #[test]
    fn test_terminal_states() {
        assert!(OrderStatus::Completed.is_terminal());
        assert!(OrderStatus::Cancelled.is_terminal());
        assert!(!OrderStatus::Pending.is_terminal());
        assert!(!OrderStatus::Ready.is_terminal());
    }

    #[test]
    fn test_manual_transitions_normal_flow() {
        use OrderStatus::*;
        assert!(Confirmed.manual_transition_allowed(Preparing));
        assert!(Preparing.manual_transition_allowed(Ready));
        assert!(Ready.manual_transition_allowed(Completed));
        // Direct jumps are allowed so staff can correct mistakes
        assert!(Pending.manual_transition_allowed(Ready));
        assert!(Preparing.manual_transition_allowed(Completed));
        // Going backwards is a correction, also allowed
        assert!(Ready.manual_transition_allowed(Preparing));
    }

    #[test]
    fn test_manual_confirmation_rejected() {
        // pending -> confirmed happens only via payment reconciliation
        assert!(!OrderStatus::Pending.manual_transition_allowed(OrderStatus::Confirmed));
        // but re-confirming an already-confirmed order is a no-op
        assert!(OrderStatus::Confirmed.manual_transition_allowed(OrderStatus::Confirmed));
    }

    #[test]
    fn test_terminal_states_locked() {
        use OrderStatus::*;
        assert!(!Completed.manual_transition_allowed(Preparing));
        assert!(!Completed.manual_transition_allowed(Cancelled));
        assert!(!Cancelled.manual_transition_allowed(Pending));
        // Re-asserting the terminal status itself is fine
        assert!(Completed.manual_transition_allowed(Completed));
    }

    #[test]
    fn test_cancellation_before_payment() {
        assert!(OrderStatus::Pending.manual_transition_allowed(OrderStatus::Cancelled));
        assert!(OrderStatus::Confirmed.manual_transition_allowed(OrderStatus::Cancelled));
    }
}
