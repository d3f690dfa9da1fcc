//! Payment record and status

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

/// Payment status, mirroring the provider's payment-intent lifecycle
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, sqlx::Type)]
#[serde(rename_all = "lowercase")]
#[sqlx(type_name = "payment_status", rename_all = "lowercase")]
pub enum PaymentStatus {
    Pending,
    Processing,
    Succeeded,
    Failed,
    Refunded,
}

impl PaymentStatus {
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::Processing => "processing",
            Self::Succeeded => "succeeded",
            Self::Failed => "failed",
            Self::Refunded => "refunded",
        }
    }

    /// Open payments may still be confirmed by the provider and are
    /// reused by duplicate `create_payment_intent` calls.
    pub const fn is_open(&self) -> bool {
        matches!(self, Self::Pending | Self::Processing)
    }
}

impl fmt::Display for PaymentStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Payment record
///
/// Invariant: at most one succeeded payment per order, and at most one
/// open (pending/processing) payment per order. Both are enforced by
/// storage-layer unique indexes; a unique-violation is the idempotency
/// signal, not an error to surface.
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct Payment {
    pub id: Uuid,
    pub order_id: Uuid,
    pub amount: Decimal,
    pub status: PaymentStatus,
    pub stripe_payment_intent_id: Option<String>,
    /// Transient: only used during the client-side confirmation handshake
    #[serde(skip_serializing)]
    pub stripe_client_secret: Option<String>,
    pub payment_method: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_open_statuses() {
        assert!(PaymentStatus::Pending.is_open());
        assert!(PaymentStatus::Processing.is_open());
        assert!(!PaymentStatus::Succeeded.is_open());
        assert!(!PaymentStatus::Failed.is_open());
        assert!(!PaymentStatus::Refunded.is_open());
    }

    #[test]
    fn test_serde_lowercase() {
        assert_eq!(
            serde_json::to_string(&PaymentStatus::Succeeded).unwrap(),
            "\"succeeded\""
        );
        let parsed: PaymentStatus = serde_json::from_str("\"refunded\"").unwrap();
        assert_eq!(parsed, PaymentStatus::Refunded);
    }
}
