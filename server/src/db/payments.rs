//! Payment persistence
//!
//! Two partial unique indexes back the invariants here: at most one
//! succeeded payment per order, and at most one open (pending or
//! processing) payment per order. Writers treat a unique violation as a
//! concurrent winner, not a fault.

use shared::models::Payment;
use sqlx::PgPool;
use uuid::Uuid;

pub async fn list_by_order(pool: &PgPool, order_id: Uuid) -> Result<Vec<Payment>, sqlx::Error> {
    sqlx::query_as("SELECT * FROM payments WHERE order_id = $1 ORDER BY created_at")
        .bind(order_id)
        .fetch_all(pool)
        .await
}

pub async fn find_succeeded_by_order(
    pool: &PgPool,
    order_id: Uuid,
) -> Result<Option<Payment>, sqlx::Error> {
    sqlx::query_as("SELECT * FROM payments WHERE order_id = $1 AND status = 'succeeded'")
        .bind(order_id)
        .fetch_optional(pool)
        .await
}

/// The in-flight payment for an order, if any. A customer re-opening the
/// checkout page reuses this row instead of minting a second intent.
pub async fn find_open_by_order(
    pool: &PgPool,
    order_id: Uuid,
) -> Result<Option<Payment>, sqlx::Error> {
    sqlx::query_as(
        "SELECT * FROM payments WHERE order_id = $1 AND status IN ('pending', 'processing')
         ORDER BY created_at DESC LIMIT 1",
    )
    .bind(order_id)
    .fetch_optional(pool)
    .await
}

/// Insert a fresh pending payment. `None` means a concurrent creator
/// already holds the order's open-payment slot (or the order got paid
/// in the meantime); the caller re-reads instead of failing.
pub async fn create(
    pool: &PgPool,
    order_id: Uuid,
    stripe_payment_intent_id: &str,
    stripe_client_secret: &str,
    amount: rust_decimal::Decimal,
) -> Result<Option<Payment>, sqlx::Error> {
    sqlx::query_as(
        "INSERT INTO payments (order_id, stripe_payment_intent_id, stripe_client_secret, amount, status)
         VALUES ($1, $2, $3, $4, 'pending')
         ON CONFLICT DO NOTHING
         RETURNING *",
    )
    .bind(order_id)
    .bind(stripe_payment_intent_id)
    .bind(stripe_client_secret)
    .bind(amount)
    .fetch_optional(pool)
    .await
}

/// Record a successful charge; returns the owning order id, or `None`
/// when the intent is unknown. The update is unconditional so a
/// redelivered success event reapplies the same values harmlessly.
pub async fn mark_succeeded_by_intent(
    pool: &PgPool,
    stripe_payment_intent_id: &str,
    payment_method: Option<&str>,
) -> Result<Option<Uuid>, sqlx::Error> {
    let row: Option<(Uuid,)> = sqlx::query_as(
        "UPDATE payments SET status = 'succeeded', payment_method = COALESCE($2, payment_method), updated_at = now()
         WHERE stripe_payment_intent_id = $1
         RETURNING order_id",
    )
    .bind(stripe_payment_intent_id)
    .bind(payment_method)
    .fetch_optional(pool)
    .await?;
    Ok(row.map(|r| r.0))
}

/// Record a failed or canceled charge. Only an open payment moves; a
/// succeeded one is never downgraded by a late failure event.
pub async fn mark_failed_by_intent(
    pool: &PgPool,
    stripe_payment_intent_id: &str,
) -> Result<Option<Uuid>, sqlx::Error> {
    let row: Option<(Uuid,)> = sqlx::query_as(
        "UPDATE payments SET status = 'failed', updated_at = now()
         WHERE stripe_payment_intent_id = $1 AND status IN ('pending', 'processing')
         RETURNING order_id",
    )
    .bind(stripe_payment_intent_id)
    .fetch_optional(pool)
    .await?;
    Ok(row.map(|r| r.0))
}
