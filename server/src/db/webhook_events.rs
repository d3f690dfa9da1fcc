//! Processed-event ledger for webhook idempotency
//!
//! Insert-first: claim the event id before doing any work. A duplicate
//! delivery loses the insert and is acknowledged without side effects.
//! A claim whose processing fails is released again before the handler
//! answers 5xx, keeping the provider's retry path open.

use sqlx::PgPool;

/// Returns `true` when this delivery claimed the event, `false` when it
/// was already processed.
pub async fn record(pool: &PgPool, event_id: &str, event_type: &str) -> Result<bool, sqlx::Error> {
    let result = sqlx::query(
        "INSERT INTO processed_webhook_events (event_id, event_type)
         VALUES ($1, $2)
         ON CONFLICT (event_id) DO NOTHING",
    )
    .bind(event_id)
    .bind(event_type)
    .execute(pool)
    .await?;
    Ok(result.rows_affected() > 0)
}

/// Un-claim an event whose processing failed, so the provider's retry
/// of the same event id is not swallowed as a duplicate.
pub async fn release(pool: &PgPool, event_id: &str) -> Result<(), sqlx::Error> {
    sqlx::query("DELETE FROM processed_webhook_events WHERE event_id = $1")
        .bind(event_id)
        .execute(pool)
        .await?;
    Ok(())
}
