//! Invoice persistence
//!
//! Numbering comes from a dedicated Postgres sequence, so numbers are
//! unique and gap-tolerant under concurrency. The UNIQUE constraint on
//! order_id makes creation idempotent: the losing writer of a race gets
//! zero rows back and re-reads the winner's row.

use shared::models::Invoice;
use sqlx::PgPool;
use uuid::Uuid;

pub async fn find_by_order(pool: &PgPool, order_id: Uuid) -> Result<Option<Invoice>, sqlx::Error> {
    sqlx::query_as("SELECT * FROM invoices WHERE order_id = $1")
        .bind(order_id)
        .fetch_optional(pool)
        .await
}

pub async fn find_by_id(pool: &PgPool, id: Uuid) -> Result<Option<Invoice>, sqlx::Error> {
    sqlx::query_as("SELECT * FROM invoices WHERE id = $1")
        .bind(id)
        .fetch_optional(pool)
        .await
}

/// Allocate the next invoice number, e.g. `INV-000042`
pub async fn next_invoice_number(pool: &PgPool) -> Result<String, sqlx::Error> {
    let (n,): (i64,) = sqlx::query_as("SELECT nextval('invoice_number_seq')")
        .fetch_one(pool)
        .await?;
    Ok(format!("INV-{n:06}"))
}

/// Insert an invoice; `None` means another writer already holds the
/// order's invoice slot and the caller should re-read it. A sequence
/// number burned by the losing side is an acceptable gap.
pub async fn create(
    pool: &PgPool,
    order_id: Uuid,
    invoice_number: &str,
    pdf_url: &str,
) -> Result<Option<Invoice>, sqlx::Error> {
    sqlx::query_as(
        "INSERT INTO invoices (order_id, invoice_number, pdf_url)
         VALUES ($1, $2, $3)
         ON CONFLICT (order_id) DO NOTHING
         RETURNING *",
    )
    .bind(order_id)
    .bind(invoice_number)
    .bind(pdf_url)
    .fetch_optional(pool)
    .await
}
