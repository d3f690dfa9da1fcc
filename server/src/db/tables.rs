use shared::models::Table;
use shared::models::table::TableUpdate;
use sqlx::PgPool;
use uuid::Uuid;

pub async fn list_by_restaurant(
    pool: &PgPool,
    restaurant_id: Uuid,
) -> Result<Vec<Table>, sqlx::Error> {
    sqlx::query_as("SELECT * FROM tables WHERE restaurant_id = $1 ORDER BY table_number")
        .bind(restaurant_id)
        .fetch_all(pool)
        .await
}

pub async fn find_by_id(pool: &PgPool, id: Uuid) -> Result<Option<Table>, sqlx::Error> {
    sqlx::query_as("SELECT * FROM tables WHERE id = $1")
        .bind(id)
        .fetch_optional(pool)
        .await
}

/// Resolve a scanned QR token to its table (active tables only)
pub async fn find_by_qr_code(pool: &PgPool, qr_code: &str) -> Result<Option<Table>, sqlx::Error> {
    sqlx::query_as("SELECT * FROM tables WHERE qr_code = $1 AND active = TRUE")
        .bind(qr_code)
        .fetch_optional(pool)
        .await
}

pub async fn create(
    pool: &PgPool,
    restaurant_id: Uuid,
    table_number: &str,
    qr_code: &str,
) -> Result<Table, sqlx::Error> {
    sqlx::query_as(
        "INSERT INTO tables (restaurant_id, table_number, qr_code, active)
         VALUES ($1, $2, $3, TRUE)
         RETURNING *",
    )
    .bind(restaurant_id)
    .bind(table_number)
    .bind(qr_code)
    .fetch_one(pool)
    .await
}

/// Update table number and active flag. The qr_code is immutable once
/// issued; printed codes must never be invalidated by an edit.
pub async fn update(
    pool: &PgPool,
    id: Uuid,
    restaurant_id: Uuid,
    data: &TableUpdate,
) -> Result<Option<Table>, sqlx::Error> {
    sqlx::query_as(
        "UPDATE tables SET
            table_number = COALESCE($3, table_number),
            active = COALESCE($4, active)
         WHERE id = $1 AND restaurant_id = $2
         RETURNING *",
    )
    .bind(id)
    .bind(restaurant_id)
    .bind(&data.table_number)
    .bind(data.active)
    .fetch_optional(pool)
    .await
}

pub async fn delete(pool: &PgPool, id: Uuid, restaurant_id: Uuid) -> Result<bool, sqlx::Error> {
    let result = sqlx::query("DELETE FROM tables WHERE id = $1 AND restaurant_id = $2")
        .bind(id)
        .bind(restaurant_id)
        .execute(pool)
        .await?;
    Ok(result.rows_affected() > 0)
}
