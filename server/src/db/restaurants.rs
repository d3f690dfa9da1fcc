use shared::models::Restaurant;
use shared::models::restaurant::RestaurantUpdate;
use sqlx::PgPool;
use uuid::Uuid;

pub async fn find_by_id(pool: &PgPool, id: Uuid) -> Result<Option<Restaurant>, sqlx::Error> {
    sqlx::query_as("SELECT * FROM restaurants WHERE id = $1")
        .bind(id)
        .fetch_optional(pool)
        .await
}

/// Store the hash of a freshly minted POS API key, replacing any
/// previous key for the restaurant
pub async fn set_api_key_hash(
    pool: &PgPool,
    id: Uuid,
    api_key_hash: &str,
) -> Result<(), sqlx::Error> {
    sqlx::query("UPDATE restaurants SET api_key_hash = $2, updated_at = now() WHERE id = $1")
        .bind(id)
        .bind(api_key_hash)
        .execute(pool)
        .await?;
    Ok(())
}

pub async fn update(
    pool: &PgPool,
    id: Uuid,
    data: &RestaurantUpdate,
) -> Result<Option<Restaurant>, sqlx::Error> {
    sqlx::query_as(
        "UPDATE restaurants SET
            name = COALESCE($2, name),
            logo_url = COALESCE($3, logo_url),
            primary_color = COALESCE($4, primary_color),
            updated_at = now()
         WHERE id = $1
         RETURNING *",
    )
    .bind(id)
    .bind(&data.name)
    .bind(&data.logo_url)
    .bind(&data.primary_color)
    .fetch_optional(pool)
    .await
}
