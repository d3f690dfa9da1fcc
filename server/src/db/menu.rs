use shared::models::menu::{
    MenuCategory, MenuCategoryCreate, MenuCategoryUpdate, MenuCategoryWithItems, MenuItem,
    MenuItemCreate, MenuItemUpdate,
};
use sqlx::PgPool;
use uuid::Uuid;

/// Full menu for a restaurant: categories in display order, each with
/// its items. `only_available` filters unavailable items for customer
/// sessions; admin and POS callers see everything.
pub async fn list_menu(
    pool: &PgPool,
    restaurant_id: Uuid,
    only_available: bool,
) -> Result<Vec<MenuCategoryWithItems>, sqlx::Error> {
    let categories: Vec<MenuCategory> = sqlx::query_as(
        "SELECT * FROM menu_categories WHERE restaurant_id = $1 ORDER BY display_order",
    )
    .bind(restaurant_id)
    .fetch_all(pool)
    .await?;

    let items: Vec<MenuItem> = if only_available {
        sqlx::query_as(
            "SELECT * FROM menu_items WHERE restaurant_id = $1 AND available = TRUE ORDER BY name",
        )
        .bind(restaurant_id)
        .fetch_all(pool)
        .await?
    } else {
        sqlx::query_as("SELECT * FROM menu_items WHERE restaurant_id = $1 ORDER BY name")
            .bind(restaurant_id)
            .fetch_all(pool)
            .await?
    };

    let mut menu: Vec<MenuCategoryWithItems> = categories
        .into_iter()
        .map(|category| MenuCategoryWithItems {
            category,
            items: Vec::new(),
        })
        .collect();
    for item in items {
        if let Some(entry) = menu.iter_mut().find(|c| c.category.id == item.category_id) {
            entry.items.push(item);
        }
    }
    Ok(menu)
}

pub async fn find_item(
    pool: &PgPool,
    id: Uuid,
    restaurant_id: Uuid,
) -> Result<Option<MenuItem>, sqlx::Error> {
    sqlx::query_as("SELECT * FROM menu_items WHERE id = $1 AND restaurant_id = $2")
        .bind(id)
        .bind(restaurant_id)
        .fetch_optional(pool)
        .await
}

pub async fn create_category(
    pool: &PgPool,
    restaurant_id: Uuid,
    data: &MenuCategoryCreate,
) -> Result<MenuCategory, sqlx::Error> {
    sqlx::query_as(
        "INSERT INTO menu_categories (restaurant_id, name, display_order)
         VALUES ($1, $2, $3)
         RETURNING *",
    )
    .bind(restaurant_id)
    .bind(&data.name)
    .bind(data.display_order)
    .fetch_one(pool)
    .await
}

pub async fn update_category(
    pool: &PgPool,
    id: Uuid,
    restaurant_id: Uuid,
    data: &MenuCategoryUpdate,
) -> Result<Option<MenuCategory>, sqlx::Error> {
    sqlx::query_as(
        "UPDATE menu_categories SET
            name = COALESCE($3, name),
            display_order = COALESCE($4, display_order)
         WHERE id = $1 AND restaurant_id = $2
         RETURNING *",
    )
    .bind(id)
    .bind(restaurant_id)
    .bind(&data.name)
    .bind(data.display_order)
    .fetch_optional(pool)
    .await
}

/// Returns `None` when the category does not exist (or belongs to a
/// different restaurant), `Some(count)` with its item count otherwise.
pub async fn category_item_count(
    pool: &PgPool,
    id: Uuid,
    restaurant_id: Uuid,
) -> Result<Option<i64>, sqlx::Error> {
    let row: Option<(i64,)> = sqlx::query_as(
        "SELECT (SELECT COUNT(*) FROM menu_items WHERE category_id = c.id)
         FROM menu_categories c WHERE c.id = $1 AND c.restaurant_id = $2",
    )
    .bind(id)
    .bind(restaurant_id)
    .fetch_optional(pool)
    .await?;
    Ok(row.map(|r| r.0))
}

pub async fn delete_category(
    pool: &PgPool,
    id: Uuid,
    restaurant_id: Uuid,
) -> Result<bool, sqlx::Error> {
    let result = sqlx::query("DELETE FROM menu_categories WHERE id = $1 AND restaurant_id = $2")
        .bind(id)
        .bind(restaurant_id)
        .execute(pool)
        .await?;
    Ok(result.rows_affected() > 0)
}

pub async fn create_item(
    pool: &PgPool,
    restaurant_id: Uuid,
    data: &MenuItemCreate,
) -> Result<MenuItem, sqlx::Error> {
    sqlx::query_as(
        "INSERT INTO menu_items (restaurant_id, category_id, name, description, price, image_url, available)
         VALUES ($1, $2, $3, $4, $5, $6, TRUE)
         RETURNING *",
    )
    .bind(restaurant_id)
    .bind(data.category_id)
    .bind(&data.name)
    .bind(&data.description)
    .bind(data.price)
    .bind(&data.image_url)
    .fetch_one(pool)
    .await
}

pub async fn update_item(
    pool: &PgPool,
    id: Uuid,
    restaurant_id: Uuid,
    data: &MenuItemUpdate,
) -> Result<Option<MenuItem>, sqlx::Error> {
    sqlx::query_as(
        "UPDATE menu_items SET
            name = COALESCE($3, name),
            description = COALESCE($4, description),
            price = COALESCE($5, price),
            image_url = COALESCE($6, image_url),
            available = COALESCE($7, available),
            updated_at = now()
         WHERE id = $1 AND restaurant_id = $2
         RETURNING *",
    )
    .bind(id)
    .bind(restaurant_id)
    .bind(&data.name)
    .bind(&data.description)
    .bind(data.price)
    .bind(&data.image_url)
    .bind(data.available)
    .fetch_optional(pool)
    .await
}

pub async fn delete_item(
    pool: &PgPool,
    id: Uuid,
    restaurant_id: Uuid,
) -> Result<bool, sqlx::Error> {
    let result = sqlx::query("DELETE FROM menu_items WHERE id = $1 AND restaurant_id = $2")
        .bind(id)
        .bind(restaurant_id)
        .execute(pool)
        .await?;
    Ok(result.rows_affected() > 0)
}

/// Availability toggle for the POS surface, scoped to the caller's restaurant
pub async fn set_item_availability(
    pool: &PgPool,
    id: Uuid,
    restaurant_id: Uuid,
    available: bool,
) -> Result<Option<MenuItem>, sqlx::Error> {
    sqlx::query_as(
        "UPDATE menu_items SET available = $3, updated_at = now()
         WHERE id = $1 AND restaurant_id = $2
         RETURNING *",
    )
    .bind(id)
    .bind(restaurant_id)
    .bind(available)
    .fetch_optional(pool)
    .await
}
