use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Menu category record
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct MenuCategory {
    pub id: Uuid,
    pub restaurant_id: Uuid,
    pub name: String,
    pub display_order: i32,
    pub created_at: DateTime<Utc>,
}

/// Menu item record
///
/// `available` toggles are visible to in-flight customer sessions on
/// their next read; there is no strict real-time guarantee.
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct MenuItem {
    pub id: Uuid,
    pub restaurant_id: Uuid,
    pub category_id: Uuid,
    pub name: String,
    pub description: Option<String>,
    pub price: Decimal,
    pub image_url: Option<String>,
    pub available: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Category with its items, as served to menu browsers and the POS
#[derive(Debug, Clone, Serialize)]
pub struct MenuCategoryWithItems {
    #[serde(flatten)]
    pub category: MenuCategory,
    pub items: Vec<MenuItem>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct MenuCategoryCreate {
    pub name: String,
    #[serde(default)]
    pub display_order: i32,
}

#[derive(Debug, Clone, Deserialize)]
pub struct MenuCategoryUpdate {
    pub name: Option<String>,
    pub display_order: Option<i32>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct MenuItemCreate {
    pub category_id: Uuid,
    pub name: String,
    pub description: Option<String>,
    pub price: Decimal,
    pub image_url: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct MenuItemUpdate {
    pub name: Option<String>,
    pub description: Option<String>,
    pub price: Option<Decimal>,
    pub image_url: Option<String>,
    pub available: Option<bool>,
}
