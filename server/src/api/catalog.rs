//! Catalog endpoints: QR resolution, menu browsing, and admin CRUD for
//! restaurants, tables, categories, and items.

use axum::Json;
use axum::extract::{Path, State};
use serde::Serialize;
use shared::error::{ApiResponse, AppError, ErrorCode};
use shared::models::menu::{
    MenuCategory, MenuCategoryCreate, MenuCategoryUpdate, MenuCategoryWithItems, MenuItem,
    MenuItemCreate, MenuItemUpdate,
};
use shared::models::restaurant::RestaurantUpdate;
use shared::models::table::{TableCreate, TableUpdate};
use shared::models::{Restaurant, Table};
use uuid::Uuid;

use crate::auth::generate_api_key;
use crate::db;
use crate::error::ServiceResult;
use crate::state::AppState;

// ==================== Customer session ====================

#[derive(Debug, Serialize)]
pub struct QrSession {
    pub restaurant: Restaurant,
    pub table: Table,
    pub menu: Vec<MenuCategoryWithItems>,
}

/// GET /api/qr/{qr_code}
///
/// Entry point for a scanned table code: resolves the token to its
/// table and restaurant and returns the customer-visible menu in one
/// round trip.
pub async fn resolve_qr(
    State(state): State<AppState>,
    Path(qr_code): Path<String>,
) -> ServiceResult<Json<ApiResponse<QrSession>>> {
    let table = db::tables::find_by_qr_code(&state.pool, &qr_code)
        .await?
        .ok_or_else(|| AppError::new(ErrorCode::TableNotFound))?;
    let restaurant = db::restaurants::find_by_id(&state.pool, table.restaurant_id)
        .await?
        .ok_or_else(|| AppError::new(ErrorCode::RestaurantNotFound))?;
    let menu = db::menu::list_menu(&state.pool, table.restaurant_id, true).await?;
    Ok(Json(ApiResponse::success(QrSession {
        restaurant,
        table,
        menu,
    })))
}

/// GET /api/restaurants/{id}/menu (available items only)
pub async fn get_menu(
    State(state): State<AppState>,
    Path(restaurant_id): Path<Uuid>,
) -> ServiceResult<Json<ApiResponse<Vec<MenuCategoryWithItems>>>> {
    let menu = db::menu::list_menu(&state.pool, restaurant_id, true).await?;
    Ok(Json(ApiResponse::success(menu)))
}

// ==================== Restaurant admin ====================

/// GET /api/restaurants/{id}
pub async fn get_restaurant(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> ServiceResult<Json<ApiResponse<Restaurant>>> {
    let restaurant = db::restaurants::find_by_id(&state.pool, id)
        .await?
        .ok_or_else(|| AppError::new(ErrorCode::RestaurantNotFound))?;
    Ok(Json(ApiResponse::success(restaurant)))
}

/// PATCH /api/restaurants/{id}
pub async fn update_restaurant(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(data): Json<RestaurantUpdate>,
) -> ServiceResult<Json<ApiResponse<Restaurant>>> {
    let restaurant = db::restaurants::update(&state.pool, id, &data)
        .await?
        .ok_or_else(|| AppError::new(ErrorCode::RestaurantNotFound))?;
    Ok(Json(ApiResponse::success(restaurant)))
}

#[derive(Debug, Serialize)]
pub struct ApiKeyResponse {
    /// Shown exactly once; only its hash is stored
    pub api_key: String,
}

/// POST /api/restaurants/{id}/api-key
///
/// Mints a new POS API key, replacing any previous one.
pub async fn issue_api_key(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> ServiceResult<Json<ApiResponse<ApiKeyResponse>>> {
    db::restaurants::find_by_id(&state.pool, id)
        .await?
        .ok_or_else(|| AppError::new(ErrorCode::RestaurantNotFound))?;

    let key = generate_api_key(id);
    db::restaurants::set_api_key_hash(&state.pool, id, &key.hash()).await?;
    tracing::info!(restaurant_id = %id, "POS API key rotated");

    Ok(Json(ApiResponse::success(ApiKeyResponse { api_key: key.raw })))
}

// ==================== Tables ====================

/// GET /api/restaurants/{id}/tables
pub async fn list_tables(
    State(state): State<AppState>,
    Path(restaurant_id): Path<Uuid>,
) -> ServiceResult<Json<ApiResponse<Vec<Table>>>> {
    let tables = db::tables::list_by_restaurant(&state.pool, restaurant_id).await?;
    Ok(Json(ApiResponse::success(tables)))
}

/// POST /api/restaurants/{id}/tables
///
/// The QR token is generated server-side and never changes afterwards.
pub async fn create_table(
    State(state): State<AppState>,
    Path(restaurant_id): Path<Uuid>,
    Json(data): Json<TableCreate>,
) -> ServiceResult<Json<ApiResponse<Table>>> {
    if data.table_number.trim().is_empty() {
        return Err(AppError::validation("Table number is required").into());
    }
    let qr_code = Uuid::new_v4().simple().to_string();
    let table = db::tables::create(&state.pool, restaurant_id, &data.table_number, &qr_code)
        .await?;
    Ok(Json(ApiResponse::success(table)))
}

/// PATCH /api/restaurants/{id}/tables/{table_id}
pub async fn update_table(
    State(state): State<AppState>,
    Path((restaurant_id, table_id)): Path<(Uuid, Uuid)>,
    Json(data): Json<TableUpdate>,
) -> ServiceResult<Json<ApiResponse<Table>>> {
    let table = db::tables::update(&state.pool, table_id, restaurant_id, &data)
        .await?
        .ok_or_else(|| AppError::new(ErrorCode::TableNotFound))?;
    Ok(Json(ApiResponse::success(table)))
}

/// DELETE /api/restaurants/{id}/tables/{table_id}
pub async fn delete_table(
    State(state): State<AppState>,
    Path((restaurant_id, table_id)): Path<(Uuid, Uuid)>,
) -> ServiceResult<Json<ApiResponse<()>>> {
    if !db::tables::delete(&state.pool, table_id, restaurant_id).await? {
        return Err(AppError::new(ErrorCode::TableNotFound).into());
    }
    Ok(Json(ApiResponse::ok()))
}

// ==================== Menu admin ====================

/// GET /api/restaurants/{id}/menu/full (includes unavailable items)
pub async fn get_full_menu(
    State(state): State<AppState>,
    Path(restaurant_id): Path<Uuid>,
) -> ServiceResult<Json<ApiResponse<Vec<MenuCategoryWithItems>>>> {
    let menu = db::menu::list_menu(&state.pool, restaurant_id, false).await?;
    Ok(Json(ApiResponse::success(menu)))
}

/// POST /api/restaurants/{id}/categories
pub async fn create_category(
    State(state): State<AppState>,
    Path(restaurant_id): Path<Uuid>,
    Json(data): Json<MenuCategoryCreate>,
) -> ServiceResult<Json<ApiResponse<MenuCategory>>> {
    if data.name.trim().is_empty() {
        return Err(AppError::validation("Category name is required").into());
    }
    let category = db::menu::create_category(&state.pool, restaurant_id, &data).await?;
    Ok(Json(ApiResponse::success(category)))
}

/// PATCH /api/restaurants/{id}/categories/{category_id}
pub async fn update_category(
    State(state): State<AppState>,
    Path((restaurant_id, category_id)): Path<(Uuid, Uuid)>,
    Json(data): Json<MenuCategoryUpdate>,
) -> ServiceResult<Json<ApiResponse<MenuCategory>>> {
    let category = db::menu::update_category(&state.pool, category_id, restaurant_id, &data)
        .await?
        .ok_or_else(|| AppError::new(ErrorCode::CategoryNotFound))?;
    Ok(Json(ApiResponse::success(category)))
}

/// DELETE /api/restaurants/{id}/categories/{category_id}
///
/// Refused while the category still has items; deleting them first is
/// an explicit admin action, not a cascade surprise.
pub async fn delete_category(
    State(state): State<AppState>,
    Path((restaurant_id, category_id)): Path<(Uuid, Uuid)>,
) -> ServiceResult<Json<ApiResponse<()>>> {
    match db::menu::category_item_count(&state.pool, category_id, restaurant_id).await? {
        None => return Err(AppError::new(ErrorCode::CategoryNotFound).into()),
        Some(count) if count > 0 => {
            return Err(AppError::new(ErrorCode::CategoryHasItems)
                .with_detail("item_count", count)
                .into());
        }
        Some(_) => {}
    }
    db::menu::delete_category(&state.pool, category_id, restaurant_id).await?;
    Ok(Json(ApiResponse::ok()))
}

/// POST /api/restaurants/{id}/items
pub async fn create_item(
    State(state): State<AppState>,
    Path(restaurant_id): Path<Uuid>,
    Json(data): Json<MenuItemCreate>,
) -> ServiceResult<Json<ApiResponse<MenuItem>>> {
    if data.name.trim().is_empty() {
        return Err(AppError::validation("Item name is required").into());
    }
    if data.price.is_sign_negative() {
        return Err(AppError::validation("Price must not be negative").into());
    }
    let item = db::menu::create_item(&state.pool, restaurant_id, &data).await?;
    Ok(Json(ApiResponse::success(item)))
}

/// PATCH /api/restaurants/{id}/items/{item_id}
pub async fn update_item(
    State(state): State<AppState>,
    Path((restaurant_id, item_id)): Path<(Uuid, Uuid)>,
    Json(data): Json<MenuItemUpdate>,
) -> ServiceResult<Json<ApiResponse<MenuItem>>> {
    if let Some(price) = data.price {
        if price.is_sign_negative() {
            return Err(AppError::validation("Price must not be negative").into());
        }
    }
    let item = db::menu::update_item(&state.pool, item_id, restaurant_id, &data)
        .await?
        .ok_or_else(|| AppError::new(ErrorCode::MenuItemNotFound))?;
    Ok(Json(ApiResponse::success(item)))
}

/// DELETE /api/restaurants/{id}/items/{item_id}
pub async fn delete_item(
    State(state): State<AppState>,
    Path((restaurant_id, item_id)): Path<(Uuid, Uuid)>,
) -> ServiceResult<Json<ApiResponse<()>>> {
    if !db::menu::delete_item(&state.pool, item_id, restaurant_id).await? {
        return Err(AppError::new(ErrorCode::MenuItemNotFound).into());
    }
    Ok(Json(ApiResponse::ok()))
}
