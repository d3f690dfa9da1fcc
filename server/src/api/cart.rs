//! Session cart endpoints
//!
//! The cart lives server-side in memory (see [`crate::cart`]); the
//! client only holds an opaque session id. Item prices are snapshotted
//! from the live menu when a line is added.

use axum::Json;
use axum::extract::{Path, State};
use serde::Deserialize;
use shared::error::{ApiResponse, AppError, ErrorCode};
use uuid::Uuid;

use crate::cart::{CartLine, CartView};
use crate::db;
use crate::error::ServiceResult;
use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct AddItemRequest {
    pub restaurant_id: Uuid,
    pub table_id: Uuid,
    pub menu_item_id: Uuid,
    pub quantity: i32,
    pub special_instructions: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct SetQuantityRequest {
    pub quantity: i32,
}

/// POST /api/cart/{session_id}/items
pub async fn add_item(
    State(state): State<AppState>,
    Path(session_id): Path<String>,
    Json(req): Json<AddItemRequest>,
) -> ServiceResult<Json<ApiResponse<CartView>>> {
    if req.quantity <= 0 {
        return Err(AppError::validation("Quantity must be positive").into());
    }

    let item = db::menu::find_item(&state.pool, req.menu_item_id, req.restaurant_id)
        .await?
        .ok_or_else(|| AppError::new(ErrorCode::MenuItemNotFound))?;
    if !item.available {
        return Err(AppError::with_message(
            ErrorCode::ValidationFailed,
            format!("{} is currently unavailable", item.name),
        )
        .into());
    }

    let added = state.carts.add_line(
        &session_id,
        req.restaurant_id,
        req.table_id,
        CartLine {
            menu_item_id: item.id,
            item_name: item.name,
            price: item.price,
            quantity: req.quantity,
            special_instructions: req.special_instructions,
        },
    );
    if !added {
        return Err(AppError::with_message(
            ErrorCode::ValidationFailed,
            "Cart is already bound to a different restaurant or table",
        )
        .into());
    }

    let view = state
        .carts
        .view(&session_id, state.tax_rate)
        .ok_or_else(|| AppError::internal("Cart vanished after insert"))?;
    Ok(Json(ApiResponse::success(view)))
}

/// PATCH /api/cart/{session_id}/items/{menu_item_id}
pub async fn set_quantity(
    State(state): State<AppState>,
    Path((session_id, menu_item_id)): Path<(String, Uuid)>,
    Json(req): Json<SetQuantityRequest>,
) -> ServiceResult<Json<ApiResponse<CartView>>> {
    if !state.carts.set_quantity(&session_id, menu_item_id, req.quantity) {
        return Err(AppError::not_found("Cart item").into());
    }
    let view = state
        .carts
        .view(&session_id, state.tax_rate)
        .ok_or_else(|| AppError::not_found("Cart"))?;
    Ok(Json(ApiResponse::success(view)))
}

/// DELETE /api/cart/{session_id}/items/{menu_item_id}
pub async fn remove_item(
    State(state): State<AppState>,
    Path((session_id, menu_item_id)): Path<(String, Uuid)>,
) -> ServiceResult<Json<ApiResponse<CartView>>> {
    if !state.carts.remove_line(&session_id, menu_item_id) {
        return Err(AppError::not_found("Cart item").into());
    }
    let view = state
        .carts
        .view(&session_id, state.tax_rate)
        .ok_or_else(|| AppError::not_found("Cart"))?;
    Ok(Json(ApiResponse::success(view)))
}

/// GET /api/cart/{session_id}
pub async fn get_cart(
    State(state): State<AppState>,
    Path(session_id): Path<String>,
) -> ServiceResult<Json<ApiResponse<CartView>>> {
    let view = state
        .carts
        .view(&session_id, state.tax_rate)
        .ok_or_else(|| AppError::not_found("Cart"))?;
    Ok(Json(ApiResponse::success(view)))
}

/// DELETE /api/cart/{session_id}
pub async fn clear_cart(
    State(state): State<AppState>,
    Path(session_id): Path<String>,
) -> Json<ApiResponse<()>> {
    state.carts.clear(&session_id);
    Json(ApiResponse::ok())
}
