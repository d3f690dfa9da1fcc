//! Machine-facing POS endpoints
//!
//! Every handler takes a [`RestaurantIdentity`] injected by the API-key
//! middleware and scopes its queries to that restaurant. A foreign
//! order id answers 404, never 403, so existence does not leak across
//! restaurant boundaries.

use axum::Json;
use axum::extract::{Path, Query, State};
use serde::Deserialize;
use shared::error::{ApiResponse, AppError, ErrorCode};
use shared::models::menu::{MenuCategoryWithItems, MenuItem};
use shared::models::{Order, OrderStatus};
use uuid::Uuid;

use crate::auth::RestaurantIdentity;
use crate::db;
use crate::db::orders::OrderSummary;
use crate::error::ServiceResult;
use crate::live::OrderEvent;
use crate::state::AppState;

/// GET /api/pos/menu (includes unavailable items)
pub async fn get_menu(
    State(state): State<AppState>,
    identity: RestaurantIdentity,
) -> ServiceResult<Json<ApiResponse<Vec<MenuCategoryWithItems>>>> {
    let menu = db::menu::list_menu(&state.pool, identity.restaurant_id, false).await?;
    Ok(Json(ApiResponse::success(menu)))
}

#[derive(Debug, Deserialize)]
pub struct PosOrdersQuery {
    pub status: Option<OrderStatus>,
    pub limit: Option<i64>,
}

/// GET /api/pos/orders
pub async fn list_orders(
    State(state): State<AppState>,
    identity: RestaurantIdentity,
    Query(query): Query<PosOrdersQuery>,
) -> ServiceResult<Json<ApiResponse<Vec<OrderSummary>>>> {
    let limit = query.limit.unwrap_or(50).clamp(1, 200);
    let orders =
        db::orders::list_for_restaurant(&state.pool, identity.restaurant_id, query.status, limit)
            .await?;
    Ok(Json(ApiResponse::success(orders)))
}

/// GET /api/pos/orders/{id}
pub async fn get_order(
    State(state): State<AppState>,
    identity: RestaurantIdentity,
    Path(id): Path<Uuid>,
) -> ServiceResult<Json<ApiResponse<Order>>> {
    let order = db::orders::find_scoped(&state.pool, id, identity.restaurant_id)
        .await?
        .ok_or_else(|| AppError::new(ErrorCode::OrderNotFound))?;
    Ok(Json(ApiResponse::success(order)))
}

#[derive(Debug, Deserialize)]
pub struct PosStatusRequest {
    pub status: OrderStatus,
    pub expected_version: Option<i32>,
}

/// PATCH /api/pos/orders/{id}/status
///
/// Same state machine as the admin surface but never with override:
/// external POS systems cannot force-unlock terminal orders.
pub async fn update_order_status(
    State(state): State<AppState>,
    identity: RestaurantIdentity,
    Path(id): Path<Uuid>,
    Json(req): Json<PosStatusRequest>,
) -> ServiceResult<Json<ApiResponse<Order>>> {
    let order = db::orders::find_scoped(&state.pool, id, identity.restaurant_id)
        .await?
        .ok_or_else(|| AppError::new(ErrorCode::OrderNotFound))?;

    if !order.status.manual_transition_allowed(req.status) {
        return Err(AppError::with_message(
            ErrorCode::InvalidStatusTransition,
            format!("Cannot move order from {} to {}", order.status, req.status),
        )
        .into());
    }

    if !db::orders::update_status(&state.pool, id, req.status, req.expected_version).await? {
        return Err(AppError::new(ErrorCode::StaleOrderVersion).into());
    }

    let order = db::orders::find_scoped(&state.pool, id, identity.restaurant_id)
        .await?
        .ok_or_else(|| AppError::new(ErrorCode::OrderNotFound))?;
    state.events.publish(OrderEvent {
        order_id: order.id,
        restaurant_id: order.restaurant_id,
        status: order.status,
    });
    Ok(Json(ApiResponse::success(order)))
}

#[derive(Debug, Deserialize)]
pub struct AvailabilityRequest {
    pub available: bool,
}

/// PATCH /api/pos/items/{id}/availability
pub async fn set_item_availability(
    State(state): State<AppState>,
    identity: RestaurantIdentity,
    Path(id): Path<Uuid>,
    Json(req): Json<AvailabilityRequest>,
) -> ServiceResult<Json<ApiResponse<MenuItem>>> {
    let item =
        db::menu::set_item_availability(&state.pool, id, identity.restaurant_id, req.available)
            .await?
            .ok_or_else(|| AppError::new(ErrorCode::MenuItemNotFound))?;
    tracing::info!(item_id = %id, available = req.available, "Menu item availability changed");
    Ok(Json(ApiResponse::success(item)))
}
