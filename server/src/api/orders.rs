//! Order workflow endpoints

use axum::Json;
use axum::extract::{Path, Query, State};
use serde::Deserialize;
use shared::error::{ApiResponse, AppError, ErrorCode};
use shared::models::{Order, OrderStatus};
use uuid::Uuid;

use crate::db;
use crate::db::orders::{NewOrder, NewOrderItem, OrderDetail, OrderSummary};
use crate::error::ServiceResult;
use crate::live::OrderEvent;
use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct CreateOrderRequest {
    /// Cart session to convert into an order
    pub session_id: String,
    pub special_instructions: Option<String>,
}

/// POST /api/orders
///
/// Converts a session cart into a durable order plus line items. The
/// cart's totals are persisted verbatim. On success the cart is cleared
/// and an event is published for dashboards.
pub async fn create_order(
    State(state): State<AppState>,
    Json(req): Json<CreateOrderRequest>,
) -> ServiceResult<Json<ApiResponse<Order>>> {
    let view = state
        .carts
        .view(&req.session_id, state.tax_rate)
        .ok_or_else(|| AppError::not_found("Cart"))?;
    if view.cart.lines.is_empty() {
        return Err(AppError::new(ErrorCode::OrderEmpty).into());
    }

    // The table must still exist and be active, and belong to the cart's
    // restaurant; stale QR sessions fail here before any write.
    let table = db::tables::find_by_id(&state.pool, view.cart.table_id)
        .await?
        .filter(|t| t.restaurant_id == view.cart.restaurant_id && t.active)
        .ok_or_else(|| AppError::new(ErrorCode::TableNotFound))?;

    let items: Vec<NewOrderItem> = view
        .cart
        .lines
        .iter()
        .map(|line| NewOrderItem {
            menu_item_id: Some(line.menu_item_id),
            item_name: line.item_name.clone(),
            quantity: line.quantity,
            price_at_time: line.price,
            special_instructions: line.special_instructions.clone(),
        })
        .collect();

    let order_id = db::orders::create(
        &state.pool,
        &NewOrder {
            restaurant_id: view.cart.restaurant_id,
            table_id: table.id,
            items: &items,
            special_instructions: req.special_instructions.as_deref(),
            subtotal: view.subtotal,
            tax: view.tax,
            total: view.total,
        },
    )
    .await?;

    let order = db::orders::find_by_id(&state.pool, order_id)
        .await?
        .ok_or_else(|| AppError::new(ErrorCode::OrderNotFound))?;

    state.carts.clear(&req.session_id);
    state.events.publish(OrderEvent {
        order_id: order.id,
        restaurant_id: order.restaurant_id,
        status: order.status,
    });
    tracing::info!(
        order_id = %order.id,
        restaurant_id = %order.restaurant_id,
        total = %order.total,
        "Order created"
    );

    Ok(Json(ApiResponse::success(order)))
}

/// GET /api/orders/{id}
pub async fn get_order(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> ServiceResult<Json<ApiResponse<OrderDetail>>> {
    let detail = db::orders::find_detail(&state.pool, id)
        .await?
        .ok_or_else(|| AppError::new(ErrorCode::OrderNotFound))?;
    Ok(Json(ApiResponse::success(detail)))
}

#[derive(Debug, Deserialize)]
pub struct UpdateStatusRequest {
    pub status: OrderStatus,
    /// Staff override: permits transitions the state machine would
    /// otherwise reject (out of a terminal state, or forcing confirmed)
    #[serde(default)]
    pub force: bool,
    /// When present, the update only applies if the order's version
    /// still matches (optimistic concurrency)
    pub expected_version: Option<i32>,
}

/// PATCH /api/orders/{id}/status
pub async fn update_order_status(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(req): Json<UpdateStatusRequest>,
) -> ServiceResult<Json<ApiResponse<Order>>> {
    let order = db::orders::find_by_id(&state.pool, id)
        .await?
        .ok_or_else(|| AppError::new(ErrorCode::OrderNotFound))?;

    if !req.force && !order.status.manual_transition_allowed(req.status) {
        return Err(AppError::with_message(
            ErrorCode::InvalidStatusTransition,
            format!("Cannot move order from {} to {}", order.status, req.status),
        )
        .into());
    }

    let updated = db::orders::update_status(&state.pool, id, req.status, req.expected_version)
        .await?;
    if !updated {
        // The row exists, so the only way to miss is a version mismatch
        return Err(AppError::new(ErrorCode::StaleOrderVersion).into());
    }

    let order = db::orders::find_by_id(&state.pool, id)
        .await?
        .ok_or_else(|| AppError::new(ErrorCode::OrderNotFound))?;
    state.events.publish(OrderEvent {
        order_id: order.id,
        restaurant_id: order.restaurant_id,
        status: order.status,
    });
    tracing::info!(order_id = %id, status = %order.status, force = req.force, "Order status updated");

    Ok(Json(ApiResponse::success(order)))
}

#[derive(Debug, Deserialize)]
pub struct ListOrdersQuery {
    pub status: Option<OrderStatus>,
    pub limit: Option<i64>,
}

/// GET /api/restaurants/{id}/orders
pub async fn list_orders(
    State(state): State<AppState>,
    Path(restaurant_id): Path<Uuid>,
    Query(query): Query<ListOrdersQuery>,
) -> ServiceResult<Json<ApiResponse<Vec<OrderSummary>>>> {
    let limit = query.limit.unwrap_or(50).clamp(1, 200);
    let orders =
        db::orders::list_for_restaurant(&state.pool, restaurant_id, query.status, limit).await?;
    Ok(Json(ApiResponse::success(orders)))
}
