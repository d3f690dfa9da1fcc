//! Invoice endpoints

use axum::Json;
use axum::extract::{Path, State};
use shared::error::{ApiResponse, AppError, ErrorCode};
use shared::models::Invoice;
use uuid::Uuid;

use crate::db;
use crate::error::ServiceResult;
use crate::invoice;
use crate::state::AppState;

/// POST /api/orders/{id}/invoice
///
/// Idempotent: a repeat call returns the existing invoice with the same
/// invoice_number.
pub async fn create_invoice(
    State(state): State<AppState>,
    Path(order_id): Path<Uuid>,
) -> ServiceResult<Json<ApiResponse<Invoice>>> {
    let invoice = invoice::generate_for_order(&state.pool, order_id).await?;
    Ok(Json(ApiResponse::success(invoice)))
}

/// GET /api/orders/{id}/invoice
pub async fn get_invoice(
    State(state): State<AppState>,
    Path(order_id): Path<Uuid>,
) -> ServiceResult<Json<ApiResponse<Invoice>>> {
    let invoice = db::invoices::find_by_order(&state.pool, order_id)
        .await?
        .ok_or_else(|| AppError::new(ErrorCode::InvoiceNotFound))?;
    Ok(Json(ApiResponse::success(invoice)))
}
