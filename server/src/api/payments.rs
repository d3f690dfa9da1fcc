//! Payment intent endpoints
//!
//! `create_payment_intent` is safe to call repeatedly before a charge
//! succeeds: an already-succeeded payment is a hard conflict (double
//! charge guard), an open payment is returned as-is instead of minting
//! a second intent at the provider.

use axum::Json;
use axum::extract::{Path, State};
use serde::Serialize;
use shared::error::{ApiResponse, AppError, ErrorCode};
use shared::models::{Payment, PaymentStatus};
use uuid::Uuid;

use crate::db;
use crate::error::ServiceResult;
use crate::state::AppState;
use crate::stripe;

#[derive(Debug, Serialize)]
pub struct PaymentIntentResponse {
    pub payment_id: Uuid,
    pub client_secret: String,
    pub amount: rust_decimal::Decimal,
}

/// POST /api/orders/{id}/payment-intent
pub async fn create_payment_intent(
    State(state): State<AppState>,
    Path(order_id): Path<Uuid>,
) -> ServiceResult<Json<ApiResponse<PaymentIntentResponse>>> {
    let order = db::orders::find_by_id(&state.pool, order_id)
        .await?
        .ok_or_else(|| AppError::new(ErrorCode::OrderNotFound))?;

    if db::payments::find_succeeded_by_order(&state.pool, order_id)
        .await?
        .is_some()
    {
        return Err(AppError::new(ErrorCode::OrderAlreadyPaid).into());
    }

    // Reuse a still-open intent rather than creating a duplicate
    if let Some(open) = db::payments::find_open_by_order(&state.pool, order_id).await? {
        if let Some(client_secret) = open.stripe_client_secret.clone() {
            tracing::debug!(order_id = %order_id, payment_id = %open.id, "Reusing open payment intent");
            return Ok(Json(ApiResponse::success(PaymentIntentResponse {
                payment_id: open.id,
                client_secret,
                amount: open.amount,
            })));
        }
    }

    let intent = stripe::create_payment_intent(
        &state.stripe_secret_key,
        order.total,
        &state.currency,
        order.id,
        order.restaurant_id,
        order.table_id,
        &format!("Order {}", order.id),
    )
    .await
    .map_err(|e| {
        tracing::error!(order_id = %order_id, error = %e, "Stripe payment intent creation failed");
        AppError::new(ErrorCode::PaymentSetupFailed)
    })?;

    let inserted = db::payments::create(
        &state.pool,
        order_id,
        &intent.id,
        &intent.client_secret,
        order.total,
    )
    .await?;
    let Some(payment) = inserted else {
        // A concurrent call won the open-payment slot; hand back the
        // winner's intent. Our freshly minted one is never confirmed
        // and expires at the provider.
        tracing::debug!(order_id = %order_id, "Lost payment insert race, reusing winner");
        return match db::payments::find_open_by_order(&state.pool, order_id).await? {
            Some(open) => {
                let client_secret = open
                    .stripe_client_secret
                    .clone()
                    .ok_or_else(|| AppError::internal("Open payment without client secret"))?;
                Ok(Json(ApiResponse::success(PaymentIntentResponse {
                    payment_id: open.id,
                    client_secret,
                    amount: open.amount,
                })))
            }
            // No open payment left means the winner already settled
            None => Err(AppError::new(ErrorCode::OrderAlreadyPaid).into()),
        };
    };
    tracing::info!(
        order_id = %order_id,
        payment_id = %payment.id,
        amount = %payment.amount,
        "Payment intent created"
    );

    Ok(Json(ApiResponse::success(PaymentIntentResponse {
        payment_id: payment.id,
        client_secret: intent.client_secret,
        amount: payment.amount,
    })))
}

#[derive(Debug, Serialize)]
pub struct PaymentStatusResponse {
    pub status: PaymentStatus,
    pub payments: Vec<Payment>,
}

/// GET /api/orders/{id}/payment
///
/// Summarizes an order's payment state: succeeded wins, otherwise the
/// most recent payment's status, 404 when no payment was ever created.
pub async fn get_payment_status(
    State(state): State<AppState>,
    Path(order_id): Path<Uuid>,
) -> ServiceResult<Json<ApiResponse<PaymentStatusResponse>>> {
    let payments = db::payments::list_by_order(&state.pool, order_id).await?;
    let status = payments
        .iter()
        .find(|p| p.status == PaymentStatus::Succeeded)
        .or_else(|| payments.last())
        .map(|p| p.status)
        .ok_or_else(|| AppError::new(ErrorCode::PaymentNotFound))?;
    Ok(Json(ApiResponse::success(PaymentStatusResponse {
        status,
        payments,
    })))
}
