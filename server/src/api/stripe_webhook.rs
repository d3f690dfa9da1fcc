//! Stripe webhook handler
//!
//! POST /stripe/webhook — raw body for HMAC signature verification.
//!
//! Everything after the signature check is written to be idempotent:
//! the event-id ledger swallows redeliveries, the payment update
//! reapplies the same values harmlessly, order confirmation only fires
//! from `pending`, and invoice creation is one-per-order. An invoice
//! failure is logged but still answers 200, otherwise Stripe would
//! retry the whole event and re-run side effects that already landed.
//! A 5xx answer releases the event's ledger claim first, so the retry
//! it provokes is processed instead of skipped as a duplicate.

use axum::body::Bytes;
use axum::extract::State;
use axum::http::{HeaderMap, StatusCode};
use shared::models::OrderStatus;

use crate::live::OrderEvent;
use crate::state::AppState;
use crate::{db, invoice, stripe};

pub async fn handle_webhook(
    State(state): State<AppState>,
    headers: HeaderMap,
    body: Bytes,
) -> StatusCode {
    let sig_header = match headers
        .get("stripe-signature")
        .and_then(|v| v.to_str().ok())
    {
        Some(s) => s,
        None => {
            tracing::warn!("Missing Stripe-Signature header");
            return StatusCode::BAD_REQUEST;
        }
    };

    if let Err(e) = stripe::verify_webhook_signature(&body, sig_header, &state.stripe_webhook_secret)
    {
        tracing::warn!(error = e, "Webhook signature verification failed");
        return StatusCode::BAD_REQUEST;
    }

    let event: serde_json::Value = match serde_json::from_slice(&body) {
        Ok(v) => v,
        Err(e) => {
            tracing::warn!(%e, "Failed to parse webhook JSON");
            return StatusCode::BAD_REQUEST;
        }
    };

    let event_type = event["type"].as_str().unwrap_or("");
    let event_id = match event["id"].as_str() {
        Some(id) => id,
        None => {
            tracing::warn!("Webhook event missing id");
            return StatusCode::BAD_REQUEST;
        }
    };
    tracing::info!(event_id, event_type, "Received Stripe webhook");

    // Idempotency: claim the event id first, skip if already processed
    match db::webhook_events::record(&state.pool, event_id, event_type).await {
        Ok(true) => {}
        Ok(false) => {
            tracing::info!(event_id, "Duplicate webhook event, skipping");
            return StatusCode::OK;
        }
        Err(e) => {
            tracing::error!(%e, "DB error recording webhook event");
            return StatusCode::INTERNAL_SERVER_ERROR;
        }
    }

    let status = match event_type {
        "payment_intent.succeeded" => handle_payment_succeeded(&state, &event).await,
        "payment_intent.payment_failed" | "payment_intent.canceled" => {
            handle_payment_failed(&state, &event).await
        }
        _ => {
            tracing::debug!(event_type, "Unhandled webhook event type");
            StatusCode::OK
        }
    };

    // A failed event must not stay claimed: Stripe redelivers the same
    // event id, and the ledger would swallow that retry as a duplicate.
    if status.is_server_error() {
        if let Err(e) = db::webhook_events::release(&state.pool, event_id).await {
            tracing::error!(%e, event_id, "Failed to release webhook event after error");
        }
    }
    status
}

fn intent_id(event: &serde_json::Value) -> Option<&str> {
    event
        .get("data")
        .and_then(|d| d.get("object"))
        .and_then(|o| o["id"].as_str())
}

/// payment_intent.succeeded → payment succeeded, order confirmed, invoice
async fn handle_payment_succeeded(state: &AppState, event: &serde_json::Value) -> StatusCode {
    let Some(intent_id) = intent_id(event) else {
        tracing::warn!("payment_intent.succeeded missing intent id");
        return StatusCode::OK;
    };
    let payment_method = event
        .get("data")
        .and_then(|d| d.get("object"))
        .and_then(|o| o.get("payment_method_types"))
        .and_then(|t| t.as_array())
        .and_then(|a| a.first())
        .and_then(|v| v.as_str());

    let order_id =
        match db::payments::mark_succeeded_by_intent(&state.pool, intent_id, payment_method).await
        {
            Ok(Some(order_id)) => order_id,
            Ok(None) => {
                // An intent we never issued; acknowledge but flag it
                tracing::warn!(intent_id, "Success event for unknown payment intent");
                return StatusCode::OK;
            }
            Err(e) => {
                tracing::error!(%e, intent_id, "Failed to mark payment succeeded");
                return StatusCode::INTERNAL_SERVER_ERROR;
            }
        };

    match db::orders::confirm_if_pending(&state.pool, order_id).await {
        Ok(true) => {
            tracing::info!(order_id = %order_id, "Order confirmed (payment succeeded)");
            if let Ok(Some(order)) = db::orders::find_by_id(&state.pool, order_id).await {
                state.events.publish(OrderEvent {
                    order_id,
                    restaurant_id: order.restaurant_id,
                    status: OrderStatus::Confirmed,
                });
            }
        }
        Ok(false) => {
            tracing::debug!(order_id = %order_id, "Order already past pending");
        }
        Err(e) => {
            tracing::error!(%e, order_id = %order_id, "Failed to confirm order");
            return StatusCode::INTERNAL_SERVER_ERROR;
        }
    }

    // Invoice failure must not fail the webhook; creation is idempotent
    // and can be retried via POST /api/orders/{id}/invoice.
    if let Err(e) = invoice::generate_for_order(&state.pool, order_id).await {
        let app_err: shared::error::AppError = e.into();
        tracing::error!(
            order_id = %order_id,
            error = %app_err,
            "Invoice generation failed after payment; continuing"
        );
    }

    StatusCode::OK
}

/// payment_intent.payment_failed / .canceled → payment failed only.
/// The order stays as it is so the customer can retry payment.
async fn handle_payment_failed(state: &AppState, event: &serde_json::Value) -> StatusCode {
    let Some(intent_id) = intent_id(event) else {
        tracing::warn!("payment failure event missing intent id");
        return StatusCode::OK;
    };

    match db::payments::mark_failed_by_intent(&state.pool, intent_id).await {
        Ok(Some(order_id)) => {
            tracing::info!(order_id = %order_id, intent_id, "Payment marked failed");
            StatusCode::OK
        }
        Ok(None) => {
            // Unknown intent, or a late failure for an already-settled
            // payment; either way there is nothing to change.
            tracing::debug!(intent_id, "Failure event matched no open payment");
            StatusCode::OK
        }
        Err(e) => {
            tracing::error!(%e, intent_id, "Failed to mark payment failed");
            StatusCode::INTERNAL_SERVER_ERROR
        }
    }
}
