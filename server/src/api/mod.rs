//! HTTP API routes
//!
//! Three surfaces share one router:
//! - customer/admin JSON API under `/api/` (admin auth is fronted by an
//!   external identity proxy, so no in-process login here)
//! - machine-facing POS API under `/api/pos/`, gated by `X-Api-Key`
//! - the Stripe webhook at `/stripe/webhook` (raw body, signature-verified)

pub mod cart;
pub mod catalog;
pub mod events;
pub mod health;
pub mod invoices;
pub mod orders;
pub mod payments;
pub mod pos;
pub mod stripe_webhook;

use axum::routing::{delete, get, patch, post};
use axum::{Router, middleware};
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

use crate::auth::require_api_key;
use crate::state::AppState;

/// Create the combined router
pub fn create_router(state: AppState) -> Router {
    // Customer session: QR resolution, menu browsing, carts
    let customer = Router::new()
        .route("/api/qr/{qr_code}", get(catalog::resolve_qr))
        .route("/api/restaurants/{id}/menu", get(catalog::get_menu))
        .route("/api/cart/{session_id}", get(cart::get_cart))
        .route("/api/cart/{session_id}", delete(cart::clear_cart))
        .route("/api/cart/{session_id}/items", post(cart::add_item))
        .route(
            "/api/cart/{session_id}/items/{menu_item_id}",
            patch(cart::set_quantity),
        )
        .route(
            "/api/cart/{session_id}/items/{menu_item_id}",
            delete(cart::remove_item),
        );

    // Order workflow, payments, invoices
    let order_flow = Router::new()
        .route("/api/orders", post(orders::create_order))
        .route("/api/orders/{id}", get(orders::get_order))
        .route("/api/orders/{id}/status", patch(orders::update_order_status))
        .route(
            "/api/orders/{id}/payment-intent",
            post(payments::create_payment_intent),
        )
        .route("/api/orders/{id}/payment", get(payments::get_payment_status))
        .route("/api/orders/{id}/invoice", post(invoices::create_invoice))
        .route("/api/orders/{id}/invoice", get(invoices::get_invoice));

    // Admin: catalog management and live dashboards
    let admin = Router::new()
        .route("/api/restaurants/{id}", get(catalog::get_restaurant))
        .route("/api/restaurants/{id}", patch(catalog::update_restaurant))
        .route("/api/restaurants/{id}/api-key", post(catalog::issue_api_key))
        .route("/api/restaurants/{id}/tables", get(catalog::list_tables))
        .route("/api/restaurants/{id}/tables", post(catalog::create_table))
        .route(
            "/api/restaurants/{id}/tables/{table_id}",
            patch(catalog::update_table),
        )
        .route(
            "/api/restaurants/{id}/tables/{table_id}",
            delete(catalog::delete_table),
        )
        .route("/api/restaurants/{id}/menu/full", get(catalog::get_full_menu))
        .route(
            "/api/restaurants/{id}/categories",
            post(catalog::create_category),
        )
        .route(
            "/api/restaurants/{id}/categories/{category_id}",
            patch(catalog::update_category),
        )
        .route(
            "/api/restaurants/{id}/categories/{category_id}",
            delete(catalog::delete_category),
        )
        .route("/api/restaurants/{id}/items", post(catalog::create_item))
        .route(
            "/api/restaurants/{id}/items/{item_id}",
            patch(catalog::update_item),
        )
        .route(
            "/api/restaurants/{id}/items/{item_id}",
            delete(catalog::delete_item),
        )
        .route("/api/restaurants/{id}/orders", get(orders::list_orders))
        .route("/api/restaurants/{id}/events", get(events::order_events));

    // POS integration, scoped to the API key's restaurant
    let pos_routes = Router::new()
        .route("/api/pos/menu", get(pos::get_menu))
        .route("/api/pos/orders", get(pos::list_orders))
        .route("/api/pos/orders/{id}", get(pos::get_order))
        .route("/api/pos/orders/{id}/status", patch(pos::update_order_status))
        .route(
            "/api/pos/items/{id}/availability",
            patch(pos::set_item_availability),
        )
        .layer(middleware::from_fn_with_state(
            state.clone(),
            require_api_key,
        ));

    // Stripe webhook (signature-verified, raw body)
    let webhook = Router::new().route("/stripe/webhook", post(stripe_webhook::handle_webhook));

    Router::new()
        .route("/health", get(health::health_check))
        .merge(customer)
        .merge(order_flow)
        .merge(admin)
        .merge(pos_routes)
        .merge(webhook)
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .with_state(state)
}
