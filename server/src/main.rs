//! dinetap-server — QR-code restaurant ordering backend
//!
//! Long-running service that:
//! - Resolves table QR codes into customer ordering sessions
//! - Holds session carts and converts them into durable orders
//! - Reconciles Stripe payment webhooks against orders and payments
//! - Generates invoices exactly once per paid order
//! - Feeds admin/kitchen dashboards and API-key-scoped POS integrations

mod api;
mod auth;
mod cart;
mod config;
mod db;
mod error;
mod invoice;
mod live;
mod state;
mod stripe;

use config::Config;
use state::AppState;

type BoxError = Box<dyn std::error::Error + Send + Sync>;

#[tokio::main]
async fn main() -> Result<(), BoxError> {
    // Load .env file
    let _ = dotenvy::dotenv();

    // Initialize tracing
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "dinetap_server=info,tower_http=info".into()),
        )
        .init();

    let config = Config::from_env()?;
    tracing::info!("Starting dinetap-server (env: {})", config.environment);

    let state = AppState::new(&config).await?;

    // Reap abandoned session carts so the in-memory store stays bounded
    let carts = state.carts.clone();
    tokio::spawn(async move {
        let mut tick = tokio::time::interval(std::time::Duration::from_secs(600));
        loop {
            tick.tick().await;
            let evicted = carts.sweep(cart::SESSION_TTL);
            if evicted > 0 {
                tracing::debug!(evicted, "Evicted stale cart sessions");
            }
        }
    });

    let app = api::create_router(state);

    let http_addr = format!("0.0.0.0:{}", config.http_port);
    let listener = tokio::net::TcpListener::bind(&http_addr).await?;
    tracing::info!("dinetap-server listening on {http_addr}");

    axum::serve(listener, app).await?;
    Ok(())
}
