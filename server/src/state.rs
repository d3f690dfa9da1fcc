//! Shared application state

use sqlx::PgPool;
use sqlx::postgres::PgPoolOptions;
use std::sync::Arc;

use crate::cart::CartStore;
use crate::config::Config;
use crate::live::OrderEvents;

type BoxError = Box<dyn std::error::Error + Send + Sync>;

/// State handed to every handler. Cheap to clone: the pool and the
/// in-memory stores are all handle types.
#[derive(Clone)]
pub struct AppState {
    pub pool: PgPool,
    pub stripe_secret_key: String,
    pub stripe_webhook_secret: String,
    pub tax_rate: rust_decimal::Decimal,
    pub currency: String,
    pub carts: Arc<CartStore>,
    pub events: OrderEvents,
}

impl AppState {
    /// Connect to the database, apply pending migrations, and assemble
    /// the shared state.
    pub async fn new(config: &Config) -> Result<Self, BoxError> {
        let pool = PgPoolOptions::new()
            .max_connections(10)
            .connect(&config.database_url)
            .await?;

        sqlx::migrate!("./migrations").run(&pool).await?;
        tracing::info!("Database connected and migrations applied");

        Ok(Self {
            pool,
            stripe_secret_key: config.stripe_secret_key.clone(),
            stripe_webhook_secret: config.stripe_webhook_secret.clone(),
            tax_rate: config.tax_rate,
            currency: config.currency.clone(),
            carts: Arc::new(CartStore::new()),
            events: OrderEvents::new(),
        })
    }
}
