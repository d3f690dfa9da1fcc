//! Server configuration

use rust_decimal::Decimal;
use std::str::FromStr;

type BoxError = Box<dyn std::error::Error + Send + Sync>;

/// Server configuration, loaded from environment variables
#[derive(Debug, Clone)]
pub struct Config {
    /// PostgreSQL connection URL
    pub database_url: String,
    /// HTTP port
    pub http_port: u16,
    /// Environment: development | staging | production
    pub environment: String,
    /// Stripe secret key
    pub stripe_secret_key: String,
    /// Stripe webhook signing secret
    pub stripe_webhook_secret: String,
    /// Sales tax rate applied by the cart (e.g. 0.10)
    pub tax_rate: Decimal,
    /// ISO currency code for payment intents
    pub currency: String,
}

impl Config {
    /// Require a secret env var: must be set and non-empty in non-development environments.
    fn require_secret(name: &str, environment: &str) -> Result<String, BoxError> {
        let val = match std::env::var(name) {
            Ok(v) => v,
            Err(_) => {
                if environment != "development" {
                    return Err(format!("{name} must be set in {environment} environment").into());
                }
                format!("dev-{name}-not-for-production")
            }
        };
        if val.is_empty() && environment != "development" {
            return Err(format!("{name} must not be empty in {environment} environment").into());
        }
        Ok(val)
    }

    /// Load configuration from environment variables
    pub fn from_env() -> Result<Self, BoxError> {
        let environment = std::env::var("ENVIRONMENT").unwrap_or_else(|_| "development".into());

        let tax_rate = match std::env::var("TAX_RATE") {
            Ok(v) => Decimal::from_str(&v).map_err(|e| format!("invalid TAX_RATE: {e}"))?,
            Err(_) => Decimal::new(10, 2), // 0.10
        };

        Ok(Self {
            database_url: std::env::var("DATABASE_URL").map_err(|_| "DATABASE_URL must be set")?,
            http_port: std::env::var("HTTP_PORT")
                .ok()
                .and_then(|p| p.parse().ok())
                .unwrap_or(8080),
            stripe_secret_key: Self::require_secret("STRIPE_SECRET_KEY", &environment)?,
            stripe_webhook_secret: Self::require_secret("STRIPE_WEBHOOK_SECRET", &environment)?,
            tax_rate,
            currency: std::env::var("CURRENCY").unwrap_or_else(|_| "usd".into()),
            environment,
        })
    }
}
