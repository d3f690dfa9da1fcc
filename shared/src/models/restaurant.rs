use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Restaurant record. Created once at setup, rarely mutated.
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct Restaurant {
    pub id: Uuid,
    pub name: String,
    pub logo_url: Option<String>,
    pub primary_color: String,
    /// Hex SHA-256 of the POS API secret; never exposed in responses
    #[serde(skip_serializing)]
    pub api_key_hash: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Mutable restaurant settings (admin surface)
#[derive(Debug, Clone, Deserialize)]
pub struct RestaurantUpdate {
    pub name: Option<String>,
    pub logo_url: Option<String>,
    pub primary_color: Option<String>,
}
