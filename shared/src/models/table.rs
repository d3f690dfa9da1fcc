use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Dining table record
///
/// `qr_code` is an opaque token mapping a physical table to an ordering
/// session. It is immutable once issued so printed codes never need
/// reprinting; updates may touch `table_number` and `active` only.
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct Table {
    pub id: Uuid,
    pub restaurant_id: Uuid,
    pub table_number: String,
    pub qr_code: String,
    pub active: bool,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct TableCreate {
    pub table_number: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct TableUpdate {
    pub table_number: Option<String>,
    pub active: Option<bool>,
}
