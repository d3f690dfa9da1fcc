use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Invoice record
///
/// `order_id` is unique: at most one invoice per order. `invoice_number`
/// comes from a dedicated database sequence, so numbers are strictly
/// increasing and never reused even when generation is retried.
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct Invoice {
    pub id: Uuid,
    pub order_id: Uuid,
    pub invoice_number: String,
    /// Rendered document reference (data-URL encoded HTML)
    pub pdf_url: Option<String>,
    pub created_at: DateTime<Utc>,
}
