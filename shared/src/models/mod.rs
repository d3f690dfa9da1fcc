//! Domain models for DineTap
//!
//! Row-level records shared between the server's data access layer and
//! API payloads. Monetary fields are `rust_decimal::Decimal` — never
//! floats — and are persisted verbatim, not recomputed after creation.

pub mod invoice;
pub mod menu;
pub mod order;
pub mod payment;
pub mod restaurant;
pub mod table;

pub use invoice::Invoice;
pub use menu::{MenuCategory, MenuItem};
pub use order::{Order, OrderItem, OrderStatus};
pub use payment::{Payment, PaymentStatus};
pub use restaurant::Restaurant;
pub use table::Table;
