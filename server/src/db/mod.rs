//! Database access layer
//!
//! Free functions over `&PgPool`, one module per entity. Found/not-found
//! is expressed with `fetch_optional`; infrastructure faults surface as
//! `sqlx::Error` for the service layer to wrap.

pub mod invoices;
pub mod menu;
pub mod orders;
pub mod payments;
pub mod restaurants;
pub mod tables;
pub mod webhook_events;
