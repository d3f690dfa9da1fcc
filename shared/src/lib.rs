//! Shared types for DineTap
//!
//! Domain models, order lifecycle types, error codes, and the unified
//! API response envelope used by the server crate.

pub mod error;
pub mod models;

// Re-exports
pub use http;
pub use serde::{Deserialize, Serialize};
