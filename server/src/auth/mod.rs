//! API-key authentication for the machine-facing POS surface

mod api_key;
mod middleware;

pub use api_key::generate_api_key;
pub use middleware::{RestaurantIdentity, require_api_key};
