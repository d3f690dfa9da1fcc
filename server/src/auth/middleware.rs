//! API-key middleware
//!
//! Validates `X-Api-Key` against the owning restaurant's stored hash
//! and injects a [`RestaurantIdentity`] into request extensions. All
//! failures answer the same way so a caller cannot distinguish an
//! unknown restaurant from a wrong secret.

use axum::{
    extract::{FromRequestParts, Request, State},
    http::request::Parts,
    middleware::Next,
    response::Response,
};
use shared::error::{AppError, ErrorCode};
use uuid::Uuid;

use super::api_key::ApiKey;
use crate::state::AppState;

pub const API_KEY_HEADER: &str = "x-api-key";

/// The restaurant a validated API key belongs to. Every POS query is
/// scoped to this id.
#[derive(Debug, Clone, Copy)]
pub struct RestaurantIdentity {
    pub restaurant_id: Uuid,
}

pub async fn require_api_key(
    State(state): State<AppState>,
    mut req: Request,
    next: Next,
) -> Result<Response, AppError> {
    let header = req
        .headers()
        .get(API_KEY_HEADER)
        .and_then(|h| h.to_str().ok());

    let Some(raw) = header else {
        tracing::warn!(uri = %req.uri(), "POS request without API key");
        return Err(AppError::new(ErrorCode::NotAuthenticated));
    };

    let Some(key) = ApiKey::parse(raw) else {
        tracing::warn!(uri = %req.uri(), "Malformed API key");
        return Err(AppError::new(ErrorCode::InvalidApiKey));
    };

    let restaurant = crate::db::restaurants::find_by_id(&state.pool, key.restaurant_id)
        .await
        .map_err(|e| {
            tracing::error!(error = %e, "API key lookup failed");
            AppError::new(ErrorCode::InternalError)
        })?;

    let valid = restaurant
        .and_then(|r| r.api_key_hash)
        .is_some_and(|stored| stored == key.hash());
    if !valid {
        tracing::warn!(restaurant_id = %key.restaurant_id, "API key rejected");
        return Err(AppError::new(ErrorCode::InvalidApiKey));
    }

    req.extensions_mut().insert(RestaurantIdentity {
        restaurant_id: key.restaurant_id,
    });
    Ok(next.run(req).await)
}

impl<S: Send + Sync> FromRequestParts<S> for RestaurantIdentity {
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        parts
            .extensions
            .get::<RestaurantIdentity>()
            .copied()
            .ok_or_else(|| AppError::new(ErrorCode::NotAuthenticated))
    }
}
