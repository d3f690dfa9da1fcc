//! HTTP status mapping for error codes

use super::codes::ErrorCode;
use http::StatusCode;

impl ErrorCode {
    /// Get the HTTP status code for this error code
    pub fn http_status(&self) -> StatusCode {
        match self {
            ErrorCode::Success => StatusCode::OK,

            // 400 Bad Request
            ErrorCode::ValidationFailed
            | ErrorCode::InvalidRequest
            | ErrorCode::RequiredField
            | ErrorCode::OrderEmpty => StatusCode::BAD_REQUEST,

            // 401 Unauthorized
            ErrorCode::NotAuthenticated | ErrorCode::InvalidApiKey => StatusCode::UNAUTHORIZED,

            // 404 Not Found
            ErrorCode::NotFound
            | ErrorCode::RestaurantNotFound
            | ErrorCode::OrderNotFound
            | ErrorCode::InvoiceNotFound
            | ErrorCode::PaymentNotFound
            | ErrorCode::MenuItemNotFound
            | ErrorCode::CategoryNotFound
            | ErrorCode::TableNotFound => StatusCode::NOT_FOUND,

            // 409 Conflict
            ErrorCode::AlreadyExists
            | ErrorCode::OrderAlreadyPaid
            | ErrorCode::StaleOrderVersion
            | ErrorCode::CategoryHasItems => StatusCode::CONFLICT,

            // 422 Unprocessable Entity
            ErrorCode::InvalidStatusTransition => StatusCode::UNPROCESSABLE_ENTITY,

            // 502 Bad Gateway (upstream provider)
            ErrorCode::PaymentSetupFailed => StatusCode::BAD_GATEWAY,

            // 500 Internal Server Error
            ErrorCode::Unknown
            | ErrorCode::PaymentFailed
            | ErrorCode::InternalError
            | ErrorCode::DatabaseError
            | ErrorCode::ConfigError => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_http_status_mapping() {
        assert_eq!(ErrorCode::OrderEmpty.http_status(), StatusCode::BAD_REQUEST);
        assert_eq!(
            ErrorCode::OrderNotFound.http_status(),
            StatusCode::NOT_FOUND
        );
        assert_eq!(
            ErrorCode::OrderAlreadyPaid.http_status(),
            StatusCode::CONFLICT
        );
        assert_eq!(
            ErrorCode::InvalidApiKey.http_status(),
            StatusCode::UNAUTHORIZED
        );
        assert_eq!(
            ErrorCode::InternalError.http_status(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }
}
