//! Unified error codes for DineTap
//!
//! Error codes are organized by category:
//! - 0xxx: General errors
//! - 1xxx: Authentication errors
//! - 3xxx: Restaurant errors
//! - 4xxx: Order errors (45xx: invoices)
//! - 5xxx: Payment errors
//! - 6xxx: Menu errors
//! - 7xxx: Table errors
//! - 9xxx: System errors

use serde::{Deserialize, Serialize};
use std::fmt;

/// Unified error code enum
///
/// All error codes are represented as u16 values for efficient serialization
/// and cross-language compatibility (Rust, TypeScript, etc.)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(into = "u16", try_from = "u16")]
#[repr(u16)]
pub enum ErrorCode {
    // ==================== 0xxx: General ====================
    /// Operation completed successfully
    Success = 0,
    /// Unknown error
    Unknown = 1,
    /// Validation failed
    ValidationFailed = 2,
    /// Resource not found
    NotFound = 3,
    /// Resource already exists
    AlreadyExists = 4,
    /// Invalid request
    InvalidRequest = 5,
    /// Required field missing
    RequiredField = 7,

    // ==================== 1xxx: Auth ====================
    /// Caller is not authenticated
    NotAuthenticated = 1001,
    /// API key is missing or invalid
    InvalidApiKey = 1002,

    // ==================== 3xxx: Restaurant ====================
    /// Restaurant not found
    RestaurantNotFound = 3001,

    // ==================== 4xxx: Order ====================
    /// Order not found
    OrderNotFound = 4001,
    /// Order has already been paid
    OrderAlreadyPaid = 4002,
    /// Order is empty
    OrderEmpty = 4007,
    /// Requested status transition is not allowed
    InvalidStatusTransition = 4008,
    /// Concurrent update rejected (stale version)
    StaleOrderVersion = 4009,
    /// Invoice not found
    InvoiceNotFound = 4501,

    // ==================== 5xxx: Payment ====================
    /// Payment processing failed
    PaymentFailed = 5001,
    /// Payment not found
    PaymentNotFound = 5002,
    /// Payment intent creation with the provider failed
    PaymentSetupFailed = 5003,

    // ==================== 6xxx: Menu ====================
    /// Menu item not found
    MenuItemNotFound = 6001,
    /// Category not found
    CategoryNotFound = 6101,
    /// Category has menu items
    CategoryHasItems = 6102,

    // ==================== 7xxx: Table ====================
    /// Table not found
    TableNotFound = 7001,

    // ==================== 9xxx: System ====================
    /// Internal server error
    InternalError = 9001,
    /// Database error
    DatabaseError = 9002,
    /// Configuration error
    ConfigError = 9005,
}

impl ErrorCode {
    /// Get the numeric code value
    #[inline]
    pub const fn code(&self) -> u16 {
        *self as u16
    }

    /// Check if this is a success code
    #[inline]
    pub const fn is_success(&self) -> bool {
        matches!(self, ErrorCode::Success)
    }

    /// Get the developer-facing English message for this error code
    pub const fn message(&self) -> &'static str {
        match self {
            // General
            ErrorCode::Success => "Operation completed successfully",
            ErrorCode::Unknown => "An unknown error occurred",
            ErrorCode::ValidationFailed => "Validation failed",
            ErrorCode::NotFound => "Resource not found",
            ErrorCode::AlreadyExists => "Resource already exists",
            ErrorCode::InvalidRequest => "Invalid request",
            ErrorCode::RequiredField => "Required field is missing",

            // Auth
            ErrorCode::NotAuthenticated => "Caller is not authenticated",
            ErrorCode::InvalidApiKey => "API key is missing or invalid",

            // Restaurant
            ErrorCode::RestaurantNotFound => "Restaurant not found",

            // Order
            ErrorCode::OrderNotFound => "Order not found",
            ErrorCode::OrderAlreadyPaid => "Order has already been paid",
            ErrorCode::OrderEmpty => "Order is empty",
            ErrorCode::InvalidStatusTransition => "Status transition is not allowed",
            ErrorCode::StaleOrderVersion => "Order was modified concurrently",
            ErrorCode::InvoiceNotFound => "Invoice not found",

            // Payment
            ErrorCode::PaymentFailed => "Payment processing failed",
            ErrorCode::PaymentNotFound => "Payment not found",
            ErrorCode::PaymentSetupFailed => "Payment intent creation failed",

            // Menu
            ErrorCode::MenuItemNotFound => "Menu item not found",
            ErrorCode::CategoryNotFound => "Category not found",
            ErrorCode::CategoryHasItems => "Category has associated menu items",

            // Table
            ErrorCode::TableNotFound => "Table not found",

            // System
            ErrorCode::InternalError => "Internal server error",
            ErrorCode::DatabaseError => "Database error",
            ErrorCode::ConfigError => "Configuration error",
        }
    }
}

impl From<ErrorCode> for u16 {
    #[inline]
    fn from(code: ErrorCode) -> Self {
        code.code()
    }
}

/// Error when converting from an invalid u16 to ErrorCode
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct InvalidErrorCode(pub u16);

impl fmt::Display for InvalidErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "invalid error code: {}", self.0)
    }
}

impl std::error::Error for InvalidErrorCode {}

impl TryFrom<u16> for ErrorCode {
    type Error = InvalidErrorCode;

    fn try_from(value: u16) -> Result<Self, Self::Error> {
        match value {
            // General
            0 => Ok(ErrorCode::Success),
            1 => Ok(ErrorCode::Unknown),
            2 => Ok(ErrorCode::ValidationFailed),
            3 => Ok(ErrorCode::NotFound),
            4 => Ok(ErrorCode::AlreadyExists),
            5 => Ok(ErrorCode::InvalidRequest),
            7 => Ok(ErrorCode::RequiredField),

            // Auth
            1001 => Ok(ErrorCode::NotAuthenticated),
            1002 => Ok(ErrorCode::InvalidApiKey),

            // Restaurant
            3001 => Ok(ErrorCode::RestaurantNotFound),

            // Order
            4001 => Ok(ErrorCode::OrderNotFound),
            4002 => Ok(ErrorCode::OrderAlreadyPaid),
            4007 => Ok(ErrorCode::OrderEmpty),
            4008 => Ok(ErrorCode::InvalidStatusTransition),
            4009 => Ok(ErrorCode::StaleOrderVersion),
            4501 => Ok(ErrorCode::InvoiceNotFound),

            // Payment
            5001 => Ok(ErrorCode::PaymentFailed),
            5002 => Ok(ErrorCode::PaymentNotFound),
            5003 => Ok(ErrorCode::PaymentSetupFailed),

            // Menu
            6001 => Ok(ErrorCode::MenuItemNotFound),
            6101 => Ok(ErrorCode::CategoryNotFound),
            6102 => Ok(ErrorCode::CategoryHasItems),

            // Table
            7001 => Ok(ErrorCode::TableNotFound),

            // System
            9001 => Ok(ErrorCode::InternalError),
            9002 => Ok(ErrorCode::DatabaseError),
            9005 => Ok(ErrorCode::ConfigError),

            _ => Err(InvalidErrorCode(value)),
        }
    }
}

impl fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.code())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_code_values() {
        assert_eq!(ErrorCode::Success.code(), 0);
        assert_eq!(ErrorCode::ValidationFailed.code(), 2);
        assert_eq!(ErrorCode::NotFound.code(), 3);
        assert_eq!(ErrorCode::InvalidApiKey.code(), 1002);
        assert_eq!(ErrorCode::RestaurantNotFound.code(), 3001);
        assert_eq!(ErrorCode::OrderNotFound.code(), 4001);
        assert_eq!(ErrorCode::OrderAlreadyPaid.code(), 4002);
        assert_eq!(ErrorCode::OrderEmpty.code(), 4007);
        assert_eq!(ErrorCode::InvoiceNotFound.code(), 4501);
        assert_eq!(ErrorCode::PaymentNotFound.code(), 5002);
        assert_eq!(ErrorCode::MenuItemNotFound.code(), 6001);
        assert_eq!(ErrorCode::TableNotFound.code(), 7001);
        assert_eq!(ErrorCode::InternalError.code(), 9001);
    }

    #[test]
    fn test_is_success() {
        assert!(ErrorCode::Success.is_success());
        assert!(!ErrorCode::OrderNotFound.is_success());
    }

    #[test]
    fn test_try_from_valid() {
        assert_eq!(ErrorCode::try_from(0), Ok(ErrorCode::Success));
        assert_eq!(ErrorCode::try_from(4001), Ok(ErrorCode::OrderNotFound));
        assert_eq!(ErrorCode::try_from(4501), Ok(ErrorCode::InvoiceNotFound));
        assert_eq!(ErrorCode::try_from(9001), Ok(ErrorCode::InternalError));
    }

    #[test]
    fn test_try_from_invalid() {
        assert_eq!(ErrorCode::try_from(999), Err(InvalidErrorCode(999)));
        assert_eq!(ErrorCode::try_from(10000), Err(InvalidErrorCode(10000)));
    }

    #[test]
    fn test_serialize_roundtrip() {
        let codes = [
            ErrorCode::Success,
            ErrorCode::OrderNotFound,
            ErrorCode::PaymentFailed,
            ErrorCode::InternalError,
        ];
        for code in codes {
            let json = serde_json::to_string(&code).unwrap();
            let parsed: ErrorCode = serde_json::from_str(&json).unwrap();
            assert_eq!(code, parsed);
        }
    }

    #[test]
    fn test_message() {
        assert_eq!(ErrorCode::OrderNotFound.message(), "Order not found");
        assert_eq!(
            ErrorCode::OrderAlreadyPaid.message(),
            "Order has already been paid"
        );
    }
}
