//! Unified error codes for the order lifecycle
//!
//! Error codes are organized by category:
//! - 0xxx: General errors
//! - 1xxx: Authentication errors
//! - 4xxx: Order / checkout errors
//! - 5xxx: Payment errors
//! - 6xxx: Product / customization errors
//! - 7xxx: Cart errors
//! - 8xxx: Realtime sync errors
//! - 9xxx: System errors

use serde::{Deserialize, Serialize};
use std::fmt;

/// Unified error code enum
///
/// All error codes are represented as u16 values for efficient serialization
/// and cross-language compatibility.
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
    /// Invalid request
    InvalidRequest = 5,
    /// Required field missing
    RequiredField = 7,
    /// Value out of range
    ValueOutOfRange = 8,

    // ==================== 1xxx: Auth ====================
    /// Actor is not authenticated
    NotAuthenticated = 1001,

    // ==================== 4xxx: Order ====================
    /// Order not found
    OrderNotFound = 4001,
    /// Order (or the cart feeding it) is empty
    OrderEmpty = 4007,
    /// Cart subtotal is below the store minimum order value
    OrderBelowMinimum = 4010,
    /// Requested status transition is not legal
    OrderInvalidTransition = 4011,
    /// A submission is already in flight
    OrderSubmissionInFlight = 4012,
    /// Checkout step does not allow this operation
    CheckoutWrongStep = 4013,
    /// Delivery address failed validation
    AddressInvalid = 4020,
    /// Fulfillment method is not enabled for the store
    FulfillmentUnavailable = 4030,

    // ==================== 5xxx: Payment ====================
    /// Payment method missing
    PaymentMethodRequired = 5002,
    /// Payment method not accepted by the store
    PaymentInvalidMethod = 5003,

    // ==================== 6xxx: Product ====================
    /// Product not found
    ProductNotFound = 6001,
    /// Product has invalid price
    ProductInvalidPrice = 6002,
    /// Product is not active
    ProductInactive = 6004,
    /// Customization not defined for the product
    CustomizationNotFound = 6010,
    /// Two exclusive customizations of the same group were selected
    CustomizationGroupConflict = 6011,

    // ==================== 7xxx: Cart ====================
    /// Cart line quantity is invalid
    CartInvalidQuantity = 7001,
    /// Persisted cart snapshot could not be read
    CartCorrupted = 7002,

    // ==================== 8xxx: Sync ====================
    /// Live updates are unavailable
    SyncUnavailable = 8001,
    /// Channel never reached the joined state
    SyncJoinFailed = 8002,

    // ==================== 9xxx: System ====================
    /// Internal server error
    InternalError = 9001,
    /// Local storage error
    StorageError = 9002,
    /// Network error
    NetworkError = 9003,
    /// Request timed out
    TimeoutError = 9004,
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

    /// Get the default message for this error code
    pub const fn message(&self) -> &'static str {
        match self {
            // General
            ErrorCode::Success => "Operation completed successfully",
            ErrorCode::Unknown => "An unknown error occurred",
            ErrorCode::ValidationFailed => "Validation failed",
            ErrorCode::NotFound => "Resource not found",
            ErrorCode::InvalidRequest => "Invalid request",
            ErrorCode::RequiredField => "Required field is missing",
            ErrorCode::ValueOutOfRange => "Value is out of range",

            // Auth
            ErrorCode::NotAuthenticated => "Authentication required",

            // Order
            ErrorCode::OrderNotFound => "Order not found",
            ErrorCode::OrderEmpty => "Cart is empty",
            ErrorCode::OrderBelowMinimum => "Order is below the store minimum",
            ErrorCode::OrderInvalidTransition => "Order status transition is not allowed",
            ErrorCode::OrderSubmissionInFlight => "Order submission already in progress",
            ErrorCode::CheckoutWrongStep => "Operation not allowed at this checkout step",
            ErrorCode::AddressInvalid => "Delivery address is incomplete",
            ErrorCode::FulfillmentUnavailable => "Fulfillment method is not available",

            // Payment
            ErrorCode::PaymentMethodRequired => "Payment method is required",
            ErrorCode::PaymentInvalidMethod => "Payment method is not accepted",

            // Product
            ErrorCode::ProductNotFound => "Product not found",
            ErrorCode::ProductInvalidPrice => "Product has invalid price",
            ErrorCode::ProductInactive => "Product is not available",
            ErrorCode::CustomizationNotFound => "Customization not found",
            ErrorCode::CustomizationGroupConflict => "Only one option of this group may be selected",

            // Cart
            ErrorCode::CartInvalidQuantity => "Invalid quantity",
            ErrorCode::CartCorrupted => "Saved cart could not be read",

            // Sync
            ErrorCode::SyncUnavailable => "Live updates unavailable",
            ErrorCode::SyncJoinFailed => "Live update channel failed to join",

            // System
            ErrorCode::InternalError => "Internal error",
            ErrorCode::StorageError => "Storage error",
            ErrorCode::NetworkError => "Network error",
            ErrorCode::TimeoutError => "Request timed out",
        }
    }

    /// Whether an operation failing with this code may be retried as-is
    pub const fn is_retryable(&self) -> bool {
        matches!(
            self,
            ErrorCode::NetworkError | ErrorCode::TimeoutError | ErrorCode::SyncUnavailable
        )
    }
}

impl From<ErrorCode> for u16 {
    #[inline]
    fn from(code: ErrorCode) -> Self {
        code.code()
    }
}

/// Error returned when converting an invalid u16 to ErrorCode
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
            5 => Ok(ErrorCode::InvalidRequest),
            7 => Ok(ErrorCode::RequiredField),
            8 => Ok(ErrorCode::ValueOutOfRange),

            // Auth
            1001 => Ok(ErrorCode::NotAuthenticated),

            // Order
            4001 => Ok(ErrorCode::OrderNotFound),
            4007 => Ok(ErrorCode::OrderEmpty),
            4010 => Ok(ErrorCode::OrderBelowMinimum),
            4011 => Ok(ErrorCode::OrderInvalidTransition),
            4012 => Ok(ErrorCode::OrderSubmissionInFlight),
            4013 => Ok(ErrorCode::CheckoutWrongStep),
            4020 => Ok(ErrorCode::AddressInvalid),
            4030 => Ok(ErrorCode::FulfillmentUnavailable),

            // Payment
            5002 => Ok(ErrorCode::PaymentMethodRequired),
            5003 => Ok(ErrorCode::PaymentInvalidMethod),

            // Product
            6001 => Ok(ErrorCode::ProductNotFound),
            6002 => Ok(ErrorCode::ProductInvalidPrice),
            6004 => Ok(ErrorCode::ProductInactive),
            6010 => Ok(ErrorCode::CustomizationNotFound),
            6011 => Ok(ErrorCode::CustomizationGroupConflict),

            // Cart
            7001 => Ok(ErrorCode::CartInvalidQuantity),
            7002 => Ok(ErrorCode::CartCorrupted),

            // Sync
            8001 => Ok(ErrorCode::SyncUnavailable),
            8002 => Ok(ErrorCode::SyncJoinFailed),

            // System
            9001 => Ok(ErrorCode::InternalError),
            9002 => Ok(ErrorCode::StorageError),
            9003 => Ok(ErrorCode::NetworkError),
            9004 => Ok(ErrorCode::TimeoutError),

            _ => Err(InvalidErrorCode(value)),
        }
    }
}

impl fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.code())
    }
}
