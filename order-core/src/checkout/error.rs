use super::address::AddressErrors;
use super::session::CheckoutStep;
use crate::api::ApiError;
use shared::order::{FulfillmentMethod, PaymentMethod};
use shared::{AppError, ErrorCode};
use thiserror::Error;

/// Store-level rule that blocks submission
#[derive(Debug, Clone, PartialEq, Error)]
pub enum PreconditionFailure {
    #[error("Choose a payment method")]
    PaymentMethodMissing,

    #[error("This store does not accept {0}")]
    PaymentNotAccepted(PaymentMethod),

    #[error("This store does not offer {0}")]
    FulfillmentUnavailable(FulfillmentMethod),

    #[error("Minimum order is {minimum:.2} (cart subtotal {subtotal:.2})")]
    BelowMinimum { subtotal: f64, minimum: f64 },
}

/// Checkout failures
///
/// Guard failures are ordinary values here; nothing reaches the order
/// backend unless every guard passed.
#[derive(Debug, Clone, Error)]
pub enum CheckoutError {
    /// Field-level address problems
    #[error("Invalid address: {0}")]
    Validation(AddressErrors),

    #[error("{0}")]
    Precondition(PreconditionFailure),

    /// Order creation call failed; the cart is untouched
    #[error("Order submission failed: {message}")]
    Transport { message: String, retryable: bool },

    #[error("An order submission is already in progress")]
    SubmissionInFlight,

    #[error("Cart is empty")]
    EmptyCart,

    #[error("Not allowed in the {0} step")]
    WrongStep(CheckoutStep),

    /// The form holds a pre-filled address; call `edit_address_manually` first
    #[error("Address is pre-filled from a saved address")]
    AddressReadOnly,
}

impl CheckoutError {
    pub fn is_retryable(&self) -> bool {
        matches!(self, Self::Transport { retryable: true, .. })
    }
}

impl From<PreconditionFailure> for CheckoutError {
    fn from(failure: PreconditionFailure) -> Self {
        Self::Precondition(failure)
    }
}

impl From<AddressErrors> for CheckoutError {
    fn from(errors: AddressErrors) -> Self {
        Self::Validation(errors)
    }
}

impl From<ApiError> for CheckoutError {
    fn from(err: ApiError) -> Self {
        Self::Transport {
            retryable: err.is_retryable(),
            message: err.to_string(),
        }
    }
}

impl From<CheckoutError> for AppError {
    fn from(err: CheckoutError) -> Self {
        match &err {
            CheckoutError::Validation(errors) => {
                let mut app = AppError::with_message(ErrorCode::AddressInvalid, err.to_string());
                for (field, message) in errors.iter() {
                    app = app.with_detail(field.as_str(), message);
                }
                app
            }
            CheckoutError::Precondition(failure) => {
                let code = match failure {
                    PreconditionFailure::PaymentMethodMissing => ErrorCode::PaymentMethodRequired,
                    PreconditionFailure::PaymentNotAccepted(_) => ErrorCode::PaymentInvalidMethod,
                    PreconditionFailure::FulfillmentUnavailable(_) => {
                        ErrorCode::FulfillmentUnavailable
                    }
                    PreconditionFailure::BelowMinimum { .. } => ErrorCode::OrderBelowMinimum,
                };
                AppError::with_message(code, err.to_string())
            }
            CheckoutError::Transport { retryable, message } => {
                let code = if *retryable {
                    ErrorCode::NetworkError
                } else {
                    ErrorCode::InvalidRequest
                };
                AppError::with_message(code, message.clone())
            }
            CheckoutError::SubmissionInFlight => {
                AppError::with_message(ErrorCode::OrderSubmissionInFlight, err.to_string())
            }
            CheckoutError::EmptyCart => {
                AppError::with_message(ErrorCode::OrderEmpty, err.to_string())
            }
            CheckoutError::WrongStep(_) | CheckoutError::AddressReadOnly => {
                AppError::with_message(ErrorCode::CheckoutWrongStep, err.to_string())
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_precondition_messages() {
        let err = CheckoutError::from(PreconditionFailure::BelowMinimum {
            subtotal: 24.9,
            minimum: 30.0,
        });
        assert_eq!(err.to_string(), "Minimum order is 30.00 (cart subtotal 24.90)");
        assert_eq!(AppError::from(err).code, ErrorCode::OrderBelowMinimum);
    }

    #[test]
    fn test_transport_retryable_from_api_error() {
        let err = CheckoutError::from(ApiError::Timeout);
        assert!(err.is_retryable());
        let err = CheckoutError::from(ApiError::Status {
            status: 400,
            message: "bad".into(),
        });
        assert!(!err.is_retryable());
    }
}
