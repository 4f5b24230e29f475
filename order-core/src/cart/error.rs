use crate::pricing::PricingError;
use shared::{AppError, ErrorCode};
use thiserror::Error;

/// Cart mutation errors (rejected before the cart changes)
#[derive(Debug, Clone, PartialEq, Error)]
pub enum CartError {
    #[error(transparent)]
    Pricing(#[from] PricingError),

    #[error("Note is too long ({len} chars, max {max})")]
    NoteTooLong { len: usize, max: usize },

    #[error("Line already holds {current}; adding {added} exceeds the limit of {max}")]
    QuantityLimit { current: i32, added: i32, max: i32 },
}

impl From<CartError> for AppError {
    fn from(err: CartError) -> Self {
        match err {
            CartError::Pricing(e) => e.into(),
            CartError::NoteTooLong { .. } => {
                AppError::with_message(ErrorCode::ValidationFailed, err.to_string())
                    .with_detail("field", "note")
            }
            CartError::QuantityLimit { max, .. } => {
                AppError::with_message(ErrorCode::CartInvalidQuantity, err.to_string())
                    .with_detail("max", max)
            }
        }
    }
}
