//! PricingEngine
//!
//! - [`selection`]: caller-side gate (active product, known ids, radio groups)
//!   and the [`Selections`] builder
//! - [`calculator`]: pure line and cart pricing
//! - [`money`]: `Decimal` conversion and input limits
//!
//! The calculator assumes validated input; everything reaching it went
//! through [`validate_selections`] first.

pub mod calculator;
pub mod money;
pub mod selection;

pub use calculator::{line_total, line_unit_price, price_cart, price_line, unit_price};
pub use selection::{Selections, validate_selections};

use shared::{AppError, ErrorCode};
use thiserror::Error;

/// Rejected selection or out-of-range pricing input
#[derive(Debug, Clone, PartialEq, Error)]
pub enum PricingError {
    #[error("Product {0} is not available")]
    ProductInactive(String),

    #[error("Unknown customization {customization_id} for product {product_id}")]
    UnknownCustomization {
        product_id: String,
        customization_id: String,
    },

    #[error("Only one option of group '{group}' may be selected ({first}, {second})")]
    GroupConflict {
        group: String,
        first: String,
        second: String,
    },

    #[error("Invalid quantity: {0}")]
    InvalidQuantity(i32),

    #[error("Invalid {field}: {value}")]
    InvalidPrice { field: String, value: f64 },
}

impl From<PricingError> for AppError {
    fn from(err: PricingError) -> Self {
        let code = match &err {
            PricingError::ProductInactive(_) => ErrorCode::ProductInactive,
            PricingError::UnknownCustomization { .. } => ErrorCode::CustomizationNotFound,
            PricingError::GroupConflict { .. } => ErrorCode::CustomizationGroupConflict,
            PricingError::InvalidQuantity(_) => ErrorCode::CartInvalidQuantity,
            PricingError::InvalidPrice { .. } => ErrorCode::ProductInvalidPrice,
        };
        AppError::with_message(code, err.to_string())
    }
}
