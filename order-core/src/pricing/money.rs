//! Money calculation utilities using rust_decimal for precision
//!
//! Amounts are `f64` in currency units on the wire and in storage; all
//! arithmetic happens on `Decimal` and is rounded half-away-from-zero to the
//! minor unit when converted back.

use super::PricingError;
use rust_decimal::prelude::*;

/// Minor unit: 2 decimal places
const DECIMAL_PLACES: u32 = 2;

/// Maximum allowed unit price (base or customization)
pub const MAX_PRICE: f64 = 1_000_000.0;
/// Maximum allowed line quantity
pub const MAX_QUANTITY: i32 = 9999;

/// Validate that a f64 value is finite (not NaN, not Infinity)
#[inline]
fn require_finite(value: f64, field_name: &str) -> Result<(), PricingError> {
    if !value.is_finite() {
        return Err(PricingError::InvalidPrice {
            field: field_name.to_string(),
            value,
        });
    }
    Ok(())
}

/// Price must be finite, non-negative and within bounds
pub fn validate_price(value: f64, field_name: &str) -> Result<(), PricingError> {
    require_finite(value, field_name)?;
    if !(0.0..=MAX_PRICE).contains(&value) {
        return Err(PricingError::InvalidPrice {
            field: field_name.to_string(),
            value,
        });
    }
    Ok(())
}

/// Quantity must be positive and within bounds
pub fn validate_quantity(quantity: i32) -> Result<(), PricingError> {
    if quantity <= 0 || quantity > MAX_QUANTITY {
        return Err(PricingError::InvalidQuantity(quantity));
    }
    Ok(())
}

/// Convert f64 to Decimal for calculation
#[inline]
pub fn to_decimal(value: f64) -> Decimal {
    Decimal::from_f64(value).unwrap_or_default()
}

/// Round to the minor unit
#[inline]
pub fn round_money(value: Decimal) -> Decimal {
    value.round_dp_with_strategy(DECIMAL_PLACES, RoundingStrategy::MidpointAwayFromZero)
}

/// Convert Decimal back to f64 for storage, rounded to 2 decimal places
#[inline]
pub fn to_f64(value: Decimal) -> f64 {
    round_money(value).to_f64().unwrap_or_default()
}

/// Whether `amount` reaches `minimum` (inclusive, compared at the minor unit)
pub fn meets_minimum(amount: f64, minimum: f64) -> bool {
    round_money(to_decimal(amount)) >= round_money(to_decimal(minimum))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_to_f64_rounds_half_away_from_zero() {
        assert_eq!(to_f64(Decimal::new(12345, 3)), 12.35);
        assert_eq!(to_f64(Decimal::new(12344, 3)), 12.34);
    }

    #[test]
    fn test_decimal_avoids_float_drift() {
        let sum = to_decimal(0.1) + to_decimal(0.2);
        assert_eq!(to_f64(sum), 0.3);
    }

    #[test]
    fn test_meets_minimum_is_inclusive() {
        assert!(meets_minimum(20.0, 20.0));
        assert!(meets_minimum(24.9, 20.0));
        assert!(!meets_minimum(19.99, 20.0));
        assert!(meets_minimum(0.1 + 0.2, 0.3));
    }

    #[test]
    fn test_input_limits() {
        assert!(validate_price(0.0, "price").is_ok());
        assert!(validate_price(-0.01, "price").is_err());
        assert!(validate_price(f64::NAN, "price").is_err());
        assert!(validate_price(MAX_PRICE + 1.0, "price").is_err());
        assert!(validate_quantity(1).is_ok());
        assert!(validate_quantity(0).is_err());
        assert!(validate_quantity(MAX_QUANTITY + 1).is_err());
    }
}
