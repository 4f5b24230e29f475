//! Submission guards
//!
//! Evaluated in order; the first failing rule wins:
//!
//! 1. a payment method is chosen and the store accepts it
//! 2. the fulfillment method is enabled for the store
//! 3. cart subtotal ≥ store minimum (inclusive, at the minor unit)
//! 4. the address guard still holds (delivery only)

use super::address::validate_address;
use super::error::{CheckoutError, PreconditionFailure};
use crate::pricing::money::meets_minimum;
use shared::order::{FulfillmentMethod, PaymentMethod};
use shared::{DeliveryAddress, StoreSettings};

/// Everything the guards look at
#[derive(Debug, Clone, Copy)]
pub struct SubmissionContext<'a> {
    pub store: &'a StoreSettings,
    pub payment: Option<PaymentMethod>,
    pub fulfillment: FulfillmentMethod,
    pub subtotal: f64,
    pub address: &'a DeliveryAddress,
}

/// Address guard for leaving the address step
pub fn check_address(
    fulfillment: FulfillmentMethod,
    address: &DeliveryAddress,
) -> Result<(), CheckoutError> {
    if fulfillment.requires_address() {
        validate_address(address)?;
    }
    Ok(())
}

/// Run every submission guard
pub fn check_submission(ctx: &SubmissionContext<'_>) -> Result<PaymentMethod, CheckoutError> {
    let payment = ctx.payment.ok_or(PreconditionFailure::PaymentMethodMissing)?;
    if !ctx.store.accepts_payment(payment) {
        return Err(PreconditionFailure::PaymentNotAccepted(payment).into());
    }
    if !ctx.store.fulfillment_enabled(ctx.fulfillment) {
        return Err(PreconditionFailure::FulfillmentUnavailable(ctx.fulfillment).into());
    }
    if !meets_minimum(ctx.subtotal, ctx.store.minimum_order_value) {
        return Err(PreconditionFailure::BelowMinimum {
            subtotal: ctx.subtotal,
            minimum: ctx.store.minimum_order_value,
        }
        .into());
    }
    check_address(ctx.fulfillment, ctx.address)?;
    Ok(payment)
}
