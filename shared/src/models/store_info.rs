//! Store Settings Model

use crate::order::{FulfillmentMethod, PaymentMethod};
use serde::{Deserialize, Serialize};

/// Checkout-relevant store settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StoreSettings {
    pub id: String,
    #[serde(default)]
    pub name: String,
    /// Payment methods the store accepts
    #[serde(default)]
    pub accepted_payment_methods: Vec<PaymentMethod>,
    #[serde(default)]
    pub delivery_enabled: bool,
    #[serde(default)]
    pub pickup_enabled: bool,
    /// Minimum cart subtotal in currency unit (inclusive)
    #[serde(default)]
    pub minimum_order_value: f64,
    /// Delivery fee in currency unit, charged only for delivery
    #[serde(default)]
    pub delivery_fee: f64,
}

impl StoreSettings {
    pub fn accepts_payment(&self, method: PaymentMethod) -> bool {
        self.accepted_payment_methods.contains(&method)
    }

    pub fn fulfillment_enabled(&self, method: FulfillmentMethod) -> bool {
        match method {
            FulfillmentMethod::Delivery => self.delivery_enabled,
            FulfillmentMethod::Pickup => self.pickup_enabled,
        }
    }

    /// Fee charged for the given fulfillment method
    pub fn fee_for(&self, method: FulfillmentMethod) -> f64 {
        match method {
            FulfillmentMethod::Delivery => self.delivery_fee,
            FulfillmentMethod::Pickup => 0.0,
        }
    }
}
