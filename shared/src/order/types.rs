//! Shared types for cart and checkout

use crate::models::Customization;
use serde::{Deserialize, Serialize};
use std::fmt;

// ============================================================================
// Payment / Fulfillment
// ============================================================================

/// Payment method (pass-through to the payment gateway)
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum PaymentMethod {
    CreditCard,
    DebitCard,
    Pix,
    Cash,
}

impl fmt::Display for PaymentMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::CreditCard => write!(f, "credit_card"),
            Self::DebitCard => write!(f, "debit_card"),
            Self::Pix => write!(f, "pix"),
            Self::Cash => write!(f, "cash"),
        }
    }
}

/// Payment status as reported by the backend
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "snake_case")]
pub enum PaymentStatus {
    #[default]
    Pending,
    Paid,
    Failed,
    Refunded,
}

/// Fulfillment method
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash, Default)]
#[serde(rename_all = "snake_case")]
pub enum FulfillmentMethod {
    #[default]
    Delivery,
    Pickup,
}

impl FulfillmentMethod {
    pub fn requires_address(&self) -> bool {
        matches!(self, Self::Delivery)
    }
}

impl fmt::Display for FulfillmentMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Delivery => write!(f, "delivery"),
            Self::Pickup => write!(f, "pickup"),
        }
    }
}

// ============================================================================
// Cart Line
// ============================================================================

/// Cart line - one priced, customized product awaiting checkout
///
/// `customizations` is an ordered multiset: a quantity customization selected
/// N times appears N times, a boolean customization at most once.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct CartLine {
    /// Merge identity (content hash over product id + customization multiset)
    pub line_key: String,
    /// Product ID
    pub product_id: String,
    /// Product name snapshot
    pub product_name: String,
    /// Product base price snapshot
    pub base_price: f64,
    /// Quantity (>= 1)
    pub quantity: i32,
    /// Selected customizations
    #[serde(default)]
    pub customizations: Vec<Customization>,
    /// Line total (computed)
    pub total_price: f64,
    /// Free-text note
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub note: Option<String>,
}

impl CartLine {
    /// Selected count per customization id, in first-seen order
    ///
    /// Boolean customizations always count as 1.
    pub fn customization_counts(&self) -> Vec<(&Customization, u32)> {
        let mut counts: Vec<(&Customization, u32)> = Vec::new();
        for c in &self.customizations {
            match counts.iter_mut().find(|(seen, _)| seen.id == c.id) {
                Some((seen, count)) => {
                    if !seen.is_boolean() {
                        *count += 1;
                    }
                }
                None => counts.push((c, 1)),
            }
        }
        counts
    }
}
