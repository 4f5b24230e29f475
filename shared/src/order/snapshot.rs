//! Order snapshots - server-confirmed order state
//!
//! After submission an order is decoupled from the cart lines that produced
//! it. The client never mutates `status` locally except for the optimistic
//! `pending` order shown between a successful submit and the first sync
//! event.

use super::status::OrderStatus;
use super::types::{FulfillmentMethod, PaymentMethod, PaymentStatus};
use crate::models::DeliveryAddress;
use serde::{Deserialize, Serialize};

/// Customization recorded on an order item
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct OrderItemCustomization {
    pub customization_id: String,
    #[serde(default)]
    pub name: String,
    pub value: String,
    #[serde(default)]
    pub unit_price: f64,
}

/// Server-confirmed order item
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct OrderItem {
    pub product_id: String,
    #[serde(default)]
    pub product_name: String,
    pub quantity: i32,
    pub unit_price: f64,
    pub total_price: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub observations: Option<String>,
    #[serde(default)]
    pub customizations: Vec<OrderItemCustomization>,
}

/// Order
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Order {
    pub id: String,
    pub customer_id: String,
    pub store_id: String,
    #[serde(default)]
    pub items: Vec<OrderItem>,
    pub total_amount: f64,
    #[serde(default)]
    pub delivery_fee: f64,
    pub status: OrderStatus,
    pub payment_method: PaymentMethod,
    #[serde(default)]
    pub payment_status: PaymentStatus,
    pub fulfillment_method: FulfillmentMethod,
    /// Present iff fulfillment is delivery
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub delivery_address: Option<DeliveryAddress>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub observations: Option<String>,
    pub created_at: i64,
    pub updated_at: i64,
}

impl Order {
    pub fn is_terminal(&self) -> bool {
        self.status.is_terminal()
    }

    /// Sum of item quantities
    pub fn unit_count(&self) -> i32 {
        self.items.iter().map(|i| i.quantity).sum()
    }
}

/// Order list entry (list endpoints and realtime-normalized rows)
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct OrderListItem {
    pub id: String,
    #[serde(default)]
    pub store_id: String,
    #[serde(default)]
    pub customer_id: String,
    pub status: OrderStatus,
    pub payment_method: PaymentMethod,
    #[serde(default)]
    pub payment_status: PaymentStatus,
    pub fulfillment_method: FulfillmentMethod,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub customer_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub customer_phone: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub delivery_street: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub delivery_neighborhood: Option<String>,
    /// Number of distinct items
    #[serde(default)]
    pub item_count: u32,
    /// Sum of item quantities
    #[serde(default)]
    pub unit_count: u32,
    pub total_amount: f64,
    pub created_at: i64,
    #[serde(default)]
    pub updated_at: i64,
}

impl OrderListItem {
    /// The advance action offered for this order, if any
    pub fn merchant_action(&self) -> Option<super::status::MerchantAction> {
        self.status.merchant_action(self.fulfillment_method)
    }
}

/// Status history log entry
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct StatusHistoryEntry {
    pub status: OrderStatus,
    pub changed_at: i64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub observations: Option<String>,
}

/// Order detail (order + customer info + status history)
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct OrderDetail {
    #[serde(flatten)]
    pub order: Order,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub customer_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub customer_phone: Option<String>,
    #[serde(default)]
    pub status_history: Vec<StatusHistoryEntry>,
}
