//! Request / response payloads exchanged with the order backend

use super::status::OrderStatus;
use super::types::{FulfillmentMethod, PaymentMethod};
use crate::models::DeliveryAddress;
use serde::{Deserialize, Serialize};

// ============================================================================
// Order creation
// ============================================================================

/// Reference to a selected customization in an order item
///
/// `value` is `"true"` for boolean selections and the selected count for
/// quantity selections.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct CustomizationRef {
    pub customization_id: String,
    pub value: String,
}

/// Order item in a creation request
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct CreateOrderItem {
    pub product_id: String,
    pub quantity: i32,
    /// Per-unit price including customizations
    pub unit_price: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub observations: Option<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub customizations: Vec<CustomizationRef>,
}

/// Order creation request
///
/// `delivery_address` is omitted from the JSON entirely unless the
/// fulfillment method is delivery.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct CreateOrderRequest {
    pub store_id: String,
    pub items: Vec<CreateOrderItem>,
    pub payment_method: PaymentMethod,
    pub fulfillment_method: FulfillmentMethod,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub delivery_address: Option<DeliveryAddress>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub observations: Option<String>,
}

/// Order creation response
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct OrderCreated {
    pub id: String,
    #[serde(default)]
    pub status: OrderStatus,
    #[serde(default)]
    pub total_amount: f64,
    #[serde(default)]
    pub created_at: i64,
}

// ============================================================================
// Merchant status actions
// ============================================================================

/// Status transition request (merchant-initiated)
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct StatusTransitionRequest {
    pub status: OrderStatus,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub estimated_time_minutes: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub observations: Option<String>,
}

/// Order rejection request
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct RejectOrderRequest {
    pub reason: String,
}

// ============================================================================
// Listing
// ============================================================================

/// Order list query (status tab + store filter + page)
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct OrderListQuery {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status: Option<OrderStatus>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub store_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub customer_id: Option<String>,
    pub page: u32,
    pub page_size: u32,
}

impl Default for OrderListQuery {
    fn default() -> Self {
        Self {
            status: None,
            store_id: None,
            customer_id: None,
            page: 1,
            page_size: 20,
        }
    }
}

impl OrderListQuery {
    /// Query-string pairs for the list endpoint
    pub fn to_query_pairs(&self) -> Vec<(&'static str, String)> {
        let mut pairs = vec![
            ("page", self.page.to_string()),
            ("page_size", self.page_size.to_string()),
        ];
        if let Some(status) = self.status {
            pairs.push(("status", status.to_string()));
        }
        if let Some(store_id) = &self.store_id {
            pairs.push(("store_id", store_id.clone()));
        }
        if let Some(customer_id) = &self.customer_id {
            pairs.push(("customer_id", customer_id.clone()));
        }
        pairs
    }
}

/// One page of results
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Page<T> {
    pub items: Vec<T>,
    #[serde(default)]
    pub total: u64,
    #[serde(default)]
    pub page: u32,
    #[serde(default)]
    pub page_size: u32,
}
