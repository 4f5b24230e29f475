//! Realtime change notifications
//!
//! The backend pushes one notification per changed `orders` row:
//! `{eventType: INSERT|UPDATE|DELETE, new?: row, old?: row}`. Rows are raw
//! table rows (snake_case); every column except `id` may be absent, e.g. a
//! DELETE usually carries only the primary key in `old`.

use super::snapshot::OrderListItem;
use super::status::OrderStatus;
use super::types::{FulfillmentMethod, PaymentMethod, PaymentStatus};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Row change type
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ChangeEventType {
    Insert,
    Update,
    Delete,
}

impl fmt::Display for ChangeEventType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Insert => write!(f, "INSERT"),
            Self::Update => write!(f, "UPDATE"),
            Self::Delete => write!(f, "DELETE"),
        }
    }
}

/// Raw `orders` row as carried by a change notification
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct OrderRow {
    pub id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub store_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub customer_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status: Option<OrderStatus>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub payment_method: Option<PaymentMethod>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub payment_status: Option<PaymentStatus>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub fulfillment_method: Option<FulfillmentMethod>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub total_amount: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_at: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub updated_at: Option<i64>,
}

/// Realtime change notification
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct RealtimeChange {
    #[serde(rename = "eventType")]
    pub event_type: ChangeEventType,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub new: Option<OrderRow>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub old: Option<OrderRow>,
}

impl RealtimeChange {
    pub fn insert(row: OrderRow) -> Self {
        Self {
            event_type: ChangeEventType::Insert,
            new: Some(row),
            old: None,
        }
    }

    pub fn update(old: Option<OrderRow>, new: OrderRow) -> Self {
        Self {
            event_type: ChangeEventType::Update,
            new: Some(new),
            old,
        }
    }

    pub fn delete(old: OrderRow) -> Self {
        Self {
            event_type: ChangeEventType::Delete,
            new: None,
            old: Some(old),
        }
    }

    /// The row describing the order after the change (or before, for deletes)
    pub fn row(&self) -> Option<&OrderRow> {
        match self.event_type {
            ChangeEventType::Delete => self.old.as_ref().or(self.new.as_ref()),
            _ => self.new.as_ref().or(self.old.as_ref()),
        }
    }

    pub fn order_id(&self) -> Option<&str> {
        self.row().map(|r| r.id.as_str())
    }

    /// Store id from either side of the change
    pub fn store_id(&self) -> Option<&str> {
        self.new
            .as_ref()
            .and_then(|r| r.store_id.as_deref())
            .or_else(|| self.old.as_ref().and_then(|r| r.store_id.as_deref()))
    }

    /// Customer id from either side of the change
    pub fn customer_id(&self) -> Option<&str> {
        self.new
            .as_ref()
            .and_then(|r| r.customer_id.as_deref())
            .or_else(|| self.old.as_ref().and_then(|r| r.customer_id.as_deref()))
    }
}

impl OrderListItem {
    /// Build a list entry from a pushed row
    ///
    /// Returns `None` when the row lacks the columns a list entry cannot do
    /// without (status, payment method, fulfillment method).
    pub fn from_row(row: &OrderRow) -> Option<Self> {
        Some(Self {
            id: row.id.clone(),
            store_id: row.store_id.clone().unwrap_or_default(),
            customer_id: row.customer_id.clone().unwrap_or_default(),
            status: row.status?,
            payment_method: row.payment_method?,
            payment_status: row.payment_status.unwrap_or_default(),
            fulfillment_method: row.fulfillment_method?,
            customer_name: None,
            customer_phone: None,
            delivery_street: None,
            delivery_neighborhood: None,
            item_count: 0,
            unit_count: 0,
            total_amount: row.total_amount.unwrap_or_default(),
            created_at: row.created_at.unwrap_or_default(),
            updated_at: row.updated_at.unwrap_or_default(),
        })
    }

    /// Overwrite server-owned columns present in the row
    pub fn apply_row(&mut self, row: &OrderRow) {
        if let Some(status) = row.status {
            self.status = status;
        }
        if let Some(payment_status) = row.payment_status {
            self.payment_status = payment_status;
        }
        if let Some(total) = row.total_amount {
            self.total_amount = total;
        }
        if let Some(updated_at) = row.updated_at {
            self.updated_at = updated_at;
        }
    }
}
