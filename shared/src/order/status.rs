//! Order status machine
//!
//! Shared status vocabulary and legal-transition table. The merchant action
//! surface consults it to offer exactly one advance action per order, and
//! realtime sync consults it to drop status regressions.
//!
//! ```text
//! delivery: pending → confirmed → preparing → ready → out_for_delivery → delivered
//! pickup:   pending → confirmed → preparing → ready → delivered
//!           pending → cancelled (merchant rejection, pending only)
//! ```

use super::request::StatusTransitionRequest;
use super::types::FulfillmentMethod;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Order status
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash, Default)]
#[serde(rename_all = "snake_case")]
pub enum OrderStatus {
    #[default]
    Pending,
    Confirmed,
    Preparing,
    Ready,
    OutForDelivery,
    Delivered,
    Cancelled,
}

impl OrderStatus {
    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Delivered | Self::Cancelled)
    }

    /// Position along the forward path
    ///
    /// `cancelled` sits past `pending` but is not comparable with the other
    /// states; callers treat it separately.
    pub fn rank(&self) -> u8 {
        match self {
            Self::Pending => 0,
            Self::Confirmed => 1,
            Self::Preparing => 2,
            Self::Ready => 3,
            Self::OutForDelivery => 4,
            Self::Delivered => 5,
            Self::Cancelled => 6,
        }
    }

    /// The single legal forward step for this status, if any
    pub fn next(&self, fulfillment: FulfillmentMethod) -> Option<OrderStatus> {
        match (self, fulfillment) {
            (Self::Pending, _) => Some(Self::Confirmed),
            (Self::Confirmed, _) => Some(Self::Preparing),
            (Self::Preparing, _) => Some(Self::Ready),
            (Self::Ready, FulfillmentMethod::Delivery) => Some(Self::OutForDelivery),
            (Self::Ready, FulfillmentMethod::Pickup) => Some(Self::Delivered),
            (Self::OutForDelivery, FulfillmentMethod::Delivery) => Some(Self::Delivered),
            (Self::OutForDelivery, FulfillmentMethod::Pickup) => None,
            (Self::Delivered | Self::Cancelled, _) => None,
        }
    }

    /// Whether `self → to` is a legal transition (no skip-ahead, no backward)
    pub fn can_transition(&self, to: OrderStatus, fulfillment: FulfillmentMethod) -> bool {
        if *self == Self::Pending && to == Self::Cancelled {
            return true;
        }
        self.next(fulfillment) == Some(to)
    }

    /// Whether an inbound status would move the order backwards
    ///
    /// Repeated delivery of the current status is not a regression. Any move
    /// away from a terminal state is. Cancellation from the server is
    /// accepted from every non-terminal state since the backend owns status.
    pub fn is_regression(&self, incoming: OrderStatus) -> bool {
        if *self == incoming {
            return false;
        }
        if self.is_terminal() {
            return true;
        }
        if incoming == Self::Cancelled {
            return false;
        }
        incoming.rank() < self.rank()
    }

    /// Merchant-facing advance action for an order in this status
    pub fn merchant_action(&self, fulfillment: FulfillmentMethod) -> Option<MerchantAction> {
        let next = self.next(fulfillment)?;
        Some(match next {
            Self::Confirmed => MerchantAction::Confirm,
            Self::Preparing => MerchantAction::StartPreparing,
            Self::Ready => MerchantAction::MarkReady,
            Self::OutForDelivery => MerchantAction::Dispatch,
            Self::Delivered => MerchantAction::MarkDelivered,
            Self::Pending | Self::Cancelled => return None,
        })
    }

    /// Rejection is offered only while the order is pending
    pub fn can_reject(&self) -> bool {
        *self == Self::Pending
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::Confirmed => "confirmed",
            Self::Preparing => "preparing",
            Self::Ready => "ready",
            Self::OutForDelivery => "out_for_delivery",
            Self::Delivered => "delivered",
            Self::Cancelled => "cancelled",
        }
    }
}

impl fmt::Display for OrderStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// The single advance action offered to a merchant
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MerchantAction {
    /// pending → confirmed (uses the confirm endpoint)
    Confirm,
    /// confirmed → preparing
    StartPreparing,
    /// preparing → ready
    MarkReady,
    /// ready → out_for_delivery
    Dispatch,
    /// ready | out_for_delivery → delivered
    MarkDelivered,
}

impl MerchantAction {
    pub fn target_status(&self) -> OrderStatus {
        match self {
            Self::Confirm => OrderStatus::Confirmed,
            Self::StartPreparing => OrderStatus::Preparing,
            Self::MarkReady => OrderStatus::Ready,
            Self::Dispatch => OrderStatus::OutForDelivery,
            Self::MarkDelivered => OrderStatus::Delivered,
        }
    }

    /// Status-transition payload, or `None` for the confirm action which has
    /// its own endpoint
    pub fn status_request(
        &self,
        estimated_minutes: Option<u32>,
        observations: Option<String>,
    ) -> Option<StatusTransitionRequest> {
        match self {
            Self::Confirm => None,
            _ => Some(StatusTransitionRequest {
                status: self.target_status(),
                estimated_time_minutes: estimated_minutes,
                observations,
            }),
        }
    }
}
