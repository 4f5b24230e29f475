//! Merchant order actions
//!
//! Exactly one advance action is offered per order, derived from the status
//! machine. Rejection is offered only while the order is pending. The
//! backend owns status; nothing here mutates a local copy.

use crate::api::OrderApi;
use crate::utils::validation::{
    MAX_NOTE_LEN, normalize_optional_text, validate_optional_text, validate_required_text,
};
use shared::order::{
    MerchantAction, OrderDetail, OrderListItem, OrderListQuery, OrderStatus, Page,
    RejectOrderRequest,
};
use shared::{AppError, AppResult, ErrorCode};

pub struct MerchantOrders<A: OrderApi> {
    api: A,
}

impl<A: OrderApi> MerchantOrders<A> {
    pub fn new(api: A) -> Self {
        Self { api }
    }

    pub async fn list(&self, query: &OrderListQuery) -> AppResult<Page<OrderListItem>> {
        Ok(self.api.list_orders(query).await?)
    }

    pub async fn detail(&self, order_id: &str) -> AppResult<OrderDetail> {
        Ok(self.api.get_order(order_id).await?)
    }

    /// Perform the single advance action for the order
    ///
    /// Returns the status the backend was asked to move to.
    pub async fn advance(
        &self,
        order: &OrderListItem,
        estimated_minutes: Option<u32>,
        observations: Option<String>,
    ) -> AppResult<OrderStatus> {
        let action: MerchantAction = order.merchant_action().ok_or_else(|| {
            AppError::with_message(
                ErrorCode::OrderInvalidTransition,
                format!("Order {} in status {} has no next step", order.id, order.status),
            )
        })?;
        let observations = normalize_optional_text(observations);
        validate_optional_text(&observations, "observations", MAX_NOTE_LEN)?;

        match action.status_request(estimated_minutes, observations) {
            Some(request) => self.api.update_status(&order.id, &request).await?,
            None => self.api.confirm_order(&order.id).await?,
        }

        let target = action.target_status();
        tracing::info!(
            order_id = %order.id,
            from = %order.status,
            to = %target,
            "Order status advanced"
        );
        Ok(target)
    }

    /// Reject a pending order
    pub async fn reject(&self, order: &OrderListItem, reason: &str) -> AppResult<()> {
        if !order.status.can_reject() {
            return Err(AppError::with_message(
                ErrorCode::OrderInvalidTransition,
                format!("Order {} can only be rejected while pending", order.id),
            ));
        }
        validate_required_text(reason, "reason", MAX_NOTE_LEN)?;

        let request = RejectOrderRequest {
            reason: reason.trim().to_string(),
        };
        self.api.reject_order(&order.id, &request).await?;
        tracing::info!(order_id = %order.id, "Order rejected");
        Ok(())
    }
}
