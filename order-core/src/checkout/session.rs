//! Checkout session
//!
//! ```text
//! Address ──continue──▶ Payment ──submit──▶ Confirmation
//!    ▲                     │
//!    └───────back──────────┘
//! ```
//!
//! The session borrows nothing ambient: the cart, store settings, actor and
//! order backend are handed in at construction. Submission is guarded by an
//! explicit in-flight flag so a second call while one is pending fails fast
//! instead of reaching the backend.

use super::address::AddressForm;
use super::error::CheckoutError;
use super::guards::{SubmissionContext, check_address, check_submission};
use super::payload::{build_order_request, optimistic_item};
use crate::api::OrderApi;
use crate::cart::SharedCart;
use crate::pricing::money::{to_decimal, to_f64};
use crate::utils::validation::{MAX_NOTE_LEN, normalize_optional_text, validate_optional_text};
use parking_lot::Mutex;
use serde::Serialize;
use shared::order::{FulfillmentMethod, Order, OrderStatus, PaymentMethod, PaymentStatus};
use shared::{Actor, AppError, DeliveryAddress, StoreSettings};
use std::fmt;
use std::sync::atomic::{AtomicBool, Ordering};

/// Checkout step
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum CheckoutStep {
    Address,
    Payment,
    Confirmation,
}

impl fmt::Display for CheckoutStep {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Address => write!(f, "address"),
            Self::Payment => write!(f, "payment"),
            Self::Confirmation => write!(f, "confirmation"),
        }
    }
}

/// Result of a successful submission
#[derive(Debug, Clone, PartialEq)]
pub struct SubmittedOrder {
    pub order_id: String,
    /// Client-side `pending` view until the first sync event confirms it
    pub order: Order,
}

#[derive(Debug)]
struct CheckoutState {
    step: CheckoutStep,
    fulfillment: FulfillmentMethod,
    payment: Option<PaymentMethod>,
    form: AddressForm,
    observations: Option<String>,
    submitted: Option<SubmittedOrder>,
}

/// Resets the in-flight flag however submission ends
struct InFlightGuard<'a>(&'a AtomicBool);

impl Drop for InFlightGuard<'_> {
    fn drop(&mut self) {
        self.0.store(false, Ordering::Release);
    }
}

pub struct CheckoutSession<A: OrderApi> {
    api: A,
    cart: SharedCart,
    store: StoreSettings,
    actor: Actor,
    state: Mutex<CheckoutState>,
    in_flight: AtomicBool,
}

impl<A: OrderApi> CheckoutSession<A> {
    pub fn new(api: A, cart: SharedCart, store: StoreSettings, actor: Actor) -> Self {
        let fulfillment = if !store.delivery_enabled && store.pickup_enabled {
            FulfillmentMethod::Pickup
        } else {
            FulfillmentMethod::Delivery
        };
        Self {
            api,
            cart,
            store,
            actor,
            state: Mutex::new(CheckoutState {
                step: CheckoutStep::Address,
                fulfillment,
                payment: None,
                form: AddressForm::default(),
                observations: None,
                submitted: None,
            }),
            in_flight: AtomicBool::new(false),
        }
    }

    // ========== Accessors ==========

    pub fn step(&self) -> CheckoutStep {
        self.state.lock().step
    }

    pub fn fulfillment(&self) -> FulfillmentMethod {
        self.state.lock().fulfillment
    }

    pub fn payment_method(&self) -> Option<PaymentMethod> {
        self.state.lock().payment
    }

    pub fn address(&self) -> DeliveryAddress {
        self.state.lock().form.address().clone()
    }

    pub fn is_address_read_only(&self) -> bool {
        self.state.lock().form.is_read_only()
    }

    pub fn observations(&self) -> Option<String> {
        self.state.lock().observations.clone()
    }

    pub fn submitted(&self) -> Option<SubmittedOrder> {
        self.state.lock().submitted.clone()
    }

    pub fn is_submitting(&self) -> bool {
        self.in_flight.load(Ordering::Acquire)
    }

    pub fn store(&self) -> &StoreSettings {
        &self.store
    }

    /// Cart subtotal (no fees)
    pub fn subtotal(&self) -> f64 {
        self.cart.lock().total_amount()
    }

    /// Fee for the currently chosen fulfillment method
    pub fn delivery_fee(&self) -> f64 {
        self.store.fee_for(self.fulfillment())
    }

    pub fn total(&self) -> f64 {
        to_f64(to_decimal(self.subtotal()) + to_decimal(self.delivery_fee()))
    }

    // ========== Form input ==========

    fn editable(state: &CheckoutState) -> Result<(), CheckoutError> {
        match state.step {
            CheckoutStep::Confirmation => Err(CheckoutError::WrongStep(state.step)),
            _ => Ok(()),
        }
    }

    pub fn set_fulfillment(&self, method: FulfillmentMethod) -> Result<(), CheckoutError> {
        let mut state = self.state.lock();
        Self::editable(&state)?;
        state.fulfillment = method;
        Ok(())
    }

    pub fn set_payment_method(&self, method: PaymentMethod) -> Result<(), CheckoutError> {
        let mut state = self.state.lock();
        Self::editable(&state)?;
        state.payment = Some(method);
        Ok(())
    }

    pub fn set_observations(&self, observations: Option<String>) -> Result<(), AppError> {
        let observations = normalize_optional_text(observations);
        validate_optional_text(&observations, "observations", MAX_NOTE_LEN)?;
        let mut state = self.state.lock();
        Self::editable(&state)?;
        state.observations = observations;
        Ok(())
    }

    /// Edit the address form
    ///
    /// Fails with `AddressReadOnly` while the form shows a pre-filled saved
    /// address.
    pub fn update_address(
        &self,
        f: impl FnOnce(&mut DeliveryAddress),
    ) -> Result<(), CheckoutError> {
        let mut state = self.state.lock();
        Self::editable(&state)?;
        if !state.form.edit(f) {
            return Err(CheckoutError::AddressReadOnly);
        }
        Ok(())
    }

    /// Unlock a pre-filled address; pre-fill stays off for this session
    pub fn edit_address_manually(&self) {
        self.state.lock().form.edit_manually();
        tracing::debug!("Address pre-fill disabled for this checkout session");
    }

    // ========== Address pre-fill ==========

    /// Fetch the customer's saved addresses and pre-fill the form
    ///
    /// No-op for anyone but an authenticated customer, or once the user has
    /// typed an address. Fetch failures are logged and leave the form as is.
    pub async fn load_saved_addresses(&self) -> Option<String> {
        let customer_id = self.actor.customer_id()?;
        if self.state.lock().form.is_manual() {
            return None;
        }

        let saved = match self.api.saved_addresses(customer_id).await {
            Ok(saved) => saved,
            Err(e) => {
                tracing::warn!(
                    customer_id = %customer_id,
                    error = %e,
                    "Failed to load saved addresses"
                );
                return None;
            }
        };

        let mut state = self.state.lock();
        if state.step == CheckoutStep::Confirmation {
            return None;
        }
        let applied = state.form.prefill(&saved).map(str::to_string);
        if let Some(id) = &applied {
            tracing::debug!(customer_id = %customer_id, address_id = %id, "Address pre-filled");
        }
        applied
    }

    // ========== Step transitions ==========

    /// Address → Payment
    pub fn continue_to_payment(&self) -> Result<(), CheckoutError> {
        let mut state = self.state.lock();
        if state.step != CheckoutStep::Address {
            return Err(CheckoutError::WrongStep(state.step));
        }
        check_address(state.fulfillment, state.form.address())?;
        state.step = CheckoutStep::Payment;
        Ok(())
    }

    /// Payment → Address
    pub fn back_to_address(&self) -> Result<(), CheckoutError> {
        let mut state = self.state.lock();
        if state.step != CheckoutStep::Payment {
            return Err(CheckoutError::WrongStep(state.step));
        }
        state.step = CheckoutStep::Address;
        Ok(())
    }

    /// Payment → Confirmation: run every guard, create the order, clear the cart
    ///
    /// On any failure the session stays in the payment step and the cart is
    /// untouched; transport failures may be resubmitted.
    pub async fn submit(&self) -> Result<SubmittedOrder, CheckoutError> {
        if self
            .in_flight
            .compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .is_err()
        {
            tracing::warn!(store_id = %self.store.id, "Rejected re-entrant order submission");
            return Err(CheckoutError::SubmissionInFlight);
        }
        let _guard = InFlightGuard(&self.in_flight);

        let (request, lines, fulfillment, payment) = {
            let state = self.state.lock();
            if state.step != CheckoutStep::Payment {
                return Err(CheckoutError::WrongStep(state.step));
            }
            let lines = self.cart.lock().snapshot();
            if lines.is_empty() {
                return Err(CheckoutError::EmptyCart);
            }
            let subtotal = crate::pricing::price_cart(&lines);
            let payment = check_submission(&SubmissionContext {
                store: &self.store,
                payment: state.payment,
                fulfillment: state.fulfillment,
                subtotal,
                address: state.form.address(),
            })
            .inspect_err(|e| {
                tracing::info!(store_id = %self.store.id, reason = %e, "Checkout guard failed");
            })?;
            let request = build_order_request(
                &self.store.id,
                &lines,
                payment,
                state.fulfillment,
                state.form.normalized(),
                state.observations.clone(),
            );
            (request, lines, state.fulfillment, payment)
        };

        tracing::info!(
            store_id = %self.store.id,
            items = request.items.len(),
            fulfillment = %fulfillment,
            payment = %payment,
            "Submitting order"
        );

        let created = self.api.create_order(&request).await.map_err(|e| {
            tracing::warn!(
                store_id = %self.store.id,
                error = %e,
                retryable = e.is_retryable(),
                "Order submission failed"
            );
            CheckoutError::from(e)
        })?;

        self.cart.lock().clear();

        let subtotal = crate::pricing::price_cart(&lines);
        let delivery_fee = self.store.fee_for(fulfillment);
        let total_amount = if created.total_amount > 0.0 {
            created.total_amount
        } else {
            to_f64(to_decimal(subtotal) + to_decimal(delivery_fee))
        };
        let created_at = if created.created_at > 0 {
            created.created_at
        } else {
            shared::util::now_millis()
        };

        let submitted = SubmittedOrder {
            order_id: created.id.clone(),
            order: Order {
                id: created.id.clone(),
                customer_id: self.actor.customer_id().unwrap_or_default().to_string(),
                store_id: self.store.id.clone(),
                items: lines.iter().map(optimistic_item).collect(),
                total_amount,
                delivery_fee,
                status: OrderStatus::Pending,
                payment_method: payment,
                payment_status: PaymentStatus::Pending,
                fulfillment_method: fulfillment,
                delivery_address: request.delivery_address.clone(),
                observations: request.observations.clone(),
                created_at,
                updated_at: created_at,
            },
        };

        {
            let mut state = self.state.lock();
            state.step = CheckoutStep::Confirmation;
            state.submitted = Some(submitted.clone());
        }
        tracing::info!(order_id = %submitted.order_id, total = total_amount, "Order submitted");
        Ok(submitted)
    }
}
