// order-core/tests/common/mod.rs
// Shared fixtures: catalog, store settings, in-memory cart and a recording order API

#![allow(dead_code)]

use async_trait::async_trait;
use order_core::api::{ApiError, ApiResult, OrderApi};
use order_core::cart::{CartStore, RedbCartStorage, SharedCart};
use order_core::pricing::Selections;
use parking_lot::Mutex;
use shared::models::{CustomizationCategory, SavedAddress};
use shared::order::{
    CreateOrderRequest, FulfillmentMethod, OrderCreated, OrderDetail, OrderListItem,
    OrderListQuery, OrderStatus, Page, PaymentMethod, PaymentStatus, RejectOrderRequest,
    StatusTransitionRequest,
};
use shared::{Customization, DeliveryAddress, Product, SelectionKind, StoreSettings};
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use tokio::sync::Notify;

/// Order API double that records every call
#[derive(Default)]
pub struct MockOrderApi {
    pub created: Mutex<Vec<CreateOrderRequest>>,
    pub status_updates: Mutex<Vec<(String, StatusTransitionRequest)>>,
    pub confirmed: Mutex<Vec<String>>,
    pub rejected: Mutex<Vec<(String, String)>>,
    pub saved: Mutex<Vec<SavedAddress>>,
    pub saved_calls: AtomicUsize,
    pub fail_create: Mutex<Option<ApiError>>,
    /// When set, `create_order` waits for a notification before answering
    pub gate: Option<Arc<Notify>>,
}

impl MockOrderApi {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub fn gated(gate: Arc<Notify>) -> Arc<Self> {
        Arc::new(Self {
            gate: Some(gate),
            ..Default::default()
        })
    }

    pub fn create_calls(&self) -> usize {
        self.created.lock().len()
    }
}

#[async_trait]
impl OrderApi for MockOrderApi {
    async fn create_order(&self, request: &CreateOrderRequest) -> ApiResult<OrderCreated> {
        if let Some(gate) = &self.gate {
            gate.notified().await;
        }
        self.created.lock().push(request.clone());
        if let Some(err) = self.fail_create.lock().clone() {
            return Err(err);
        }
        Ok(OrderCreated {
            id: format!("order-{}", self.create_calls()),
            status: OrderStatus::Pending,
            total_amount: 0.0,
            created_at: 1_700_000_000_000,
        })
    }

    async fn list_orders(&self, _query: &OrderListQuery) -> ApiResult<Page<OrderListItem>> {
        Ok(Page {
            items: vec![],
            total: 0,
            page: 1,
            page_size: 20,
        })
    }

    async fn get_order(&self, order_id: &str) -> ApiResult<OrderDetail> {
        Err(ApiError::Status {
            status: 404,
            message: format!("order {order_id} not found"),
        })
    }

    async fn update_status(
        &self,
        order_id: &str,
        request: &StatusTransitionRequest,
    ) -> ApiResult<()> {
        self.status_updates
            .lock()
            .push((order_id.to_string(), request.clone()));
        Ok(())
    }

    async fn confirm_order(&self, order_id: &str) -> ApiResult<()> {
        self.confirmed.lock().push(order_id.to_string());
        Ok(())
    }

    async fn reject_order(&self, order_id: &str, request: &RejectOrderRequest) -> ApiResult<()> {
        self.rejected
            .lock()
            .push((order_id.to_string(), request.reason.clone()));
        Ok(())
    }

    async fn saved_addresses(&self, _customer_id: &str) -> ApiResult<Vec<SavedAddress>> {
        self.saved_calls.fetch_add(1, Ordering::SeqCst);
        Ok(self.saved.lock().clone())
    }
}

fn customization(id: &str, price: f64, kind: SelectionKind) -> Customization {
    Customization {
        id: id.to_string(),
        name: id.to_string(),
        category: CustomizationCategory::Topping,
        unit_price: price,
        selection_kind: kind,
        group: None,
    }
}

/// Açaí 500ml at 18.90 with a free boolean and a 3.00 quantity topping
pub fn acai() -> Product {
    Product {
        id: "acai-500".to_string(),
        name: "Açaí 500ml".to_string(),
        base_price: 18.9,
        customizations: vec![
            customization("leite-po", 0.0, SelectionKind::Boolean),
            customization("granola", 3.0, SelectionKind::Quantity),
        ],
        is_active: true,
    }
}

pub fn store(minimum_order_value: f64) -> StoreSettings {
    StoreSettings {
        id: "store-1".to_string(),
        name: "Açaí da Praia".to_string(),
        accepted_payment_methods: vec![PaymentMethod::Pix, PaymentMethod::Cash],
        delivery_enabled: true,
        pickup_enabled: true,
        minimum_order_value,
        delivery_fee: 5.0,
    }
}

pub fn valid_address() -> DeliveryAddress {
    DeliveryAddress {
        street: "Rua da Aurora".to_string(),
        number: "325".to_string(),
        neighborhood: "Boa Vista".to_string(),
        city: "Recife".to_string(),
        state: "PE".to_string(),
        zip_code: "50050-000".to_string(),
        complement: Some("apto 12".to_string()),
        reference: None,
    }
}

pub fn empty_cart() -> SharedCart {
    let storage = Arc::new(RedbCartStorage::open_in_memory().unwrap());
    CartStore::open(storage).into_shared()
}

/// One line: 18.90 + leite-po (0.00) + granola × 2 (3.00) = 24.90, quantity 1
pub fn reference_cart() -> SharedCart {
    let cart = empty_cart();
    let product = acai();
    let mut selections = Selections::new();
    selections.toggle(&product, "leite-po").unwrap();
    selections.increment(&product, "granola").unwrap();
    selections.increment(&product, "granola").unwrap();
    cart.lock()
        .add_product(&product, &selections, 1, None)
        .unwrap();
    cart
}

pub fn list_item(id: &str, status: OrderStatus, fulfillment: FulfillmentMethod) -> OrderListItem {
    OrderListItem {
        id: id.to_string(),
        store_id: "store-1".to_string(),
        customer_id: "customer-1".to_string(),
        status,
        payment_method: PaymentMethod::Pix,
        payment_status: PaymentStatus::Paid,
        fulfillment_method: fulfillment,
        customer_name: Some("Ana".to_string()),
        customer_phone: None,
        delivery_street: None,
        delivery_neighborhood: None,
        item_count: 1,
        unit_count: 1,
        total_amount: 24.9,
        created_at: 1_700_000_000_000,
        updated_at: 1_700_000_000_000,
    }
}
