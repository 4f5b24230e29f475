//! Order backend collaborator
//!
//! [`OrderApi`] is the seam the checkout session and merchant actions talk
//! through; [`HttpOrderApi`] implements it over `reqwest`. Every backend
//! payload is wrapped in the shared [`ApiResponse`] envelope.

use async_trait::async_trait;
use reqwest::{Client, RequestBuilder};
use serde::de::DeserializeOwned;
use shared::error::ApiResponse;
use shared::models::SavedAddress;
use shared::order::{
    CreateOrderRequest, OrderCreated, OrderDetail, OrderListItem, OrderListQuery, Page,
    RejectOrderRequest, StatusTransitionRequest,
};
use shared::{AppError, ErrorCode};
use std::sync::Arc;
use std::time::Duration;
use thiserror::Error;

use crate::core::Config;

/// Backend call failures
#[derive(Debug, Clone, Error)]
pub enum ApiError {
    #[error("Request timed out")]
    Timeout,

    #[error("Network error: {0}")]
    Network(String),

    /// Non-2xx response; `message` is the server's message when it sent one
    #[error("Server returned {status}: {message}")]
    Status { status: u16, message: String },

    /// 2xx response whose envelope carries an error code
    #[error("{0}")]
    Rejected(AppError),

    #[error("Invalid response: {0}")]
    InvalidResponse(String),
}

pub type ApiResult<T> = Result<T, ApiError>;

impl ApiError {
    /// Timeouts, connection failures and 5xx may succeed on resubmission
    pub fn is_retryable(&self) -> bool {
        match self {
            Self::Timeout | Self::Network(_) => true,
            Self::Status { status, .. } => *status >= 500,
            Self::Rejected(e) => e.is_retryable(),
            Self::InvalidResponse(_) => false,
        }
    }
}

impl From<reqwest::Error> for ApiError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            Self::Timeout
        } else if err.is_decode() {
            Self::InvalidResponse(err.to_string())
        } else if let Some(status) = err.status() {
            Self::Status {
                status: status.as_u16(),
                message: err.to_string(),
            }
        } else {
            Self::Network(err.to_string())
        }
    }
}

impl From<ApiError> for AppError {
    fn from(err: ApiError) -> Self {
        match err {
            ApiError::Timeout => AppError::timeout(),
            ApiError::Network(msg) => AppError::network(msg),
            ApiError::Status { status: 404, message } => {
                AppError::with_message(ErrorCode::NotFound, message)
            }
            ApiError::Status { status: 401, message } => {
                AppError::with_message(ErrorCode::NotAuthenticated, message)
            }
            ApiError::Status { status, message } if status >= 500 => {
                AppError::with_message(ErrorCode::InternalError, message)
            }
            ApiError::Status { message, .. } => AppError::invalid(message),
            ApiError::Rejected(e) => e,
            ApiError::InvalidResponse(msg) => AppError::internal(msg),
        }
    }
}

/// Order backend operations
#[async_trait]
pub trait OrderApi: Send + Sync {
    async fn create_order(&self, request: &CreateOrderRequest) -> ApiResult<OrderCreated>;

    async fn list_orders(&self, query: &OrderListQuery) -> ApiResult<Page<OrderListItem>>;

    async fn get_order(&self, order_id: &str) -> ApiResult<OrderDetail>;

    /// Merchant status advance (everything except confirm)
    async fn update_status(
        &self,
        order_id: &str,
        request: &StatusTransitionRequest,
    ) -> ApiResult<()>;

    async fn confirm_order(&self, order_id: &str) -> ApiResult<()>;

    async fn reject_order(&self, order_id: &str, request: &RejectOrderRequest) -> ApiResult<()>;

    async fn saved_addresses(&self, customer_id: &str) -> ApiResult<Vec<SavedAddress>>;
}

#[async_trait]
impl<T: OrderApi + ?Sized> OrderApi for Arc<T> {
    async fn create_order(&self, request: &CreateOrderRequest) -> ApiResult<OrderCreated> {
        (**self).create_order(request).await
    }

    async fn list_orders(&self, query: &OrderListQuery) -> ApiResult<Page<OrderListItem>> {
        (**self).list_orders(query).await
    }

    async fn get_order(&self, order_id: &str) -> ApiResult<OrderDetail> {
        (**self).get_order(order_id).await
    }

    async fn update_status(
        &self,
        order_id: &str,
        request: &StatusTransitionRequest,
    ) -> ApiResult<()> {
        (**self).update_status(order_id, request).await
    }

    async fn confirm_order(&self, order_id: &str) -> ApiResult<()> {
        (**self).confirm_order(order_id).await
    }

    async fn reject_order(&self, order_id: &str, request: &RejectOrderRequest) -> ApiResult<()> {
        (**self).reject_order(order_id, request).await
    }

    async fn saved_addresses(&self, customer_id: &str) -> ApiResult<Vec<SavedAddress>> {
        (**self).saved_addresses(customer_id).await
    }
}

/// Order backend over HTTP
#[derive(Debug, Clone)]
pub struct HttpOrderApi {
    client: Client,
    base_url: String,
    token: Option<String>,
}

impl HttpOrderApi {
    pub fn new(base_url: &str, timeout: Duration) -> ApiResult<Self> {
        let client = Client::builder().timeout(timeout).build()?;
        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
            token: None,
        })
    }

    /// Build from configuration (base URL, timeout, bearer token)
    pub fn from_config(config: &Config) -> ApiResult<Self> {
        let mut api = Self::new(&config.api_base_url, config.request_timeout())?;
        api.token = config.api_token.clone();
        Ok(api)
    }

    pub fn with_token(mut self, token: impl Into<String>) -> Self {
        self.token = Some(token.into());
        self
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn url(&self, path: &str) -> String {
        format!("{}/{}", self.base_url, path.trim_start_matches('/'))
    }

    fn authorize(&self, req: RequestBuilder) -> RequestBuilder {
        match &self.token {
            Some(token) => req.bearer_auth(token),
            None => req,
        }
    }

    async fn send<T: DeserializeOwned>(&self, req: RequestBuilder) -> ApiResult<Option<T>> {
        let response = self.authorize(req).send().await?;
        let status = response.status();
        let text = response.text().await?;
        if !status.is_success() {
            return Err(status_error(status.as_u16(), &text));
        }
        decode_envelope(&text)
    }

    async fn fetch<T: DeserializeOwned>(&self, req: RequestBuilder) -> ApiResult<T> {
        self.send(req)
            .await?
            .ok_or_else(|| ApiError::InvalidResponse("missing response data".into()))
    }

    async fn execute(&self, req: RequestBuilder) -> ApiResult<()> {
        self.send::<serde_json::Value>(req).await.map(|_| ())
    }
}

/// Error for a non-2xx response, preferring the envelope's message
fn status_error(status: u16, body: &str) -> ApiError {
    let message = serde_json::from_str::<ApiResponse<serde_json::Value>>(body)
        .map(|envelope| envelope.message)
        .unwrap_or_else(|_| body.trim().to_string());
    ApiError::Status { status, message }
}

/// Unwrap a 2xx envelope into its payload
fn decode_envelope<T: DeserializeOwned>(body: &str) -> ApiResult<Option<T>> {
    if body.trim().is_empty() {
        return Ok(None);
    }
    let envelope: ApiResponse<T> =
        serde_json::from_str(body).map_err(|e| ApiError::InvalidResponse(e.to_string()))?;
    envelope.into_result().map_err(ApiError::Rejected)
}

#[async_trait]
impl OrderApi for HttpOrderApi {
    async fn create_order(&self, request: &CreateOrderRequest) -> ApiResult<OrderCreated> {
        let req = self.client.post(self.url("orders")).json(request);
        let created: OrderCreated = self.fetch(req).await?;
        tracing::info!(order_id = %created.id, store_id = %request.store_id, "Order created");
        Ok(created)
    }

    async fn list_orders(&self, query: &OrderListQuery) -> ApiResult<Page<OrderListItem>> {
        let req = self
            .client
            .get(self.url("orders"))
            .query(&query.to_query_pairs());
        self.fetch(req).await
    }

    async fn get_order(&self, order_id: &str) -> ApiResult<OrderDetail> {
        let req = self.client.get(self.url(&format!("orders/{order_id}")));
        self.fetch(req).await
    }

    async fn update_status(
        &self,
        order_id: &str,
        request: &StatusTransitionRequest,
    ) -> ApiResult<()> {
        let req = self
            .client
            .put(self.url(&format!("orders/{order_id}/status")))
            .json(request);
        self.execute(req).await
    }

    async fn confirm_order(&self, order_id: &str) -> ApiResult<()> {
        let req = self
            .client
            .post(self.url(&format!("orders/{order_id}/confirm")));
        self.execute(req).await
    }

    async fn reject_order(&self, order_id: &str, request: &RejectOrderRequest) -> ApiResult<()> {
        let req = self
            .client
            .post(self.url(&format!("orders/{order_id}/reject")))
            .json(request);
        self.execute(req).await
    }

    async fn saved_addresses(&self, customer_id: &str) -> ApiResult<Vec<SavedAddress>> {
        let req = self
            .client
            .get(self.url(&format!("customers/{customer_id}/addresses")));
        Ok(self.send(req).await?.unwrap_or_default())
    }
}
