//! Shared types for the storefront order lifecycle
//!
//! Catalog models, the order data model (cart line → order → order status),
//! the realtime change rows pushed by the backend, and the unified error
//! vocabulary used by `order-core` and `order-sync`.

pub mod error;
pub mod models;
pub mod order;
pub mod util;

// Re-exports
pub use serde::{Deserialize, Serialize};

pub use error::{AppError, AppResult, ErrorCategory, ErrorCode};
pub use models::{Actor, Customization, DeliveryAddress, Product, SelectionKind, StoreSettings};
pub use order::{CartLine, FulfillmentMethod, Order, OrderStatus, PaymentMethod, RealtimeChange};
