//! Order Lifecycle Module
//!
//! This module provides the types shared by pricing, checkout and sync:
//! - Cart lines: priced, customized units awaiting checkout
//! - Orders: server-confirmed state after submission
//! - Status: the shared status vocabulary and legal-transition table
//! - Requests: payloads sent to the order backend
//! - Changes: realtime row-change notifications pushed by the backend

pub mod change;
pub mod request;
pub mod snapshot;
pub mod status;
pub mod types;

// Re-exports
pub use change::{ChangeEventType, OrderRow, RealtimeChange};
pub use request::*;
pub use snapshot::{Order, OrderDetail, OrderItem, OrderItemCustomization, OrderListItem, StatusHistoryEntry};
pub use status::{MerchantAction, OrderStatus};
pub use types::*;
