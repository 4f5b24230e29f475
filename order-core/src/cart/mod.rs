//! CartStore
//!
//! - [`store`]: the cart itself (merge-on-add, remove, quantity, totals)
//! - [`identity`]: line merge key
//! - [`storage`]: durable snapshot behind [`CartStorage`]

pub mod error;
pub mod identity;
pub mod storage;
pub mod store;

pub use error::CartError;
pub use identity::line_key;
pub use storage::{CART_KEY, CartStorage, RedbCartStorage, StorageError, StorageResult};
pub use store::{CartStore, SharedCart};
