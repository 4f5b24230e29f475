//! Storefront order lifecycle core
//!
//! # Modules
//!
//! ```text
//! order-core/src/
//! ├── core/       # configuration
//! ├── utils/      # logging, input validation
//! ├── pricing/    # selection validation + line/cart pricing
//! ├── cart/       # cart store, line identity, durable snapshot
//! ├── checkout/   # three-step checkout session
//! ├── orders/     # merchant order actions
//! └── api.rs      # order backend collaborator (trait + HTTP)
//! ```
//!
//! Data flow: `pricing` feeds `cart`; `checkout` consumes a cart snapshot and
//! drives `api::OrderApi::create_order`; status changes after submission
//! arrive through `order-sync`.

pub mod api;
pub mod cart;
pub mod checkout;
pub mod core;
pub mod orders;
pub mod pricing;
pub mod utils;

pub use api::{ApiError, HttpOrderApi, OrderApi};
pub use cart::{CartError, CartStorage, CartStore, RedbCartStorage, StorageError};
pub use checkout::{CheckoutError, CheckoutSession, CheckoutStep, SubmittedOrder};
pub use core::Config;
pub use orders::MerchantOrders;
pub use pricing::{PricingError, Selections};

pub use utils::logger::{init_logger, init_logger_with_file};

/// Load `.env`, build the configuration, create the work directory and
/// start logging
pub fn setup_environment() -> std::io::Result<Config> {
    dotenv::dotenv().ok();
    let config = Config::from_env();
    std::fs::create_dir_all(config.log_dir())?;
    let log_level = if config.is_production() { "info" } else { "debug" };
    init_logger_with_file(Some(log_level), Some(&config.log_dir()));
    tracing::info!(
        work_dir = %config.work_dir,
        environment = %config.environment,
        "Order core environment ready"
    );
    Ok(config)
}
