//! Merchant-side order actions

pub mod merchant;

pub use merchant::MerchantOrders;
