//! Data models
//!
//! Catalog and identity entities consumed by the order lifecycle core.
//! The catalog subsystem owns them; the core treats them as immutable.

pub mod actor;
pub mod address;
pub mod product;
pub mod store_info;

// Re-exports
pub use actor::*;
pub use address::*;
pub use product::*;
pub use store_info::*;
