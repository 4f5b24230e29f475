//! CheckoutOrchestrator
//!
//! Three-step checkout: address/fulfillment → payment → confirmation.
//!
//! - [`session`]: the step machine and submission
//! - [`guards`]: address and store-level submission rules
//! - [`address`]: field validation, postal code, pre-fill form state
//! - [`payload`]: cart lines → create-order request

pub mod address;
pub mod error;
pub mod guards;
pub mod payload;
pub mod session;

pub use address::{AddressErrors, AddressField, AddressForm, validate_address};
pub use error::{CheckoutError, PreconditionFailure};
pub use session::{CheckoutSession, CheckoutStep, SubmittedOrder};
