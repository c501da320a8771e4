//! Subscription domain module.
//!
//! Plans, gateway orders, payment confirmations, the subscription state kept
//! on a profile, and the ledger of completed payments.
//!
//! # Module Structure
//!
//! - `plan` - Plan catalog
//! - `order` - Gateway orders and their notes
//! - `payment` - Checkout payment confirmation
//! - `signature` - HMAC verification of payment confirmations
//! - `state` - Subscription state, windows and grants
//! - `profile` - Profiles and lookup results
//! - `ledger` - Payments ledger entries

mod currency;
mod errors;
mod ledger;
mod order;
mod payment;
mod plan;
mod profile;
pub mod signature;
mod state;

pub use currency::CurrencyCode;
pub use errors::SubscriptionError;
pub use ledger::{AppendOutcome, LedgerEntry, LedgerStatus, PAYMENT_METHOD_RAZORPAY};
pub use order::{NewOrder, Order, OrderNotes, OrderStatus, MAX_NOTES, MAX_RECEIPT_LEN};
pub use payment::Payment;
pub use plan::{CatalogError, Plan, PlanCatalog, MAX_DURATION_MONTHS};
pub use profile::{AppliedPlan, Profile, ProfileLookup};
pub use signature::PaymentSignatureVerifier;
pub use state::{PlanGrant, PlanStatus, Subscription, SubscriptionWindow};
