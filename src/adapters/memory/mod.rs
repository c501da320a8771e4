//! In-memory adapters for the profile store and payments ledger.
//!
//! Used by tests and local development. Both support outage injection.

mod payment_ledger;
mod profile_store;

pub use payment_ledger::InMemoryPaymentLedger;
pub use profile_store::InMemoryProfileStore;
