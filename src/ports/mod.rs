//! Ports - Interfaces for external dependencies.
//!
//! Following hexagonal architecture, ports define the contracts between
//! the domain and the outside world. Adapters implement these ports.
//!
//! - `PaymentGateway` - Order creation and lookup at the payment gateway
//! - `ProfileStore` - Subscription fields on user profiles
//! - `PaymentLedger` - Append-only record of verified payments
//! - `SessionValidator` - Bearer token validation
//! - `Clock` - Current time

mod clock;
mod payment_gateway;
mod payment_ledger;
mod profile_store;
mod session_validator;

pub use clock::Clock;
pub use payment_gateway::{GatewayError, GatewayErrorCode, PaymentGateway};
pub use payment_ledger::PaymentLedger;
pub use profile_store::ProfileStore;
pub use session_validator::SessionValidator;
