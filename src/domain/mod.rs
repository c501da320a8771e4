//! Domain layer containing business logic and domain types.
//!
//! # Module Organization
//!
//! - `foundation` - Shared domain primitives (IDs, timestamps, auth, errors)
//! - `subscription` - Plans, orders, payments, subscription state and ledger

pub mod foundation;
pub mod subscription;
