//! Adapters - Implementations of port interfaces.
//!
//! Adapters connect the domain to external systems:
//! - `razorpay` - Order creation and lookup against the Razorpay Orders API
//! - `postgres` - Profiles and the payments ledger in Supabase Postgres
//! - `memory` - In-process stores for tests and local development
//! - `auth` - Supabase session token validation
//! - `http` - axum routes, middleware and DTOs
//! - `clock` - System and fixed clocks

pub mod auth;
pub mod clock;
pub mod http;
pub mod memory;
pub mod postgres;
pub mod razorpay;
