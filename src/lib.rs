//! nox-billing - Razorpay subscription payments reconciled into Supabase profiles
//!
//! Checkout creates a Razorpay order for a catalog plan. Once the client
//! completes payment, the confirmation is verified by HMAC signature and the
//! plan is granted on the user's profile, with the payment recorded in an
//! append-only ledger.

pub mod adapters;
pub mod application;
pub mod config;
pub mod domain;
pub mod ports;
pub mod telemetry;
