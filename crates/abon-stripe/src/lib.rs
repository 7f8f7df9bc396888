//! Stripe-backed [`PriceVendor`](abon_core::store::PriceVendor).
//!
//! Only the calls the abonement workflows need are implemented: resolving a
//! price to its product and archiving that product.

mod client;

pub mod error;

pub use client::{DEFAULT_API_BASE, StripeVendor};
pub use error::{Error, Result};
