//! HTTP-backed [`ServiceCatalog`](abon_core::store::ServiceCatalog).
//!
//! The catalog service answers `POST {base_url}/abonement-services` with the
//! services attached to each requested abonement.

mod client;

pub mod error;

pub use client::HttpServiceCatalog;
pub use error::{Error, Result};
