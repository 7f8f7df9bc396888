//! Core types, collaborator traits and the write workflow for the abonement
//! service.
//!
//! This crate is free of HTTP and database dependencies. Storage backends,
//! the vendor client and the transport all depend on it.

// Native `async fn` in traits; the `Send` bounds are spelled out on the
// trait signatures instead.
#![allow(async_fn_in_trait)]

pub mod abonement;
pub mod chunk;
pub mod error;
pub mod reassemble;
pub mod store;
pub mod workflow;

pub use error::{Error, ErrorKind, Result};
pub use workflow::AbonementService;
