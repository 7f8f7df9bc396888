//! Error type for `abon-stripe`.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
  #[error("stripe error: {0}")]
  Stripe(#[from] stripe::StripeError),

  #[error("invalid api base url: {0:?}")]
  InvalidApiBase(String),

  #[error("invalid stripe price id {id:?}: {source}")]
  InvalidPriceId {
    id:     String,
    #[source]
    source: stripe::ParseIdError,
  },

  /// The price carries no product reference.
  #[error("stripe price {0} has no product")]
  MissingProduct(String),
}

pub type Result<T, E = Error> = std::result::Result<T, E>;
