//! [`StripeVendor`]: archives Stripe products through `async-stripe`.

use abon_core::store::PriceVendor;
use stripe::{Client, Expandable, Price, PriceId, Product, ProductId, UpdateProduct};
use tracing::info;

use crate::{Error, Result};

pub const DEFAULT_API_BASE: &str = "https://api.stripe.com";

/// Archives the Stripe product behind a price.
///
/// Cheap to clone; the inner HTTP client is shared.
#[derive(Clone)]
pub struct StripeVendor {
  client: Client,
}

impl StripeVendor {
  pub fn new(secret_key: impl Into<String>) -> Self {
    Self { client: Client::new(secret_key) }
  }

  /// Point the client at another API host, e.g. a local mock.
  pub fn with_api_base(secret_key: impl Into<String>, api_base: &str) -> Result<Self> {
    if !(api_base.starts_with("http://") || api_base.starts_with("https://")) {
      return Err(Error::InvalidApiBase(api_base.to_owned()));
    }
    let api_base = api_base.trim_end_matches('/');
    Ok(Self { client: Client::from_url(api_base, secret_key) })
  }

  /// The product the price belongs to.
  async fn product_for_price(&self, price_id: &PriceId) -> Result<ProductId> {
    let price = Price::retrieve(&self.client, price_id, &[]).await?;
    price
      .product
      .as_ref()
      .map(Expandable::id)
      .ok_or_else(|| Error::MissingProduct(price_id.to_string()))
  }

  async fn deactivate_product(&self, product_id: &ProductId) -> Result<Product> {
    let mut params = UpdateProduct::new();
    params.active = Some(false);
    Ok(Product::update(&self.client, product_id, params).await?)
  }
}

impl PriceVendor for StripeVendor {
  type Error = Error;

  async fn archive_product(&self, price_reference: &str) -> Result<()> {
    let price_id: PriceId = price_reference
      .parse()
      .map_err(|source| Error::InvalidPriceId { id: price_reference.to_owned(), source })?;
    let product_id = self.product_for_price(&price_id).await?;
    let product = self.deactivate_product(&product_id).await?;
    info!(
      product = %product.id,
      active = ?product.active,
      price = price_reference,
      "archived vendor product"
    );
    Ok(())
  }
}
