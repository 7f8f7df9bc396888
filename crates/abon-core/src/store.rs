//! Collaborator traits: the metadata repository, the object store, the
//! price vendor and the service catalog.
//!
//! Backends live in their own crates (`abon-store-sqlite`, `abon-objects`,
//! `abon-stripe`, `abon-catalog`). The workflow depends on these traits only.
//!
//! All methods return `Send` futures so implementors can be driven from
//! axum handlers on a multi-threaded runtime.

use std::future::Future;

use bytes::Bytes;
use uuid::Uuid;

use crate::abonement::{Abonement, AbonementServices, AbonementUpdate};

// ─── Metadata repository ─────────────────────────────────────────────────────

/// Structured storage for abonement records.
///
/// "Not found" is reported through `Option`/`bool` return values, never
/// through `Self::Error`.
pub trait AbonementRepository: Send + Sync {
  type Error: std::error::Error + Send + Sync + 'static;

  /// Insert a new record. Fails if the id is already taken.
  fn create_abonement(
    &self,
    abonement: Abonement,
  ) -> impl Future<Output = Result<Abonement, Self::Error>> + Send + '_;

  fn get_abonement(
    &self,
    id: Uuid,
  ) -> impl Future<Output = Result<Option<Abonement>, Self::Error>> + Send + '_;

  /// Records for the given ids. Unknown ids are skipped.
  fn get_abonements_by_ids<'a>(
    &'a self,
    ids: &'a [Uuid],
  ) -> impl Future<Output = Result<Vec<Abonement>, Self::Error>> + Send + 'a;

  fn list_abonements(
    &self,
  ) -> impl Future<Output = Result<Vec<Abonement>, Self::Error>> + Send + '_;

  /// Replace every mutable column of an existing row. Returns `false` if no
  /// row has `update.id`.
  fn update_abonement(
    &self,
    update: AbonementUpdate,
  ) -> impl Future<Output = Result<bool, Self::Error>> + Send + '_;

  /// Returns `false` if no row had `id`.
  fn delete_abonement(
    &self,
    id: Uuid,
  ) -> impl Future<Output = Result<bool, Self::Error>> + Send + '_;
}

// ─── Object store ────────────────────────────────────────────────────────────

/// Key-addressed binary storage for photos.
pub trait ObjectStore: Send + Sync {
  type Error: std::error::Error + Send + Sync + 'static;

  /// Store `bytes` under `key`, replacing any previous object, and return a
  /// locator for it.
  fn put_object<'a>(
    &'a self,
    key: &'a str,
    bytes: Bytes,
  ) -> impl Future<Output = Result<String, Self::Error>> + Send + 'a;

  /// `None` if nothing is stored under `key`.
  fn get_object<'a>(
    &'a self,
    key: &'a str,
  ) -> impl Future<Output = Result<Option<Bytes>, Self::Error>> + Send + 'a;

  /// Deleting a missing key succeeds.
  fn delete_object<'a>(
    &'a self,
    key: &'a str,
  ) -> impl Future<Output = Result<(), Self::Error>> + Send + 'a;
}

// ─── Price vendor ────────────────────────────────────────────────────────────

/// The billing vendor holding a product/price pair for each abonement.
pub trait PriceVendor: Send + Sync {
  type Error: std::error::Error + Send + Sync + 'static;

  /// Archive the product the given price belongs to.
  fn archive_product<'a>(
    &'a self,
    price_reference: &'a str,
  ) -> impl Future<Output = Result<(), Self::Error>> + Send + 'a;
}

/// `None` disables archival.
impl<V: PriceVendor> PriceVendor for Option<V> {
  type Error = V::Error;

  async fn archive_product(&self, price_reference: &str) -> Result<(), V::Error> {
    match self {
      Some(vendor) => vendor.archive_product(price_reference).await,
      None => {
        tracing::debug!(price_reference, "price vendor disabled, skipping archival");
        Ok(())
      }
    }
  }
}

// ─── Service catalog ─────────────────────────────────────────────────────────

/// The external catalog of services offered under each abonement.
pub trait ServiceCatalog: Send + Sync {
  type Error: std::error::Error + Send + Sync + 'static;

  /// Service entries for the given abonements. An id may appear in several
  /// entries or in none.
  fn services_for_abonements<'a>(
    &'a self,
    abonement_ids: &'a [Uuid],
  ) -> impl Future<Output = Result<Vec<AbonementServices>, Self::Error>> + Send + 'a;
}

/// `None` lists every abonement without services.
impl<C: ServiceCatalog> ServiceCatalog for Option<C> {
  type Error = C::Error;

  async fn services_for_abonements(
    &self,
    abonement_ids: &[Uuid],
  ) -> Result<Vec<AbonementServices>, C::Error> {
    match self {
      Some(catalog) => catalog.services_for_abonements(abonement_ids).await,
      None => {
        tracing::debug!("service catalog disabled, listing without services");
        Ok(Vec::new())
      }
    }
  }
}
