//! [`AbonementService`]: the create, update and delete workflows that
//! coordinate the object store with the metadata repository, and the
//! listing that joins records with the service catalog.
//!
//! The two stores share no transaction. When the second write of a workflow
//! fails, a single compensating action is attempted on the first store. A
//! failed compensation is reported as [`Error::RollbackFailed`]; nothing is
//! retried.

use std::fmt::Display;

use bytes::Bytes;
use chrono::Utc;
use futures::Stream;
use tracing::{debug, error, info, warn};
use uuid::Uuid;

use crate::{
  Error, Result,
  abonement::{
    Abonement, AbonementUpdate, AbonementWithServices, CreateCommand,
    UpdateCommand, check_title, photo_key,
  },
  chunk::{CreateChunk, UpdateChunk},
  reassemble::reassemble,
  store::{AbonementRepository, ObjectStore, PriceVendor, ServiceCatalog},
};

/// Orchestrates the abonement workflows over the four collaborators.
pub struct AbonementService<R, O, V, C> {
  repo:    R,
  objects: O,
  vendor:  V,
  catalog: C,
}

impl<R, O, V, C> AbonementService<R, O, V, C>
where
  R: AbonementRepository,
  O: ObjectStore,
  V: PriceVendor,
  C: ServiceCatalog,
{
  pub fn new(repo: R, objects: O, vendor: V, catalog: C) -> Self {
    Self { repo, objects, vendor, catalog }
  }

  pub fn repository(&self) -> &R { &self.repo }

  pub fn objects(&self) -> &O { &self.objects }

  pub fn vendor(&self) -> &V { &self.vendor }

  pub fn catalog(&self) -> &C { &self.catalog }

  // ── Streaming entry points ────────────────────────────────────────────────

  /// Reassemble a create stream and run [`create`](Self::create) with a
  /// freshly generated id.
  pub async fn create_streamed<S, E>(&self, chunks: S) -> Result<Abonement>
  where
    S: Stream<Item = Result<CreateChunk, E>> + Send,
    E: Display + Send,
  {
    let upload = reassemble(chunks).await.map_err(|e| {
      warn!(error = %e, "rejected malformed create stream");
      Error::InvalidInput(format!("invalid request data: {e}"))
    })?;
    let photo = upload.photo();
    let data = upload
      .metadata
      .ok_or_else(|| Error::InvalidInput("abonement data is empty".into()))?;

    self.create(data.into_command(Uuid::new_v4(), photo)).await
  }

  /// Reassemble an update stream and run [`update`](Self::update).
  pub async fn update_streamed<S, E>(&self, chunks: S) -> Result<Abonement>
  where
    S: Stream<Item = Result<UpdateChunk, E>> + Send,
    E: Display + Send,
  {
    let upload = reassemble(chunks).await.map_err(|e| {
      warn!(error = %e, "rejected malformed update stream");
      Error::InvalidInput(format!("invalid request data: {e}"))
    })?;
    let photo = upload.photo();
    let data = upload
      .metadata
      .ok_or_else(|| Error::InvalidInput("abonement data is empty".into()))?;

    self.update(data.into_command(photo)?).await
  }

  // ── Create ────────────────────────────────────────────────────────────────

  pub async fn create(&self, cmd: CreateCommand) -> Result<Abonement> {
    check_title(&cmd.title)?;

    let key = photo_key(cmd.id);
    let photo = match cmd.photo {
      Some(bytes) => {
        let size = bytes.len();
        let locator = self
          .objects
          .put_object(&key, bytes)
          .await
          .map_err(|e| {
            error!(key = %key, error = %e, "failed to store abonement photo");
            Error::internal("failed to store abonement photo", e)
          })?;
        debug!(key = %key, size, "stored abonement photo");
        Some(locator)
      }
      None => None,
    };

    let now = Utc::now();
    let record = Abonement {
      id:              cmd.id,
      title:           cmd.title,
      validity:        cmd.validity,
      visiting_time:   cmd.visiting_time,
      photo:           photo.clone().unwrap_or_default(),
      price:           cmd.price,
      price_reference: cmd.price_reference,
      created_time:    now,
      updated_time:    now,
    };

    match self.repo.create_abonement(record).await {
      Ok(created) => {
        info!(id = %created.id, "created abonement");
        Ok(created)
      }
      Err(e) => {
        error!(id = %cmd.id, error = %e, "failed to create abonement");
        let cause: crate::error::BoxError = Box::new(e);
        if photo.is_none() {
          return Err(Error::Internal { context: "failed to create abonement", source: cause });
        }
        match self.objects.delete_object(&key).await {
          Ok(()) => {
            warn!(key = %key, "removed orphaned abonement photo");
            Err(Error::Internal { context: "failed to create abonement", source: cause })
          }
          Err(rollback) => {
            error!(key = %key, error = %rollback, "failed to remove orphaned abonement photo");
            Err(Error::RollbackFailed {
              context:  "failed to create abonement",
              cause,
              rollback: Box::new(rollback),
            })
          }
        }
      }
    }
  }

  // ── Update ────────────────────────────────────────────────────────────────

  pub async fn update(&self, cmd: UpdateCommand) -> Result<Abonement> {
    check_title(&cmd.title)?;

    let existing = self.get(cmd.id).await?;
    let key = photo_key(cmd.id);

    // `Some(previous)` once the photo has been overwritten; `previous` is
    // `None` when there was no object to restore.
    let mut replaced: Option<Option<Bytes>> = None;
    let mut photo = existing.photo.clone();

    if let Some(bytes) = cmd.photo {
      let previous = self
        .objects
        .get_object(&key)
        .await
        .map_err(|e| {
          error!(key = %key, error = %e, "failed to read previous abonement photo");
          Error::internal("failed to read previous abonement photo", e)
        })?;

      photo = self
        .objects
        .put_object(&key, bytes)
        .await
        .map_err(|e| {
          error!(key = %key, error = %e, "failed to store abonement photo");
          Error::internal("failed to store abonement photo", e)
        })?;
      replaced = Some(previous);
    }

    let update = AbonementUpdate {
      id: cmd.id,
      title: cmd.title,
      validity: cmd.validity,
      visiting_time: cmd.visiting_time,
      photo,
      price: cmd.price,
      updated_time: Utc::now().max(existing.created_time),
    };

    let failure = match self.repo.update_abonement(update).await {
      Ok(true) => None,
      Ok(false) => Some(Error::NotFound(cmd.id)),
      Err(e) => {
        error!(id = %cmd.id, error = %e, "failed to update abonement");
        Some(Error::internal("failed to update abonement", e))
      }
    };

    if let Some(failure) = failure {
      let Some(previous) = replaced else {
        return Err(failure);
      };
      return Err(self.restore_photo(&key, previous, failure).await);
    }

    info!(id = %cmd.id, "updated abonement");
    self.get(cmd.id).await
  }

  /// Put back the photo overwritten by a failed update.
  async fn restore_photo(
    &self,
    key: &str,
    previous: Option<Bytes>,
    failure: Error,
  ) -> Error {
    let restored = match previous {
      Some(bytes) => self.objects.put_object(key, bytes).await.map(drop),
      None => self.objects.delete_object(key).await,
    };

    match restored {
      Ok(()) => {
        warn!(key = %key, "restored previous abonement photo");
        failure
      }
      Err(rollback) => {
        error!(
          key = %key,
          error = %rollback,
          "failed to restore previous abonement photo, photo and metadata now disagree"
        );
        Error::RollbackFailed {
          context:  "failed to update abonement",
          cause:    Box::new(failure),
          rollback: Box::new(rollback),
        }
      }
    }
  }

  // ── Delete ────────────────────────────────────────────────────────────────

  /// Delete the record and archive its billing product.
  ///
  /// Archival runs after the deletion has committed; its failure is logged
  /// and the deletion stands. The photo object is not removed and stays
  /// readable through [`photo`](Self::photo) after the record is gone.
  pub async fn delete(&self, id: Uuid) -> Result<Abonement> {
    let snapshot = self.get(id).await?;

    let deleted = self.repo.delete_abonement(id).await.map_err(|e| {
      error!(id = %id, error = %e, "failed to delete abonement");
      Error::internal("failed to delete abonement", e)
    })?;
    if !deleted {
      return Err(Error::NotFound(id));
    }
    info!(id = %id, "deleted abonement");

    if snapshot.price_reference.is_empty() {
      debug!(id = %id, "abonement has no price reference, nothing to archive");
    } else if let Err(e) = self.vendor.archive_product(&snapshot.price_reference).await {
      warn!(
        id = %id,
        price_reference = %snapshot.price_reference,
        error = %e,
        "failed to archive vendor product, deletion stands"
      );
    }

    Ok(snapshot)
  }

  // ── Queries ───────────────────────────────────────────────────────────────

  pub async fn get(&self, id: Uuid) -> Result<Abonement> {
    self
      .repo
      .get_abonement(id)
      .await
      .map_err(|e| Error::internal("failed to get abonement", e))?
      .ok_or(Error::NotFound(id))
  }

  pub async fn get_many(&self, ids: &[Uuid]) -> Result<Vec<Abonement>> {
    self
      .repo
      .get_abonements_by_ids(ids)
      .await
      .map_err(|e| Error::internal("failed to get abonements", e))
  }

  pub async fn list(&self) -> Result<Vec<Abonement>> {
    self
      .repo
      .list_abonements()
      .await
      .map_err(|e| Error::internal("failed to list abonements", e))
  }

  /// The stored photo bytes of an abonement.
  pub async fn photo(&self, id: Uuid) -> Result<Bytes> {
    let key = photo_key(id);
    self
      .objects
      .get_object(&key)
      .await
      .map_err(|e| Error::internal("failed to read abonement photo", e))?
      .ok_or(Error::PhotoNotFound(id))
  }

  /// Every abonement with the services the catalog lists for it.
  ///
  /// Catalog entries for unknown ids are ignored; abonements without an
  /// entry get an empty service list.
  pub async fn list_with_services(&self) -> Result<Vec<AbonementWithServices>> {
    let abonements = self.list().await?;
    if abonements.is_empty() {
      return Ok(Vec::new());
    }

    let ids: Vec<Uuid> = abonements.iter().map(|a| a.id).collect();
    let entries = self
      .catalog
      .services_for_abonements(&ids)
      .await
      .map_err(|e| {
        error!(count = ids.len(), error = %e, "failed to get abonement services");
        Error::internal("failed to get abonement services", e)
      })?;

    let mut listed: Vec<AbonementWithServices> = abonements
      .into_iter()
      .map(|abonement| AbonementWithServices { abonement, services: Vec::new() })
      .collect();
    for entry in entries {
      if let Some(item) = listed.iter_mut().find(|a| a.abonement.id == entry.abonement_id) {
        item.services.extend(entry.services);
      }
    }
    Ok(listed)
  }
}
