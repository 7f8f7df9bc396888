//! [`SqliteStore`]: the SQLite implementation of [`AbonementRepository`].

use std::path::Path;

use abon_core::{
  abonement::{Abonement, AbonementUpdate},
  store::AbonementRepository,
};
use rusqlite::OptionalExtension as _;
use uuid::Uuid;

use crate::{
  Result,
  encode::{COLUMNS, RawAbonement, encode_dt, encode_uuid},
  schema::SCHEMA,
};

// ─── Store ───────────────────────────────────────────────────────────────────

/// An abonement repository backed by a single SQLite file.
///
/// Cloning is cheap; the inner connection is reference-counted.
#[derive(Clone)]
pub struct SqliteStore {
  conn: tokio_rusqlite::Connection,
}

impl SqliteStore {
  /// Open (or create) a store at `path` and run schema initialisation.
  pub async fn open(path: impl AsRef<Path>) -> Result<Self> {
    let conn = tokio_rusqlite::Connection::open(path).await?;
    let store = Self { conn };
    store.init_schema().await?;
    Ok(store)
  }

  /// Open an in-memory store; useful for testing.
  pub async fn open_in_memory() -> Result<Self> {
    let conn = tokio_rusqlite::Connection::open_in_memory().await?;
    let store = Self { conn };
    store.init_schema().await?;
    Ok(store)
  }

  async fn init_schema(&self) -> Result<()> {
    self
      .conn
      .call(|conn| {
        conn.execute_batch(SCHEMA)?;
        Ok(())
      })
      .await?;
    Ok(())
  }
}

// ─── AbonementRepository impl ────────────────────────────────────────────────

impl AbonementRepository for SqliteStore {
  type Error = crate::Error;

  async fn create_abonement(&self, abonement: Abonement) -> Result<Abonement> {
    let id_str      = encode_uuid(abonement.id);
    let title       = abonement.title.clone();
    let validity    = abonement.validity.clone();
    let visiting    = abonement.visiting_time.clone();
    let photo       = abonement.photo.clone();
    let price       = i64::from(abonement.price);
    let price_ref   = abonement.price_reference.clone();
    let created_str = encode_dt(abonement.created_time);
    let updated_str = encode_dt(abonement.updated_time);

    self
      .conn
      .call(move |conn| {
        conn.execute(
          "INSERT INTO abonements (
             id, title, validity, visiting_time, photo, price,
             price_reference, created_time, updated_time
           ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9)",
          rusqlite::params![
            id_str,
            title,
            validity,
            visiting,
            photo,
            price,
            price_ref,
            created_str,
            updated_str,
          ],
        )?;
        Ok(())
      })
      .await?;

    tracing::debug!(id = %abonement.id, "inserted abonement row");
    Ok(abonement)
  }

  async fn get_abonement(&self, id: Uuid) -> Result<Option<Abonement>> {
    let id_str = encode_uuid(id);

    let raw: Option<RawAbonement> = self
      .conn
      .call(move |conn| {
        Ok(conn
          .query_row(
            &format!("SELECT {COLUMNS} FROM abonements WHERE id = ?1"),
            rusqlite::params![id_str],
            RawAbonement::from_row,
          )
          .optional()?)
      })
      .await?;

    raw.map(RawAbonement::into_abonement).transpose()
  }

  async fn get_abonements_by_ids(&self, ids: &[Uuid]) -> Result<Vec<Abonement>> {
    if ids.is_empty() {
      return Ok(Vec::new());
    }

    let id_strs: Vec<String> = ids.iter().copied().map(encode_uuid).collect();
    let placeholders = (1..=id_strs.len())
      .map(|i| format!("?{i}"))
      .collect::<Vec<_>>()
      .join(", ");

    let raws: Vec<RawAbonement> = self
      .conn
      .call(move |conn| {
        let mut stmt = conn.prepare(&format!(
          "SELECT {COLUMNS} FROM abonements
           WHERE id IN ({placeholders})
           ORDER BY created_time, id"
        ))?;
        let rows = stmt
          .query_map(rusqlite::params_from_iter(id_strs.iter()), RawAbonement::from_row)?
          .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(rows)
      })
      .await?;

    raws.into_iter().map(RawAbonement::into_abonement).collect()
  }

  async fn list_abonements(&self) -> Result<Vec<Abonement>> {
    let raws: Vec<RawAbonement> = self
      .conn
      .call(|conn| {
        let mut stmt = conn.prepare(&format!(
          "SELECT {COLUMNS} FROM abonements ORDER BY created_time, id"
        ))?;
        let rows = stmt
          .query_map([], RawAbonement::from_row)?
          .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(rows)
      })
      .await?;

    raws.into_iter().map(RawAbonement::into_abonement).collect()
  }

  async fn update_abonement(&self, update: AbonementUpdate) -> Result<bool> {
    let id_str      = encode_uuid(update.id);
    let price       = i64::from(update.price);
    let updated_str = encode_dt(update.updated_time);

    let changed = self
      .conn
      .call(move |conn| {
        Ok(conn.execute(
          "UPDATE abonements
           SET title = ?2, validity = ?3, visiting_time = ?4, photo = ?5,
               price = ?6, updated_time = ?7
           WHERE id = ?1",
          rusqlite::params![
            id_str,
            update.title,
            update.validity,
            update.visiting_time,
            update.photo,
            price,
            updated_str,
          ],
        )?)
      })
      .await?;

    Ok(changed > 0)
  }

  async fn delete_abonement(&self, id: Uuid) -> Result<bool> {
    let id_str = encode_uuid(id);

    let changed = self
      .conn
      .call(move |conn| {
        Ok(conn.execute(
          "DELETE FROM abonements WHERE id = ?1",
          rusqlite::params![id_str],
        )?)
      })
      .await?;

    Ok(changed > 0)
  }
}
