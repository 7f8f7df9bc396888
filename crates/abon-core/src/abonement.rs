//! The abonement record and the commands that create and replace it.

use bytes::Bytes;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::{Error, Result};

/// Prefix of every photo key in the object store.
pub const PHOTO_KEY_PREFIX: &str = "abonement/";

/// A subscription plan.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Abonement {
  pub id:              Uuid,
  pub title:           String,
  /// Duration descriptor such as `"30d"`; not interpreted here.
  pub validity:        String,
  /// Visiting-hours descriptor; not interpreted here.
  pub visiting_time:   String,
  /// Locator of the stored photo, or empty when there is none.
  pub photo:           String,
  /// Price in minor currency units.
  pub price:           u32,
  /// Vendor-side price id used to archive the billing product on delete.
  #[serde(default)]
  pub price_reference: String,
  pub created_time:    DateTime<Utc>,
  pub updated_time:    DateTime<Utc>,
}

/// A service offered under an abonement, as listed by the service catalog.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ServiceSummary {
  pub id:    Uuid,
  pub title: String,
  #[serde(default)]
  pub photo: String,
}

/// One catalog entry: the services attached to an abonement.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AbonementServices {
  pub abonement_id: Uuid,
  pub services:     Vec<ServiceSummary>,
}

/// An abonement together with its services.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AbonementWithServices {
  pub abonement: Abonement,
  pub services:  Vec<ServiceSummary>,
}

/// Input to [`AbonementService::create`](crate::AbonementService::create).
#[derive(Debug, Clone)]
pub struct CreateCommand {
  pub id:              Uuid,
  pub title:           String,
  pub validity:        String,
  pub visiting_time:   String,
  pub price:           u32,
  pub price_reference: String,
  pub photo:           Option<Bytes>,
}

/// Input to [`AbonementService::update`](crate::AbonementService::update).
///
/// Every field replaces the stored value. `created_time` and
/// `price_reference` are kept from the stored record, and so is `photo`
/// unless new photo bytes are supplied.
#[derive(Debug, Clone)]
pub struct UpdateCommand {
  pub id:            Uuid,
  pub title:         String,
  pub validity:      String,
  pub visiting_time: String,
  pub price:         u32,
  pub photo:         Option<Bytes>,
}

/// The full-replace row update handed to the metadata repository.
#[derive(Debug, Clone)]
pub struct AbonementUpdate {
  pub id:            Uuid,
  pub title:         String,
  pub validity:      String,
  pub visiting_time: String,
  pub photo:         String,
  pub price:         u32,
  pub updated_time:  DateTime<Utc>,
}

/// Object-store key of the photo belonging to `id`.
///
/// The key is stable across updates, so a new photo overwrites the old one.
pub fn photo_key(id: Uuid) -> String { format!("{PHOTO_KEY_PREFIX}{id}") }

/// Parse a textual identifier received at the transport boundary.
pub fn parse_id(raw: &str) -> Result<Uuid> {
  let id = Uuid::parse_str(raw.trim())
    .map_err(|e| Error::InvalidInput(format!("malformed id {raw:?}: {e}")))?;
  if id.is_nil() {
    return Err(Error::InvalidInput("nil id".into()));
  }
  Ok(id)
}

/// Parse a comma-separated list of identifiers, ignoring empty entries.
pub fn parse_ids(raw: &str) -> Result<Vec<Uuid>> {
  raw
    .split(',')
    .filter(|s| !s.trim().is_empty())
    .map(parse_id)
    .collect()
}

pub(crate) fn check_title(title: &str) -> Result<()> {
  if title.trim().is_empty() {
    return Err(Error::InvalidInput("title must not be empty".into()));
  }
  Ok(())
}
