//! Encoding and decoding helpers between domain types and the plain-text
//! representations stored in SQLite columns.
//!
//! Timestamps are stored as fixed-width RFC 3339 strings (nanoseconds, `Z`
//! suffix) so that lexical order matches chronological order. UUIDs are
//! stored as hyphenated lowercase strings.

use abon_core::abonement::Abonement;
use chrono::{DateTime, SecondsFormat, Utc};
use uuid::Uuid;

use crate::{Error, Result};

// ─── Uuid ─────────────────────────────────────────────────────────────────────

pub fn encode_uuid(id: Uuid) -> String { id.hyphenated().to_string() }

pub fn decode_uuid(s: &str) -> Result<Uuid> { Ok(Uuid::parse_str(s)?) }

// ─── DateTime<Utc> ────────────────────────────────────────────────────────────

pub fn encode_dt(dt: DateTime<Utc>) -> String {
  dt.to_rfc3339_opts(SecondsFormat::Nanos, true)
}

pub fn decode_dt(s: &str) -> Result<DateTime<Utc>> {
  DateTime::parse_from_rfc3339(s)
    .map(|dt| dt.with_timezone(&Utc))
    .map_err(|e| Error::DateParse(e.to_string()))
}

// ─── Price ────────────────────────────────────────────────────────────────────

pub fn decode_price(raw: i64) -> Result<u32> {
  u32::try_from(raw).map_err(|_| Error::PriceOutOfRange(raw))
}

// ─── Row type ────────────────────────────────────────────────────────────────

/// Column list matching [`RawAbonement::from_row`].
pub const COLUMNS: &str = "id, title, validity, visiting_time, photo, price, \
                           price_reference, created_time, updated_time";

/// Raw values read directly from an `abonements` row.
pub struct RawAbonement {
  pub id:              String,
  pub title:           String,
  pub validity:        String,
  pub visiting_time:   String,
  pub photo:           String,
  pub price:           i64,
  pub price_reference: String,
  pub created_time:    String,
  pub updated_time:    String,
}

impl RawAbonement {
  pub fn from_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<Self> {
    Ok(Self {
      id:              row.get(0)?,
      title:           row.get(1)?,
      validity:        row.get(2)?,
      visiting_time:   row.get(3)?,
      photo:           row.get(4)?,
      price:           row.get(5)?,
      price_reference: row.get(6)?,
      created_time:    row.get(7)?,
      updated_time:    row.get(8)?,
    })
  }

  pub fn into_abonement(self) -> Result<Abonement> {
    Ok(Abonement {
      id:              decode_uuid(&self.id)?,
      title:           self.title,
      validity:        self.validity,
      visiting_time:   self.visiting_time,
      photo:           self.photo,
      price:           decode_price(self.price)?,
      price_reference: self.price_reference,
      created_time:    decode_dt(&self.created_time)?,
      updated_time:    decode_dt(&self.updated_time)?,
    })
  }
}
