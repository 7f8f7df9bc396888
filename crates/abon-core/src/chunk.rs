//! Chunk messages of the streaming create and update calls.
//!
//! A chunk may carry the abonement metadata, a fragment of the photo, both,
//! or neither. Photo fragments travel as base64 strings.

use bytes::Bytes;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::{
  Result,
  abonement::{CreateCommand, UpdateCommand, parse_id},
  reassemble::Chunk,
};

/// Metadata carried by a create stream.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AbonementData {
  pub title:           String,
  pub validity:        String,
  pub visiting_time:   String,
  pub price:           u32,
  #[serde(default, skip_serializing_if = "String::is_empty")]
  pub price_reference: String,
}

impl AbonementData {
  pub fn into_command(self, id: Uuid, photo: Option<Bytes>) -> CreateCommand {
    CreateCommand {
      id,
      title: self.title,
      validity: self.validity,
      visiting_time: self.visiting_time,
      price: self.price,
      price_reference: self.price_reference,
      photo,
    }
  }
}

/// Metadata carried by an update stream. The id is textual until validated.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AbonementDataForUpdate {
  pub id:            String,
  pub title:         String,
  pub validity:      String,
  pub visiting_time: String,
  pub price:         u32,
}

impl AbonementDataForUpdate {
  pub fn into_command(self, photo: Option<Bytes>) -> Result<UpdateCommand> {
    Ok(UpdateCommand {
      id: parse_id(&self.id)?,
      title: self.title,
      validity: self.validity,
      visiting_time: self.visiting_time,
      price: self.price,
      photo,
    })
  }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CreateChunk {
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub abonement: Option<AbonementData>,
  #[serde(default, skip_serializing_if = "Option::is_none", with = "base64_bytes")]
  pub photo:     Option<Vec<u8>>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct UpdateChunk {
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub abonement: Option<AbonementDataForUpdate>,
  #[serde(default, skip_serializing_if = "Option::is_none", with = "base64_bytes")]
  pub photo:     Option<Vec<u8>>,
}

impl Chunk for CreateChunk {
  type Metadata = AbonementData;

  fn take_metadata(&mut self) -> Option<AbonementData> { self.abonement.take() }

  fn take_fragment(&mut self) -> Option<Vec<u8>> { self.photo.take() }
}

impl Chunk for UpdateChunk {
  type Metadata = AbonementDataForUpdate;

  fn take_metadata(&mut self) -> Option<AbonementDataForUpdate> {
    self.abonement.take()
  }

  fn take_fragment(&mut self) -> Option<Vec<u8>> { self.photo.take() }
}

mod base64_bytes {
  use base64::{Engine as _, engine::general_purpose::STANDARD as B64};
  use serde::{Deserialize, Deserializer, Serializer, de::Error as _};

  pub fn serialize<S>(bytes: &Option<Vec<u8>>, s: S) -> Result<S::Ok, S::Error>
  where
    S: Serializer,
  {
    match bytes {
      Some(b) => s.serialize_some(&B64.encode(b)),
      None => s.serialize_none(),
    }
  }

  pub fn deserialize<'de, D>(d: D) -> Result<Option<Vec<u8>>, D::Error>
  where
    D: Deserializer<'de>,
  {
    Option::<String>::deserialize(d)?
      .map(|s| B64.decode(s).map_err(D::Error::custom))
      .transpose()
  }
}
