//! Splitting a photo into the chunk sequence of a streaming call.
//!
//! The metadata rides on the first chunk. Each chunk carries at most
//! `chunk_size` photo bytes. A call without a photo is a single
//! metadata-only chunk.

use std::num::NonZeroUsize;

use abon_core::chunk::{AbonementData, AbonementDataForUpdate, CreateChunk, UpdateChunk};
use bytes::Bytes;

pub const DEFAULT_CHUNK_SIZE: NonZeroUsize = NonZeroUsize::new(4096).unwrap();

/// Pair `metadata` with the fragments of `photo`.
fn split<M>(
  metadata: M,
  photo: &[u8],
  chunk_size: NonZeroUsize,
) -> impl Iterator<Item = (Option<M>, Option<Vec<u8>>)> {
  let mut metadata = Some(metadata);
  let mut fragments: Vec<Option<Vec<u8>>> = photo
    .chunks(chunk_size.get())
    .map(|c| Some(c.to_vec()))
    .collect();
  if fragments.is_empty() {
    fragments.push(None);
  }
  fragments.into_iter().map(move |f| (metadata.take(), f))
}

pub fn create_chunks(
  data: AbonementData,
  photo: &[u8],
  chunk_size: NonZeroUsize,
) -> Vec<CreateChunk> {
  split(data, photo, chunk_size)
    .map(|(abonement, photo)| CreateChunk { abonement, photo })
    .collect()
}

pub fn update_chunks(
  data: AbonementDataForUpdate,
  photo: &[u8],
  chunk_size: NonZeroUsize,
) -> Vec<UpdateChunk> {
  split(data, photo, chunk_size)
    .map(|(abonement, photo)| UpdateChunk { abonement, photo })
    .collect()
}

/// Serialize chunks as newline-delimited JSON lines.
pub fn ndjson<C: serde::Serialize>(chunks: &[C]) -> serde_json::Result<Vec<Bytes>> {
  chunks
    .iter()
    .map(|chunk| {
      let mut line = serde_json::to_vec(chunk)?;
      line.push(b'\n');
      Ok(Bytes::from(line))
    })
    .collect()
}

#[cfg(test)]
mod tests {
  use super::*;

  fn size(n: usize) -> NonZeroUsize { NonZeroUsize::new(n).unwrap() }

  fn data() -> AbonementData {
    AbonementData { title: "Monthly".into(), price: 1000, ..Default::default() }
  }

  #[test]
  fn photo_splits_into_fixed_size_fragments() {
    let photo = vec![7u8; 8315];
    let chunks = create_chunks(data(), &photo, DEFAULT_CHUNK_SIZE);

    let sizes: Vec<usize> = chunks
      .iter()
      .map(|c| c.photo.as_ref().map_or(0, Vec::len))
      .collect();
    assert_eq!(sizes, [4096, 4096, 123]);

    assert_eq!(chunks[0].abonement, Some(data()));
    assert!(chunks[1..].iter().all(|c| c.abonement.is_none()));
  }

  #[test]
  fn no_photo_is_a_single_metadata_chunk() {
    let meta = AbonementDataForUpdate { id: "x".into(), ..Default::default() };
    let chunks = update_chunks(meta.clone(), &[], size(16));

    assert_eq!(chunks.len(), 1);
    assert_eq!(chunks[0].abonement, Some(meta));
    assert!(chunks[0].photo.is_none());
  }

  #[test]
  fn ndjson_terminates_every_line() {
    let chunks = create_chunks(data(), b"abc", size(2));
    let lines = ndjson(&chunks).unwrap();

    assert_eq!(lines.len(), 2);
    assert!(lines.iter().all(|l| l.ends_with(b"\n")));
    assert_eq!(&lines[1][..], b"{\"photo\":\"Yw==\"}\n");
  }
}
