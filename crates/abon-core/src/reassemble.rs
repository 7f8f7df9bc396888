//! Reassembly of a client-streamed upload into one metadata object and one
//! binary payload.

use std::pin::pin;

use bytes::{Bytes, BytesMut};
use futures::{Stream, StreamExt as _};

/// Extracts the two kinds of fragment a streamed chunk may carry.
pub trait Chunk {
  type Metadata;

  fn take_metadata(&mut self) -> Option<Self::Metadata>;

  fn take_fragment(&mut self) -> Option<Vec<u8>>;
}

/// The result of a completed reassembly.
#[derive(Debug)]
pub struct Reassembled<M> {
  /// Metadata of the last chunk that carried any.
  pub metadata: Option<M>,
  /// All fragments concatenated in arrival order.
  pub payload:  Bytes,
}

impl<M> Reassembled<M> {
  /// The payload, or `None` when no fragment bytes arrived.
  pub fn photo(&self) -> Option<Bytes> {
    (!self.payload.is_empty()).then(|| self.payload.clone())
  }
}

/// Consume `chunks` until end-of-stream.
///
/// The first receive error is returned as-is and everything accumulated so
/// far is dropped.
pub async fn reassemble<S, C, E>(chunks: S) -> Result<Reassembled<C::Metadata>, E>
where
  S: Stream<Item = Result<C, E>>,
  C: Chunk,
{
  let mut chunks = pin!(chunks);
  let mut metadata = None;
  let mut payload = BytesMut::new();

  while let Some(chunk) = chunks.next().await {
    let mut chunk = chunk?;
    if let Some(m) = chunk.take_metadata() {
      metadata = Some(m);
    }
    if let Some(fragment) = chunk.take_fragment() {
      payload.extend_from_slice(&fragment);
    }
  }

  Ok(Reassembled { metadata, payload: payload.freeze() })
}
