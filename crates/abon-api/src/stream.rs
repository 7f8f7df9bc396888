//! Newline-delimited JSON chunk streams.
//!
//! A streaming request body is a sequence of lines, each one JSON chunk.
//! Blank lines are skipped. Framing, JSON and base64 errors end the stream
//! with an error item.

use std::{future::ready, io};

use axum::body::Body;
use futures::{Stream, TryStreamExt as _};
use serde::de::DeserializeOwned;
use thiserror::Error;
use tokio_util::{
  codec::{FramedRead, LinesCodec, LinesCodecError},
  io::StreamReader,
};

/// Longest accepted chunk line, in bytes.
pub const MAX_CHUNK_LINE: usize = 4 * 1024 * 1024;

#[derive(Debug, Error)]
pub enum ChunkError {
  #[error("failed to read chunk: {0}")]
  Frame(#[from] LinesCodecError),

  #[error("malformed chunk: {0}")]
  Decode(#[from] serde_json::Error),
}

/// Decode `body` into a stream of chunks of type `C`.
pub fn chunk_stream<C>(body: Body) -> impl Stream<Item = Result<C, ChunkError>> + Send
where
  C: DeserializeOwned + Send,
{
  let reader = StreamReader::new(body.into_data_stream().map_err(io::Error::other));
  FramedRead::new(reader, LinesCodec::new_with_max_length(MAX_CHUNK_LINE))
    .map_err(ChunkError::from)
    .try_filter(|line| ready(!line.trim().is_empty()))
    .and_then(|line| ready(serde_json::from_str(&line).map_err(ChunkError::from)))
}
