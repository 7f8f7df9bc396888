//! Error types for `abon-core`.
//!
//! Every workflow failure is one of four kinds. Callers branch on
//! [`Error::kind`], never on the message text.

use thiserror::Error;
use uuid::Uuid;

/// A boxed collaborator error (store, object store or vendor).
pub type BoxError = Box<dyn std::error::Error + Send + Sync + 'static>;

#[derive(Debug, Error)]
pub enum Error {
  /// Malformed or absent input, rejected before any store is touched.
  #[error("invalid input: {0}")]
  InvalidInput(String),

  #[error("abonement not found: {0}")]
  NotFound(Uuid),

  #[error("no photo stored for abonement {0}")]
  PhotoNotFound(Uuid),

  /// A store or vendor call failed. If a compensating action ran, it
  /// succeeded.
  #[error("{context}: {source}")]
  Internal {
    context: &'static str,
    #[source]
    source:  BoxError,
  },

  /// A store call failed and the compensating action failed as well. The
  /// object store and the metadata store may now disagree.
  #[error("{context}: {cause}; rollback failed: {rollback}")]
  RollbackFailed {
    context:  &'static str,
    cause:    BoxError,
    #[source]
    rollback: BoxError,
  },
}

/// Stable discriminants for [`Error`] variants.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum ErrorKind {
  InvalidInput           = 1,
  NotFound               = 2,
  Internal               = 3,
  InternalRollbackFailed = 4,
}

impl ErrorKind {
  pub fn as_str(self) -> &'static str {
    match self {
      ErrorKind::InvalidInput => "invalid_input",
      ErrorKind::NotFound => "not_found",
      ErrorKind::Internal => "internal",
      ErrorKind::InternalRollbackFailed => "rollback_failed",
    }
  }
}

impl Error {
  pub fn kind(&self) -> ErrorKind {
    match self {
      Error::InvalidInput(_) => ErrorKind::InvalidInput,
      Error::NotFound(_) | Error::PhotoNotFound(_) => ErrorKind::NotFound,
      Error::Internal { .. } => ErrorKind::Internal,
      Error::RollbackFailed { .. } => ErrorKind::InternalRollbackFailed,
    }
  }

  pub(crate) fn internal<E>(context: &'static str, source: E) -> Self
  where
    E: std::error::Error + Send + Sync + 'static,
  {
    Error::Internal { context, source: Box::new(source) }
  }
}

pub type Result<T, E = Error> = std::result::Result<T, E>;

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn kinds_have_stable_discriminants() {
    assert_eq!(ErrorKind::InvalidInput as u8, 1);
    assert_eq!(ErrorKind::NotFound as u8, 2);
    assert_eq!(ErrorKind::Internal as u8, 3);
    assert_eq!(ErrorKind::InternalRollbackFailed as u8, 4);
  }

  #[test]
  fn missing_photo_is_not_found_with_its_own_message() {
    let id = Uuid::new_v4();
    let err = Error::PhotoNotFound(id);
    assert_eq!(err.kind(), ErrorKind::NotFound);
    assert_eq!(err.to_string(), format!("no photo stored for abonement {id}"));
  }

  #[test]
  fn rollback_failure_keeps_both_causes() {
    let err = Error::RollbackFailed {
      context:  "failed to update abonement",
      cause:    "disk full".into(),
      rollback: "bucket unreachable".into(),
    };
    assert_eq!(err.kind(), ErrorKind::InternalRollbackFailed);
    let msg = err.to_string();
    assert!(msg.contains("disk full"), "{msg}");
    assert!(msg.contains("bucket unreachable"), "{msg}");
  }
}
