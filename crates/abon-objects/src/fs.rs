//! Filesystem-backed object store.
//!
//! Objects are stored as plain files mirroring their key:
//! ```text
//! {root}/
//!   abonement/
//!     {id}
//! ```
//! The locator of an object is `{public_url}/{key}`.

use std::path::{Path, PathBuf};

use abon_core::store::ObjectStore;
use bytes::Bytes;
use tokio::fs;
use tracing::debug;
use uuid::Uuid;

use crate::{Error, Result};

/// Object store writing each key to a file under `root`.
#[derive(Debug, Clone)]
pub struct FsObjectStore {
  root:       PathBuf,
  public_url: String,
}

impl FsObjectStore {
  /// Create the store, creating `root` if it does not exist.
  pub async fn new(root: impl AsRef<Path>, public_url: impl Into<String>) -> Result<Self> {
    let root = root.as_ref().to_path_buf();
    fs::create_dir_all(&root).await?;
    let public_url = public_url.into().trim_end_matches('/').to_owned();
    Ok(Self { root, public_url })
  }

  pub fn root(&self) -> &Path { &self.root }

  /// The public locator for `key`.
  pub fn locator(&self, key: &str) -> String { format!("{}/{key}", self.public_url) }

  /// Map a key to a file path under the root.
  fn path_for_key(&self, key: &str) -> Result<PathBuf> {
    let valid = !key.is_empty()
      && !key.contains('\\')
      && key
        .split('/')
        .all(|seg| !seg.is_empty() && seg != "." && seg != "..");
    if !valid {
      return Err(Error::InvalidKey(key.to_owned()));
    }
    Ok(self.root.join(key))
  }
}

impl ObjectStore for FsObjectStore {
  type Error = Error;

  async fn put_object(&self, key: &str, bytes: Bytes) -> Result<String> {
    let path = self.path_for_key(key)?;
    if let Some(parent) = path.parent() {
      fs::create_dir_all(parent).await?;
    }

    // Write to a sibling temp file and rename so readers never observe a
    // partially written object.
    let file_name = path
      .file_name()
      .map(|n| n.to_string_lossy().into_owned())
      .unwrap_or_default();
    let temp_path = path.with_file_name(format!(".{file_name}.{}.tmp", Uuid::new_v4().simple()));
    fs::write(&temp_path, &bytes).await?;
    if let Err(e) = fs::rename(&temp_path, &path).await {
      fs::remove_file(&temp_path).await.ok();
      return Err(e.into());
    }

    debug!(key, size = bytes.len(), "stored object");
    Ok(self.locator(key))
  }

  async fn get_object(&self, key: &str) -> Result<Option<Bytes>> {
    let path = self.path_for_key(key)?;
    match fs::read(&path).await {
      Ok(data) => Ok(Some(Bytes::from(data))),
      Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(None),
      Err(e) => Err(e.into()),
    }
  }

  async fn delete_object(&self, key: &str) -> Result<()> {
    let path = self.path_for_key(key)?;
    match fs::remove_file(&path).await {
      Ok(()) => {
        debug!(key, "deleted object");
        Ok(())
      }
      Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
      Err(e) => Err(e.into()),
    }
  }
}

#[cfg(test)]
mod tests {
  use tempfile::TempDir;

  use super::*;

  async fn create_temp_store() -> (FsObjectStore, TempDir) {
    let temp_dir = TempDir::new().unwrap();
    let store = FsObjectStore::new(temp_dir.path(), "http://localhost:8080/objects/")
      .await
      .unwrap();
    (store, temp_dir)
  }

  #[tokio::test]
  async fn put_get_delete() {
    let (store, temp) = create_temp_store().await;
    let key = "abonement/1b4e28ba-2fa1-11d2-883f-0016d3cca427";

    let locator = store.put_object(key, Bytes::from_static(b"jpeg")).await.unwrap();
    assert_eq!(locator, format!("http://localhost:8080/objects/{key}"));
    assert!(temp.path().join(key).is_file());

    let data = store.get_object(key).await.unwrap();
    assert_eq!(data.as_deref(), Some(&b"jpeg"[..]));

    store.delete_object(key).await.unwrap();
    assert!(store.get_object(key).await.unwrap().is_none());
  }

  #[tokio::test]
  async fn put_overwrites_and_leaves_no_temp_files() {
    let (store, temp) = create_temp_store().await;
    let key = "abonement/a";

    store.put_object(key, Bytes::from_static(b"old")).await.unwrap();
    store.put_object(key, Bytes::from_static(b"new")).await.unwrap();

    let data = store.get_object(key).await.unwrap().unwrap();
    assert_eq!(&data[..], b"new");

    let entries: Vec<_> = std::fs::read_dir(temp.path().join("abonement"))
      .unwrap()
      .map(|e| e.unwrap().file_name())
      .collect();
    assert_eq!(entries.len(), 1);
  }

  #[tokio::test]
  async fn missing_key_reads_as_none_and_deletes_cleanly() {
    let (store, _temp) = create_temp_store().await;
    assert!(store.get_object("abonement/missing").await.unwrap().is_none());
    store.delete_object("abonement/missing").await.unwrap();
  }

  #[tokio::test]
  async fn traversal_keys_are_rejected() {
    let (store, _temp) = create_temp_store().await;
    for key in ["", "../etc/passwd", "abonement/../../x", "/abs", "a//b", "a\\b"] {
      let err = store.put_object(key, Bytes::new()).await.unwrap_err();
      assert!(matches!(err, Error::InvalidKey(_)), "{key:?}");
    }
  }
}
