//! In-memory object store.

use std::{collections::HashMap, convert::Infallible, sync::Arc};

use abon_core::store::ObjectStore;
use bytes::Bytes;
use tokio::sync::RwLock;

/// A process-local object store. Clones share the same objects.
#[derive(Debug, Clone, Default)]
pub struct MemoryObjectStore {
  objects: Arc<RwLock<HashMap<String, Bytes>>>,
}

impl MemoryObjectStore {
  pub fn new() -> Self { Self::default() }

  pub async fn len(&self) -> usize { self.objects.read().await.len() }

  pub async fn is_empty(&self) -> bool { self.objects.read().await.is_empty() }
}

impl ObjectStore for MemoryObjectStore {
  type Error = Infallible;

  async fn put_object(&self, key: &str, bytes: Bytes) -> Result<String, Infallible> {
    self.objects.write().await.insert(key.to_owned(), bytes);
    Ok(format!("memory://{key}"))
  }

  async fn get_object(&self, key: &str) -> Result<Option<Bytes>, Infallible> {
    Ok(self.objects.read().await.get(key).cloned())
  }

  async fn delete_object(&self, key: &str) -> Result<(), Infallible> {
    self.objects.write().await.remove(key);
    Ok(())
  }
}
