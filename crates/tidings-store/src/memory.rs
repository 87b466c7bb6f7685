use std::collections::BTreeMap;
use std::sync::Arc;

use tidings_core::AppError;
use tidings_core::traits::BlobStore;
use tokio::sync::RwLock;

type Containers = BTreeMap<String, BTreeMap<String, Vec<u8>>>;

/// Process-local blob store. Clones share the same contents.
#[derive(Debug, Clone, Default)]
pub struct MemoryBlobStore {
    containers: Arc<RwLock<Containers>>,
}

impl MemoryBlobStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl BlobStore for MemoryBlobStore {
    async fn container_exists(&self, container: &str) -> Result<bool, AppError> {
        Ok(self.containers.read().await.contains_key(container))
    }

    async fn create_container(&self, container: &str) -> Result<(), AppError> {
        self.containers
            .write()
            .await
            .entry(container.to_string())
            .or_default();
        Ok(())
    }

    async fn put(
        &self,
        container: &str,
        name: &str,
        content: Vec<u8>,
        overwrite: bool,
    ) -> Result<(), AppError> {
        let mut containers = self.containers.write().await;
        let blobs = containers
            .get_mut(container)
            .ok_or_else(|| AppError::StorageError(format!("Container {container} not found")))?;
        if !overwrite && blobs.contains_key(name) {
            return Err(AppError::StorageError(format!(
                "Blob {container}/{name} already exists"
            )));
        }
        blobs.insert(name.to_string(), content);
        Ok(())
    }

    async fn get(&self, container: &str, name: &str) -> Result<Vec<u8>, AppError> {
        self.containers
            .read()
            .await
            .get(container)
            .and_then(|blobs| blobs.get(name))
            .cloned()
            .ok_or_else(|| AppError::StorageError(format!("Blob {container}/{name} not found")))
    }

    async fn list(&self, container: &str) -> Result<Vec<String>, AppError> {
        self.containers
            .read()
            .await
            .get(container)
            .map(|blobs| blobs.keys().cloned().collect())
            .ok_or_else(|| AppError::StorageError(format!("Container {container} not found")))
    }
}
