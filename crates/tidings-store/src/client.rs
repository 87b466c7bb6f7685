use std::sync::Arc;

use tidings_core::AppError;
use tidings_core::traits::BlobStore;
use tokio::sync::OnceCell;

use crate::config::{Backend, StoreConfig};
use crate::fs::FsBlobStore;
use crate::memory::MemoryBlobStore;
use crate::postgres::PgBlobStore;

/// One of the concrete backends, chosen at runtime.
#[derive(Clone)]
pub enum AnyBlobStore {
    Memory(MemoryBlobStore),
    Fs(FsBlobStore),
    Postgres(PgBlobStore),
}

impl AnyBlobStore {
    /// Build the backend named by the configured connection string.
    pub async fn connect(config: &StoreConfig) -> Result<Self, AppError> {
        match config.backend()? {
            Backend::Memory => Ok(Self::Memory(MemoryBlobStore::new())),
            Backend::Filesystem(root) => Ok(Self::Fs(FsBlobStore::open(root).await?)),
            Backend::Postgres(url) => Ok(Self::Postgres(
                PgBlobStore::connect(&url, config.max_connections).await?,
            )),
        }
    }

    pub fn kind(&self) -> &'static str {
        match self {
            Self::Memory(_) => "memory",
            Self::Fs(_) => "filesystem",
            Self::Postgres(_) => "postgres",
        }
    }
}

impl BlobStore for AnyBlobStore {
    async fn container_exists(&self, container: &str) -> Result<bool, AppError> {
        match self {
            Self::Memory(s) => s.container_exists(container).await,
            Self::Fs(s) => s.container_exists(container).await,
            Self::Postgres(s) => s.container_exists(container).await,
        }
    }

    async fn create_container(&self, container: &str) -> Result<(), AppError> {
        match self {
            Self::Memory(s) => s.create_container(container).await,
            Self::Fs(s) => s.create_container(container).await,
            Self::Postgres(s) => s.create_container(container).await,
        }
    }

    async fn put(
        &self,
        container: &str,
        name: &str,
        content: Vec<u8>,
        overwrite: bool,
    ) -> Result<(), AppError> {
        match self {
            Self::Memory(s) => s.put(container, name, content, overwrite).await,
            Self::Fs(s) => s.put(container, name, content, overwrite).await,
            Self::Postgres(s) => s.put(container, name, content, overwrite).await,
        }
    }

    async fn get(&self, container: &str, name: &str) -> Result<Vec<u8>, AppError> {
        match self {
            Self::Memory(s) => s.get(container, name).await,
            Self::Fs(s) => s.get(container, name).await,
            Self::Postgres(s) => s.get(container, name).await,
        }
    }

    async fn list(&self, container: &str) -> Result<Vec<String>, AppError> {
        match self {
            Self::Memory(s) => s.list(container).await,
            Self::Fs(s) => s.list(container).await,
            Self::Postgres(s) => s.list(container).await,
        }
    }
}

/// Lazily connected blob store handle.
///
/// The backend is resolved on the first storage call, not at startup, so a
/// host with no `BLOB_CONNECTION_STRING` still boots and each storage call
/// fails with [`AppError::ConfigError`]. Clones share the same connection.
#[derive(Clone)]
pub struct BlobClient {
    config: Arc<StoreConfig>,
    inner: Arc<OnceCell<AnyBlobStore>>,
}

impl BlobClient {
    pub fn new(config: StoreConfig) -> Self {
        Self {
            config: Arc::new(config),
            inner: Arc::new(OnceCell::new()),
        }
    }

    /// Wrap an already built backend.
    pub fn from_store(store: AnyBlobStore) -> Self {
        Self {
            config: Arc::new(StoreConfig::new(None)),
            inner: Arc::new(OnceCell::new_with(Some(store))),
        }
    }

    async fn store(&self) -> Result<&AnyBlobStore, AppError> {
        self.inner
            .get_or_try_init(|| async {
                let store = AnyBlobStore::connect(&self.config).await?;
                tracing::info!(backend = store.kind(), "Blob store connected");
                Ok::<_, AppError>(store)
            })
            .await
    }
}

impl BlobStore for BlobClient {
    async fn container_exists(&self, container: &str) -> Result<bool, AppError> {
        self.store().await?.container_exists(container).await
    }

    async fn create_container(&self, container: &str) -> Result<(), AppError> {
        self.store().await?.create_container(container).await
    }

    async fn put(
        &self,
        container: &str,
        name: &str,
        content: Vec<u8>,
        overwrite: bool,
    ) -> Result<(), AppError> {
        self.store().await?.put(container, name, content, overwrite).await
    }

    async fn get(&self, container: &str, name: &str) -> Result<Vec<u8>, AppError> {
        self.store().await?.get(container, name).await
    }

    async fn list(&self, container: &str) -> Result<Vec<String>, AppError> {
        self.store().await?.list(container).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_missing_connection_string_fails_every_call() {
        let client = BlobClient::new(StoreConfig::new(None));

        for _ in 0..2 {
            let err = client.list("articles-data").await.unwrap_err();
            assert!(matches!(err, AppError::ConfigError(_)));
        }
        let err = client
            .put("articles-data", "a.json", vec![], true)
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::ConfigError(_)));
    }

    #[tokio::test]
    async fn test_memory_backend_is_shared_across_clones() {
        let client = BlobClient::new(StoreConfig::new(Some("memory://".into())));
        let other = client.clone();

        client.create_container("raw").await.unwrap();
        client.put("raw", "a.json", b"x".to_vec(), true).await.unwrap();

        assert_eq!(other.get("raw", "a.json").await.unwrap(), b"x");
    }

    #[tokio::test]
    async fn test_filesystem_backend_from_connection_string() {
        let dir = tempfile::tempdir().unwrap();
        let conn = format!("file://{}", dir.path().display());
        let client = BlobClient::new(StoreConfig::new(Some(conn)));

        client.create_container("raw").await.unwrap();
        client.put("raw", "a.json", b"x".to_vec(), true).await.unwrap();

        assert!(dir.path().join("raw").join("a.json").exists());
    }

    #[tokio::test]
    async fn test_from_store_skips_config() {
        let memory = MemoryBlobStore::new();
        let client = BlobClient::from_store(AnyBlobStore::Memory(memory.clone()));

        client.create_container("raw").await.unwrap();

        assert!(memory.container_exists("raw").await.unwrap());
    }
}
