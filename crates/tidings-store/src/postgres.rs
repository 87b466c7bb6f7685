use sqlx::PgPool;
use sqlx::postgres::PgPoolOptions;
use tidings_core::AppError;
use tidings_core::traits::BlobStore;

/// PostgreSQL error code for a foreign key violation.
const FOREIGN_KEY_VIOLATION: &str = "23503";

/// Blob store backed by the `containers` and `blobs` tables.
#[derive(Clone)]
pub struct PgBlobStore {
    pool: PgPool,
}

impl PgBlobStore {
    /// Connect and run pending migrations.
    pub async fn connect(url: &str, max_connections: u32) -> Result<Self, AppError> {
        let pool = PgPoolOptions::new()
            .max_connections(max_connections)
            .connect(url)
            .await
            .map_err(|e| AppError::StorageError(format!("Failed to connect: {e}")))?;

        let store = Self { pool };
        store.migrate().await?;
        Ok(store)
    }

    /// Create a store from an existing pool (useful for testing).
    pub fn from_pool(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Run all pending migrations.
    pub async fn migrate(&self) -> Result<(), AppError> {
        sqlx::migrate!("../../migrations")
            .run(&self.pool)
            .await
            .map_err(|e| AppError::StorageError(format!("Migration failed: {e}")))?;
        Ok(())
    }

    pub fn pool(&self) -> &PgPool {
        &self.pool
    }
}

fn put_error(container: &str, e: sqlx::Error) -> AppError {
    if let sqlx::Error::Database(db) = &e
        && db.code().as_deref() == Some(FOREIGN_KEY_VIOLATION)
    {
        return AppError::StorageError(format!("Container {container} not found"));
    }
    AppError::StorageError(e.to_string())
}

impl BlobStore for PgBlobStore {
    async fn container_exists(&self, container: &str) -> Result<bool, AppError> {
        sqlx::query_scalar::<_, bool>("SELECT EXISTS(SELECT 1 FROM containers WHERE name = $1)")
            .bind(container)
            .fetch_one(&self.pool)
            .await
            .map_err(|e| AppError::StorageError(e.to_string()))
    }

    async fn create_container(&self, container: &str) -> Result<(), AppError> {
        sqlx::query("INSERT INTO containers (name) VALUES ($1) ON CONFLICT (name) DO NOTHING")
            .bind(container)
            .execute(&self.pool)
            .await
            .map_err(|e| AppError::StorageError(e.to_string()))?;
        Ok(())
    }

    async fn put(
        &self,
        container: &str,
        name: &str,
        content: Vec<u8>,
        overwrite: bool,
    ) -> Result<(), AppError> {
        let sql = if overwrite {
            r#"
            INSERT INTO blobs (container, name, content)
            VALUES ($1, $2, $3)
            ON CONFLICT (container, name)
            DO UPDATE SET content = EXCLUDED.content, updated_at = NOW()
            "#
        } else {
            r#"
            INSERT INTO blobs (container, name, content)
            VALUES ($1, $2, $3)
            ON CONFLICT (container, name) DO NOTHING
            "#
        };

        let result = sqlx::query(sql)
            .bind(container)
            .bind(name)
            .bind(content)
            .execute(&self.pool)
            .await
            .map_err(|e| put_error(container, e))?;

        if result.rows_affected() == 0 {
            return Err(AppError::StorageError(format!(
                "Blob {container}/{name} already exists"
            )));
        }
        Ok(())
    }

    async fn get(&self, container: &str, name: &str) -> Result<Vec<u8>, AppError> {
        sqlx::query_scalar::<_, Vec<u8>>(
            "SELECT content FROM blobs WHERE container = $1 AND name = $2",
        )
        .bind(container)
        .bind(name)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| AppError::StorageError(e.to_string()))?
        .ok_or_else(|| AppError::StorageError(format!("Blob {container}/{name} not found")))
    }

    async fn list(&self, container: &str) -> Result<Vec<String>, AppError> {
        if !self.container_exists(container).await? {
            return Err(AppError::StorageError(format!(
                "Container {container} not found"
            )));
        }
        sqlx::query_scalar::<_, String>(
            "SELECT name FROM blobs WHERE container = $1 ORDER BY name COLLATE \"C\"",
        )
        .bind(container)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| AppError::StorageError(e.to_string()))
    }
}
