//! Filesystem blob store.
//!
//! Layout under the root directory:
//!
//! ```text
//! <root>/<container>/<percent-encoded blob name>
//! <root>/<container>/<encoded prefix>#<sha256>        long names
//! <root>/<container>/<encoded prefix>#<sha256>#name   original long name
//! <root>/.staging/<uuid>                              in-flight writes
//! ```
//!
//! Percent-encoding triples every non-ASCII byte, so encoded names longer
//! than [`MAX_PLAIN_NAME`] are stored under a bounded hashed file name with
//! the original name kept next to it. `#` never appears in an encoded name.
//!
//! Writes land in `.staging` and are renamed into place, so readers never
//! observe a partially written blob and concurrent writers resolve to the
//! last rename.

use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use tidings_core::AppError;
use tidings_core::traits::BlobStore;
use sha2::{Digest, Sha256};
use tokio::io::AsyncWriteExt;
use uuid::Uuid;

const STAGING_DIR: &str = ".staging";

/// Longest encoded name stored verbatim as a file name.
pub const MAX_PLAIN_NAME: usize = 200;
/// Readable part of the encoded name kept in front of the hash.
const HASHED_PREFIX_LEN: usize = 100;
const HASH_MARK: char = '#';
const NAME_SUFFIX: &str = "#name";

/// On-disk file name(s) for one blob.
#[derive(Debug, PartialEq)]
enum FileName {
    Plain(String),
    Hashed { file: String, sidecar: String },
}

impl FileName {
    fn file(&self) -> &str {
        match self {
            FileName::Plain(file) | FileName::Hashed { file, .. } => file,
        }
    }
}

#[derive(Debug, Clone)]
pub struct FsBlobStore {
    root: PathBuf,
}

impl FsBlobStore {
    /// Open (and create if needed) a store rooted at `root`.
    pub async fn open(root: impl Into<PathBuf>) -> Result<Self, AppError> {
        let root = root.into();
        tokio::fs::create_dir_all(root.join(STAGING_DIR))
            .await
            .map_err(|e| {
                AppError::StorageError(format!("Failed to open {}: {e}", root.display()))
            })?;
        Ok(Self { root })
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    fn container_dir(&self, container: &str) -> Result<PathBuf, AppError> {
        if container.is_empty()
            || container.starts_with('.')
            || container.contains(['/', '\\'])
        {
            return Err(AppError::StorageError(format!(
                "Invalid container name '{container}'"
            )));
        }
        Ok(self.root.join(container))
    }

    fn blob_path(&self, container: &str, name: &str) -> Result<PathBuf, AppError> {
        let file_name = file_name(name)?;
        Ok(self.container_dir(container)?.join(file_name.file()))
    }

    /// Write `content` to a staging file and rename it onto `target`.
    async fn publish(&self, target: &Path, content: &[u8]) -> Result<(), AppError> {
        let staged = self
            .root
            .join(STAGING_DIR)
            .join(Uuid::new_v4().to_string());
        tokio::fs::write(&staged, content)
            .await
            .map_err(|e| io_error("write", &staged, e))?;
        if let Err(e) = tokio::fs::rename(&staged, target).await {
            let _ = tokio::fs::remove_file(&staged).await;
            return Err(io_error("publish", target, e));
        }
        Ok(())
    }

    /// Recover the blob name behind a file in `dir`, or `None` for files
    /// that are not blobs.
    async fn blob_name(&self, dir: &Path, file_name: &str) -> Option<String> {
        if file_name.ends_with(NAME_SUFFIX) {
            return None;
        }
        if file_name.contains(HASH_MARK) {
            let sidecar = dir.join(format!("{file_name}{NAME_SUFFIX}"));
            return match tokio::fs::read(&sidecar).await.map(String::from_utf8) {
                Ok(Ok(name)) => Some(name),
                _ => {
                    tracing::warn!(%file_name, "Skipping hashed blob without a readable name");
                    None
                }
            };
        }
        match urlencoding::decode(file_name) {
            Ok(name) => Some(name.into_owned()),
            Err(_) => {
                tracing::warn!(%file_name, "Skipping file with undecodable name");
                None
            }
        }
    }

    async fn require_container(&self, container: &str) -> Result<PathBuf, AppError> {
        let dir = self.container_dir(container)?;
        if !self.container_exists(container).await? {
            return Err(AppError::StorageError(format!(
                "Container {container} not found"
            )));
        }
        Ok(dir)
    }
}

/// Map a blob name to a single safe file name of bounded length.
fn file_name(name: &str) -> Result<FileName, AppError> {
    let encoded = urlencoding::encode(name).into_owned();
    if encoded.is_empty() || encoded == "." || encoded == ".." {
        return Err(AppError::StorageError(format!("Invalid blob name '{name}'")));
    }
    if encoded.len() <= MAX_PLAIN_NAME {
        return Ok(FileName::Plain(encoded));
    }

    // Whole characters only, so the prefix still decodes.
    let mut prefix = String::with_capacity(HASHED_PREFIX_LEN);
    for ch in name.chars() {
        let mut buf = [0u8; 4];
        let piece = urlencoding::encode(ch.encode_utf8(&mut buf));
        if prefix.len() + piece.len() > HASHED_PREFIX_LEN {
            break;
        }
        prefix.push_str(&piece);
    }
    let mut hasher = Sha256::new();
    hasher.update(name.as_bytes());
    let file = format!("{prefix}{HASH_MARK}{:x}", hasher.finalize());
    let sidecar = format!("{file}{NAME_SUFFIX}");
    Ok(FileName::Hashed { file, sidecar })
}

fn io_error(action: &str, path: &Path, e: std::io::Error) -> AppError {
    AppError::StorageError(format!("Failed to {action} {}: {e}", path.display()))
}

impl BlobStore for FsBlobStore {
    async fn container_exists(&self, container: &str) -> Result<bool, AppError> {
        let dir = self.container_dir(container)?;
        match tokio::fs::metadata(&dir).await {
            Ok(meta) => Ok(meta.is_dir()),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(false),
            Err(e) => Err(io_error("inspect", &dir, e)),
        }
    }

    async fn create_container(&self, container: &str) -> Result<(), AppError> {
        let dir = self.container_dir(container)?;
        tokio::fs::create_dir_all(&dir)
            .await
            .map_err(|e| io_error("create", &dir, e))
    }

    async fn put(
        &self,
        container: &str,
        name: &str,
        content: Vec<u8>,
        overwrite: bool,
    ) -> Result<(), AppError> {
        let dir = self.require_container(container).await?;
        let file_name = file_name(name)?;
        let target = dir.join(file_name.file());

        if let FileName::Hashed { sidecar, .. } = &file_name {
            self.publish(&dir.join(sidecar), name.as_bytes()).await?;
        }

        if !overwrite {
            let mut file = tokio::fs::OpenOptions::new()
                .write(true)
                .create_new(true)
                .open(&target)
                .await
                .map_err(|e| {
                    if e.kind() == ErrorKind::AlreadyExists {
                        AppError::StorageError(format!("Blob {container}/{name} already exists"))
                    } else {
                        io_error("create", &target, e)
                    }
                })?;
            file.write_all(&content)
                .await
                .map_err(|e| io_error("write", &target, e))?;
            return file.flush().await.map_err(|e| io_error("write", &target, e));
        }

        self.publish(&target, &content).await
    }

    async fn get(&self, container: &str, name: &str) -> Result<Vec<u8>, AppError> {
        let path = self.blob_path(container, name)?;
        tokio::fs::read(&path).await.map_err(|e| {
            if e.kind() == ErrorKind::NotFound {
                AppError::StorageError(format!("Blob {container}/{name} not found"))
            } else {
                io_error("read", &path, e)
            }
        })
    }

    async fn list(&self, container: &str) -> Result<Vec<String>, AppError> {
        let dir = self.require_container(container).await?;
        let mut entries = tokio::fs::read_dir(&dir)
            .await
            .map_err(|e| io_error("list", &dir, e))?;

        let mut names = Vec::new();
        while let Some(entry) = entries
            .next_entry()
            .await
            .map_err(|e| io_error("list", &dir, e))?
        {
            let file_name = entry.file_name();
            let Some(file_name) = file_name.to_str() else {
                tracing::warn!(path = %entry.path().display(), "Skipping non UTF-8 file");
                continue;
            };
            if let Some(name) = self.blob_name(&dir, file_name).await {
                names.push(name);
            }
        }
        names.sort();
        Ok(names)
    }
}
