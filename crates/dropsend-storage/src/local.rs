use crate::traits::{ArchiveStorage, ByteStream, StorageError, StorageResult};
use async_trait::async_trait;
use futures::StreamExt;
use std::path::{Component, Path, PathBuf};
use tokio::fs;

/// Archives stored as plain files in the transfers directory
#[derive(Clone, Debug)]
pub struct LocalArchiveStorage {
    base_path: PathBuf,
}

/// Reject names that could escape `base`: parent, root or prefix components.
pub(crate) fn checked_join(base: &Path, name: &str) -> StorageResult<PathBuf> {
    let escapes = Path::new(name).components().any(|c| {
        matches!(
            c,
            Component::ParentDir | Component::RootDir | Component::Prefix(_)
        )
    });
    if name.is_empty() || escapes || name.contains('\\') {
        return Err(StorageError::InvalidKey(format!(
            "'{}' is not a valid name",
            name
        )));
    }
    Ok(base.join(name))
}

impl LocalArchiveStorage {
    /// Create a new LocalArchiveStorage, creating the directory if needed
    pub async fn new(base_path: impl Into<PathBuf>) -> StorageResult<Self> {
        let base_path = base_path.into();

        fs::create_dir_all(&base_path).await.map_err(|e| {
            StorageError::ConfigError(format!(
                "Failed to create transfers directory {}: {}",
                base_path.display(),
                e
            ))
        })?;

        Ok(LocalArchiveStorage { base_path })
    }

    pub fn base_path(&self) -> &Path {
        &self.base_path
    }

    fn key_to_path(&self, name: &str) -> StorageResult<PathBuf> {
        checked_join(&self.base_path, name)
    }
}

#[async_trait]
impl ArchiveStorage for LocalArchiveStorage {
    async fn exists(&self, name: &str) -> StorageResult<bool> {
        let path = self.key_to_path(name)?;
        Ok(fs::try_exists(&path).await.unwrap_or(false))
    }

    async fn content_length(&self, name: &str) -> StorageResult<u64> {
        let path = self.key_to_path(name)?;
        let meta = fs::metadata(&path).await.map_err(|e| match e.kind() {
            std::io::ErrorKind::NotFound => StorageError::NotFound(name.to_string()),
            _ => StorageError::IoError(e),
        })?;
        Ok(meta.len())
    }

    async fn open_stream(&self, name: &str) -> StorageResult<ByteStream> {
        let path = self.key_to_path(name)?;
        let start = std::time::Instant::now();

        let file = fs::File::open(&path).await.map_err(|e| match e.kind() {
            std::io::ErrorKind::NotFound => StorageError::NotFound(name.to_string()),
            _ => StorageError::DownloadFailed(format!(
                "Failed to open file {}: {}",
                path.display(),
                e
            )),
        })?;

        let key = name.to_string();
        let path_display = path.display().to_string();
        let stream = tokio_util::io::ReaderStream::new(file).map(move |result| {
            result.map_err(|e| {
                tracing::error!(
                    path = %path_display,
                    key = %key,
                    error = %e,
                    duration_ms = start.elapsed().as_secs_f64() * 1000.0,
                    "Archive stream read error"
                );
                StorageError::DownloadFailed(format!("Failed to read chunk: {}", e))
            })
        });

        tracing::debug!(path = %path.display(), key = %name, "Archive opened for streaming");

        Ok(Box::pin(stream))
    }

    async fn remove(&self, name: &str) -> StorageResult<()> {
        let path = self.key_to_path(name)?;

        match fs::remove_file(&path).await {
            Ok(()) => {
                tracing::info!(path = %path.display(), key = %name, "Archive removed");
                Ok(())
            }
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(StorageError::DeleteFailed(format!(
                "Failed to delete file {}: {}",
                path.display(),
                e
            ))),
        }
    }
}
