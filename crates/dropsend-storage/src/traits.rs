//! Archive storage abstraction
//!
//! Archives are addressed by their file name relative to the transfers root. Names must not
//! contain `..` or start with `/`.

use async_trait::async_trait;
use bytes::Bytes;
use dropsend_core::AppError;
use futures::Stream;
use std::pin::Pin;
use thiserror::Error;

/// Storage operation errors
#[derive(Debug, Error)]
pub enum StorageError {
    #[error("Archive build failed: {0}")]
    BuildFailed(String),

    #[error("Download failed: {0}")]
    DownloadFailed(String),

    #[error("Delete failed: {0}")]
    DeleteFailed(String),

    #[error("File not found: {0}")]
    NotFound(String),

    #[error("Invalid storage key: {0}")]
    InvalidKey(String),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Configuration error: {0}")]
    ConfigError(String),
}

/// Result type for storage operations
pub type StorageResult<T> = Result<T, StorageError>;

/// Byte stream of an opened archive
pub type ByteStream = Pin<Box<dyn Stream<Item = Result<Bytes, StorageError>> + Send>>;

impl From<StorageError> for AppError {
    fn from(err: StorageError) -> Self {
        match err {
            StorageError::NotFound(name) => AppError::ArchiveMissing(name),
            other => AppError::Storage(other.to_string()),
        }
    }
}

/// Where built archives live and how they are read back
#[async_trait]
pub trait ArchiveStorage: Send + Sync {
    /// Check if an archive exists
    async fn exists(&self, name: &str) -> StorageResult<bool>;

    /// Size in bytes of an archive, read from disk.
    async fn content_length(&self, name: &str) -> StorageResult<u64>;

    /// Open an archive for sequential reading.
    ///
    /// The file handle is opened before this returns, so removing the archive afterwards
    /// does not interrupt the stream.
    async fn open_stream(&self, name: &str) -> StorageResult<ByteStream>;

    /// Remove an archive. Removing a missing archive is not an error.
    async fn remove(&self, name: &str) -> StorageResult<()>;
}
