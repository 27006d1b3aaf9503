//! The dropbox: a directory where senders place the files and folders they want to send.

use crate::local::checked_join;
use crate::traits::{StorageError, StorageResult};
use dropsend_core::models::DropboxEntry;
use std::path::{Path, PathBuf};
use tokio::fs;

/// A dropbox entry resolved to a path on disk
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DropSource {
    File(PathBuf),
    Directory(PathBuf),
}

impl DropSource {
    pub fn path(&self) -> &Path {
        match self {
            DropSource::File(path) | DropSource::Directory(path) => path,
        }
    }
}

#[derive(Clone, Debug)]
pub struct Dropbox {
    root: PathBuf,
}

impl Dropbox {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Dropbox { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Resolve `name` inside the dropbox. `Ok(None)` when nothing by that name exists.
    pub async fn resolve(&self, name: &str) -> StorageResult<Option<DropSource>> {
        let name = name.trim().trim_end_matches('/');
        let path = checked_join(&self.root, name)?;

        match fs::metadata(&path).await {
            Ok(meta) if meta.is_dir() => Ok(Some(DropSource::Directory(path))),
            Ok(meta) if meta.is_file() => Ok(Some(DropSource::File(path))),
            Ok(_) => Ok(None),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(StorageError::IoError(e)),
        }
    }

    /// Entries at the top of the dropbox, sorted by name. Hidden entries are skipped.
    pub async fn list(&self) -> StorageResult<Vec<DropboxEntry>> {
        let mut entries = Vec::new();
        let mut dir = fs::read_dir(&self.root).await.map_err(|e| {
            StorageError::ConfigError(format!(
                "Failed to read dropbox {}: {}",
                self.root.display(),
                e
            ))
        })?;

        while let Some(entry) = dir.next_entry().await? {
            let name = entry.file_name().to_string_lossy().into_owned();
            if name.starts_with('.') {
                continue;
            }
            let is_directory = fs::metadata(entry.path())
                .await
                .map(|m| m.is_dir())
                .unwrap_or(false);
            entries.push(DropboxEntry { name, is_directory });
        }

        entries.sort_by(|a, b| a.name.cmp(&b.name));
        Ok(entries)
    }
}
