//! Zip archive builder
//!
//! Builds one archive per transfer in the transfers directory. Zip writing is blocking
//! work and runs on the blocking thread pool.

use crate::dropbox::DropSource;
use crate::local::checked_join;
use crate::traits::{StorageError, StorageResult};
use chrono::{DateTime, Utc};
use std::fs::File;
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use uuid::Uuid;
use zip::write::{FileOptions, ZipWriter};
use zip::CompressionMethod;

/// An archive written to disk
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BuiltArchive {
    /// File name relative to the transfers directory
    pub filename: String,
    /// Size in bytes, read back from disk after writing
    pub size: u64,
}

/// `{UTC timestamp}_{uuid v4}.zip`
pub fn generate_archive_name(now: DateTime<Utc>) -> String {
    format!("{}_{}.zip", now.format("%Y%m%dT%H%M%SZ"), Uuid::new_v4())
}

#[derive(Clone, Debug)]
pub struct ArchiveBuilder {
    output_dir: PathBuf,
}

impl ArchiveBuilder {
    pub fn new(output_dir: impl Into<PathBuf>) -> Self {
        ArchiveBuilder {
            output_dir: output_dir.into(),
        }
    }

    /// Archive `source` under a freshly generated name.
    #[tracing::instrument(skip(self, source), fields(source = %source.path().display()))]
    pub async fn build(&self, source: &DropSource) -> StorageResult<BuiltArchive> {
        let filename = generate_archive_name(Utc::now());
        let output = checked_join(&self.output_dir, &filename)?;
        let start = std::time::Instant::now();

        let task_source = source.clone();
        let task_output = output.clone();
        let result = tokio::task::spawn_blocking(move || write_zip(&task_source, &task_output))
            .await
            .map_err(|e| StorageError::BuildFailed(format!("Archive task failed: {}", e)))
            .and_then(|r| r);

        if let Err(e) = result {
            // Never leave a partial archive behind.
            if let Err(remove_err) = tokio::fs::remove_file(&output).await {
                if remove_err.kind() != io::ErrorKind::NotFound {
                    tracing::warn!(
                        path = %output.display(),
                        error = %remove_err,
                        "Failed to remove partial archive"
                    );
                }
            }
            return Err(e);
        }

        let size = tokio::fs::metadata(&output).await?.len();

        tracing::info!(
            archive = %filename,
            size_bytes = size,
            duration_ms = start.elapsed().as_secs_f64() * 1000.0,
            "Archive built"
        );

        Ok(BuiltArchive { filename, size })
    }
}

fn entry_options(large: bool) -> FileOptions {
    FileOptions::default()
        .compression_method(CompressionMethod::Deflated)
        .unix_permissions(0o644)
        .large_file(large)
}

fn file_label(path: &Path) -> StorageResult<String> {
    path.file_name()
        .and_then(|n| n.to_str())
        .filter(|s| !s.is_empty())
        .map(str::to_string)
        .ok_or_else(|| {
            StorageError::BuildFailed(format!("Cannot archive {}: no file name", path.display()))
        })
}

fn write_zip(source: &DropSource, output: &Path) -> StorageResult<()> {
    let file = File::create(output).map_err(|e| {
        StorageError::BuildFailed(format!("Failed to create {}: {}", output.display(), e))
    })?;
    let mut zip = ZipWriter::new(file);

    match source {
        DropSource::File(path) => add_file(&mut zip, path, &file_label(path)?)?,
        DropSource::Directory(path) => add_directory(&mut zip, path, &file_label(path)?)?,
    }

    let mut file = zip
        .finish()
        .map_err(|e| StorageError::BuildFailed(format!("Failed to finalize archive: {}", e)))?;
    file.flush()?;
    file.sync_all()?;
    Ok(())
}

fn add_file(zip: &mut ZipWriter<File>, path: &Path, entry: &str) -> StorageResult<()> {
    let mut input = File::open(path)?;
    let large = input.metadata()?.len() >= u32::MAX as u64;

    zip.start_file(entry, entry_options(large))
        .map_err(|e| StorageError::BuildFailed(format!("Failed to add {}: {}", entry, e)))?;
    io::copy(&mut input, zip)?;
    Ok(())
}

/// Add `dir` recursively with entry names prefixed by `prefix/`. Symlinks are skipped.
fn add_directory(zip: &mut ZipWriter<File>, dir: &Path, prefix: &str) -> StorageResult<()> {
    zip.add_directory(format!("{}/", prefix), entry_options(false))
        .map_err(|e| StorageError::BuildFailed(format!("Failed to add {}: {}", prefix, e)))?;

    let mut children = std::fs::read_dir(dir)?.collect::<Result<Vec<_>, _>>()?;
    children.sort_by_key(|entry| entry.file_name());

    for child in children {
        let file_type = child.file_type()?;
        let name = child.file_name().to_string_lossy().into_owned();
        let entry = format!("{}/{}", prefix, name);

        if file_type.is_dir() {
            add_directory(zip, &child.path(), &entry)?;
        } else if file_type.is_file() {
            add_file(zip, &child.path(), &entry)?;
        } else {
            tracing::debug!(path = %child.path().display(), "Skipping non-regular file");
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Read;
    use tempfile::tempdir;

    fn entries(archive: &Path) -> Vec<String> {
        let zip = zip::ZipArchive::new(File::open(archive).unwrap()).unwrap();
        let mut names: Vec<String> = zip.file_names().map(str::to_string).collect();
        names.sort();
        names
    }

    #[test]
    fn test_archive_name_format() {
        let now = DateTime::parse_from_rfc3339("2026-10-18T09:30:00Z")
            .unwrap()
            .with_timezone(&Utc);
        let name = generate_archive_name(now);
        assert!(name.starts_with("20261018T093000Z_"));
        assert!(name.ends_with(".zip"));
        let uuid = &name["20261018T093000Z_".len()..name.len() - 4];
        assert!(Uuid::parse_str(uuid).is_ok());
    }

    #[tokio::test]
    async fn test_single_file() {
        let dropbox = tempdir().unwrap();
        let transfers = tempdir().unwrap();
        let source = dropbox.path().join("report.txt");
        std::fs::write(&source, b"quarterly numbers").unwrap();

        let built = ArchiveBuilder::new(transfers.path())
            .build(&DropSource::File(source))
            .await
            .unwrap();

        let path = transfers.path().join(&built.filename);
        assert_eq!(built.size, std::fs::metadata(&path).unwrap().len());
        assert_eq!(entries(&path), vec!["report.txt"]);

        let mut zip = zip::ZipArchive::new(File::open(&path).unwrap()).unwrap();
        let mut content = String::new();
        zip.by_name("report.txt")
            .unwrap()
            .read_to_string(&mut content)
            .unwrap();
        assert_eq!(content, "quarterly numbers");
    }

    #[tokio::test]
    async fn test_directory_keeps_relative_paths() {
        let dropbox = tempdir().unwrap();
        let transfers = tempdir().unwrap();
        let album = dropbox.path().join("album");
        std::fs::create_dir_all(album.join("raw")).unwrap();
        std::fs::create_dir_all(album.join("empty")).unwrap();
        std::fs::write(album.join("cover.jpg"), b"jpg").unwrap();
        std::fs::write(album.join("raw").join("001.cr2"), b"raw").unwrap();

        let built = ArchiveBuilder::new(transfers.path())
            .build(&DropSource::Directory(album))
            .await
            .unwrap();

        assert_eq!(
            entries(&transfers.path().join(&built.filename)),
            vec![
                "album/",
                "album/cover.jpg",
                "album/empty/",
                "album/raw/",
                "album/raw/001.cr2",
            ]
        );
    }

    #[tokio::test]
    async fn test_failed_build_leaves_nothing_behind() {
        let dropbox = tempdir().unwrap();
        let transfers = tempdir().unwrap();

        let result = ArchiveBuilder::new(transfers.path())
            .build(&DropSource::File(dropbox.path().join("vanished.bin")))
            .await;

        assert!(result.is_err());
        assert_eq!(std::fs::read_dir(transfers.path()).unwrap().count(), 0);
    }
}
