//! Dropsend Storage Library
//!
//! Filesystem side of transfers: the `ArchiveStorage` trait with its local implementation,
//! the zip `ArchiveBuilder`, and the `Dropbox` senders pick files from.

pub mod archive;
pub mod dropbox;
pub mod local;
pub mod traits;

// Re-export commonly used types
pub use archive::{generate_archive_name, ArchiveBuilder, BuiltArchive};
pub use dropbox::{DropSource, Dropbox};
pub use local::LocalArchiveStorage;
pub use traits::{ArchiveStorage, ByteStream, StorageError, StorageResult};
