//! Dropsend persistence
//!
//! The `TransferStore` and `DownloadTransaction` traits the services are written against,
//! and their SQLite implementation with embedded migrations.

pub mod pool;
pub mod sqlite;
pub mod store;

pub use pool::{connect, connect_in_memory, MIGRATOR};
pub use sqlite::{SqliteDownloadTransaction, SqliteTransferStore};
pub use store::{AppendOutcome, DownloadTransaction, TransferStore};
