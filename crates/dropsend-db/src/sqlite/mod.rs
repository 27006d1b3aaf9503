//! SQLite implementation of the store

mod download;
mod rows;
mod transfer_store;

pub use download::SqliteDownloadTransaction;
pub use transfer_store::SqliteTransferStore;
